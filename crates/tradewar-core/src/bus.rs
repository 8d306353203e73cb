//! In-process publish/subscribe event bus.
//!
//! Agents subscribe with a [`TopicFilter`] and receive a [`Mailbox`]: a FIFO
//! queue that the bus fills on every matching publish and the agent drains
//! without waiting. The bus also keeps a bounded history ring of every
//! published event, oldest evicted first, which the snapshot publisher and
//! the `detect_policy_changes` tool read through [`EventBus::recent`].
//!
//! Delivery to all mailboxes happens under one lock, so every mailbox sees
//! events in global publish order and a wildcard subscriber's view
//! interleaves consistently with any topic subscriber's view.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::{debug, warn};
use tradewar_types::{Event, TopicFilter};

/// Default number of events kept in the history ring.
pub const DEFAULT_HISTORY_CAPACITY: usize = 200;

/// Queue behind a [`Mailbox`], shared with the bus by weak reference.
#[derive(Debug)]
struct MailboxQueue {
    events: Mutex<VecDeque<Event>>,
    capacity: Option<usize>,
    dropped: AtomicU64,
}

impl MailboxQueue {
    fn push(&self, event: Event) {
        // A zero-capacity mailbox holds nothing; every delivery is a drop.
        if self.capacity == Some(0) {
            self.record_drop(0);
            return;
        }
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cap) = self.capacity {
            while events.len() >= cap && events.pop_front().is_some() {
                self.record_drop(cap);
            }
        }
        events.push_back(event);
    }

    fn record_drop(&self, capacity: usize) {
        let dropped = self.dropped.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        warn!(capacity, dropped, "mailbox full, event dropped");
    }
}

/// One subscriber's FIFO queue of delivered events.
///
/// Dropping the mailbox unsubscribes it; the bus prunes it on the next
/// publish.
#[derive(Debug)]
pub struct Mailbox {
    filter: TopicFilter,
    queue: Arc<MailboxQueue>,
}

impl Mailbox {
    /// The filter this mailbox was registered with.
    pub const fn filter(&self) -> TopicFilter {
        self.filter
    }

    /// Take every queued event in delivery order. Never waits.
    pub fn drain(&self) -> Vec<Event> {
        let mut events = self
            .queue
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        events.drain(..).collect()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.queue
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the mailbox is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events discarded because the mailbox was at capacity.
    pub fn dropped(&self) -> u64 {
        self.queue.dropped.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct Subscriber {
    filter: TopicFilter,
    queue: Weak<MailboxQueue>,
}

#[derive(Debug, Default)]
struct BusInner {
    subscribers: Vec<Subscriber>,
    history: VecDeque<Event>,
}

/// Cloneable handle to the shared bus.
#[derive(Debug, Clone)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
    history_capacity: usize,
    mailbox_capacity: Option<usize>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY, None)
    }
}

impl EventBus {
    /// Create a bus keeping `history_capacity` events, with mailboxes capped
    /// at `mailbox_capacity` (`None` for unbounded).
    pub fn new(history_capacity: usize, mailbox_capacity: Option<usize>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BusInner::default())),
            history_capacity,
            mailbox_capacity,
        }
    }

    /// Register a new mailbox for `filter`.
    ///
    /// Only events published after this call are delivered to it.
    pub fn subscribe(&self, filter: impl Into<TopicFilter>) -> Mailbox {
        let filter = filter.into();
        let queue = Arc::new(MailboxQueue {
            events: Mutex::new(VecDeque::new()),
            capacity: self.mailbox_capacity,
            dropped: AtomicU64::new(0),
        });
        let mut inner = self.lock();
        inner.subscribers.push(Subscriber {
            filter,
            queue: Arc::downgrade(&queue),
        });
        debug!(topic = %filter, subscribers = inner.subscribers.len(), "mailbox subscribed");
        Mailbox { filter, queue }
    }

    /// Append `event` to history and deliver a copy to every matching
    /// mailbox. Never waits on a subscriber.
    pub fn publish(&self, event: Event) {
        let mut inner = self.lock();
        inner.subscribers.retain(|s| s.queue.strong_count() > 0);
        for subscriber in &inner.subscribers {
            if subscriber.filter.matches(event.topic())
                && let Some(queue) = subscriber.queue.upgrade()
            {
                queue.push(event.clone());
            }
        }
        inner.history.push_back(event);
        while inner.history.len() > self.history_capacity {
            inner.history.pop_front();
        }
    }

    /// The most recent `limit` events, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<Event> {
        let inner = self.lock();
        let skip = inner.history.len().saturating_sub(limit);
        inner.history.iter().skip(skip).cloned().collect()
    }

    /// Number of events in history.
    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    /// Maximum events kept in history.
    pub const fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    /// Number of live mailboxes.
    pub fn subscriber_count(&self) -> usize {
        self.lock()
            .subscribers
            .iter()
            .filter(|s| s.queue.strong_count() > 0)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BusInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use tradewar_types::{Payload, Topic};

    use super::*;

    fn event(topic: Topic, title: &str) -> Event {
        Event::new("tester", topic, title, "memo", Payload::new())
    }

    fn titles(events: &[Event]) -> Vec<String> {
        events.iter().map(|e| e.title().to_owned()).collect()
    }

    #[test]
    fn history_never_exceeds_capacity_and_evicts_fifo() {
        let bus = EventBus::default();
        for i in 0..250 {
            bus.publish(event(Topic::Policy, &format!("e{i}")));
        }
        assert_eq!(bus.history_len(), 200);
        let all = bus.recent(500);
        assert_eq!(all.len(), 200);
        assert_eq!(all[0].title(), "e50");
        assert_eq!(all[199].title(), "e249");
    }

    #[test]
    fn recent_returns_newest_oldest_first() {
        let bus = EventBus::default();
        for i in 0..5 {
            bus.publish(event(Topic::Market, &format!("e{i}")));
        }
        assert_eq!(titles(&bus.recent(2)), vec!["e3", "e4"]);
        assert!(bus.recent(0).is_empty());
    }

    #[test]
    fn topic_subscriber_receives_only_its_topic_in_order() {
        let bus = EventBus::default();
        let policy = bus.subscribe(Topic::Policy);
        bus.publish(event(Topic::Policy, "p1"));
        bus.publish(event(Topic::Market, "m1"));
        bus.publish(event(Topic::Policy, "p2"));
        bus.publish(event(Topic::Policy, "p3"));
        assert_eq!(titles(&policy.drain()), vec!["p1", "p2", "p3"]);
        assert!(policy.is_empty());
    }

    #[test]
    fn events_before_subscription_are_not_delivered() {
        let bus = EventBus::default();
        bus.publish(event(Topic::Policy, "early"));
        let mailbox = bus.subscribe(Topic::Policy);
        bus.publish(event(Topic::Policy, "late"));
        assert_eq!(titles(&mailbox.drain()), vec!["late"]);
    }

    #[test]
    fn wildcard_sees_everything_in_publish_order() {
        let bus = EventBus::default();
        let all = bus.subscribe(TopicFilter::Wildcard);
        let strategy = bus.subscribe(Topic::Strategy);
        bus.publish(event(Topic::Strategy, "s1"));
        bus.publish(event(Topic::Scenario, "x1"));
        bus.publish(event(Topic::Strategy, "s2"));
        assert_eq!(titles(&all.drain()), vec!["s1", "x1", "s2"]);
        assert_eq!(titles(&strategy.drain()), vec!["s1", "s2"]);
    }

    #[test]
    fn duplicate_publish_is_not_deduplicated() {
        let bus = EventBus::default();
        let e = event(Topic::Negotiation, "same");
        bus.publish(e.clone());
        bus.publish(e.clone());
        let history = bus.recent(10);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], e);
        assert_eq!(history[1], e);
    }

    #[test]
    fn dropped_mailboxes_are_pruned() {
        let bus = EventBus::default();
        let kept = bus.subscribe(Topic::Policy);
        {
            let _gone = bus.subscribe(Topic::Policy);
            assert_eq!(bus.subscriber_count(), 2);
        }
        bus.publish(event(Topic::Policy, "p"));
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn capped_mailbox_drops_oldest() {
        let bus = EventBus::new(200, Some(2));
        let mailbox = bus.subscribe(Topic::Policy);
        for i in 0..4 {
            bus.publish(event(Topic::Policy, &format!("p{i}")));
        }
        assert_eq!(mailbox.dropped(), 2);
        assert_eq!(titles(&mailbox.drain()), vec!["p2", "p3"]);
    }

    #[test]
    fn zero_capacity_mailbox_holds_nothing_and_counts_every_drop() {
        let bus = EventBus::new(200, Some(0));
        let mailbox = bus.subscribe(Topic::Policy);
        for i in 0..3 {
            bus.publish(event(Topic::Policy, &format!("p{i}")));
        }
        assert!(mailbox.is_empty());
        assert_eq!(mailbox.dropped(), 3);
        assert_eq!(bus.history_len(), 3);
    }

    #[test]
    fn capped_mailbox_counts_only_real_evictions() {
        let bus = EventBus::new(200, Some(3));
        let mailbox = bus.subscribe(Topic::Policy);
        for i in 0..3 {
            bus.publish(event(Topic::Policy, &format!("p{i}")));
        }
        assert_eq!(mailbox.dropped(), 0);
        bus.publish(event(Topic::Policy, "p3"));
        assert_eq!(mailbox.dropped(), 1);
        assert_eq!(mailbox.len(), 3);
    }

    #[test]
    fn one_subscriber_on_two_filters_gets_independent_copies() {
        let bus = EventBus::default();
        let by_topic = bus.subscribe(Topic::Policy);
        let by_wildcard = bus.subscribe(TopicFilter::Wildcard);
        bus.publish(event(Topic::Policy, "tariff hike"));

        assert_eq!(titles(&by_topic.drain()), vec!["tariff hike"]);
        assert_eq!(titles(&by_wildcard.drain()), vec!["tariff hike"]);
        assert!(by_topic.is_empty());

        bus.publish(event(Topic::Policy, "rollback"));
        assert_eq!(by_topic.len(), 1);
        assert_eq!(by_wildcard.len(), 1);
    }

    #[test]
    fn publish_from_many_threads_keeps_every_event() {
        let bus = EventBus::default();
        let mailbox = bus.subscribe(TopicFilter::Wildcard);
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let bus = bus.clone();
                std::thread::spawn(move || {
                    for i in 0..10 {
                        bus.publish(event(Topic::Thought, &format!("t{t}-{i}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(mailbox.drain().len(), 40);
        assert_eq!(bus.history_len(), 40);
    }
}

//! Cross-task handle to the world.
//!
//! Agents, the drift task, and the snapshot publisher run on a
//! multi-threaded runtime, so every access goes through one mutex. Each
//! closure passed to [`SharedWorld::read`] or [`SharedWorld::write`] runs
//! while the lock is held, which makes a sequence of mutations inside one
//! closure atomic with respect to every other task. Closures must not await.

use std::sync::{Arc, Mutex, PoisonError};

use crate::state::WorldState;

/// Cloneable, lock-guarded handle to the [`WorldState`].
#[derive(Debug, Clone)]
pub struct SharedWorld {
    inner: Arc<Mutex<WorldState>>,
}

impl SharedWorld {
    /// Wrap a world for sharing across tasks.
    pub fn new(world: WorldState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(world)),
        }
    }

    /// Run `f` with shared access to the world.
    pub fn read<R>(&self, f: impl FnOnce(&WorldState) -> R) -> R {
        // A panic in another task's closure leaves the world consistent
        // (every mutator finishes its field writes), so keep going.
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` with exclusive access to the world.
    pub fn write<R>(&self, f: impl FnOnce(&mut WorldState) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Clone the current world.
    pub fn snapshot(&self) -> WorldState {
        self.read(Clone::clone)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tradewar_types::Sector;

    use super::*;
    use crate::starting_world::build_world;

    #[test]
    fn writes_are_visible_to_other_handles() {
        let world = SharedWorld::new(build_world());
        let other = world.clone();
        world
            .write(|w| w.apply_tariff("Country Alpha", Sector::Energy, 0.3))
            .unwrap();
        let rate = other.read(|w| w.country("Country Alpha").unwrap().tariff(Sector::Energy));
        assert!((rate - 0.3).abs() < 1e-9);
    }

    #[test]
    fn survives_a_poisoned_lock() {
        let world = SharedWorld::new(build_world());
        let poisoner = world.clone();
        let _ = std::thread::spawn(move || {
            poisoner.write(|_| panic!("round blew up"));
        })
        .join();
        let count = world.read(|w| w.countries().len());
        assert_eq!(count, 3);
    }
}

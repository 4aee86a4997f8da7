#![forbid(unsafe_code)]

//! One observer per state object.
//!
//! Every view bound to the same state object must share one handler set per
//! field, otherwise two observers would instrument the same field twice.
//! [`ObserverRegistry`] hands out that shared [`Observer`].
//!
//! Entries are keyed by state identity and only hold the state weakly:
//! entries whose state has been dropped are pruned on the next access.

use std::cell::RefCell;
use std::fmt;

use ahash::AHashMap;

use crate::observer::Observer;
use crate::state::State;

/// Identity-keyed cache of observers.
#[derive(Default)]
pub struct ObserverRegistry {
    entries: RefCell<AHashMap<usize, Observer>>,
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("entries", &self.entries.borrow().len())
            .finish()
    }
}

impl ObserverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The observer for `state`, created on first request.
    pub fn get_or_create(&self, state: &State) -> Observer {
        self.prune();
        let key = state.addr();
        if let Some(existing) = self.entries.borrow().get(&key) {
            if existing.observes(state) {
                return existing.clone();
            }
        }
        let observer = Observer::new(state);
        self.entries.borrow_mut().insert(key, observer.clone());
        tracing::trace!(target: "kview::registry", key, "observer created");
        observer
    }

    /// Whether an observer exists for `state`.
    #[must_use]
    pub fn has(&self, state: &State) -> bool {
        self.entries
            .borrow()
            .get(&state.addr())
            .is_some_and(|o| o.observes(state))
    }

    /// Restore every field of `state` and drop its observer. Returns whether
    /// one existed.
    pub fn forget(&self, state: &State) -> bool {
        let removed = self.entries.borrow_mut().remove(&state.addr());
        match removed {
            Some(observer) => {
                observer.stop_all();
                tracing::debug!(target: "kview::registry", "observer forgotten");
                true
            }
            None => false,
        }
    }

    /// Drop entries whose state no longer exists. Returns how many went.
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|_, observer| observer.is_attached());
        before - entries.len()
    }

    /// Live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prune();
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Per-connection subscription manager.
//!
//! Tracks which animals a WebSocket client is subscribed to and provides
//! server-side event filtering. Ownership answers are cached per connection
//! so a wildcard subscriber only ever receives its own animals' events.

use std::collections::HashSet;

use crate::domain::AnimalId;

/// Upper bound on cached foreign animal ids. The cache is cleared when full.
const MAX_FOREIGN_CACHE: usize = 1024;

/// Manages the set of animal subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed animal IDs. If `subscribe_all` is true, this set is ignored.
    animal_ids: HashSet<AnimalId>,
    /// Whether the client subscribes to all its animals (wildcard `"*"`).
    subscribe_all: bool,
    /// Animals known to belong to the connection's owner.
    owned: HashSet<AnimalId>,
    /// Animals known to belong to someone else, at most [`MAX_FOREIGN_CACHE`].
    foreign: HashSet<AnimalId>,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds animal IDs to the subscription set. `wildcard` enables `"*"`.
    pub fn subscribe(&mut self, ids: &[AnimalId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        for id in ids {
            self.animal_ids.insert(*id);
            self.owned.insert(*id);
            self.foreign.remove(id);
        }
    }

    /// Removes animal IDs from the subscription set.
    pub fn unsubscribe(&mut self, ids: &[AnimalId]) {
        for id in ids {
            self.animal_ids.remove(id);
        }
    }

    /// Returns `true` if the subscription filter selects `animal_id`,
    /// ownership aside.
    #[must_use]
    pub fn wants(&self, animal_id: AnimalId) -> bool {
        self.subscribe_all || self.animal_ids.contains(&animal_id)
    }

    /// Cached ownership answer for `animal_id`, if known.
    #[must_use]
    pub fn ownership(&self, animal_id: AnimalId) -> Option<bool> {
        if self.owned.contains(&animal_id) {
            Some(true)
        } else if self.foreign.contains(&animal_id) {
            Some(false)
        } else {
            None
        }
    }

    /// Records whether `animal_id` belongs to the connection's owner.
    pub fn remember_ownership(&mut self, animal_id: AnimalId, owned: bool) {
        if owned {
            self.owned.insert(animal_id);
            return;
        }
        if self.foreign.len() >= MAX_FOREIGN_CACHE {
            self.foreign.clear();
        }
        self.foreign.insert(animal_id);
    }

    /// Returns the number of explicitly subscribed animal IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.animal_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn empty_wants_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.wants(AnimalId::new()));
    }

    #[test]
    fn subscribe_specific_animal_marks_it_owned() {
        let mut mgr = SubscriptionManager::new();
        let id = AnimalId::new();
        mgr.subscribe(&[id], false);
        assert!(mgr.wants(id));
        assert_eq!(mgr.ownership(id), Some(true));
        assert!(!mgr.wants(AnimalId::new()));
    }

    #[test]
    fn wildcard_wants_everything_but_ownership_is_unknown() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        let stranger = AnimalId::new();
        assert!(mgr.wants(stranger));
        assert_eq!(mgr.ownership(stranger), None);
        mgr.remember_ownership(stranger, false);
        assert_eq!(mgr.ownership(stranger), Some(false));
    }

    #[test]
    fn foreign_cache_is_bounded() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        let first = AnimalId::new();
        mgr.remember_ownership(first, false);
        for _ in 1..MAX_FOREIGN_CACHE {
            mgr.remember_ownership(AnimalId::new(), false);
        }
        assert_eq!(mgr.foreign.len(), MAX_FOREIGN_CACHE);
        assert_eq!(mgr.ownership(first), Some(false));

        let overflow = AnimalId::new();
        mgr.remember_ownership(overflow, false);
        assert_eq!(mgr.foreign.len(), 1);
        assert_eq!(mgr.ownership(first), None);
        assert_eq!(mgr.ownership(overflow), Some(false));
    }

    #[test]
    fn unsubscribe_removes_animal() {
        let mut mgr = SubscriptionManager::new();
        let id = AnimalId::new();
        mgr.subscribe(&[id], false);
        mgr.unsubscribe(&[id]);
        assert!(!mgr.wants(id));
        assert_eq!(mgr.count(), 0);
    }
}

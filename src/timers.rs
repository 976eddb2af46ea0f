//! Cancellable one-shot deadlines driven by an injected clock.
//!
//! Nothing here sleeps: owners call `take_due(now)` from their `tick` and act
//! on whatever fired. Every ephemeral state keeps the ids it scheduled so it
//! can cancel them when it is invalidated.

use std::collections::BTreeMap;
use std::time::Instant;

#[cfg(test)]
mod tests;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

pub struct TimerRegistry<K> {
    entries: BTreeMap<TimerId, (Instant, K)>,
    next_id: u64,
}

impl<K> Default for TimerRegistry<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<K> TimerRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Instant, key: K) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.entries.insert(id, (deadline, key));
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn cancel_all<I: IntoIterator<Item = TimerId>>(&mut self, ids: I) -> usize {
        ids.into_iter().filter(|id| self.cancel(*id)).count()
    }

    pub fn cancel_where<F: Fn(&K) -> bool>(&mut self, predicate: F) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, (_, key)| !predicate(key));
        before - self.entries.len()
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Remove and return every timer whose deadline is at or before `now`,
    /// earliest first (ties by scheduling order).
    pub fn take_due(&mut self, now: Instant) -> Vec<(TimerId, K)> {
        let mut due_ids: Vec<(Instant, TimerId)> = self
            .entries
            .iter()
            .filter(|(_, (deadline, _))| *deadline <= now)
            .map(|(id, (deadline, _))| (*deadline, *id))
            .collect();
        due_ids.sort();

        due_ids
            .into_iter()
            .filter_map(|(_, id)| self.entries.remove(&id).map(|(_, key)| (id, key)))
            .collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.values().map(|(deadline, _)| *deadline).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) -> usize {
        let drained = self.entries.len();
        self.entries.clear();
        drained
    }
}

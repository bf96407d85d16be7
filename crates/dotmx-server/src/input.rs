use std::collections::HashMap;

use parking_lot::RwLock;

use crate::subscriber::SubscriberId;

/// Sentinel input byte: no buttons pressed.
pub const NO_INPUT: u8 = 0xFF;

/// Collects one input byte per connected subscriber and reduces them to a
/// single "winning" byte per emulator poll via plurality vote.
///
/// Always locked after the subscriber registry when both must change for
/// the same subscriber (see [`crate::subscriber::SubscriberRegistry`]),
/// which is the fixed lock order the rest of the crate relies on to avoid
/// deadlock between eviction and a concurrent input poll.
#[derive(Default)]
pub struct InputAggregator {
    entries: RwLock<HashMap<SubscriberId, u8>>,
}

impl InputAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when a subscriber registers, so the poll below always sees a
    /// complete (if initially idle) set of entries.
    pub fn insert(&self, id: SubscriberId) {
        self.entries.write().insert(id, NO_INPUT);
    }

    /// Called by a subscriber's read task on every inbound message. Empty
    /// messages are ignored by the caller before this is invoked.
    pub fn record(&self, id: &str, byte: u8) {
        if let Some(entry) = self.entries.write().get_mut(id) {
            *entry = byte;
        }
    }

    /// Drops a subscriber's entry. Idempotent.
    pub fn remove(&self, id: &str) {
        self.entries.write().remove(id);
    }

    /// Tallies the current entries, picks a winner by plurality (ties
    /// broken by lowest byte value for a deterministic result within one
    /// poll), resets every entry to [`NO_INPUT`], and returns the winner.
    ///
    /// Returns `None` when there are no subscribers at all.
    pub fn poll(&self) -> Option<u8> {
        let mut entries = self.entries.write();
        if entries.is_empty() {
            return None;
        }

        let mut tally: HashMap<u8, u32> = HashMap::new();
        for &byte in entries.values() {
            *tally.entry(byte).or_insert(0) += 1;
        }

        let winner = tally
            .into_iter()
            .max_by(|(left_byte, left_count), (right_byte, right_count)| {
                left_count.cmp(right_count).then(right_byte.cmp(left_byte))
            })
            .map(|(byte, _)| byte)
            .expect("entries is non-empty, so tally is non-empty");

        for value in entries.values_mut() {
            *value = NO_INPUT;
        }

        Some(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plurality_vote_picks_the_majority_byte() {
        let aggregator = InputAggregator::new();
        aggregator.insert("a".to_owned());
        aggregator.insert("b".to_owned());
        aggregator.insert("c".to_owned());
        aggregator.record("a", 0x01);
        aggregator.record("b", 0x01);
        aggregator.record("c", 0x02);

        assert_eq!(aggregator.poll(), Some(0x01));
    }

    #[test]
    fn ties_break_on_lowest_byte_value() {
        let aggregator = InputAggregator::new();
        aggregator.insert("a".to_owned());
        aggregator.insert("b".to_owned());
        aggregator.record("a", 0x05);
        aggregator.record("b", 0x02);

        assert_eq!(aggregator.poll(), Some(0x02));
    }

    #[test]
    fn poll_resets_entries_to_no_input() {
        let aggregator = InputAggregator::new();
        aggregator.insert("a".to_owned());
        aggregator.record("a", 0x01);
        aggregator.poll();

        // A second poll with no new inputs still sees the reset entries,
        // and still reports subscribers present.
        assert_eq!(aggregator.poll(), Some(NO_INPUT));
    }

    #[test]
    fn empty_aggregator_returns_none() {
        let aggregator = InputAggregator::new();
        assert_eq!(aggregator.poll(), None);
    }
}

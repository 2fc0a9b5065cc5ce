//! Message id allocation.

use bcommon::{MessageId, unix_millis};

/// Hands out strictly-increasing millisecond-scale ids.
///
/// Each submission needs two ids minted in the same instant: the user
/// message and its response placeholder. The pair is allocated together
/// (placeholder = user id + 1) and the generator clamps to one past the
/// last issued id, so ids stay unique even when the clock has not advanced
/// between submissions.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    last: u64,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_pair(&mut self) -> (MessageId, MessageId) {
        let user = unix_millis().max(self.last + 1);
        let model = user + 1;
        self.last = model;

        (MessageId::new(user), MessageId::new(model))
    }
}

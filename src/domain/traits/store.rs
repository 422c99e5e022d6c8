use chrono::{DateTime, Utc};
use crate::application::errors::StorageError;
use crate::domain::entities::{Poll, PollData};

/// Poll storage. Lookups only see polls that are still accepting votes.
pub trait PollStore: Send + Sync {
    /// Start a poll, assigning it the next id
    fn start(&self, data: PollData) -> Result<Poll, StorageError>;

    fn get_active_channel_polls(&self, channel: &str) -> Vec<Poll>;

    fn get_active_channel_poll_count(&self, channel: &str) -> usize {
        self.get_active_channel_polls(channel).len()
    }

    fn get_channel_poll_by_id(&self, channel: &str, id: u64) -> Option<Poll>;

    /// Record a vote. `Ok(false)` if the voter already voted, the choice is
    /// invalid or the poll stopped accepting votes.
    fn add_vote(&self, poll_id: u64, voter: &str, choice: usize) -> Result<bool, StorageError>;

    /// Remove and return every poll whose deadline is at or before `now`
    fn close_expired(&self, now: DateTime<Utc>) -> Result<Vec<Poll>, StorageError>;
}

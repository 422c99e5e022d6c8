//! In-memory poll storage

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::entities::{Poll, PollData};
use crate::domain::traits::PollStore;

struct Inner {
    next_id: u64,
    polls: BTreeMap<u64, Poll>,
}

/// Poll store kept in process memory. Ids start at 1 and are never reused.
pub struct MemoryPollStore {
    inner: RwLock<Inner>,
}

impl MemoryPollStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                polls: BTreeMap::new(),
            }),
        }
    }

    fn active_in(&self, channel: &str, now: DateTime<Utc>) -> Vec<Poll> {
        self.inner.read()
            .ok()
            .map(|inner| {
                inner.polls.values()
                    .filter(|p| p.channel == channel && p.is_active_at(now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for MemoryPollStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PollStore for MemoryPollStore {
    fn start(&self, data: PollData) -> Result<Poll, StorageError> {
        let mut inner = self.inner.write()
            .map_err(|_| StorageError::Lock("poll store".to_string()))?;

        let id = inner.next_id;
        inner.next_id += 1;

        let poll = Poll::start(id, data, Utc::now());
        tracing::info!(
            "Started poll #{} in {}: \"{}\" ({} choices, {}s)",
            poll.id, poll.channel, poll.title, poll.choices.len(), poll.seconds
        );
        inner.polls.insert(id, poll.clone());
        Ok(poll)
    }

    fn get_active_channel_polls(&self, channel: &str) -> Vec<Poll> {
        self.active_in(channel, Utc::now())
    }

    fn get_channel_poll_by_id(&self, channel: &str, id: u64) -> Option<Poll> {
        let now = Utc::now();
        self.inner.read()
            .ok()?
            .polls
            .get(&id)
            .filter(|p| p.channel == channel && p.is_active_at(now))
            .cloned()
    }

    fn add_vote(&self, poll_id: u64, voter: &str, choice: usize) -> Result<bool, StorageError> {
        let mut inner = self.inner.write()
            .map_err(|_| StorageError::Lock("poll store".to_string()))?;

        let poll = inner.polls.get_mut(&poll_id)
            .ok_or_else(|| StorageError::NotFound(format!("poll #{}", poll_id)))?;

        if !poll.is_active() {
            return Ok(false);
        }
        Ok(poll.add_vote(voter, choice))
    }

    fn close_expired(&self, now: DateTime<Utc>) -> Result<Vec<Poll>, StorageError> {
        let mut inner = self.inner.write()
            .map_err(|_| StorageError::Lock("poll store".to_string()))?;

        let expired: Vec<u64> = inner.polls.values()
            .filter(|p| !p.is_active_at(now))
            .map(|p| p.id)
            .collect();

        Ok(expired.into_iter()
            .filter_map(|id| inner.polls.remove(&id))
            .collect())
    }
}

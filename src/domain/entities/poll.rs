use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Poll duration used when none is given
pub const DEFAULT_POLL_SECONDS: f64 = 30.0;

/// A poll that has been requested but not started yet
#[derive(Debug, Clone, PartialEq)]
pub struct PollData {
    pub channel: String,
    pub owner: String,
    pub title: String,
    pub choices: Vec<String>,
    pub seconds: f64,
}

impl PollData {
    pub fn new(
        channel: impl Into<String>,
        owner: impl Into<String>,
        title: impl Into<String>,
        seconds: f64,
        choices: Vec<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            owner: owner.into(),
            title: title.into(),
            choices,
            seconds,
        }
    }
}

/// A started poll. Choice ids are 1-based.
#[derive(Debug, Clone)]
pub struct Poll {
    pub id: u64,
    pub channel: String,
    pub owner: String,
    pub title: String,
    pub choices: Vec<String>,
    pub seconds: f64,
    pub started_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    votes: HashMap<String, usize>,
}

impl Poll {
    pub fn start(id: u64, data: PollData, now: DateTime<Utc>) -> Self {
        let millis = (data.seconds.max(0.0) * 1000.0) as i64;
        let deadline = now
            .checked_add_signed(Duration::milliseconds(millis))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            id,
            channel: data.channel,
            owner: data.owner,
            title: data.title,
            choices: data.choices,
            seconds: data.seconds,
            started_at: now,
            deadline,
            votes: HashMap::new(),
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.deadline
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    pub fn is_valid_vote(&self, choice: usize) -> bool {
        (1..=self.choices.len()).contains(&choice)
    }

    pub fn has_already_voted(&self, voter: &str) -> bool {
        self.votes.contains_key(voter)
    }

    /// Records a vote. Returns false for repeat voters and invalid choices.
    pub fn add_vote(&mut self, voter: impl Into<String>, choice: usize) -> bool {
        let voter = voter.into();
        if !self.is_valid_vote(choice) || self.has_already_voted(&voter) {
            return false;
        }
        self.votes.insert(voter, choice);
        true
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    pub fn votes(&self) -> &HashMap<String, usize> {
        &self.votes
    }

    /// `1: apples, 2: oranges`
    pub fn format_choices(&self) -> String {
        self.choices
            .iter()
            .enumerate()
            .map(|(i, choice)| format!("{}: {}", i + 1, choice))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn seconds_left_at(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline - now).num_seconds().max(0)
    }

    pub fn seconds_left(&self) -> i64 {
        self.seconds_left_at(Utc::now())
    }

    /// Vote totals per choice, in choice order
    pub fn results(&self) -> Vec<(&str, usize)> {
        let mut counts = vec![0usize; self.choices.len()];
        for &choice in self.votes.values() {
            if let Some(count) = counts.get_mut(choice - 1) {
                *count += 1;
            }
        }
        self.choices
            .iter()
            .map(String::as_str)
            .zip(counts)
            .collect()
    }

    /// Announcement line for a finished poll
    pub fn summary(&self) -> String {
        let results = self.results();
        let top = results.iter().map(|(_, n)| *n).max().unwrap_or(0);

        if top == 0 {
            return format!("poll #{} \"{}\" has ended with no votes", self.id, self.title);
        }

        let winners: Vec<&str> = results
            .iter()
            .filter(|(_, n)| *n == top)
            .map(|(choice, _)| *choice)
            .collect();

        format!(
            "poll #{} \"{}\" has ended, winner: {} with {} vote(s) out of {}",
            self.id,
            self.title,
            winners.join(" / "),
            top,
            self.vote_count()
        )
    }
}

use crate::ledger::{Ledger, Session};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const MAX_COUNT: u8 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Counter {
    New,
    Old,
}

/// Whether date and location can still be changed.
///
/// `Editable -> Counting` happens on the first non-zero count and the only
/// way back is a successful [`CurrentSession::finish`]. Persisted as the
/// `locked` boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum Phase {
    #[default]
    Editable,
    Counting,
}

impl From<bool> for Phase {
    fn from(locked: bool) -> Self {
        if locked { Phase::Counting } else { Phase::Editable }
    }
}

impl From<Phase> for bool {
    fn from(phase: Phase) -> Self {
        phase == Phase::Counting
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSession {
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "clamped_count")]
    new_count: u8,
    #[serde(default, deserialize_with = "clamped_count")]
    old_count: u8,
    #[serde(default, rename = "locked")]
    phase: Phase,
}

/// Accepts any integer and pulls it into `0..=MAX_COUNT`.
fn clamped_count<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    Ok(value.clamp(0, i64::from(MAX_COUNT)) as u8)
}

impl Default for CurrentSession {
    fn default() -> Self {
        Self::starting_on(Local::now().date_naive())
    }
}

impl CurrentSession {
    pub fn starting_on(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            location: None,
            new_count: 0,
            old_count: 0,
            phase: Phase::Editable,
        }
    }

    /// Repairs a hand-edited or stale record: counts within bounds, locked
    /// only while something is counted and counting is still possible.
    pub fn sanitized(mut self) -> Self {
        self.new_count = self.new_count.min(MAX_COUNT);
        self.old_count = self.old_count.min(MAX_COUNT);
        if !self.can_count() {
            self.phase = Phase::Editable;
        } else if self.total() > 0 {
            self.phase = Phase::Counting;
        }
        self
    }

    pub fn new_count(&self) -> u8 {
        self.new_count
    }

    pub fn old_count(&self) -> u8 {
        self.old_count
    }

    pub fn total(&self) -> u64 {
        u64::from(self.new_count) + u64::from(self.old_count)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_locked(&self) -> bool {
        self.phase == Phase::Counting
    }

    pub fn can_count(&self) -> bool {
        self.date.is_some() && self.location.as_deref().is_some_and(|loc| !loc.is_empty())
    }

    pub fn increment(&mut self, counter: Counter) {
        if !self.can_count() {
            return;
        }
        let slot = self.slot_mut(counter);
        *slot = slot.saturating_add(1).min(MAX_COUNT);
        self.latch();
    }

    pub fn decrement(&mut self, counter: Counter) {
        if !self.can_count() {
            return;
        }
        let slot = self.slot_mut(counter);
        *slot = slot.saturating_sub(1);
        self.latch();
    }

    pub fn reset_counter(&mut self, counter: Counter) {
        if !self.can_count() {
            return;
        }
        *self.slot_mut(counter) = 0;
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) -> bool {
        if self.is_locked() {
            return false;
        }
        self.date = date;
        true
    }

    pub fn set_location(&mut self, location: Option<String>) -> bool {
        if self.is_locked() {
            return false;
        }
        self.location = location
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty());
        true
    }

    /// Folds the tally into `ledger`.
    ///
    /// Returns the merged record, or `None` when there was nothing to close.
    /// A zero total leaves the phase untouched.
    pub fn finish(&mut self, ledger: &mut Ledger, now: DateTime<Utc>) -> Option<Session> {
        if !self.can_count() {
            return None;
        }
        let total = self.total();
        if total == 0 {
            return None;
        }
        let (Some(date), Some(location)) = (self.date, self.location.clone()) else {
            return None;
        };

        let session = ledger.merge_or_append(date, &location, total, now).clone();

        self.new_count = 0;
        self.old_count = 0;
        self.phase = Phase::Editable;
        Some(session)
    }

    fn slot_mut(&mut self, counter: Counter) -> &mut u8 {
        match counter {
            Counter::New => &mut self.new_count,
            Counter::Old => &mut self.old_count,
        }
    }

    fn latch(&mut self) {
        if self.total() > 0 {
            self.phase = Phase::Counting;
        }
    }
}

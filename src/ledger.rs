use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: Uuid,
    pub date: NaiveDate,
    pub location: String,
    pub total: u64,
    pub finished_at: DateTime<Utc>,
}

/// Newest date first; within a date, most recently finished first.
pub fn chronological(a: &Session, b: &Session) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.finished_at.cmp(&a.finished_at))
}

/// Finished sessions, at most one per (date, location).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    sessions: Vec<Session>,
}

impl Ledger {
    pub fn from_sessions(mut sessions: Vec<Session>) -> Self {
        sessions.sort_by(chronological);
        Self { sessions }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn merge_or_append(
        &mut self,
        date: NaiveDate,
        location: &str,
        amount: u64,
        now: DateTime<Utc>,
    ) -> &Session {
        let session_id = match self
            .sessions
            .iter_mut()
            .find(|session| session.date == date && session.location == location)
        {
            Some(existing) => {
                existing.total = existing.total.saturating_add(amount);
                existing.finished_at = now;
                existing.session_id
            }
            None => {
                let session = Session {
                    session_id: Uuid::new_v4(),
                    date,
                    location: location.to_string(),
                    total: amount,
                    finished_at: now,
                };
                let id = session.session_id;
                self.sessions.push(session);
                id
            }
        };

        self.sessions.sort_by(chronological);
        let index = self
            .sessions
            .iter()
            .position(|session| session.session_id == session_id)
            .unwrap_or_default();
        &self.sessions[index]
    }

    pub fn remove(&mut self, session_id: Uuid) -> Option<Session> {
        let index = self
            .sessions
            .iter()
            .position(|session| session.session_id == session_id)?;
        Some(self.sessions.remove(index))
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.sessions.iter().map(|s| s.date.year()).collect();
        years.into_iter().rev().collect()
    }

    pub fn locations(&self) -> Vec<String> {
        let locations: BTreeSet<&str> = self.sessions.iter().map(|s| s.location.as_str()).collect();
        locations.into_iter().map(str::to_string).collect()
    }
}

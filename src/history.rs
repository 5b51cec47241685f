use crate::ledger::{Ledger, Session, chronological};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer};

pub const ALL: &str = "ALL";

/// History view selection. Every predicate is optional and they combine with AND.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryFilter {
    #[serde(default = "all")]
    pub location: String,
    #[serde(default = "all")]
    pub year: String,
    /// 0 means every month.
    #[serde(default, deserialize_with = "month_number")]
    pub month: u32,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub to: Option<NaiveDate>,
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self {
            location: all(),
            year: all(),
            month: 0,
            from: None,
            to: None,
        }
    }
}

fn all() -> String {
    ALL.to_string()
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MonthField {
    Number(u32),
    Text(String),
}

// Query strings hand every value over as text.
fn month_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match MonthField::deserialize(deserializer)? {
        MonthField::Number(month) => Ok(month),
        MonthField::Text(text) if text.trim().is_empty() => Ok(0),
        MonthField::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn is_all(value: &str) -> bool {
    value.is_empty() || value == ALL
}

impl HistoryFilter {
    pub fn matches(&self, session: &Session) -> bool {
        if !is_all(&self.location) && session.location != self.location {
            return false;
        }
        if !is_all(&self.year) && session.date.year().to_string() != self.year {
            return false;
        }
        if self.month != 0 && session.date.month() != self.month {
            return false;
        }
        if self.from.is_some_and(|from| session.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| session.date > to) {
            return false;
        }
        true
    }
}

pub fn query(ledger: &Ledger, filter: &HistoryFilter) -> Vec<Session> {
    let mut sessions: Vec<Session> = ledger
        .sessions()
        .iter()
        .filter(|session| filter.matches(session))
        .cloned()
        .collect();
    sessions.sort_by(chronological);
    sessions
}

pub fn grand_total(sessions: &[Session]) -> u64 {
    sessions
        .iter()
        .fold(0u64, |sum, session| sum.saturating_add(session.total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_704_067_200 + secs, 0).unwrap()
    }

    fn sample() -> Ledger {
        let mut ledger = Ledger::default();
        let entries = [
            ("2023-12-31", "Dhaka", 4),
            ("2024-01-15", "Dhaka", 5),
            ("2024-01-15", "Khulna", 2),
            ("2024-03-02", "Dhaka", 7),
            ("2024-03-20", "Sylhet", 1),
        ];
        for (offset, (date, location, total)) in entries.into_iter().enumerate() {
            ledger.merge_or_append(date.parse().unwrap(), location, total, at(offset as i64));
        }
        ledger
    }

    #[test]
    fn unfiltered_returns_everything_in_ledger_order() {
        let ledger = sample();
        let rows = query(&ledger, &HistoryFilter::default());
        assert_eq!(rows, ledger.sessions());
    }

    #[test]
    fn location_and_year_combine() {
        let ledger = sample();
        let filter = HistoryFilter {
            location: "Dhaka".to_string(),
            year: "2024".to_string(),
            ..HistoryFilter::default()
        };
        let rows = query(&ledger, &filter);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|s| s.location == "Dhaka" && s.date.year() == 2024));
        assert_eq!(grand_total(&rows), 12);
    }

    #[test]
    fn month_and_range_are_inclusive() {
        let ledger = sample();
        let march = HistoryFilter {
            month: 3,
            ..HistoryFilter::default()
        };
        assert_eq!(query(&ledger, &march).len(), 2);

        let range = HistoryFilter {
            from: "2024-01-15".parse().ok(),
            to: "2024-03-02".parse().ok(),
            ..HistoryFilter::default()
        };
        let rows = query(&ledger, &range);
        let dates: Vec<String> = rows.iter().map(|s| s.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-03-02", "2024-01-15", "2024-01-15"]);
    }

    #[test]
    fn query_params_treat_empty_as_unset() {
        let filter: HistoryFilter = serde_json::from_value(serde_json::json!({
            "location": "ALL",
            "month": "3",
            "from": "",
            "to": "2024-01-31"
        }))
        .unwrap();
        assert_eq!(filter.year, ALL);
        assert_eq!(filter.month, 3);
        assert_eq!(filter.from, None);
        assert_eq!(filter.to, "2024-01-31".parse().ok());
    }
}

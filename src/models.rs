use crate::export::ExportScope;
use crate::history::HistoryFilter;
use crate::ledger::Session;
use crate::session::{Counter, CurrentSession};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterAction {
    Increment,
    Decrement,
    Reset,
}

#[derive(Debug, Deserialize)]
pub struct CounterRequest {
    pub counter: Counter,
    pub action: CounterAction,
}

#[derive(Debug, Deserialize)]
pub struct DateRequest {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameLocationRequest {
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub scope: ExportScope,
    #[serde(flatten)]
    pub filter: HistoryFilter,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentResponse {
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub new_count: u8,
    pub old_count: u8,
    pub total: u64,
    pub locked: bool,
    pub can_count: bool,
}

impl From<&CurrentSession> for CurrentResponse {
    fn from(current: &CurrentSession) -> Self {
        Self {
            date: current.date,
            location: current.location.clone(),
            new_count: current.new_count(),
            old_count: current.old_count(),
            total: current.total(),
            locked: current.is_locked(),
            can_count: current.can_count(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FinishResponse {
    pub session: Option<Session>,
    pub current: CurrentResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub sessions: Vec<Session>,
    pub grand_total: u64,
    pub years: Vec<i32>,
    pub locations: Vec<String>,
}

use crate::history::{HistoryFilter, grand_total, query};
use crate::ledger::{Ledger, Session};
use chrono::NaiveDate;
use serde::Deserialize;

pub const ENTRIES_PER_PAGE: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExportScope {
    #[default]
    All,
    Filtered,
    Today,
}

impl ExportScope {
    fn title(self) -> &'static str {
        match self {
            ExportScope::All => "All sessions",
            ExportScope::Filtered => "Filtered sessions",
            ExportScope::Today => "Today's sessions",
        }
    }
}

pub fn select(
    ledger: &Ledger,
    scope: ExportScope,
    filter: &HistoryFilter,
    today: NaiveDate,
) -> Vec<Session> {
    match scope {
        ExportScope::All => ledger.sessions().to_vec(),
        ExportScope::Filtered => query(ledger, filter),
        ExportScope::Today => ledger
            .sessions()
            .iter()
            .filter(|session| session.date == today)
            .cloned()
            .collect(),
    }
}

pub fn entry_line(index: usize, session: &Session) -> String {
    format!(
        "{}. {} — {} — Total: {}",
        index,
        session.date.format("%d/%m/%Y"),
        session.location,
        session.total
    )
}

/// Renders the selection as a paginated plain-text listing.
pub fn render(scope: ExportScope, sessions: &[Session]) -> String {
    let mut out = format!("Patient Tally — {}\n", scope.title());

    if sessions.is_empty() {
        out.push_str("\nPage 1 of 1\nNo sessions\n");
        return out;
    }

    let pages = sessions.len().div_ceil(ENTRIES_PER_PAGE);
    for (page, chunk) in sessions.chunks(ENTRIES_PER_PAGE).enumerate() {
        out.push_str(&format!("\nPage {} of {}\n", page + 1, pages));
        for (offset, session) in chunk.iter().enumerate() {
            out.push_str(&entry_line(page * ENTRIES_PER_PAGE + offset + 1, session));
            out.push('\n');
        }
    }
    out.push_str(&format!("\nGrand total: {}\n", grand_total(sessions)));
    out
}

pub mod app;
pub mod config;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod history;
pub mod ledger;
pub mod locations;
pub mod models;
pub mod offline;
pub mod session;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::{AppState, Tally};
pub use storage::{FileBackend, Store};

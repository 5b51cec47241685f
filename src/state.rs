use crate::ledger::Ledger;
use crate::locations::LocationSlots;
use crate::offline::OfflineCache;
use crate::session::CurrentSession;
use crate::storage::{CURRENT_KEY, LOCATIONS_KEY, SESSIONS_KEY, Store};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The three persisted records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub current: CurrentSession,
    pub ledger: Ledger,
    pub locations: LocationSlots,
}

impl Tally {
    pub async fn load(store: &Store) -> Self {
        let current: CurrentSession = store.load(CURRENT_KEY, CurrentSession::default()).await;
        let sessions = store.load(SESSIONS_KEY, Vec::new()).await;
        let locations = store.load(LOCATIONS_KEY, Vec::new()).await;
        Self {
            current: current.sanitized(),
            ledger: Ledger::from_sessions(sessions),
            locations: LocationSlots::normalize(locations),
        }
    }

    pub async fn save_current(&self, store: &Store) {
        store.save(CURRENT_KEY, &self.current).await;
    }

    pub async fn save_ledger(&self, store: &Store) {
        store.save(SESSIONS_KEY, &self.ledger).await;
    }

    pub async fn save_locations(&self, store: &Store) {
        store.save(LOCATIONS_KEY, &self.locations).await;
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub tally: Arc<Mutex<Tally>>,
    pub assets: Arc<OfflineCache>,
}

impl AppState {
    pub fn new(store: Store, tally: Tally, assets: OfflineCache) -> Self {
        Self {
            store,
            tally: Arc::new(Mutex::new(tally)),
            assets: Arc::new(assets),
        }
    }
}

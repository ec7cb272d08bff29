use crate::ingest::IngestStats;
use crate::status::Thresholds;
use crate::store::ReadingStore;
use std::sync::Arc;

/// Built once at startup and shared by the ingest task and the HTTP router.
#[derive(Clone)]
pub struct BridgeState {
    pub store: ReadingStore,
    pub thresholds: Thresholds,
    pub stats: Arc<IngestStats>,
}

impl BridgeState {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            store: ReadingStore::new(),
            thresholds,
            stats: Arc::new(IngestStats::new()),
        }
    }
}

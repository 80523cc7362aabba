// Per-session dataset cache with one in-flight load per source
use crate::domain::dataset::Dataset;
use crate::domain::errors::FetchError;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

pub type LoadResult = Result<Arc<Dataset>, FetchError>;

/// Write-once store of load outcomes, keyed by source name.
///
/// The first caller for a source runs the load; concurrent callers await the
/// same cell. Failures are stored too, so a source is never fetched twice in
/// one session.
#[derive(Default)]
pub struct DatasetCache {
    slots: Mutex<HashMap<String, Arc<OnceCell<LoadResult>>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_load<F, Fut>(&self, source_name: &str, load: F) -> LoadResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = LoadResult>,
    {
        let slot = {
            let mut slots = self.slots.lock().await;
            slots.entry(source_name.to_string()).or_default().clone()
        };

        slot.get_or_init(load).await.clone()
    }
}

// Loader - Fetches each source once per session and normalizes date fields
use crate::application::dataset_cache::{DatasetCache, LoadResult};
use crate::application::dataset_fetcher::DatasetFetcher;
use crate::domain::dataset::Dataset;
use crate::domain::source::DataSource;
use std::sync::Arc;

#[derive(Clone)]
pub struct Loader {
    fetcher: Arc<dyn DatasetFetcher>,
    cache: Arc<DatasetCache>,
}

impl Loader {
    pub fn new(fetcher: Arc<dyn DatasetFetcher>, cache: Arc<DatasetCache>) -> Self {
        Self { fetcher, cache }
    }

    pub async fn load(&self, source: &DataSource) -> LoadResult {
        self.cache
            .get_or_load(&source.name, || self.fetch_and_prepare(source))
            .await
    }

    async fn fetch_and_prepare(&self, source: &DataSource) -> LoadResult {
        tracing::debug!("Fetching source {} from {}", source.name, source.location);

        let payload = self.fetcher.fetch(source).await?;
        let mut dataset = Dataset::from_json(&source.name, payload)?;

        if let Some(field) = &source.date_field {
            dataset = dataset.convert_dates(field);
            for error in &dataset.rejected {
                tracing::warn!("Dropping record: {}", error);
            }
        }

        if dataset.is_empty() {
            tracing::warn!("Source {} has no usable records", source.name);
        }

        tracing::debug!(
            "Source {} ready: {} records, {} dropped",
            source.name,
            dataset.len(),
            dataset.rejected.len()
        );

        Ok(Arc::new(dataset))
    }
}

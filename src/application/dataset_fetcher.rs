// Fetcher trait for raw source payloads
use crate::domain::errors::FetchError;
use crate::domain::source::DataSource;
use async_trait::async_trait;

#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    /// Retrieve the raw JSON payload stored at the source's location
    async fn fetch(&self, source: &DataSource) -> Result<serde_json::Value, FetchError>;
}

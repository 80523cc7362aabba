// Source fetcher - reads datasets from the data directory or over HTTP
use crate::application::dataset_fetcher::DatasetFetcher;
use crate::domain::errors::FetchError;
use crate::domain::source::DataSource;
use async_trait::async_trait;
use std::path::PathBuf;

/// Where relative source locations resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum DataRoot {
    Directory(PathBuf),
    BaseUrl(String),
}

impl DataRoot {
    pub fn parse(root: &str) -> Self {
        if root.starts_with("http://") || root.starts_with("https://") {
            DataRoot::BaseUrl(root.trim_end_matches('/').to_string())
        } else {
            DataRoot::Directory(PathBuf::from(root))
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceFetcher {
    root: DataRoot,
    client: reqwest::Client,
}

/// A source location after resolving it against the data root.
#[derive(Debug, Clone, PartialEq)]
enum Resolved {
    File(PathBuf),
    Url(String),
}

impl SourceFetcher {
    pub fn new(root: DataRoot) -> Self {
        Self {
            root,
            client: reqwest::Client::new(),
        }
    }

    fn resolve(&self, source: &DataSource) -> Resolved {
        if source.is_remote() {
            return Resolved::Url(source.location.clone());
        }
        match &self.root {
            DataRoot::Directory(dir) => Resolved::File(dir.join(&source.location)),
            DataRoot::BaseUrl(base) => Resolved::Url(format!(
                "{}/{}",
                base,
                source.location.trim_start_matches('/')
            )),
        }
    }

    async fn read_file(&self, source: &DataSource, path: PathBuf) -> Result<Vec<u8>, FetchError> {
        tokio::fs::read(&path)
            .await
            .map_err(|e| FetchError::Unreachable {
                source_name: source.name.clone(),
                location: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    async fn read_url(&self, source: &DataSource, url: String) -> Result<Vec<u8>, FetchError> {
        let fail = |reason: String| FetchError::Unreachable {
            source_name: source.name.clone(),
            location: url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fail(format!("status {}", response.status())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| fail(e.to_string()))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl DatasetFetcher for SourceFetcher {
    async fn fetch(&self, source: &DataSource) -> Result<serde_json::Value, FetchError> {
        let body = match self.resolve(source) {
            Resolved::File(path) => self.read_file(source, path).await?,
            Resolved::Url(url) => self.read_url(source, url).await?,
        };

        serde_json::from_slice(&body).map_err(|e| FetchError::InvalidPayload {
            source_name: source.name.clone(),
            reason: e.to_string(),
        })
    }
}

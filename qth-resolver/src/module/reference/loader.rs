//! Reference dataset loading
//!
//! The dataset comes from a local file or an http(s) URL. A failed load
//! is not fatal: callers get `None` and every classification degrades to
//! unknown labels.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::fs;
use tracing::{info, warn};

use super::types::{DatasetError, ReferenceDataset};

const REQUEST_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Url(String),
}

impl DatasetSource {
    /// `http://` and `https://` sources are fetched, everything else is
    /// treated as a path.
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            DatasetSource::Url(source.to_string())
        } else {
            DatasetSource::File(PathBuf::from(source))
        }
    }
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetSource::File(path) => write!(f, "{}", path.display()),
            DatasetSource::Url(url) => write!(f, "{}", url),
        }
    }
}

pub async fn load_dataset(source: &DatasetSource) -> Result<ReferenceDataset, DatasetError> {
    let json = match source {
        DatasetSource::File(path) => fs::read_to_string(path).await?,
        DatasetSource::Url(url) => fetch_text(url).await?,
    };
    ReferenceDataset::from_json(&json)
}

async fn fetch_text(url: &str) -> Result<String, DatasetError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
        .build()?;

    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(DatasetError::HttpStatus(response.status().as_u16()));
    }
    Ok(response.text().await?)
}

/// Load the dataset, logging and swallowing any failure.
pub async fn load_or_absent(source: &DatasetSource) -> Option<Arc<ReferenceDataset>> {
    match load_dataset(source).await {
        Ok(dataset) => {
            info!(
                "Loaded reference dataset v{} from {}: {} locations (last update {})",
                dataset.version(),
                source,
                dataset.len(),
                dataset.last_updated()
            );
            Some(Arc::new(dataset))
        }
        Err(e) => {
            warn!("Reference dataset unavailable ({}): {}", source, e);
            None
        }
    }
}

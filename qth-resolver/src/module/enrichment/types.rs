//! Enrichment data types

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Response has no usable '{0}' field")]
    MissingField(&'static str),

    #[error("No response within {0:?}")]
    Timeout(Duration),
}

/// Address parts extracted from a reverse-geocoding response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AddressComponents {
    /// Prefecture (`state`, falling back to `province`)
    pub region: Option<String>,
    /// Municipality (`city`, `town`, `village`, then `municipality`)
    pub locality: Option<String>,
    /// Ward or sub-district, e.g. "北区"
    pub city_district: Option<String>,
    pub full_address: Option<String>,
}

/// Outcome of one enrichment pass. `None` means the service was
/// unavailable for that field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Enrichment {
    pub elevation_m: Option<i32>,
    pub address: Option<AddressComponents>,
}

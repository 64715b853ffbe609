//! Elevation and reverse-geocoding lookups
//!
//! Both calls are optional extras on top of a sensor fix. Failures never
//! reach the orchestrator as errors; they come back as missing values.

mod gateway;
mod http;
mod types;

pub use gateway::{EnrichmentGateway, address_or_unavailable, elevation_or_unavailable, enrich};
pub use http::{HttpEnrichmentGateway, parse_address_response, parse_elevation_response};
pub use types::{AddressComponents, Enrichment, EnrichmentError};

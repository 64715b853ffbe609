//! HTTP enrichment clients
//!
//! Elevation comes from the GSI DEM service (`getelevation.php`), addresses
//! from a Nominatim reverse-geocoding endpoint.

use async_trait::async_trait;
use qth_common::Coordinate;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;

use super::gateway::EnrichmentGateway;
use super::types::{AddressComponents, EnrichmentError};
use crate::config::EnrichmentConfig;

pub struct HttpEnrichmentGateway {
    client: Client,
    elevation_url: String,
    geocoder_url: String,
    language: String,
}

impl HttpEnrichmentGateway {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, EnrichmentError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            elevation_url: config.elevation_url.clone(),
            geocoder_url: config.geocoder_url.clone(),
            language: config.language.clone(),
        })
    }

    async fn get_text(&self, url: Url) -> Result<String, EnrichmentError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(EnrichmentError::HttpStatus(response.status().as_u16()));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl EnrichmentGateway for HttpEnrichmentGateway {
    async fn fetch_elevation_meters(
        &self,
        coordinate: &Coordinate,
    ) -> Result<i32, EnrichmentError> {
        let url = Url::parse_with_params(
            &self.elevation_url,
            &[
                ("lon", coordinate.longitude_deg.to_string()),
                ("lat", coordinate.latitude_deg.to_string()),
                ("outtype", "JSON".to_string()),
            ],
        )
        .map_err(|e| EnrichmentError::InvalidUrl(e.to_string()))?;

        let body = self.get_text(url).await?;
        parse_elevation_response(&body)
    }

    async fn fetch_address_components(
        &self,
        coordinate: &Coordinate,
    ) -> Result<AddressComponents, EnrichmentError> {
        let url = Url::parse_with_params(
            &self.geocoder_url,
            &[
                ("format", "json".to_string()),
                ("lat", coordinate.latitude_deg.to_string()),
                ("lon", coordinate.longitude_deg.to_string()),
                ("accept-language", self.language.clone()),
            ],
        )
        .map_err(|e| EnrichmentError::InvalidUrl(e.to_string()))?;

        let body = self.get_text(url).await?;
        parse_address_response(&body)
    }
}

/// Elevation in whole meters from a DEM response.
///
/// Points outside the DEM coverage come back as `"-----"`, which counts
/// as missing.
pub fn parse_elevation_response(body: &str) -> Result<i32, EnrichmentError> {
    let json: Value = serde_json::from_str(body)?;
    let meters = match json.get("elevation") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match meters {
        Some(m) if m.is_finite() => Ok(m.round() as i32),
        _ => Err(EnrichmentError::MissingField("elevation")),
    }
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeResponse {
    display_name: Option<String>,
    address: Option<RawAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAddress {
    state: Option<String>,
    province: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    city_district: Option<String>,
}

/// First non-empty candidate, in precedence order.
fn first_present(candidates: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    candidates.into_iter().flatten().find(|s| !s.trim().is_empty())
}

pub fn parse_address_response(body: &str) -> Result<AddressComponents, EnrichmentError> {
    let response: ReverseGeocodeResponse = serde_json::from_str(body)?;
    let address = response.address.ok_or(EnrichmentError::MissingField("address"))?;

    Ok(AddressComponents {
        region: first_present([address.state, address.province]),
        locality: first_present([
            address.city,
            address.town,
            address.village,
            address.municipality,
        ]),
        city_district: address.city_district.filter(|s| !s.trim().is_empty()),
        full_address: response.display_name,
    })
}

use std::time::Duration;

use async_trait::async_trait;
use qth_common::Coordinate;
use tracing::{debug, warn};

use super::types::{AddressComponents, Enrichment, EnrichmentError};

/// Remote lookups that add detail to a sensor fix.
///
/// Implementations report failures; callers decide how to degrade.
#[async_trait]
pub trait EnrichmentGateway: Send + Sync {
    async fn fetch_elevation_meters(&self, coordinate: &Coordinate) -> Result<i32, EnrichmentError>;

    async fn fetch_address_components(
        &self,
        coordinate: &Coordinate,
    ) -> Result<AddressComponents, EnrichmentError>;
}

async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, EnrichmentError>
where
    F: Future<Output = Result<T, EnrichmentError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| EnrichmentError::Timeout(limit))?
}

/// Elevation in meters, or `None` on any failure including the timeout.
pub async fn elevation_or_unavailable(
    gateway: &dyn EnrichmentGateway,
    coordinate: &Coordinate,
    limit: Duration,
) -> Option<i32> {
    match with_timeout(limit, gateway.fetch_elevation_meters(coordinate)).await {
        Ok(meters) => {
            debug!("Elevation for {}: {}m", coordinate, meters);
            Some(meters)
        }
        Err(e) => {
            warn!("Elevation lookup failed for {}: {}", coordinate, e);
            None
        }
    }
}

/// Address components, or `None` on any failure including the timeout.
pub async fn address_or_unavailable(
    gateway: &dyn EnrichmentGateway,
    coordinate: &Coordinate,
    limit: Duration,
) -> Option<AddressComponents> {
    match with_timeout(limit, gateway.fetch_address_components(coordinate)).await {
        Ok(address) => {
            debug!("Address for {}: {:?}", coordinate, address);
            Some(address)
        }
        Err(e) => {
            warn!("Reverse geocoding failed for {}: {}", coordinate, e);
            None
        }
    }
}

/// Run both lookups. Each one fails independently of the other.
///
/// Sequential unless `parallel` is set, in which case total latency is the
/// slower of the two calls instead of their sum.
pub async fn enrich(
    gateway: &dyn EnrichmentGateway,
    coordinate: &Coordinate,
    limit: Duration,
    parallel: bool,
) -> Enrichment {
    if parallel {
        let (elevation_m, address) = futures::join!(
            elevation_or_unavailable(gateway, coordinate, limit),
            address_or_unavailable(gateway, coordinate, limit),
        );
        Enrichment { elevation_m, address }
    } else {
        let elevation_m = elevation_or_unavailable(gateway, coordinate, limit).await;
        let address = address_or_unavailable(gateway, coordinate, limit).await;
        Enrichment { elevation_m, address }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    struct FakeGateway {
        elevation: Result<i32, u16>,
        address: Option<AddressComponents>,
        delay: Duration,
    }

    #[async_trait]
    impl EnrichmentGateway for FakeGateway {
        async fn fetch_elevation_meters(&self, _: &Coordinate) -> Result<i32, EnrichmentError> {
            tokio::time::sleep(self.delay).await;
            self.elevation.map_err(EnrichmentError::HttpStatus)
        }

        async fn fetch_address_components(
            &self,
            _: &Coordinate,
        ) -> Result<AddressComponents, EnrichmentError> {
            tokio::time::sleep(self.delay).await;
            self.address.clone().ok_or(EnrichmentError::MissingField("address"))
        }
    }

    fn tokyo() -> Coordinate {
        Coordinate::new(35.681236, 139.767125)
    }

    #[tokio::test]
    async fn test_failures_are_independent() {
        let gateway = FakeGateway {
            elevation: Err(503),
            address: Some(AddressComponents {
                region: Some("東京都".to_string()),
                ..Default::default()
            }),
            delay: Duration::ZERO,
        };

        let result = enrich(&gateway, &tokyo(), Duration::from_secs(1), false).await;
        assert_eq!(result.elevation_m, None);
        assert_eq!(result.address.unwrap().region.as_deref(), Some("東京都"));
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let gateway = FakeGateway {
            elevation: Ok(10),
            address: Some(AddressComponents::default()),
            delay: Duration::from_millis(500),
        };

        let limit = Duration::from_millis(20);
        assert_eq!(elevation_or_unavailable(&gateway, &tokyo(), limit).await, None);
        assert_eq!(address_or_unavailable(&gateway, &tokyo(), limit).await, None);
    }

    #[tokio::test]
    async fn test_parallel_overlaps_calls() {
        let gateway = FakeGateway {
            elevation: Ok(40),
            address: Some(AddressComponents::default()),
            delay: Duration::from_millis(150),
        };

        let started = Instant::now();
        let result = enrich(&gateway, &tokyo(), Duration::from_secs(2), true).await;
        assert!(started.elapsed() < Duration::from_millis(290));
        assert_eq!(result.elevation_m, Some(40));
        assert!(result.address.is_some());

        let started = Instant::now();
        enrich(&gateway, &tokyo(), Duration::from_secs(2), false).await;
        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}

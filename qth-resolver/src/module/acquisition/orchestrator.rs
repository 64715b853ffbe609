use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use qth_common::{
    AcquisitionState, Elevation, FieldValue, QthSnapshot, ReferenceOffset, ResolvedLocation,
    SensorFix,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::register::{ResultRegister, StalePolicy};
use super::sensor::{FixRequest, LocationSensor, request_fix};
use crate::config::ResolverConfig;
use crate::module::call_area::call_area_for;
use crate::module::enrichment::{Enrichment, EnrichmentGateway, enrich};
use crate::module::geodesy::{
    bearing_to_compass_point, format_dms, grid_locator, initial_bearing_degrees,
};
use crate::module::reference::{
    LocalityLabels, ReferenceDataset, find_awards_by_locality, nearest,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrchestratorOptions {
    pub fix_request: FixRequest,
    /// Bound on each enrichment call
    pub enrichment_timeout: Duration,
    pub parallel_enrichment: bool,
    pub stale_policy: StalePolicy,
}

impl OrchestratorOptions {
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            fix_request: FixRequest::fresh(config.sensor.timeout()),
            enrichment_timeout: config.enrichment.timeout(),
            parallel_enrichment: config.enrichment.parallel,
            stale_policy: config.acquisition.stale_policy,
        }
    }
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            fix_request: FixRequest::default(),
            enrichment_timeout: Duration::from_secs(10),
            parallel_enrichment: false,
            stale_policy: StalePolicy::default(),
        }
    }
}

/// What one cycle ended with, whether or not the register accepted it.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    pub state: AcquisitionState,
    pub location: Option<Arc<ResolvedLocation>>,
    /// False when a newer cycle had already published
    pub published: bool,
}

/// Drives acquisition cycles: sensor fix, immediate offline result, then
/// enrichment when the network is reachable.
pub struct AcquisitionOrchestrator {
    sensor: Arc<dyn LocationSensor>,
    gateway: Arc<dyn EnrichmentGateway>,
    dataset: Option<Arc<ReferenceDataset>>,
    network: watch::Receiver<bool>,
    register: ResultRegister,
    last_cycle: AtomicU64,
    options: OrchestratorOptions,
}

impl AcquisitionOrchestrator {
    pub fn new(
        sensor: Arc<dyn LocationSensor>,
        gateway: Arc<dyn EnrichmentGateway>,
        dataset: Option<Arc<ReferenceDataset>>,
        network: watch::Receiver<bool>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            sensor,
            gateway,
            dataset,
            network,
            register: ResultRegister::new(options.stale_policy),
            last_cycle: AtomicU64::new(0),
            options,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<QthSnapshot> {
        self.register.subscribe()
    }

    pub fn latest(&self) -> QthSnapshot {
        self.register.latest()
    }

    pub fn dataset(&self) -> Option<&ReferenceDataset> {
        self.dataset.as_deref()
    }

    /// Start a new cycle and run it to a terminal state.
    ///
    /// Safe to call while an earlier cycle is still waiting on the sensor
    /// or a remote service; the register decides which results survive.
    pub async fn refetch(&self) -> CycleReport {
        let cycle = self.last_cycle.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Cycle {}: acquiring location", cycle);
        self.register.publish(cycle, AcquisitionState::Acquiring, None);

        let fix = match request_fix(self.sensor.as_ref(), &self.options.fix_request).await {
            Ok(fix) => fix,
            Err(e) => {
                warn!("Cycle {}: {}", cycle, e);
                let state = AcquisitionState::Failed(e);
                let published = self.register.publish(cycle, state.clone(), None);
                return CycleReport {
                    cycle,
                    state,
                    location: None,
                    published,
                };
            }
        };

        let partial = Arc::new(self.partial_result(&fix));
        debug!("Cycle {}: partial result {}", cycle, partial.grid_locator);
        self.register
            .publish(cycle, AcquisitionState::PartialResult, Some(partial.clone()));

        // Read once; later flips only affect the next cycle.
        let online = *self.network.borrow();

        let (state, location) = if online {
            self.register.publish(cycle, AcquisitionState::Enriching, None);
            let enrichment = enrich(
                self.gateway.as_ref(),
                &fix.coordinate,
                self.options.enrichment_timeout,
                self.options.parallel_enrichment,
            )
            .await;
            (
                AcquisitionState::Resolved,
                apply_enrichment(&partial, enrichment, self.dataset()),
            )
        } else {
            (AcquisitionState::OfflineEstimate, offline_estimate(&partial))
        };

        let location = Arc::new(location);
        let published = self
            .register
            .publish(cycle, state.clone(), Some(location.clone()));
        info!(
            "Cycle {}: {} ({}, {}, {})",
            cycle,
            state.status_message(),
            location.grid_locator,
            location.region,
            location.display_call_area()
        );

        CycleReport {
            cycle,
            state,
            location: Some(location),
            published,
        }
    }

    fn partial_result(&self, fix: &SensorFix) -> ResolvedLocation {
        let coordinate = fix.coordinate;
        let matched = self.dataset().and_then(|d| nearest(&coordinate, d.points()));

        let labels = matched
            .map(|m| LocalityLabels::from_point(m.point))
            .unwrap_or_else(LocalityLabels::unknown);
        let reference_offset = matched.map(|m| {
            let bearing_deg = initial_bearing_degrees(&coordinate, &m.point.coordinate);
            ReferenceOffset {
                distance_m: m.distance_m,
                bearing_deg,
                compass: bearing_to_compass_point(bearing_deg),
            }
        });

        let elevation = match fix.altitude_m {
            Some(altitude) => FieldValue::Known(Elevation::from_gps(altitude)),
            None => FieldValue::Pending,
        };
        let region = labels.region.into_estimated();

        ResolvedLocation {
            latitude: format_dms(coordinate.latitude_deg, true),
            longitude: format_dms(coordinate.longitude_deg, false),
            coordinate,
            grid_locator: grid_locator(coordinate.latitude_deg, coordinate.longitude_deg),
            elevation,
            call_area: call_area_of(&region),
            region,
            locality: labels.locality.into_estimated(),
            jcc: labels.jcc,
            jcg: labels.jcg,
            accuracy_m: fix.accuracy_m,
            reference_offset,
            fetched_at: fix.timestamp,
        }
    }
}

fn call_area_of(region: &FieldValue<String>) -> Option<u8> {
    region.value().and_then(|name| call_area_for(name))
}

/// Elevation once the service has answered (or failed): the service value,
/// else the sensor altitude, else unavailable.
fn settle_elevation(
    current: &FieldValue<Elevation>,
    service_m: Option<i32>,
) -> FieldValue<Elevation> {
    match (service_m, current) {
        (Some(meters), _) => FieldValue::Known(Elevation::from_service(meters)),
        (None, FieldValue::Known(gps)) => FieldValue::Known(*gps),
        (None, _) => FieldValue::Unavailable,
    }
}

/// Fold enrichment results into the partial result. A failed or empty
/// geocode leaves region and locality as they were.
fn apply_enrichment(
    partial: &ResolvedLocation,
    enrichment: Enrichment,
    dataset: Option<&ReferenceDataset>,
) -> ResolvedLocation {
    let mut resolved = partial.clone();
    resolved.elevation = settle_elevation(&partial.elevation, enrichment.elevation_m);

    if let Some(address) = enrichment.address {
        if let Some(region) = address.region {
            resolved.region = FieldValue::Known(region);
        }
        if let Some(locality) = address.locality {
            if let Some(region) = resolved.region.value() {
                let awards = find_awards_by_locality(region, &locality, dataset);
                if awards.jcc.is_known() {
                    resolved.jcc = awards.jcc;
                    resolved.jcg = awards.jcg;
                }
            }
            resolved.locality = FieldValue::Known(locality);
        }
    }

    resolved.call_area = call_area_of(&resolved.region);
    resolved.fetched_at = Utc::now();
    resolved
}

fn offline_estimate(partial: &ResolvedLocation) -> ResolvedLocation {
    let mut estimate = partial.clone();
    estimate.elevation = settle_elevation(&partial.elevation, None);
    estimate
}

//! End-to-end acquisition cycles against scripted sensors and gateways.
//!
//! Run with: `cargo test --test acquisition_integration`

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use qth_common::{
    AcquisitionState, Coordinate, Elevation, FieldValue, ReferencePoint, SensorError, SensorFix,
};
use qth_resolver::module::acquisition::{
    AcquisitionOrchestrator, FixRequest, LocationSensor, NetworkMonitor, OrchestratorOptions,
    StalePolicy,
};
use qth_resolver::module::enrichment::{
    AddressComponents, EnrichmentError, EnrichmentGateway, parse_elevation_response,
};
use qth_resolver::module::reference::ReferenceDataset;

// ============================================================================
// Test Helpers
// ============================================================================

/// One scripted sensor answer, optionally held back until `gate` fires.
struct ScriptedFix {
    gate: Option<Arc<Notify>>,
    result: Result<SensorFix, SensorError>,
}

/// Sensor that replays its script in order, one entry per request.
struct ScriptedSensor {
    script: Mutex<VecDeque<ScriptedFix>>,
}

impl ScriptedSensor {
    fn new(script: Vec<ScriptedFix>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
        })
    }

    fn always(result: Result<SensorFix, SensorError>) -> Arc<Self> {
        Self::new(vec![ScriptedFix { gate: None, result }])
    }
}

#[async_trait]
impl LocationSensor for ScriptedSensor {
    async fn current_fix(&self, _request: &FixRequest) -> Result<SensorFix, SensorError> {
        let next = self.script.lock().unwrap().pop_front();
        let Some(next) = next else {
            return Err(SensorError::Unknown("script exhausted".to_string()));
        };
        if let Some(gate) = next.gate {
            gate.notified().await;
        }
        next.result
    }
}

/// Gateway with canned response bodies and per-call delays. When `gate`
/// is set, the elevation call waits for it before answering.
struct FakeGateway {
    elevation_body: Option<&'static str>,
    address: Option<AddressComponents>,
    address_delay: Duration,
    gate: Option<Arc<Notify>>,
}

impl FakeGateway {
    fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            elevation_body: None,
            address: None,
            address_delay: Duration::ZERO,
            gate: None,
        })
    }
}

#[async_trait]
impl EnrichmentGateway for FakeGateway {
    async fn fetch_elevation_meters(&self, _: &Coordinate) -> Result<i32, EnrichmentError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.elevation_body {
            Some(body) => parse_elevation_response(body),
            None => Err(EnrichmentError::HttpStatus(503)),
        }
    }

    async fn fetch_address_components(
        &self,
        _: &Coordinate,
    ) -> Result<AddressComponents, EnrichmentError> {
        tokio::time::sleep(self.address_delay).await;
        self.address.clone().ok_or(EnrichmentError::HttpStatus(503))
    }
}

fn osaka_dataset() -> Arc<ReferenceDataset> {
    Arc::new(ReferenceDataset::new(
        "1.0",
        "2025-01-01",
        vec![ReferencePoint {
            coordinate: Coordinate::new(35.0, 135.0),
            region: "Osaka".to_string(),
            locality: "Osaka".to_string(),
            jcc: "2501".to_string(),
            jcg: String::new(),
        }],
    ))
}

fn build(
    sensor: Arc<ScriptedSensor>,
    gateway: Arc<FakeGateway>,
    dataset: Option<Arc<ReferenceDataset>>,
    network: &NetworkMonitor,
    options: OrchestratorOptions,
) -> Arc<AcquisitionOrchestrator> {
    Arc::new(AcquisitionOrchestrator::new(
        sensor,
        gateway,
        dataset,
        network.subscribe(),
        options,
    ))
}

fn fix_at(lat: f64, lon: f64) -> SensorFix {
    SensorFix::new(Coordinate::new(lat, lon))
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_no_dataset_offline() {
    let network = NetworkMonitor::new(false);
    let orchestrator = build(
        ScriptedSensor::always(Ok(fix_at(35.0, 135.0))),
        FakeGateway::unreachable(),
        None,
        &network,
        OrchestratorOptions::default(),
    );

    let report = orchestrator.refetch().await;
    assert_eq!(report.state, AcquisitionState::OfflineEstimate);

    let location = report.location.unwrap();
    assert_eq!(location.grid_locator, "PM75ma");
    assert_eq!(location.latitude, "35°0'0.00\" N");
    assert_eq!(location.longitude, "135°0'0.00\" E");
    assert_eq!(location.region, FieldValue::Unknown);
    assert_eq!(location.locality, FieldValue::Unknown);
    assert_eq!(location.jcc, FieldValue::Unknown);
    assert_eq!(location.jcg, FieldValue::Unknown);
    assert_eq!(location.elevation, FieldValue::Unavailable);
    assert_eq!(location.display_call_area(), "---");
    assert!(location.reference_offset.is_none());
}

#[tokio::test]
async fn test_no_dataset_with_gps_altitude() {
    let network = NetworkMonitor::new(false);
    let orchestrator = build(
        ScriptedSensor::always(Ok(fix_at(35.0, 135.0).with_altitude(102.4))),
        FakeGateway::unreachable(),
        None,
        &network,
        OrchestratorOptions::default(),
    );

    let location = orchestrator.refetch().await.location.unwrap();
    assert_eq!(location.elevation, FieldValue::Known(Elevation::from_gps(102.4)));
    assert_eq!(location.elevation.to_string(), "102m (GPS)");
}

#[tokio::test]
async fn test_offline_estimate_from_dataset() {
    let network = NetworkMonitor::new(false);
    let orchestrator = build(
        ScriptedSensor::always(Ok(fix_at(35.0, 135.0))),
        FakeGateway::unreachable(),
        Some(osaka_dataset()),
        &network,
        OrchestratorOptions::default(),
    );

    let report = orchestrator.refetch().await;
    assert_eq!(report.state, AcquisitionState::OfflineEstimate);

    let location = report.location.unwrap();
    assert_eq!(location.region, FieldValue::Estimated("Osaka".to_string()));
    assert_eq!(location.region.to_string(), "Osaka (estimated)");
    assert_eq!(location.elevation, FieldValue::Unavailable);
    assert_eq!(location.elevation.to_string(), "unobtainable");
    assert_eq!(location.jcc, FieldValue::Known("2501".to_string()));
    assert_eq!(location.jcg, FieldValue::Unknown);
    assert_eq!(location.display_call_area(), "JA3");
    assert_eq!(location.reference_offset.unwrap().distance_m, 0.0);
    assert_eq!(orchestrator.latest().status_message(), "Offline mode: showing estimated values");
}

#[tokio::test]
async fn test_elevation_rounds_and_geocode_timeout_keeps_estimates() {
    let network = NetworkMonitor::new(true);
    let gateway = Arc::new(FakeGateway {
        elevation_body: Some(r#"{"elevation":42.3,"hsrc":"5m（レーザ）"}"#),
        address: Some(AddressComponents {
            region: Some("大阪府".to_string()),
            locality: Some("大阪市".to_string()),
            ..Default::default()
        }),
        address_delay: Duration::from_secs(5),
        gate: None,
    });
    let options = OrchestratorOptions {
        enrichment_timeout: Duration::from_millis(100),
        ..Default::default()
    };
    let orchestrator = build(
        ScriptedSensor::always(Ok(fix_at(35.0, 135.0))),
        gateway,
        Some(osaka_dataset()),
        &network,
        options,
    );

    let report = orchestrator.refetch().await;
    assert_eq!(report.state, AcquisitionState::Resolved);

    let location = report.location.unwrap();
    assert_eq!(location.elevation, FieldValue::Known(Elevation::from_service(42)));
    assert_eq!(location.elevation.to_string(), "42m");
    assert_eq!(location.region, FieldValue::Estimated("Osaka".to_string()));
    assert_eq!(location.locality, FieldValue::Estimated("Osaka".to_string()));
    assert_eq!(orchestrator.latest().status_message(), "Location acquired");
}

#[tokio::test]
async fn test_permission_denied() {
    let network = NetworkMonitor::new(true);
    let orchestrator = build(
        ScriptedSensor::always(Err(SensorError::PermissionDenied)),
        FakeGateway::unreachable(),
        Some(osaka_dataset()),
        &network,
        OrchestratorOptions::default(),
    );

    let report = orchestrator.refetch().await;
    assert_eq!(report.state, AcquisitionState::Failed(SensorError::PermissionDenied));
    assert!(report.location.is_none());

    let snapshot = orchestrator.latest();
    assert_eq!(snapshot.status_message(), "Location permission denied");
    assert!(snapshot.location.is_none());
}

#[tokio::test]
async fn test_partial_result_visible_during_enrichment() {
    let network = NetworkMonitor::new(true);
    let gate = Arc::new(Notify::new());
    let gateway = Arc::new(FakeGateway {
        elevation_body: Some(r#"{"elevation":12.0}"#),
        address: None,
        address_delay: Duration::ZERO,
        gate: Some(gate.clone()),
    });
    let orchestrator = build(
        ScriptedSensor::always(Ok(fix_at(35.0, 135.0))),
        gateway,
        Some(osaka_dataset()),
        &network,
        OrchestratorOptions::default(),
    );
    let mut rx = orchestrator.subscribe();

    let task = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.refetch().await }
    });

    // The elevation call is held, so the cycle parks in Enriching.
    rx.wait_for(|s| s.state == AcquisitionState::Enriching)
        .await
        .unwrap();

    let snapshot = orchestrator.latest();
    assert!(matches!(
        snapshot.state,
        AcquisitionState::PartialResult | AcquisitionState::Enriching
    ));
    assert_eq!(snapshot.status_message(), "Fetching details...");
    let partial = snapshot.location.expect("partial result published");
    assert_eq!(partial.grid_locator, "PM75ma");
    assert_eq!(partial.region, FieldValue::Estimated("Osaka".to_string()));
    assert_eq!(partial.elevation, FieldValue::Pending);
    assert_eq!(partial.elevation.to_string(), "fetching...");

    gate.notify_one();
    let report = task.await.unwrap();
    assert_eq!(report.state, AcquisitionState::Resolved);
    assert_eq!(
        report.location.unwrap().elevation,
        FieldValue::Known(Elevation::from_service(12))
    );
}

// ============================================================================
// Overlapping cycles
// ============================================================================

/// Cycle 1 stalls on the sensor while cycle 2 completes, then cycle 1
/// finishes last.
async fn run_overlapping(policy: StalePolicy) -> (Arc<AcquisitionOrchestrator>, bool) {
    let gate = Arc::new(Notify::new());
    let sensor = ScriptedSensor::new(vec![
        ScriptedFix {
            gate: Some(gate.clone()),
            result: Ok(fix_at(35.0, 135.0)),
        },
        ScriptedFix {
            gate: None,
            result: Ok(fix_at(43.0621, 141.3544)),
        },
    ]);
    let network = NetworkMonitor::new(false);
    let options = OrchestratorOptions {
        stale_policy: policy,
        ..Default::default()
    };
    let orchestrator = build(sensor, FakeGateway::unreachable(), None, &network, options);
    let mut rx = orchestrator.subscribe();

    let first = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.refetch().await }
    });
    // cycle 1 has taken its scripted fix once it announces Acquiring
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().cycle, 1);

    let second = orchestrator.refetch().await;
    assert_eq!(second.cycle, 2);
    assert!(second.published);

    gate.notify_one();
    let first = first.await.unwrap();
    assert_eq!(first.cycle, 1);
    assert_eq!(first.state, AcquisitionState::OfflineEstimate);

    (orchestrator, first.published)
}

#[tokio::test]
async fn test_stale_cycle_is_dropped() {
    let (orchestrator, published) = run_overlapping(StalePolicy::DropStale).await;
    assert!(!published);

    let snapshot = orchestrator.latest();
    assert_eq!(snapshot.cycle, 2);
    assert_eq!(snapshot.location.unwrap().coordinate, Coordinate::new(43.0621, 141.3544));
}

#[tokio::test]
async fn test_last_writer_wins() {
    let (orchestrator, published) = run_overlapping(StalePolicy::LastWriterWins).await;
    assert!(published);

    let snapshot = orchestrator.latest();
    assert_eq!(snapshot.cycle, 1);
    assert_eq!(snapshot.location.unwrap().coordinate, Coordinate::new(35.0, 135.0));
}

// ============================================================================
// Reachability
// ============================================================================

#[tokio::test]
async fn test_reachability_applies_to_next_cycle() {
    let network = NetworkMonitor::new(false);
    let gateway = Arc::new(FakeGateway {
        elevation_body: Some(r#"{"elevation":"8.6"}"#),
        address: None,
        address_delay: Duration::ZERO,
        gate: None,
    });
    let sensor = ScriptedSensor::new(vec![
        ScriptedFix {
            gate: None,
            result: Ok(fix_at(35.0, 135.0)),
        },
        ScriptedFix {
            gate: None,
            result: Ok(fix_at(35.0, 135.0)),
        },
    ]);
    let orchestrator = build(
        sensor,
        gateway,
        Some(osaka_dataset()),
        &network,
        OrchestratorOptions::default(),
    );

    let offline = orchestrator.refetch().await.location.unwrap();
    assert_eq!(offline.elevation, FieldValue::Unavailable);

    assert!(network.set_online(true));
    // already-published result is untouched
    assert_eq!(orchestrator.latest().location.unwrap().elevation, FieldValue::Unavailable);

    let report = orchestrator.refetch().await;
    assert_eq!(report.state, AcquisitionState::Resolved);
    assert_eq!(report.location.unwrap().elevation, FieldValue::Known(Elevation::from_service(9)));
}

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field::FieldValue;
use crate::types::{CompassPoint, Coordinate, SensorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevationSource {
    /// Elevation service (DEM lookup)
    Service,
    /// Altitude reported by the location sensor
    Gps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elevation {
    pub meters: i32,
    pub source: ElevationSource,
}

impl Elevation {
    pub fn from_service(meters: i32) -> Self {
        Self {
            meters,
            source: ElevationSource::Service,
        }
    }

    /// Sensor altitude, rounded to the nearest meter.
    pub fn from_gps(altitude_m: f64) -> Self {
        Self {
            meters: altitude_m.round() as i32,
            source: ElevationSource::Gps,
        }
    }
}

impl std::fmt::Display for Elevation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.source {
            ElevationSource::Service => write!(f, "{}m", self.meters),
            ElevationSource::Gps => write!(f, "{}m (GPS)", self.meters),
        }
    }
}

/// Distance and direction from the query position to the matched
/// reference point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceOffset {
    pub distance_m: f64,
    pub bearing_deg: f64,
    pub compass: CompassPoint,
}

/// Resolved QTH for one acquisition cycle.
///
/// Snapshots are handed out behind an `Arc` and never edited; a later
/// stage of the same cycle builds a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    /// Latitude in DMS, e.g. `35°40'52.45" N`
    pub latitude: String,
    /// Longitude in DMS
    pub longitude: String,
    pub coordinate: Coordinate,
    /// 6-character Maidenhead locator
    pub grid_locator: String,
    pub elevation: FieldValue<Elevation>,
    pub region: FieldValue<String>,
    pub locality: FieldValue<String>,
    pub jcc: FieldValue<String>,
    pub jcg: FieldValue<String>,
    /// JA call area digit (0-8)
    pub call_area: Option<u8>,
    pub accuracy_m: Option<f64>,
    pub reference_offset: Option<ReferenceOffset>,
    pub fetched_at: DateTime<Utc>,
}

impl ResolvedLocation {
    pub fn display_call_area(&self) -> String {
        match self.call_area {
            Some(area) => format!("JA{}", area),
            None => "---".to_string(),
        }
    }

    pub fn display_accuracy(&self) -> String {
        match self.accuracy_m {
            Some(accuracy) => format!("±{}m", accuracy.round() as i64),
            None => "---".to_string(),
        }
    }
}

/// Where a cycle is in the acquisition state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum AcquisitionState {
    Idle,
    Acquiring,
    PartialResult,
    Enriching,
    Resolved,
    OfflineEstimate,
    Failed(SensorError),
}

impl AcquisitionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AcquisitionState::Resolved
                | AcquisitionState::OfflineEstimate
                | AcquisitionState::Failed(_)
        )
    }

    /// Status line shown to the user.
    pub fn status_message(&self) -> &'static str {
        match self {
            AcquisitionState::Idle => "Waiting for location request",
            AcquisitionState::Acquiring => "Acquiring location...",
            AcquisitionState::PartialResult | AcquisitionState::Enriching => "Fetching details...",
            AcquisitionState::Resolved => "Location acquired",
            AcquisitionState::OfflineEstimate => "Offline mode: showing estimated values",
            AcquisitionState::Failed(e) => e.status_message(),
        }
    }
}

/// What consumers observe: the latest accepted cycle, its state and the
/// most recent location result (which may come from an earlier cycle when
/// the current one failed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QthSnapshot {
    pub cycle: u64,
    pub state: AcquisitionState,
    pub location: Option<Arc<ResolvedLocation>>,
}

impl QthSnapshot {
    pub fn idle() -> Self {
        Self {
            cycle: 0,
            state: AcquisitionState::Idle,
            location: None,
        }
    }

    pub fn status_message(&self) -> &'static str {
        self.state.status_message()
    }
}

impl Default for QthSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}

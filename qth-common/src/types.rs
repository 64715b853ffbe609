use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude_deg: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude_deg: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl Coordinate {
    /// Build a coordinate without range checks. Callers that take
    /// values from outside the process should use [`Coordinate::try_new`].
    pub const fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }

    pub fn try_new(latitude_deg: f64, longitude_deg: f64) -> Result<Self, CoordinateError> {
        // NaN fails both range checks
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude_deg));
        }
        if !(-180.0..=180.0).contains(&longitude_deg) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude_deg));
        }
        Ok(Self::new(latitude_deg, longitude_deg))
    }

    pub fn is_valid(&self) -> bool {
        Self::try_new(self.latitude_deg, self.longitude_deg).is_ok()
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude_deg, self.longitude_deg)
    }
}

/// One labeled locality from the reference dataset.
///
/// `(region, locality)` pairs are not unique; the classifier only cares
/// about distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub coordinate: Coordinate,
    /// Prefecture name, e.g. "大阪府"
    pub region: String,
    /// City / ward / town name
    pub locality: String,
    /// JARL Century Cities award number
    pub jcc: String,
    /// JARL Century Guns award number
    pub jcg: String,
}

/// Eight-way compass point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassPoint {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassPoint {
    /// Clockwise from north.
    pub const ALL: [CompassPoint; 8] = [
        CompassPoint::N,
        CompassPoint::NE,
        CompassPoint::E,
        CompassPoint::SE,
        CompassPoint::S,
        CompassPoint::SW,
        CompassPoint::W,
        CompassPoint::NW,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompassPoint::N => "N",
            CompassPoint::NE => "NE",
            CompassPoint::E => "E",
            CompassPoint::SE => "SE",
            CompassPoint::S => "S",
            CompassPoint::SW => "SW",
            CompassPoint::W => "W",
            CompassPoint::NW => "NW",
        }
    }
}

impl std::fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single reading from the location sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorFix {
    pub coordinate: Coordinate,
    /// Horizontal accuracy radius in meters
    pub accuracy_m: Option<f64>,
    /// Altitude above sea level in meters, when the receiver reports one
    pub altitude_m: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl SensorFix {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            accuracy_m: None,
            altitude_m: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }

    pub fn with_altitude(mut self, altitude_m: f64) -> Self {
        self.altitude_m = Some(altitude_m);
        self
    }
}

/// Why a fix request failed. Fatal to the cycle that issued it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum SensorError {
    #[error("location permission was refused")]
    PermissionDenied,
    #[error("position is unavailable")]
    PositionUnavailable,
    #[error("timed out waiting for a position fix")]
    Timeout,
    #[error("sensor error: {0}")]
    Unknown(String),
}

impl SensorError {
    /// User-facing status line for this category.
    pub fn status_message(&self) -> &'static str {
        match self {
            SensorError::PermissionDenied => "Location permission denied",
            SensorError::PositionUnavailable => "Position unavailable",
            SensorError::Timeout => "Location request timed out",
            SensorError::Unknown(_) => "An error occurred",
        }
    }
}

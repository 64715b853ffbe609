use std::time::Duration;

use async_trait::async_trait;
use qth_common::{Coordinate, SensorError, SensorFix};

use crate::config::SensorConfig;

/// Parameters of a one-shot fix request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixRequest {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the sensor may return. Zero forces a fresh reading.
    pub maximum_age: Duration,
}

impl FixRequest {
    pub fn fresh(timeout: Duration) -> Self {
        Self {
            high_accuracy: true,
            timeout,
            maximum_age: Duration::ZERO,
        }
    }
}

impl Default for FixRequest {
    fn default() -> Self {
        Self::fresh(Duration::from_secs(10))
    }
}

#[async_trait]
pub trait LocationSensor: Send + Sync {
    async fn current_fix(&self, request: &FixRequest) -> Result<SensorFix, SensorError>;
}

/// Ask the sensor for a fix, giving up with [`SensorError::Timeout`] once
/// `request.timeout` has passed. Sensors that ignore the timeout field
/// cannot stall a cycle.
pub async fn request_fix(
    sensor: &dyn LocationSensor,
    request: &FixRequest,
) -> Result<SensorFix, SensorError> {
    tokio::time::timeout(request.timeout, sensor.current_fix(request))
        .await
        .unwrap_or(Err(SensorError::Timeout))
}

/// Sensor that reports the position from the config file.
#[derive(Debug, Clone)]
pub struct FixedSensor {
    position: Option<Coordinate>,
    accuracy_m: Option<f64>,
    altitude_m: Option<f64>,
}

impl FixedSensor {
    pub fn new(position: Option<Coordinate>) -> Self {
        Self {
            position,
            accuracy_m: None,
            altitude_m: None,
        }
    }

    pub fn from_config(config: &SensorConfig) -> Result<Self, qth_common::CoordinateError> {
        let position = match (config.latitude, config.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::try_new(lat, lon)?),
            _ => None,
        };
        Ok(Self {
            position,
            accuracy_m: config.accuracy_m,
            altitude_m: config.altitude_m,
        })
    }
}

#[async_trait]
impl LocationSensor for FixedSensor {
    async fn current_fix(&self, _request: &FixRequest) -> Result<SensorFix, SensorError> {
        let coordinate = self.position.ok_or(SensorError::PositionUnavailable)?;
        Ok(SensorFix {
            accuracy_m: self.accuracy_m,
            altitude_m: self.altitude_m,
            ..SensorFix::new(coordinate)
        })
    }
}

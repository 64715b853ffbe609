//! Reference dataset types

use chrono::NaiveDate;
use qth_common::{Coordinate, CoordinateError, ReferencePoint};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to fetch dataset: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Dataset request returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Failed to parse dataset JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Location #{index} has an invalid coordinate: {source}")]
    InvalidPoint {
        index: usize,
        source: CoordinateError,
    },
}

/// One entry of `location-data.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRecord {
    pub lat: f64,
    pub lon: f64,
    pub prefecture: String,
    pub city: String,
    #[serde(default)]
    pub jcc: String,
    #[serde(default)]
    pub jcg: String,
}

/// On-disk layout of `location-data.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetFile {
    pub version: String,
    pub last_update: String,
    pub locations: Vec<LocationRecord>,
}

/// Immutable collection of labeled reference points.
///
/// Built once at startup and shared behind an `Arc`; nothing mutates it
/// afterwards, so readers need no locking.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDataset {
    format_version: String,
    last_updated: String,
    points: Vec<ReferencePoint>,
}

impl ReferenceDataset {
    pub fn new(
        format_version: impl Into<String>,
        last_updated: impl Into<String>,
        points: Vec<ReferencePoint>,
    ) -> Self {
        Self {
            format_version: format_version.into(),
            last_updated: last_updated.into(),
            points,
        }
    }

    /// Parse and validate a dataset document. Any invalid entry rejects the
    /// whole document.
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let file: DatasetFile = serde_json::from_str(json)?;
        Self::try_from(file)
    }

    pub fn version(&self) -> &str {
        &self.format_version
    }

    pub fn last_updated(&self) -> &str {
        &self.last_updated
    }

    /// `lastUpdate` as a calendar date, when it is ISO formatted.
    pub fn last_updated_date(&self) -> Option<NaiveDate> {
        let date_part = self.last_updated.get(..10)?;
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }

    pub fn points(&self) -> &[ReferencePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl TryFrom<DatasetFile> for ReferenceDataset {
    type Error = DatasetError;

    fn try_from(file: DatasetFile) -> Result<Self, Self::Error> {
        let points = file
            .locations
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let coordinate = Coordinate::try_new(record.lat, record.lon)
                    .map_err(|source| DatasetError::InvalidPoint { index, source })?;
                Ok(ReferencePoint {
                    coordinate,
                    region: record.prefecture,
                    locality: record.city,
                    jcc: record.jcc,
                    jcg: record.jcg,
                })
            })
            .collect::<Result<Vec<_>, DatasetError>>()?;

        Ok(Self::new(file.version, file.last_update, points))
    }
}

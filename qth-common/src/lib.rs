//! Shared data model for the QTH resolver.
//!
//! Everything a consumer of a resolution cycle sees lives here: coordinates,
//! reference points, tagged field values and the published snapshot.

pub mod field;
pub mod location;
pub mod types;

pub use field::FieldValue;
pub use location::{
    AcquisitionState, Elevation, ElevationSource, QthSnapshot, ReferenceOffset, ResolvedLocation,
};
pub use types::{
    CompassPoint, Coordinate, CoordinateError, ReferencePoint, SensorError, SensorFix,
};

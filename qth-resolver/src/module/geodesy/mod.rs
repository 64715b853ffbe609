//! Geodesy kernel
//!
//! Pure coordinate math: DMS formatting, Maidenhead locators, great-circle
//! distance and bearings. No state, no I/O.

mod format;
mod great_circle;
mod locator;

pub use format::{DmsParts, format_dms};
pub use great_circle::{
    EARTH_RADIUS_M, bearing_to_compass_point, haversine_distance_meters, initial_bearing_degrees,
};
pub use locator::grid_locator;

use qth_common::{CompassPoint, Coordinate};

/// Mean Earth radius used for all distance calculations.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters on a sphere of radius [`EARTH_RADIUS_M`].
pub fn haversine_distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi1 = a.latitude_deg.to_radians();
    let phi2 = b.latitude_deg.to_radians();
    let d_phi = (b.latitude_deg - a.latitude_deg).to_radians();
    let d_lambda = (b.longitude_deg - a.longitude_deg).to_radians();

    let sin_d_phi = (d_phi / 2.0).sin();
    let sin_d_lambda = (d_lambda / 2.0).sin();
    let h = sin_d_phi * sin_d_phi + phi1.cos() * phi2.cos() * sin_d_lambda * sin_d_lambda;

    // Rounding can push h slightly past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Forward azimuth from `a` to `b` in degrees, normalized to [0, 360).
///
/// Returns 0 when the two points coincide.
pub fn initial_bearing_degrees(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi1 = a.latitude_deg.to_radians();
    let phi2 = b.latitude_deg.to_radians();
    let d_lambda = (b.longitude_deg - a.longitude_deg).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();

    let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid of a tiny negative rounds up to exactly 360.0
    if bearing >= 360.0 { 0.0 } else { bearing }
}

/// Nearest of the eight compass points.
pub fn bearing_to_compass_point(bearing_deg: f64) -> CompassPoint {
    let index = ((bearing_deg / 45.0).round() as i64).rem_euclid(8) as usize;
    CompassPoint::ALL[index]
}

/// 6-character Maidenhead grid locator (field, square, subsquare).
///
/// Longitude is shifted into [0, 360) and latitude into [0, 180). The
/// shift wraps, so longitude +180 encodes like -180 and latitude +90 like
/// -90 instead of running past field `R`.
pub fn grid_locator(latitude_deg: f64, longitude_deg: f64) -> String {
    let lon = (longitude_deg + 180.0).rem_euclid(360.0);
    let lat = (latitude_deg + 90.0).rem_euclid(180.0);

    // Field: 20° x 10°
    let field_lon = index(lon / 20.0, 18);
    let field_lat = index(lat / 10.0, 18);

    // Square: 2° x 1°
    let lon = lon % 20.0;
    let lat = lat % 10.0;
    let square_lon = index(lon / 2.0, 10);
    let square_lat = index(lat, 10);

    // Subsquare: 5' x 2.5'
    let sub_lon = index((lon % 2.0) * 60.0 / 5.0, 24);
    let sub_lat = index((lat % 1.0) * 60.0 / 2.5, 24);

    let mut locator = String::with_capacity(6);
    locator.push((b'A' + field_lon) as char);
    locator.push((b'A' + field_lat) as char);
    locator.push((b'0' + square_lon) as char);
    locator.push((b'0' + square_lat) as char);
    locator.push((b'a' + sub_lon) as char);
    locator.push((b'a' + sub_lat) as char);
    locator
}

/// Floor into `0..count`. The clamp only matters for values that float
/// rounding lands exactly on the upper edge.
fn index(value: f64, count: u8) -> u8 {
    (value.floor() as i64).clamp(0, count as i64 - 1) as u8
}

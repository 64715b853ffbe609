/// Hundredths of an arc-second per degree.
const CENTISECONDS_PER_DEGREE: f64 = 360_000.0;

/// A decimal degree value split into degrees, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DmsParts {
    pub degrees: u32,
    pub minutes: u32,
    /// Rounded to 1/100 second, always in [0, 60)
    pub seconds: f64,
    /// 'N'/'S' for latitude, 'E'/'W' for longitude
    pub hemisphere: char,
}

impl DmsParts {
    pub fn from_decimal(value: f64, is_latitude: bool) -> Self {
        let hemisphere = match (is_latitude, value >= 0.0) {
            (true, true) => 'N',
            (true, false) => 'S',
            (false, true) => 'E',
            (false, false) => 'W',
        };

        // Round once on the whole value so a 59.995" second carries into
        // the minute instead of printing as 60.00.
        let total = (value.abs() * CENTISECONDS_PER_DEGREE).round() as u64;
        let degrees = (total / 360_000) as u32;
        let minutes = ((total % 360_000) / 6_000) as u32;
        let seconds = (total % 6_000) as f64 / 100.0;

        Self {
            degrees,
            minutes,
            seconds,
            hemisphere,
        }
    }

    /// Signed decimal degrees.
    pub fn to_decimal(&self) -> f64 {
        let magnitude = self.degrees as f64 + self.minutes as f64 / 60.0 + self.seconds / 3600.0;
        match self.hemisphere {
            'S' | 'W' => -magnitude,
            _ => magnitude,
        }
    }
}

impl std::fmt::Display for DmsParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}°{}'{:.2}\" {}",
            self.degrees, self.minutes, self.seconds, self.hemisphere
        )
    }
}

/// Format decimal degrees as `{deg}°{min}'{sec}" {hemisphere}`.
///
/// Zero counts as the positive hemisphere (N / E).
pub fn format_dms(value: f64, is_latitude: bool) -> String {
    DmsParts::from_decimal(value, is_latitude).to_string()
}

use serde::{Deserialize, Serialize};

/// A result field together with where it came from.
///
/// Consumers match on the variant instead of comparing placeholder strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum FieldValue<T> {
    /// Authoritative value (geocoded, measured, or a dataset fact)
    Known(T),
    /// Derived from the offline dataset, not geocoded
    Estimated(T),
    /// Enrichment still in flight
    Pending,
    /// No data exists for this field
    Unknown,
    /// The source was unreachable or failed
    Unavailable,
}

impl<T> FieldValue<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            FieldValue::Known(v) | FieldValue::Estimated(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            FieldValue::Known(v) | FieldValue::Estimated(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, FieldValue::Known(_))
    }

    pub fn is_estimated(&self) -> bool {
        matches!(self, FieldValue::Estimated(_))
    }

    /// Downgrade a known value to an estimate. Other variants are unchanged.
    pub fn into_estimated(self) -> Self {
        match self {
            FieldValue::Known(v) => FieldValue::Estimated(v),
            other => other,
        }
    }

    pub fn as_ref(&self) -> FieldValue<&T> {
        match self {
            FieldValue::Known(v) => FieldValue::Known(v),
            FieldValue::Estimated(v) => FieldValue::Estimated(v),
            FieldValue::Pending => FieldValue::Pending,
            FieldValue::Unknown => FieldValue::Unknown,
            FieldValue::Unavailable => FieldValue::Unavailable,
        }
    }
}

impl<T> From<Option<T>> for FieldValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => FieldValue::Known(v),
            None => FieldValue::Unknown,
        }
    }
}

impl<T: std::fmt::Display> std::fmt::Display for FieldValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Known(v) => write!(f, "{}", v),
            FieldValue::Estimated(v) => write!(f, "{} (estimated)", v),
            FieldValue::Pending => write!(f, "fetching..."),
            FieldValue::Unknown => write!(f, "unknown"),
            FieldValue::Unavailable => write!(f, "unobtainable"),
        }
    }
}

//! Nearest-neighbor classification against the reference dataset

use qth_common::{Coordinate, FieldValue, ReferencePoint};

use super::types::ReferenceDataset;
use crate::module::geodesy::haversine_distance_meters;

/// The four labels a reference point carries.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalityLabels {
    pub region: FieldValue<String>,
    pub locality: FieldValue<String>,
    pub jcc: FieldValue<String>,
    pub jcg: FieldValue<String>,
}

impl LocalityLabels {
    pub fn unknown() -> Self {
        Self {
            region: FieldValue::Unknown,
            locality: FieldValue::Unknown,
            jcc: FieldValue::Unknown,
            jcg: FieldValue::Unknown,
        }
    }

    pub fn from_point(point: &ReferencePoint) -> Self {
        Self {
            region: label(&point.region),
            locality: label(&point.locality),
            jcc: label(&point.jcc),
            jcg: label(&point.jcg),
        }
    }
}

/// Award pair looked up by municipality name.
#[derive(Debug, Clone, PartialEq)]
pub struct AwardIds {
    pub jcc: FieldValue<String>,
    pub jcg: FieldValue<String>,
}

impl AwardIds {
    pub fn unknown() -> Self {
        Self {
            jcc: FieldValue::Unknown,
            jcg: FieldValue::Unknown,
        }
    }
}

fn label(value: &str) -> FieldValue<String> {
    if value.is_empty() {
        FieldValue::Unknown
    } else {
        FieldValue::Known(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestMatch<'a> {
    pub index: usize,
    pub point: &'a ReferencePoint,
    pub distance_m: f64,
}

/// Linear scan for the closest point. A later point only replaces the
/// current best when it is strictly closer, so the first of several
/// equidistant points wins.
pub fn nearest<'a>(query: &Coordinate, points: &'a [ReferencePoint]) -> Option<NearestMatch<'a>> {
    let mut best: Option<NearestMatch<'a>> = None;

    for (index, point) in points.iter().enumerate() {
        let distance_m = haversine_distance_meters(query, &point.coordinate);
        if best.is_none_or(|b| distance_m < b.distance_m) {
            best = Some(NearestMatch {
                index,
                point,
                distance_m,
            });
        }
    }

    best
}

/// Labels of the closest reference point, or all-unknown when there is no
/// dataset or it has no points.
pub fn classify(query: &Coordinate, dataset: Option<&ReferenceDataset>) -> LocalityLabels {
    dataset
        .and_then(|d| nearest(query, d.points()))
        .map(|m| LocalityLabels::from_point(m.point))
        .unwrap_or_else(LocalityLabels::unknown)
}

/// JCC/JCG of the first entry whose region and locality names both match
/// exactly. Municipality names repeat across prefectures, so the locality
/// alone does not identify an entry.
pub fn find_awards_by_locality(
    region: &str,
    locality: &str,
    dataset: Option<&ReferenceDataset>,
) -> AwardIds {
    dataset
        .and_then(|d| {
            d.points()
                .iter()
                .find(|p| p.region == region && p.locality == locality)
        })
        .map(|p| AwardIds {
            jcc: label(&p.jcc),
            jcg: label(&p.jcg),
        })
        .unwrap_or_else(AwardIds::unknown)
}

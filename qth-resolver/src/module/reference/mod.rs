//! Reference dataset and nearest-locality classification
//!
//! The dataset (`location-data.json`) lists known municipalities with their
//! prefecture and JCC/JCG award numbers. It is loaded once, shared as an
//! `Arc`, and queried by great-circle distance.

mod classifier;
mod loader;
mod types;

pub use classifier::{
    AwardIds, LocalityLabels, NearestMatch, classify, find_awards_by_locality, nearest,
};
pub use loader::{DatasetSource, load_dataset, load_or_absent};
pub use types::{DatasetError, DatasetFile, LocationRecord, ReferenceDataset};

//! Built-in records used when neither an artifact nor a reference dataset is
//! available, so a fresh deployment can still serve predictions.

use super::dataset::LabeledDataset;
use crate::domain::ml::feature_registry::FEATURE_COUNT;

/// Five labeled records in `FEATURE_NAMES` order, label last.
const FALLBACK_RECORDS: [[f64; FEATURE_COUNT + 1]; 5] = [
    [63.0, 1.0, 3.0, 145.0, 233.0, 1.0, 0.0, 150.0, 0.0, 2.3, 0.0, 0.0, 1.0, 1.0],
    [37.0, 1.0, 2.0, 130.0, 250.0, 0.0, 1.0, 187.0, 0.0, 3.5, 0.0, 0.0, 2.0, 1.0],
    [41.0, 0.0, 1.0, 130.0, 204.0, 0.0, 0.0, 172.0, 0.0, 1.4, 2.0, 0.0, 2.0, 1.0],
    [67.0, 1.0, 0.0, 160.0, 286.0, 0.0, 0.0, 108.0, 1.0, 1.5, 1.0, 3.0, 2.0, 0.0],
    [62.0, 0.0, 0.0, 140.0, 268.0, 0.0, 0.0, 160.0, 0.0, 3.6, 0.0, 2.0, 2.0, 0.0],
];

pub fn fallback_dataset() -> LabeledDataset {
    let mut dataset = LabeledDataset::default();
    for record in FALLBACK_RECORDS {
        let (features, label) = record.split_at(FEATURE_COUNT);
        dataset.features.push(features.to_vec());
        dataset.labels.push(label[0] as u8);
    }
    dataset
}

//! Reference dataset loading and train/test partitioning.

use crate::domain::errors::StartupError;
use crate::domain::ml::feature_registry::{FEATURE_COUNT, FEATURE_NAMES, TARGET_COLUMN};
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde::de::{self, Deserializer};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

/// One CSV row; empty and NA-like cells read as missing
#[derive(Debug, Deserialize)]
struct DatasetRow {
    #[serde(deserialize_with = "missing_or_number")]
    age: Option<f64>,
    #[serde(deserialize_with = "missing_or_number")]
    sex: Option<f64>,
    #[serde(deserialize_with = "missing_or_number")]
    cp: Option<f64>,
    #[serde(deserialize_with = "missing_or_number")]
    trestbps: Option<f64>,
    #[serde(deserialize_with = "missing_or_number")]
    chol: Option<f64>,
    #[serde(deserialize_with = "missing_or_number")]
    fbs: Option<f64>,
    #[serde(deserialize_with = "missing_or_number")]
    restecg: Option<f64>,
    #[serde(deserialize_with = "missing_or_number")]
    thalach: Option<f64>,
    #[serde(deserialize_with = "missing_or_number")]
    exang: Option<f64>,
    #[serde(deserialize_with = "missing_or_number")]
    oldpeak: Option<f64>,
    #[serde(deserialize_with = "missing_or_number")]
    slope: Option<f64>,
    #[serde(deserialize_with = "missing_or_number")]
    ca: Option<f64>,
    #[serde(deserialize_with = "missing_or_number")]
    thal: Option<f64>,
    #[serde(deserialize_with = "missing_or_number")]
    target: Option<f64>,
}

/// Cell tokens treated as a missing value (compared case-insensitively)
const MISSING_TOKENS: &[&str] = &["", "na", "n/a", "nan", "null", "none", "?"];

/// Empty or NA-like cells become `None`; any other non-numeric text is an error.
fn missing_or_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let cell = raw.trim();
    if MISSING_TOKENS.iter().any(|t| cell.eq_ignore_ascii_case(t)) {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| de::Error::custom(format!("'{}' is not a number", cell)))
}

impl DatasetRow {
    /// Features in `FEATURE_NAMES` order plus the label, or None if any cell is missing
    fn complete(&self) -> Option<(Vec<f64>, f64)> {
        let features = [
            self.age,
            self.sex,
            self.cp,
            self.trestbps,
            self.chol,
            self.fbs,
            self.restecg,
            self.thalach,
            self.exang,
            self.oldpeak,
            self.slope,
            self.ca,
            self.thal,
        ]
        .into_iter()
        .collect::<Option<Vec<f64>>>()?;

        if features.iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some((features, self.target.filter(|t| t.is_finite())?))
    }
}

/// Labeled feature rows in fixed feature order
#[derive(Debug, Clone, Default)]
pub struct LabeledDataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
    /// Rows discarded for empty, NA-like or non-finite values
    pub dropped_rows: usize,
}

impl LabeledDataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }

    pub fn to_matrix(&self) -> Result<Array2<f64>, String> {
        rows_to_matrix(&self.features)
    }

    fn subset(&self, indices: &[usize]) -> LabeledDataset {
        LabeledDataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            dropped_rows: 0,
        }
    }
}

pub fn rows_to_matrix(rows: &[Vec<f64>]) -> Result<Array2<f64>, String> {
    let n_cols = rows.first().map_or(FEATURE_COUNT, Vec::len);
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), n_cols), flat).map_err(|e| format!("Matrix error: {}", e))
}

/// Reads the reference dataset from a CSV file.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<LabeledDataset, StartupError> {
    let path = path.as_ref();
    info!("Loading reference dataset from {:?}", path);
    let file = File::open(path).map_err(|e| StartupError::DatasetRead {
        reason: format!("{}: {}", path.display(), e),
    })?;
    read_dataset(BufReader::new(file))
}

/// Parses CSV with a header naming the 13 feature columns and `target`.
/// Extra columns are ignored; rows with any missing value are dropped.
pub fn read_dataset<R: Read>(reader: R) -> Result<LabeledDataset, StartupError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers().map_err(|e| StartupError::DatasetRead {
        reason: e.to_string(),
    })?;
    let missing: Vec<String> = FEATURE_NAMES
        .iter()
        .chain(std::iter::once(&TARGET_COLUMN))
        .filter(|name| !headers.iter().any(|h| h == **name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(StartupError::SchemaMismatch { missing });
    }

    let mut dataset = LabeledDataset::default();
    for result in rdr.deserialize::<DatasetRow>() {
        let row = result.map_err(|e| StartupError::DatasetRead {
            reason: e.to_string(),
        })?;

        let Some((features, target)) = row.complete() else {
            dataset.dropped_rows += 1;
            continue;
        };

        let label = match target {
            t if t == 0.0 => 0,
            t if t == 1.0 => 1,
            value => return Err(StartupError::NonBinaryTarget { value }),
        };

        dataset.features.push(features);
        dataset.labels.push(label);
    }

    if dataset.dropped_rows > 0 {
        warn!(
            dropped = dataset.dropped_rows,
            "Dropped dataset rows with missing values"
        );
    }
    if dataset.is_empty() {
        return Err(StartupError::EmptyDataset);
    }

    info!(
        rows = dataset.len(),
        positives = dataset.positives(),
        "Reference dataset loaded"
    );
    Ok(dataset)
}

/// Train and test partitions
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: LabeledDataset,
    pub test: LabeledDataset,
}

/// Shuffles each class with a seeded RNG and moves `round(n * test_fraction)`
/// of it into the test partition, so both partitions keep the class ratio.
/// A class always keeps at least one training row.
pub fn stratified_split(dataset: &LabeledDataset, test_fraction: f64, seed: u64) -> TrainTestSplit {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train_idx = Vec::with_capacity(dataset.len());
    let mut test_idx = Vec::new();

    for class in [0u8, 1u8] {
        let mut members: Vec<usize> = (0..dataset.len())
            .filter(|&i| dataset.labels[i] == class)
            .collect();
        members.shuffle(&mut rng);

        let n = members.len();
        let n_test = ((n as f64 * test_fraction).round() as usize).min(n.saturating_sub(1));
        test_idx.extend_from_slice(&members[..n_test]);
        train_idx.extend_from_slice(&members[n_test..]);
    }

    train_idx.sort_unstable();
    test_idx.sort_unstable();

    TrainTestSplit {
        train: dataset.subset(&train_idx),
        test: dataset.subset(&test_idx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "age,sex,cp,trestbps,chol,fbs,restecg,thalach,exang,oldpeak,slope,ca,thal,target";

    fn synthetic_csv(rows: usize) -> String {
        let mut csv = String::from(HEADER);
        csv.push('\n');
        for i in 0..rows {
            let label = i % 2;
            csv.push_str(&format!(
                "{},{},{},130,{},0,0,{},0,1.0,1,0,2,{}\n",
                40 + i,
                label,
                label * 2,
                200 + i,
                150 + i,
                label
            ));
        }
        csv
    }

    #[test]
    fn test_read_dataset_parses_rows() {
        let ds = read_dataset(synthetic_csv(10).as_bytes()).unwrap();
        assert_eq!(ds.len(), 10);
        assert_eq!(ds.positives(), 5);
        assert_eq!(ds.features[0].len(), FEATURE_COUNT);
        assert_eq!(ds.features[3][0], 43.0);
    }

    #[test]
    fn test_rows_with_missing_values_dropped() {
        let mut csv = synthetic_csv(4);
        csv.push_str("50,1,2,130,,0,0,160,0,1.0,1,0,2,1\n");
        csv.push_str("51,1,2,130,240,0,0,160,0,NA,1,0,2,0\n");
        csv.push_str("52,1,2,130,240,0,0,160,0,1.0,1,0,2,\n");
        let ds = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.dropped_rows, 3);
    }

    #[test]
    fn test_na_like_tokens_are_missing() {
        let mut csv = synthetic_csv(2);
        csv.push_str("50,1,2,130,?,0,0,160,0,1.0,1,0,2,1\n");
        csv.push_str("51,1,2,130,240,0,0,160,0,n/a,1,0,2,0\n");
        let ds = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.dropped_rows, 2);
    }

    #[test]
    fn test_non_numeric_cell_is_read_error() {
        let mut csv = synthetic_csv(2);
        csv.push_str("50,1,2,130,abc,0,0,160,0,1.0,1,0,2,1\n");
        match read_dataset(csv.as_bytes()) {
            Err(StartupError::DatasetRead { reason }) => assert!(reason.contains("abc")),
            other => panic!("expected a read error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let csv = "age,sex,cp,target\n63,1,3,1\n";
        match read_dataset(csv.as_bytes()) {
            Err(StartupError::SchemaMismatch { missing }) => {
                assert!(missing.contains(&"thal".to_string()));
                assert!(!missing.contains(&"age".to_string()));
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_non_binary_target_rejected() {
        let csv = format!("{}\n63,1,3,145,233,1,0,150,0,2.3,0,0,1,2\n", HEADER);
        assert!(matches!(
            read_dataset(csv.as_bytes()),
            Err(StartupError::NonBinaryTarget { .. })
        ));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let csv = format!("{}\n", HEADER);
        assert!(matches!(
            read_dataset(csv.as_bytes()),
            Err(StartupError::EmptyDataset)
        ));
    }

    #[test]
    fn test_stratified_split_preserves_classes() {
        let ds = read_dataset(synthetic_csv(50).as_bytes()).unwrap();
        let split = stratified_split(&ds, 0.2, 42);

        assert_eq!(split.train.len() + split.test.len(), 50);
        assert_eq!(split.test.len(), 10);
        assert_eq!(split.test.positives(), 5);
        assert_eq!(split.train.positives(), 20);
    }

    #[test]
    fn test_stratified_split_is_seed_deterministic() {
        let ds = read_dataset(synthetic_csv(30).as_bytes()).unwrap();
        let a = stratified_split(&ds, 0.2, 7);
        let b = stratified_split(&ds, 0.2, 7);
        assert_eq!(a.test.features, b.test.features);
        assert_eq!(a.train.labels, b.train.labels);
    }

    #[test]
    fn test_tiny_class_keeps_training_row() {
        let ds = LabeledDataset {
            features: vec![vec![1.0], vec![2.0], vec![3.0]],
            labels: vec![0, 0, 1],
            dropped_rows: 0,
        };
        let split = stratified_split(&ds, 0.5, 1);
        assert_eq!(split.train.positives(), 1);
    }

    #[test]
    fn test_to_matrix_shape() {
        let ds = read_dataset(synthetic_csv(3).as_bytes()).unwrap();
        let m = ds.to_matrix().unwrap();
        assert_eq!(m.dim(), (3, FEATURE_COUNT));
    }
}

//! Loading the training table from CSV.
//!
//! Columns are located by header name, so their position and any extra
//! columns do not matter. A row is kept only when the seven schema columns
//! and the target all hold a finite number.

use crate::dataset::{DatasetError, InMemoryDataset};
use crate::error::DataError;
use crate::schema::{FeatureVector, FEATURES, N_FEATURES, TARGET};
use log::{info, warn};
use std::io::Read;
use std::path::Path;

/// Cell spellings treated as missing, compared case-insensitively.
const MISSING_MARKERS: [&str; 6] = ["", "na", "nan", "null", "none", "n/a"];

/// Complete training rows in schema order.
#[derive(Debug, Clone)]
pub struct EvDataset {
    rows: Vec<FeatureVector>,
    targets: Vec<f64>,
    dropped: usize,
}

impl EvDataset {
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|source| DataError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let ds = Self::from_csv_reader(reader)?;
        info!(
            "loaded {} rows from {} ({} dropped)",
            ds.len(),
            path.display(),
            ds.dropped
        );
        Ok(ds)
    }

    /// Same as [`EvDataset::from_csv`] over any reader.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, DataError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(rdr);
        Self::from_csv_reader(reader)
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, DataError> {
        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DataError::MissingColumn(name.to_string()))
        };

        let mut feature_cols = [0usize; N_FEATURES];
        for (slot, name) in feature_cols.iter_mut().zip(FEATURES) {
            *slot = column(name)?;
        }
        let target_col = column(TARGET)?;

        let mut rows = Vec::new();
        let mut targets = Vec::new();
        let mut dropped = 0usize;

        for record in reader.records() {
            let record = record?;
            let cell = |i: usize| record.get(i).and_then(parse_cell);

            let mut values = [0.0; N_FEATURES];
            let mut complete = true;
            for (v, &col) in values.iter_mut().zip(&feature_cols) {
                match cell(col) {
                    Some(x) => *v = x,
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            match (complete, cell(target_col)) {
                (true, Some(y)) => {
                    rows.push(FeatureVector::new(values));
                    targets.push(y);
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!("dropped {dropped} rows with missing or non-numeric values");
        }
        if rows.is_empty() {
            return Err(DataError::Empty);
        }
        Ok(Self {
            rows,
            targets,
            dropped,
        })
    }

    pub fn from_parts(rows: Vec<FeatureVector>, targets: Vec<f64>) -> Result<Self, DataError> {
        if rows.is_empty() || rows.len() != targets.len() {
            return Err(DataError::Empty);
        }
        Ok(Self {
            rows,
            targets,
            dropped: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows discarded while loading.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Selected rows as a training dataset.
    pub fn select(&self, indices: &[usize]) -> Result<InMemoryDataset, DatasetError> {
        let len = self.rows.len();
        let mut x = Vec::with_capacity(indices.len());
        let mut y = Vec::with_capacity(indices.len());
        for &i in indices {
            let row = self
                .rows
                .get(i)
                .ok_or(DatasetError::OutOfBounds { index: i, len })?;
            x.push(row.as_slice().to_vec());
            y.push(self.targets[i]);
        }
        InMemoryDataset::new(x, y)
    }
}

fn parse_cell(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if MISSING_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m)) {
        return None;
    }
    s.parse::<f64>().ok().filter(|x| x.is_finite())
}

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// One raw row of the mutation dataset, fields untouched.
///
/// `position` stays a string here; the catalog owns its validation so a
/// non-numeric value is a per-structure diagnosis, not a read failure.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DatasetRow {
    pub pdb_id: String,
    pub position: String,
    pub wild_type: String,
    pub mutation: String,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Reads the dataset with the given single-byte field delimiter. A header
/// row with `pdb_id`, `position`, `wild_type` and `mutation` columns is
/// required; column order does not matter.
pub fn load(path: &Path, delimiter: u8) -> Result<Vec<DatasetRow>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DatasetError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<DatasetRow>() {
        let row = result.map_err(|e| DatasetError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        rows.push(row);
    }
    Ok(rows)
}

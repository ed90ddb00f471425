use super::mutation::{MutationLabel, MutationRecord};
use super::residue::{AminoAcid, UnknownResidueCode};
use crate::core::io::dataset::DatasetRow;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::warn;

/// A structure identifier paired with the ordered, deduplicated list of
/// mutation labels the dataset requests for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub structure_id: String,
    pub labels: Vec<MutationLabel>,
}

/// Diagnosis for a dataset row that could not be parsed into a
/// [`MutationRecord`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    #[error("row {row}: position '{value}' is not a positive integer")]
    Position { row: usize, value: String },
    #[error("row {row}: residue field '{value}' must be a single-letter code")]
    ResidueField { row: usize, value: String },
    #[error("row {row}: {source}")]
    Residue {
        row: usize,
        #[source]
        source: UnknownResidueCode,
    },
}

/// A structure dropped from the catalog because at least one of its rows was
/// malformed. Dropping the whole structure keeps the catalog unambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedStructure {
    pub structure_id: String,
    pub errors: Vec<MalformedRecord>,
}

/// The set of distinct work items for a run, grouped by structure id in
/// first-seen dataset order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<WorkItem>,
    rejected: Vec<RejectedStructure>,
}

impl Catalog {
    /// Groups dataset rows by structure id, preserving first-seen order of
    /// distinct mutation labels within each group.
    ///
    /// Rows that fail validation reject their entire structure: every label
    /// of that structure is withheld from the catalog and reported through
    /// [`Catalog::rejected`]. Pure and deterministic; building twice from the
    /// same rows yields identical catalogs.
    pub fn from_rows(rows: &[DatasetRow]) -> Self {
        let mut order: Vec<String> = Vec::new();
        let mut labels: HashMap<String, Vec<MutationLabel>> = HashMap::new();
        let mut seen: HashMap<String, HashSet<MutationLabel>> = HashMap::new();
        let mut errors: HashMap<String, Vec<MalformedRecord>> = HashMap::new();

        for (idx, row) in rows.iter().enumerate() {
            let structure_id = row.pdb_id.trim().to_string();
            if !labels.contains_key(&structure_id) && !errors.contains_key(&structure_id) {
                order.push(structure_id.clone());
            }
            match parse_row(idx, row) {
                Ok(record) => {
                    let label = record.label();
                    if seen.entry(structure_id.clone()).or_default().insert(label) {
                        labels.entry(structure_id).or_default().push(label);
                    }
                }
                Err(e) => {
                    warn!(structure = %structure_id, error = %e, "malformed dataset row");
                    errors.entry(structure_id).or_default().push(e);
                }
            }
        }

        let mut items = Vec::new();
        let mut rejected = Vec::new();
        for structure_id in order {
            if let Some(errs) = errors.remove(&structure_id) {
                warn!(
                    structure = %structure_id,
                    rows = errs.len(),
                    "dropping structure from catalog"
                );
                rejected.push(RejectedStructure {
                    structure_id,
                    errors: errs,
                });
            } else if let Some(labels) = labels.remove(&structure_id) {
                items.push(WorkItem {
                    structure_id,
                    labels,
                });
            }
        }

        Self { items, rejected }
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn rejected(&self) -> &[RejectedStructure] {
        &self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn parse_row(idx: usize, row: &DatasetRow) -> Result<MutationRecord, MalformedRecord> {
    // Rows are 1-based in diagnostics, matching what users see in the file
    // (after the header line).
    let row_no = idx + 1;

    let position = row
        .position
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|p| *p >= 1)
        .ok_or_else(|| MalformedRecord::Position {
            row: row_no,
            value: row.position.clone(),
        })?;
    let wild_type = parse_residue_field(row_no, &row.wild_type)?;
    let mutant = parse_residue_field(row_no, &row.mutation)?;

    Ok(MutationRecord {
        structure_id: row.pdb_id.trim().to_string(),
        position,
        wild_type,
        mutant,
    })
}

fn parse_residue_field(row_no: usize, field: &str) -> Result<AminoAcid, MalformedRecord> {
    let trimmed = field.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            AminoAcid::from_one_letter(c).map_err(|source| MalformedRecord::Residue {
                row: row_no,
                source,
            })
        }
        _ => Err(MalformedRecord::ResidueField {
            row: row_no,
            value: field.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pdb_id: &str, position: &str, wild_type: &str, mutation: &str) -> DatasetRow {
        DatasetRow {
            pdb_id: pdb_id.to_string(),
            position: position.to_string(),
            wild_type: wild_type.to_string(),
            mutation: mutation.to_string(),
        }
    }

    #[test]
    fn groups_rows_by_structure_in_first_seen_order() {
        let rows = vec![
            row("1ABC", "10", "A", "G"),
            row("2XYZ", "5", "L", "P"),
            row("1ABC", "42", "K", "E"),
        ];
        let catalog = Catalog::from_rows(&rows);

        let ids: Vec<_> = catalog
            .items()
            .iter()
            .map(|i| i.structure_id.as_str())
            .collect();
        assert_eq!(ids, ["1ABC", "2XYZ"]);

        let labels: Vec<_> = catalog.items()[0]
            .labels
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(labels, ["A10G", "K42E"]);
    }

    #[test]
    fn duplicate_labels_collapse_to_one_entry() {
        let rows = vec![row("1ABC", "10", "A", "G"), row("1ABC", "10", "A", "G")];
        let catalog = Catalog::from_rows(&rows);

        assert_eq!(catalog.items().len(), 1);
        let labels: Vec<_> = catalog.items()[0]
            .labels
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(labels, ["A10G"]);
    }

    #[test]
    fn construction_is_idempotent() {
        let rows = vec![
            row("1ABC", "10", "A", "G"),
            row("1ABC", "12", "T", "S"),
            row("2XYZ", "7", "V", "I"),
        ];
        assert_eq!(Catalog::from_rows(&rows), Catalog::from_rows(&rows));
    }

    #[test]
    fn every_label_belongs_to_exactly_one_group() {
        let rows = vec![
            row("1ABC", "10", "A", "G"),
            row("2XYZ", "10", "A", "G"),
            row("1ABC", "11", "S", "T"),
        ];
        let catalog = Catalog::from_rows(&rows);

        let total: usize = catalog.items().iter().map(|i| i.labels.len()).sum();
        assert_eq!(total, 3);
        for item in catalog.items() {
            let mut unique: HashSet<_> = HashSet::new();
            for label in &item.labels {
                assert!(unique.insert(*label));
            }
        }
    }

    #[test]
    fn malformed_position_rejects_the_whole_structure() {
        let rows = vec![
            row("1ABC", "10", "A", "G"),
            row("1ABC", "ten", "A", "G"),
            row("2XYZ", "5", "L", "P"),
        ];
        let catalog = Catalog::from_rows(&rows);

        assert_eq!(catalog.items().len(), 1);
        assert_eq!(catalog.items()[0].structure_id, "2XYZ");
        assert_eq!(catalog.rejected().len(), 1);
        assert_eq!(catalog.rejected()[0].structure_id, "1ABC");
        assert!(matches!(
            catalog.rejected()[0].errors[0],
            MalformedRecord::Position { .. }
        ));
    }

    #[test]
    fn unknown_residue_code_rejects_the_whole_structure() {
        let rows = vec![row("1ABC", "10", "X", "G")];
        let catalog = Catalog::from_rows(&rows);

        assert!(catalog.is_empty());
        assert!(matches!(
            catalog.rejected()[0].errors[0],
            MalformedRecord::Residue { .. }
        ));
    }

    #[test]
    fn multi_letter_residue_field_is_malformed() {
        let rows = vec![row("1ABC", "10", "ALA", "G")];
        let catalog = Catalog::from_rows(&rows);

        assert!(matches!(
            catalog.rejected()[0].errors[0],
            MalformedRecord::ResidueField { .. }
        ));
    }

    #[test]
    fn zero_position_is_malformed() {
        let rows = vec![row("1ABC", "0", "A", "G")];
        let catalog = Catalog::from_rows(&rows);

        assert!(matches!(
            catalog.rejected()[0].errors[0],
            MalformedRecord::Position { .. }
        ));
    }
}

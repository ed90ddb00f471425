use super::residue::{AminoAcid, UnknownResidueCode};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single point mutation parsed from one dataset row.
///
/// Immutable after parsing; the catalog collapses duplicate rows by their
/// [`MutationLabel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub structure_id: String,
    pub position: u32,
    pub wild_type: AminoAcid,
    pub mutant: AminoAcid,
}

impl MutationRecord {
    pub fn label(&self) -> MutationLabel {
        MutationLabel {
            wild_type: self.wild_type,
            position: self.position,
            mutant: self.mutant,
        }
    }
}

/// Canonical identifier of one mutation within a structure, e.g. `A123G`.
///
/// The string form doubles as the name of the mutation's working directory,
/// so `Display` must stay stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationLabel {
    pub wild_type: AminoAcid,
    pub position: u32,
    pub mutant: AminoAcid,
}

impl fmt::Display for MutationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.wild_type.one_letter(),
            self.position,
            self.mutant.one_letter()
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LabelParseError {
    #[error("mutation label '{0}' is too short")]
    TooShort(String),
    #[error("mutation label '{label}': {source}")]
    Residue {
        label: String,
        source: UnknownResidueCode,
    },
    #[error("mutation label '{0}' has a non-numeric or zero position")]
    Position(String),
}

impl FromStr for MutationLabel {
    type Err = LabelParseError;

    /// Parses the canonical `{wild}{position}{mutant}` form used by reload
    /// policy files, e.g. `A10G`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (first, last) = match (chars.next(), chars.next_back()) {
            (Some(f), Some(l)) if s.len() >= 3 => (f, l),
            _ => return Err(LabelParseError::TooShort(s.to_string())),
        };
        let wild_type = AminoAcid::from_one_letter(first).map_err(|e| {
            LabelParseError::Residue {
                label: s.to_string(),
                source: e,
            }
        })?;
        let mutant = AminoAcid::from_one_letter(last).map_err(|e| LabelParseError::Residue {
            label: s.to_string(),
            source: e,
        })?;
        let position = chars
            .as_str()
            .parse::<u32>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| LabelParseError::Position(s.to_string()))?;

        Ok(Self {
            wild_type,
            position,
            mutant,
        })
    }
}

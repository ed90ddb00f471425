//! External-collaborator seams of the pipeline.
//!
//! Structure cleaning, mutagenesis, and the MD stages are delegated to
//! external tools. The driver only ever talks to the traits here, so tests
//! can substitute recording fakes and never spawn a process. The adapters
//! treat their tools as black boxes: exit status is logged, but the presence
//! of the expected output artifact is the completion signal.

pub mod clean;
pub mod gromacs;
pub mod rosetta;

use super::layout::WorkdirLayout;
use crate::core::models::mutation::MutationLabel;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("I/O error at '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input '{path}': {detail}", path = path.display())]
    Malformed { path: PathBuf, detail: String },

    #[error("'{program}' did not produce expected output '{path}'", path = path.display())]
    MissingOutput { program: String, path: PathBuf },
}

/// Produces the cleaned-structure artifact for a structure id.
pub trait StructureCleaner {
    fn clean(&self, layout: &WorkdirLayout, structure_id: &str) -> Result<(), ToolError>;
}

/// Applies one point mutation to a cleaned structure, leaving the mutated
/// structure at the layout's canonical path. The adapter derives position
/// and target residue from the label; protocol mechanics are its own.
pub trait MutagenesisEngine {
    fn mutate(
        &self,
        layout: &WorkdirLayout,
        structure_id: &str,
        label: &MutationLabel,
    ) -> Result<(), ToolError>;
}

/// Runs the three MD stages inside a label directory. Each method blocks
/// until the underlying tool exits; none of them verify outputs beyond what
/// the tool reports (the driver re-probes the checkpoint afterwards).
pub trait MdEngine {
    fn minimize(
        &self,
        layout: &WorkdirLayout,
        structure_id: &str,
        label: &MutationLabel,
    ) -> Result<(), ToolError>;

    fn equilibrate(
        &self,
        layout: &WorkdirLayout,
        structure_id: &str,
        label: &MutationLabel,
    ) -> Result<(), ToolError>;

    fn production(
        &self,
        layout: &WorkdirLayout,
        structure_id: &str,
        label: &MutationLabel,
    ) -> Result<(), ToolError>;
}

use super::policy::PolicyError;
use super::tools::ToolError;
use crate::core::io::dataset::DatasetError;
use thiserror::Error;

/// Run-fatal errors of the preparation engine.
///
/// Per-item stage failures are deliberately not represented here; they are
/// contained by the driver and reported through the run summary.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("reload policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("working directory error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tool setup error: {0}")]
    Tool(#[from] ToolError),
}

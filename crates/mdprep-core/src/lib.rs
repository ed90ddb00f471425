//! # mdprep Core Library
//!
//! A checkpoint-aware preparation pipeline for point-mutation molecular
//! dynamics runs: structure cleaning, in-silico mutagenesis, energy
//! minimization, equilibration, and production, each stage delegated to an
//! external tool and skipped when its output artifact already exists.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to keep the
//! dependency-resolution core testable without ever spawning a process.
//!
//! - **[`core`]: The Foundation.** Stateless data models (mutation records,
//!   labels, the stage ordering, the work-item catalog) and dataset I/O.
//!
//! - **[`engine`]: The Logic Core.** Checkpoint probing, the reload policy,
//!   and the stage-plan resolver that decides, per structure and per
//!   mutation, which stages must (re)run. External tools sit behind the
//!   traits in [`engine::tools`].
//!
//! - **[`workflows`]: The Public API.** The pipeline driver that consumes a
//!   resolved plan, invokes the collaborators in stage order, and contains
//!   per-item failures so one bad mutation never aborts the run.

pub mod core;
pub mod engine;
pub mod workflows;

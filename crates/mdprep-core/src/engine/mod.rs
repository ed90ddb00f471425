//! # Engine Module
//!
//! The decision-making core of the pipeline: given a catalog of work items,
//! a reload policy, and the checkpoint artifacts already on disk, decide per
//! structure, per mutation, per stage what must (re)run.
//!
//! ## Architecture
//!
//! - **Working Directory** ([`layout`]) - Canonical artifact paths per
//!   structure and mutation label
//! - **Checkpoint Probing** ([`checkpoint`]) - Read-only existence queries
//!   against durable storage
//! - **Reload Policy** ([`policy`]) - User configuration forcing
//!   recomputation regardless of checkpoint state
//! - **Plan Resolution** ([`plan`]) - The per-label cascade state machine
//!   producing deterministic execution sets
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **External Tools** ([`tools`]) - Traits and adapters for the cleaning,
//!   mutagenesis, and MD collaborators
//! - **Error Handling** ([`error`]) - Run-fatal engine errors

pub mod checkpoint;
pub mod error;
pub mod layout;
pub mod plan;
pub mod policy;
pub mod progress;
pub mod tools;

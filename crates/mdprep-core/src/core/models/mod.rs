//! # Core Models Module
//!
//! Data structures describing the pipeline's unit of work: a point mutation
//! applied to a protein structure, and the fixed chain of preparation stages
//! it must pass through.
//!
//! ## Key Components
//!
//! - [`residue`] - The twenty standard amino acids with one- and three-letter codes
//! - [`mutation`] - Mutation records and their canonical label form (`A123G`)
//! - [`stage`] - The totally ordered stage enumeration and per-stage artifacts
//! - [`catalog`] - Grouping of dataset rows into per-structure work items

pub mod catalog;
pub mod mutation;
pub mod residue;
pub mod stage;

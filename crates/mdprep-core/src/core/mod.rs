//! # Core Module
//!
//! Fundamental building blocks of the preparation pipeline: the mutation data
//! model, the fixed stage ordering, the work-item catalog, and dataset I/O.
//!
//! ## Overview
//!
//! Everything in this module is a pure transformation over in-memory data.
//! Nothing here touches the filesystem beyond reading the input dataset, and
//! nothing here knows about external tools or checkpoints.
//!
//! - **Data Model** ([`models`]) - Amino acids, mutation records and labels,
//!   the stage enumeration, and catalog construction
//! - **Dataset I/O** ([`io`]) - CSV loading of mutation datasets

pub mod io;
pub mod models;

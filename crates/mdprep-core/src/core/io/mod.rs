//! Input functionality for mutation datasets.
//!
//! Dataset loading is a thin wrapper over the `csv` crate; all validation of
//! field contents happens in the catalog so that a bad row can be attributed
//! to its structure instead of aborting the whole read.

pub mod dataset;

//! # Workflows Module
//!
//! Top-level entry points tying the engine together: plan resolution plus
//! the sequential pipeline driver.
//!
//! The driver's contract is error containment, not orchestration cleverness:
//! one (structure, label, stage) unit runs to completion before the next is
//! considered, a stage failure abandons only that label's remaining stages,
//! and a run never aborts for anything short of a configuration error.

pub mod prepare;

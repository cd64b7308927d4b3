//! # Pipeline Module
//!
//! High-level orchestration of the imputation workflow.
//! Coordinates I/O, panel validation, and HMM execution.

pub mod imputation;

pub use imputation::{HaplotypeResult, ImputationPipeline};

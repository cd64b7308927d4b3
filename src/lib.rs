//! # lsimpute Library
//!
//! Genotype imputation with the Li-Stephens haplotype-copying HMM.
//!
//! ## Modules
//! - `config`: CLI argument parsing and validation
//! - `data`: In-memory representations of genomic data
//! - `error`: Error types and result aliases
//! - `io`: PLINK reading, result writing
//! - `model`: Log-space HMM engine and MAP imputation
//! - `pipelines`: High-level workflow orchestration
//! - `utils`: Shared utilities (thread pool)

pub mod config;
pub mod data;
pub mod error;
pub mod io;
pub mod model;
pub mod pipelines;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use data::allele::{Allele, Observation};
pub use data::genome::Genome;
pub use data::haplotype::{HapIdx, SampleIdx, Samples};
pub use data::marker::{Markers, SnpIdx, SnpMeta};
pub use data::panel::{RefPanel, ReferencePanel};
pub use error::{LsError, Result};
pub use io::plink::read_genome;
pub use model::hmm::{run_ls, Engine, LsHmm};
pub use model::imputer::{impute_haplotype, ImputedCall};
pub use model::parameters::ModelParams;
pub use model::posterior::Posterior;

pub use pipelines::ImputationPipeline;

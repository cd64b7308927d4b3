//! # Model Module
//!
//! The Li-Stephens imputation engine.
//!
//! ## Layout
//! - `logspace`: log-probability arithmetic primitives
//! - `parameters`: validated `g` / `theta`, emission and transition terms
//! - `matrix`: dense `n_snp x n_ref` log-probability storage
//! - `hmm`: forward, backward and smoothing passes
//! - `posterior`: the smoothed ancestry matrix
//! - `imputer`: MAP allele selection from a posterior

pub mod hmm;
pub mod imputer;
pub mod logspace;
pub mod matrix;
pub mod parameters;
pub mod posterior;

#[cfg(test)]
pub(crate) mod fixtures;

pub use hmm::{run_ls, smooth, Engine, ForwardMatrix, LsHmm};
pub use imputer::{allele_posteriors, impute_haplotype, ImputedCall};
pub use matrix::LogMatrix;
pub use parameters::{ModelParams, Transition};
pub use posterior::Posterior;

//! # Data Module
//!
//! In-memory representations of genomic data.
//!
//! ## Design
//! - **Zero-cost newtypes:** `SnpIdx`, `HapIdx`, `SampleIdx` prevent index bugs
//!   at compile time with no runtime overhead.
//! - **Two representations:** `Genome` holds possibly-missing calls (samples);
//!   `RefPanel` is a validated, complete panel laid out SNP-major for the HMM.
//! - **Narrow contract:** the HMM only sees the `ReferencePanel` trait.

pub mod allele;
pub mod genome;
pub mod haplotype;
pub mod marker;
pub mod panel;

// Re-export commonly used types
pub use allele::{Allele, Observation};
pub use genome::Genome;
pub use haplotype::{HapIdx, SampleIdx, Samples};
pub use marker::{Markers, SnpIdx, SnpMeta};
pub use panel::{RefPanel, ReferencePanel};

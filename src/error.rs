//! # Centralized Error Handling
//!
//! Unified error types for the entire crate using `thiserror`.
//!
//! Engine failures fall into three families: precondition violations
//! (`ShapeMismatch`, `EmptyPanel`, `InvalidParameter`) raised before any
//! matrix is allocated, numerical-domain faults (`NumericalDomain`) raised
//! instead of clamping, and resource exhaustion (`Allocation`). None of them
//! are transient.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for lsimpute operations
#[derive(Error, Debug)]
pub enum LsError {
    /// I/O errors (file missing, permission denied, read/write failures)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed PLINK input
    #[error("Parse error in {file} at line {line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    /// Invalid data errors (missing reference calls, unsorted genetic positions)
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Configuration errors (invalid CLI arguments)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// File not found errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// A sequence does not have the number of SNPs the panel requires
    #[error("Shape mismatch in {what}: expected {expected} SNPs, found {found}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    /// The reference panel has no haplotypes or no SNPs
    #[error("Reference panel is empty ({n_haplotypes} haplotypes, {n_snps} SNPs)")]
    EmptyPanel { n_haplotypes: usize, n_snps: usize },

    /// A model parameter is outside its domain
    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A log-space operation was asked for a value outside its domain
    #[error("Numerical domain error in {context}: {value}")]
    NumericalDomain { context: String, value: f64 },

    /// Matrix storage could not be reserved
    #[error("Cannot allocate {rows} x {cols} probability matrix")]
    Allocation { rows: usize, cols: usize },

    /// Haplotype id not present in a genome
    #[error("Unknown haplotype id: {id}")]
    UnknownSample { id: String },
}

/// Type alias for Results using LsError
pub type Result<T> = std::result::Result<T, LsError>;

impl LsError {
    /// Create an invalid data error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a shape mismatch error
    pub fn shape(what: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected,
            found,
        }
    }

    /// Create a numerical domain error
    pub fn domain(context: impl Into<String>, value: f64) -> Self {
        Self::NumericalDomain {
            context: context.into(),
            value,
        }
    }

    /// True for failures detected before any computation started
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::ShapeMismatch { .. } | Self::EmptyPanel { .. } | Self::InvalidParameter { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = LsError::parse("ref.ped", 3, "bad allele");
        assert_eq!(e.to_string(), "Parse error in ref.ped at line 3: bad allele");

        let e = LsError::shape("sample 03_03_1", 4, 3);
        assert!(e.to_string().contains("expected 4 SNPs, found 3"));
        assert!(e.is_precondition());
    }

    #[test]
    fn test_domain_is_not_precondition() {
        let e = LsError::domain("log_complement", 0.5);
        assert!(!e.is_precondition());
        assert!(matches!(e, LsError::NumericalDomain { .. }));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: LsError = io.into();
        assert!(matches!(e, LsError::Io(_)));
    }
}

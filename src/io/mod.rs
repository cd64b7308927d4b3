//! # I/O Module
//!
//! File reading/writing boundaries. Converts PLINK text files into the
//! in-memory `Genome` and writes imputed calls back out.

pub mod plink;
pub mod writer;

pub use plink::read_genome;
pub use writer::{CallWriter, PosteriorWriter};

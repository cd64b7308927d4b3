//! # Configuration Logic
//!
//! ## Role
//! CLI argument parsing and validation.
//!
//! ## Validation
//! - `g` in (0, 1), `theta > 0` (finite)
//! - `--min-dist > 0`, `--threads > 0`
//! - `--chrom` names a known chromosome
//! - Haplotype ids given to `--id` end in `_1` or `_2`
//!
//! All of it runs before any input file is opened.
//!
//! ## Example CLI
//! ```bash
//! lsimpute -g 0.1 -t 1.0 data/02 data/03 --id 03_03_1 --out calls.tsv
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::data::marker::parse_chrom;
use crate::error::{LsError, Result};
use crate::model::{Engine, ModelParams};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "lsimpute",
    version,
    about = "Li-Stephens HMM genotype imputation against a phased reference panel"
)]
pub struct Config {
    /// Reference panel PLINK prefix (reads <REF>.ped and <REF>.map)
    #[arg(value_name = "REF")]
    pub ref_prefix: PathBuf,

    /// Sample PLINK prefix (reads <SAMPLE>.ped and <SAMPLE>.map)
    #[arg(value_name = "SAMPLE")]
    pub sample_prefix: PathBuf,

    /// Garble (miscopy) rate, in (0, 1)
    #[arg(short = 'g', long = "garble", value_name = "G", allow_negative_numbers = true)]
    pub garble: f64,

    /// Recombination scale per cM, > 0
    #[arg(short = 't', long = "theta", value_name = "THETA", allow_negative_numbers = true)]
    pub theta: f64,

    /// Use the single-threaded scalar engine
    #[arg(short = 's', long)]
    pub sequential: bool,

    /// Sample haplotypes to impute (e.g. 03_03_1); default all
    #[arg(long = "id", value_name = "HAP_ID")]
    pub ids: Vec<String>,

    /// Keep only these reference individuals (FID_IID)
    #[arg(long = "keep", value_name = "ID")]
    pub keep: Vec<String>,

    /// Restrict both inputs to one chromosome (1-22, X, Y)
    #[arg(long)]
    pub chrom: Option<String>,

    /// Output TSV (stdout if omitted, gzipped if it ends in .gz)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Also write the posterior matrix of every imputed haplotype
    #[arg(long)]
    pub posteriors: Option<PathBuf>,

    /// Floor for reference inter-SNP genetic distances (cM)
    #[arg(long, default_value_t = 1e-7)]
    pub min_dist: f64,

    /// Number of worker threads (default: all cores)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Report span timings
    #[arg(long)]
    pub profile: bool,
}

impl Config {
    /// Parse command line arguments and validate
    pub fn parse_and_validate() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        ModelParams::new(self.garble, self.theta)?;

        if !(self.min_dist.is_finite() && self.min_dist > 0.0) {
            return Err(LsError::config(format!(
                "--min-dist must be a positive number of cM, got {}",
                self.min_dist
            )));
        }
        if self.threads == Some(0) {
            return Err(LsError::config("--threads must be at least 1"));
        }
        if let Some(token) = &self.chrom {
            if parse_chrom(token).is_none() {
                return Err(LsError::config(format!("unknown chromosome '{token}'")));
            }
        }
        for id in &self.ids {
            let valid = matches!(id.rsplit_once('_'), Some((indiv, "1" | "2")) if !indiv.is_empty());
            if !valid {
                return Err(LsError::config(format!(
                    "haplotype id '{id}' must end in _1 or _2"
                )));
            }
        }
        Ok(())
    }

    /// Validated model parameters
    pub fn model_params(&self) -> Result<ModelParams> {
        ModelParams::new(self.garble, self.theta)
    }

    pub fn engine(&self) -> Engine {
        if self.sequential {
            Engine::Scalar
        } else {
            Engine::Parallel
        }
    }

    /// Chromosome filter as a numeric code
    pub fn chrom_code(&self) -> Option<u8> {
        self.chrom.as_deref().and_then(parse_chrom)
    }

    /// Get number of threads to use
    pub fn nthreads(&self) -> usize {
        if self.sequential {
            return 1;
        }
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

//! # Model Parameters
//!
//! ## Role
//! The two Li-Stephens hyperparameters of one imputation run, validated once
//! before any HMM row is computed.
//!
//! ### Emission
//! ```text
//! emission(obs, ref) = ln(1 - g)   if obs == ref
//!                      ln(g)       otherwise
//!                      0           if obs is missing
//! ```
//!
//! ### Transition across a gap of `d` cM
//! ```text
//! no_jump = -theta * d            (stay on the same haplotype)
//! jump    = ln(1 - e^no_jump)     (recombine onto a uniformly chosen haplotype)
//! ```

use crate::data::allele::Allele;
use crate::error::{LsError, Result};
use crate::model::logspace::log_complement;

/// Garble rate and recombination scale
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelParams {
    /// Probability an observed allele differs from the haplotype it copies
    garble: f64,
    /// Converts genetic distance (cM) into a per-gap recombination exponent
    theta: f64,
    log_match: f64,
    log_mismatch: f64,
}

impl ModelParams {
    /// Validate `g` in (0, 1) and `theta > 0`.
    pub fn new(garble: f64, theta: f64) -> Result<Self> {
        if !(garble > 0.0 && garble < 1.0) {
            return Err(LsError::InvalidParameter {
                name: "g",
                value: garble,
                reason: "must lie in the open interval (0, 1)",
            });
        }
        if !(theta.is_finite() && theta > 0.0) {
            return Err(LsError::InvalidParameter {
                name: "theta",
                value: theta,
                reason: "must be finite and positive",
            });
        }
        Ok(Self {
            garble,
            theta,
            log_match: (1.0 - garble).ln(),
            log_mismatch: garble.ln(),
        })
    }

    pub fn garble(&self) -> f64 {
        self.garble
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Log emission probability of `observed` given the copied `reference` allele
    #[inline]
    pub fn emission(&self, observed: Option<Allele>, reference: Allele) -> f64 {
        match observed {
            None => 0.0,
            Some(a) if a == reference => self.log_match,
            Some(_) => self.log_mismatch,
        }
    }

    /// Transition terms for a gap of `distance` cM
    pub fn transition(&self, distance: f64) -> Result<Transition> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(LsError::domain("genetic distance", distance));
        }
        let no_jump = -self.theta * distance;
        let jump = log_complement(no_jump)?;
        Ok(Transition { no_jump, jump })
    }
}

/// Log-probabilities of staying on / jumping off the current haplotype
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub no_jump: f64,
    pub jump: f64,
}

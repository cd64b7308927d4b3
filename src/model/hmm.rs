//! # Li-Stephens Hidden Markov Model
//!
//! Forward, backward and smoothing passes of the haplotype-copying HMM,
//! computed entirely in log space.
//!
//! ## Key Concepts
//! - `States`: reference haplotypes the sample could be copying at a SNP
//! - `Transitions`: stay on the same haplotype (`no_jump`) or recombine onto a
//!   uniformly chosen one (`jump + ln(1/n_ref)`)
//! - `Emissions`: `ln(1-g)` on a match, `ln(g)` on a mismatch
//!
//! ## Recurrences
//! ```text
//! F[0][j]   = e(0, j)
//! F[i][j]   = log_add(F^[i-1][j] + nJ, J + c) + e(i, j)          (F^ = row-normalized)
//! B[n-1][j] = e(n-1, j)
//! B[i][j]   = log_add(J + c, nJ + B^[i+1][j]) + e(i, j)
//! P[i]      = normalize(F[i] + B[i+1]),  P[n-1] = normalize(F[n-1])
//! ```
//! Per-row normalization only rescales every state by the same factor; the
//! removed log mass is accumulated into the sequence log-likelihood.
//!
//! ## Execution strategies
//! Each pass is sequential along SNPs, but the per-haplotype update within a
//! row is independent. `Engine::Parallel` spreads that update across rayon
//! workers; row normalization stays a left-to-right reduction, so both
//! engines return bit-identical matrices.
//!
//! ## Reference
//! Li N, Stephens M. Genetics 2003 Dec;165(4):2213-33

use rayon::prelude::*;
use tracing::{debug, info_span};

use crate::data::{Allele, Observation, ReferencePanel, SnpIdx};
use crate::error::{LsError, Result};
use crate::model::logspace::{log_add, log_sum, normalize_row};
use crate::model::matrix::LogMatrix;
use crate::model::parameters::{ModelParams, Transition};
use crate::model::posterior::Posterior;

/// Minimum haplotypes per rayon task in a parallel row update
const PAR_MIN_LEN: usize = 512;

/// How the per-haplotype update inside a row is executed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Engine {
    /// One thread, one haplotype after another
    Scalar,
    /// Data-parallel across haplotypes; forward and backward run concurrently
    #[default]
    Parallel,
}

/// Forward matrix plus the sequence log-likelihood it implies
#[derive(Clone, Debug)]
pub struct ForwardMatrix {
    matrix: LogMatrix,
    log_likelihood: f64,
}

impl ForwardMatrix {
    pub fn matrix(&self) -> &LogMatrix {
        &self.matrix
    }

    /// `ln P(sample | panel)` under the model
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }
}

/// One sample-vs-panel HMM run configuration
pub struct LsHmm<'a, P: ReferencePanel + ?Sized> {
    panel: &'a P,
    params: ModelParams,
    engine: Engine,
    n_snp: usize,
    n_ref: usize,
    /// `c = ln(1 / n_ref)`, the uniform jump target
    log_prior: f64,
}

impl<'a, P: ReferencePanel + ?Sized> LsHmm<'a, P> {
    /// Bind a panel and validated parameters. Fails on an empty panel.
    pub fn new(panel: &'a P, params: ModelParams, engine: Engine) -> Result<Self> {
        let n_ref = panel.haplotype_count();
        let n_snp = panel.snp_count();
        if n_ref == 0 || n_snp == 0 {
            return Err(LsError::EmptyPanel {
                n_haplotypes: n_ref,
                n_snps: n_snp,
            });
        }
        Ok(Self {
            panel,
            params,
            engine,
            n_snp,
            n_ref,
            log_prior: (1.0 / n_ref as f64).ln(),
        })
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Forward pass alone
    pub fn forward<O: Observation>(&self, sample: &[O]) -> Result<ForwardMatrix> {
        let transitions = self.prepare(sample)?;
        self.forward_pass(sample, &transitions)
    }

    /// Backward pass alone
    pub fn backward<O: Observation>(&self, sample: &[O]) -> Result<LogMatrix> {
        let transitions = self.prepare(sample)?;
        self.backward_pass(sample, &transitions)
    }

    /// Forward, backward and smoothing. Every precondition and every
    /// transition term is checked before either matrix is allocated.
    pub fn run<O: Observation>(&self, sample: &[O]) -> Result<Posterior> {
        let transitions = self.prepare(sample)?;
        let (fwd, bwd) = match self.engine {
            Engine::Scalar => (
                self.forward_pass(sample, &transitions),
                self.backward_pass(sample, &transitions),
            ),
            Engine::Parallel => rayon::join(
                || self.forward_pass(sample, &transitions),
                || self.backward_pass(sample, &transitions),
            ),
        };
        smooth(fwd?, bwd?)
    }

    /// Shape check and per-gap transition terms
    fn prepare<O: Observation>(&self, sample: &[O]) -> Result<Vec<Transition>> {
        if sample.len() != self.n_snp {
            return Err(LsError::shape("sample haplotype", self.n_snp, sample.len()));
        }
        (0..self.n_snp - 1)
            .map(|i| {
                let d = self.panel.genetic_distance(SnpIdx::from(i));
                self.params.transition(d).map_err(|e| match e {
                    LsError::NumericalDomain { context, value } => {
                        LsError::domain(format!("{context} (gap after SNP {i})"), value)
                    }
                    other => other,
                })
            })
            .collect()
    }

    fn forward_pass<O: Observation>(
        &self,
        sample: &[O],
        transitions: &[Transition],
    ) -> Result<ForwardMatrix> {
        let _span = info_span!("forward", n_snp = self.n_snp, n_ref = self.n_ref).entered();
        let mut fwd = LogMatrix::try_new(self.n_snp, self.n_ref)?;

        let first = self.panel.snp_row(SnpIdx::new(0));
        self.emission_row(fwd.row_mut(0), sample[0].observed(), &first);

        let mut log_scale = 0.0;
        for i in 1..self.n_snp {
            let (prev, cur) = fwd.two_rows_mut(i - 1, i);
            log_scale += normalize_row(prev);
            let ref_row = self.panel.snp_row(SnpIdx::from(i));
            self.transition_row(cur, prev, transitions[i - 1], sample[i].observed(), &ref_row);
        }

        let log_likelihood = self.log_prior + log_scale + log_sum(fwd.row(self.n_snp - 1));
        debug!(log_likelihood, "forward pass complete");
        Ok(ForwardMatrix {
            matrix: fwd,
            log_likelihood,
        })
    }

    fn backward_pass<O: Observation>(
        &self,
        sample: &[O],
        transitions: &[Transition],
    ) -> Result<LogMatrix> {
        let _span = info_span!("backward", n_snp = self.n_snp, n_ref = self.n_ref).entered();
        let mut bwd = LogMatrix::try_new(self.n_snp, self.n_ref)?;

        let last = self.n_snp - 1;
        let last_row = self.panel.snp_row(SnpIdx::from(last));
        self.emission_row(bwd.row_mut(last), sample[last].observed(), &last_row);

        for i in (0..last).rev() {
            let (next, cur) = bwd.two_rows_mut(i + 1, i);
            normalize_row(next);
            let ref_row = self.panel.snp_row(SnpIdx::from(i));
            self.transition_row(cur, next, transitions[i], sample[i].observed(), &ref_row);
        }
        Ok(bwd)
    }

    fn emission_row(&self, out: &mut [f64], observed: Option<Allele>, ref_row: &[Allele]) {
        let params = &self.params;
        match self.engine {
            Engine::Scalar => {
                for (o, &r) in out.iter_mut().zip(ref_row) {
                    *o = params.emission(observed, r);
                }
            }
            Engine::Parallel => {
                out.par_iter_mut()
                    .zip(ref_row.par_iter())
                    .with_min_len(PAR_MIN_LEN)
                    .for_each(|(o, &r)| *o = params.emission(observed, r));
            }
        }
    }

    /// `out[j] = log_add(adjacent[j] + nJ, J + c) + e(j)` for every haplotype
    fn transition_row(
        &self,
        out: &mut [f64],
        adjacent: &[f64],
        t: Transition,
        observed: Option<Allele>,
        ref_row: &[Allele],
    ) {
        let params = &self.params;
        let jump_in = t.jump + self.log_prior;
        match self.engine {
            Engine::Scalar => {
                for ((o, &a), &r) in out.iter_mut().zip(adjacent).zip(ref_row) {
                    *o = state_update(a, t.no_jump, jump_in, params.emission(observed, r));
                }
            }
            Engine::Parallel => {
                out.par_iter_mut()
                    .zip(adjacent.par_iter())
                    .zip(ref_row.par_iter())
                    .with_min_len(PAR_MIN_LEN)
                    .for_each(|((o, &a), &r)| {
                        *o = state_update(a, t.no_jump, jump_in, params.emission(observed, r));
                    });
            }
        }
    }
}

#[inline(always)]
fn state_update(adjacent: f64, no_jump: f64, jump_in: f64, emission: f64) -> f64 {
    log_add(adjacent + no_jump, jump_in) + emission
}

/// Merge forward and backward matrices into the posterior.
///
/// The forward storage becomes the posterior; the backward matrix is
/// consumed and dropped.
pub fn smooth(fwd: ForwardMatrix, bwd: LogMatrix) -> Result<Posterior> {
    if !fwd.matrix.same_shape(&bwd) {
        return Err(LsError::invalid_data(format!(
            "forward matrix is {} x {} but backward matrix is {} x {}",
            fwd.matrix.n_rows(),
            fwd.matrix.n_cols(),
            bwd.n_rows(),
            bwd.n_cols()
        )));
    }
    let _span = info_span!("smooth", n_snp = bwd.n_rows()).entered();

    let ForwardMatrix {
        matrix: mut post,
        log_likelihood,
    } = fwd;
    let n_snp = post.n_rows();

    for i in 0..n_snp.saturating_sub(1) {
        let row = post.row_mut(i);
        for (p, &b) in row.iter_mut().zip(bwd.row(i + 1)) {
            *p += b;
        }
        normalize_row(row);
    }
    if n_snp > 0 {
        normalize_row(post.row_mut(n_snp - 1));
    }
    drop(bwd);

    Ok(Posterior::new(post, log_likelihood))
}

/// Posterior ancestry matrix for one sample haplotype against a panel.
///
/// Validates `g` and `theta`, then runs the default (parallel) engine.
pub fn run_ls<P, O>(sample: &[O], panel: &P, g: f64, theta: f64) -> Result<Posterior>
where
    P: ReferencePanel + ?Sized,
    O: Observation,
{
    let params = ModelParams::new(g, theta)?;
    LsHmm::new(panel, params, Engine::default())?.run(sample)
}

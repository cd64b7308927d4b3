//! # Imputation Pipeline
//!
//! ## Role
//! Orchestrates one imputation run end to end:
//!
//! 1. Load the reference PLINK pair, keep the requested individuals and
//!    chromosome, and validate it as a [`RefPanel`].
//! 2. Load the sample PLINK pair and project each requested haplotype onto
//!    the panel's SNPs by id. Panel SNPs the sample lacks become missing
//!    calls.
//! 3. Run the HMM for every haplotype (in parallel across haplotypes) and
//!    select MAP alleles.
//! 4. Write calls, and optionally posteriors, in input order.
//!
//! The panel is loaded once and shared read-only by every run.

use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use crate::config::Config;
use crate::data::{Genome, HapIdx, RefPanel, ReferencePanel};
use crate::error::{LsError, Result};
use crate::io::{read_genome, CallWriter, PosteriorWriter};
use crate::model::{impute_haplotype, Engine, ImputedCall, LsHmm, ModelParams, Posterior};
use crate::utils::build_thread_pool;

/// Output of one sample haplotype
#[derive(Clone, Debug)]
pub struct HaplotypeResult {
    pub hap_id: String,
    pub calls: Vec<ImputedCall>,
    pub log_likelihood: f64,
    /// Retained only when posteriors are written
    pub posterior: Option<Posterior>,
}

impl HaplotypeResult {
    pub fn n_imputed(&self) -> usize {
        self.calls.iter().filter(|c| c.imputed).count()
    }
}

pub struct ImputationPipeline {
    config: Config,
    params: ModelParams,
}

impl ImputationPipeline {
    pub fn new(config: Config) -> Result<Self> {
        let params = config.model_params()?;
        Ok(Self { config, params })
    }

    /// Run the pipeline
    pub fn run(&mut self) -> Result<()> {
        let panel = self.load_reference()?;
        let sample = self.load_sample()?;
        let targets = self.target_haplotypes(&sample)?;

        let pool = build_thread_pool(self.config.nthreads())?;
        let results = pool.install(|| self.impute_haplotypes(&panel, &sample, &targets))?;

        self.write_results(&panel, &results)?;

        let n_imputed: usize = results.iter().map(HaplotypeResult::n_imputed).sum();
        info!(
            haplotypes = results.len(),
            imputed_calls = n_imputed,
            "Imputation complete"
        );
        Ok(())
    }

    /// Reference genome filtered and validated as a panel
    pub fn load_reference(&self) -> Result<RefPanel> {
        let mut genome = read_genome(&self.config.ref_prefix)?;
        if !self.config.keep.is_empty() {
            genome.retain_individuals(&self.config.keep);
            if genome.n_individuals() < self.config.keep.len() {
                warn!(
                    requested = self.config.keep.len(),
                    found = genome.n_individuals(),
                    "Some --keep individuals are not in the reference panel"
                );
            }
        }
        if let Some(chrom) = self.config.chrom_code() {
            genome.retain_chromosome(chrom)?;
        }
        let panel = RefPanel::from_genome(&genome)?.with_min_distance(self.config.min_dist);
        info!(
            haplotypes = panel.haplotype_count(),
            snps = panel.snp_count(),
            "Reference panel ready"
        );
        Ok(panel)
    }

    pub fn load_sample(&self) -> Result<Genome> {
        let mut genome = read_genome(&self.config.sample_prefix)?;
        if let Some(chrom) = self.config.chrom_code() {
            genome.retain_chromosome(chrom)?;
        }
        Ok(genome)
    }

    /// Haplotypes named by `--id`, or every haplotype of the sample
    pub fn target_haplotypes(&self, sample: &Genome) -> Result<Vec<HapIdx>> {
        if self.config.ids.is_empty() {
            return Ok((0..sample.n_haplotypes()).map(HapIdx::from).collect());
        }
        self.config
            .ids
            .iter()
            .map(|id| {
                sample
                    .samples()
                    .hap_index_of(id)
                    .ok_or_else(|| LsError::UnknownSample { id: id.clone() })
            })
            .collect()
    }

    /// HMM and MAP calls for each target haplotype, in `targets` order
    pub fn impute_haplotypes(
        &self,
        panel: &RefPanel,
        sample: &Genome,
        targets: &[HapIdx],
    ) -> Result<Vec<HaplotypeResult>> {
        let engine = self.config.engine();
        let hmm = LsHmm::new(panel, self.params, engine)?;
        let keep_posterior = self.config.posteriors.is_some();

        let shared = panel
            .markers()
            .iter()
            .filter(|snp| sample.markers().index_of(&snp.id).is_some())
            .count();
        if shared == 0 {
            warn!("Sample and reference share no SNP ids; every call will be imputed");
        } else {
            debug!(shared, panel_snps = panel.snp_count(), "SNP overlap");
        }

        let run_one = |hap: &HapIdx| -> Result<HaplotypeResult> {
            let hap_id = sample.samples().hap_id(*hap);
            info_span!("impute_haplotype", hap = %hap_id).in_scope(|| {
                let observed = sample.aligned_haplotype(*hap, panel.markers());
                let posterior = hmm.run(&observed)?;
                let calls = impute_haplotype(&posterior, panel, &observed)?;
                debug!(
                    log_likelihood = posterior.log_likelihood(),
                    max_row_error = posterior.max_row_sum_error(),
                    "posterior ready"
                );
                Ok(HaplotypeResult {
                    hap_id: hap_id.clone(),
                    calls,
                    log_likelihood: posterior.log_likelihood(),
                    posterior: keep_posterior.then_some(posterior),
                })
            })
        };

        match engine {
            Engine::Scalar => targets.iter().map(run_one).collect(),
            Engine::Parallel => targets.par_iter().map(run_one).collect(),
        }
    }

    fn write_results(&self, panel: &RefPanel, results: &[HaplotypeResult]) -> Result<()> {
        let mut calls_out = CallWriter::create(self.config.out.as_deref())?;
        for r in results {
            calls_out.write_haplotype(&r.hap_id, panel.markers(), &r.calls)?;
        }
        calls_out.finish()?;

        if let Some(path) = &self.config.posteriors {
            let mut post_out = PosteriorWriter::create(path, panel.hap_ids())?;
            for r in results {
                if let Some(p) = &r.posterior {
                    post_out.write_posterior(&r.hap_id, p)?;
                }
            }
            post_out.finish()?;
        }
        Ok(())
    }
}

//! # MAP Allele Selection
//!
//! Turns a posterior ancestry matrix back into allele calls. Missing calls
//! take the allele of the most probable copied haplotype
//! (`j* = argmax_j P[i][j]`, emit `ref[j*][i]`); observed calls are kept.
//! Either way the reported confidence is the posterior mass of all
//! reference haplotypes carrying the emitted allele.

use crate::data::{Allele, HapIdx, Observation, ReferencePanel, SnpIdx};
use crate::error::{LsError, Result};
use crate::model::posterior::Posterior;

/// One output call
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImputedCall {
    pub allele: Allele,
    /// True if the input call was missing
    pub imputed: bool,
    /// Posterior probability of `allele` at this SNP
    pub prob: f64,
}

/// Posterior mass per allele (indexed by `Allele::code`) at one SNP
pub fn allele_posteriors<P: ReferencePanel + ?Sized>(
    posterior: &Posterior,
    panel: &P,
    snp: SnpIdx,
) -> [f64; 4] {
    let mut mass = [0.0; 4];
    let ref_row = panel.snp_row(snp);
    for (&a, &lp) in ref_row.iter().zip(posterior.row(snp.as_usize())) {
        mass[a.code() as usize] += lp.exp();
    }
    mass
}

/// MAP allele for every SNP of `sample`
pub fn impute_haplotype<P, O>(posterior: &Posterior, panel: &P, sample: &[O]) -> Result<Vec<ImputedCall>>
where
    P: ReferencePanel + ?Sized,
    O: Observation,
{
    let n_snp = panel.snp_count();
    if posterior.n_snps() != n_snp {
        return Err(LsError::shape("posterior matrix", n_snp, posterior.n_snps()));
    }
    if sample.len() != n_snp {
        return Err(LsError::shape("sample haplotype", n_snp, sample.len()));
    }
    if posterior.n_haplotypes() != panel.haplotype_count() {
        return Err(LsError::invalid_data(format!(
            "posterior covers {} haplotypes but the panel has {}",
            posterior.n_haplotypes(),
            panel.haplotype_count()
        )));
    }

    let calls = sample
        .iter()
        .enumerate()
        .map(|(i, obs)| {
            let snp = SnpIdx::from(i);
            let (allele, imputed) = match obs.observed() {
                Some(a) => (a, false),
                None => (map_allele(posterior, panel, snp), true),
            };
            let prob = allele_posteriors(posterior, panel, snp)[allele.code() as usize];
            ImputedCall {
                allele,
                imputed,
                prob,
            }
        })
        .collect();
    Ok(calls)
}

fn map_allele<P: ReferencePanel + ?Sized>(posterior: &Posterior, panel: &P, snp: SnpIdx) -> Allele {
    let (best, _): (HapIdx, f64) = posterior.best_haplotype(snp);
    panel.allele_at(best, snp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;
    use crate::model::hmm::run_ls;
    use Allele::*;

    #[test]
    fn test_observed_calls_are_kept() {
        let panel = fixture_panel();
        let sample = fixture_sample();
        let post = run_ls(&sample, &panel, FIXTURE_G, FIXTURE_THETA).unwrap();
        let calls = impute_haplotype(&post, &panel, &sample).unwrap();

        assert_eq!(calls.iter().map(|c| c.allele).collect::<Vec<_>>(), sample);
        assert!(calls.iter().all(|c| !c.imputed));
        // Only 02_02_2 carries G at rs1
        assert!((calls[0].prob - (1.0 - EXPECTED_POSTERIOR[0][3])).abs() < TOL);
    }

    #[test]
    fn test_missing_call_takes_map_haplotype_allele() {
        let panel = fixture_panel();
        let sample = [Some(A), Some(C), None, Some(T)];
        let post = run_ls(&sample, &panel, FIXTURE_G, FIXTURE_THETA).unwrap();
        let calls = impute_haplotype(&post, &panel, &sample).unwrap();

        // 02_01_2 and 02_02_1 only differ at the missing SNP, so they tie
        // and the lower index (carrying G) wins.
        assert_eq!(post.row(2)[1], post.row(2)[2]);
        assert_eq!(calls[2].allele, G);
        assert!(calls[2].imputed);
        assert!((calls[2].prob - 0.5016138396916364).abs() < TOL);
        assert!(!calls[3].imputed);
    }

    #[test]
    fn test_allele_posteriors_sum_to_one() {
        let panel = fixture_panel();
        let post = run_ls(&fixture_sample(), &panel, FIXTURE_G, FIXTURE_THETA).unwrap();
        for i in 0..4 {
            let mass = allele_posteriors(&post, &panel, SnpIdx::from(i));
            assert!((mass.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_shape_checked() {
        let panel = fixture_panel();
        let post = run_ls(&fixture_sample(), &panel, FIXTURE_G, FIXTURE_THETA).unwrap();
        assert!(matches!(
            impute_haplotype(&post, &panel, &[A, C]),
            Err(LsError::ShapeMismatch { .. })
        ));
    }
}

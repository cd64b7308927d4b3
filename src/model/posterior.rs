//! # Posterior Ancestry Matrix
//!
//! `P[i][j] = ln Pr(sample copies reference haplotype j at SNP i | all data)`.
//! Every row is normalized, so `sum_j exp(P[i][j]) == 1` up to rounding.

use crate::data::{HapIdx, SnpIdx};
use crate::model::matrix::LogMatrix;

#[derive(Clone, Debug)]
pub struct Posterior {
    matrix: LogMatrix,
    log_likelihood: f64,
}

impl Posterior {
    pub(crate) fn new(matrix: LogMatrix, log_likelihood: f64) -> Self {
        Self {
            matrix,
            log_likelihood,
        }
    }

    pub fn n_snps(&self) -> usize {
        self.matrix.n_rows()
    }

    pub fn n_haplotypes(&self) -> usize {
        self.matrix.n_cols()
    }

    /// Log posteriors of every reference haplotype at SNP `i`
    pub fn row(&self, i: usize) -> &[f64] {
        self.matrix.row(i)
    }

    pub fn log_prob(&self, snp: usize, hap: usize) -> f64 {
        self.matrix.get(snp, hap)
    }

    pub fn prob(&self, snp: usize, hap: usize) -> f64 {
        self.matrix.get(snp, hap).exp()
    }

    /// `ln P(sample | panel)` accumulated during the forward pass
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    pub fn matrix(&self) -> &LogMatrix {
        &self.matrix
    }

    pub fn into_matrix(self) -> LogMatrix {
        self.matrix
    }

    /// Most probable copied haplotype at `snp` and its posterior probability.
    /// Ties resolve to the lowest haplotype index.
    pub fn best_haplotype(&self, snp: SnpIdx) -> (HapIdx, f64) {
        let row = self.matrix.row(snp.as_usize());
        let mut best = 0;
        for (j, &v) in row.iter().enumerate().skip(1) {
            if v > row[best] {
                best = j;
            }
        }
        (HapIdx::from(best), row.get(best).map_or(0.0, |v| v.exp()))
    }

    /// Largest deviation of any row's probability mass from 1
    pub fn max_row_sum_error(&self) -> f64 {
        self.matrix
            .rows()
            .map(|r| (r.iter().map(|v| v.exp()).sum::<f64>() - 1.0).abs())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_haplotype_tie_goes_to_lowest() {
        let h = 0.5f64.ln();
        let m = LogMatrix::from_vec(2, 3, vec![f64::NEG_INFINITY, h, h, 0.0, -40.0, -40.0]).unwrap();
        let p = Posterior::new(m, -1.0);
        assert_eq!(p.best_haplotype(SnpIdx::new(0)).0, HapIdx::new(1));
        let (hap, prob) = p.best_haplotype(SnpIdx::new(1));
        assert_eq!(hap, HapIdx::new(0));
        assert!((prob - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_row_sum_error() {
        let m = LogMatrix::from_vec(1, 2, vec![0.25f64.ln(), 0.75f64.ln()]).unwrap();
        let p = Posterior::new(m, 0.0);
        assert!(p.max_row_sum_error() < 1e-12);
        assert!((p.prob(0, 1) - 0.75).abs() < 1e-12);
    }
}

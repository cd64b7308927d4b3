//! # Reference Panel Access
//!
//! ## Role
//! The narrow read contract the HMM needs from a reference panel, and the
//! in-memory panel that satisfies it.
//!
//! ## Layout
//! `RefPanel` stores alleles SNP-major (`alleles[snp * n_ref + hap]`). One HMM
//! row touches every haplotype at a single SNP, so the row is one contiguous
//! slice for both the scalar and the data-parallel engine.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::data::allele::Allele;
use crate::data::genome::Genome;
use crate::data::haplotype::HapIdx;
use crate::data::marker::{Markers, SnpIdx};
use crate::error::{LsError, Result};

/// Read-only access to a reference panel, as consumed by the HMM.
///
/// Implementors must be `Sync`: one panel is shared by every concurrent
/// per-sample run.
pub trait ReferencePanel: Sync {
    /// Number of reference haplotypes (`n_ref`)
    fn haplotype_count(&self) -> usize;

    /// Number of SNPs (`n_snp`)
    fn snp_count(&self) -> usize;

    /// Allele of haplotype `hap` at SNP `snp`
    fn allele_at(&self, hap: HapIdx, snp: SnpIdx) -> Allele;

    /// Genetic distance (cM) between SNP `snp` and `snp + 1`
    fn genetic_distance(&self, snp: SnpIdx) -> f64;

    /// Full allele sequence of the haplotype named `id`
    fn lookup_haplotype(&self, id: &str) -> Result<Vec<Allele>>;

    /// Alleles of every haplotype at one SNP, in haplotype order
    fn snp_row(&self, snp: SnpIdx) -> Cow<'_, [Allele]> {
        Cow::Owned(
            (0..self.haplotype_count())
                .map(|h| self.allele_at(HapIdx::from(h), snp))
                .collect(),
        )
    }
}

/// A complete (no missing calls) reference panel held in memory
#[derive(Clone, Debug)]
pub struct RefPanel {
    markers: Markers,
    hap_ids: Vec<String>,
    id_to_idx: HashMap<String, HapIdx>,
    /// SNP-major: `alleles[snp * n_ref + hap]`
    alleles: Vec<Allele>,
    distances: Vec<f64>,
}

impl RefPanel {
    /// Build from explicit haplotypes (each `n_snp` long) and `n_snp - 1` distances.
    pub fn from_haplotypes(
        hap_ids: Vec<String>,
        haplotypes: &[Vec<Allele>],
        distances: &[f64],
    ) -> Result<Self> {
        let n_snp = distances.len() + 1;
        if hap_ids.len() != haplotypes.len() {
            return Err(LsError::invalid_data(format!(
                "{} haplotype ids for {} haplotypes",
                hap_ids.len(),
                haplotypes.len()
            )));
        }
        for (id, hap) in hap_ids.iter().zip(haplotypes) {
            if hap.len() != n_snp {
                return Err(LsError::shape(format!("reference haplotype {id}"), n_snp, hap.len()));
            }
        }
        let markers = Markers::from_distances(distances)?;
        let n_ref = haplotypes.len();
        let mut alleles = Vec::with_capacity(n_snp * n_ref);
        for snp in 0..n_snp {
            alleles.extend(haplotypes.iter().map(|h| h[snp]));
        }
        Self::assemble(markers, hap_ids, alleles)
    }

    /// Validate a loaded genome as a reference panel.
    ///
    /// Every call must be present and the SNPs must lie on one chromosome.
    pub fn from_genome(genome: &Genome) -> Result<Self> {
        let chroms = genome.markers().chromosomes();
        if chroms.len() > 1 {
            return Err(LsError::invalid_data(format!(
                "reference panel spans {} chromosomes ({:?}); restrict it to one",
                chroms.len(),
                chroms
            )));
        }

        let n_snp = genome.n_snps();
        let n_ref = genome.n_haplotypes();
        let hap_ids: Vec<String> = genome.samples().hap_ids().collect();

        let mut alleles = Vec::with_capacity(n_snp * n_ref);
        for snp in 0..n_snp {
            for (h, id) in hap_ids.iter().enumerate() {
                let call = genome.call_at(HapIdx::from(h), SnpIdx::from(snp));
                let allele = call.ok_or_else(|| {
                    LsError::invalid_data(format!(
                        "reference haplotype {} has a missing call at SNP {}",
                        id,
                        genome.markers()[SnpIdx::from(snp)].id
                    ))
                })?;
                alleles.push(allele);
            }
        }
        Self::assemble(genome.markers().clone(), hap_ids, alleles)
    }

    fn assemble(markers: Markers, hap_ids: Vec<String>, alleles: Vec<Allele>) -> Result<Self> {
        let distances = markers.genetic_distances()?;
        let id_to_idx = hap_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), HapIdx::from(i)))
            .collect();
        Ok(Self {
            markers,
            hap_ids,
            id_to_idx,
            alleles,
            distances,
        })
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn hap_ids(&self) -> &[String] {
        &self.hap_ids
    }

    /// All `n_snp - 1` genetic distances
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Raise every inter-SNP distance to at least `min_cm`.
    ///
    /// Co-located SNPs have a zero gap, for which no recombination term
    /// exists; the floor gives them a vanishingly small one instead.
    pub fn with_min_distance(mut self, min_cm: f64) -> Self {
        let mut raised = 0usize;
        for d in self.distances.iter_mut() {
            if *d < min_cm {
                *d = min_cm;
                raised += 1;
            }
        }
        if raised > 0 {
            tracing::debug!(raised, min_cm, "raised genetic distances to floor");
        }
        self
    }

    /// Alleles of every haplotype at one SNP
    #[inline]
    pub fn row(&self, snp: SnpIdx) -> &[Allele] {
        let n_ref = self.hap_ids.len();
        let start = snp.as_usize() * n_ref;
        &self.alleles[start..start + n_ref]
    }

    /// Same panel with haplotypes reordered: new haplotype `k` is old `order[k]`
    pub fn permuted(&self, order: &[usize]) -> Result<Self> {
        let n_ref = self.hap_ids.len();
        let mut seen = vec![false; n_ref];
        for &o in order {
            if o >= n_ref || std::mem::replace(&mut seen[o], true) {
                return Err(LsError::invalid_data("haplotype order is not a permutation"));
            }
        }
        if order.len() != n_ref {
            return Err(LsError::invalid_data("haplotype order is not a permutation"));
        }
        let hap_ids = order.iter().map(|&o| self.hap_ids[o].clone()).collect();
        let mut alleles = Vec::with_capacity(self.alleles.len());
        for snp in 0..self.markers.len() {
            let row = self.row(SnpIdx::from(snp));
            alleles.extend(order.iter().map(|&o| row[o]));
        }
        Self::assemble(self.markers.clone(), hap_ids, alleles)
    }
}

impl ReferencePanel for RefPanel {
    fn haplotype_count(&self) -> usize {
        self.hap_ids.len()
    }

    fn snp_count(&self) -> usize {
        self.markers.len()
    }

    #[inline]
    fn allele_at(&self, hap: HapIdx, snp: SnpIdx) -> Allele {
        self.alleles[snp.as_usize() * self.hap_ids.len() + hap.as_usize()]
    }

    #[inline]
    fn genetic_distance(&self, snp: SnpIdx) -> f64 {
        self.distances[snp.as_usize()]
    }

    fn lookup_haplotype(&self, id: &str) -> Result<Vec<Allele>> {
        let hap = self
            .id_to_idx
            .get(id)
            .copied()
            .ok_or_else(|| LsError::UnknownSample { id: id.to_string() })?;
        Ok((0..self.snp_count())
            .map(|s| self.allele_at(hap, SnpIdx::from(s)))
            .collect())
    }

    fn snp_row(&self, snp: SnpIdx) -> Cow<'_, [Allele]> {
        Cow::Borrowed(self.row(snp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::haplotype::Samples;
    use crate::data::marker::SnpMeta;
    use Allele::*;

    fn make_panel() -> RefPanel {
        RefPanel::from_haplotypes(
            vec!["h0".into(), "h1".into(), "h2".into()],
            &[vec![A, C, G], vec![T, T, T], vec![A, A, C]],
            &[0.5, 0.25],
        )
        .unwrap()
    }

    #[test]
    fn test_access_contract() {
        let p = make_panel();
        assert_eq!(p.haplotype_count(), 3);
        assert_eq!(p.snp_count(), 3);
        assert_eq!(p.allele_at(HapIdx::new(0), SnpIdx::new(2)), G);
        assert_eq!(p.row(SnpIdx::new(1)), &[C, T, A]);
        assert!((p.genetic_distance(SnpIdx::new(1)) - 0.25).abs() < 1e-12);
        assert_eq!(p.lookup_haplotype("h2").unwrap(), vec![A, A, C]);
        assert!(p.lookup_haplotype("nope").is_err());
    }

    #[test]
    fn test_default_snp_row_matches_borrowed() {
        struct Wrapped<'a>(&'a RefPanel);
        impl ReferencePanel for Wrapped<'_> {
            fn haplotype_count(&self) -> usize {
                self.0.haplotype_count()
            }
            fn snp_count(&self) -> usize {
                self.0.snp_count()
            }
            fn allele_at(&self, hap: HapIdx, snp: SnpIdx) -> Allele {
                self.0.allele_at(hap, snp)
            }
            fn genetic_distance(&self, snp: SnpIdx) -> f64 {
                self.0.genetic_distance(snp)
            }
            fn lookup_haplotype(&self, id: &str) -> Result<Vec<Allele>> {
                self.0.lookup_haplotype(id)
            }
        }
        let p = make_panel();
        let w = Wrapped(&p);
        for s in 0..3 {
            assert_eq!(w.snp_row(SnpIdx::from(s)).as_ref(), p.row(SnpIdx::from(s)));
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let r = RefPanel::from_haplotypes(vec!["h0".into()], &[vec![A, C]], &[0.1, 0.1]);
        assert!(matches!(r, Err(LsError::ShapeMismatch { expected: 3, found: 2, .. })));
    }

    #[test]
    fn test_from_genome_rejects_missing() {
        let markers = Markers::from_distances(&[0.1]).unwrap();
        let samples = Samples::from_ids(vec!["f_i".into()]);
        let genome = Genome::new(markers, samples, vec![Some(A), Some(C), Some(G), None]).unwrap();
        assert!(matches!(
            RefPanel::from_genome(&genome),
            Err(LsError::InvalidData { .. })
        ));
    }

    #[test]
    fn test_from_genome_rejects_multiple_chromosomes() {
        let markers = Markers::from_sorted(vec![
            SnpMeta::new(1, "a", 0.0, 1),
            SnpMeta::new(2, "b", 0.0, 1),
        ])
        .unwrap();
        let samples = Samples::from_ids(vec!["f_i".into()]);
        let genome = Genome::new(markers, samples, vec![Some(A); 4]).unwrap();
        assert!(RefPanel::from_genome(&genome).is_err());
    }

    #[test]
    fn test_from_genome_layout() {
        let markers = Markers::from_distances(&[0.1]).unwrap();
        let samples = Samples::from_ids(vec!["f_i".into()]);
        let genome =
            Genome::new(markers, samples, vec![Some(A), Some(C), Some(G), Some(T)]).unwrap();
        let p = RefPanel::from_genome(&genome).unwrap();
        assert_eq!(p.hap_ids(), &["f_i_1".to_string(), "f_i_2".to_string()]);
        assert_eq!(p.row(SnpIdx::new(0)), &[A, G]);
        assert_eq!(p.row(SnpIdx::new(1)), &[C, T]);
    }

    #[test]
    fn test_min_distance_floor() {
        let p = RefPanel::from_haplotypes(vec!["h".into()], &[vec![A, C, G]], &[0.0, 0.3])
            .unwrap()
            .with_min_distance(1e-7);
        assert_eq!(p.distances(), &[1e-7, 0.3]);
    }

    #[test]
    fn test_permuted() {
        let p = make_panel();
        let q = p.permuted(&[2, 0, 1]).unwrap();
        assert_eq!(q.hap_ids()[0], "h2");
        assert_eq!(q.row(SnpIdx::new(0)), &[A, A, T]);
        assert!(p.permuted(&[0, 0, 1]).is_err());
        assert!(p.permuted(&[0, 1]).is_err());
    }
}

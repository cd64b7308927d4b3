//! # Genome
//!
//! A set of phased haplotypes over one ordered SNP set, as loaded from a
//! PLINK fileset. Calls may be missing (`None`); a `Genome` is the sample-side
//! representation and the raw material for a [`RefPanel`](crate::data::RefPanel).
//!
//! Calls are stored haplotype-major (`calls[hap * n_snp + snp]`) so a
//! haplotype lookup is a single slice.

use std::collections::HashSet;

use crate::data::allele::Allele;
use crate::data::haplotype::{HapIdx, Samples};
use crate::data::marker::{Markers, SnpIdx};
use crate::error::{LsError, Result};

#[derive(Clone, Debug)]
pub struct Genome {
    markers: Markers,
    samples: Samples,
    calls: Vec<Option<Allele>>,
}

impl Genome {
    /// Assemble a genome; `calls` must hold `samples.n_haps() * markers.len()` entries.
    pub fn new(markers: Markers, samples: Samples, calls: Vec<Option<Allele>>) -> Result<Self> {
        let expected = samples.n_haps() * markers.len();
        if calls.len() != expected {
            return Err(LsError::invalid_data(format!(
                "genome has {} calls, expected {} haplotypes x {} SNPs",
                calls.len(),
                samples.n_haps(),
                markers.len()
            )));
        }
        Ok(Self {
            markers,
            samples,
            calls,
        })
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub fn n_snps(&self) -> usize {
        self.markers.len()
    }

    pub fn n_individuals(&self) -> usize {
        self.samples.len()
    }

    pub fn n_haplotypes(&self) -> usize {
        self.samples.n_haps()
    }

    /// Calls of one haplotype in SNP order
    pub fn haplotype(&self, hap: HapIdx) -> &[Option<Allele>] {
        let n = self.n_snps();
        let start = hap.as_usize() * n;
        &self.calls[start..start + n]
    }

    /// Calls of the haplotype named `id` (`FID_IID_1` / `FID_IID_2`)
    pub fn lookup_haplotype(&self, id: &str) -> Result<&[Option<Allele>]> {
        let hap = self
            .samples
            .hap_index_of(id)
            .ok_or_else(|| LsError::UnknownSample { id: id.to_string() })?;
        Ok(self.haplotype(hap))
    }

    pub fn call_at(&self, hap: HapIdx, snp: SnpIdx) -> Option<Allele> {
        self.calls[hap.as_usize() * self.n_snps() + snp.as_usize()]
    }

    /// Project one haplotype onto another SNP set by SNP id.
    ///
    /// SNPs of `target` absent from this genome become missing calls, which
    /// is what the imputer fills in.
    pub fn aligned_haplotype(&self, hap: HapIdx, target: &Markers) -> Vec<Option<Allele>> {
        let calls = self.haplotype(hap);
        target
            .iter()
            .map(|snp| {
                self.markers
                    .index_of(&snp.id)
                    .and_then(|i| calls[i.as_usize()])
            })
            .collect()
    }

    /// Keep only the listed individuals (`FID_IID`), in their current order.
    pub fn retain_individuals<S: AsRef<str>>(&mut self, keep: &[S]) {
        let keep: HashSet<&str> = keep.iter().map(|s| s.as_ref()).collect();
        let n_snp = self.n_snps();
        let mut ids = Vec::new();
        let mut calls = Vec::new();
        for (i, id) in self.samples.ids().iter().enumerate() {
            if !keep.contains(id.as_ref()) {
                continue;
            }
            ids.push(id.to_string());
            let start = i * 2 * n_snp;
            calls.extend_from_slice(&self.calls[start..start + 2 * n_snp]);
        }
        tracing::debug!(
            kept = ids.len(),
            dropped = self.samples.len() - ids.len(),
            "retain_individuals"
        );
        self.samples = Samples::from_ids(ids);
        self.calls = calls;
    }

    /// Keep only SNPs on `chrom`
    pub fn retain_chromosome(&mut self, chrom: u8) -> Result<()> {
        let keep: Vec<bool> = self.markers.iter().map(|s| s.chrom == chrom).collect();
        self.retain_snps(&keep)
    }

    /// Keep only SNPs whose id also appears in `other`
    pub fn restrict_to(&mut self, other: &Markers) -> Result<()> {
        let keep: Vec<bool> = self
            .markers
            .iter()
            .map(|s| other.index_of(&s.id).is_some())
            .collect();
        self.retain_snps(&keep)
    }

    fn retain_snps(&mut self, keep: &[bool]) -> Result<()> {
        let markers = self.markers.retain_mask(keep)?;
        let n_snp = self.n_snps();
        let mut calls = Vec::with_capacity(self.n_haplotypes() * markers.len());
        for hap in self.calls.chunks(n_snp.max(1)) {
            calls.extend(
                hap.iter()
                    .zip(keep)
                    .filter(|(_, &k)| k)
                    .map(|(c, _)| *c),
            );
        }
        self.markers = markers;
        self.calls = calls;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::marker::SnpMeta;
    use Allele::*;

    fn make_genome() -> Genome {
        let markers = Markers::from_sorted(vec![
            SnpMeta::new(1, "rs1", 0.0, 100),
            SnpMeta::new(1, "rs2", 0.5, 200),
            SnpMeta::new(2, "rs3", 0.0, 50),
        ])
        .unwrap();
        let samples = Samples::from_ids(vec!["01_01".into(), "01_02".into()]);
        let calls = vec![
            Some(A), Some(C), Some(G), // 01_01_1
            Some(A), None, Some(T),    // 01_01_2
            Some(C), Some(C), Some(C), // 01_02_1
            Some(G), Some(G), Some(G), // 01_02_2
        ];
        Genome::new(markers, samples, calls).unwrap()
    }

    #[test]
    fn test_lookup() {
        let g = make_genome();
        assert_eq!(g.n_haplotypes(), 4);
        assert_eq!(g.lookup_haplotype("01_01_2").unwrap(), &[Some(A), None, Some(T)]);
        assert!(matches!(
            g.lookup_haplotype("02_01_1"),
            Err(LsError::UnknownSample { .. })
        ));
        assert_eq!(g.call_at(HapIdx::new(2), SnpIdx::new(1)), Some(C));
    }

    #[test]
    fn test_wrong_call_count_rejected() {
        let markers = Markers::from_distances(&[0.1]).unwrap();
        let samples = Samples::from_ids(vec!["a_b".into()]);
        assert!(Genome::new(markers, samples, vec![Some(A); 3]).is_err());
    }

    #[test]
    fn test_retain_individuals() {
        let mut g = make_genome();
        g.retain_individuals(&["01_02"]);
        assert_eq!(g.n_individuals(), 1);
        assert_eq!(g.lookup_haplotype("01_02_2").unwrap(), &[Some(G); 3]);
        assert!(g.lookup_haplotype("01_01_1").is_err());
    }

    #[test]
    fn test_retain_chromosome() {
        let mut g = make_genome();
        g.retain_chromosome(2).unwrap();
        assert_eq!(g.n_snps(), 1);
        assert_eq!(g.lookup_haplotype("01_01_2").unwrap(), &[Some(T)]);
    }

    #[test]
    fn test_restrict_and_align() {
        let mut g = make_genome();
        let other = Markers::from_sorted(vec![
            SnpMeta::new(1, "rs2", 0.5, 200),
            SnpMeta::new(1, "rs9", 0.7, 300),
        ])
        .unwrap();

        let aligned = g.aligned_haplotype(HapIdx::new(0), &other);
        assert_eq!(aligned, vec![Some(C), None]);

        g.restrict_to(&other).unwrap();
        assert_eq!(g.n_snps(), 1);
        assert_eq!(g.haplotype(HapIdx::new(0)), &[Some(C)]);
    }
}

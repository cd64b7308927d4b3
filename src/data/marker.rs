//! # SNP Definitions
//!
//! ## Role
//! Per-SNP metadata read from a PLINK `.map` file and the ordered collection
//! of SNPs shared by every haplotype in a genome.
//!
//! ## Ordering
//! `.map` files are not guaranteed to be in physical order. `Markers` sorts
//! SNPs by `(chrom, bp)` and remembers, for each file row, where it landed
//! (`file_order`), so the `.ped` allele columns can be placed correctly.
//! `SnpIdx(i)` always refers to the i-th SNP in physical order.

use std::collections::HashMap;

use crate::error::{LsError, Result};

/// Zero-cost newtype for SNP indices (physical order)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SnpIdx(pub u32);

impl SnpIdx {
    pub fn new(idx: u32) -> Self {
        Self(idx)
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for SnpIdx {
    fn from(idx: usize) -> Self {
        Self(idx as u32)
    }
}

impl From<SnpIdx> for usize {
    fn from(idx: SnpIdx) -> usize {
        idx.0 as usize
    }
}

/// Parse a PLINK chromosome code (1-22, X=23, Y=24)
pub fn parse_chrom(token: &str) -> Option<u8> {
    let token = token.strip_prefix("chr").unwrap_or(token);
    match token {
        "X" | "x" => Some(23),
        "Y" | "y" => Some(24),
        _ => token.parse::<u8>().ok().filter(|&c| (1..=24).contains(&c)),
    }
}

/// Metadata for one SNP
#[derive(Clone, Debug, PartialEq)]
pub struct SnpMeta {
    /// Chromosome number (1-22, 23=X, 24=Y)
    pub chrom: u8,
    /// SNP identifier (usually an rsID)
    pub id: String,
    /// Genetic position in centimorgans
    pub gen_pos_cm: f64,
    /// Physical position in base pairs
    pub bp: u32,
}

impl SnpMeta {
    pub fn new(chrom: u8, id: impl Into<String>, gen_pos_cm: f64, bp: u32) -> Self {
        Self {
            chrom,
            id: id.into(),
            gen_pos_cm,
            bp,
        }
    }
}

/// SNPs in physical order
#[derive(Clone, Debug, Default)]
pub struct Markers {
    snps: Vec<SnpMeta>,
    id_to_idx: HashMap<String, SnpIdx>,
    /// `file_order[r]` = physical index of the SNP on file row `r`
    file_order: Vec<usize>,
}

impl Markers {
    /// Build from SNPs in file order, sorting them into physical order.
    ///
    /// Fails on duplicate SNP ids.
    pub fn from_file_order(snps: Vec<SnpMeta>) -> Result<Self> {
        let mut order: Vec<usize> = (0..snps.len()).collect();
        order.sort_by_key(|&r| (snps[r].chrom, snps[r].bp));

        let mut file_order = vec![0usize; snps.len()];
        for (sorted, &row) in order.iter().enumerate() {
            file_order[row] = sorted;
        }

        let mut slots: Vec<Option<SnpMeta>> = snps.into_iter().map(Some).collect();
        let sorted: Vec<SnpMeta> = order
            .iter()
            .filter_map(|&row| slots[row].take())
            .collect();

        let mut markers = Self::from_sorted(sorted)?;
        markers.file_order = file_order;
        Ok(markers)
    }

    /// Build from SNPs that are already in physical order
    pub fn from_sorted(snps: Vec<SnpMeta>) -> Result<Self> {
        let mut id_to_idx = HashMap::with_capacity(snps.len());
        for (i, snp) in snps.iter().enumerate() {
            if id_to_idx.insert(snp.id.clone(), SnpIdx::from(i)).is_some() {
                return Err(LsError::invalid_data(format!("duplicate SNP id {}", snp.id)));
            }
        }
        let file_order = (0..snps.len()).collect();
        Ok(Self {
            snps,
            id_to_idx,
            file_order,
        })
    }

    /// Synthetic markers on chromosome 1 spaced by the given distances (cM)
    pub fn from_distances(distances: &[f64]) -> Result<Self> {
        let mut gen_pos = 0.0;
        let mut snps = Vec::with_capacity(distances.len() + 1);
        snps.push(SnpMeta::new(1, "snp0", gen_pos, 1));
        for (i, &d) in distances.iter().enumerate() {
            gen_pos += d;
            snps.push(SnpMeta::new(1, format!("snp{}", i + 1), gen_pos, (i + 2) as u32));
        }
        Self::from_sorted(snps)
    }

    pub fn len(&self) -> usize {
        self.snps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snps.is_empty()
    }

    pub fn get(&self, idx: SnpIdx) -> Option<&SnpMeta> {
        self.snps.get(idx.as_usize())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SnpMeta> {
        self.snps.iter()
    }

    /// Physical index of a SNP id
    pub fn index_of(&self, id: &str) -> Option<SnpIdx> {
        self.id_to_idx.get(id).copied()
    }

    /// Physical index of the SNP on `.map` row `row`
    pub fn sorted_index_of_row(&self, row: usize) -> Option<usize> {
        self.file_order.get(row).copied()
    }

    /// Distinct chromosomes present, ascending
    pub fn chromosomes(&self) -> Vec<u8> {
        let mut chroms: Vec<u8> = self.snps.iter().map(|s| s.chrom).collect();
        chroms.dedup();
        chroms
    }

    /// Genetic distance (cM) between SNP `i` and SNP `i + 1`.
    ///
    /// Errors if the pair spans two chromosomes or the map is decreasing.
    pub fn genetic_distance(&self, i: usize) -> Result<f64> {
        let (a, b) = match (self.snps.get(i), self.snps.get(i + 1)) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(LsError::invalid_data(format!(
                    "no SNP pair at index {} (n_snp = {})",
                    i,
                    self.snps.len()
                )))
            }
        };
        if a.chrom != b.chrom {
            return Err(LsError::invalid_data(format!(
                "SNPs {} and {} are on different chromosomes",
                a.id, b.id
            )));
        }
        let d = b.gen_pos_cm - a.gen_pos_cm;
        if !d.is_finite() || d < 0.0 {
            return Err(LsError::domain(
                format!("genetic distance between {} and {}", a.id, b.id),
                d,
            ));
        }
        Ok(d)
    }

    /// All `n_snp - 1` consecutive genetic distances
    pub fn genetic_distances(&self) -> Result<Vec<f64>> {
        (0..self.snps.len().saturating_sub(1))
            .map(|i| self.genetic_distance(i))
            .collect()
    }

    /// Keep only SNPs where `keep[i]` is true. Physical order is preserved.
    pub fn retain_mask(&self, keep: &[bool]) -> Result<Self> {
        let snps = self
            .snps
            .iter()
            .zip(keep)
            .filter(|(_, &k)| k)
            .map(|(s, _)| s.clone())
            .collect();
        Self::from_sorted(snps)
    }
}

impl std::ops::Index<SnpIdx> for Markers {
    type Output = SnpMeta;

    fn index(&self, idx: SnpIdx) -> &Self::Output {
        &self.snps[idx.as_usize()]
    }
}

//! # Individual and Haplotype Definitions
//!
//! Each PLINK individual `FID IID` is diploid and contributes two phased
//! haplotypes named `FID_IID_1` and `FID_IID_2`.

use std::collections::HashMap;
use std::sync::Arc;

/// Zero-cost newtype for individual indices
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SampleIdx(pub u32);

impl SampleIdx {
    pub fn new(idx: u32) -> Self {
        Self(idx)
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// First haplotype of this individual
    pub fn hap1(self) -> HapIdx {
        HapIdx::new(self.0 * 2)
    }

    /// Second haplotype of this individual
    pub fn hap2(self) -> HapIdx {
        HapIdx::new(self.0 * 2 + 1)
    }
}

impl From<usize> for SampleIdx {
    fn from(idx: usize) -> Self {
        Self(idx as u32)
    }
}

/// Zero-cost newtype for haplotype indices
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct HapIdx(pub u32);

impl HapIdx {
    pub fn new(idx: u32) -> Self {
        Self(idx)
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Individual this haplotype belongs to
    pub fn sample(self) -> SampleIdx {
        SampleIdx::new(self.0 / 2)
    }

    pub fn is_first(self) -> bool {
        self.0 % 2 == 0
    }

    /// 1 or 2, the suffix used in haplotype ids
    pub fn copy_number(self) -> u8 {
        if self.is_first() {
            1
        } else {
            2
        }
    }
}

impl From<usize> for HapIdx {
    fn from(idx: usize) -> Self {
        Self(idx as u32)
    }
}

impl From<HapIdx> for usize {
    fn from(idx: HapIdx) -> usize {
        idx.0 as usize
    }
}

/// Individuals of one genome, in file order
#[derive(Clone, Debug, Default)]
pub struct Samples {
    /// Individual ids (`FID_IID`)
    ids: Vec<Arc<str>>,
    id_to_idx: HashMap<Arc<str>, SampleIdx>,
}

impl Samples {
    /// Create from individual ids (`FID_IID`)
    pub fn from_ids(ids: Vec<String>) -> Self {
        let ids: Vec<Arc<str>> = ids.into_iter().map(|s| s.into()).collect();
        let id_to_idx = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), SampleIdx::from(i)))
            .collect();
        Self { ids, id_to_idx }
    }

    /// Number of individuals
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of haplotypes (two per individual)
    pub fn n_haps(&self) -> usize {
        self.ids.len() * 2
    }

    pub fn index_of(&self, id: &str) -> Option<SampleIdx> {
        self.id_to_idx.get(id).copied()
    }

    pub fn ids(&self) -> &[Arc<str>] {
        &self.ids
    }

    /// Haplotype id, e.g. `03_03_1`
    pub fn hap_id(&self, hap: HapIdx) -> String {
        format!("{}_{}", self.ids[hap.sample().as_usize()], hap.copy_number())
    }

    /// Resolve a haplotype id (`FID_IID_1` / `FID_IID_2`) to its index
    pub fn hap_index_of(&self, hap_id: &str) -> Option<HapIdx> {
        let (indiv, copy) = hap_id.rsplit_once('_')?;
        let sample = self.index_of(indiv)?;
        match copy {
            "1" => Some(sample.hap1()),
            "2" => Some(sample.hap2()),
            _ => None,
        }
    }

    /// Iterate over all haplotype ids in index order
    pub fn hap_ids(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.n_haps()).map(|h| self.hap_id(HapIdx::from(h)))
    }
}

impl std::ops::Index<SampleIdx> for Samples {
    type Output = str;

    fn index(&self, idx: SampleIdx) -> &Self::Output {
        &self.ids[idx.as_usize()]
    }
}

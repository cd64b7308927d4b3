//! # Dense Log-Probability Matrix
//!
//! Row-major `n_snp x n_ref` storage shared by the forward, backward and
//! posterior matrices. Row `i` is SNP `i`; the stride is always `n_ref`.

use crate::error::{LsError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct LogMatrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f64>,
}

impl LogMatrix {
    /// Allocate a zeroed matrix, reporting allocation failure instead of aborting.
    pub fn try_new(n_rows: usize, n_cols: usize) -> Result<Self> {
        let alloc_err = || LsError::Allocation {
            rows: n_rows,
            cols: n_cols,
        };
        let len = n_rows.checked_mul(n_cols).ok_or_else(alloc_err)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| alloc_err())?;
        data.resize(len, 0.0);
        Ok(Self {
            n_rows,
            n_cols,
            data,
        })
    }

    /// Wrap existing row-major data
    pub fn from_vec(n_rows: usize, n_cols: usize, data: Vec<f64>) -> Result<Self> {
        if n_rows.checked_mul(n_cols) != Some(data.len()) {
            return Err(LsError::invalid_data(format!(
                "{} values cannot form a {} x {} matrix",
                data.len(),
                n_rows,
                n_cols
            )));
        }
        Ok(Self {
            n_rows,
            n_cols,
            data,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n_cols + col]
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    /// Mutable access to two distinct rows at once
    pub fn two_rows_mut(&mut self, a: usize, b: usize) -> (&mut [f64], &mut [f64]) {
        assert_ne!(a, b, "two_rows_mut needs distinct rows");
        let n = self.n_cols;
        if a < b {
            let (lo, hi) = self.data.split_at_mut(b * n);
            (&mut lo[a * n..(a + 1) * n], &mut hi[..n])
        } else {
            let (lo, hi) = self.data.split_at_mut(a * n);
            (&mut hi[..n], &mut lo[b * n..(b + 1) * n])
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.n_cols.max(1)).take(self.n_rows)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    pub fn same_shape(&self, other: &LogMatrix) -> bool {
        self.n_rows == other.n_rows && self.n_cols == other.n_cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_stride() {
        // 2 SNPs x 3 haplotypes: stride is the haplotype count
        let m = LogMatrix::from_vec(2, 3, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(m.row(1), &[3.0, 4.0, 5.0]);
        assert_eq!(m.get(0, 2), 2.0);
        assert_eq!(m.rows().count(), 2);
    }

    #[test]
    fn test_two_rows_mut() {
        let mut m = LogMatrix::try_new(3, 2).unwrap();
        {
            let (a, b) = m.two_rows_mut(2, 0);
            a[0] = 7.0;
            b[1] = 9.0;
        }
        assert_eq!(m.row(2), &[7.0, 0.0]);
        assert_eq!(m.row(0), &[0.0, 9.0]);
    }

    #[test]
    fn test_allocation_overflow_reported() {
        let r = LogMatrix::try_new(usize::MAX, 2);
        assert!(matches!(r, Err(LsError::Allocation { .. })));
    }

    #[test]
    fn test_from_vec_shape_checked() {
        assert!(LogMatrix::from_vec(2, 2, vec![0.0; 3]).is_err());
    }
}

//! # Log-Space Arithmetic
//!
//! The four primitives every HMM pass is built from. All values are natural
//! logarithms of probabilities.
//!
//! Reductions are strictly left-to-right so the scalar and data-parallel
//! engines produce bit-identical rows.

use crate::error::{LsError, Result};

/// `ln(e^x + e^y)` without overflow.
///
/// Factored around the larger argument, so `log_add(x, y)` and
/// `log_add(y, x)` are bitwise equal. `-inf` is the additive identity.
#[inline]
pub fn log_add(x: f64, y: f64) -> f64 {
    let (hi, lo) = if x >= y { (x, y) } else { (y, x) };
    if lo == f64::NEG_INFINITY {
        return hi;
    }
    hi + (lo - hi).exp().ln_1p()
}

/// Log of the summed probabilities in `values`, reduced left to right.
///
/// A single value is returned unchanged; an empty slice is `-inf` (ln 0).
#[inline]
pub fn log_sum(values: &[f64]) -> f64 {
    match values {
        [] => f64::NEG_INFINITY,
        [only] => *only,
        [first, rest @ ..] => rest.iter().fold(*first, |acc, &v| log_add(acc, v)),
    }
}

/// `ln(1 - e^x)` for a log-probability `x < 0`.
///
/// `x >= 0` means a probability of at least 1, whose complement has no
/// logarithm; that is a domain error rather than a clamp.
#[inline]
pub fn log_complement(x: f64) -> Result<f64> {
    if x.is_nan() || x >= 0.0 {
        return Err(LsError::domain("log_complement of a log-probability >= 0", x));
    }
    // Two branches keep full precision near both ends (Maechler's log1mexp).
    if x > -std::f64::consts::LN_2 {
        Ok((-x.exp_m1()).ln())
    } else {
        Ok((-x.exp()).ln_1p())
    }
}

/// Rescale `row` in place so it sums to 1 in probability space.
///
/// Returns the log-sum that was subtracted, which callers accumulate into
/// the sequence log-likelihood.
#[inline]
pub fn normalize_row(row: &mut [f64]) -> f64 {
    let total = log_sum(row);
    for v in row.iter_mut() {
        *v -= total;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn test_log_add() {
        let x = 0.3f64.ln();
        let y = 0.2f64.ln();
        assert!(close(log_add(x, y), 0.5f64.ln()));
        assert_eq!(log_add(x, y).to_bits(), log_add(y, x).to_bits());
        assert_eq!(log_add(x, f64::NEG_INFINITY), x);
        assert_eq!(log_add(f64::NEG_INFINITY, f64::NEG_INFINITY), f64::NEG_INFINITY);
    }

    #[test]
    fn test_log_add_large_gap() {
        // e^(y - x) would overflow with the naive factorisation
        let r = log_add(-1000.0, 0.0);
        assert!(r.is_finite());
        assert!(close(r, 0.0));
    }

    #[test]
    fn test_log_sum() {
        let vals: Vec<f64> = [0.1f64, 0.2, 0.3, 0.4].iter().map(|p| p.ln()).collect();
        assert!(close(log_sum(&vals), 0.0));
        assert_eq!(log_sum(&vals[..1]), vals[0]);
        assert_eq!(log_sum(&[]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_log_complement() {
        assert!(close(log_complement(0.25f64.ln()).unwrap(), 0.75f64.ln()));
        // 1 - e^-d ~ d for small d
        assert!((log_complement(-1e-9).unwrap() - (1e-9f64).ln()).abs() < 1e-8);
        assert_eq!(log_complement(f64::NEG_INFINITY).unwrap(), 0.0);
    }

    #[test]
    fn test_log_complement_domain() {
        assert!(matches!(log_complement(0.0), Err(LsError::NumericalDomain { .. })));
        assert!(matches!(log_complement(-0.0), Err(LsError::NumericalDomain { .. })));
        assert!(log_complement(0.1).is_err());
        assert!(log_complement(f64::NAN).is_err());
    }

    #[test]
    fn test_normalize_row() {
        let mut row = vec![0.9f64.ln(), 0.9f64.ln(), 0.9f64.ln(), 0.1f64.ln()];
        let total = normalize_row(&mut row);
        assert!(close(total, 2.8f64.ln()));
        assert!(close(log_sum(&row), 0.0));
        assert!(close(row[3].exp(), 0.1 / 2.8));
    }

    #[test]
    fn test_normalize_row_idempotent() {
        let mut row = vec![-3.0, -0.5, -7.25, -1.0, -2.0];
        normalize_row(&mut row);
        let once = row.clone();
        let second = normalize_row(&mut row);
        assert!(second.abs() < EPS);
        for (a, b) in once.iter().zip(&row) {
            assert!(close(*a, *b));
        }
    }
}

//! Four-haplotype, four-SNP reference scenario shared by the model tests.
//!
//! ```text
//!             rs1  rs2  rs3  rs4
//! 02_01_1      A    G    T    A
//! 02_01_2      A    C    G    T
//! 02_02_1      A    C    C    T
//! 02_02_2      G    C    G    C
//! 03_03_1      A    C    G    T      (sample)
//! ```
//! Gaps of 0.1, 0.2 and 0.1 cM with `g = 0.1`, `theta = 1.0`.

use crate::data::{Allele, RefPanel};
use Allele::{A, C, G, T};

pub const TOL: f64 = 1e-6;
pub const FIXTURE_G: f64 = 0.1;
pub const FIXTURE_THETA: f64 = 1.0;

pub fn fixture_panel() -> RefPanel {
    RefPanel::from_haplotypes(
        vec![
            "02_01_1".into(),
            "02_01_2".into(),
            "02_02_1".into(),
            "02_02_2".into(),
        ],
        &[
            vec![A, G, T, A],
            vec![A, C, G, T],
            vec![A, C, C, T],
            vec![G, C, G, C],
        ],
        &[0.1, 0.2, 0.1],
    )
    .unwrap()
}

pub fn fixture_sample() -> Vec<Allele> {
    vec![A, C, G, T]
}

pub const EXPECTED_POSTERIOR: [[f64; 4]; 4] = [
    [0.007682004169127661, 0.8308619624778509, 0.14150498107198667, 0.019951052281034633],
    [0.001732168759242964, 0.8759231805429016, 0.0973247978381002, 0.025019852859755082],
    [0.0022783504437034583, 0.874279472249249, 0.09714216358324991, 0.026300013723797623],
    [0.005474670956529986, 0.8458619051087488, 0.12077602266265874, 0.027887401272062663],
];

/// Forward rows, each normalized to probability 1
pub const EXPECTED_FORWARD: [[f64; 4]; 4] = [
    [0.32142857142857145, 0.32142857142857145, 0.32142857142857145, 0.03571428571428572],
    [0.048532109899404915, 0.436788989094644, 0.436788989094644, 0.0778899119113071],
    [0.01668948789147726, 0.7115906893757764, 0.07906563215286405, 0.19265419057988228],
    [0.005474670956529986, 0.8458619051087486, 0.12077602266265869, 0.027887401272062646],
];

/// Backward rows, each normalized to probability 1
pub const EXPECTED_BACKWARD: [[f64; 4]; 4] = [
    [0.034864212101533405, 0.7867259437664136, 0.15709310523136094, 0.021316738900692096],
    [0.006624653674670819, 0.7165021824634255, 0.1220282457812322, 0.15484491808067158],
    [0.01380650327856162, 0.7757414704929455, 0.08619349672143839, 0.12425852950705454],
    [0.05, 0.45, 0.45, 0.05],
];

pub const EXPECTED_LOG_LIKELIHOOD: f64 = -1.806115973516832;

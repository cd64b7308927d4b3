//! # Allele Calls
//!
//! A single nucleotide call on one haplotype. Stored as one byte so a row of
//! reference alleles is a contiguous `&[Allele]` slice.

use std::fmt;

/// One of the four nucleotides. `#[repr(u8)]` keeps the codes A=0, C=1, G=2, T=3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Allele {
    A = 0,
    C = 1,
    G = 2,
    T = 3,
}

impl Allele {
    /// All alleles in code order
    pub const ALL: [Allele; 4] = [Allele::A, Allele::C, Allele::G, Allele::T];

    /// Numeric code (A=0, C=1, G=2, T=3)
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Allele::code`]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Parse a PLINK allele token.
    ///
    /// Returns `Ok(None)` for the missing-call tokens `0`, `N`, `-` and `.`,
    /// and `Err(token)` for anything else that is not a nucleotide.
    pub fn parse_call(token: &str) -> std::result::Result<Option<Self>, String> {
        match token {
            "A" | "a" => Ok(Some(Allele::A)),
            "C" | "c" => Ok(Some(Allele::C)),
            "G" | "g" => Ok(Some(Allele::G)),
            "T" | "t" => Ok(Some(Allele::T)),
            "0" | "N" | "n" | "-" | "." => Ok(None),
            other => Err(other.to_string()),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Allele::A => 'A',
            Allele::C => 'C',
            Allele::G => 'G',
            Allele::T => 'T',
        }
    }
}

impl fmt::Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Something that can be compared against a reference allele.
///
/// Implemented for `Allele` (always observed) and `Option<Allele>`
/// (`None` = missing call) so the HMM accepts either form of sample.
pub trait Observation: Copy + Send + Sync {
    fn observed(self) -> Option<Allele>;
}

impl Observation for Allele {
    #[inline]
    fn observed(self) -> Option<Allele> {
        Some(self)
    }
}

impl Observation for Option<Allele> {
    #[inline]
    fn observed(self) -> Option<Allele> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        for a in Allele::ALL {
            assert_eq!(Allele::from_code(a.code()), Some(a));
        }
        assert_eq!(Allele::from_code(4), None);
    }

    #[test]
    fn test_parse_call() {
        assert_eq!(Allele::parse_call("G"), Ok(Some(Allele::G)));
        assert_eq!(Allele::parse_call("t"), Ok(Some(Allele::T)));
        assert_eq!(Allele::parse_call("0"), Ok(None));
        assert_eq!(Allele::parse_call("X"), Err("X".to_string()));
    }

    #[test]
    fn test_observation() {
        assert_eq!(Allele::C.observed(), Some(Allele::C));
        assert_eq!(None::<Allele>.observed(), None);
    }
}

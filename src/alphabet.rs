//! Residue alphabets and the amino acid → exchange-group reduction.
//!
//! Conventions
//! - Amino acid order is `ACDEFGHIKLMNPQRSTVWY`, exchange order is `UOJZXB`.
//!   These orders fix the n-gram enumeration and therefore the column layout.
//! - Lookups are case-sensitive: only uppercase residues are recognised.
//! - Residues outside the 20 amino acids pass through [`reduce`] unchanged.
//!   Ambiguity codes such as `X`, `B` or `Z` then read as exchange symbols;
//!   use [`reduce_strict`] or [`validate_residues`] to reject them instead.

use crate::error::{FeatureError, Result};

/// The 20 standard amino acids, in column order.
pub const AMINO_ACIDS: &[u8; 20] = b"ACDEFGHIKLMNPQRSTVWY";

/// The 6 exchange groups (PAM substitution classes), in column order.
pub const EXCHANGE_GROUPS: &[u8; 6] = b"UOJZXB";

const NONE: u8 = 0xFF;

/// 256-entry LUT: byte → exchange symbol. Identity for unmapped bytes.
pub static EXCHANGE_LUT: [u8; 256] = {
    let mut t = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        t[i] = i as u8;
        i += 1;
    }
    // basic
    t[b'H' as usize] = b'U';
    t[b'R' as usize] = b'U';
    t[b'K' as usize] = b'U';
    // acidic / amide
    t[b'D' as usize] = b'O';
    t[b'E' as usize] = b'O';
    t[b'N' as usize] = b'O';
    t[b'Q' as usize] = b'O';
    t[b'C' as usize] = b'J';
    // small / neutral
    t[b'S' as usize] = b'Z';
    t[b'T' as usize] = b'Z';
    t[b'P' as usize] = b'Z';
    t[b'A' as usize] = b'Z';
    t[b'G' as usize] = b'Z';
    // aliphatic hydrophobic
    t[b'M' as usize] = b'X';
    t[b'I' as usize] = b'X';
    t[b'L' as usize] = b'X';
    t[b'V' as usize] = b'X';
    // aromatic
    t[b'F' as usize] = b'B';
    t[b'Y' as usize] = b'B';
    t[b'W' as usize] = b'B';
    t
};

/// Build a byte → symbol-rank LUT (`0xFF` when absent).
const fn rank_lut(symbols: &[u8]) -> [u8; 256] {
    let mut t = [NONE; 256];
    let mut i = 0;
    while i < symbols.len() {
        t[symbols[i] as usize] = i as u8;
        i += 1;
    }
    t
}

static AMINO_ACID_RANK: [u8; 256] = rank_lut(AMINO_ACIDS);
static EXCHANGE_RANK: [u8; 256] = rank_lut(EXCHANGE_GROUPS);

/// Which alphabet a table or column block refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Alphabet {
    /// The 20 standard amino acids.
    AminoAcid,
    /// The 6 exchange groups.
    Exchange,
}

impl Alphabet {
    /// Symbols in enumeration order.
    #[inline]
    pub fn symbols(self) -> &'static [u8] {
        match self {
            Alphabet::AminoAcid => AMINO_ACIDS,
            Alphabet::Exchange => EXCHANGE_GROUPS,
        }
    }

    /// Number of symbols.
    #[inline]
    pub fn size(self) -> usize {
        self.symbols().len()
    }

    /// Rank of `b` within this alphabet, `None` if `b` is not a member.
    #[inline]
    pub fn rank(self, b: u8) -> Option<usize> {
        let lut = match self {
            Alphabet::AminoAcid => &AMINO_ACID_RANK,
            Alphabet::Exchange => &EXCHANGE_RANK,
        };
        let r = lut[b as usize];
        if r == NONE { None } else { Some(r as usize) }
    }

    /// Header label of the entropy column for n-gram length `n`.
    pub fn entropy_label(self, n: usize) -> String {
        match self {
            Alphabet::AminoAcid => format!("Entropy_{n}"),
            Alphabet::Exchange => format!("exEntropy_{n}"),
        }
    }
}

/// Exchange group of a single residue, `None` if unmapped.
#[inline]
pub fn exchange_group(b: u8) -> Option<u8> {
    Alphabet::AminoAcid.rank(b).map(|_| EXCHANGE_LUT[b as usize])
}

/// Reduce an amino acid sequence to exchange groups. Unmapped bytes are kept.
pub fn reduce(seq: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len());
    reduce_into(seq, &mut out);
    out
}

/// Like [`reduce`], writing into a reusable buffer (cleared first).
#[inline]
pub fn reduce_into(seq: &[u8], out: &mut Vec<u8>) {
    out.clear();
    out.extend(seq.iter().map(|&b| EXCHANGE_LUT[b as usize]));
}

/// Reduce, failing on the first residue that has no exchange mapping.
pub fn reduce_strict(seq: &[u8]) -> Result<Vec<u8>> {
    validate_residues(seq)?;
    Ok(reduce(seq))
}

/// [`reduce`] for text. Non-ASCII characters pass through unchanged.
pub fn reduce_str(seq: &str) -> String {
    seq.chars()
        .map(|c| {
            if c.is_ascii() {
                EXCHANGE_LUT[c as usize] as char
            } else {
                c
            }
        })
        .collect()
}

/// Check that every residue is one of the 20 standard amino acids.
pub fn validate_residues(seq: &[u8]) -> Result<()> {
    match seq
        .iter()
        .position(|&b| Alphabet::AminoAcid.rank(b).is_none())
    {
        None => Ok(()),
        Some(position) => Err(FeatureError::Alphabet {
            residue: seq[position] as char,
            position,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduces_every_group() {
        assert_eq!(
            reduce_str("HRKDENQCSTPAGMILVFYW"),
            "UUUOOOOJZZZZZXXXXBBB"
        );
        assert_eq!(reduce(b"HRKDENQCSTPAGMILVFYW"), b"UUUOOOOJZZZZZXXXXBBB");
    }

    #[test]
    fn unmapped_residues_pass_through() {
        assert_eq!(reduce(b"AXa*"), b"ZXa*");
        assert_eq!(reduce_str("MKé"), "XUé");
        assert_eq!(exchange_group(b'X'), None);
        assert_eq!(exchange_group(b'W'), Some(b'B'));
    }

    #[test]
    fn strict_reports_first_offender() {
        let err = reduce_strict(b"ACDXB").unwrap_err();
        match err {
            FeatureError::Alphabet { residue, position } => {
                assert_eq!(residue, 'X');
                assert_eq!(position, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(reduce_strict(b"ACD").unwrap(), b"ZJO");
    }

    #[test]
    fn strict_is_case_sensitive() {
        assert!(validate_residues(b"acd").is_err());
    }

    #[test]
    fn ranks_follow_column_order() {
        for (i, &b) in AMINO_ACIDS.iter().enumerate() {
            assert_eq!(Alphabet::AminoAcid.rank(b), Some(i));
        }
        for (i, &b) in EXCHANGE_GROUPS.iter().enumerate() {
            assert_eq!(Alphabet::Exchange.rank(b), Some(i));
        }
        assert_eq!(Alphabet::Exchange.rank(b'A'), None);
        assert_eq!(Alphabet::AminoAcid.rank(b'B'), None);
    }

    #[test]
    fn every_amino_acid_maps_into_exchange_alphabet() {
        for &b in AMINO_ACIDS {
            let g = exchange_group(b).unwrap();
            assert!(Alphabet::Exchange.rank(g).is_some());
        }
    }
}

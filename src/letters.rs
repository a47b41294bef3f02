// 🔤 Letters - closed alphabet + letter-to-digit tables
//
// A name is only ever mapped through a LetterMap, so swapping numerology
// systems means swapping the table, never the calculator.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// LETTER
// ============================================================================

/// One of the 26 uppercase Latin letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Letter {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
}

impl Letter {
    /// All letters in alphabetical order
    pub const ALL: [Letter; 26] = [
        Letter::A, Letter::B, Letter::C, Letter::D, Letter::E, Letter::F, Letter::G,
        Letter::H, Letter::I, Letter::J, Letter::K, Letter::L, Letter::M, Letter::N,
        Letter::O, Letter::P, Letter::Q, Letter::R, Letter::S, Letter::T, Letter::U,
        Letter::V, Letter::W, Letter::X, Letter::Y, Letter::Z,
    ];

    /// Parse an ASCII letter of either case.
    ///
    /// Non-ASCII letters (`É`, `ß`, the Kelvin sign...) are not part of the
    /// alphabet even when their uppercase form would be.
    pub fn from_char(c: char) -> Option<Letter> {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let index = (c.to_ascii_uppercase() as u8 - b'A') as usize;
        Some(Letter::ALL[index])
    }

    /// Zero-based position in the alphabet
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_char(self) -> char {
        (b'A' + self as u8) as char
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ============================================================================
// LETTER MAP
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("digit {digit} for letter {letter} is outside 1..=9")]
pub struct TableError {
    pub letter: Letter,
    pub digit: u8,
}

/// Immutable Letter -> digit table, total over A-Z.
///
/// The Pythagorean table is canonical. The project notes also carry a
/// second, inconsistent table (S=3, F=8, O=7, ...) that is not implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterMap {
    digits: [u8; 26],
}

impl LetterMap {
    /// A,J,S=1  B,K,T=2  C,L,U=3  D,M,V=4  E,N,W=5  F,O,X=6  G,P,Y=7  H,Q,Z=8  I,R=9
    pub const PYTHAGOREAN: LetterMap = LetterMap {
        digits: [
            1, 2, 3, 4, 5, 6, 7, 8, 9, // A..I
            1, 2, 3, 4, 5, 6, 7, 8, 9, // J..R
            1, 2, 3, 4, 5, 6, 7, 8, // S..Z
        ],
    };

    /// Build a custom table, indexed A..Z. Every digit must be in 1..=9.
    pub fn from_digits(digits: [u8; 26]) -> Result<Self, TableError> {
        for letter in Letter::ALL {
            let digit = digits[letter.index()];
            if !(1..=9).contains(&digit) {
                return Err(TableError { letter, digit });
            }
        }
        Ok(LetterMap { digits })
    }

    pub fn digit(&self, letter: Letter) -> u8 {
        self.digits[letter.index()]
    }

    /// Letters grouped by digit, for help screens: `[(1, [A, J, S]), ...]`
    pub fn groups(&self) -> Vec<(u8, Vec<Letter>)> {
        (1..=9u8)
            .map(|digit| {
                let letters: Vec<Letter> = Letter::ALL
                    .iter()
                    .copied()
                    .filter(|l| self.digit(*l) == digit)
                    .collect();
                (digit, letters)
            })
            .filter(|(_, letters)| !letters.is_empty())
            .collect()
    }
}

impl Default for LetterMap {
    fn default() -> Self {
        LetterMap::PYTHAGOREAN
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_char_is_case_insensitive() {
        assert_eq!(Letter::from_char('j'), Some(Letter::J));
        assert_eq!(Letter::from_char('J'), Some(Letter::J));
        assert_eq!(Letter::from_char('z'), Some(Letter::Z));
    }

    #[test]
    fn test_from_char_rejects_non_latin() {
        assert_eq!(Letter::from_char('0'), None);
        assert_eq!(Letter::from_char('-'), None);
        assert_eq!(Letter::from_char('é'), None);
        assert_eq!(Letter::from_char('ß'), None);
        // Kelvin sign lowercases to ASCII 'k' but is not a Latin letter
        assert_eq!(Letter::from_char('\u{212A}'), None);
    }

    #[test]
    fn test_letter_roundtrips_through_char() {
        for letter in Letter::ALL {
            assert_eq!(Letter::from_char(letter.as_char()), Some(letter));
        }
    }

    #[test]
    fn test_pythagorean_table() {
        let map = LetterMap::PYTHAGOREAN;
        let expected = [
            ("AJS", 1), ("BKT", 2), ("CLU", 3), ("DMV", 4), ("ENW", 5),
            ("FOX", 6), ("GPY", 7), ("HQZ", 8), ("IR", 9),
        ];
        for (letters, digit) in expected {
            for c in letters.chars() {
                let letter = Letter::from_char(c).unwrap();
                assert_eq!(map.digit(letter), digit, "letter {}", c);
            }
        }
    }

    #[test]
    fn test_groups_cover_alphabet() {
        let groups = LetterMap::default().groups();
        assert_eq!(groups.len(), 9);
        assert_eq!(groups[0], (1, vec![Letter::A, Letter::J, Letter::S]));
        assert_eq!(groups[8], (9, vec![Letter::I, Letter::R]));
        let total: usize = groups.iter().map(|(_, l)| l.len()).sum();
        assert_eq!(total, 26);
    }

    #[test]
    fn test_from_digits_validates_range() {
        let mut digits = [1u8; 26];
        assert!(LetterMap::from_digits(digits).is_ok());

        digits[Letter::Q.index()] = 0;
        let err = LetterMap::from_digits(digits).unwrap_err();
        assert_eq!(err, TableError { letter: Letter::Q, digit: 0 });
    }
}

// 🔢 Calculator - name → numerology number
//
// normalize → validate → map → sum → reduce → classify
// Pure: no state survives a call, the same letters always give the same result.

use crate::letters::{Letter, LetterMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Sums that stop the reduction loop
pub const MASTER_NUMBERS: [u32; 3] = [11, 22, 33];

// ============================================================================
// ERRORS
// ============================================================================

/// User-input errors. Both render as a message for the person typing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculationError {
    #[error("Please enter a name")]
    EmptyInput,

    /// Whole input rejected; `chars` lists each offending char once, as typed
    #[error("Only letters A-Z and spaces are allowed (found {})", quote_chars(.chars))]
    InvalidCharacters { chars: Vec<char> },
}

fn quote_chars(chars: &[char]) -> String {
    chars
        .iter()
        .map(|c| format!("{:?}", c))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterValue {
    pub letter: Letter,
    pub digit: u8,
}

/// Outcome of one calculation.
///
/// `name` keeps what the user typed; every other field is derived from the
/// normalized letters only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub name: String,
    pub letters: Vec<LetterValue>,
    pub sum: u32,
    /// Each value produced by digit-summing, in order. Empty when `sum`
    /// already is the final value.
    pub reductions: Vec<u32>,
    pub value: u32,
    pub is_master: bool,
}

impl CalculationResult {
    /// The letters that were counted, e.g. "JOHN"
    pub fn normalized(&self) -> String {
        self.letters.iter().map(|lv| lv.letter.as_char()).collect()
    }

    pub fn meaning(&self) -> Option<&'static str> {
        meaning(self.value)
    }

    /// "J=1 + O=6 + H=8 + N=5 = 20"
    pub fn breakdown(&self) -> String {
        let terms: Vec<String> = self
            .letters
            .iter()
            .map(|lv| format!("{}={}", lv.letter, lv.digit))
            .collect();
        format!("{} = {}", terms.join(" + "), self.sum)
    }

    /// "29 → 11" or just "5" when nothing was reduced
    pub fn reduction_path(&self) -> String {
        std::iter::once(self.sum)
            .chain(self.reductions.iter().copied())
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

// ============================================================================
// CALCULATOR
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator {
    map: LetterMap,
}

impl Calculator {
    /// Calculator over the Pythagorean table
    pub fn new() -> Self {
        Self::with_map(LetterMap::PYTHAGOREAN)
    }

    pub fn with_map(map: LetterMap) -> Self {
        Calculator { map }
    }

    pub fn letter_map(&self) -> &LetterMap {
        &self.map
    }

    pub fn compute(&self, name: &str) -> Result<CalculationResult, CalculationError> {
        let normalized = normalize(name);
        if normalized.is_empty() {
            return Err(CalculationError::EmptyInput);
        }

        let mut letters = Vec::with_capacity(normalized.len());
        let mut invalid: Vec<char> = Vec::new();

        for c in normalized.chars() {
            match Letter::from_char(c) {
                Some(letter) => letters.push(LetterValue {
                    letter,
                    digit: self.map.digit(letter),
                }),
                None if !invalid.contains(&c) => invalid.push(c),
                None => {}
            }
        }

        if !invalid.is_empty() {
            return Err(CalculationError::InvalidCharacters { chars: invalid });
        }

        let sum: u32 = letters.iter().map(|lv| u32::from(lv.digit)).sum();
        let (value, reductions) = reduce(sum);

        debug!(name = %normalized, sum, value, "computed numerology value");

        Ok(CalculationResult {
            name: name.to_string(),
            letters,
            sum,
            reductions,
            value,
            is_master: is_master_number(value),
        })
    }
}

/// `Calculator::new().compute(name)`
pub fn compute(name: &str) -> Result<CalculationResult, CalculationError> {
    Calculator::new().compute(name)
}

// ============================================================================
// BUILDING BLOCKS
// ============================================================================

/// Drop every whitespace char, uppercase ASCII letters, leave the rest as-is.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Digit-sum until the value is ≤ 9 or a master number.
///
/// Returns the final value and every intermediate sum. Terminates because
/// the digit sum of any n > 9 is strictly smaller than n.
pub fn reduce(sum: u32) -> (u32, Vec<u32>) {
    let mut value = sum;
    let mut steps = Vec::new();

    while value > 9 && !is_master_number(value) {
        value = digit_sum(value);
        steps.push(value);
    }

    (value, steps)
}

fn digit_sum(mut n: u32) -> u32 {
    let mut total = 0;
    while n > 0 {
        total += n % 10;
        n /= 10;
    }
    total
}

pub fn is_master_number(value: u32) -> bool {
    MASTER_NUMBERS.contains(&value)
}

/// Short interpretation of a final value (1-9, 11, 22, 33)
pub fn meaning(value: u32) -> Option<&'static str> {
    let text = match value {
        1 => "Leadership, independence, pioneering spirit",
        2 => "Cooperation, balance, diplomacy",
        3 => "Creativity, communication, optimism",
        4 => "Stability, hard work, practicality",
        5 => "Freedom, adventure, versatility",
        6 => "Nurturing, responsibility, compassion",
        7 => "Spirituality, introspection, analysis",
        8 => "Material success, ambition, authority",
        9 => "Humanitarian, generous, completion",
        11 => "Intuition, inspiration, enlightenment (Master Number)",
        22 => "Master builder, practical idealism (Master Number)",
        33 => "Master teacher, compassion, healing (Master Number)",
        _ => return None,
    };
    Some(text)
}

/// Every value `compute` can produce, in display order
pub fn possible_values() -> impl Iterator<Item = u32> {
    (1..=9).chain(MASTER_NUMBERS)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_john() {
        let result = compute("JOHN").unwrap();

        let digits: Vec<u8> = result.letters.iter().map(|lv| lv.digit).collect();
        assert_eq!(digits, vec![1, 6, 8, 5]);
        assert_eq!(result.sum, 20);
        assert_eq!(result.reductions, vec![2]);
        assert_eq!(result.value, 2);
        assert!(!result.is_master);
        assert_eq!(result.name, "JOHN");
    }

    #[test]
    fn test_name_is_kept_as_typed() {
        let result = compute("  Mary Jane ").unwrap();
        assert_eq!(result.name, "  Mary Jane ");
        assert_eq!(result.normalized(), "MARYJANE");
    }

    #[test]
    fn test_master_number_stops_reduction() {
        // R=9 ×3 + B=2 = 29 → 11
        let result = compute("RRRB").unwrap();
        assert_eq!(result.sum, 29);
        assert_eq!(result.reductions, vec![11]);
        assert_eq!(result.value, 11);
        assert!(result.is_master);
    }

    #[test]
    fn test_master_sum_is_not_reduced_at_all() {
        // R + R + D = 9 + 9 + 4 = 22
        let result = compute("rrd").unwrap();
        assert_eq!(result.sum, 22);
        assert!(result.reductions.is_empty());
        assert_eq!(result.value, 22);
        assert!(result.is_master);

        // 9 ×3 + F=6 = 33
        let result = compute("RRRF").unwrap();
        assert_eq!(result.value, 33);
        assert!(result.is_master);
    }

    #[test]
    fn test_single_letter() {
        let result = compute("a").unwrap();
        assert_eq!(result.sum, 1);
        assert_eq!(result.value, 1);
        assert!(result.reductions.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(compute(""), Err(CalculationError::EmptyInput));
        assert_eq!(compute("   "), Err(CalculationError::EmptyInput));
        assert_eq!(compute("\t\n \r"), Err(CalculationError::EmptyInput));
    }

    #[test]
    fn test_invalid_characters_reject_whole_input() {
        assert_eq!(
            compute("J0HN"),
            Err(CalculationError::InvalidCharacters { chars: vec!['0'] })
        );
        assert_eq!(
            compute("O'Brien-Smith!!"),
            Err(CalculationError::InvalidCharacters { chars: vec!['\'', '-', '!'] })
        );
        assert_eq!(
            compute("José"),
            Err(CalculationError::InvalidCharacters { chars: vec!['é'] })
        );
    }

    #[test]
    fn test_invalid_characters_message() {
        let err = compute("J0HN!").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only letters A-Z and spaces are allowed (found '0', '!')"
        );
        assert_eq!(CalculationError::EmptyInput.to_string(), "Please enter a name");
    }

    #[test]
    fn test_reduce() {
        assert_eq!(reduce(5), (5, vec![]));
        assert_eq!(reduce(15), (6, vec![6]));
        assert_eq!(reduce(29), (11, vec![11]));
        assert_eq!(reduce(38), (11, vec![11]));
        assert_eq!(reduce(99), (9, vec![18, 9]));
        assert_eq!(reduce(11), (11, vec![]));
        assert_eq!(reduce(22), (22, vec![]));
        assert_eq!(reduce(33), (33, vec![]));
        assert_eq!(reduce(44), (8, vec![8]));
        assert_eq!(reduce(199), (1, vec![19, 10, 1]));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("j o\tH\nn"), "JOHN");
        assert_eq!(normalize("J0hn!"), "J0HN!");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_breakdown_and_path() {
        let result = compute("John").unwrap();
        assert_eq!(result.breakdown(), "J=1 + O=6 + H=8 + N=5 = 20");
        assert_eq!(result.reduction_path(), "20 → 2");

        let single = compute("E").unwrap();
        assert_eq!(single.reduction_path(), "5");
    }

    #[test]
    fn test_meanings_cover_every_value() {
        for value in possible_values() {
            let text = meaning(value).unwrap();
            assert_eq!(text.contains("Master Number"), is_master_number(value));
        }
        assert_eq!(meaning(0), None);
        assert_eq!(meaning(10), None);
    }

    #[test]
    fn test_custom_table() {
        let map = LetterMap::from_digits([9; 26]).unwrap();
        let calculator = Calculator::with_map(map);
        let result = calculator.compute("ab").unwrap();
        assert_eq!(result.sum, 18);
        assert_eq!(result.value, 9);
    }
}

//! Last-standalone-number extraction, the compatibility path for prompts
//! that never taught the model a final-answer marker.
//!
//! Kept isolated from the marker path: this extractor has historically
//! grabbed intermediate values out of chain-of-thought text, so it must be
//! testable (and retirable) on its own, and its hits are reported under a
//! distinct extraction source.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Integer or decimal token with optional sign, e.g. `20`, `-10.5`, `.5`.
    static ref NUMBER: Regex = Regex::new(r"[-+]?\d*\.\d+|[-+]?\d+").unwrap();
}

/// Returns the last numeric token that stands on its own, i.e. is not
/// embedded in an identifier like `v2` or `step3`.
pub fn last_standalone_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    NUMBER
        .find_iter(text)
        .filter(|m| is_standalone(bytes, m.start(), m.end()))
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

fn is_standalone(bytes: &[u8], start: usize, end: usize) -> bool {
    let before_ok = start == 0 || {
        let b = bytes[start - 1];
        !(b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
    };
    let after_ok = end == bytes.len() || {
        let b = bytes[end];
        !(b.is_ascii_alphanumeric() || b == b'_')
    };
    before_ok && after_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_last_number_in_chain_of_thought() {
        let text = "\
            To evaluate ((2 + 3) * 4) / 3, follow the order of operations:\n\
            1. (2 + 3) = 5\n\
            2. 5 * 4 = 20\n\
            3. 20 / 3 = 6.67\n\
            So, the final result is 6.67.";
        assert_eq!(last_standalone_number(text), Some(6.67));
    }

    #[test]
    fn simple_sentence_answer() {
        assert_eq!(last_standalone_number("The answer is 20."), Some(20.0));
    }

    #[test]
    fn negative_decimal() {
        assert_eq!(last_standalone_number("The result is -10.5."), Some(-10.5));
    }

    #[test]
    fn no_numbers_yields_none() {
        assert_eq!(last_standalone_number("I am not sure."), None);
        assert_eq!(last_standalone_number(""), None);
    }

    #[test]
    fn numbers_inside_identifiers_are_not_standalone() {
        assert_eq!(last_standalone_number("see v2 of step3"), None);
        assert_eq!(last_standalone_number("result_1 pending"), None);
    }

    #[test]
    fn standalone_number_beats_embedded_ones() {
        assert_eq!(last_standalone_number("v2 gives 8"), Some(8.0));
    }

    #[test]
    fn trailing_punctuation_does_not_block_extraction() {
        assert_eq!(last_standalone_number("so: 42!"), Some(42.0));
        assert_eq!(last_standalone_number("roughly 3.14..."), Some(3.14));
    }
}

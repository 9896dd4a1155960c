//! Phone-number formatting used by input surfaces.

const MAX_DIGITS: usize = 11;

/// Format a free-text phone input as the user types: keep digits only,
/// cap at 11, and hyphenate as `NNN`, `NNN-NNNN` or `NNN-NNNN-NNNN`.
pub fn format_phone(input: &str) -> String {
    let digits: String = input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(MAX_DIGITS)
        .collect();

    match digits.len() {
        0..=3 => digits,
        4..=7 => format!("{}-{}", &digits[..3], &digits[3..]),
        _ => format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..]),
    }
}

/// Number of ASCII digits in a free-text phone input.
pub fn count_digits(input: &str) -> usize {
    input.chars().filter(|c| c.is_ascii_digit()).count()
}

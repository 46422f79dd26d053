//! # Identifier Formatting
//!
//! Pure formatting and parsing for generated identifiers. Randomness and
//! clock reads are passed in, so every function here is deterministic;
//! the persistence side (max-suffix lookup, collision retry) lives in
//! `stockwise-db`.
//!
//! ## Formats
//! ```text
//! SKU          GRA-38412907-0421      {PREFIX}-{millis mod 10^8}-{random}
//! GRN number   GRN-261018-007         GRN-{YYMMDD}-{seq:03}
//! GRN fallback GRN-261018-008-5531    last attempt, random disambiguator
//! ```

use chrono::NaiveDate;

/// Prefix used when a category has no usable characters.
pub const DEFAULT_SKU_PREFIX: &str = "GEN";

const SKU_PREFIX_LEN: usize = 3;
const SKU_TIMESTAMP_MODULUS: i64 = 100_000_000;

// =============================================================================
// SKU
// =============================================================================

/// Derives a three-letter uppercase prefix from a category name.
///
/// ## Example
/// ```rust
/// use stockwise_core::sequence::sku_prefix;
///
/// assert_eq!(sku_prefix("Grains"), "GRA");
/// assert_eq!(sku_prefix("tea"), "TEA");
/// assert_eq!(sku_prefix("Oil"), "OIL");
/// assert_eq!(sku_prefix("  "), "GEN");
/// ```
pub fn sku_prefix(category: &str) -> String {
    let letters: String = category
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(SKU_PREFIX_LEN)
        .collect::<String>()
        .to_ascii_uppercase();

    match letters.len() {
        0 => DEFAULT_SKU_PREFIX.to_string(),
        n if n < SKU_PREFIX_LEN => format!("{letters:X<width$}", width = SKU_PREFIX_LEN),
        _ => letters,
    }
}

/// Formats a SKU from its parts.
///
/// `timestamp_millis` is reduced to its last eight digits; `random` is
/// zero-padded to `random_digits`, held to `1..=9` like [`random_bound`].
pub fn format_sku(prefix: &str, timestamp_millis: i64, random: u32, random_digits: u32) -> String {
    let stamp = timestamp_millis.rem_euclid(SKU_TIMESTAMP_MODULUS);
    let width = suffix_digits(random_digits) as usize;
    format!("{prefix}-{stamp:08}-{random:0width$}")
}

/// Exclusive upper bound for a random suffix of `digits` digits.
pub fn random_bound(digits: u32) -> u32 {
    10u32.pow(suffix_digits(digits))
}

// a u32 suffix holds at most nine digits
fn suffix_digits(digits: u32) -> u32 {
    digits.clamp(1, 9)
}

// =============================================================================
// GRN Number
// =============================================================================

/// `GRN-{YYMMDD}-`, the prefix shared by every receipt numbered on `date`.
pub fn grn_date_prefix(date: NaiveDate) -> String {
    format!("GRN-{}-", date.format("%y%m%d"))
}

/// Formats a sequential GRN number.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use stockwise_core::sequence::format_grn_number;
///
/// let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
/// assert_eq!(format_grn_number(date, 7), "GRN-261018-007");
/// ```
pub fn format_grn_number(date: NaiveDate, seq: u32) -> String {
    format!("{}{seq:03}", grn_date_prefix(date))
}

/// Formats the last-attempt GRN number with a random disambiguator.
pub fn format_fallback_grn_number(date: NaiveDate, seq: u32, random: u32) -> String {
    format!("{}-{random:04}", format_grn_number(date, seq))
}

/// Extracts the sequence from a number carrying `prefix`.
///
/// Fallback numbers parse to their sequential part. Anything else is `None`.
pub fn parse_grn_sequence(prefix: &str, grn_number: &str) -> Option<u32> {
    let rest = grn_number.strip_prefix(prefix)?;
    let seq = rest.split('-').next()?;
    if seq.is_empty() || !seq.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    seq.parse().ok()
}

/// Next sequence after the highest one found among `existing`.
pub fn next_grn_sequence<'a, I>(prefix: &str, existing: I) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    existing
        .into_iter()
        .filter_map(|n| parse_grn_sequence(prefix, n))
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Scan Payload Normalization
//!
//! Warehouse QR labels embed the product id in a run of digits, surrounded
//! by arbitrary prefixes and suffixes (`PRD-00042-X`, `00042`, ...). The
//! local-match resolution strategy only needs that digit run.

/// Extracts the first run of ASCII digits from a raw scanned payload.
///
/// Returns `None` when the payload is empty or contains no digits - both
/// are treated as "no payload" and the scan keeps polling.
///
/// Leading zeros are kept: the match against product options is an exact
/// string comparison, not numeric.
///
/// ## Example
/// ```rust
/// use lager_core::scan_code::normalize_payload;
///
/// assert_eq!(normalize_payload("PRD-00042-X").as_deref(), Some("00042"));
/// assert_eq!(normalize_payload("   "), None);
/// ```
pub fn normalize_payload(raw: &str) -> Option<String> {
    let raw = raw.trim();

    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let digits: String = raw[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_digit_run() {
        assert_eq!(normalize_payload("PRD-00042-X").as_deref(), Some("00042"));
        assert_eq!(normalize_payload("00042").as_deref(), Some("00042"));
        assert_eq!(normalize_payload("a1b2c3").as_deref(), Some("1"));
    }

    #[test]
    fn trims_before_matching() {
        assert_eq!(normalize_payload("  7  ").as_deref(), Some("7"));
    }

    #[test]
    fn no_digits_means_no_payload() {
        assert_eq!(normalize_payload(""), None);
        assert_eq!(normalize_payload("   "), None);
        assert_eq!(normalize_payload("no-digits-here"), None);
    }
}

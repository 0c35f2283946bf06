//! Utility functions for string and number formatting.
//!
//! - String truncation for logging
//! - Tracking-query removal for article links
//! - Thousands separators and nearest-thousand rounding for view counts

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (backing off to a char
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Drop everything from the first `?` onwards.
///
/// Medium appends `?source=rss...` tracking parameters to every feed link.
/// The cut is textual; the remainder is not normalized.
pub fn strip_query(link: &str) -> &str {
    link.split('?').next().unwrap_or(link)
}

/// Format an integer with `,` thousands separators.
///
/// ```ignore
/// assert_eq!(format_thousands(1532), "1,532");
/// ```
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Round to the nearest multiple of 1000, ties to even.
///
/// 2500 -> 2000, 3500 -> 4000. Totals under 500 round to 0.
pub fn round_to_thousand(n: u64) -> u64 {
    let (thousands, rest) = (n / 1000, n % 1000);
    let rounded = match rest.cmp(&500) {
        std::cmp::Ordering::Less => thousands,
        std::cmp::Ordering::Greater => thousands + 1,
        std::cmp::Ordering::Equal if thousands % 2 == 0 => thousands,
        std::cmp::Ordering::Equal => thousands + 1,
    };
    // Totals near u64::MAX clamp instead of overflowing.
    rounded.saturating_mul(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        let s = "ééééé";
        let result = truncate_for_log(s, 3);
        assert!(result.starts_with('é'));
        assert!(result.contains("(+8 bytes)"));
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(
            strip_query("https://medium.com/@dstarner/post-1?source=rss-abc------2"),
            "https://medium.com/@dstarner/post-1"
        );
        assert_eq!(strip_query("https://dev.to/x/post"), "https://dev.to/x/post");
        assert_eq!(strip_query(""), "");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1532), "1,532");
        assert_eq!(format_thousands(2000), "2,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_round_to_thousand() {
        assert_eq!(round_to_thousand(1598), 2000);
        assert_eq!(round_to_thousand(340), 0);
        assert_eq!(round_to_thousand(1499), 1000);
        assert_eq!(round_to_thousand(2500), 2000);
        assert_eq!(round_to_thousand(3500), 4000);
        assert_eq!(round_to_thousand(0), 0);
    }

    #[test]
    fn test_round_to_thousand_saturates() {
        assert_eq!(round_to_thousand(u64::MAX), u64::MAX);
        assert_eq!(round_to_thousand(u64::MAX - 100), u64::MAX);
        assert_eq!(round_to_thousand(u64::MAX - 1_000), (u64::MAX / 1000) * 1000);
    }
}

//! Price parsing and Korean-locale price formatting.
//!
//! Registry amounts are expressed in 만원 (10,000 KRW). Display follows the
//! conventions used across Korean real-estate listings:
//!
//! - Below 1억: `9,999만원`
//! - Exact 억: `1억원`
//! - Mixed: `1억 500만원`, `12억 3,400만원`
//!
//! None of the parsers here fail. Malformed input degrades to `0` or to the
//! [`NOT_COMPUTABLE`] sentinel.

/// Square meters per pyeong, as used by listing sites.
pub const SQM_PER_PYEONG: f64 = 3.3;

/// Sentinel returned when price per pyeong cannot be computed.
pub const NOT_COMPUTABLE: &str = "계산불가";

const MANWON_PER_EOK: i64 = 10_000;

/// Parse a registry amount such as `" 82,000"` into 만원.
///
/// Thousands separators are stripped, then the leading integer is taken the
/// way `parseInt` would. Anything without a leading integer yields `0`.
pub fn parse_price(s: &str) -> i64 {
    let cleaned: String = s.chars().filter(|&c| c != ',').collect();
    let cleaned = cleaned.trim();

    let (sign, digits) = match cleaned.as_bytes().first() {
        Some(b'-') => (-1, &cleaned[1..]),
        Some(b'+') => (1, &cleaned[1..]),
        _ => (1, cleaned),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return 0;
    }
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

/// Parse the leading decimal number of `s`, ignoring any trailing unit.
///
/// `"84.97㎡"` → `Some(84.97)`, `"㎡"` → `None`.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }
    s[..end].trim_end_matches('.').parse().ok()
}

/// Round half away from negative infinity, matching `Math.round`.
pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Insert `,` every three digits: `1234567` → `1,234,567`.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format a 만원 amount for display.
pub fn format_price(price: i64) -> String {
    if price >= MANWON_PER_EOK {
        let eok = price / MANWON_PER_EOK;
        let man = price % MANWON_PER_EOK;
        if man > 0 {
            format!("{eok}억 {}만원", group_thousands(man))
        } else {
            format!("{eok}억원")
        }
    } else {
        format!("{}만원", group_thousands(price))
    }
}

/// Price per pyeong for a deal of `price` 만원 over `area` square meters.
///
/// `area` may carry a unit suffix. Returns [`NOT_COMPUTABLE`] when the area is
/// missing, zero or negative.
pub fn price_per_pyeong(price: i64, area: &str) -> String {
    match parse_leading_float(area) {
        Some(sqm) if sqm > 0.0 => {
            let pyeong = sqm / SQM_PER_PYEONG;
            format_price(round_half_up(price as f64 / pyeong))
        }
        _ => NOT_COMPUTABLE.to_string(),
    }
}

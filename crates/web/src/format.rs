//! Display formatting for amounts and dates (en-US conventions).

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Maximum fraction digits shown for amounts.
const MAX_FRACTION_DIGITS: u32 = 3;

/// Format a decimal with thousands separators, e.g. `1234567.5` -> `1,234,567.5`.
///
/// Rounds half away from zero to three fraction digits and drops trailing zeros.
#[must_use]
pub fn format_number(value: Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(MAX_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    let text = rounded.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut out = String::with_capacity(text.len() + text.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }

    let len = int_part.len();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }

    out
}

/// Format a timestamp as a long date, e.g. `October 16, 2026`.
#[must_use]
pub fn format_long_date(date: DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

//! Formatting helpers shared by the report generators.

use crate::facts::PackageStatus;

/// Format a dollar amount rounded to whole dollars, with thousands separators.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "amounts are rounded, non-negative, and far below u64::MAX")]
pub fn format_usd(amount: f64) -> String {
    format!("${}", group_thousands(amount.max(0.0).round() as u64))
}

/// Insert `,` between groups of three digits.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Format a package status as a consistent label.
pub const fn format_status(status: PackageStatus) -> &'static str {
    match status {
        PackageStatus::Ok => "OK",
        PackageStatus::Partial => "PARTIAL",
        PackageStatus::Failed => "FAILED",
    }
}

/// Shorten `text` to at most `width` characters, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }

    let mut result: String = text.chars().take(width.saturating_sub(1)).collect();
    result.push('…');
    result
}

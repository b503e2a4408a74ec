//! Display helpers for chat messages.

/// Placeholder for values that are not available.
pub const NOT_AVAILABLE: &str = "N/A";

/// Render a text progress bar of `length` cells for `percentage` (0–100).
///
/// Out-of-range or non-finite values yield an empty bar.
pub fn create_progress_bar(percentage: f64, length: usize) -> String {
    if !(0.0..=100.0).contains(&percentage) {
        return format!("[{}]", " ".repeat(length));
    }
    let filled = ((length as f64) * percentage / 100.0).floor() as usize;
    let filled = filled.min(length);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(length - filled))
}

/// Format `value` with two decimals and `,` as the thousands separator.
pub fn format_with_separators(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac_part}")
}

/// Convert a base-denomination amount to a human-readable token amount.
///
/// `raw` is a decimal string as returned by the staking API (`delegator_shares`).
pub fn format_token_amount(raw: &str, decimals: u32, symbol: &str) -> Option<String> {
    let amount: f64 = raw.trim().parse().ok()?;
    if !amount.is_finite() {
        return None;
    }
    let scaled = amount / 10f64.powi(decimals as i32);
    Some(format!("{} {}", format_with_separators(scaled), symbol))
}

/// Estimated uptime over the signed-blocks window, as a percentage.
///
/// Returns `None` when the window is empty or the counter is unavailable.
pub fn uptime_percentage(signed_blocks_window: u64, missed_blocks: i64) -> Option<f64> {
    if signed_blocks_window == 0 || missed_blocks < 0 {
        return None;
    }
    let window = signed_blocks_window as f64;
    Some(((window - missed_blocks as f64) / window * 100.0).max(0.0))
}

/// Render an optional uptime percentage.
pub fn format_uptime(uptime: Option<f64>) -> String {
    uptime.map_or_else(|| NOT_AVAILABLE.to_owned(), |u| format!("{u:.2}%"))
}

/// Render a missed-block counter, with `-1` meaning unavailable.
pub fn format_missed_blocks(missed_blocks: i64) -> String {
    if missed_blocks < 0 { NOT_AVAILABLE.to_owned() } else { missed_blocks.to_string() }
}

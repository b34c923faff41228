//! Utility functions and helpers

use chrono::{DateTime, Utc};

/// Format decimal fraction as percentage string with two decimals (0.1234 -> "12.34%")
pub fn format_as_percentage(value: f64) -> String {
    format_as_percentage_with(value, 2)
}

/// Format decimal fraction as percentage string with `decimals` places
pub fn format_as_percentage_with(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, round_half_up(value * 100.0, decimals))
}

/// Round to `decimals` places with ties away from zero (`{:.N}` alone rounds ties to even)
pub fn round_half_up(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Format USD amount in billions, "N/A" when absent or zero
pub fn format_usd_billions(amount: Option<f64>) -> String {
    match amount {
        Some(value) if value != 0.0 => format!("${:.2}B", value / 1e9),
        _ => "N/A".to_string(),
    }
}

/// Format unix seconds as calendar date, "N/A" when absent or zero
pub fn format_unix_date(seconds: Option<i64>) -> String {
    seconds
        .filter(|s| *s != 0)
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Month-day chart label for unix seconds
pub fn month_day_label(seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|dt| dt.format("%m-%d").to_string())
        .unwrap_or_default()
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

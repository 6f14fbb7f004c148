// Display formatting helpers
use chrono::{Locale, TimeZone, Utc};

const LOVELACE_PER_ADA: f64 = 1_000_000.0;

/// Lovelace amount -> readable ADA string.
/// Tiers switch exactly at 1,000 and 1,000,000 ADA.
pub fn format_ada(lovelace: u64) -> String {
    let ada = lovelace as f64 / LOVELACE_PER_ADA;
    if ada >= 1_000_000.0 {
        format!("{:.2}M", ada / 1_000_000.0)
    } else if ada >= 1_000.0 {
        format!("{:.1}K", ada / 1_000.0)
    } else {
        format!("{ada:.0}")
    }
}

/// Unix seconds -> short date in the site's locale, e.g. "07. Aug 25".
pub fn format_date(ts: i64) -> String {
    match Utc.timestamp_opt(ts, 0) {
        chrono::LocalResult::Single(dt) => dt
            .format_localized("%d. %b %y", Locale::de_AT)
            .to_string(),
        _ => "-".to_string(),
    }
}

/// Percentage value with a fixed number of decimal places.
pub fn format_pct(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

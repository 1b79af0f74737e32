use chrono::{Days, NaiveDate};

/// Lookback windows offered on the personal history page.
pub const HISTORY_DAYS_CHOICES: [u32; 7] = [7, 14, 30, 60, 90, 180, 365];

/// Lookback windows offered on the aggregated team page.
pub const TEAM_AGG_DAYS_CHOICES: [u32; 8] = [1, 7, 14, 30, 60, 90, 180, 365];

pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Resolve a raw `?days=` value against a whitelist.
///
/// Anything that does not parse as an integer, or parses to a value outside
/// `allowed`, resolves to `default`. The result is always a member of
/// `allowed` (or `default` itself), so arbitrary ranges never reach a query.
#[must_use]
pub fn validate_window(raw: Option<&str>, allowed: &[u32], default: u32) -> u32 {
	raw.and_then(|r| r.trim().parse::<i64>().ok())
		.and_then(|days| u32::try_from(days).ok())
		.filter(|days| allowed.contains(days))
		.unwrap_or(default)
}

/// First day of a window of `days` calendar days ending on `today` (inclusive).
#[must_use]
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
	today.checked_sub_days(Days::new(u64::from(days.saturating_sub(1)))).unwrap_or(NaiveDate::MIN)
}

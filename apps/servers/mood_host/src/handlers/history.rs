use crate::auth::CurrentUser;
use crate::error::MoodHostError;
use crate::AppState;
use axum::{
	extract::{Query, State},
	Extension, Json,
};
use chrono::NaiveDate;
use mood_entry::MoodEntry;
use mood_stats::{validate_window, window_start, HistoryChart, DEFAULT_WINDOW_DAYS, HISTORY_DAYS_CHOICES};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
	pub days: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryView {
	/// Newest first.
	pub entries: Vec<MoodEntry>,
	pub today: NaiveDate,
	/// Oldest to newest.
	pub chart: HistoryChart,
	pub days: u32,
	pub days_choices: &'static [u32],
	pub entries_count: usize,
}

#[must_use]
pub fn history_view(entries_newest_first: Vec<MoodEntry>, today: NaiveDate, days: u32) -> HistoryView {
	let scores_oldest_first: Vec<i64> = entries_newest_first.iter().rev().map(|e| e.score.value()).collect();

	HistoryView {
		entries_count: entries_newest_first.len(),
		chart: HistoryChart::with_defaults(&scores_oldest_first),
		entries: entries_newest_first,
		today,
		days,
		days_choices: &HISTORY_DAYS_CHOICES,
	}
}

#[axum::debug_handler]
#[instrument(name = "get_history", skip(state, user), fields(user_id = user.0.id))]
pub async fn get_history(State(state): State<AppState>, Extension(user): Extension<CurrentUser>, Query(query): Query<HistoryQuery>) -> Result<Json<HistoryView>, MoodHostError> {
	let days = validate_window(query.days.as_deref(), &HISTORY_DAYS_CHOICES, DEFAULT_WINDOW_DAYS);
	let today = state.today();

	let entries = state.entries().get_for_user_between(user.0.id, window_start(today, days), today).await?;

	Ok(Json(history_view(entries, today, days)))
}

use crate::auth::CurrentUser;
use crate::error::MoodHostError;
use crate::metrics::http::record_submission;
use crate::AppState;
use axum::{
	extract::State,
	response::Redirect,
	Extension, Form, Json,
};
use chrono::NaiveDate;
use garde::Validate;
use mood_entry::{MoodEntry, UpsertMoodEntry};
use mood_stats::Score;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Clone, Serialize)]
pub struct ScoreChoice {
	pub value: i64,
	pub label: &'static str,
}

impl ScoreChoice {
	/// Every score, ascending, with its label.
	#[must_use]
	pub fn all() -> Vec<Self> {
		Score::ALL
			.iter()
			.map(|s| Self {
				value: s.value(),
				label: s.label(),
			})
			.collect()
	}
}

#[derive(Debug, Serialize)]
pub struct TodayView {
	pub today: NaiveDate,
	pub entry: Option<MoodEntry>,
	pub choices: Vec<ScoreChoice>,
}

/// Form body of `POST /today`. Both fields arrive as raw text so that a
/// missing or garbled score becomes a field error instead of a rejection.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct MoodEntryForm {
	#[garde(custom(score_field))]
	#[serde(default)]
	pub score: Option<String>,

	#[garde(length(chars, max = 280))]
	#[serde(default)]
	pub note: String,
}

fn parse_score(raw: Option<&str>) -> Result<Score, &'static str> {
	let raw = raw.map(str::trim).filter(|r| !r.is_empty()).ok_or("a score is required")?;
	let value = raw.parse::<i64>().map_err(|_| "score must be a whole number")?;
	Score::try_from(value).map_err(|_| "score must be between -4 and 4")
}

fn score_field(value: &Option<String>, _ctx: &()) -> garde::Result {
	parse_score(value.as_deref()).map(|_| ()).map_err(garde::Error::new)
}

impl MoodEntryForm {
	/// Trim the note, validate both fields and return the typed score with the
	/// cleaned note. A whitespace-only note becomes empty.
	pub fn into_submission(mut self) -> Result<(Score, String), MoodHostError> {
		self.note = self.note.trim().to_string();
		self.validate()?;

		let score = parse_score(self.score.as_deref()).map_err(|msg| MoodHostError::unprocessable_entity([("score", msg)]))?;
		Ok((score, self.note))
	}
}

#[axum::debug_handler]
#[instrument(name = "get_today", skip(state, user), fields(user_id = user.0.id))]
pub async fn get_today(State(state): State<AppState>, Extension(user): Extension<CurrentUser>) -> Result<Json<TodayView>, MoodHostError> {
	let today = state.today();
	let entry = state.entries().get_for_day(user.0.id, today).await?;

	Ok(Json(TodayView {
		today,
		entry,
		choices: ScoreChoice::all(),
	}))
}

#[axum::debug_handler]
#[instrument(name = "submit_today", skip(state, user, form), fields(user_id = user.0.id))]
pub async fn submit_today(State(state): State<AppState>, Extension(user): Extension<CurrentUser>, Form(form): Form<MoodEntryForm>) -> Result<Redirect, MoodHostError> {
	let (score, note) = form.into_submission()?;

	let outcome = state
		.entries()
		.upsert(UpsertMoodEntry {
			user_id: user.0.id,
			date: state.today(),
			score,
			note: Some(note),
		})
		.await?;

	record_submission(outcome.created);
	tracing::info!(entry = %outcome.entry, created = outcome.created, "saved mood entry");

	Ok(Redirect::to("/team"))
}

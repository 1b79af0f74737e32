use chrono::{DateTime, NaiveDate, Utc};
use mood_stats::{Score, ScoreOutOfRange};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NOTE_MAX_CHARS: usize = 280;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoodEntry {
	pub id: i64,
	pub user_id: i64,
	pub date: NaiveDate,
	pub score: Score,
	pub note: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl MoodEntry {
	#[must_use]
	pub const fn score_label(&self) -> &'static str {
		self.score.label()
	}
}

impl fmt::Display for MoodEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "user {} @ {}: {}", self.user_id, self.date, self.score_label())
	}
}

/// Raw row shape; the score is checked on the way out.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MoodEntryRow {
	pub id: i64,
	pub user_id: i64,
	pub date: NaiveDate,
	pub score: i64,
	pub note: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl TryFrom<MoodEntryRow> for MoodEntry {
	type Error = ScoreOutOfRange;

	fn try_from(r: MoodEntryRow) -> Result<Self, Self::Error> {
		Ok(Self {
			id: r.id,
			user_id: r.user_id,
			date: r.date,
			score: Score::try_from(r.score)?,
			note: r.note,
			created_at: r.created_at,
			updated_at: r.updated_at,
		})
	}
}

/// Create-or-update request for one (user, day).
///
/// `note: None` leaves an existing note untouched (a new row gets an empty one).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertMoodEntry {
	pub user_id: i64,
	pub date: NaiveDate,
	pub score: Score,
	pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpsertOutcome {
	pub entry: MoodEntry,
	pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
	pub id: i64,
	pub username: String,
	#[serde(skip)]
	pub token_hash: String,
	pub is_superuser: bool,
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
	pub username: String,
	pub token: String,
	pub is_superuser: bool,
}

use mood_stats::ScoreOutOfRange;

#[derive(Debug, thiserror::Error)]
pub enum MoodEntryError {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("stored row carries an invalid score: {0}")]
	CorruptScore(#[from] ScoreOutOfRange),
}

impl MoodEntryError {
	/// True when the database rejected a write because of a UNIQUE or CHECK constraint.
	#[must_use]
	pub fn is_constraint_violation(&self) -> bool {
		match self {
			Self::Database(sqlx::Error::Database(e)) => e.is_unique_violation() || e.is_check_violation(),
			_ => false,
		}
	}
}

use crate::core::model::{MoodEntry, MoodEntryRow, UpsertMoodEntry};
use crate::error::MoodEntryError;
use chrono::{DateTime, NaiveDate, Utc};
use mood_stats::FrequencyTable;
use sqlx::SqliteConnection;
use std::collections::BTreeMap;

fn to_count(n: i64) -> u64 {
	u64::try_from(n).unwrap_or(0)
}

pub async fn fetch_entry_for_day(conn: &mut SqliteConnection, user_id: i64, date: NaiveDate) -> Result<Option<MoodEntry>, MoodEntryError> {
	let row = sqlx::query_as::<_, MoodEntryRow>(
		r#"
        SELECT id, user_id, date, score, note, created_at, updated_at
        FROM mood_entries
        WHERE user_id = ? AND date = ?
        "#,
	)
	.bind(user_id)
	.bind(date)
	.fetch_optional(&mut *conn)
	.await?;

	Ok(row.map(MoodEntry::try_from).transpose()?)
}

/// Entries of one user in `[from, to]`, newest date first, then newest creation.
pub async fn fetch_entries_between(conn: &mut SqliteConnection, user_id: i64, from: NaiveDate, to: NaiveDate) -> Result<Vec<MoodEntry>, MoodEntryError> {
	let rows = sqlx::query_as::<_, MoodEntryRow>(
		r#"
        SELECT id, user_id, date, score, note, created_at, updated_at
        FROM mood_entries
        WHERE user_id = ? AND date >= ? AND date <= ?
        ORDER BY date DESC, created_at DESC, id DESC
        "#,
	)
	.bind(user_id)
	.bind(from)
	.bind(to)
	.fetch_all(&mut *conn)
	.await?;

	rows.into_iter().map(|r| MoodEntry::try_from(r).map_err(MoodEntryError::from)).collect()
}

/// Insert a fresh row. The `ON CONFLICT` arm only fires if another writer
/// created the same (user, day) after the caller looked.
pub async fn insert_entry(conn: &mut SqliteConnection, entry: &UpsertMoodEntry, now: DateTime<Utc>) -> Result<MoodEntry, MoodEntryError> {
	let row = sqlx::query_as::<_, MoodEntryRow>(
		r#"
        INSERT INTO mood_entries (user_id, date, score, note, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (user_id, date) DO UPDATE SET
            score = excluded.score,
            note = CASE WHEN ? THEN excluded.note ELSE mood_entries.note END,
            updated_at = excluded.updated_at
        RETURNING id, user_id, date, score, note, created_at, updated_at
        "#,
	)
	.bind(entry.user_id)
	.bind(entry.date)
	.bind(entry.score.value())
	.bind(entry.note.as_deref().unwrap_or_default())
	.bind(now)
	.bind(now)
	.bind(entry.note.is_some())
	.fetch_one(&mut *conn)
	.await?;

	Ok(MoodEntry::try_from(row)?)
}

pub async fn update_entry(conn: &mut SqliteConnection, id: i64, entry: &UpsertMoodEntry, now: DateTime<Utc>) -> Result<MoodEntry, MoodEntryError> {
	let row = sqlx::query_as::<_, MoodEntryRow>(
		r#"
        UPDATE mood_entries
        SET score = ?, note = COALESCE(?, note), updated_at = ?
        WHERE id = ?
        RETURNING id, user_id, date, score, note, created_at, updated_at
        "#,
	)
	.bind(entry.score.value())
	.bind(entry.note.as_deref())
	.bind(now)
	.bind(id)
	.fetch_one(&mut *conn)
	.await?;

	Ok(MoodEntry::try_from(row)?)
}

/// Team-wide score frequencies for `[from, to]`.
pub async fn fetch_score_counts(conn: &mut SqliteConnection, from: NaiveDate, to: NaiveDate) -> Result<FrequencyTable, MoodEntryError> {
	let rows = sqlx::query_as::<_, (i64, i64)>(
		r#"
        SELECT score, COUNT(*) AS n
        FROM mood_entries
        WHERE date >= ? AND date <= ?
        GROUP BY score
        "#,
	)
	.bind(from)
	.bind(to)
	.fetch_all(&mut *conn)
	.await?;

	Ok(rows.into_iter().map(|(score, n)| (score, to_count(n))).collect())
}

/// Team-wide score frequencies per day for `[from, to]`. Days without entries are absent.
pub async fn fetch_daily_score_counts(conn: &mut SqliteConnection, from: NaiveDate, to: NaiveDate) -> Result<BTreeMap<NaiveDate, FrequencyTable>, MoodEntryError> {
	let rows = sqlx::query_as::<_, (NaiveDate, i64, i64)>(
		r#"
        SELECT date, score, COUNT(*) AS n
        FROM mood_entries
        WHERE date >= ? AND date <= ?
        GROUP BY date, score
        "#,
	)
	.bind(from)
	.bind(to)
	.fetch_all(&mut *conn)
	.await?;

	let mut by_day: BTreeMap<NaiveDate, FrequencyTable> = BTreeMap::new();
	for (date, score, n) in rows {
		by_day.entry(date).or_default().insert(score, to_count(n));
	}
	Ok(by_day)
}

pub async fn delete_entries_for_username_prefix(conn: &mut SqliteConnection, prefix: &str) -> Result<u64, MoodEntryError> {
	let deleted = sqlx::query(
		r#"
        DELETE FROM mood_entries
        WHERE user_id IN (SELECT id FROM users WHERE substr(username, 1, length(?)) = ?)
        "#,
	)
	.bind(prefix)
	.bind(prefix)
	.execute(&mut *conn)
	.await?
	.rows_affected();

	Ok(deleted)
}

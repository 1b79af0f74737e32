use super::model::{MoodEntry, UpsertMoodEntry, UpsertOutcome};
use super::queries;
use super::schema;
use crate::error::MoodEntryError;
use chrono::{NaiveDate, Utc};
use mood_stats::FrequencyTable;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::BTreeMap;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct MoodEntryRepository {
	pub pool: SqlitePool,
}

impl MoodEntryRepository {
	pub const fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	pub async fn init_schema(&self) -> Result<(), MoodEntryError> {
		Ok(schema::init_schema(&self.pool).await?)
	}

	/// Record the score for one (user, day): update the existing row or create it.
	#[instrument(skip(self, entry), fields(user_id = entry.user_id, date = %entry.date))]
	pub async fn upsert(&self, entry: UpsertMoodEntry) -> Result<UpsertOutcome, MoodEntryError> {
		let mut tx = self.pool.begin().await?;
		let outcome = self.upsert_with_transaction(&mut tx, entry).await?;
		tx.commit().await?;
		Ok(outcome)
	}

	pub async fn upsert_with_transaction(&self, tx: &mut Transaction<'_, Sqlite>, entry: UpsertMoodEntry) -> Result<UpsertOutcome, MoodEntryError> {
		let now = Utc::now();

		match queries::fetch_entry_for_day(&mut **tx, entry.user_id, entry.date).await? {
			Some(existing) => {
				let updated = queries::update_entry(&mut **tx, existing.id, &entry, now).await?;
				Ok(UpsertOutcome { entry: updated, created: false })
			}
			None => {
				let created = queries::insert_entry(&mut **tx, &entry, now).await?;
				Ok(UpsertOutcome { entry: created, created: true })
			}
		}
	}

	pub async fn get_for_day(&self, user_id: i64, date: NaiveDate) -> Result<Option<MoodEntry>, MoodEntryError> {
		let mut conn = self.pool.acquire().await?;
		queries::fetch_entry_for_day(&mut conn, user_id, date).await
	}

	pub async fn get_for_user_between(&self, user_id: i64, from: NaiveDate, to: NaiveDate) -> Result<Vec<MoodEntry>, MoodEntryError> {
		let mut conn = self.pool.acquire().await?;
		queries::fetch_entries_between(&mut conn, user_id, from, to).await
	}

	pub async fn score_counts_between(&self, from: NaiveDate, to: NaiveDate) -> Result<FrequencyTable, MoodEntryError> {
		let mut conn = self.pool.acquire().await?;
		queries::fetch_score_counts(&mut conn, from, to).await
	}

	pub async fn daily_score_counts(&self, from: NaiveDate, to: NaiveDate) -> Result<BTreeMap<NaiveDate, FrequencyTable>, MoodEntryError> {
		let mut conn = self.pool.acquire().await?;
		queries::fetch_daily_score_counts(&mut conn, from, to).await
	}

	/// Bulk removal for demo tooling; end users never delete entries.
	pub async fn delete_for_username_prefix_with_transaction(&self, tx: &mut Transaction<'_, Sqlite>, prefix: &str) -> Result<u64, MoodEntryError> {
		queries::delete_entries_for_username_prefix(&mut **tx, prefix).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::model::NewUser;
	use crate::core::users::UserRepository;
	use chrono::Days;
	use mood_stats::Score;
	use sqlx::sqlite::SqlitePoolOptions;

	async fn setup() -> (MoodEntryRepository, UserRepository) {
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect("sqlite::memory:")
			.await
			.unwrap();
		let entries = MoodEntryRepository::new(pool.clone());
		entries.init_schema().await.unwrap();
		(entries, UserRepository::new(pool))
	}

	async fn user(users: &UserRepository, name: &str) -> i64 {
		users
			.create(NewUser {
				username: name.to_string(),
				token: format!("{name}-token"),
				is_superuser: false,
			})
			.await
			.unwrap()
			.id
	}

	fn day(offset: u64) -> NaiveDate {
		NaiveDate::from_ymd_opt(2024, 5, 20).unwrap().checked_sub_days(Days::new(offset)).unwrap()
	}

	fn upsert(user_id: i64, date: NaiveDate, score: Score, note: Option<&str>) -> UpsertMoodEntry {
		UpsertMoodEntry {
			user_id,
			date,
			score,
			note: note.map(str::to_string),
		}
	}

	#[tokio::test]
	async fn test_upsert_creates_then_updates_same_row() {
		let (entries, users) = setup().await;
		let alice = user(&users, "alice").await;

		let first = entries.upsert(upsert(alice, day(0), Score::Zero, Some("old"))).await.unwrap();
		assert!(first.created);
		assert_eq!(first.entry.note, "old");

		let second = entries.upsert(upsert(alice, day(0), Score::Minus1, Some("new"))).await.unwrap();
		assert!(!second.created);
		assert_eq!(second.entry.id, first.entry.id);
		assert_eq!(second.entry.score, Score::Minus1);
		assert_eq!(second.entry.note, "new");
		assert_eq!(second.entry.created_at, first.entry.created_at);
		assert!(second.entry.updated_at >= first.entry.updated_at);

		let all = entries.get_for_user_between(alice, day(10), day(0)).await.unwrap();
		assert_eq!(all.len(), 1);
	}

	#[tokio::test]
	async fn test_upsert_without_note_keeps_existing_note() {
		let (entries, users) = setup().await;
		let alice = user(&users, "alice").await;

		entries.upsert(upsert(alice, day(0), Score::Plus2, Some("keep me"))).await.unwrap();
		let outcome = entries.upsert(upsert(alice, day(0), Score::Plus3, None)).await.unwrap();

		assert_eq!(outcome.entry.score, Score::Plus3);
		assert_eq!(outcome.entry.note, "keep me");

		let fresh = entries.upsert(upsert(alice, day(1), Score::Plus1, None)).await.unwrap();
		assert_eq!(fresh.entry.note, "");
	}

	#[tokio::test]
	async fn test_unique_per_user_and_date() {
		let (entries, users) = setup().await;
		let alice = user(&users, "alice").await;
		entries.upsert(upsert(alice, day(0), Score::Zero, None)).await.unwrap();

		let err = sqlx::query("INSERT INTO mood_entries (user_id, date, score) VALUES (?, ?, ?)")
			.bind(alice)
			.bind(day(0))
			.bind(1_i64)
			.execute(&entries.pool)
			.await
			.map_err(MoodEntryError::from)
			.unwrap_err();
		assert!(err.is_constraint_violation());
	}

	#[tokio::test]
	async fn test_score_check_constraint() {
		let (entries, users) = setup().await;
		let alice = user(&users, "alice").await;

		let err = sqlx::query("INSERT INTO mood_entries (user_id, date, score) VALUES (?, ?, ?)")
			.bind(alice)
			.bind(day(0))
			.bind(99_i64)
			.execute(&entries.pool)
			.await;
		assert!(err.is_err());
	}

	#[tokio::test]
	async fn test_entries_are_newest_first_and_windowed() {
		let (entries, users) = setup().await;
		let alice = user(&users, "alice").await;
		let bob = user(&users, "bob").await;

		entries.upsert(upsert(alice, day(1), Score::Zero, None)).await.unwrap();
		entries.upsert(upsert(alice, day(0), Score::Plus1, None)).await.unwrap();
		entries.upsert(upsert(alice, day(40), Score::Plus4, None)).await.unwrap();
		entries.upsert(upsert(bob, day(0), Score::Minus4, None)).await.unwrap();

		let listed = entries.get_for_user_between(alice, day(29), day(0)).await.unwrap();
		let dates: Vec<NaiveDate> = listed.iter().map(|e| e.date).collect();
		assert_eq!(dates, vec![day(0), day(1)]);
		assert!(listed.iter().all(|e| e.user_id == alice));

		let today = entries.get_for_day(bob, day(0)).await.unwrap().unwrap();
		assert_eq!(today.score, Score::Minus4);
		assert!(entries.get_for_day(bob, day(1)).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_score_counts_are_team_wide() {
		let (entries, users) = setup().await;
		let alice = user(&users, "alice").await;
		let bob = user(&users, "bob").await;

		entries.upsert(upsert(alice, day(0), Score::Plus2, None)).await.unwrap();
		entries.upsert(upsert(bob, day(0), Score::Plus2, None)).await.unwrap();
		entries.upsert(upsert(bob, day(1), Score::Minus1, None)).await.unwrap();
		entries.upsert(upsert(bob, day(9), Score::Minus4, None)).await.unwrap();

		let counts = entries.score_counts_between(day(6), day(0)).await.unwrap();
		assert_eq!(counts, FrequencyTable::from([(-1, 1), (2, 2)]));

		let daily = entries.daily_score_counts(day(6), day(0)).await.unwrap();
		assert_eq!(daily.len(), 2);
		assert_eq!(daily[&day(0)], FrequencyTable::from([(2, 2)]));
		assert_eq!(daily[&day(1)], FrequencyTable::from([(-1, 1)]));
	}

	#[tokio::test]
	async fn test_delete_for_prefix_only_touches_matching_users() {
		let (entries, users) = setup().await;
		let demo = user(&users, "demo01").await;
		let real = user(&users, "carol").await;
		entries.upsert(upsert(demo, day(0), Score::Zero, None)).await.unwrap();
		entries.upsert(upsert(demo, day(1), Score::Zero, None)).await.unwrap();
		entries.upsert(upsert(real, day(0), Score::Zero, None)).await.unwrap();

		let mut tx = entries.pool.begin().await.unwrap();
		let deleted = entries.delete_for_username_prefix_with_transaction(&mut tx, "demo").await.unwrap();
		tx.commit().await.unwrap();

		assert_eq!(deleted, 2);
		assert_eq!(entries.get_for_user_between(real, day(5), day(0)).await.unwrap().len(), 1);
	}
}

use super::model::{NewUser, User};
use crate::error::MoodEntryError;
use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, instrument};

/// Hex-encoded SHA-256 of an API token. Only the hash is stored.
#[must_use]
pub fn hash_token(token: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(token.as_bytes());
	hex::encode(hasher.finalize())
}

const USER_COLUMNS: &str = "id, username, token_hash, is_superuser, created_at";

#[derive(Debug, Clone)]
pub struct UserRepository {
	pub pool: SqlitePool,
}

impl UserRepository {
	pub const fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[instrument(skip(self, user), fields(username = %user.username))]
	pub async fn create(&self, user: NewUser) -> Result<User, MoodEntryError> {
		let mut tx = self.pool.begin().await?;
		let created = insert_user(&mut tx, &user).await?;
		tx.commit().await?;
		Ok(created)
	}

	/// Returns the user with this name, creating it first if needed. The flag
	/// reports whether a row was inserted. An existing user keeps its token.
	pub async fn ensure_with_transaction(&self, tx: &mut Transaction<'_, Sqlite>, user: &NewUser) -> Result<(User, bool), MoodEntryError> {
		if let Some(existing) = fetch_by_username(&mut **tx, &user.username).await? {
			return Ok((existing, false));
		}

		let created = insert_user(&mut **tx, user).await?;
		debug!(username = %created.username, "created user");
		Ok((created, true))
	}

	pub async fn find_by_token(&self, token: &str) -> Result<Option<User>, MoodEntryError> {
		let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE token_hash = ?"))
			.bind(hash_token(token))
			.fetch_optional(&self.pool)
			.await?;

		Ok(user)
	}

	/// Deletes non-superusers whose name starts with `prefix`. Their entries go with them.
	pub async fn delete_with_prefix_with_transaction(&self, tx: &mut Transaction<'_, Sqlite>, prefix: &str) -> Result<u64, MoodEntryError> {
		let deleted = sqlx::query("DELETE FROM users WHERE is_superuser = 0 AND substr(username, 1, length(?)) = ?")
			.bind(prefix)
			.bind(prefix)
			.execute(&mut **tx)
			.await?
			.rows_affected();

		Ok(deleted)
	}
}

async fn fetch_by_username(conn: &mut SqliteConnection, username: &str) -> Result<Option<User>, MoodEntryError> {
	let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
		.bind(username)
		.fetch_optional(&mut *conn)
		.await?;

	Ok(user)
}

async fn insert_user(conn: &mut SqliteConnection, user: &NewUser) -> Result<User, MoodEntryError> {
	let created = sqlx::query_as::<_, User>(&format!(
		"INSERT INTO users (username, token_hash, is_superuser, created_at) VALUES (?, ?, ?, ?) RETURNING {USER_COLUMNS}"
	))
	.bind(&user.username)
	.bind(hash_token(&user.token))
	.bind(user.is_superuser)
	.bind(Utc::now())
	.fetch_one(&mut *conn)
	.await?;

	Ok(created)
}

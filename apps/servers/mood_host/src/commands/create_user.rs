use clap::Args;
use mood_entry::{NewUser, User, UserRepository};
use sqlx::SqlitePool;

#[derive(Args, Clone, Debug)]
pub struct CreateUserArgs {
	/// Unique login name
	#[arg(long)]
	pub username: String,

	/// API token the user will send as `Authorization: Token <token>`
	#[arg(long)]
	pub token: String,

	/// Protect the user from demo cleanup
	#[arg(long)]
	pub superuser: bool,
}

pub async fn run(pool: &SqlitePool, args: CreateUserArgs) -> anyhow::Result<User> {
	let username = args.username.trim().to_string();
	anyhow::ensure!(!username.is_empty(), "username must not be empty");
	anyhow::ensure!(!args.token.trim().is_empty(), "token must not be empty");

	let user = match UserRepository::new(pool.clone())
		.create(NewUser {
			username: username.clone(),
			token: args.token.trim().to_string(),
			is_superuser: args.superuser,
		})
		.await
	{
		Ok(user) => user,
		Err(e) if e.is_constraint_violation() => anyhow::bail!("user '{username}' already exists or the token is taken"),
		Err(e) => return Err(e.into()),
	};

	tracing::info!(id = user.id, username = %user.username, superuser = user.is_superuser, "created user");
	Ok(user)
}

#[cfg(test)]
mod tests {
	use super::*;
	use mood_entry::MoodEntryRepository;
	use sqlx::sqlite::SqlitePoolOptions;

	async fn pool() -> SqlitePool {
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect("sqlite::memory:")
			.await
			.unwrap();
		MoodEntryRepository::new(pool.clone()).init_schema().await.unwrap();
		pool
	}

	fn args(username: &str, token: &str) -> CreateUserArgs {
		CreateUserArgs {
			username: username.to_string(),
			token: token.to_string(),
			superuser: false,
		}
	}

	#[tokio::test]
	async fn test_created_user_can_authenticate() {
		let pool = pool().await;
		let user = run(&pool, args(" alice ", "t0ken")).await.unwrap();
		assert_eq!(user.username, "alice");

		let found = UserRepository::new(pool).find_by_token("t0ken").await.unwrap().unwrap();
		assert_eq!(found.id, user.id);
	}

	#[tokio::test]
	async fn test_rejects_blank_input() {
		let pool = pool().await;
		assert!(run(&pool, args("  ", "t0ken")).await.is_err());
		assert!(run(&pool, args("bob", " ")).await.is_err());
	}

	#[tokio::test]
	async fn test_duplicate_user_is_reported() {
		let pool = pool().await;
		run(&pool, args("alice", "t0ken")).await.unwrap();

		let err = run(&pool, args("alice", "other")).await.unwrap_err();
		assert_eq!(err.to_string(), "user 'alice' already exists or the token is taken");

		let err = run(&pool, args("bob", "t0ken")).await.unwrap_err();
		assert!(err.to_string().contains("token is taken"));
	}
}

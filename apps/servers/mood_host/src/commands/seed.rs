use chrono::{Datelike, NaiveDate, Weekday};
use clap::{Args, ValueEnum};
use mood_entry::{MoodEntryRepository, NewUser, UpsertMoodEntry, UserRepository};
use mood_stats::{window_start, Score};
use rand::distr::{weighted::WeightedIndex, Distribution};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Score distribution used when drawing demo entries.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Bias {
	Neg,
	#[default]
	Neutral,
	Pos,
}

impl Bias {
	/// Draw weights aligned with [`Score::ALL`].
	#[must_use]
	pub const fn weights(self) -> [u32; 9] {
		match self {
			Self::Neg => [10, 9, 8, 7, 6, 4, 3, 2, 1],
			Self::Neutral => [2, 3, 5, 8, 10, 8, 5, 3, 2],
			Self::Pos => [1, 2, 3, 4, 6, 7, 8, 9, 10],
		}
	}
}

#[derive(Args, Clone, Debug)]
pub struct SeedArgs {
	/// Number of demo users to ensure
	#[arg(long, default_value = "8")]
	pub users: u32,

	/// Base token for demo users; user `demo01` authenticates with `demo01-<token>`
	#[arg(long, default_value = "demo1234")]
	pub token: String,

	/// Number of calendar days to seed
	#[arg(long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..))]
	pub days: u32,

	/// Last day to seed, YYYY-MM-DD (default: today in the configured time zone)
	#[arg(long)]
	pub end: Option<NaiveDate>,

	#[arg(long, value_enum, default_value_t = Bias::Neutral)]
	pub bias: Bias,

	/// Include Saturdays and Sundays
	#[arg(long)]
	pub include_weekends: bool,

	/// Random seed for reproducible draws
	#[arg(long)]
	pub seed: Option<u64>,

	/// Delete mood entries of demo users (keeps the users)
	#[arg(long)]
	pub clear: bool,

	/// Ensure users but generate no entries
	#[arg(long)]
	pub users_only: bool,

	/// Shortcut for --clear --delete-users
	#[arg(long)]
	pub reset: bool,

	/// Delete demo users that are not superusers
	#[arg(long)]
	pub delete_users: bool,

	/// Clear entries and delete demo users, then stop
	#[arg(long)]
	pub reset_only: bool,

	/// Only users whose name starts with this prefix are touched
	#[arg(long, default_value = "demo")]
	pub username_prefix: String,
}

impl Default for SeedArgs {
	fn default() -> Self {
		Self {
			users: 8,
			token: "demo1234".to_string(),
			days: 30,
			end: None,
			bias: Bias::Neutral,
			include_weekends: false,
			seed: None,
			clear: false,
			users_only: false,
			reset: false,
			delete_users: false,
			reset_only: false,
			username_prefix: "demo".to_string(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
	pub entries_deleted: u64,
	pub users_deleted: u64,
	pub users_ensured: usize,
	pub users_created: usize,
	pub entries_created: u64,
	pub entries_updated: u64,
}

#[must_use]
pub fn demo_username(prefix: &str, n: u32) -> String {
	format!("{prefix}{n:02}")
}

#[must_use]
pub fn demo_token(username: &str, base: &str) -> String {
	format!("{username}-{base}")
}

/// Days in `[end - days + 1, end]`, skipping weekends unless asked not to.
pub fn seed_days(end: NaiveDate, days: u32, include_weekends: bool) -> impl Iterator<Item = NaiveDate> {
	window_start(end, days)
		.iter_days()
		.take_while(move |d| *d <= end)
		.filter(move |d| include_weekends || !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
}

/// Seed demo data in a single transaction. `today` is used when `--end` is absent.
pub async fn run(pool: &SqlitePool, args: &SeedArgs, today: NaiveDate) -> anyhow::Result<SeedReport> {
	let prefix = match args.username_prefix.trim() {
		"" => "demo",
		p => p,
	};
	let clear = args.clear || args.reset || args.reset_only;
	let delete_users = args.delete_users || args.reset || args.reset_only;

	let entries = MoodEntryRepository::new(pool.clone());
	let users = UserRepository::new(pool.clone());
	let mut report = SeedReport::default();

	let mut rng = match args.seed {
		Some(seed) => {
			info!(seed, "using random seed");
			StdRng::seed_from_u64(seed)
		}
		None => StdRng::from_os_rng(),
	};
	let draw = WeightedIndex::new(args.bias.weights())?;

	let mut tx = pool.begin().await?;

	if clear {
		report.entries_deleted = entries.delete_for_username_prefix_with_transaction(&mut tx, prefix).await?;
		warn!("deleted {} mood entries for users '{prefix}*'", report.entries_deleted);
	}

	if delete_users {
		report.users_deleted = users.delete_with_prefix_with_transaction(&mut tx, prefix).await?;
		warn!("deleted {} users '{prefix}*' (non-superusers)", report.users_deleted);
	}

	if args.reset_only {
		tx.commit().await?;
		info!("reset-only completed");
		return Ok(report);
	}

	let mut ensured = Vec::new();
	for n in 1..=args.users {
		let username = demo_username(prefix, n);
		let new_user = NewUser {
			token: demo_token(&username, &args.token),
			username,
			is_superuser: false,
		};
		let (user, created) = users.ensure_with_transaction(&mut tx, &new_user).await?;
		if created {
			report.users_created += 1;
		}
		ensured.push(user);
	}
	report.users_ensured = ensured.len();
	info!("ensured {} users with prefix '{prefix}'", report.users_ensured);

	if args.users_only {
		tx.commit().await?;
		info!("users ensured, no entries generated");
		return Ok(report);
	}

	let end = args.end.unwrap_or(today);
	for user in &ensured {
		for date in seed_days(end, args.days, args.include_weekends) {
			let score = Score::ALL[draw.sample(&mut rng)];
			let outcome = entries
				.upsert_with_transaction(
					&mut tx,
					UpsertMoodEntry {
						user_id: user.id,
						date,
						score,
						note: None,
					},
				)
				.await?;

			if outcome.created {
				report.entries_created += 1;
			} else {
				report.entries_updated += 1;
			}
		}
	}

	tx.commit().await?;
	info!(
		"entries created: {}, updated: {} (users={}, days={}, bias={:?}, weekends={})",
		report.entries_created,
		report.entries_updated,
		report.users_ensured,
		args.days,
		args.bias,
		if args.include_weekends { "on" } else { "off" }
	);

	Ok(report)
}

use crate::commands::{create_user::CreateUserArgs, seed::SeedArgs};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "Daily mood journal for small teams", long_about = None)]
pub struct Cli {
	#[command(flatten)]
	pub config: Config,

	#[command(subcommand)]
	pub command: Option<Commands>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
	/// Run the HTTP server (default)
	Serve,
	/// Create a user that authenticates with the given token
	CreateUser(CreateUserArgs),
	/// Seed demo users and mood entries
	Seed(SeedArgs),
}

#[derive(Args, Clone, Debug)]
pub struct Config {
	/// Use JSON formatting for tracing
	#[arg(long, env = "LOG_JSON", default_value = "false")]
	pub log_json: bool,

	/// Log filter directives
	#[arg(long, env = "RUST_LOG")]
	pub rust_log: Option<String>,

	/// Server host
	#[arg(long, env = "HOST", default_value = "127.0.0.1")]
	pub host: String,

	/// Server port
	#[arg(long, env = "PORT", default_value = "8000")]
	pub port: u16,

	/// SQLite connection string
	#[arg(long, env = "DATABASE_URL", default_value = "sqlite://mood.db?mode=rwc")]
	pub database_url: String,

	/// Maximum pooled database connections
	#[arg(long, env = "DB_MAX_CONNECTIONS", default_value = "5")]
	pub db_max_connections: u32,

	/// IANA time zone that decides which calendar day "today" is
	#[arg(long, env = "TIME_ZONE", default_value = "Europe/Zurich")]
	pub time_zone: Tz,

	/// Maximum request body size in MiB
	#[arg(long, env = "MAX_REQUEST_SIZE", default_value = "1")]
	pub max_request_size: usize,

	/// Maximum requests processed at once on each route
	#[arg(long, env = "MAX_CONCURRENT_REQ", default_value = "64")]
	pub max_concurrent_req: usize,

	/// Per-request timeout in milliseconds
	#[arg(long, env = "TASK_TIMEOUT_MS", default_value = "10000")]
	pub task_timeout_ms: u64,
}

impl Config {
	/// The current calendar day in the configured time zone.
	#[must_use]
	pub fn today(&self) -> NaiveDate {
		Utc::now().with_timezone(&self.time_zone).date_naive()
	}

	#[must_use]
	pub fn bind_addr(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::commands::seed::Bias;

	#[test]
	fn test_defaults() {
		let cli = Cli::try_parse_from(["mood_host", "--time-zone", "Europe/Zurich", "--port", "8000"]).unwrap();
		assert!(cli.command.is_none());
		assert_eq!(cli.config.time_zone, chrono_tz::Europe::Zurich);
		assert_eq!(cli.config.port, 8000);
	}

	#[test]
	fn test_seed_subcommand() {
		let cli = Cli::try_parse_from(["mood_host", "seed", "--users", "3", "--bias", "neg", "--end", "2024-05-20", "--include-weekends", "--seed", "7"]).unwrap();
		let Some(Commands::Seed(args)) = cli.command else {
			panic!("expected seed subcommand");
		};
		assert_eq!(args.users, 3);
		assert_eq!(args.bias, Bias::Neg);
		assert_eq!(args.end, NaiveDate::from_ymd_opt(2024, 5, 20));
		assert!(args.include_weekends);
		assert_eq!(args.seed, Some(7));
		assert_eq!(args.username_prefix, "demo");
	}

	#[test]
	fn test_rejects_unknown_time_zone() {
		assert!(Cli::try_parse_from(["mood_host", "--time-zone", "Mars/Olympus"]).is_err());
	}
}

use anyhow::Result;
use clap::Parser;
use mood_host::{commands, connect, init_tracing, serve, Cli, Commands};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
	dotenv::dotenv().ok();
	let cli = Cli::parse();

	init_tracing(&cli.config)?;

	let config = Arc::new(cli.config);
	let pool = connect(&config).await?;

	match cli.command.unwrap_or(Commands::Serve) {
		Commands::Serve => serve(config, pool).await?,
		Commands::CreateUser(args) => {
			commands::create_user::run(&pool, args).await?;
			pool.close().await;
		}
		Commands::Seed(args) => {
			commands::seed::run(&pool, &args, config.today()).await?;
			pool.close().await;
		}
	}

	tracing::info!("Shutdown complete");
	Ok(())
}

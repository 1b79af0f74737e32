use anyhow::Context;
use axum::{error_handling::HandleErrorLayer, middleware::from_fn_with_state, routing::get, Router};
use chrono::NaiveDate;
use mood_entry::{MoodEntryRepository, UserRepository};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::{str::FromStr, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tower::{limit::ConcurrencyLimitLayer, load_shed::LoadShedLayer, timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{filter::EnvFilter, fmt::format::JsonFields, util::SubscriberInitExt, Layer};

pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;

pub use config::*;
pub use error::MoodHostError;

#[derive(Clone)]
pub struct AppState {
	pub config: Arc<Config>,
	pub pool: SqlitePool,
}

impl AppState {
	pub const fn new(config: Arc<Config>, pool: SqlitePool) -> Self {
		Self { config, pool }
	}

	#[must_use]
	pub fn entries(&self) -> MoodEntryRepository {
		MoodEntryRepository::new(self.pool.clone())
	}

	#[must_use]
	pub fn users(&self) -> UserRepository {
		UserRepository::new(self.pool.clone())
	}

	#[must_use]
	pub fn today(&self) -> NaiveDate {
		self.config.today()
	}
}

/// Open the pool with foreign keys enforced and make sure the schema exists.
pub async fn connect(config: &Config) -> anyhow::Result<SqlitePool> {
	let options = SqliteConnectOptions::from_str(&config.database_url)
		.with_context(|| format!("invalid DATABASE_URL {}", config.database_url))?
		.create_if_missing(true)
		.foreign_keys(true);

	let pool = SqlitePoolOptions::new().max_connections(config.db_max_connections).connect_with(options).await?;
	MoodEntryRepository::new(pool.clone()).init_schema().await?;

	Ok(pool)
}

async fn handle_tower_error(error: BoxError) -> MoodHostError {
	if error.is::<tower::timeout::error::Elapsed>() {
		tracing::warn!("Request timeout: {}", error);
		MoodHostError::RequestTimeout
	} else if error.is::<tower::load_shed::error::Overloaded>() {
		tracing::warn!("Service overloaded: {}", error);
		MoodHostError::ServiceOverloaded
	} else {
		tracing::error!("Unhandled tower error: {}", error);
		MoodHostError::TowerError(error)
	}
}

/// The full HTTP application: token-protected mood pages, public health and
/// metrics, wrapped in the resilience stack.
pub fn app(state: AppState) -> Router {
	let config = state.config.clone();

	let protected_routes = Router::new()
		.merge(routes::moods::mood_routes())
		.route_layer(from_fn_with_state(state.clone(), auth::require_token));

	let public_routes = Router::new()
		.merge(routes::health::get_health())
		.route("/metrics", get(metrics::http::metrics_handler));

	Router::new()
		.merge(protected_routes)
		.merge(public_routes)
		.fallback(|| async { MoodHostError::NotFound })
		.with_state(state)
		.layer(
			ServiceBuilder::new()
				.layer(axum::middleware::from_fn(metrics::http::metrics_middleware))
				.layer(TraceLayer::new_for_http())
				.layer(HandleErrorLayer::new(|error: BoxError| async move { handle_tower_error(error).await }))
				.layer(RequestBodyLimitLayer::new(config.max_request_size * 1024 * 1024))
				.layer(ConcurrencyLimitLayer::new(config.max_concurrent_req))
				.layer(TimeoutLayer::new(Duration::from_millis(config.task_timeout_ms)))
				.layer(LoadShedLayer::new()),
		)
}

pub async fn serve(config: Arc<Config>, pool: SqlitePool) -> anyhow::Result<()> {
	let shutdown_token = CancellationToken::new();
	let state = AppState::new(config.clone(), pool.clone());

	let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
	tracing::info!("listening on {}", listener.local_addr()?);

	let signal_shutdown_token = shutdown_token.clone();
	tokio::spawn(async move {
		tokio::signal::ctrl_c().await.ok();
		tracing::info!("Received Ctrl+C, initiating shutdown...");
		signal_shutdown_token.cancel();
	});

	axum::serve(listener, app(state))
		.with_graceful_shutdown(async move {
			shutdown_token.cancelled().await;
		})
		.await?;
	tracing::info!("Server stopped");

	match tokio::time::timeout(Duration::from_secs(5), pool.close()).await {
		Ok(()) => tracing::info!("Database closed"),
		Err(_) => tracing::error!("Shutdown timeout - forcing exit"),
	}

	Ok(())
}

pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
	use tracing_subscriber::layer::SubscriberExt;

	let filter = EnvFilter::try_new(config.rust_log.as_deref().unwrap_or("info,sqlx=warn"))?;

	tracing_subscriber::registry()
		.with(if config.log_json {
			Box::new(
				tracing_subscriber::fmt::layer()
					.fmt_fields(JsonFields::default())
					.event_format(tracing_subscriber::fmt::format().json().flatten_event(true).with_span_list(false))
					.with_filter(filter),
			) as Box<dyn Layer<_> + Send + Sync>
		} else {
			Box::new(
				tracing_subscriber::fmt::layer()
					.event_format(tracing_subscriber::fmt::format().pretty())
					.with_filter(filter),
			)
		})
		.try_init()?;

	Ok(())
}

use tracing::instrument;

#[axum::debug_handler]
#[instrument(name = "health")]
pub async fn health() -> &'static str {
	"ok"
}

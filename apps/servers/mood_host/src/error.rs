use axum::body::Body;
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderMap, HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use mood_entry::MoodEntryError;
use std::borrow::Cow;
use std::collections::HashMap;
use tower::BoxError;

#[derive(thiserror::Error, Debug)]
pub enum MoodHostError {
	#[error("authentication required")]
	Unauthorized,

	#[error("request path not found")]
	NotFound,

	#[error("error in the request body")]
	UnprocessableEntity { errors: HashMap<Cow<'static, str>, Vec<Cow<'static, str>>> },

	#[error("request timed out")]
	RequestTimeout,

	#[error("service is overloaded, try again later")]
	ServiceOverloaded,

	#[error("unhandled middleware error: {0}")]
	TowerError(BoxError),

	#[error("storage error: {0}")]
	Database(#[from] MoodEntryError),
}

impl MoodHostError {
	pub fn unprocessable_entity<K, V>(errors: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<Cow<'static, str>>,
		V: Into<Cow<'static, str>>,
	{
		let mut error_map = HashMap::new();

		for (key, val) in errors {
			error_map.entry(key.into()).or_insert_with(Vec::new).push(val.into());
		}

		Self::UnprocessableEntity { errors: error_map }
	}

	const fn status_code(&self) -> StatusCode {
		match self {
			Self::Unauthorized => StatusCode::UNAUTHORIZED,
			Self::NotFound => StatusCode::NOT_FOUND,
			Self::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
			Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
			Self::ServiceOverloaded => StatusCode::SERVICE_UNAVAILABLE,
			Self::TowerError(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl From<garde::Report> for MoodHostError {
	fn from(report: garde::Report) -> Self {
		Self::unprocessable_entity(report.iter().map(|(path, error)| (path.to_string(), error.message().to_string())))
	}
}

impl IntoResponse for MoodHostError {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::UnprocessableEntity { errors } => {
				#[derive(serde::Serialize)]
				struct Errors {
					errors: HashMap<Cow<'static, str>, Vec<Cow<'static, str>>>,
				}

				return (StatusCode::UNPROCESSABLE_ENTITY, Json(Errors { errors })).into_response();
			}
			Self::Unauthorized => {
				return (
					self.status_code(),
					[(WWW_AUTHENTICATE, HeaderValue::from_static("Token"))].into_iter().collect::<HeaderMap>(),
					self.to_string(),
				)
					.into_response();
			}

			Self::Database(ref e) => {
				tracing::error!("Database error: {:?}", e);
				return (self.status_code(), "an internal server error occurred").into_response();
			}

			_ => (),
		}

		(self.status_code(), self.to_string()).into_response()
	}
}

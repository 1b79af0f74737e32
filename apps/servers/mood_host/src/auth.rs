use crate::{error::MoodHostError, AppState};
use axum::{
	body::Body,
	extract::State,
	http::{header::AUTHORIZATION, HeaderMap, Request},
	middleware::Next,
	response::Response,
};
use mood_entry::User;

const SCHEME: &str = "Token";

/// The authenticated caller, inserted into request extensions by [`require_token`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Pulls the token out of `Authorization: Token <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
	let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
	let (scheme, token) = value.split_once(' ')?;
	let token = token.trim();
	(scheme == SCHEME && !token.is_empty()).then_some(token)
}

pub async fn require_token(State(state): State<AppState>, mut request: Request<Body>, next: Next) -> Result<Response, MoodHostError> {
	let token = bearer_token(request.headers()).ok_or(MoodHostError::Unauthorized)?;
	let user = state.users().find_by_token(token).await?.ok_or_else(|| {
		tracing::debug!("rejected unknown token");
		MoodHostError::Unauthorized
	})?;

	request.extensions_mut().insert(CurrentUser(user));
	Ok(next.run(request).await)
}

use crate::handlers::{history, team, today};
use crate::AppState;
use axum::routing::get;
use axum::{extract::FromRef, response::Redirect, Router};

pub fn mood_routes<S>() -> Router<S>
where
	S: Clone + Send + Sync + 'static,
	AppState: FromRef<S>,
{
	Router::new()
		.route("/", get(|| async { Redirect::to("/today") }))
		.route("/today", get(today::get_today).post(today::submit_today))
		.route("/history", get(history::get_history))
		.route("/team", get(team::get_team))
}

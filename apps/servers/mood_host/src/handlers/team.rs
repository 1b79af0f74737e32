use crate::auth::CurrentUser;
use crate::error::MoodHostError;
use crate::AppState;
use axum::{
	extract::{Query, State},
	Extension, Json,
};
use chrono::NaiveDate;
use mood_stats::{accumulate, compute_stats, validate_window, window_start, DistributionChart, FrequencyTable, Score, DEFAULT_WINDOW_DAYS, TEAM_AGG_DAYS_CHOICES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

const WEEK_DAYS: u32 = 7;

#[derive(Debug, Default, Deserialize)]
pub struct TeamQuery {
	pub days: Option<String>,
	pub range: Option<String>,
}

impl TeamQuery {
	fn is_week(&self) -> bool {
		self.range.as_deref() == Some("week")
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
	pub score: i64,
	pub label: &'static str,
	pub count: u64,
	pub percent: f64,
}

#[derive(Debug, Serialize)]
pub struct AggregateView {
	pub range_param: &'static str,
	pub days: u32,
	pub days_choices: &'static [u32],
	pub count: u64,
	pub avg: Option<f64>,
	pub med: Option<f64>,
	/// One row per score, highest first.
	pub rows: Vec<ScoreRow>,
	pub chart: DistributionChart,
	pub date_from: NaiveDate,
	pub date_to: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRow {
	pub date: NaiveDate,
	pub total: u64,
	pub avg: Option<f64>,
	pub avg_bucket: Option<i64>,
	pub med: Option<f64>,
	pub med_bucket: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct WeeklyView {
	pub range_param: &'static str,
	/// Oldest to newest, one per calendar day including empty ones.
	pub day_rows: Vec<DayRow>,
	pub weekly_total: u64,
	pub weekly_avg: Option<f64>,
	pub weekly_avg_bucket: Option<i64>,
	pub weekly_med: Option<f64>,
	pub weekly_med_bucket: Option<i64>,
	pub date_from: NaiveDate,
	pub date_to: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TeamView {
	Aggregate(AggregateView),
	Weekly(WeeklyView),
}

/// Team-wide distribution over a window of `days` ending on `today`.
#[must_use]
pub fn aggregate_view(counts: &FrequencyTable, days: u32, today: NaiveDate) -> AggregateView {
	let stats = compute_stats(counts);

	let rows = Score::descending()
		.map(|score| ScoreRow {
			score: score.value(),
			label: score.label(),
			count: stats.count(score.value()),
			percent: stats.percent(score.value()),
		})
		.collect();

	AggregateView {
		range_param: "day",
		days,
		days_choices: &TEAM_AGG_DAYS_CHOICES,
		count: stats.total,
		avg: stats.mean,
		med: stats.median,
		rows,
		chart: DistributionChart::with_defaults(&stats.counts),
		date_from: window_start(today, days),
		date_to: today,
	}
}

/// Per-day statistics for the seven days ending on `today`, plus the week as a whole.
#[must_use]
pub fn weekly_view(daily_counts: &BTreeMap<NaiveDate, FrequencyTable>, today: NaiveDate) -> WeeklyView {
	let date_from = window_start(today, WEEK_DAYS);
	let empty = FrequencyTable::new();
	let mut weekly_counts = FrequencyTable::new();

	let day_rows = date_from
		.iter_days()
		.take_while(|date| *date <= today)
		.map(|date| {
			let counts = daily_counts.get(&date).unwrap_or(&empty);
			accumulate(&mut weekly_counts, counts);

			let stats = compute_stats(counts);
			DayRow {
				date,
				total: stats.total,
				avg: stats.mean,
				avg_bucket: stats.mean_bucket(),
				med: stats.median,
				med_bucket: stats.median_bucket(),
			}
		})
		.collect();

	let week = compute_stats(&weekly_counts);

	WeeklyView {
		range_param: "week",
		day_rows,
		weekly_total: week.total,
		weekly_avg: week.mean,
		weekly_avg_bucket: week.mean_bucket(),
		weekly_med: week.median,
		weekly_med_bucket: week.median_bucket(),
		date_from,
		date_to: today,
	}
}

#[axum::debug_handler]
#[instrument(name = "get_team", skip(state, _user), fields(range = ?query.range))]
pub async fn get_team(State(state): State<AppState>, Extension(_user): Extension<CurrentUser>, Query(query): Query<TeamQuery>) -> Result<Json<TeamView>, MoodHostError> {
	let today = state.today();

	if query.is_week() {
		let daily = state.entries().daily_score_counts(window_start(today, WEEK_DAYS), today).await?;
		return Ok(Json(TeamView::Weekly(weekly_view(&daily, today))));
	}

	let days = validate_window(query.days.as_deref(), &TEAM_AGG_DAYS_CHOICES, DEFAULT_WINDOW_DAYS);
	let counts = state.entries().score_counts_between(window_start(today, days), today).await?;

	Ok(Json(TeamView::Aggregate(aggregate_view(&counts, days, today))))
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Days;

	fn day(offset: u64) -> NaiveDate {
		NaiveDate::from_ymd_opt(2024, 5, 20).unwrap().checked_sub_days(Days::new(offset)).unwrap()
	}

	#[test]
	fn test_aggregate_rows_are_descending_with_percentages() {
		let counts = FrequencyTable::from([(-1, 2), (0, 1), (2, 1)]);
		let view = aggregate_view(&counts, 7, day(0));

		assert_eq!(view.count, 4);
		assert_eq!(view.avg, Some(0.0));
		assert_eq!(view.med, Some(-0.5));
		assert_eq!(view.rows.len(), 9);
		assert_eq!(view.rows[0].score, 4);
		assert_eq!(view.rows[8].score, -4);

		let minus_one = view.rows.iter().find(|r| r.score == -1).unwrap();
		assert_eq!(minus_one.count, 2);
		assert!((minus_one.percent - 50.0).abs() < 1e-9);
		assert_eq!(view.chart.bars.len(), 9);
		assert_eq!(view.date_from, day(6));
		assert_eq!(view.date_to, day(0));
	}

	#[test]
	fn test_aggregate_of_empty_window() {
		let view = aggregate_view(&FrequencyTable::new(), 30, day(0));
		assert_eq!(view.count, 0);
		assert_eq!(view.avg, None);
		assert_eq!(view.med, None);
		assert!(view.rows.iter().all(|r| r.count == 0 && r.percent == 0.0));
		assert!(view.chart.bars.iter().all(|b| b.h == 0.0));
	}

	#[test]
	fn test_single_day_window() {
		let view = aggregate_view(&FrequencyTable::from([(3, 1)]), 1, day(0));
		assert_eq!(view.date_from, view.date_to);
	}

	#[test]
	fn test_weekly_view_covers_seven_days() {
		let daily = BTreeMap::from([(day(0), FrequencyTable::from([(2, 1), (3, 1)])), (day(3), FrequencyTable::from([(-4, 1)])), (day(9), FrequencyTable::from([(4, 5)]))]);
		let view = weekly_view(&daily, day(0));

		assert_eq!(view.day_rows.len(), 7);
		assert_eq!(view.day_rows[0].date, day(6));
		assert_eq!(view.day_rows[6].date, day(0));
		assert_eq!(view.date_from, day(6));

		let last = &view.day_rows[6];
		assert_eq!(last.total, 2);
		assert_eq!(last.avg, Some(2.5));
		// 2.5 rounds half to even
		assert_eq!(last.avg_bucket, Some(2));
		assert_eq!(last.med_bucket, Some(2));

		let empty = &view.day_rows[0];
		assert_eq!(empty.total, 0);
		assert_eq!(empty.avg_bucket, None);

		assert_eq!(view.weekly_total, 3);
		assert_eq!(view.weekly_med, Some(2.0));
		assert_eq!(view.weekly_avg_bucket, Some(0));
	}

	#[test]
	fn test_buckets_stay_on_the_axis() {
		let daily = BTreeMap::from([(day(1), FrequencyTable::from([(4, 3)])), (day(2), FrequencyTable::from([(-4, 3)]))]);
		let view = weekly_view(&daily, day(0));
		for row in &view.day_rows {
			for bucket in [row.avg_bucket, row.med_bucket].into_iter().flatten() {
				assert!((Score::MIN..=Score::MAX).contains(&bucket));
			}
		}
	}

	#[test]
	fn test_query_mode() {
		let week = TeamQuery {
			days: None,
			range: Some("week".to_string()),
		};
		assert!(week.is_week());
		assert!(!TeamQuery::default().is_week());
	}
}

use crate::score::Score;
use serde::Serialize;
use std::collections::BTreeMap;

/// Score value to number of occurrences. Keys iterate in ascending order.
pub type FrequencyTable = BTreeMap<i64, u64>;

/// Summary of a frequency table. `mean` and `median` are `None` when the table
/// is empty, which is distinct from a real `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
	pub total: u64,
	pub mean: Option<f64>,
	pub median: Option<f64>,
	pub counts: FrequencyTable,
}

impl Stats {
	pub fn from_scores<I>(scores: I) -> Self
	where
		I: IntoIterator<Item = i64>,
	{
		compute_stats(&frequency_table(scores))
	}

	#[must_use]
	pub fn count(&self, score: i64) -> u64 {
		self.counts.get(&score).copied().unwrap_or(0)
	}

	/// Share of `score` in percent, `0.0` for an empty table.
	#[must_use]
	#[allow(clippy::cast_precision_loss)]
	pub fn percent(&self, score: i64) -> f64 {
		if self.total == 0 {
			return 0.0;
		}
		self.count(score) as f64 * 100.0 / self.total as f64
	}

	#[must_use]
	pub fn mean_bucket(&self) -> Option<i64> {
		bucket(self.mean)
	}

	#[must_use]
	pub fn median_bucket(&self) -> Option<i64> {
		bucket(self.median)
	}
}

pub fn frequency_table<I>(scores: I) -> FrequencyTable
where
	I: IntoIterator<Item = i64>,
{
	let mut table = FrequencyTable::new();
	for score in scores {
		*table.entry(score).or_insert(0) += 1;
	}
	table
}

/// Add every count of `other` into `into`.
pub fn accumulate(into: &mut FrequencyTable, other: &FrequencyTable) {
	for (&score, &n) in other {
		*into.entry(score).or_insert(0) += n;
	}
}

/// Total, mean and median of a frequency table without expanding it.
///
/// The median is the average of the order statistics at ranks `(N-1)/2` and
/// `N/2`, located by walking the ascending keys with a running count.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_stats(counts: &FrequencyTable) -> Stats {
	let total: u64 = counts.values().sum();
	if total == 0 {
		return Stats {
			total: 0,
			mean: None,
			median: None,
			counts: counts.clone(),
		};
	}

	let weighted: f64 = counts.iter().map(|(&score, &n)| score as f64 * n as f64).sum();
	let mean = weighted / total as f64;

	let lower_rank = (total - 1) / 2;
	let upper_rank = total / 2;

	let mut running = 0_u64;
	let mut lower = None;
	let mut upper = None;
	for (&score, &n) in counts {
		running += n;
		if lower.is_none() && running > lower_rank {
			lower = Some(score);
		}
		if running > upper_rank {
			upper = Some(score);
			break;
		}
	}

	let median = lower.zip(upper).map(|(a, b)| (a as f64 + b as f64) / 2.0);

	Stats {
		total,
		mean: Some(mean),
		median,
		counts: counts.clone(),
	}
}

/// Snap a continuous statistic onto the discrete axis `[min, max]`.
///
/// Halves round to the nearest even integer (0.5 -> 0, 1.5 -> 2, -2.5 -> -2).
/// `NaN` has no bucket; infinities clamp to the nearest end of the axis.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn round_to_bucket(value: Option<f64>, min: i64, max: i64) -> Option<i64> {
	let value = value.filter(|v| !v.is_nan())?;
	let rounded = value.round_ties_even().clamp(min as f64, max as f64);
	Some(rounded as i64)
}

/// [`round_to_bucket`] over the score domain.
#[must_use]
pub fn bucket(value: Option<f64>) -> Option<i64> {
	round_to_bucket(value, Score::MIN, Score::MAX)
}

use crate::linear_scale::{round1, LinearScale};
use crate::score::Score;
use crate::stats::FrequencyTable;
use serde::{Serialize, Serializer};
use std::fmt;

pub const DEFAULT_WIDTH: u32 = 720;
pub const DEFAULT_HEIGHT: u32 = 220;

const MIN_BAR_WIDTH: f64 = 10.0;
const BAR_FILL_RATIO: f64 = 0.65;

/// Canvas margins in pixels: top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margins {
	pub t: u32,
	pub r: u32,
	pub b: u32,
	pub l: u32,
}

impl Default for Margins {
	fn default() -> Self {
		Self { t: 12, r: 12, b: 28, l: 12 }
	}
}

/// Symbolic colour for a score. The presentation layer owns the palette; this
/// only names the slot (`var(--neutral)`, `var(--pos-3)`, `var(--neg-2)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillToken {
	Neutral,
	Positive(u64),
	Negative(u64),
}

impl FillToken {
	#[must_use]
	pub const fn for_score(score: i64) -> Self {
		if score == 0 {
			Self::Neutral
		} else if score > 0 {
			Self::Positive(score.unsigned_abs())
		} else {
			Self::Negative(score.unsigned_abs())
		}
	}
}

impl fmt::Display for FillToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Neutral => f.write_str("var(--neutral)"),
			Self::Positive(n) => write!(f, "var(--pos-{n})"),
			Self::Negative(n) => write!(f, "var(--neg-{n})"),
		}
	}
}

impl Serialize for FillToken {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBar {
	pub score: i64,
	pub count: u64,
	pub x: f64,
	pub y: f64,
	pub w: f64,
	pub h: f64,
	pub cx: f64,
	pub fill: FillToken,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionChart {
	pub width: u32,
	pub height: u32,
	pub m: Margins,
	pub bars: Vec<DistributionBar>,
	pub axis_y: f64,
	pub x_labels_y: f64,
}

impl DistributionChart {
	/// Histogram over the full score axis at the default canvas size.
	#[must_use]
	pub fn with_defaults(counts: &FrequencyTable) -> Self {
		build_distribution_chart(counts, None, DEFAULT_WIDTH, DEFAULT_HEIGHT, Margins::default())
	}
}

/// Bottom-anchored histogram, one slot per axis value.
///
/// `axis` defaults to the ascending score domain. Heights are relative to the
/// largest count among the axis values; when every count is zero all bars are
/// flat.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn build_distribution_chart(counts: &FrequencyTable, axis: Option<&[i64]>, width: u32, height: u32, margins: Margins) -> DistributionChart {
	let default_axis;
	let axis = if let Some(axis) = axis {
		axis
	} else {
		default_axis = Score::axis();
		&default_axis
	};

	let top = f64::from(margins.t);
	let left = f64::from(margins.l);
	let inner_w = (f64::from(width) - left - f64::from(margins.r)).max(0.0);
	let inner_h = (f64::from(height) - top - f64::from(margins.b)).max(0.0);

	let count_of = |score: &i64| counts.get(score).copied().unwrap_or(0);
	let max_count = axis.iter().map(count_of).max().unwrap_or(0);

	let height_scale = LinearScale::new().domain(0.0, max_count as f64).range(0.0, inner_h);

	let step = if axis.is_empty() { inner_w } else { inner_w / axis.len() as f64 };
	let bar_w = MIN_BAR_WIDTH.max(step * BAR_FILL_RATIO);

	let bars = axis
		.iter()
		.enumerate()
		.map(|(i, score)| {
			let count = count_of(score);
			let h = height_scale.scale(count as f64);
			let x = left + i as f64 * step + (step - bar_w) / 2.0;
			let y = top + (inner_h - h);
			DistributionBar {
				score: *score,
				count,
				x: round1(x),
				y: round1(y),
				w: round1(bar_w),
				h: round1(h),
				cx: round1(x + bar_w / 2.0),
				fill: FillToken::for_score(*score),
			}
		})
		.collect();

	let bottom = f64::from(margins.b);
	DistributionChart {
		width,
		height,
		m: margins,
		bars,
		axis_y: round1(f64::from(height) - bottom),
		x_labels_y: round1(f64::from(height) - bottom / 2.0),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table(pairs: &[(i64, u64)]) -> FrequencyTable {
		pairs.iter().copied().collect()
	}

	#[test]
	fn test_all_zero_counts_give_flat_bars() {
		let chart = DistributionChart::with_defaults(&FrequencyTable::new());
		assert_eq!(chart.bars.len(), 9);
		for bar in &chart.bars {
			assert_eq!(bar.h, 0.0);
			assert_eq!(bar.count, 0);
			// baseline = top margin + inner height
			assert_eq!(bar.y, 192.0);
		}
	}

	#[test]
	fn test_explicit_zero_counts_give_flat_bars() {
		let chart = DistributionChart::with_defaults(&table(&[(-1, 0), (3, 0)]));
		assert!(chart.bars.iter().all(|b| b.h == 0.0));
	}

	#[test]
	fn test_tallest_bar_fills_inner_height() {
		let chart = DistributionChart::with_defaults(&table(&[(2, 4), (-1, 2)]));

		let plus_two = chart.bars.iter().find(|b| b.score == 2).unwrap();
		assert_eq!(plus_two.h, 180.0);
		assert_eq!(plus_two.y, 12.0);
		assert_eq!(plus_two.x, 489.5);

		let minus_one = chart.bars.iter().find(|b| b.score == -1).unwrap();
		assert_eq!(minus_one.h, 90.0);
		assert_eq!(minus_one.y, 102.0);
	}

	#[test]
	fn test_slot_geometry() {
		let chart = DistributionChart::with_defaults(&table(&[(0, 1)]));
		let first = &chart.bars[0];
		// slot 696 / 9, bar 65% of it
		assert_eq!(first.score, -4);
		assert_eq!(first.w, 50.3);
		assert_eq!(first.x, 25.5);
		assert_eq!(first.cx, 50.7);
		assert_eq!(chart.axis_y, 192.0);
		assert_eq!(chart.x_labels_y, 206.0);
	}

	#[test]
	fn test_bars_follow_axis_order() {
		let chart = DistributionChart::with_defaults(&table(&[(1, 1)]));
		let scores: Vec<i64> = chart.bars.iter().map(|b| b.score).collect();
		assert_eq!(scores, Score::axis());
		assert!(chart.bars.windows(2).all(|w| w[0].x < w[1].x));
	}

	#[test]
	fn test_custom_axis_and_narrow_canvas() {
		let axis = [4, 0, -4];
		let chart = build_distribution_chart(&table(&[(4, 3), (0, 1)]), Some(&axis), 30, 100, Margins { t: 0, r: 0, b: 0, l: 0 });
		assert_eq!(chart.bars.len(), 3);
		assert_eq!(chart.bars[0].score, 4);
		assert_eq!(chart.bars[0].h, 100.0);
		// slot 10px * 0.65 is below the 10px floor
		assert!(chart.bars.iter().all(|b| b.w == 10.0));
		assert_eq!(chart.bars[2].count, 0);
	}

	#[test]
	fn test_empty_axis_yields_no_bars() {
		let chart = build_distribution_chart(&table(&[(1, 5)]), Some(&[]), 720, 220, Margins::default());
		assert!(chart.bars.is_empty());
		assert_eq!(chart.axis_y, 192.0);
	}

	#[test]
	fn test_fill_tokens() {
		assert_eq!(FillToken::for_score(0).to_string(), "var(--neutral)");
		assert_eq!(FillToken::for_score(3).to_string(), "var(--pos-3)");
		assert_eq!(FillToken::for_score(-2).to_string(), "var(--neg-2)");
		assert_eq!(serde_json::to_value(FillToken::for_score(-4)).unwrap(), "var(--neg-4)");
	}

	#[test]
	fn test_distribution_chart_is_idempotent() {
		let counts = table(&[(-3, 2), (0, 7), (4, 1)]);
		assert_eq!(DistributionChart::with_defaults(&counts), DistributionChart::with_defaults(&counts));
	}
}

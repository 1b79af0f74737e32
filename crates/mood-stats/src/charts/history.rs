use crate::linear_scale::{round1, LinearScale};
use crate::score::Score;
use serde::Serialize;

pub const DEFAULT_WIDTH: u32 = 720;
pub const DEFAULT_HEIGHT: u32 = 200;
pub const DEFAULT_MARGIN: u32 = 16;

const MIN_BAR_WIDTH: f64 = 8.0;
const BAR_FILL_RATIO: f64 = 0.7;
const SINGLE_BAR_FILL_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarClass {
	Pos,
	Neg,
}

impl BarClass {
	#[must_use]
	pub const fn of(score: i64) -> Self {
		if score >= 0 {
			Self::Pos
		} else {
			Self::Neg
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryBar {
	pub x: f64,
	pub y: f64,
	pub w: f64,
	pub h: f64,
	pub cls: BarClass,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
	pub top: f64,
	pub zero: f64,
	pub bottom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryChart {
	pub width: u32,
	pub height: u32,
	pub bars: Vec<HistoryBar>,
	pub grid: Grid,
	pub count: usize,
}

impl HistoryChart {
	/// Chart at the default 720x200 canvas with a 16px margin.
	#[must_use]
	pub fn with_defaults(scores_oldest_first: &[i64]) -> Self {
		build_history_chart(scores_oldest_first, DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_MARGIN)
	}
}

/// Bars symmetric around a horizontal zero line, one per score, oldest first.
///
/// Heights scale `|score|` against the largest possible magnitude, so a score
/// of +4 or -4 fills its half of the plot. A single entry gets one wide bar
/// centred on the canvas; an empty slice yields only the grid.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn build_history_chart(scores_oldest_first: &[i64], width: u32, height: u32, margin: u32) -> HistoryChart {
	let margin_px = f64::from(margin);
	let inner_w = (f64::from(width) - 2.0 * margin_px).max(0.0);
	let inner_h = (f64::from(height) - 2.0 * margin_px).max(0.0);
	let half_h = inner_h / 2.0;
	let zero_y = margin_px + half_h;

	let magnitude = LinearScale::new().domain(0.0, Score::MAX_ABS as f64).range(0.0, half_h);

	let n = scores_oldest_first.len();
	let (step, bar_w) = match n {
		0 => (0.0, 0.0),
		1 => (inner_w, MIN_BAR_WIDTH.max(inner_w * SINGLE_BAR_FILL_RATIO)),
		_ => {
			let step = inner_w / n as f64;
			(step, MIN_BAR_WIDTH.max(step * BAR_FILL_RATIO))
		}
	};

	let bars = scores_oldest_first
		.iter()
		.enumerate()
		.map(|(i, &score)| {
			let h = magnitude.scale(score.unsigned_abs() as f64);
			let x = margin_px + i as f64 * step + (step - bar_w) / 2.0;
			let cls = BarClass::of(score);
			let y = match cls {
				BarClass::Pos => zero_y - h,
				BarClass::Neg => zero_y,
			};
			HistoryBar {
				x: round1(x),
				y: round1(y),
				w: round1(bar_w),
				h: round1(h),
				cls,
			}
		})
		.collect();

	HistoryChart {
		width,
		height,
		bars,
		grid: Grid {
			top: margin_px,
			zero: round1(zero_y),
			bottom: round1(f64::from(height) - margin_px),
		},
		count: n,
	}
}

/// Maps a continuous domain `[d0, d1]` onto a pixel range `[r0, r1]`.
///
/// A d3-style linear scale reduced to what bar charts need: two-point domain
/// and `f64` range. A zero-width domain maps everything to `r0`,
/// so "all counts are zero" charts collapse to zero-height bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
	domain: [f64; 2],
	range: [f64; 2],
}

impl LinearScale {
	#[must_use]
	pub const fn new() -> Self {
		Self {
			domain: [0.0, 1.0],
			range: [0.0, 1.0],
		}
	}

	#[must_use]
	pub const fn domain(mut self, start: f64, end: f64) -> Self {
		self.domain = [start, end];
		self
	}

	#[must_use]
	pub const fn range(mut self, start: f64, end: f64) -> Self {
		self.range = [start, end];
		self
	}

	#[must_use]
	pub fn scale(&self, value: f64) -> f64 {
		let [d0, d1] = self.domain;
		let [r0, r1] = self.range;

		let width = d1 - d0;
		if width == 0.0 || width.is_nan() {
			return r0;
		}

		let t = (value - d0) / width;
		r0 * (1.0 - t) + r1 * t
	}
}

impl Default for LinearScale {
	fn default() -> Self {
		Self::new()
	}
}

/// Round to the nearest one-decimal value, judged on the exact binary value;
/// exact halves go to even. Float formatting is exact, scaling by ten is not.
#[must_use]
pub fn round1(value: f64) -> f64 {
	format!("{value:.1}").parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_basic_scale() {
		let scale = LinearScale::new().domain(0.0, 100.0).range(0.0, 1000.0);

		assert_eq!(scale.scale(0.0), 0.0);
		assert_eq!(scale.scale(50.0), 500.0);
		assert_eq!(scale.scale(100.0), 1000.0);

		assert_eq!(scale.scale(150.0), 1500.0);
	}

	#[test]
	fn test_zero_width_domain_maps_to_range_start() {
		let scale = LinearScale::new().domain(0.0, 0.0).range(0.0, 84.0);
		assert_eq!(scale.scale(0.0), 0.0);
		assert_eq!(scale.scale(12.0), 0.0);
	}

	#[test]
	fn test_round1() {
		assert_eq!(round1(40.23), 40.2);
		assert_eq!(round1(40.27), 40.3);
		assert_eq!(round1(0.25), 0.2);
		assert_eq!(round1(-3.0), -3.0);
	}

	#[test]
	fn test_round1_uses_the_exact_value() {
		// 0.35 is stored slightly below the half, 65.45 slightly above
		assert_eq!(round1(0.35), 0.3);
		assert_eq!(round1(65.45), 65.5);
		assert!(round1(f64::NAN).is_nan());
	}
}

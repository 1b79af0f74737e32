use serde::{Deserialize, Serialize};
use std::fmt;

/// A daily mood level. The set is closed: nine values from -4 to +4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
#[repr(i8)]
pub enum Score {
	Minus4 = -4,
	Minus3 = -3,
	Minus2 = -2,
	Minus1 = -1,
	Zero = 0,
	Plus1 = 1,
	Plus2 = 2,
	Plus3 = 3,
	Plus4 = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("score {0} is outside the range -4..=4")]
pub struct ScoreOutOfRange(pub i64);

impl Score {
	/// Ascending axis order, the single source for forms, legends and charts.
	pub const ALL: [Self; 9] = [
		Self::Minus4,
		Self::Minus3,
		Self::Minus2,
		Self::Minus1,
		Self::Zero,
		Self::Plus1,
		Self::Plus2,
		Self::Plus3,
		Self::Plus4,
	];

	pub const MIN: i64 = -4;
	pub const MAX: i64 = 4;

	/// Largest magnitude on either side of zero; symmetric charts scale against it.
	pub const MAX_ABS: i64 = if Self::MIN.abs() > Self::MAX.abs() { Self::MIN.abs() } else { Self::MAX.abs() };

	#[must_use]
	pub const fn value(self) -> i64 {
		self as i64
	}

	#[must_use]
	pub const fn label(self) -> &'static str {
		match self {
			Self::Minus4 => "no comment ☠️",
			Self::Minus3 => "unterirdisch 💀",
			Self::Minus2 => "meh 😵‍💫",
			Self::Minus1 => "mau 🙁",
			Self::Zero => "passt scho 😐",
			Self::Plus1 => "ganz okay 🙂",
			Self::Plus2 => "gut drauf 😎",
			Self::Plus3 => "geilo 🤩",
			Self::Plus4 => "geilomatico 🚀",
		}
	}

	/// Axis values as plain integers, ascending.
	#[must_use]
	pub fn axis() -> Vec<i64> {
		Self::ALL.iter().map(|s| s.value()).collect()
	}

	pub fn descending() -> impl Iterator<Item = Self> {
		Self::ALL.into_iter().rev()
	}
}

impl TryFrom<i64> for Score {
	type Error = ScoreOutOfRange;

	fn try_from(value: i64) -> Result<Self, Self::Error> {
		Self::ALL.into_iter().find(|s| s.value() == value).ok_or(ScoreOutOfRange(value))
	}
}

impl From<Score> for i64 {
	fn from(score: Score) -> Self {
		score.value()
	}
}

impl fmt::Display for Score {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

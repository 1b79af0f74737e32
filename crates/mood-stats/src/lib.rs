//! Pure statistics and chart geometry for daily mood scores.
//!
//! Nothing in here touches storage or the network: every function takes plain
//! values and returns plain values, so the same input always yields the same
//! output.

pub mod charts;
pub mod linear_scale;
pub mod score;
pub mod stats;
pub mod window;

pub use charts::distribution::{build_distribution_chart, DistributionBar, DistributionChart, FillToken, Margins};
pub use charts::history::{build_history_chart, BarClass, Grid, HistoryBar, HistoryChart};
pub use linear_scale::LinearScale;
pub use score::{Score, ScoreOutOfRange};
pub use stats::{accumulate, bucket, compute_stats, frequency_table, round_to_bucket, FrequencyTable, Stats};
pub use window::{validate_window, window_start, DEFAULT_WINDOW_DAYS, HISTORY_DAYS_CHOICES, TEAM_AGG_DAYS_CHOICES};

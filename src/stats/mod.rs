//! Streaming aggregation and hypothesis-testing primitives
//!
//! Two pure layers:
//! - [`compute_statistics`] reduces the append-only event log to per-variant,
//!   per-metric descriptive statistics;
//! - [`welch_t_test`] compares two of those groups without assuming equal
//!   variances.
//!
//! Neither layer touches storage or experiment state; both are deterministic
//! functions of their inputs.

mod aggregate;
mod welch;

pub use aggregate::{compute_statistics, StatsTable, VariantStatistics};
pub(crate) use welch::SE_FLOOR;
pub use welch::{normal_cdf, welch_t_test, WelchTest};

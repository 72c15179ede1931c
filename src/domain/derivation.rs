//! Growth derivation engine.
//!
//! Pure arithmetic over a current reading and the reading that precedes it
//! chronologically. Choosing *which* reading precedes is the service's job;
//! this module only does the math.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// The two inputs the engine looks at: a weight and when it was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Measured weight.
    pub weight: f64,
    /// When the weight was taken.
    pub record_date: DateTime<Utc>,
}

/// Derived change metrics relative to the preceding reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthMetrics {
    /// `current.weight - previous.weight`.
    pub weight_change: f64,
    /// `weight_change / previous.weight * 100`, zero when the previous
    /// weight is zero.
    pub change_percentage: f64,
    /// `weight_change` per whole elapsed day, zero when no day elapsed.
    pub growth_rate: f64,
}

/// Computes the growth metrics of `current` against `previous`.
///
/// With no previous reading every metric is zero. The result never contains
/// NaN or infinities for finite inputs.
#[must_use]
pub fn derive(current: Reading, previous: Option<Reading>) -> GrowthMetrics {
    let Some(previous) = previous else {
        return GrowthMetrics::default();
    };

    let weight_change = current.weight - previous.weight;
    let change_percentage = if previous.weight == 0.0 {
        0.0
    } else {
        weight_change / previous.weight * 100.0
    };

    let days = days_between(current.record_date, previous.record_date);
    #[allow(clippy::cast_precision_loss)]
    let growth_rate = if days > 0 {
        weight_change / days as f64
    } else {
        0.0
    };

    tracing::debug!(
        weight_change,
        change_percentage,
        growth_rate,
        days,
        "derived growth metrics"
    );

    GrowthMetrics {
        weight_change,
        change_percentage,
        growth_rate,
    }
}

/// Elapsed whole days from `earlier` to `later`, rounding fractional days up.
///
/// Uses elapsed time rather than calendar-day difference, so 36 hours is two
/// days and a 1 ms gap is one day. Negative when `later` precedes `earlier`.
#[must_use]
pub fn days_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> i64 {
    #[allow(clippy::cast_precision_loss)]
    let millis = (later - earlier).num_milliseconds() as f64;
    #[allow(clippy::cast_possible_truncation)]
    let days = (millis / MILLIS_PER_DAY).ceil() as i64;
    days
}

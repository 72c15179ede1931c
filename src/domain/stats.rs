//! Windowed statistics over an animal's weight series.
//!
//! Every function here takes the window already fetched and sorted
//! ascending; none of them touch storage.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::animal::Animal;
use super::derivation::days_between;
use super::observation::WeightObservation;
use super::AnimalId;

/// Closed date range `[from, to]`; a missing bound is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Inclusive lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound.
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// The unbounded range.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            from: None,
            to: None,
        }
    }

    /// `[now - days, now]`.
    #[must_use]
    pub fn trailing_days(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            from: Some(now - Duration::days(i64::from(days))),
            to: Some(now),
        }
    }

    /// Returns `true` if `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Aggregate statistics for one animal over a trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WeightStats {
    /// Animal the statistics describe.
    pub animal_id: AnimalId,
    /// Window length in days.
    pub period_days: u32,
    /// Latest known weight of the animal.
    pub current_weight: f64,
    /// Heaviest weight in the window.
    pub highest_weight: f64,
    /// Lightest weight in the window.
    pub lowest_weight: f64,
    /// Last window weight minus first window weight.
    pub total_gain: f64,
    /// `total_gain` per day between the window's first and last records.
    pub average_growth_rate: f64,
    /// Number of observations in the window.
    pub record_count: usize,
}

/// A single point of a comparison series.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WeightPoint {
    /// Record date.
    pub date: DateTime<Utc>,
    /// Weight at that date.
    pub weight: f64,
}

/// One animal's row in a multi-animal comparison.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ComparisonEntry {
    /// Animal identifier.
    pub animal_id: AnimalId,
    /// Animal display name.
    pub animal_name: String,
    /// Latest known weight, zero if never weighed.
    pub current_weight: f64,
    /// Window series, ascending by date.
    pub records: Vec<WeightPoint>,
    /// Average daily growth across the window endpoints.
    pub growth_rate: f64,
    /// Last window weight minus first window weight.
    pub total_gain: f64,
}

/// Gain and average daily growth between the first and last entries of an
/// ascending window. Both are zero with fewer than two records; the rate is
/// zero when the endpoints fall within the same instant.
#[must_use]
pub fn window_growth(window: &[WeightObservation]) -> (f64, f64) {
    let (Some(first), Some(last)) = (window.first(), window.last()) else {
        return (0.0, 0.0);
    };
    if window.len() < 2 {
        return (0.0, 0.0);
    }

    let total_gain = last.weight - first.weight;
    let days = days_between(last.record_date, first.record_date);
    #[allow(clippy::cast_precision_loss)]
    let rate = if days > 0 {
        total_gain / days as f64
    } else {
        0.0
    };
    (total_gain, rate)
}

/// Reduces an ascending window into [`WeightStats`].
///
/// `summary_weight` is the animal's cached current weight; when it was never
/// written the last window weight stands in, and an empty window falls back
/// to zero.
#[must_use]
pub fn summarize(
    animal_id: AnimalId,
    period_days: u32,
    window: &[WeightObservation],
    summary_weight: Option<f64>,
) -> WeightStats {
    let Some(last) = window.last() else {
        return WeightStats {
            animal_id,
            period_days,
            current_weight: summary_weight.unwrap_or(0.0),
            highest_weight: 0.0,
            lowest_weight: 0.0,
            total_gain: 0.0,
            average_growth_rate: 0.0,
            record_count: 0,
        };
    };

    let highest_weight = window
        .iter()
        .map(|o| o.weight)
        .fold(f64::NEG_INFINITY, f64::max);
    let lowest_weight = window
        .iter()
        .map(|o| o.weight)
        .fold(f64::INFINITY, f64::min);
    let (total_gain, average_growth_rate) = window_growth(window);

    WeightStats {
        animal_id,
        period_days,
        current_weight: summary_weight.unwrap_or(last.weight),
        highest_weight,
        lowest_weight,
        total_gain,
        average_growth_rate,
        record_count: window.len(),
    }
}

/// Builds the comparison row for `animal` from its ascending window.
#[must_use]
pub fn comparison_entry(animal: &Animal, window: &[WeightObservation]) -> ComparisonEntry {
    let (total_gain, growth_rate) = window_growth(window);
    ComparisonEntry {
        animal_id: animal.id,
        animal_name: animal.name.clone(),
        current_weight: animal.summary.current_weight.unwrap_or(0.0),
        records: window
            .iter()
            .map(|o| WeightPoint {
                date: o.record_date,
                weight: o.weight,
            })
            .collect(),
        growth_rate,
        total_gain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::animal::NewAnimal;
    use crate::domain::observation::NewObservation;
    use crate::domain::OwnerId;

    fn series(animal_id: AnimalId, points: &[(f64, i64)]) -> Vec<WeightObservation> {
        let base = Utc::now() - Duration::days(20);
        points
            .iter()
            .map(|&(weight, day)| {
                WeightObservation::new(
                    animal_id,
                    OwnerId::new(),
                    NewObservation::at(weight, base + Duration::days(day)),
                    base,
                )
            })
            .collect()
    }

    #[test]
    fn empty_window_falls_back_to_summary() {
        let id = AnimalId::new();
        let stats = summarize(id, 30, &[], Some(87.0));
        assert_eq!(stats.record_count, 0);
        assert_eq!(stats.current_weight, 87.0);
        assert_eq!(stats.highest_weight, 0.0);
        assert_eq!(stats.lowest_weight, 0.0);
        assert_eq!(stats.total_gain, 0.0);
        assert_eq!(stats.average_growth_rate, 0.0);

        assert_eq!(summarize(id, 30, &[], None).current_weight, 0.0);
    }

    #[test]
    fn two_records_ten_days_apart() {
        let id = AnimalId::new();
        let window = series(id, &[(100.0, 0), (110.0, 10)]);
        let stats = summarize(id, 30, &window, Some(110.0));
        assert_eq!(stats.total_gain, 10.0);
        assert_eq!(stats.highest_weight, 110.0);
        assert_eq!(stats.lowest_weight, 100.0);
        assert_eq!(stats.record_count, 2);
        assert_eq!(stats.average_growth_rate, 1.0);
        assert_eq!(stats.current_weight, 110.0);
    }

    #[test]
    fn gain_is_chronological_not_magnitude() {
        let id = AnimalId::new();
        let window = series(id, &[(120.0, 0), (140.0, 2), (100.0, 4)]);
        let stats = summarize(id, 30, &window, None);
        assert_eq!(stats.total_gain, -20.0);
        assert_eq!(stats.average_growth_rate, -5.0);
        assert_eq!(stats.highest_weight, 140.0);
        assert_eq!(stats.lowest_weight, 100.0);
        assert_eq!(stats.current_weight, 100.0);
    }

    #[test]
    fn single_record_has_no_growth() {
        let id = AnimalId::new();
        let window = series(id, &[(42.0, 3)]);
        let stats = summarize(id, 7, &window, None);
        assert_eq!(stats.record_count, 1);
        assert_eq!(stats.highest_weight, 42.0);
        assert_eq!(stats.lowest_weight, 42.0);
        assert_eq!(stats.total_gain, 0.0);
        assert_eq!(stats.average_growth_rate, 0.0);
    }

    #[test]
    fn comparison_entry_without_records() {
        let animal = Animal::new(
            OwnerId::new(),
            NewAnimal {
                name: "Dolly".to_string(),
                species: None,
            },
            Utc::now(),
        );
        let entry = comparison_entry(&animal, &[]);
        assert!(entry.records.is_empty());
        assert_eq!(entry.growth_rate, 0.0);
        assert_eq!(entry.total_gain, 0.0);
        assert_eq!(entry.current_weight, 0.0);
        assert_eq!(entry.animal_name, "Dolly");
    }

    #[test]
    fn trailing_range_is_closed() {
        let now = Utc::now();
        let range = DateRange::trailing_days(now, 30);
        assert!(range.contains(now));
        assert!(range.contains(now - Duration::days(30)));
        assert!(!range.contains(now - Duration::days(30) - Duration::seconds(1)));
        assert!(!range.contains(now + Duration::seconds(1)));
        assert!(DateRange::all().contains(now));
    }
}

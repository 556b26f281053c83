//! crates/habit_tracker_core/src/chart.rs
//!
//! Axis bounds for a plotted series. Bounds are exactly the extremes of the
//! data; a single-point series yields zero-width ranges, which renderers must
//! tolerate rather than widen.

use crate::domain::SeriesPoint;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub min_duration: f64,
    pub max_duration: f64,
}

impl ChartBounds {
    /// Returns `None` for an empty series.
    pub fn from_points(points: &[SeriesPoint]) -> Option<Self> {
        let first = points.first()?;
        let seed = Self {
            min_date: first.date,
            max_date: first.date,
            min_duration: first.duration,
            max_duration: first.duration,
        };
        Some(points.iter().skip(1).fold(seed, |acc, point| Self {
            min_date: acc.min_date.min(point.date),
            max_date: acc.max_date.max(point.date),
            min_duration: acc.min_duration.min(point.duration),
            max_duration: acc.max_duration.max(point.duration),
        }))
    }

    /// Width of the x range in days.
    pub fn day_span(&self) -> i64 {
        (self.max_date - self.min_date).num_days()
    }

    pub fn duration_span(&self) -> f64 {
        self.max_duration - self.min_duration
    }
}

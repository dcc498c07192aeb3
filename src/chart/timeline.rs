use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::calendar::{
    add_days, add_months, add_years, diff_days, diff_days_inclusive, start_of_month,
    start_of_week, start_of_year,
};
use crate::model::GanttData;

/// The calendar granularity of the horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewMode {
    Day,
    Week,
    Month,
    Year,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [ViewMode::Day, ViewMode::Week, ViewMode::Month, ViewMode::Year];

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Day => "Day",
            ViewMode::Week => "Week",
            ViewMode::Month => "Month",
            ViewMode::Year => "Year",
        }
    }
}

/// The date↔pixel mapping for the current view.
///
/// `start`/`end` are the buffered, snapped axis bounds; `min_date`/`max_date`
/// are the raw data extrema (resolved against the fallbacks) that the
/// incremental loader hands out as context.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub view_mode: ViewMode,
    pub pixels_per_day: f32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

impl Timeline {
    /// Scan the dataset's plan/actual endpoints and derive the axis bounds:
    /// extrema, then a 7-day leading / 14-day trailing buffer, then snapping
    /// to the view mode's period boundary.
    pub fn compute(
        data: &GanttData,
        view_mode: ViewMode,
        pixels_per_day: f32,
        today: NaiveDate,
    ) -> Self {
        let mut min: Option<NaiveDate> = None;
        let mut max: Option<NaiveDate> = None;
        let mut fold = |d: NaiveDate| {
            min = Some(min.map_or(d, |m| m.min(d)));
            max = Some(max.map_or(d, |m| m.max(d)));
        };
        for row in data {
            for task in &row.tasks {
                if let Some(plan) = task.plan {
                    fold(plan.start);
                    fold(plan.end);
                }
                if let Some(actual) = task.actual {
                    fold(actual.start);
                    // An open-ended actual contributes only its start; the
                    // bar still renders through today.
                    if let Some(end) = actual.end {
                        fold(end);
                    }
                }
            }
        }

        let (min_date, max_date) = if data.is_empty() {
            (today, add_days(today, 60))
        } else {
            match (min, max) {
                (Some(a), Some(b)) => (a, b),
                // Rows exist but none carries a dated interval.
                _ => (start_of_year(today), add_years(start_of_year(today), 1)),
            }
        };

        let lead = add_days(min_date, -7);
        let trail = add_days(max_date, 14);
        let (start, end) = match view_mode {
            ViewMode::Year => (
                start_of_year(lead),
                add_days(add_years(start_of_year(trail), 1), -1),
            ),
            ViewMode::Month => (
                start_of_month(lead),
                add_days(add_months(start_of_month(trail), 1), -1),
            ),
            ViewMode::Week => (start_of_week(lead), add_days(start_of_week(trail), 7)),
            ViewMode::Day => (add_days(lead, -3), add_days(trail, 3)),
        };

        Self {
            view_mode,
            pixels_per_day,
            start,
            end,
            min_date,
            max_date,
        }
    }

    /// Horizontal pixel position of a date.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        diff_days(self.start, date) as f32 * self.pixels_per_day
    }

    /// Inverse of [`date_to_x`], floored to a whole calendar day. Fractional
    /// pixel positions are meaningful on the axis (sub-day bars) but do not
    /// correspond to a calendar date.
    ///
    /// [`date_to_x`]: Timeline::date_to_x
    pub fn x_to_date(&self, x: f32) -> NaiveDate {
        add_days(self.start, (x / self.pixels_per_day).floor() as i64)
    }

    /// Days spanned by the axis, endpoints included.
    pub fn total_days(&self) -> i64 {
        diff_days_inclusive(self.start, self.end)
    }

    pub fn total_width(&self) -> f32 {
        self.total_days() as f32 * self.pixels_per_day
    }

    /// Snap a date back to the start of the period it falls in.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self.view_mode {
            ViewMode::Day => date,
            ViewMode::Week => start_of_week(date),
            ViewMode::Month => start_of_month(date),
            ViewMode::Year => start_of_year(date),
        }
    }

    /// Advance one header/grid unit: 1 day, 7 days, 1 month or 6 months.
    pub fn period_step(&self, date: NaiveDate) -> NaiveDate {
        let next = match self.view_mode {
            ViewMode::Day => add_days(date, 1),
            ViewMode::Week => add_days(date, 7),
            ViewMode::Month => add_months(date, 1),
            ViewMode::Year => add_months(date, 6),
        };
        if next > date {
            next
        } else {
            add_days(date, 1)
        }
    }

    /// Period boundaries covering the visible window, shared by the header
    /// and the column grid. Starts at the period containing `visible_start`,
    /// fast-forwarded to within seven density-units left of the scroll
    /// position so a partially-visible first block is kept but a Year-mode
    /// snap doesn't walk in from January.
    pub fn visible_periods(
        &self,
        visible_start: NaiveDate,
        visible_end: NaiveDate,
        scroll_x: f32,
    ) -> PeriodIter<'_> {
        let mut current = self.period_start(visible_start);
        while self.date_to_x(current) < scroll_x - self.pixels_per_day * 7.0 {
            current = self.period_step(current);
        }
        PeriodIter {
            timeline: self,
            current,
            end: visible_end,
        }
    }
}

/// Iterator over period boundary dates, inclusive of the last boundary at or
/// before `end`.
pub struct PeriodIter<'a> {
    timeline: &'a Timeline,
    current: NaiveDate,
    end: NaiveDate,
}

impl Iterator for PeriodIter<'_> {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.current > self.end {
            return None;
        }
        let date = self.current;
        self.current = self.timeline.period_step(date);
        Some(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Row, Task};
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn single_task_data(start: NaiveDate, end: NaiveDate) -> GanttData {
        vec![Row::new("a", "A", vec![Task::new("t1", "task").with_plan(start, end)])]
    }

    #[test]
    fn month_bounds_buffer_then_snap() {
        let data = single_task_data(d(2025, 1, 1), d(2025, 1, 5));
        let tl = Timeline::compute(&data, ViewMode::Month, 15.0, d(2025, 1, 3));
        // min−7d = 2024-12-25 snaps to its month start; max+14d = 2025-01-19
        // lands in January, so the axis ends on Jan 31.
        assert_eq!(tl.start, d(2024, 12, 1));
        assert_eq!(tl.end, d(2025, 1, 31));
        assert_eq!(tl.min_date, d(2025, 1, 1));
        assert_eq!(tl.max_date, d(2025, 1, 5));
    }

    #[test]
    fn bounds_envelope_all_modes() {
        let data = single_task_data(d(2025, 3, 10), d(2025, 8, 20));
        for mode in ViewMode::ALL {
            let tl = Timeline::compute(&data, mode, 10.0, d(2025, 5, 1));
            assert!(tl.start <= d(2025, 3, 10), "{mode:?}: start {}", tl.start);
            assert!(tl.end >= d(2025, 8, 20), "{mode:?}: end {}", tl.end);
        }
    }

    #[test]
    fn day_bounds_use_flat_buffer() {
        let data = single_task_data(d(2025, 11, 6), d(2025, 11, 10));
        let tl = Timeline::compute(&data, ViewMode::Day, 80.0, d(2025, 11, 7));
        assert_eq!(tl.start, d(2025, 10, 27)); // min − 7 − 3
        assert_eq!(tl.end, d(2025, 11, 27)); // max + 14 + 3
    }

    #[test]
    fn week_bounds_snap_to_monday() {
        let data = single_task_data(d(2025, 11, 6), d(2025, 11, 10));
        let tl = Timeline::compute(&data, ViewMode::Week, 20.0, d(2025, 11, 7));
        // 2025-10-30 is a Thursday; its week starts Monday 10-27.
        assert_eq!(tl.start, d(2025, 10, 27));
        // max+14 = 11-24 (Monday), end = +7d
        assert_eq!(tl.end, d(2025, 12, 1));
    }

    #[test]
    fn empty_data_defaults_to_sixty_days_from_today() {
        let tl = Timeline::compute(&Vec::new(), ViewMode::Day, 80.0, d(2025, 6, 1));
        assert_eq!(tl.min_date, d(2025, 6, 1));
        assert_eq!(tl.max_date, d(2025, 7, 31));
    }

    #[test]
    fn undated_rows_fall_back_to_current_year() {
        let data = vec![Row::new("a", "A", vec![Task::new("t1", "no dates")])];
        let tl = Timeline::compute(&data, ViewMode::Month, 15.0, d(2025, 6, 1));
        assert_eq!(tl.min_date, d(2025, 1, 1));
        assert_eq!(tl.max_date, d(2026, 1, 1));
    }

    #[test]
    fn mapping_round_trips_and_is_monotonic() {
        let data = single_task_data(d(2025, 1, 1), d(2025, 12, 31));
        for mode in ViewMode::ALL {
            let ppd = match mode {
                ViewMode::Day => 80.0,
                ViewMode::Week => 20.0,
                ViewMode::Month => 15.0,
                ViewMode::Year => 6.0,
            };
            let tl = Timeline::compute(&data, mode, ppd, d(2025, 6, 1));
            let mut prev_x = f32::NEG_INFINITY;
            let mut date = tl.start;
            while date <= tl.end {
                let x = tl.date_to_x(date);
                assert!(x >= prev_x, "{mode:?}: not monotonic at {date}");
                assert_eq!(tl.x_to_date(x), date, "{mode:?}: round trip at {date}");
                prev_x = x;
                date = add_days(date, 11);
            }
        }
    }

    #[test]
    fn fractional_x_floors_to_day() {
        let data = single_task_data(d(2025, 1, 1), d(2025, 1, 31));
        let tl = Timeline::compute(&data, ViewMode::Day, 80.0, d(2025, 1, 15));
        let x = tl.date_to_x(d(2025, 1, 10));
        assert_eq!(tl.x_to_date(x + 79.0), d(2025, 1, 10));
        assert_eq!(tl.x_to_date(x + 80.0), d(2025, 1, 11));
    }

    #[test]
    fn year_periods_step_half_years() {
        let data = single_task_data(d(2024, 3, 1), d(2025, 10, 1));
        let tl = Timeline::compute(&data, ViewMode::Year, 6.0, d(2025, 1, 1));
        let periods: Vec<_> = tl.visible_periods(tl.start, tl.end, 0.0).collect();
        assert_eq!(periods[0], d(2024, 1, 1));
        assert_eq!(periods[1], d(2024, 7, 1));
        assert_eq!(periods[2], d(2025, 1, 1));
        assert!(periods.iter().all(|p| p.format("%m-%d").to_string() == "01-01"
            || p.format("%m-%d").to_string() == "07-01"));
    }

    #[test]
    fn period_iteration_fast_forwards_to_scroll() {
        let data = single_task_data(d(2025, 1, 1), d(2025, 12, 31));
        let tl = Timeline::compute(&data, ViewMode::Day, 80.0, d(2025, 6, 1));
        let scroll_x = 4000.0;
        let first = tl
            .visible_periods(tl.start, tl.end, scroll_x)
            .next()
            .unwrap();
        let x = tl.date_to_x(first);
        assert!(x >= scroll_x - 80.0 * 7.0);
        assert!(x <= scroll_x + 80.0);
    }
}

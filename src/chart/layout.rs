use std::collections::HashMap;

use chrono::NaiveDate;

use crate::chart::timeline::{Timeline, ViewMode};
use crate::config::GanttConfig;
use crate::model::calendar::add_days;
use crate::model::{GanttData, Row, Task};

/// Location of a task inside the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRef {
    pub row: usize,
    pub task: usize,
}

/// Task id → (row index, task index) lookup.
///
/// Rebuilt wholesale after every data replacement or merge, always before
/// positions are recomputed; it never survives a mutation.
#[derive(Debug, Default)]
pub struct TaskIndex {
    map: HashMap<String, TaskRef>,
}

impl TaskIndex {
    pub fn build(data: &GanttData) -> Self {
        let mut map = HashMap::new();
        for (row_index, row) in data.iter().enumerate() {
            for (task_index, task) in row.tasks.iter().enumerate() {
                map.insert(
                    task.id.clone(),
                    TaskRef {
                        row: row_index,
                        task: task_index,
                    },
                );
            }
        }
        Self { map }
    }

    pub fn get(&self, id: &str) -> Option<TaskRef> {
        self.map.get(id).copied()
    }

    pub fn resolve<'a>(&self, data: &'a GanttData, id: &str) -> Option<(TaskRef, &'a Task)> {
        let task_ref = self.get(id)?;
        let task = data.get(task_ref.row)?.tasks.get(task_ref.task)?;
        Some((task_ref, task))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Horizontal pixel extent of one bar: the raw day-cell span and the
/// offset-adjusted span actually drawn. Outside Day mode (or without a
/// percent pair) the two coincide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSpan {
    pub raw_start: f32,
    pub raw_end: f32,
    pub start: f32,
    pub end: f32,
}

impl BarSpan {
    fn from_raw(raw_start: f32, raw_end: f32, offset: Option<[f32; 2]>) -> Self {
        let (start, end) = match offset {
            Some([offset, length]) => {
                let width = raw_end - raw_start;
                let start = raw_start + width * offset;
                (start, start + width * length)
            }
            None => (raw_start, raw_end),
        };
        Self {
            raw_start,
            raw_end,
            start,
            end,
        }
    }

    pub fn width(&self) -> f32 {
        self.end - self.start
    }

    pub fn intersects(&self, x0: f32, x1: f32) -> bool {
        self.start <= x1 && self.end >= x0
    }
}

/// Pixel geometry of one task, rebuilt wholesale on every full render and
/// treated as immutable input by the draw stage.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPosition {
    pub plan: Option<BarSpan>,
    pub actual: Option<BarSpan>,
    /// The actual interval has no end date and extends to today.
    pub actual_open: bool,
    /// Vertical center of the owning row, in chart coordinates.
    pub y: f32,
    pub row: usize,
}

impl TaskPosition {
    /// Leftmost drawn edge, where dependency connectors enter.
    pub fn left_edge(&self) -> Option<f32> {
        match (self.plan, self.actual) {
            (Some(p), Some(a)) => Some(p.start.min(a.start)),
            (Some(p), None) => Some(p.start),
            (None, Some(a)) => Some(a.start),
            (None, None) => None,
        }
    }

    /// Rightmost drawn edge, where dependency connectors exit.
    pub fn right_edge(&self) -> Option<f32> {
        match (self.plan, self.actual) {
            (Some(p), Some(a)) => Some(p.end.max(a.end)),
            (Some(p), None) => Some(p.end),
            (None, Some(a)) => Some(a.end),
            (None, None) => None,
        }
    }

    /// Whether the plan or actual span touches the horizontal window.
    pub fn intersects_x(&self, x0: f32, x1: f32) -> bool {
        self.plan.map_or(false, |p| p.intersects(x0, x1))
            || self.actual.map_or(false, |a| a.intersects(x0, x1))
    }
}

/// Per-task geometry for the whole dataset.
#[derive(Debug, Default)]
pub struct PositionCache {
    map: HashMap<String, TaskPosition>,
}

impl PositionCache {
    /// Compute every task's geometry for the current timeline and config.
    /// Bar ends are exclusive-day converted (end + 1 day) so a one-day task
    /// spans its whole cell; an actual interval without an end runs to
    /// today. Sub-day percent pairs apply only in Day mode.
    pub fn compute(
        data: &GanttData,
        timeline: &Timeline,
        config: &GanttConfig,
        today: NaiveDate,
    ) -> Self {
        let mut map = HashMap::new();
        let sub_day = config.view_mode == ViewMode::Day;
        for (row_index, row) in data.iter().enumerate() {
            let y = row_index as f32 * config.row_height + config.row_height * 0.5;
            for task in &row.tasks {
                let plan = task.plan.map(|span| {
                    BarSpan::from_raw(
                        timeline.date_to_x(span.start),
                        timeline.date_to_x(add_days(span.end, 1)),
                        task.plan_offset_percent.filter(|_| sub_day),
                    )
                });
                let actual = task.actual.map(|span| {
                    let raw_end = match span.end {
                        Some(end) => timeline.date_to_x(add_days(end, 1)),
                        None => timeline.date_to_x(today),
                    };
                    BarSpan::from_raw(
                        timeline.date_to_x(span.start),
                        raw_end,
                        task.actual_offset_percent.filter(|_| sub_day),
                    )
                });
                map.insert(
                    task.id.clone(),
                    TaskPosition {
                        plan,
                        actual,
                        actual_open: task.actual.map_or(false, |a| a.end.is_none()),
                        y,
                        row: row_index,
                    },
                );
            }
        }
        Self { map }
    }

    pub fn get(&self, id: &str) -> Option<&TaskPosition> {
        self.map.get(id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Ids of the tasks the virtualized renderer will draw: rows intersecting
/// the vertical window, tasks whose plan-or-actual span intersects the
/// horizontal window.
pub fn visible_tasks<'a>(
    data: &'a GanttData,
    cache: &PositionCache,
    rows: std::ops::Range<usize>,
    x_window: (f32, f32),
) -> Vec<&'a str> {
    let mut out = Vec::new();
    for row in &data[rows.start.min(data.len())..rows.end.min(data.len())] {
        for task in &row.tasks {
            if let Some(pos) = cache.get(&task.id) {
                if pos.intersects_x(x_window.0, x_window.1) {
                    out.push(task.id.as_str());
                }
            }
        }
    }
    out
}

/// Tasks in `row` whose plan or actual interval covers `date` (inclusive
/// days; an open-ended actual covers through today). Drives the tooltip.
pub fn tasks_at<'a>(row: &'a Row, date: NaiveDate, today: NaiveDate) -> Vec<&'a Task> {
    row.tasks
        .iter()
        .filter(|task| {
            task.plan.map_or(false, |p| p.contains(date))
                || task
                    .actual
                    .map_or(false, |a| a.start <= date && date <= a.end_or(today))
        })
        .collect()
}

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::GanttError;
use crate::model::calendar;
use crate::surface::Color;

/// The whole dataset: row order is the vertical stacking order.
pub type GanttData = Vec<Row>;

/// One horizontal lane of the chart.
#[derive(Debug, Clone, Deserialize)]
pub struct Row {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Row {
    pub fn new(id: impl Into<String>, name: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tasks,
        }
    }
}

/// Category tag carried by a task; `Leave` rows get distinct tooltip text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Task,
    Leave,
}

/// A closed date interval, both endpoints included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Inclusive day count.
    pub fn days(&self) -> i64 {
        calendar::diff_days_inclusive(self.start, self.end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// An observed interval; `end == None` means the task is still in progress
/// and renders through today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActualSpan {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl ActualSpan {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// The interval end used for bounds and hover matching, with open-ended
    /// spans resolved against `today`.
    pub fn end_or(&self, today: NaiveDate) -> NaiveDate {
        self.end.unwrap_or(today)
    }
}

/// A single task within a row.
///
/// A task may carry a planned interval, an actual interval, both, or
/// neither; one with neither contributes nothing to the timeline bounds but
/// is still addressable as a dependency target.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawTask")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub kind: TaskKind,
    pub plan: Option<DateSpan>,
    pub actual: Option<ActualSpan>,
    /// Predecessor task ids.
    pub dependencies: Vec<String>,
    pub left_remark: Option<String>,
    pub right_remark: Option<String>,
    pub center_remark: Option<String>,
    /// Per-task overrides of the global bar colors.
    pub plan_border_color: Option<Color>,
    pub actual_bg_color: Option<Color>,
    /// `[offset, length]` fractions of the bar width, applied only in Day
    /// mode to draw bars finer than one day cell.
    pub plan_offset_percent: Option<[f32; 2]>,
    pub actual_offset_percent: Option<[f32; 2]>,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: TaskKind::Task,
            plan: None,
            actual: None,
            dependencies: Vec::new(),
            left_remark: None,
            right_remark: None,
            center_remark: None,
            plan_border_color: None,
            actual_bg_color: None,
            plan_offset_percent: None,
            actual_offset_percent: None,
        }
    }

    pub fn with_plan(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.plan = Some(DateSpan::new(start, end));
        self
    }

    pub fn with_actual(mut self, start: NaiveDate, end: impl Into<Option<NaiveDate>>) -> Self {
        self.actual = Some(ActualSpan::new(start, end.into()));
        self
    }

    pub fn with_dependencies<S: Into<String>>(
        mut self,
        ids: impl IntoIterator<Item = S>,
    ) -> Self {
        self.dependencies = ids.into_iter().map(Into::into).collect();
        self
    }
}

/// Parse a task date string: a plain date or a datetime, which floors to its
/// date (positions are day-granular; sub-day placement uses percent pairs).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y/%m/%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Parse a dataset from JSON in the wire shape (camelCase keys, string
/// dates, hex colors). Malformed dates and colors are rejected here, before
/// any of them can reach layout.
pub fn data_from_json(json: &str) -> serde_json::Result<GanttData> {
    serde_json::from_str(json)
}

/// Wire shape of a task, converted (and validated) into [`Task`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTask {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: Option<TaskKind>,
    plan_start: Option<String>,
    plan_end: Option<String>,
    actual_start: Option<String>,
    actual_end: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
    left_remark: Option<String>,
    right_remark: Option<String>,
    center_remark: Option<String>,
    plan_border_color: Option<String>,
    actual_bg_color: Option<String>,
    plan_offset_percent: Option<[f32; 2]>,
    actual_offset_percent: Option<[f32; 2]>,
}

impl TryFrom<RawTask> for Task {
    type Error = GanttError;

    fn try_from(raw: RawTask) -> Result<Self, Self::Error> {
        let date = |field: &'static str,
                    value: &Option<String>|
         -> Result<Option<NaiveDate>, GanttError> {
            match value {
                None => Ok(None),
                Some(s) => parse_date(s).map(Some).ok_or_else(|| GanttError::InvalidDate {
                    task: raw.id.clone(),
                    field,
                    value: s.clone(),
                }),
            }
        };
        let color = |value: &Option<String>| -> Result<Option<Color>, GanttError> {
            match value {
                None => Ok(None),
                Some(s) => {
                    Color::from_hex(s).map(Some).ok_or_else(|| GanttError::InvalidColor {
                        task: raw.id.clone(),
                        value: s.clone(),
                    })
                }
            }
        };

        let plan = match (date("planStart", &raw.plan_start)?, date("planEnd", &raw.plan_end)?) {
            (Some(start), Some(end)) => Some(DateSpan::new(start, end)),
            (None, None) => None,
            _ => {
                return Err(GanttError::InvalidTask {
                    task: raw.id,
                    message: "plan interval requires both planStart and planEnd".into(),
                })
            }
        };
        let actual = match (
            date("actualStart", &raw.actual_start)?,
            date("actualEnd", &raw.actual_end)?,
        ) {
            (Some(start), end) => Some(ActualSpan::new(start, end)),
            (None, None) => None,
            (None, Some(_)) => {
                return Err(GanttError::InvalidTask {
                    task: raw.id,
                    message: "actualEnd without actualStart".into(),
                })
            }
        };

        Ok(Task {
            plan_border_color: color(&raw.plan_border_color)?,
            actual_bg_color: color(&raw.actual_bg_color)?,
            id: raw.id,
            name: raw.name,
            kind: raw.kind.unwrap_or(TaskKind::Task),
            plan,
            actual,
            dependencies: raw.dependencies,
            left_remark: raw.left_remark,
            right_remark: raw.right_remark,
            center_remark: raw.center_remark,
            plan_offset_percent: raw.plan_offset_percent,
            actual_offset_percent: raw.actual_offset_percent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn deserializes_wire_shape() {
        let data = data_from_json(
            r##"[{
                "id": "r1", "name": "规划",
                "tasks": [{
                    "id": "t1", "name": "需求分析",
                    "planStart": "2025-10-01", "planEnd": "2025-10-05",
                    "actualStart": "2025-10-02",
                    "dependencies": ["t0"],
                    "rightRemark": "进行中",
                    "actualBgColor": "#5AC989",
                    "planOffsetPercent": [0.1, 0.9]
                }]
            }]"##,
        )
        .unwrap();
        let task = &data[0].tasks[0];
        assert_eq!(task.plan, Some(DateSpan::new(d(2025, 10, 1), d(2025, 10, 5))));
        assert_eq!(task.actual, Some(ActualSpan::new(d(2025, 10, 2), None)));
        assert_eq!(task.dependencies, vec!["t0".to_string()]);
        assert_eq!(task.actual_bg_color, Some(Color::from_rgb(90, 201, 137)));
        assert_eq!(task.plan_offset_percent, Some([0.1, 0.9]));
        assert_eq!(task.kind, TaskKind::Task);
    }

    #[test]
    fn rejects_malformed_dates_at_ingestion() {
        let err = data_from_json(
            r#"[{"id":"r","name":"r","tasks":[
                {"id":"t","name":"t","planStart":"2025-13-40","planEnd":"2025-10-05"}
            ]}]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("2025-13-40"));
    }

    #[test]
    fn rejects_half_open_plan() {
        let err = data_from_json(
            r#"[{"id":"r","name":"r","tasks":[
                {"id":"t","name":"t","planStart":"2025-10-01"}
            ]}]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("planEnd"));
    }

    #[test]
    fn rejects_bad_colors() {
        let err = data_from_json(
            r#"[{"id":"r","name":"r","tasks":[
                {"id":"t","name":"t","actualBgColor":"green"}
            ]}]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("green"));
    }

    #[test]
    fn datetime_strings_floor_to_dates() {
        assert_eq!(parse_date("2025-10-01T08:30:00"), Some(d(2025, 10, 1)));
        assert_eq!(parse_date("2025-10-01 23:59:59"), Some(d(2025, 10, 1)));
        assert_eq!(parse_date("2025/10/01"), Some(d(2025, 10, 1)));
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn leave_kind_parses() {
        let data = data_from_json(
            r#"[{"id":"r","name":"r","tasks":[
                {"id":"t","name":"年假","type":"leave",
                 "actualStart":"2025-10-01","actualEnd":"2025-10-03"}
            ]}]"#,
        )
        .unwrap();
        assert_eq!(data[0].tasks[0].kind, TaskKind::Leave);
    }
}

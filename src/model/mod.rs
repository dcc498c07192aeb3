pub mod calendar;
pub mod task;

pub use task::{data_from_json, parse_date, ActualSpan, DateSpan, GanttData, Row, Task, TaskKind};

use thiserror::Error;

/// Errors surfaced by chart construction and data ingestion.
///
/// Routing-stage problems (a dependency pointing at an unknown task id, a
/// cycle between tasks) are deliberately *not* errors: partial data is common
/// while incremental loading is in flight, so the affected connector is
/// simply skipped.
#[derive(Debug, Error)]
pub enum GanttError {
    /// Rejected configuration. Raised at construction, never mid-render.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A chart is already mounted on this container.
    #[error("container {0:?} already hosts a chart")]
    ContainerOccupied(String),

    /// A date string on a task failed to parse.
    #[error("task {task:?}: unparseable date {value:?} in {field}")]
    InvalidDate {
        task: String,
        field: &'static str,
        value: String,
    },

    /// A color string on a task failed to parse.
    #[error("task {task:?}: unparseable color {value:?}")]
    InvalidColor { task: String, value: String },

    /// A task violated a structural rule (e.g. an interval end without its
    /// start).
    #[error("task {task:?}: {message}")]
    InvalidTask { task: String, message: String },
}

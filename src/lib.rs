//! ganttline — a virtualized Gantt timeline engine.
//!
//! The engine maps an open-ended calendar range onto a scrollable pixel
//! surface, redraws only what the viewport can see, routes orthogonal
//! dependency connectors between tasks, and extends the dataset on demand
//! when scrolling reaches an edge. It draws through the [`Surface`] trait
//! and has no opinion about windowing; `ui` provides the egui front end
//! used by the demo binary.

pub mod chart;
pub mod config;
pub mod error;
pub mod model;
pub mod surface;
pub mod ui;

pub use chart::loader::{EdgeProbe, LoadCallback, LoadContext, LoadEdge, LoadResult};
pub use chart::timeline::{Timeline, ViewMode};
pub use chart::viewport::Viewport;
pub use chart::{
    GanttChart, RowTarget, ScrollEvent, TooltipContent, TooltipData, TooltipTask,
};
pub use config::{GanttConfig, TooltipColor, TooltipFormat, ViewFactors};
pub use error::GanttError;
pub use model::{data_from_json, ActualSpan, DateSpan, GanttData, Row, Task, TaskKind};
pub use surface::{Color, DrawCmd, Point, Recorder, Rect, Surface, TextAlign};

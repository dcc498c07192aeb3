pub mod chart_view;
pub mod egui_surface;

pub use chart_view::{show, ChartResponse};
pub use egui_surface::EguiSurface;

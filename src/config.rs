use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use chrono::NaiveDate;

use crate::chart::loader::LoadEdge;
use crate::chart::timeline::ViewMode;
use crate::error::GanttError;
use crate::model::Row;
use crate::surface::Color;

/// Custom tooltip content: receives the hovered row, the hovered date and the
/// active config; returning `None` suppresses the tooltip for that position.
pub type TooltipFormat = Rc<dyn Fn(&Row, NaiveDate, &GanttConfig) -> Option<String>>;

/// Pixel-per-day density for each view mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFactors {
    pub day: f32,
    pub week: f32,
    pub month: f32,
    pub year: f32,
}

impl Default for ViewFactors {
    fn default() -> Self {
        Self {
            day: 80.0,
            week: 20.0,
            month: 15.0,
            year: 6.0,
        }
    }
}

impl ViewFactors {
    pub fn get(&self, mode: ViewMode) -> f32 {
        match mode {
            ViewMode::Day => self.day,
            ViewMode::Week => self.week,
            ViewMode::Month => self.month,
            ViewMode::Year => self.year,
        }
    }
}

/// Tooltip color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TooltipColor {
    #[default]
    Black,
    White,
}

/// Chart configuration. Defaults mirror the stock chart appearance; override
/// the fields you need and pass it to [`GanttChart::new`].
///
/// [`GanttChart::new`]: crate::chart::GanttChart::new
#[derive(Clone)]
pub struct GanttConfig {
    pub view_mode: ViewMode,
    pub row_height: f32,
    pub header_height: f32,
    pub show_plan: bool,
    pub show_actual: bool,
    pub show_row_lines: bool,
    pub show_col_lines: bool,
    pub show_left_remark: bool,
    pub show_right_remark: bool,
    pub show_center_remark: bool,
    pub show_tooltip: bool,
    pub tooltip_color: TooltipColor,
    pub today_color: Color,
    pub plan_border_color: Color,
    pub actual_bg_color: Color,
    pub header_bg_color: Color,
    /// Pixel offsets applied to tooltip placement, for hosts embedding the
    /// chart inside a transformed layout.
    pub offset_top: f32,
    pub offset_left: f32,
    pub view_factors: ViewFactors,
    pub tooltip_format: Option<TooltipFormat>,
    /// Which scroll edges trigger incremental loading.
    pub load_edges: Vec<LoadEdge>,
    /// Quiet period after the last scroll before edge proximity is checked.
    pub load_debounce: Duration,
}

impl Default for GanttConfig {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Month,
            row_height: 48.0,
            header_height: 56.0,
            show_plan: true,
            show_actual: true,
            show_row_lines: true,
            show_col_lines: true,
            show_left_remark: false,
            show_right_remark: false,
            show_center_remark: false,
            show_tooltip: true,
            tooltip_color: TooltipColor::Black,
            today_color: Color::from_rgb(0xff, 0x4d, 0x4f),
            plan_border_color: Color::from_rgb(0xc1, 0xef, 0xcf),
            actual_bg_color: Color::from_rgb(0x5a, 0xc9, 0x89),
            header_bg_color: Color::from_rgb(0xf9, 0xf9, 0xf9),
            offset_top: 0.0,
            offset_left: 0.0,
            view_factors: ViewFactors::default(),
            tooltip_format: None,
            load_edges: Vec::new(),
            load_debounce: Duration::from_millis(150),
        }
    }
}

impl fmt::Debug for GanttConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GanttConfig")
            .field("view_mode", &self.view_mode)
            .field("row_height", &self.row_height)
            .field("header_height", &self.header_height)
            .field("view_factors", &self.view_factors)
            .field("load_edges", &self.load_edges)
            .field("tooltip_format", &self.tooltip_format.as_ref().map(|_| "<fn>"))
            .finish_non_exhaustive()
    }
}

impl GanttConfig {
    /// The density of the active view mode.
    pub fn pixels_per_day(&self) -> f32 {
        self.view_factors.get(self.view_mode)
    }

    /// Fail fast on configuration that would only blow up mid-render.
    pub fn validate(&self) -> Result<(), GanttError> {
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(GanttError::Config(format!(
                "rowHeight must be positive, got {}",
                self.row_height
            )));
        }
        if !(self.header_height.is_finite() && self.header_height >= 0.0) {
            return Err(GanttError::Config(format!(
                "headerHeight must be non-negative, got {}",
                self.header_height
            )));
        }
        for mode in ViewMode::ALL {
            let factor = self.view_factors.get(mode);
            if !(factor.is_finite() && factor > 0.0) {
                return Err(GanttError::Config(format!(
                    "viewFactors.{}: density must be positive, got {factor}",
                    mode.label()
                )));
            }
        }
        Ok(())
    }
}

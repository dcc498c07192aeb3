//! The chart engine: data in, draw commands out.
//!
//! [`GanttChart`] owns the dataset and the derived state (task index,
//! timeline, viewport, position cache) and keeps the full-render pipeline
//! strictly ordered: index rebuild → timeline recompute → dimension update →
//! geometry recompute → draw. Scroll-only passes reuse the cached geometry.

pub mod arrows;
pub mod bars;
pub mod grid;
pub mod header;
pub mod layout;
pub mod loader;
pub mod timeline;
pub mod viewport;

use std::collections::HashSet;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{info, trace};

use crate::config::GanttConfig;
use crate::error::GanttError;
use crate::model::{ActualSpan, DateSpan, GanttData, TaskKind};
use crate::surface::{Color, Point, Surface};

use layout::{PositionCache, TaskIndex};
use loader::{EdgeProbe, IncrementalLoader, LoadCallback, LoadEdge};
use timeline::{Timeline, ViewMode};
use viewport::Viewport;

/// Containers that currently host a chart. A second chart on the same
/// container is a host bug and fails construction immediately.
static MOUNTED: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Pixels of lead-in kept left of the target when scrolling to a date.
const SCROLL_TO_DATE_MARGIN: f32 = 80.0;

/// Emitted to the host every time the viewport scrolls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    pub scroll_x: f32,
    pub scroll_y: f32,
}

pub type ScrollHandler = Box<dyn FnMut(ScrollEvent)>;

/// Vertical scroll target.
#[derive(Debug, Clone, Copy)]
pub enum RowTarget<'a> {
    Id(&'a str),
    Index(usize),
}

/// One task line of the default tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipTask {
    pub id: String,
    pub name: String,
    pub kind: TaskKind,
    pub plan: Option<DateSpan>,
    pub actual: Option<ActualSpan>,
    /// Swatch color, per-task override resolved against the config.
    pub color: Color,
}

/// What the tooltip should show at a hover position.
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipContent {
    /// Markup produced by the configured `tooltip_format`.
    Custom(String),
    /// The row's tasks overlapping the hovered date.
    Tasks(Vec<TooltipTask>),
}

/// Structured hover data; rendering it is the host's job.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipData {
    pub row_index: usize,
    pub row_id: String,
    pub row_name: String,
    pub date: NaiveDate,
    pub content: TooltipContent,
}

/// The Gantt timeline engine.
pub struct GanttChart {
    container: String,
    data: GanttData,
    config: GanttConfig,
    today: NaiveDate,
    index: TaskIndex,
    timeline: Timeline,
    viewport: Viewport,
    positions: PositionCache,
    loader: IncrementalLoader,
    geometry_dirty: bool,
    pending_scroll: Option<(f32, f32)>,
    on_scroll: Option<ScrollHandler>,
}

impl GanttChart {
    /// Mount a chart on `container` with an initial dataset.
    ///
    /// Fails fast on invalid configuration and on a container that already
    /// hosts a chart; the claim is released when the chart is dropped.
    pub fn new(
        container: impl Into<String>,
        data: GanttData,
        config: GanttConfig,
    ) -> Result<Self, GanttError> {
        config.validate()?;
        let container = container.into();
        if !MOUNTED.lock().insert(container.clone()) {
            return Err(GanttError::ContainerOccupied(container));
        }

        let today = chrono::Local::now().date_naive();
        let index = TaskIndex::build(&data);
        let timeline = Timeline::compute(&data, config.view_mode, config.pixels_per_day(), today);
        let mut viewport = Viewport::new(&timeline);
        viewport.update_dimensions(&timeline, data.len(), config.row_height);
        let positions = PositionCache::compute(&data, &timeline, &config, today);
        let loader = IncrementalLoader::new(config.load_edges.clone(), config.load_debounce);

        Ok(Self {
            container,
            data,
            config,
            today,
            index,
            timeline,
            viewport,
            positions,
            loader,
            geometry_dirty: false,
            pending_scroll: None,
            on_scroll: None,
        })
    }

    /// Pin "today" to a specific date (status-date rendering, tests) and
    /// rebuild the derived state.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
        self.refresh();
    }

    // --- data & config ---

    /// Replace the dataset wholesale.
    pub fn set_data(&mut self, data: GanttData) {
        self.data = data;
        self.refresh();
    }

    /// Replace the dataset and merge a configuration update in one pass.
    pub fn set_data_with(
        &mut self,
        data: GanttData,
        update: impl FnOnce(&mut GanttConfig),
    ) -> Result<(), GanttError> {
        self.data = data;
        self.update_config(update)
    }

    /// Merge a configuration update. A view-mode change resets the
    /// horizontal scroll and recomputes the bounds.
    pub fn update_config(
        &mut self,
        update: impl FnOnce(&mut GanttConfig),
    ) -> Result<(), GanttError> {
        let mut next = self.config.clone();
        update(&mut next);
        next.validate()?;
        let mode_changed = next.view_mode != self.config.view_mode;
        self.config = next;
        self.loader
            .set_edges(self.config.load_edges.clone(), self.config.load_debounce);
        if mode_changed {
            self.viewport.set_scroll(0.0, self.viewport.scroll_y);
            self.pending_scroll = Some((0.0, self.viewport.scroll_y));
        }
        self.refresh();
        Ok(())
    }

    /// Switch the axis granularity; resets horizontal scroll to zero.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.config.view_mode == mode {
            return;
        }
        self.config.view_mode = mode;
        self.viewport.set_scroll(0.0, self.viewport.scroll_y);
        self.pending_scroll = Some((0.0, self.viewport.scroll_y));
        self.refresh();
    }

    // --- host signals ---

    /// The host viewport changed size. Triggers a full render.
    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        self.viewport.set_size(width, height, device_pixel_ratio);
        self.viewport.update_visible_range(&self.timeline);
        self.geometry_dirty = true;
    }

    /// The host viewport scrolled. Lightweight: geometry is reused; only
    /// the visible window moves. Emits the scroll event and arms the
    /// incremental loader's edge check.
    pub fn set_scroll(&mut self, x: f32, y: f32) {
        let before = (self.viewport.scroll_x, self.viewport.scroll_y);
        self.viewport.set_scroll(x, y);
        self.viewport.update_visible_range(&self.timeline);
        let after = (self.viewport.scroll_x, self.viewport.scroll_y);
        if after != before {
            let event = ScrollEvent {
                scroll_x: after.0,
                scroll_y: after.1,
            };
            if let Some(handler) = self.on_scroll.as_mut() {
                handler(event);
            }
            self.loader.on_scroll(after.0, after.1);
        }
    }

    pub fn set_on_scroll(&mut self, handler: ScrollHandler) {
        self.on_scroll = Some(handler);
    }

    /// Scroll horizontally so `date` sits near the left edge.
    pub fn scroll_to_date(&mut self, date: NaiveDate) {
        let x = (self.timeline.date_to_x(date) - SCROLL_TO_DATE_MARGIN).max(0.0);
        self.set_scroll(x, self.viewport.scroll_y);
        self.pending_scroll = Some((self.viewport.scroll_x, self.viewport.scroll_y));
    }

    /// Scroll vertically to a row, by id or index. Unknown targets are
    /// ignored.
    pub fn scroll_to_row(&mut self, target: RowTarget<'_>) {
        let row_index = match target {
            RowTarget::Index(i) => Some(i),
            RowTarget::Id(id) => self.data.iter().position(|row| row.id == id),
        };
        let Some(row_index) = row_index.filter(|i| *i < self.data.len()) else {
            return;
        };
        let y = row_index as f32 * self.config.row_height;
        self.set_scroll(self.viewport.scroll_x, y);
        self.pending_scroll = Some((self.viewport.scroll_x, self.viewport.scroll_y));
    }

    /// A scroll offset the host should apply to its scroll container, set
    /// by programmatic scrolls and merges. Consumed on read.
    pub fn take_scroll_request(&mut self) -> Option<(f32, f32)> {
        self.pending_scroll.take()
    }

    // --- incremental loading ---

    /// Register the external fetch collaborator.
    pub fn set_load_callback(&mut self, callback: LoadCallback) {
        self.loader.set_callback(callback);
    }

    /// Re-enable exhausted edges and clear pending debounce state.
    pub fn reset_loading(&mut self) {
        self.loader.reset();
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_in_flight()
    }

    pub fn has_more_data(&self, edge: LoadEdge) -> bool {
        self.loader.has_more(edge)
    }

    /// Advance the loader; returns true when new data was merged (the host
    /// should repaint).
    pub fn poll(&mut self) -> bool {
        let probe = EdgeProbe {
            scroll_x: self.viewport.scroll_x,
            scroll_y: self.viewport.scroll_y,
            viewport_width: self.viewport.width,
            viewport_height: self.viewport.height,
            total_width: self.viewport.total_width,
            total_height: self.viewport.total_height,
            min_date: self.timeline.min_date,
            max_date: self.timeline.max_date,
            row_count: self.data.len(),
        };
        match self.loader.poll(probe) {
            Some((edge, data)) => {
                self.merge(edge, data);
                true
            }
            None => false,
        }
    }

    /// Merge loader results without discarding the existing layout: left
    /// prepends tasks into matching rows, right appends, bottom appends
    /// whole rows. Rows with unknown ids become new rows.
    fn merge(&mut self, edge: LoadEdge, new_data: GanttData) {
        info!(?edge, rows = new_data.len(), "merging incremental data");
        let old_start = self.timeline.start;
        match edge {
            LoadEdge::Bottom => self.data.extend(new_data),
            LoadEdge::Left | LoadEdge::Right => {
                for row in new_data {
                    match self.data.iter_mut().find(|r| r.id == row.id) {
                        Some(existing) if edge == LoadEdge::Left => {
                            existing.tasks.splice(0..0, row.tasks);
                        }
                        Some(existing) => existing.tasks.extend(row.tasks),
                        None => self.data.push(row),
                    }
                }
            }
        }
        self.refresh();
        if edge == LoadEdge::Left {
            // the axis grew to the left; shift the scroll so the viewport
            // keeps showing the same dates
            let shift = self.timeline.date_to_x(old_start);
            if shift > 0.0 {
                self.viewport
                    .set_scroll(self.viewport.scroll_x + shift, self.viewport.scroll_y);
                self.viewport.update_visible_range(&self.timeline);
                self.pending_scroll = Some((self.viewport.scroll_x, self.viewport.scroll_y));
            }
        }
    }

    // --- rendering ---

    /// Rebuild all derived state, in pipeline order.
    fn refresh(&mut self) {
        self.index = TaskIndex::build(&self.data);
        self.timeline = Timeline::compute(
            &self.data,
            self.config.view_mode,
            self.config.pixels_per_day(),
            self.today,
        );
        self.viewport
            .update_dimensions(&self.timeline, self.data.len(), self.config.row_height);
        self.viewport.update_visible_range(&self.timeline);
        self.positions = PositionCache::compute(&self.data, &self.timeline, &self.config, self.today);
        self.geometry_dirty = false;
        trace!(
            tasks = self.positions.len(),
            start = %self.timeline.start,
            end = %self.timeline.end,
            "pipeline refreshed"
        );
    }

    /// Draw the chart: header ruler, then grid, today marker, dependency
    /// arrows and task bars, in that order, so the grid sits under
    /// everything and bars occlude arrow endpoints.
    pub fn draw(&mut self, header_surface: &mut dyn Surface, main_surface: &mut dyn Surface) {
        if self.geometry_dirty {
            self.refresh();
        }
        header::draw_header(header_surface, &self.timeline, &self.viewport, &self.config);
        grid::draw_grid(
            main_surface,
            &self.timeline,
            &self.viewport,
            &self.config,
            self.data.len(),
        );
        grid::draw_today(
            main_surface,
            &self.timeline,
            &self.viewport,
            &self.config,
            self.today,
        );
        arrows::draw_dependencies(
            main_surface,
            &self.data,
            &self.index,
            &self.positions,
            &self.viewport,
            self.config.row_height,
        );
        bars::draw_tasks(
            main_surface,
            &self.data,
            &self.positions,
            &self.viewport,
            &self.config,
        );
        trace!("frame drawn");
    }

    // --- hover ---

    /// Structured tooltip data for a pointer position in content-local
    /// coordinates, or `None` when there is nothing to show.
    pub fn tooltip_at(&self, pointer: Point) -> Option<TooltipData> {
        if !self.config.show_tooltip {
            return None;
        }
        let chart_x = pointer.x + self.viewport.scroll_x;
        let chart_y = pointer.y + self.viewport.scroll_y;
        if chart_y < 0.0 {
            return None;
        }
        let row_index = (chart_y / self.config.row_height) as usize;
        let row = self.data.get(row_index)?;
        let date = self.timeline.x_to_date(chart_x);

        let content = match &self.config.tooltip_format {
            Some(format) => TooltipContent::Custom(format(row, date, &self.config)?),
            None => {
                let tasks = layout::tasks_at(row, date, self.today);
                if tasks.is_empty() {
                    return None;
                }
                TooltipContent::Tasks(
                    tasks
                        .into_iter()
                        .map(|task| TooltipTask {
                            id: task.id.clone(),
                            name: task.name.clone(),
                            kind: task.kind,
                            plan: task.plan,
                            actual: task.actual,
                            color: task.actual_bg_color.unwrap_or(self.config.actual_bg_color),
                        })
                        .collect(),
                )
            }
        };

        Some(TooltipData {
            row_index,
            row_id: row.id.clone(),
            row_name: row.name.clone(),
            date,
            content,
        })
    }

    // --- accessors ---

    pub fn data(&self) -> &GanttData {
        &self.data
    }

    pub fn config(&self) -> &GanttConfig {
        &self.config
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn positions(&self) -> &PositionCache {
        &self.positions
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn container(&self) -> &str {
        &self.container
    }
}

impl Drop for GanttChart {
    fn drop(&mut self) {
        MOUNTED.lock().remove(&self.container);
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

    fn sample_data() -> GanttData {
        vec![
            Row::new(
                "r1",
                "Planning",
                vec![Task::new("t1", "Kickoff").with_plan(d(2025, 6, 2), d(2025, 6, 6))],
            ),
            Row::new(
                "r2",
                "Build",
                vec![Task::new("t2", "Backend")
                    .with_plan(d(2025, 6, 9), d(2025, 6, 20))
                    .with_dependencies(["t1"])],
            ),
            Row::new(
                "r3",
                "Verify",
                vec![Task::new("t3", "QA")
                    .with_plan(d(2025, 6, 18), d(2025, 6, 24))
                    .with_dependencies(["t2"])],
            ),
        ]
    }

    fn chart(container: &str) -> GanttChart {
        let mut chart = GanttChart::new(container, sample_data(), GanttConfig::default()).unwrap();
        chart.set_today(d(2025, 6, 10));
        chart.resize(800.0, 400.0, 1.0);
        chart
    }

    #[test]
    fn double_mount_fails_and_drop_releases() {
        let first = GanttChart::new("mod-dup", sample_data(), GanttConfig::default()).unwrap();
        let second = GanttChart::new("mod-dup", sample_data(), GanttConfig::default());
        assert!(matches!(second, Err(GanttError::ContainerOccupied(_))));
        drop(first);
        assert!(GanttChart::new("mod-dup", sample_data(), GanttConfig::default()).is_ok());
    }

    #[test]
    fn invalid_config_fails_construction() {
        let config = GanttConfig {
            row_height: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            GanttChart::new("mod-badcfg", Vec::new(), config),
            Err(GanttError::Config(_))
        ));
    }

    #[test]
    fn view_mode_switch_resets_scroll_and_density() {
        let mut chart = chart("mod-mode");
        chart.set_scroll(500.0, 0.0);
        assert_eq!(chart.viewport().scroll_x, 500.0);

        chart.set_view_mode(ViewMode::Day);
        assert_eq!(chart.viewport().scroll_x, 0.0);
        assert_eq!(chart.timeline().pixels_per_day, 80.0);
        assert_eq!(chart.take_scroll_request(), Some((0.0, 0.0)));
    }

    #[test]
    fn update_config_rejects_bad_factors_without_applying() {
        let mut chart = chart("mod-cfg");
        let result = chart.update_config(|c| c.view_factors.day = -1.0);
        assert!(matches!(result, Err(GanttError::Config(_))));
        assert_eq!(chart.config().view_factors.day, 80.0);
    }

    #[test]
    fn scroll_events_fire_on_change_only() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut chart = chart("mod-scroll");
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        chart.set_on_scroll(Box::new(move |_| {
            seen.set(seen.get() + 1);
        }));
        chart.set_scroll(100.0, 0.0);
        chart.set_scroll(100.0, 0.0); // no movement, no event
        chart.set_scroll(120.0, 0.0);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn scroll_to_row_by_id_and_index() {
        let mut chart = chart("mod-row");
        chart.resize(800.0, 60.0, 1.0); // 3 rows of 48px, 60px window
        chart.scroll_to_row(RowTarget::Id("r2"));
        assert_eq!(chart.viewport().scroll_y, 48.0);
        chart.scroll_to_row(RowTarget::Index(0));
        assert_eq!(chart.viewport().scroll_y, 0.0);
        // unknown targets are ignored
        chart.scroll_to_row(RowTarget::Id("nope"));
        assert_eq!(chart.viewport().scroll_y, 0.0);
    }

    #[test]
    fn scroll_to_date_keeps_a_margin() {
        let mut chart = chart("mod-date");
        chart.set_view_mode(ViewMode::Day);
        chart.scroll_to_date(d(2025, 6, 9));
        let x = chart.timeline().date_to_x(d(2025, 6, 9));
        assert_eq!(chart.viewport().scroll_x, x - 80.0);
    }

    #[test]
    fn tooltip_reports_overlapping_tasks() {
        let mut chart = chart("mod-tip");
        chart.set_view_mode(ViewMode::Day);
        // point inside t1's plan interval, row 0
        let x = chart.timeline().date_to_x(d(2025, 6, 3)) - chart.viewport().scroll_x;
        let tip = chart.tooltip_at(Point::new(x + 1.0, 10.0)).unwrap();
        assert_eq!(tip.row_id, "r1");
        assert_eq!(tip.date, d(2025, 6, 3));
        match tip.content {
            TooltipContent::Tasks(tasks) => {
                assert_eq!(tasks.len(), 1);
                assert_eq!(tasks[0].id, "t1");
            }
            other => panic!("expected task content, got {other:?}"),
        }
        // empty stretch yields nothing
        let x = chart.timeline().date_to_x(d(2025, 6, 25)) - chart.viewport().scroll_x;
        assert!(chart.tooltip_at(Point::new(x, 10.0)).is_none());
    }

    #[test]
    fn custom_tooltip_format_overrides_and_suppresses() {
        let mut chart = chart("mod-tipfmt");
        chart
            .update_config(|c| {
                c.tooltip_format = Some(std::rc::Rc::new(|row: &Row, date, _cfg: &GanttConfig| {
                    if row.id == "r1" {
                        Some(format!("{} @ {date}", row.name))
                    } else {
                        None
                    }
                }));
            })
            .unwrap();
        chart.set_view_mode(ViewMode::Day);
        let tip = chart.tooltip_at(Point::new(5.0, 10.0)).unwrap();
        assert!(matches!(tip.content, TooltipContent::Custom(ref s) if s.starts_with("Planning")));
        // second row: the format fn suppresses
        assert!(chart.tooltip_at(Point::new(5.0, 60.0)).is_none());
    }

    #[test]
    fn show_tooltip_false_disables_hover() {
        let mut chart = chart("mod-tipoff");
        chart.update_config(|c| c.show_tooltip = false).unwrap();
        assert!(chart.tooltip_at(Point::new(5.0, 10.0)).is_none());
    }
}

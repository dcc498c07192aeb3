use std::ops::Range;

use chrono::NaiveDate;

use crate::chart::timeline::Timeline;

/// Pixels of just-offscreen content kept in the visible date window so fast
/// scrolling doesn't pop labels and bars in at the edge.
const DATE_BUFFER_PX: f32 = 200.0;

/// Tracks where the host viewport sits over the scrollable chart.
///
/// `width`/`height` are the content area below the header; `total_width`/
/// `total_height` the full scrollable extent. All scroll offsets are clamped
/// into that extent.
#[derive(Debug, Clone)]
pub struct Viewport {
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
    pub total_width: f32,
    pub total_height: f32,
    pub visible_start: NaiveDate,
    pub visible_end: NaiveDate,
}

impl Viewport {
    pub fn new(timeline: &Timeline) -> Self {
        let mut viewport = Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: 0.0,
            height: 0.0,
            device_pixel_ratio: 1.0,
            total_width: 0.0,
            total_height: 0.0,
            visible_start: timeline.start,
            visible_end: timeline.end,
        };
        viewport.update_visible_range(timeline);
        viewport
    }

    pub fn set_size(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.device_pixel_ratio = device_pixel_ratio;
        self.clamp_scroll();
    }

    pub fn set_scroll(&mut self, x: f32, y: f32) {
        self.scroll_x = x;
        self.scroll_y = y;
        self.clamp_scroll();
    }

    /// Recompute the scrollable extent after a timeline or data change.
    pub fn update_dimensions(&mut self, timeline: &Timeline, row_count: usize, row_height: f32) {
        self.total_width = timeline.total_width();
        self.total_height = row_count as f32 * row_height;
        self.clamp_scroll();
    }

    /// Derive the visible date window, padded by the pre-render buffer.
    pub fn update_visible_range(&mut self, timeline: &Timeline) {
        self.visible_start = timeline.x_to_date(self.scroll_x - DATE_BUFFER_PX);
        self.visible_end = timeline.x_to_date(self.scroll_x + self.width + DATE_BUFFER_PX);
    }

    /// Indices of the rows intersecting the vertical visible range.
    pub fn visible_rows(&self, row_height: f32, row_count: usize) -> Range<usize> {
        if row_height <= 0.0 || row_count == 0 || self.height <= 0.0 {
            return 0..0;
        }
        let first = (self.scroll_y / row_height).floor().max(0.0) as usize;
        let last = ((self.scroll_y + self.height) / row_height).ceil() as usize;
        first.min(row_count)..last.min(row_count)
    }

    /// The horizontal pixel window tasks are culled against.
    pub fn x_window(&self) -> (f32, f32) {
        (self.scroll_x, self.scroll_x + self.width)
    }

    fn clamp_scroll(&mut self) {
        self.scroll_x = self
            .scroll_x
            .min((self.total_width - self.width).max(0.0))
            .max(0.0);
        self.scroll_y = self
            .scroll_y
            .min((self.total_height - self.height).max(0.0))
            .max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::timeline::ViewMode;
    use crate::model::{Row, Task};
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn timeline() -> Timeline {
        let data = vec![Row::new(
            "a",
            "A",
            vec![Task::new("t", "t").with_plan(d(2025, 1, 1), d(2025, 12, 31))],
        )];
        Timeline::compute(&data, ViewMode::Day, 80.0, d(2025, 6, 1))
    }

    #[test]
    fn scroll_clamps_to_extent() {
        let tl = timeline();
        let mut vp = Viewport::new(&tl);
        vp.set_size(800.0, 400.0, 1.0);
        vp.update_dimensions(&tl, 10, 48.0);
        vp.set_scroll(1e9, 1e9);
        assert_eq!(vp.scroll_x, vp.total_width - 800.0);
        assert_eq!(vp.scroll_y, 10.0 * 48.0 - 400.0);
        vp.set_scroll(-50.0, -50.0);
        assert_eq!((vp.scroll_x, vp.scroll_y), (0.0, 0.0));
    }

    #[test]
    fn visible_window_includes_buffer() {
        let tl = timeline();
        let mut vp = Viewport::new(&tl);
        vp.set_size(800.0, 400.0, 1.0);
        vp.update_dimensions(&tl, 10, 48.0);
        vp.set_scroll(1600.0, 0.0);
        vp.update_visible_range(&tl);
        // 200px buffer at 80 px/day = 2.5 days each side
        assert_eq!(vp.visible_start, tl.x_to_date(1600.0 - 200.0));
        assert_eq!(vp.visible_end, tl.x_to_date(1600.0 + 800.0 + 200.0));
        assert!(vp.visible_start < tl.x_to_date(1600.0));
    }

    #[test]
    fn visible_rows_cover_partial_rows() {
        let tl = timeline();
        let mut vp = Viewport::new(&tl);
        vp.set_size(800.0, 100.0, 1.0);
        vp.update_dimensions(&tl, 50, 48.0);
        vp.set_scroll(0.0, 30.0);
        // 30..130 px touches rows 0, 1 and 2
        assert_eq!(vp.visible_rows(48.0, 50), 0..3);
        vp.set_scroll(0.0, 96.0);
        assert_eq!(vp.visible_rows(48.0, 50), 2..5);
    }

    #[test]
    fn empty_dataset_has_no_visible_rows() {
        let tl = timeline();
        let mut vp = Viewport::new(&tl);
        vp.set_size(800.0, 400.0, 1.0);
        assert_eq!(vp.visible_rows(48.0, 0), 0..0);
    }
}

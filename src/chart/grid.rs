use chrono::NaiveDate;

use crate::chart::timeline::Timeline;
use crate::chart::viewport::Viewport;
use crate::config::GanttConfig;
use crate::surface::{Color, Point, Surface};

const GRID_COLOR: Color = Color::from_rgb(0xe6, 0xe6, 0xe6);

/// Draw the background grid: horizontal lines at row boundaries, vertical
/// lines at the same period boundaries the header labels, both clipped to
/// the visible viewport.
pub fn draw_grid(
    surface: &mut dyn Surface,
    timeline: &Timeline,
    viewport: &Viewport,
    config: &GanttConfig,
    row_count: usize,
) {
    if config.show_row_lines {
        for i in 0..=row_count {
            let y = i as f32 * config.row_height - viewport.scroll_y;
            if y < 0.0 || y > viewport.height {
                continue;
            }
            surface.line(
                Point::new(0.0, y),
                Point::new(viewport.width, y),
                1.0,
                GRID_COLOR,
            );
        }
    }

    if config.show_col_lines {
        for date in timeline.visible_periods(
            viewport.visible_start,
            viewport.visible_end,
            viewport.scroll_x,
        ) {
            let x = timeline.date_to_x(date) - viewport.scroll_x;
            surface.line(
                Point::new(x, 0.0),
                Point::new(x, viewport.height),
                1.0,
                GRID_COLOR,
            );
        }
    }
}

/// Draw the "today" marker when it falls inside the visible window.
pub fn draw_today(
    surface: &mut dyn Surface,
    timeline: &Timeline,
    viewport: &Viewport,
    config: &GanttConfig,
    today: NaiveDate,
) {
    let x = timeline.date_to_x(today);
    if x < viewport.scroll_x || x > viewport.scroll_x + viewport.width {
        return;
    }
    let screen_x = x - viewport.scroll_x;
    surface.line(
        Point::new(screen_x, 0.0),
        Point::new(screen_x, viewport.height),
        1.0,
        config.today_color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::timeline::ViewMode;
    use crate::model::{Row, Task};
    use crate::surface::{DrawCmd, Recorder};
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn setup() -> (Timeline, Viewport, GanttConfig) {
        let data = vec![Row::new(
            "a",
            "A",
            vec![Task::new("t", "t").with_plan(d(2025, 6, 1), d(2025, 6, 30))],
        )];
        let config = GanttConfig {
            view_mode: ViewMode::Day,
            ..Default::default()
        };
        let timeline = Timeline::compute(&data, ViewMode::Day, 80.0, d(2025, 6, 10));
        let mut viewport = Viewport::new(&timeline);
        viewport.set_size(800.0, 300.0, 1.0);
        viewport.update_dimensions(&timeline, 20, config.row_height);
        viewport.update_visible_range(&timeline);
        (timeline, viewport, config)
    }

    fn lines(rec: &Recorder) -> Vec<(Point, Point)> {
        rec.commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Polyline { points, .. } if points.len() == 2 => {
                    Some((points[0], points[1]))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn row_lines_are_clipped_to_the_viewport() {
        let (timeline, mut viewport, config) = setup();
        viewport.set_scroll(0.0, 100.0);
        let mut rec = Recorder::new();
        draw_grid(&mut rec, &timeline, &viewport, &config, 20);
        let horizontals: Vec<_> = lines(&rec)
            .into_iter()
            .filter(|(a, b)| a.y == b.y)
            .collect();
        // 300px window over 48px rows: boundaries at 44, 92, ..., 284
        assert_eq!(horizontals.len(), 6);
        assert!(horizontals.iter().all(|(a, _)| (0.0..=300.0).contains(&a.y)));
    }

    #[test]
    fn toggles_suppress_lines() {
        let (timeline, viewport, config) = setup();
        let off = GanttConfig {
            show_row_lines: false,
            show_col_lines: false,
            ..config
        };
        let mut rec = Recorder::new();
        draw_grid(&mut rec, &timeline, &viewport, &off, 20);
        assert!(rec.commands.is_empty());
    }

    #[test]
    fn today_marker_draws_only_when_visible() {
        let (timeline, mut viewport, config) = setup();
        let mut rec = Recorder::new();
        draw_today(&mut rec, &timeline, &viewport, &config, d(2025, 6, 10));
        assert_eq!(rec.commands.len(), 1);

        // scroll far to the right; the marker leaves the window
        viewport.set_scroll(timeline.date_to_x(d(2025, 6, 10)) + 900.0, 0.0);
        let mut rec = Recorder::new();
        draw_today(&mut rec, &timeline, &viewport, &config, d(2025, 6, 10));
        assert!(rec.commands.is_empty());
    }
}

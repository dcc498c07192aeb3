use crate::chart::layout::{PositionCache, TaskPosition};
use crate::chart::viewport::Viewport;
use crate::config::GanttConfig;
use crate::model::{GanttData, Task};
use crate::surface::{Color, Point, Rect, Surface, TextAlign};

const REMARK_COLOR: Color = Color::BLACK;
const REMARK_FONT_SIZE: f32 = 12.0;
/// Vertical breathing room between the row box and the bar glyphs.
const BAR_OFFSET: f32 = 4.0;
const PLAN_STROKE_WIDTH: f32 = 4.0;

/// Draw the task bars and remarks for every visible task.
///
/// Virtualization happens here: only rows intersecting the vertical window
/// and tasks whose plan-or-actual span touches the horizontal window reach
/// the surface. Geometry comes straight from the cache and is not modified.
pub fn draw_tasks(
    surface: &mut dyn Surface,
    data: &GanttData,
    cache: &PositionCache,
    viewport: &Viewport,
    config: &GanttConfig,
) {
    let rows = viewport.visible_rows(config.row_height, data.len());
    let (x0, x1) = viewport.x_window();
    for row_index in rows {
        let row_y = row_index as f32 * config.row_height - viewport.scroll_y;
        for task in &data[row_index].tasks {
            let Some(pos) = cache.get(&task.id) else {
                continue;
            };
            if !pos.intersects_x(x0, x1) {
                continue;
            }
            draw_task(surface, task, pos, row_y, viewport.scroll_x, config);
        }
    }
}

fn draw_task(
    surface: &mut dyn Surface,
    task: &Task,
    pos: &TaskPosition,
    row_y: f32,
    scroll_x: f32,
    config: &GanttConfig,
) {
    let bar_y = row_y + config.row_height * 0.15 + BAR_OFFSET;
    let bar_height = config.row_height * 0.7 - BAR_OFFSET;
    let text_y = row_y + config.row_height / 2.0 + BAR_OFFSET;

    if config.show_actual {
        if let Some(actual) = pos.actual {
            let color = task.actual_bg_color.unwrap_or(config.actual_bg_color);
            surface.fill_rect(
                Rect::new(
                    (actual.start - scroll_x).round(),
                    (bar_y + 2.0).round(),
                    actual.width().round(),
                    (bar_height - 2.0).round(),
                ),
                color,
            );
        }
    }

    if config.show_plan {
        if let Some(plan) = pos.plan {
            // the plan renders as a thick rule along the cell's top edge,
            // inset so adjacent tasks stay distinguishable
            let color = task.plan_border_color.unwrap_or(config.plan_border_color);
            surface.line(
                Point::new(plan.start + 2.0 - scroll_x, bar_y),
                Point::new(plan.end - 2.0 - scroll_x, bar_y),
                PLAN_STROKE_WIDTH,
                color,
            );
        }
    }

    if config.show_left_remark {
        if let (Some(remark), Some(left)) = (&task.left_remark, pos.left_edge()) {
            surface.text(
                Point::new((left - 8.0 - scroll_x).round(), text_y.round()),
                TextAlign::Right,
                remark,
                REMARK_FONT_SIZE,
                REMARK_COLOR,
            );
        }
    }
    if config.show_right_remark {
        if let (Some(remark), Some(right)) = (&task.right_remark, pos.right_edge()) {
            surface.text(
                Point::new((right + 8.0 - scroll_x).round(), text_y.round()),
                TextAlign::Left,
                remark,
                REMARK_FONT_SIZE,
                REMARK_COLOR,
            );
        }
    }
    if config.show_center_remark {
        if let (Some(remark), Some(actual)) = (&task.center_remark, pos.actual) {
            let center_x = actual.start + actual.width() / 2.0;
            surface.text(
                Point::new((center_x - scroll_x).round(), text_y.round()),
                TextAlign::Center,
                remark,
                REMARK_FONT_SIZE,
                REMARK_COLOR,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::layout::PositionCache;
    use crate::chart::timeline::{Timeline, ViewMode};
    use crate::model::{Row, Task};
    use crate::surface::{DrawCmd, Recorder};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn setup(data: &GanttData, config: &GanttConfig) -> (Timeline, PositionCache, Viewport) {
        let today = d(2025, 6, 10);
        let timeline = Timeline::compute(data, config.view_mode, config.pixels_per_day(), today);
        let cache = PositionCache::compute(data, &timeline, config, today);
        let mut viewport = Viewport::new(&timeline);
        viewport.set_size(1000.0, 500.0, 1.0);
        viewport.update_dimensions(&timeline, data.len(), config.row_height);
        viewport.update_visible_range(&timeline);
        (timeline, cache, viewport)
    }

    #[test]
    fn draws_actual_fill_and_plan_rule() {
        let mut task = Task::new("t", "t")
            .with_plan(d(2025, 6, 2), d(2025, 6, 6))
            .with_actual(d(2025, 6, 2), d(2025, 6, 4));
        task.right_remark = Some("done".into());
        let data = vec![Row::new("a", "A", vec![task])];
        let config = GanttConfig {
            view_mode: ViewMode::Day,
            show_right_remark: true,
            ..Default::default()
        };
        let (_, cache, viewport) = setup(&data, &config);

        let mut rec = Recorder::new();
        draw_tasks(&mut rec, &data, &cache, &viewport, &config);

        let rects: Vec<_> = rec
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Rect { .. }))
            .collect();
        assert_eq!(rects.len(), 1);
        if let DrawCmd::Rect { rect, color } = rects[0] {
            assert_eq!(rect.w, 240.0); // 3 inclusive days at 80 px/day
            assert_eq!(*color, config.actual_bg_color);
        }
        let plans: Vec<_> = rec
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Polyline { width, .. } if *width == 4.0))
            .collect();
        assert_eq!(plans.len(), 1);
        assert_eq!(rec.texts(), vec!["done"]);
    }

    #[test]
    fn per_task_colors_override_config() {
        let mut task = Task::new("t", "t").with_actual(d(2025, 6, 2), d(2025, 6, 4));
        task.actual_bg_color = Some(Color::from_rgb(1, 2, 3));
        let data = vec![Row::new("a", "A", vec![task])];
        let config = GanttConfig {
            view_mode: ViewMode::Day,
            ..Default::default()
        };
        let (_, cache, viewport) = setup(&data, &config);

        let mut rec = Recorder::new();
        draw_tasks(&mut rec, &data, &cache, &viewport, &config);
        assert!(rec
            .commands
            .iter()
            .any(|c| matches!(c, DrawCmd::Rect { color, .. } if *color == Color::from_rgb(1, 2, 3))));
    }

    #[test]
    fn show_toggles_suppress_bars() {
        let data = vec![Row::new(
            "a",
            "A",
            vec![Task::new("t", "t")
                .with_plan(d(2025, 6, 2), d(2025, 6, 6))
                .with_actual(d(2025, 6, 2), d(2025, 6, 4))],
        )];
        let config = GanttConfig {
            view_mode: ViewMode::Day,
            show_plan: false,
            show_actual: false,
            ..Default::default()
        };
        let (_, cache, viewport) = setup(&data, &config);

        let mut rec = Recorder::new();
        draw_tasks(&mut rec, &data, &cache, &viewport, &config);
        assert!(rec.commands.is_empty());
    }

    #[test]
    fn offscreen_tasks_are_not_drawn() {
        let data = vec![
            Row::new(
                "a",
                "A",
                vec![Task::new("near", "near").with_plan(d(2025, 6, 2), d(2025, 6, 6))],
            ),
            Row::new(
                "b",
                "B",
                vec![Task::new("far", "far").with_plan(d(2025, 9, 20), d(2025, 9, 25))],
            ),
        ];
        let config = GanttConfig {
            view_mode: ViewMode::Day,
            ..Default::default()
        };
        let (timeline, cache, mut viewport) = setup(&data, &config);
        viewport.set_scroll(timeline.date_to_x(d(2025, 6, 1)), 0.0);
        viewport.update_visible_range(&timeline);

        let mut rec = Recorder::new();
        draw_tasks(&mut rec, &data, &cache, &viewport, &config);
        // only the June task produces a plan rule
        let plans = rec
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Polyline { width, .. } if *width == 4.0))
            .count();
        assert_eq!(plans, 1);
    }
}

use chrono::{Datelike, NaiveDate};

use crate::chart::timeline::{Timeline, ViewMode};
use crate::chart::viewport::Viewport;
use crate::config::GanttConfig;
use crate::model::calendar::{format as format_date, start_of_week, week_number};
use crate::surface::{Color, Point, Rect, Surface, TextAlign};

const UPPER_TEXT: Color = Color::from_rgb(0x33, 0x33, 0x33);
const LOWER_TEXT: Color = Color::from_rgb(0x00, 0x04, 0x12);
const BORDER: Color = Color::from_rgb(0xe0, 0xe0, 0xe0);
const FONT_SIZE: f32 = 14.0;

/// Draw the two-band header ruler into a surface spanning the header strip.
///
/// The upper band carries the "era" label (year, or year+month), drawn once
/// per contiguous run of identical labels; the lower band labels every unit.
pub fn draw_header(
    surface: &mut dyn Surface,
    timeline: &Timeline,
    viewport: &Viewport,
    config: &GanttConfig,
) {
    let h = config.header_height;
    surface.fill_rect(
        Rect::new(0.0, 0.0, viewport.width, h),
        config.header_bg_color,
    );

    let mut last_upper = String::new();
    for date in timeline.visible_periods(
        viewport.visible_start,
        viewport.visible_end,
        viewport.scroll_x,
    ) {
        let x = timeline.date_to_x(date) - viewport.scroll_x;
        let unit_width = timeline.date_to_x(timeline.period_step(date)) - timeline.date_to_x(date);
        let (upper, lower) = unit_labels(timeline.view_mode, date);

        if upper != last_upper {
            surface.text(
                Point::new(x + 5.0, h * 0.35),
                TextAlign::Left,
                &upper,
                FONT_SIZE,
                UPPER_TEXT,
            );
            last_upper = upper;
        }

        surface.text(
            Point::new((x + unit_width / 2.0).round(), (h * 0.7).round()),
            TextAlign::Center,
            &lower,
            FONT_SIZE,
            LOWER_TEXT,
        );

        surface.line(
            Point::new(x, h * 0.5),
            Point::new(x, h),
            1.0,
            BORDER,
        );
    }

    surface.line(
        Point::new(0.0, h - 0.5),
        Point::new(viewport.width, h - 0.5),
        1.0,
        BORDER,
    );
}

fn unit_labels(mode: ViewMode, date: NaiveDate) -> (String, String) {
    match mode {
        ViewMode::Day => (format_date(date, "yyyy年MM月"), format_date(date, "d W")),
        ViewMode::Week => {
            let week_start = start_of_week(date);
            (
                format_date(week_start, "yyyy年MM月"),
                format!("第{}周", week_number(week_start)),
            )
        }
        ViewMode::Month => (
            format!("{}年", date.year()),
            format!("{}月", date.month()),
        ),
        ViewMode::Year => (
            format!("{}年", date.year()),
            if date.month() == 1 { "上半年" } else { "下半年" }.to_string(),
        ),
    }
}

//! egui host widget: wires scroll, resize, pointer and repaint scheduling
//! into the engine and renders tooltips.

use std::time::Duration;

use egui::{Color32, Rect as EguiRect, RichText, Sense, Ui, Vec2};

use crate::chart::{GanttChart, TooltipContent, TooltipData};
use crate::config::{GanttConfig, TooltipColor};
use crate::model::calendar::format as format_date;
use crate::model::TaskKind;
use crate::surface::Point;
use crate::ui::egui_surface::EguiSurface;

/// What the chart widget reported for this frame.
pub struct ChartResponse {
    /// Hover data, also rendered as a tooltip unless suppressed.
    pub tooltip: Option<TooltipData>,
}

/// Embed the chart in the current ui, filling the available space.
///
/// Uses a virtualized `ScrollArea`: the full timeline extent becomes the
/// scrollable content, but only the visible rect is handed to the engine,
/// which in turn draws only what intersects it.
pub fn show(chart: &mut GanttChart, ui: &mut Ui) -> ChartResponse {
    if chart.poll() {
        ui.ctx().request_repaint();
    }
    if chart.is_loading() {
        // keep polling the in-flight load between input events
        ui.ctx().request_repaint_after(Duration::from_millis(50));
    }

    let dpr = ui.ctx().pixels_per_point();
    let header_height = chart.config().header_height;

    let outer = ui.available_rect_before_wrap();
    let header_rect =
        EguiRect::from_min_size(outer.min, Vec2::new(outer.width(), header_height));
    let header_painter = ui.painter().with_clip_rect(header_rect);
    ui.allocate_rect(header_rect, Sense::hover());

    let mut tooltip = None;
    let mut scroll_area = egui::ScrollArea::both().auto_shrink([false, false]);
    if let Some((x, y)) = chart.take_scroll_request() {
        scroll_area = scroll_area.scroll_offset(Vec2::new(x, y));
    }

    scroll_area.show_viewport(ui, |ui, viewport_rect| {
        let content = Vec2::new(
            chart.viewport().total_width.max(viewport_rect.width()),
            chart.viewport().total_height.max(viewport_rect.height()),
        );
        ui.set_min_size(content);

        let size_changed = viewport_rect.width() != chart.viewport().width
            || viewport_rect.height() != chart.viewport().height
            || dpr != chart.viewport().device_pixel_ratio;
        if size_changed {
            chart.resize(viewport_rect.width(), viewport_rect.height(), dpr);
        }
        chart.set_scroll(viewport_rect.min.x.max(0.0), viewport_rect.min.y.max(0.0));

        let clip = ui.clip_rect();
        let main_painter = ui.painter().with_clip_rect(clip);
        let mut header_surface = EguiSurface::new(&header_painter, header_rect.min);
        let mut main_surface = EguiSurface::new(&main_painter, clip.min);
        chart.draw(&mut header_surface, &mut main_surface);

        if let Some(pointer) = ui.input(|i| i.pointer.hover_pos()) {
            if clip.contains(pointer) {
                tooltip = chart.tooltip_at(Point::new(
                    pointer.x - clip.min.x,
                    pointer.y - clip.min.y,
                ));
            }
        }
    });

    if let Some(data) = &tooltip {
        show_tooltip(chart, ui, data);
    }

    ChartResponse { tooltip }
}

fn show_tooltip(chart: &GanttChart, ui: &Ui, data: &TooltipData) {
    let config = chart.config();
    let Some(pointer) = ui.input(|i| i.pointer.hover_pos()) else {
        return;
    };
    let pos = pointer + Vec2::new(15.0 + config.offset_left, 15.0 + config.offset_top);
    egui::show_tooltip_at(
        ui.ctx(),
        ui.layer_id(),
        egui::Id::new(("gantt-tooltip", chart.container().to_string())),
        pos,
        |ui| tooltip_body(ui, config, data, chart),
    );
}

fn tooltip_body(ui: &mut Ui, config: &GanttConfig, data: &TooltipData, chart: &GanttChart) {
    let text_color = match config.tooltip_color {
        TooltipColor::Black => Color32::WHITE,
        TooltipColor::White => Color32::BLACK,
    };
    if config.tooltip_color == TooltipColor::White {
        ui.visuals_mut().override_text_color = Some(text_color);
        ui.visuals_mut().widgets.noninteractive.bg_fill = Color32::WHITE;
    }

    match &data.content {
        TooltipContent::Custom(markup) => {
            ui.label(markup);
        }
        TooltipContent::Tasks(tasks) => {
            ui.strong(format!(
                "{} ({})",
                data.row_name,
                format_date(data.date, "yyyy-MM-dd")
            ));
            ui.separator();
            for task in tasks {
                let swatch = Color32::from_rgb(task.color.r, task.color.g, task.color.b);
                ui.horizontal(|ui| {
                    ui.label(RichText::new("■").color(swatch));
                    if task.kind == TaskKind::Leave {
                        if let Some(actual) = task.actual {
                            let days = crate::model::calendar::diff_days_inclusive(
                                actual.start,
                                actual.end_or(chart.today()),
                            );
                            ui.strong(format!("{} ({days}天)", task.name));
                        }
                    } else {
                        ui.strong(&task.name);
                    }
                });
                if task.kind == TaskKind::Leave {
                    if let Some(actual) = task.actual {
                        ui.label(format!(
                            "    {} 到 {}",
                            format_date(actual.start, "yyyy-MM-dd"),
                            format_date(actual.end_or(chart.today()), "yyyy-MM-dd"),
                        ));
                    }
                    continue;
                }
                if config.show_plan {
                    if let Some(plan) = task.plan {
                        ui.label(format!(
                            "    计划: {} - {} ({}天)",
                            format_date(plan.start, "yyyy-MM-dd"),
                            format_date(plan.end, "yyyy-MM-dd"),
                            plan.days(),
                        ));
                    }
                }
                if config.show_actual {
                    if let Some(actual) = task.actual {
                        let end = match actual.end {
                            Some(end) => format_date(end, "yyyy-MM-dd"),
                            None => "至今".to_string(),
                        };
                        let days = crate::model::calendar::diff_days_inclusive(
                            actual.start,
                            actual.end_or(chart.today()),
                        );
                        ui.label(format!(
                            "    实际: {} - {end} ({days}天)",
                            format_date(actual.start, "yyyy-MM-dd"),
                        ));
                    }
                }
            }
        }
    }
}

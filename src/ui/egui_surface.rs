use egui::{Align2, Color32, FontId, Painter, Pos2, Shape, Stroke, Vec2};

use crate::surface::{Color, Point, Rect, Surface, TextAlign};

/// [`Surface`] implementation over an egui painter. The painter is expected
/// to be pre-clipped to the strip it renders (header or main area); `origin`
/// is that strip's top-left in screen coordinates.
pub struct EguiSurface<'a> {
    painter: &'a Painter,
    origin: Pos2,
}

impl<'a> EguiSurface<'a> {
    pub fn new(painter: &'a Painter, origin: Pos2) -> Self {
        Self { painter, origin }
    }

    fn pos(&self, p: Point) -> Pos2 {
        Pos2::new(self.origin.x + p.x, self.origin.y + p.y)
    }
}

fn color32(c: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

impl Surface for EguiSurface<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.painter.rect_filled(
            egui::Rect::from_min_size(
                self.pos(Point::new(rect.x, rect.y)),
                Vec2::new(rect.w, rect.h),
            ),
            0.0,
            color32(color),
        );
    }

    fn stroke_polyline(&mut self, points: &[Point], width: f32, color: Color) {
        let points: Vec<Pos2> = points.iter().map(|p| self.pos(*p)).collect();
        self.painter
            .add(Shape::line(points, Stroke::new(width, color32(color))));
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        let points: Vec<Pos2> = points.iter().map(|p| self.pos(*p)).collect();
        self.painter.add(Shape::convex_polygon(
            points,
            color32(color),
            Stroke::NONE,
        ));
    }

    fn text(&mut self, pos: Point, align: TextAlign, text: &str, size: f32, color: Color) {
        let anchor = match align {
            TextAlign::Left => Align2::LEFT_CENTER,
            TextAlign::Center => Align2::CENTER_CENTER,
            TextAlign::Right => Align2::RIGHT_CENTER,
        };
        self.painter.text(
            self.pos(pos),
            anchor,
            text,
            FontId::proportional(size),
            color32(color),
        );
    }
}

//! The drawing surface the chart renders through.
//!
//! The engine never talks to a concrete rendering API; everything it draws
//! goes through [`Surface`], a minimal immediate-mode contract (axis-aligned
//! rects, stroked polylines, filled polygons, aligned text). The egui
//! implementation lives in `ui::egui_surface`; [`Recorder`] captures the
//! command stream for headless tests.

use serde::Deserialize;

/// A point in chart pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle, canvas-style (origin + size).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

/// An sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::from_rgb(0, 0, 0);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        let nibble = |c: u8| char::from(c).to_digit(16).map(|d| d as u8);
        let byte = |hi: u8, lo: u8| Some(nibble(hi)? * 16 + nibble(lo)?);
        let b = hex.as_bytes();
        match b.len() {
            3 => Some(Self::from_rgb(
                byte(b[0], b[0])?,
                byte(b[1], b[1])?,
                byte(b[2], b[2])?,
            )),
            6 => Some(Self::from_rgb(
                byte(b[0], b[1])?,
                byte(b[2], b[3])?,
                byte(b[4], b[5])?,
            )),
            8 => Some(Self::from_rgba(
                byte(b[0], b[1])?,
                byte(b[2], b[3])?,
                byte(b[4], b[5])?,
                byte(b[6], b[7])?,
            )),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unparseable color {s:?}")))
    }
}

/// Horizontal text anchoring. The baseline is always the vertical middle of
/// the given position, matching the way the renderers lay labels out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Immediate-mode drawing contract consumed by the renderers.
///
/// Coordinates are screen-local pixels; the renderers have already applied
/// scroll translation and viewport culling before calling in.
pub trait Surface {
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_polyline(&mut self, points: &[Point], width: f32, color: Color);
    fn fill_polygon(&mut self, points: &[Point], color: Color);
    fn text(&mut self, pos: Point, align: TextAlign, text: &str, size: f32, color: Color);

    fn line(&mut self, a: Point, b: Point, width: f32, color: Color) {
        self.stroke_polyline(&[a, b], width, color);
    }
}

/// One recorded drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Rect {
        rect: Rect,
        color: Color,
    },
    Polyline {
        points: Vec<Point>,
        width: f32,
        color: Color,
    },
    Polygon {
        points: Vec<Point>,
        color: Color,
    },
    Text {
        pos: Point,
        align: TextAlign,
        text: String,
        size: f32,
        color: Color,
    },
}

/// A [`Surface`] that records the command stream instead of drawing it.
#[derive(Debug, Default)]
pub struct Recorder {
    pub commands: Vec<DrawCmd>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// All text commands, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for Recorder {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCmd::Rect { rect, color });
    }

    fn stroke_polyline(&mut self, points: &[Point], width: f32, color: Color) {
        self.commands.push(DrawCmd::Polyline {
            points: points.to_vec(),
            width,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        self.commands.push(DrawCmd::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn text(&mut self, pos: Point, align: TextAlign, text: &str, size: f32, color: Color) {
        self.commands.push(DrawCmd::Text {
            pos,
            align,
            text: text.to_string(),
            size,
            color,
        });
    }
}

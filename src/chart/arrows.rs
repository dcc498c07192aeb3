//! Orthogonal dependency connectors.
//!
//! Routing is a pure function from two anchors to a polyline plus an
//! oriented arrowhead; the draw pass only translates and strokes the result.
//! Connectors run from the predecessor's rightmost drawn edge to the
//! successor's leftmost drawn edge.

use crate::chart::layout::{PositionCache, TaskIndex};
use crate::chart::viewport::Viewport;
use crate::model::GanttData;
use crate::surface::{Color, Point, Surface};

const LINE_COLOR: Color = Color::from_rgb(0x64, 0x74, 0x8b);
const LINE_WIDTH: f32 = 1.0;
/// Horizontal clearance a connector keeps from the bars it leaves/enters.
const GAP: f32 = 15.0;
const HEAD_SIZE: f32 = 6.0;

/// Approach direction of the arrowhead at the path's end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    Right,
    Up,
    Down,
}

/// Where a connector attaches: the edge x, the row's vertical center, and
/// the row index (the routing strategy depends on row distance).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
    pub row: usize,
}

/// A routed connector, in chart coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowPath {
    pub points: Vec<Point>,
    pub head: ArrowDirection,
}

impl ArrowPath {
    pub fn segments(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn tip(&self) -> Point {
        *self.points.last().unwrap_or(&Point::new(0.0, 0.0))
    }

    /// The filled triangle drawn at the tip, oriented to the approach.
    pub fn head_triangle(&self) -> [Point; 3] {
        let Point { x, y } = self.tip();
        let size = HEAD_SIZE;
        let half = size * 0.6;
        match self.head {
            ArrowDirection::Right => [
                Point::new(x, y),
                Point::new(x - size, y - half),
                Point::new(x - size, y + half),
            ],
            ArrowDirection::Down => [
                Point::new(x, y),
                Point::new(x - half, y - size),
                Point::new(x + half, y - size),
            ],
            ArrowDirection::Up => [
                Point::new(x, y),
                Point::new(x - half, y + size),
                Point::new(x + half, y + size),
            ],
        }
    }
}

/// Route a connector between two task anchors.
///
/// Adjacent rows get a vertical connection through the row-boundary midline.
/// Anything else exits horizontally: straight right→down→right when the
/// target sits comfortably ahead, otherwise the five-segment detour through
/// the clearance line half a row height off the target, which keeps the
/// connector out of the target row's glyphs until the final entry.
pub fn route(from: Anchor, to: Anchor, row_height: f32) -> ArrowPath {
    let adjacent = from.row.abs_diff(to.row) == 1;

    if adjacent {
        let down = to.row > from.row;
        let sign = if down { 1.0 } else { -1.0 };
        let from_edge = from.y + sign * row_height * 0.3;
        let to_edge = to.y - sign * row_height * 0.3;
        let mid = (from.y + to.y) / 2.0;
        return ArrowPath {
            points: vec![
                Point::new(from.x, from_edge),
                Point::new(from.x, mid),
                Point::new(to.x, mid),
                Point::new(to.x, to_edge),
            ],
            head: if down {
                ArrowDirection::Down
            } else {
                ArrowDirection::Up
            },
        };
    }

    let exit_x = from.x + GAP;
    if to.x > exit_x + GAP {
        return ArrowPath {
            points: vec![
                Point::new(from.x, from.y),
                Point::new(exit_x, from.y),
                Point::new(exit_x, to.y),
                Point::new(to.x, to.y),
            ],
            head: ArrowDirection::Right,
        };
    }

    // Backward or too-close target: detour along the gap above (or below)
    // the target row, then come back in from its left.
    let down = to.row > from.row;
    let clearance_y = if down {
        to.y - row_height / 2.0
    } else {
        to.y + row_height / 2.0
    };
    let entry_x = to.x - GAP;
    ArrowPath {
        points: vec![
            Point::new(from.x, from.y),
            Point::new(exit_x, from.y),
            Point::new(exit_x, clearance_y),
            Point::new(entry_x, clearance_y),
            Point::new(entry_x, to.y),
            Point::new(to.x, to.y),
        ],
        head: ArrowDirection::Right,
    }
}

/// Draw every resolvable dependency connector. Unknown predecessor ids and
/// endpoints without drawable geometry are skipped; partial data during
/// incremental loading makes both common.
pub fn draw_dependencies(
    surface: &mut dyn Surface,
    data: &GanttData,
    index: &TaskIndex,
    cache: &PositionCache,
    viewport: &Viewport,
    row_height: f32,
) {
    for row in data {
        for task in &row.tasks {
            if task.dependencies.is_empty() {
                continue;
            }
            let (Some(to_ref), Some(to_pos)) = (index.get(&task.id), cache.get(&task.id)) else {
                continue;
            };
            let Some(to_x) = to_pos.left_edge() else {
                continue;
            };
            let to = Anchor {
                x: to_x,
                y: to_pos.y,
                row: to_ref.row,
            };
            for dep_id in &task.dependencies {
                let (Some(from_ref), Some(from_pos)) = (index.get(dep_id), cache.get(dep_id))
                else {
                    continue;
                };
                let Some(from_x) = from_pos.right_edge() else {
                    continue;
                };
                let from = Anchor {
                    x: from_x,
                    y: from_pos.y,
                    row: from_ref.row,
                };
                let path = route(from, to, row_height);
                let screen: Vec<Point> = path
                    .points
                    .iter()
                    .map(|p| Point::new(p.x - viewport.scroll_x, p.y - viewport.scroll_y))
                    .collect();
                surface.stroke_polyline(&screen, LINE_WIDTH, LINE_COLOR);
                let head: Vec<Point> = path
                    .head_triangle()
                    .iter()
                    .map(|p| Point::new(p.x - viewport.scroll_x, p.y - viewport.scroll_y))
                    .collect();
                surface.fill_polygon(&head, LINE_COLOR);
            }
        }
    }
}

//! Scroll-edge incremental loading.
//!
//! The loader never performs I/O itself: the registered callback hands back
//! a channel receiver, and the chart polls it between frames. One load may
//! be outstanding at a time; requests that arrive while one is in flight
//! are dropped, not queued.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::model::GanttData;

/// A scrollable extremity that can be extended with more data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEdge {
    Left,
    Right,
    Bottom,
}

/// Context handed to the loader callback: the data extremum being extended,
/// or the current row count for bottom loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadContext {
    Date(NaiveDate),
    RowCount(usize),
}

/// What a loader callback resolves to. `Ok(vec![])` means "no more data in
/// this direction"; `Err` is a transient failure that leaves the edge
/// enabled.
pub type LoadResult = Result<GanttData, String>;

/// The external fetch collaborator. Returns a receiver immediately; the
/// actual work may complete on another thread or a later frame.
pub type LoadCallback = Box<dyn FnMut(LoadEdge, LoadContext) -> Receiver<LoadResult>>;

/// Geometry and context snapshot the edge checks run against.
#[derive(Debug, Clone, Copy)]
pub struct EdgeProbe {
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub total_width: f32,
    pub total_height: f32,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub row_count: usize,
}

const EDGE_THRESHOLD: f32 = 5.0;

pub struct IncrementalLoader {
    edges: Vec<LoadEdge>,
    callback: Option<LoadCallback>,
    has_more_left: bool,
    has_more_right: bool,
    has_more_bottom: bool,
    in_flight: Option<(LoadEdge, Receiver<LoadResult>)>,
    debounce: Duration,
    deadline: Option<Instant>,
    prev_scroll: (f32, f32),
    last_delta: (f32, f32),
}

impl IncrementalLoader {
    pub fn new(edges: Vec<LoadEdge>, debounce: Duration) -> Self {
        Self {
            edges,
            callback: None,
            has_more_left: true,
            has_more_right: true,
            has_more_bottom: true,
            in_flight: None,
            debounce,
            deadline: None,
            prev_scroll: (0.0, 0.0),
            last_delta: (0.0, 0.0),
        }
    }

    pub fn set_callback(&mut self, callback: LoadCallback) {
        self.callback = Some(callback);
    }

    pub fn set_edges(&mut self, edges: Vec<LoadEdge>, debounce: Duration) {
        self.edges = edges;
        self.debounce = debounce;
    }

    /// Record a scroll movement and arm the debounced edge check.
    pub fn on_scroll(&mut self, x: f32, y: f32) {
        let delta = (x - self.prev_scroll.0, y - self.prev_scroll.1);
        if delta != (0.0, 0.0) {
            self.last_delta = delta;
        }
        self.prev_scroll = (x, y);
        if self.callback.is_some() && !self.edges.is_empty() {
            self.deadline = Some(Instant::now() + self.debounce);
        }
    }

    /// Advance the loader: apply a completed load, or run the armed edge
    /// check. Returns merged data when a load succeeded with content.
    pub fn poll(&mut self, probe: EdgeProbe) -> Option<(LoadEdge, GanttData)> {
        if let Some(result) = self.poll_in_flight() {
            return Some(result);
        }
        if self.deadline.is_some_and(|at| Instant::now() >= at) {
            self.deadline = None;
            self.check_edges(probe);
        }
        None
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn has_more(&self, edge: LoadEdge) -> bool {
        match edge {
            LoadEdge::Left => self.has_more_left,
            LoadEdge::Right => self.has_more_right,
            LoadEdge::Bottom => self.has_more_bottom,
        }
    }

    /// Re-enable exhausted edges and clear the debounce state.
    pub fn reset(&mut self) {
        self.has_more_left = true;
        self.has_more_right = true;
        self.has_more_bottom = true;
        self.deadline = None;
    }

    fn poll_in_flight(&mut self) -> Option<(LoadEdge, GanttData)> {
        let (edge, receiver) = self.in_flight.as_ref()?;
        let edge = *edge;
        match receiver.try_recv() {
            Ok(Ok(data)) => {
                self.in_flight = None;
                if data.is_empty() || data.iter().all(|row| row.tasks.is_empty()) {
                    debug!(?edge, "loader returned no data, edge exhausted");
                    self.exhaust(edge);
                    None
                } else {
                    debug!(?edge, rows = data.len(), "incremental load completed");
                    Some((edge, data))
                }
            }
            Ok(Err(message)) => {
                // transient: the edge stays enabled for later attempts
                warn!(?edge, %message, "incremental load failed");
                self.in_flight = None;
                None
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!(?edge, "incremental load dropped without a result");
                self.in_flight = None;
                None
            }
        }
    }

    fn exhaust(&mut self, edge: LoadEdge) {
        match edge {
            LoadEdge::Left => self.has_more_left = false,
            LoadEdge::Right => self.has_more_right = false,
            LoadEdge::Bottom => self.has_more_bottom = false,
        }
    }

    /// At most one edge fires per check, priority left > right > bottom.
    /// The viewport must be moving toward the edge, not just resting at it.
    fn check_edges(&mut self, probe: EdgeProbe) {
        if self.in_flight.is_some() {
            return;
        }
        let (dx, dy) = self.last_delta;
        let at_left = probe.scroll_x <= EDGE_THRESHOLD;
        let at_right =
            probe.scroll_x + probe.viewport_width >= probe.total_width - EDGE_THRESHOLD;
        let at_bottom =
            probe.scroll_y + probe.viewport_height >= probe.total_height - EDGE_THRESHOLD;

        let (edge, context) = if self.enabled(LoadEdge::Left) && at_left && dx < 0.0 {
            (LoadEdge::Left, LoadContext::Date(probe.min_date))
        } else if self.enabled(LoadEdge::Right) && at_right && dx > 0.0 {
            (LoadEdge::Right, LoadContext::Date(probe.max_date))
        } else if self.enabled(LoadEdge::Bottom) && at_bottom && dy > 0.0 {
            (LoadEdge::Bottom, LoadContext::RowCount(probe.row_count))
        } else {
            return;
        };

        if let Some(callback) = self.callback.as_mut() {
            debug!(?edge, ?context, "incremental load triggered");
            let receiver = callback(edge, context);
            self.in_flight = Some((edge, receiver));
        }
    }

    fn enabled(&self, edge: LoadEdge) -> bool {
        self.edges.contains(&edge) && self.has_more(edge)
    }
}

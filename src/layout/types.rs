use std::collections::BTreeMap;
use std::fmt;

use crate::ir::{ConnectionId, Point, SignalType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortAnchor {
    pub name: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBlock {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Column inside the block's own group.
    pub column: usize,
    pub host_hardware: Option<String>,
    pub inputs: Vec<PortAnchor>,
    pub outputs: Vec<PortAnchor>,
    /// True when a position override replaced the computed position.
    pub pinned: bool,
}

impl LayoutBlock {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HardwareGroup {
    pub name: String,
    pub blocks: Vec<String>,
    pub column: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl HardwareGroup {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    SameColumn,
    Forward,
    Backward,
    SelfLoop,
}

/// Where a path point came from. Waypoint splices add two points that share
/// the index of the waypoint that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSource {
    Route,
    Waypoint(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPath {
    pub id: ConnectionId,
    /// Position of the connection in the design's connection list.
    pub index: usize,
    pub from: String,
    pub to: String,
    pub signal_name: String,
    pub signal_type: SignalType,
    pub kind: RouteKind,
    pub spread_offset: f32,
    /// Path after waypoint splicing, before point overrides.
    pub routed: Vec<Point>,
    pub sources: Vec<PointSource>,
    /// Final polyline handed to the rendering surface.
    pub points: Vec<Point>,
    pub label_anchor: Point,
}

impl ConnectionPath {
    pub fn interior_len(&self) -> usize {
        self.points.len().saturating_sub(2)
    }

    /// Final positions of the two points spliced in for waypoint `waypoint`,
    /// with the interior index of the first one.
    pub fn waypoint_points(&self, waypoint: usize) -> Option<(usize, Point, Point)> {
        let first = self
            .sources
            .iter()
            .position(|source| *source == PointSource::Waypoint(waypoint))?;
        let second = *self.points.get(first + 1)?;
        Some((first - 1, self.points[first], second))
    }

    pub fn waypoint_count(&self) -> usize {
        self.sources
            .iter()
            .filter_map(|source| match source {
                PointSource::Waypoint(idx) => Some(idx + 1),
                PointSource::Route => None,
            })
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutWarning {
    DuplicateBlock {
        id: String,
    },
    UnknownBlock {
        connection: ConnectionId,
        block: String,
    },
    UnknownPort {
        connection: ConnectionId,
        block: String,
        port: String,
    },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutWarning::DuplicateBlock { id } => {
                write!(f, "duplicate block id '{id}' ignored")
            }
            LayoutWarning::UnknownBlock { connection, block } => {
                write!(f, "connection {connection} references unknown block '{block}'")
            }
            LayoutWarning::UnknownPort {
                connection,
                block,
                port,
            } => write!(
                f,
                "connection {connection}: block '{block}' has no port '{port}', using port 0"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub blocks: BTreeMap<String, LayoutBlock>,
    pub groups: Vec<HardwareGroup>,
    pub paths: Vec<ConnectionPath>,
    pub width: f32,
    pub height: f32,
    pub warnings: Vec<LayoutWarning>,
    /// Hash of the inputs this diagram was computed from.
    pub fingerprint: u64,
}

impl Diagram {
    pub fn path(&self, id: &ConnectionId) -> Option<&ConnectionPath> {
        self.paths.iter().find(|path| &path.id == id)
    }
}

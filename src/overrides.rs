//! User-authored adjustments layered on top of the computed diagram.
//!
//! Overrides are plain data. They never hold derived geometry; the diagram is
//! always recomputed from `(design, overrides)`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ir::{ConnectionId, Point};

const ZERO: Point = (0.0, 0.0);

pub(crate) fn trim_trailing_zeros(offsets: &mut Vec<Point>) {
    while offsets.last() == Some(&ZERO) {
        offsets.pop();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overrides {
    /// Block id -> absolute top-left position.
    pub blocks: BTreeMap<String, Point>,
    /// Connection -> (dx, dy) per interior point of the final path.
    pub points: BTreeMap<ConnectionId, Vec<Point>>,
    /// Connection -> user-inserted waypoints, in insertion order.
    pub waypoints: BTreeMap<ConnectionId, Vec<Point>>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.points.is_empty() && self.waypoints.is_empty()
    }

    pub fn block_position(&self, block_id: &str) -> Option<Point> {
        self.blocks.get(block_id).copied()
    }

    pub fn set_block_position(&mut self, block_id: &str, position: Point) {
        self.blocks.insert(block_id.to_string(), position);
    }

    pub fn point_offsets(&self, id: &ConnectionId) -> &[Point] {
        self.points.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn waypoints_for(&self, id: &ConnectionId) -> &[Point] {
        self.waypoints.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replaces the offset of one interior point, padding the list with zero
    /// offsets when it is shorter than `index + 1`.
    ///
    /// Offset lists never end in a zero offset; a missing entry already means
    /// "not moved". Keeping them trimmed lets a split followed by a join give
    /// back exactly the list it started from.
    pub fn set_point_offset(&mut self, id: &ConnectionId, index: usize, offset: Point) {
        let entry = self.points.entry(id.clone()).or_default();
        if entry.len() <= index {
            entry.resize(index + 1, ZERO);
        }
        entry[index] = offset;
        trim_trailing_zeros(entry);
        if entry.is_empty() {
            self.points.remove(id);
        }
    }

    /// Opens a gap of two zero offsets at interior `index`. Entries at or
    /// after `index` shift with the points they belong to.
    pub fn split_point_offsets(&mut self, id: &ConnectionId, index: usize) {
        let Some(entry) = self.points.get_mut(id) else {
            return;
        };
        if entry.len() <= index {
            return;
        }
        entry.splice(index..index, [ZERO, ZERO]);
    }

    /// Removes the offsets at `index` and `index + 1`, then restores the
    /// trimmed form.
    pub fn join_point_offsets(&mut self, id: &ConnectionId, index: usize) {
        let Some(entry) = self.points.get_mut(id) else {
            return;
        };
        let start = index.min(entry.len());
        let end = (index + 2).min(entry.len());
        entry.drain(start..end);
        trim_trailing_zeros(entry);
        if entry.is_empty() {
            self.points.remove(id);
        }
    }

    pub fn push_waypoint(&mut self, id: &ConnectionId, point: Point) {
        self.waypoints.entry(id.clone()).or_default().push(point);
    }

    pub fn remove_waypoint(&mut self, id: &ConnectionId, index: usize) -> Option<Point> {
        let list = self.waypoints.get_mut(id)?;
        if index >= list.len() {
            return None;
        }
        let removed = list.remove(index);
        if list.is_empty() {
            self.waypoints.remove(id);
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.points.clear();
        self.waypoints.clear();
    }
}

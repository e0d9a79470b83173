use crate::ir::{ConnectionId, Point};
use crate::layout::{ConnectionPath, Diagram, nearest_segment};

#[derive(Debug, Clone, PartialEq)]
pub struct PathHit {
    pub id: ConnectionId,
    pub segment: usize,
    pub distance: f32,
}

/// Connection closest to `point` over every segment of every path.
/// Overlapping paths resolve to the one listed first.
pub fn nearest_path(diagram: &Diagram, point: Point) -> Option<PathHit> {
    let mut best: Option<PathHit> = None;
    for path in &diagram.paths {
        let Some((segment, distance)) = nearest_segment(&path.points, point) else {
            continue;
        };
        if best.as_ref().is_none_or(|hit| distance < hit.distance) {
            best = Some(PathHit {
                id: path.id.clone(),
                segment,
                distance,
            });
        }
    }
    best
}

/// Interior point of `path` within `radius` of `point`, as an interior index.
pub fn interior_node_at(path: &ConnectionPath, point: Point, radius: f32) -> Option<usize> {
    let interior = path.interior_len();
    let mut best: Option<(usize, f32)> = None;
    for idx in 0..interior {
        let node = path.points[idx + 1];
        let distance = ((node.0 - point.0).powi(2) + (node.1 - point.1).powi(2)).sqrt();
        if distance <= radius && best.is_none_or(|(_, d)| distance < d) {
            best = Some((idx, distance));
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ir::{Block, Connection, Design, SignalType};
    use crate::overrides::Overrides;

    fn diagram() -> Diagram {
        let mut design = Design::new();
        design.blocks.push(Block::new("a", "A").with_outputs(&["X", "Y"]));
        design.blocks.push(Block::new("b", "B").with_inputs(&["X", "Y"]));
        design.connections.push(Connection::new("a", "b", "X", SignalType::Data));
        design.connections.push(Connection::new("a", "b", "Y", SignalType::Control));
        crate::layout::compute_diagram(&design, &Overrides::new(), &Config::default())
    }

    #[test]
    fn picks_the_globally_closest_path() {
        let diagram = diagram();
        let target = &diagram.paths[1];
        let pointer = (target.points[1].0, (target.points[1].1 + target.points[2].1) / 2.0 + 1.0);
        let hit = nearest_path(&diagram, pointer).unwrap();
        assert_eq!(hit.id, target.id);
    }

    #[test]
    fn finds_interior_nodes_only() {
        let diagram = diagram();
        let path = &diagram.paths[0];
        let corner = path.points[1];
        assert_eq!(interior_node_at(path, (corner.0 + 3.0, corner.1), 8.0), Some(0));
        assert_eq!(interior_node_at(path, path.points[0], 2.0), None);
    }
}

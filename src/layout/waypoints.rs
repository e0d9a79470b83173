use crate::ir::Point;
use crate::overrides::Overrides;

use super::{ConnectionPath, PointSource};

pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let closest = project_onto_segment(p, a, b);
    ((p.0 - closest.0).powi(2) + (p.1 - closest.1).powi(2)).sqrt()
}

fn project_onto_segment(p: Point, a: Point, b: Point) -> Point {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0);
    (a.0 + t * dx, a.1 + t * dy)
}

/// Segment of `points` closest to `p`, with its distance. Ties go to the
/// earlier segment.
pub fn nearest_segment(points: &[Point], p: Point) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, w) in points.windows(2).enumerate() {
        let dist = point_segment_distance(p, w[0], w[1]);
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((idx, dist));
        }
    }
    best
}

/// Where a waypoint lands on segment `a`-`b`: the projection along the
/// segment's dominant axis, kept `inset` away from both ends. Segments too
/// short for the inset split at their midpoint.
fn split_point(a: Point, b: Point, waypoint: Point, inset: f32) -> Point {
    let horizontal = (b.0 - a.0).abs() >= (b.1 - a.1).abs();
    let (a_main, b_main, w_main, a_cross, b_cross) = if horizontal {
        (a.0, b.0, waypoint.0, a.1, b.1)
    } else {
        (a.1, b.1, waypoint.1, a.0, b.0)
    };
    let lo = a_main.min(b_main);
    let hi = a_main.max(b_main);
    let main = if hi - lo < 2.0 * inset {
        (lo + hi) / 2.0
    } else {
        w_main.clamp(lo + inset, hi - inset)
    };
    let span = b_main - a_main;
    let t = if span.abs() <= f32::EPSILON {
        0.5
    } else {
        (main - a_main) / span
    };
    let cross = a_cross + t * (b_cross - a_cross);
    if horizontal {
        (main, cross)
    } else {
        (cross, main)
    }
}

/// Replays stored waypoints over a freshly routed path. Each waypoint
/// splits its nearest segment with two coincident points; dragging either
/// one through a point override turns the split into a jog.
pub(super) fn splice_waypoints(
    route: Vec<Point>,
    waypoints: &[Point],
    inset: f32,
) -> (Vec<Point>, Vec<PointSource>) {
    let mut points = route;
    let mut sources = vec![PointSource::Route; points.len()];
    for (k, waypoint) in waypoints.iter().enumerate() {
        let Some((segment, _)) = nearest_segment(&points, *waypoint) else {
            continue;
        };
        let at = split_point(points[segment], points[segment + 1], *waypoint, inset);
        points.splice(segment + 1..segment + 1, [at, at]);
        sources.splice(
            segment + 1..segment + 1,
            [PointSource::Waypoint(k), PointSource::Waypoint(k)],
        );
    }
    (points, sources)
}

/// Adds per-interior-point offsets. Endpoints are never moved.
pub(super) fn apply_point_offsets(routed: &[Point], offsets: &[Point]) -> Vec<Point> {
    let last = routed.len().saturating_sub(1);
    routed
        .iter()
        .enumerate()
        .map(|(idx, point)| {
            if idx == 0 || idx == last {
                return *point;
            }
            match offsets.get(idx - 1) {
                Some((dx, dy)) => (point.0 + dx, point.1 + dy),
                None => *point,
            }
        })
        .collect()
}

/// Stores a waypoint for a double-click at `click` on `path`. The click is
/// matched against the rendered polyline and then moved onto the routed
/// segment underneath it, so the waypoint replays onto the same segment.
/// Offsets after the split point shift along with their points.
pub fn insert_waypoint(
    overrides: &mut Overrides,
    path: &ConnectionPath,
    click: Point,
    inset: f32,
) -> Option<Point> {
    let (segment, _) = nearest_segment(&path.points, click)?;
    let a = *path.routed.get(segment)?;
    let b = *path.routed.get(segment + 1)?;
    let at = split_point(a, b, click, inset);
    overrides.split_point_offsets(&path.id, segment);
    overrides.push_waypoint(&path.id, at);
    log::debug!("waypoint {at:?} inserted on {} segment {segment}", path.id);
    Some(at)
}

/// Removes the waypoint whose spliced points lie within `radius` of
/// `click`, together with their two offset entries. Returns the index of the
/// removed waypoint.
pub fn remove_waypoint_near(
    overrides: &mut Overrides,
    path: &ConnectionPath,
    click: Point,
    radius: f32,
) -> Option<usize> {
    let mut best: Option<(usize, usize, f32)> = None;
    for waypoint in 0..path.waypoint_count() {
        let Some((interior, first, second)) = path.waypoint_points(waypoint) else {
            continue;
        };
        let dist = distance(click, first).min(distance(click, second));
        if dist <= radius && best.is_none_or(|(_, _, d)| dist < d) {
            best = Some((waypoint, interior, dist));
        }
    }
    let (waypoint, interior, _) = best?;
    overrides.join_point_offsets(&path.id, interior);
    overrides.remove_waypoint(&path.id, waypoint)?;
    log::debug!("waypoint {waypoint} removed from {}", path.id);
    Some(waypoint)
}

fn distance(a: Point, b: Point) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

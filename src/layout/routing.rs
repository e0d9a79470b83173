use std::collections::{BTreeMap, HashMap};

use crate::config::{LayoutConfig, RoutingConfig};
use crate::ir::{ConnectionId, Point};

use super::block::port_row_center;
use super::{HardwareGroup, LayoutBlock, PortAnchor, Rect, RouteKind};

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Route {
    pub(super) kind: RouteKind,
    pub(super) points: Vec<Point>,
}

/// Geometry the router consults for every connection of one diagram.
pub(super) struct RouteContext<'a> {
    blocks: &'a BTreeMap<String, LayoutBlock>,
    /// Block id -> frame of its hardware group, or its own rectangle.
    clusters: HashMap<&'a str, Rect>,
    extent: Option<Rect>,
    layout: &'a LayoutConfig,
    routing: &'a RoutingConfig,
}

impl<'a> RouteContext<'a> {
    pub(super) fn new(
        blocks: &'a BTreeMap<String, LayoutBlock>,
        groups: &'a [HardwareGroup],
        layout: &'a LayoutConfig,
        routing: &'a RoutingConfig,
    ) -> Self {
        let mut clusters: HashMap<&'a str, Rect> = blocks
            .iter()
            .map(|(id, block)| (id.as_str(), block.rect()))
            .collect();
        let mut extent: Option<Rect> = None;
        for block in blocks.values() {
            let rect = block.rect();
            extent = Some(extent.map_or(rect, |e| e.union(&rect)));
        }
        for group in groups {
            let frame = group.rect();
            extent = Some(extent.map_or(frame, |e| e.union(&frame)));
            for member in &group.blocks {
                if let Some(cluster) = clusters.get_mut(member.as_str()) {
                    *cluster = frame;
                }
            }
        }
        Self {
            blocks,
            clusters,
            extent,
            layout,
            routing,
        }
    }

    fn cluster(&self, block: &LayoutBlock) -> Rect {
        self.clusters
            .get(block.id.as_str())
            .copied()
            .unwrap_or_else(|| block.rect())
    }
}

/// Index of `name` among `ports`, if present.
pub(super) fn find_port(ports: &[String], name: &str) -> Option<usize> {
    ports.iter().position(|port| port == name)
}

/// Index of the port carrying `name`. Unknown names fall back to the first
/// port, so the lookup never fails.
pub fn port_index(ports: &[String], name: &str) -> usize {
    find_port(ports, name).unwrap_or(0)
}

/// Anchor of port `index`, falling back to the first row when the block has
/// no such port.
pub(super) fn port_anchor(
    block: &LayoutBlock,
    anchors: &[PortAnchor],
    index: usize,
    edge_x: f32,
    layout: &LayoutConfig,
) -> Point {
    anchors
        .get(index)
        .map(|anchor| (anchor.x, anchor.y))
        .unwrap_or_else(|| (edge_x, port_row_center(block.y, 0, layout)))
}

/// Unordered block pair, so A->B and B->A fan out together.
pub(super) fn pair_key(from: &str, to: &str) -> (String, String) {
    if from <= to {
        (from.to_string(), to.to_string())
    } else {
        (to.to_string(), from.to_string())
    }
}

/// Per-connection channel offsets. Connections sharing a block pair are
/// ordered by id and centred around zero.
pub(super) fn spread_offsets(
    connections: &[(ConnectionId, &str, &str)],
    spread: f32,
) -> HashMap<ConnectionId, f32> {
    let mut pairs: HashMap<(String, String), Vec<&ConnectionId>> = HashMap::new();
    for (id, from, to) in connections {
        pairs.entry(pair_key(from, to)).or_default().push(id);
    }
    let mut offsets = HashMap::new();
    for mut ids in pairs.into_values() {
        ids.sort();
        let center = (ids.len() as f32 - 1.0) / 2.0;
        for (idx, id) in ids.into_iter().enumerate() {
            offsets.insert(id.clone(), (idx as f32 - center) * spread);
        }
    }
    offsets
}

pub(super) fn classify(
    from: &LayoutBlock,
    to: &LayoutBlock,
    start: Point,
    end: Point,
    layout: &LayoutConfig,
    routing: &RoutingConfig,
) -> RouteKind {
    if from.id == to.id {
        RouteKind::SelfLoop
    } else if (to.x - from.x).abs() < layout.block_width / 2.0 {
        RouteKind::SameColumn
    } else if end.0 > start.0 + 2.0 * routing.exit_distance {
        RouteKind::Forward
    } else {
        RouteKind::Backward
    }
}

pub(super) fn route_connection(
    ctx: &RouteContext<'_>,
    from: &LayoutBlock,
    to: &LayoutBlock,
    start: Point,
    end: Point,
    spread: f32,
) -> Route {
    let kind = classify(from, to, start, end, ctx.layout, ctx.routing);
    let points = match kind {
        RouteKind::SelfLoop => route_self_loop(from, start, end, spread, ctx.routing),
        RouteKind::SameColumn => route_same_column(from, to, start, end, spread, ctx.routing),
        RouteKind::Forward => {
            let channel = find_channel(ctx, from, to, start, end, spread);
            vec![start, (channel, start.1), (channel, end.1), end]
        }
        RouteKind::Backward => route_backward(ctx, from, to, start, end, spread),
    };
    Route { kind, points }
}

fn route_self_loop(
    block: &LayoutBlock,
    start: Point,
    end: Point,
    spread: f32,
    routing: &RoutingConfig,
) -> Vec<Point> {
    let x_out = block.x + block.width + routing.exit_distance + spread;
    let x_in = block.x - routing.exit_distance - spread;
    let top = block.y - routing.loop_margin - spread;
    vec![
        start,
        (x_out, start.1),
        (x_out, top),
        (x_in, top),
        (x_in, end.1),
        end,
    ]
}

fn route_same_column(
    from: &LayoutBlock,
    to: &LayoutBlock,
    start: Point,
    end: Point,
    spread: f32,
    routing: &RoutingConfig,
) -> Vec<Point> {
    let x_out = (from.x + from.width).max(to.x + to.width) + routing.exit_distance + spread;
    let x_in = from.x.min(to.x) - routing.exit_distance - spread;
    let (upper, lower) = if from.y <= to.y { (from, to) } else { (to, from) };
    let mid_y = (upper.y + upper.height + lower.y) / 2.0 + spread;
    vec![
        start,
        (x_out, start.1),
        (x_out, mid_y),
        (x_in, mid_y),
        (x_in, end.1),
        end,
    ]
}

fn route_backward(
    ctx: &RouteContext<'_>,
    from: &LayoutBlock,
    to: &LayoutBlock,
    start: Point,
    end: Point,
    spread: f32,
) -> Vec<Point> {
    let routing = ctx.routing;
    let source = ctx.cluster(from);
    let target = ctx.cluster(to);
    let x_out = source.right() + routing.exit_distance + spread;
    let x_in = target.x - routing.exit_distance - spread;

    let extent = ctx.extent.unwrap_or_else(|| source.union(&target));
    let top = extent.y - routing.loop_margin + spread;
    let bottom = extent.bottom() + routing.loop_margin + spread;
    let over_top = (start.1 - top) + (end.1 - top);
    let under_bottom = (bottom - start.1) + (bottom - end.1);
    let run_y = if over_top <= under_bottom { top } else { bottom };

    vec![
        start,
        (x_out, start.1),
        (x_out, run_y),
        (x_in, run_y),
        (x_in, end.1),
        end,
    ]
}

/// Vertical channel for a forward path. Starts at the midpoint and probes
/// alternating left/right offsets until a column clear of every other block
/// turns up; falls back to the midpoint when the probe budget runs out.
fn find_channel(
    ctx: &RouteContext<'_>,
    from: &LayoutBlock,
    to: &LayoutBlock,
    start: Point,
    end: Point,
    spread: f32,
) -> f32 {
    let routing = ctx.routing;
    let lo = start.0 + routing.exit_distance;
    let hi = end.0 - routing.exit_distance;
    let base = ((start.0 + end.0) / 2.0 + spread).clamp(lo, hi);
    let y_min = start.1.min(end.1);
    let y_max = start.1.max(end.1);

    let is_clear = |x: f32| {
        ctx.blocks.values().all(|block| {
            if block.id == from.id || block.id == to.id {
                return true;
            }
            let blocked_x = x >= block.x - routing.channel_margin
                && x <= block.x + block.width + routing.channel_margin;
            let blocked_y = y_max >= block.y && y_min <= block.y + block.height;
            !(blocked_x && blocked_y)
        })
    };

    if is_clear(base) {
        return base;
    }
    for step in 1..=routing.channel_probes {
        let delta = step as f32 * routing.channel_step;
        for candidate in [base - delta, base + delta] {
            if candidate > lo && candidate < hi && is_clear(candidate) {
                return candidate;
            }
        }
    }
    log::debug!(
        "no clear channel between {} and {}, using midpoint x={base}",
        from.id,
        to.id
    );
    base
}

/// Midpoint of the longest interior segment. Paths too short to have one
/// fall back to their longest segment.
pub(super) fn label_anchor(points: &[Point]) -> Point {
    let Some(first) = points.first().copied() else {
        return (0.0, 0.0);
    };
    if points.len() < 2 {
        return first;
    }
    let segment_count = points.len() - 1;
    let (start_idx, end_idx) = if segment_count >= 3 {
        (1, segment_count - 1)
    } else {
        (0, segment_count)
    };
    let longest = |range: std::ops::Range<usize>| {
        let mut best: Option<(usize, f32)> = None;
        for idx in range {
            let (a, b) = (points[idx], points[idx + 1]);
            let len = (b.0 - a.0).powi(2) + (b.1 - a.1).powi(2);
            if len > best.map_or(0.0, |(_, l)| l) {
                best = Some((idx, len));
            }
        }
        best.map(|(idx, _)| idx)
    };
    let idx = longest(start_idx..end_idx)
        .or_else(|| longest(0..segment_count))
        .unwrap_or(0);
    let (a, b) = (points[idx], points[idx + 1]);
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

mod block;
mod ranking;
mod routing;
pub(crate) mod types;
mod waypoints;

pub use routing::port_index;
pub use types::*;
pub use waypoints::{insert_waypoint, nearest_segment, point_segment_distance, remove_waypoint_near};

use block::place_blocks;
use ranking::{compute_ranking, partition_blocks};
use routing::{RouteContext, find_port, label_anchor, port_anchor, route_connection, spread_offsets};
use waypoints::{apply_point_offsets, splice_waypoints};

use crate::config::Config;
use crate::ir::{Block, Connection, ConnectionId, Design};
use crate::overrides::Overrides;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

/// Computes the full diagram for `design` with `overrides` applied.
///
/// The result is a pure function of its inputs. Malformed input degrades:
/// duplicate blocks are skipped, connections to unknown blocks produce no
/// path, unknown port names fall back to the first port. Each case is
/// recorded in [`Diagram::warnings`].
pub fn compute_diagram(design: &Design, overrides: &Overrides, config: &Config) -> Diagram {
    let mut warnings = Vec::new();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut blocks: Vec<&Block> = Vec::with_capacity(design.blocks.len());
    for block in &design.blocks {
        if seen.insert(block.id.as_str()) {
            blocks.push(block);
        } else {
            log::warn!("duplicate block id '{}' ignored", block.id);
            warnings.push(LayoutWarning::DuplicateBlock {
                id: block.id.clone(),
            });
        }
    }
    let by_id: HashMap<&str, &Block> = blocks.iter().map(|b| (b.id.as_str(), *b)).collect();

    let ids = design.connection_ids();
    let mut routable: Vec<(usize, ConnectionId, &Connection)> = Vec::new();
    for (index, (conn, id)) in design.connections.iter().zip(ids).enumerate() {
        let missing = [&conn.from_block, &conn.to_block]
            .into_iter()
            .find(|endpoint| !by_id.contains_key(endpoint.as_str()));
        if let Some(block) = missing {
            let warning = LayoutWarning::UnknownBlock {
                connection: id,
                block: block.clone(),
            };
            log::warn!("{warning}");
            warnings.push(warning);
            continue;
        }
        routable.push((index, id, conn));
    }

    let partition = partition_blocks(&blocks);
    let connection_refs: Vec<&Connection> = routable.iter().map(|(_, _, conn)| *conn).collect();
    let ranking = compute_ranking(&partition, &connection_refs);
    let placed = place_blocks(&blocks, &partition, &ranking, overrides, &config.layout);

    let spread_input: Vec<(ConnectionId, &str, &str)> = routable
        .iter()
        .map(|(_, id, conn)| (id.clone(), conn.from_block.as_str(), conn.to_block.as_str()))
        .collect();
    let offsets = spread_offsets(&spread_input, config.routing.spread);

    let ctx = RouteContext::new(&placed.blocks, &placed.groups, &config.layout, &config.routing);
    let mut paths = Vec::with_capacity(routable.len());
    for (index, id, conn) in routable {
        let (Some(from), Some(to)) = (
            placed.blocks.get(&conn.from_block),
            placed.blocks.get(&conn.to_block),
        ) else {
            continue;
        };
        let out_idx = resolve_port(&by_id, &conn.from_block, true, &id, conn, &mut warnings);
        let in_idx = resolve_port(&by_id, &conn.to_block, false, &id, conn, &mut warnings);
        let start = port_anchor(from, &from.outputs, out_idx, from.x + from.width, &config.layout);
        let end = port_anchor(to, &to.inputs, in_idx, to.x, &config.layout);

        let spread = offsets.get(&id).copied().unwrap_or(0.0);
        let route = route_connection(&ctx, from, to, start, end, spread);
        let (routed, sources) = splice_waypoints(
            route.points,
            overrides.waypoints_for(&id),
            config.routing.split_inset,
        );
        let points = apply_point_offsets(&routed, overrides.point_offsets(&id));
        let label_anchor = label_anchor(&points);
        paths.push(ConnectionPath {
            id,
            index,
            from: conn.from_block.clone(),
            to: conn.to_block.clone(),
            signal_name: conn.signal_name.clone(),
            signal_type: conn.signal_type,
            kind: route.kind,
            spread_offset: spread,
            routed,
            sources,
            points,
            label_anchor,
        });
    }

    Diagram {
        blocks: placed.blocks,
        groups: placed.groups,
        paths,
        width: placed.width,
        height: placed.height,
        warnings,
        fingerprint: fingerprint(design, overrides),
    }
}

fn resolve_port(
    blocks: &HashMap<&str, &Block>,
    block_id: &str,
    output: bool,
    id: &ConnectionId,
    conn: &Connection,
    warnings: &mut Vec<LayoutWarning>,
) -> usize {
    let Some(block) = blocks.get(block_id) else {
        return 0;
    };
    let ports = if output { &block.outputs } else { &block.inputs };
    match find_port(ports, &conn.signal_name) {
        Some(idx) => idx,
        None => {
            let warning = LayoutWarning::UnknownPort {
                connection: id.clone(),
                block: block_id.to_string(),
                port: conn.signal_name.clone(),
            };
            log::warn!("{warning}");
            warnings.push(warning);
            port_index(ports, &conn.signal_name)
        }
    }
}

/// Hash of everything a diagram is computed from, apart from configuration.
pub fn fingerprint(design: &Design, overrides: &Overrides) -> u64 {
    let mut hasher = DefaultHasher::new();
    design.hash(&mut hasher);
    for (id, (x, y)) in &overrides.blocks {
        id.hash(&mut hasher);
        x.to_bits().hash(&mut hasher);
        y.to_bits().hash(&mut hasher);
    }
    for map in [&overrides.points, &overrides.waypoints] {
        map.len().hash(&mut hasher);
        for (id, list) in map {
            id.hash(&mut hasher);
            list.len().hash(&mut hasher);
            for (x, y) in list {
                x.to_bits().hash(&mut hasher);
                y.to_bits().hash(&mut hasher);
            }
        }
    }
    hasher.finish()
}

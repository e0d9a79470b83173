use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;
use crate::ir::Block;
use crate::overrides::Overrides;

use super::ranking::{Partition, Ranking};
use super::{HardwareGroup, LayoutBlock, PortAnchor, Rect};

#[derive(Debug, Clone)]
pub(super) struct PlacedBlocks {
    pub(super) blocks: BTreeMap<String, LayoutBlock>,
    pub(super) groups: Vec<HardwareGroup>,
    pub(super) width: f32,
    pub(super) height: f32,
}

/// Size of a group's contents and the offset of those contents inside the
/// group's footprint.
struct GroupFootprint {
    width: f32,
    height: f32,
    inset_x: f32,
    inset_y: f32,
}

pub(super) fn port_anchors(
    ports: &[String],
    edge_x: f32,
    top: f32,
    config: &LayoutConfig,
) -> Vec<PortAnchor> {
    ports
        .iter()
        .enumerate()
        .map(|(idx, name)| PortAnchor {
            name: name.clone(),
            x: edge_x,
            y: port_row_center(top, idx, config),
        })
        .collect()
}

pub(super) fn port_row_center(top: f32, index: usize, config: &LayoutConfig) -> f32 {
    top + config.header_height
        + config.block_padding / 2.0
        + (index as f32 + 0.5) * config.port_row_height
}

fn build_layout_block(block: &Block, column: usize, x: f32, y: f32, config: &LayoutConfig) -> LayoutBlock {
    let width = config.block_width;
    let height = config.block_height(block.inputs.len(), block.outputs.len());
    LayoutBlock {
        id: block.id.clone(),
        name: block.name.clone(),
        kind: block.kind.clone(),
        x,
        y,
        width,
        height,
        column,
        host_hardware: block.host().map(str::to_string),
        inputs: port_anchors(&block.inputs, x, y, config),
        outputs: port_anchors(&block.outputs, x + width, y, config),
        pinned: false,
    }
}

fn move_block(block: &mut LayoutBlock, x: f32, y: f32) {
    let dx = x - block.x;
    let dy = y - block.y;
    block.x = x;
    block.y = y;
    for anchor in block.inputs.iter_mut().chain(block.outputs.iter_mut()) {
        anchor.x += dx;
        anchor.y += dy;
    }
}

/// Stacks items column by column: items sharing a column stack vertically
/// with `gap_y`, columns advance by their widest item plus `gap_x`.
/// Returns one origin per item plus the overall extent.
fn stack_columns(
    items: &[(usize, f32, f32)],
    gap_x: f32,
    gap_y: f32,
) -> (Vec<(f32, f32)>, f32, f32) {
    let column_count = items.iter().map(|(column, _, _)| column + 1).max().unwrap_or(0);
    let mut column_widths = vec![0.0f32; column_count];
    for &(column, width, _) in items {
        column_widths[column] = column_widths[column].max(width);
    }
    let mut column_x = vec![0.0f32; column_count];
    let mut cursor = 0.0f32;
    for (column, width) in column_widths.iter().enumerate() {
        column_x[column] = cursor;
        if *width > 0.0 {
            cursor += width + gap_x;
        }
    }

    let mut column_y = vec![0.0f32; column_count];
    let mut origins = Vec::with_capacity(items.len());
    let mut extent_w = 0.0f32;
    let mut extent_h = 0.0f32;
    for &(column, width, height) in items {
        let origin = (column_x[column], column_y[column]);
        column_y[column] += height + gap_y;
        extent_w = extent_w.max(origin.0 + width);
        extent_h = extent_h.max(origin.1 + height);
        origins.push(origin);
    }
    (origins, extent_w, extent_h)
}

pub(super) fn place_blocks(
    blocks: &[&Block],
    partition: &Partition,
    ranking: &Ranking,
    overrides: &Overrides,
    config: &LayoutConfig,
) -> PlacedBlocks {
    let by_id: HashMap<&str, &Block> = blocks.iter().map(|b| (b.id.as_str(), *b)).collect();

    // Inner layout of every group, relative to the group's content origin.
    let mut local_positions: Vec<Vec<(f32, f32)>> = Vec::with_capacity(partition.groups.len());
    let mut footprints: Vec<GroupFootprint> = Vec::with_capacity(partition.groups.len());
    for group in &partition.groups {
        let items: Vec<(usize, f32, f32)> = group
            .members
            .iter()
            .map(|id| {
                let column = ranking.block_columns.get(id).copied().unwrap_or(0);
                let height = by_id
                    .get(id.as_str())
                    .map(|b| config.block_height(b.inputs.len(), b.outputs.len()))
                    .unwrap_or_else(|| config.block_height(0, 0));
                (column, config.block_width, height)
            })
            .collect();
        let (origins, width, height) = stack_columns(&items, config.column_gap, config.block_gap);
        local_positions.push(origins);
        footprints.push(if group.host_name().is_some() {
            let pad = config.group_padding;
            GroupFootprint {
                width: width + pad * 2.0,
                height: height + pad * 2.0 + config.group_label_height,
                inset_x: pad,
                inset_y: pad + config.group_label_height,
            }
        } else {
            GroupFootprint {
                width,
                height,
                inset_x: 0.0,
                inset_y: 0.0,
            }
        });
    }

    // Layout of layouts: the groups themselves tile by group column.
    let group_items: Vec<(usize, f32, f32)> = footprints
        .iter()
        .enumerate()
        .map(|(idx, fp)| {
            let column = ranking.group_columns.get(idx).copied().unwrap_or(0);
            (column, fp.width, fp.height)
        })
        .collect();
    let (group_origins, _, _) = stack_columns(&group_items, config.group_gap_x, config.group_gap_y);

    let mut placed: BTreeMap<String, LayoutBlock> = BTreeMap::new();
    for (group_idx, group) in partition.groups.iter().enumerate() {
        let origin = group_origins[group_idx];
        let footprint = &footprints[group_idx];
        let base_x = config.canvas_margin + origin.0 + footprint.inset_x;
        let base_y = config.canvas_margin + origin.1 + footprint.inset_y;
        for (member_idx, id) in group.members.iter().enumerate() {
            let Some(block) = by_id.get(id.as_str()) else {
                continue;
            };
            let local = local_positions[group_idx][member_idx];
            let column = ranking.block_columns.get(id).copied().unwrap_or(0);
            let mut layout =
                build_layout_block(block, column, base_x + local.0, base_y + local.1, config);
            if let Some((x, y)) = overrides.block_position(id) {
                move_block(&mut layout, x, y);
                layout.pinned = true;
            }
            placed.insert(id.clone(), layout);
        }
    }

    // Group frames are derived after overrides so a dragged block stays
    // inside its frame.
    let mut groups = Vec::new();
    for (group_idx, group) in partition.groups.iter().enumerate() {
        let Some(name) = group.host_name() else {
            continue;
        };
        let mut bounds: Option<Rect> = None;
        for id in &group.members {
            if let Some(block) = placed.get(id) {
                let rect = block.rect();
                bounds = Some(bounds.map_or(rect, |b| b.union(&rect)));
            }
        }
        let Some(bounds) = bounds else {
            continue;
        };
        let pad = config.group_padding;
        groups.push(HardwareGroup {
            name: name.to_string(),
            blocks: group.members.clone(),
            column: ranking.group_columns.get(group_idx).copied().unwrap_or(0),
            x: bounds.x - pad,
            y: bounds.y - pad - config.group_label_height,
            width: bounds.width + pad * 2.0,
            height: bounds.height + pad * 2.0 + config.group_label_height,
        });
    }

    let (width, height) = canvas_size(&placed, &groups, config);
    PlacedBlocks {
        blocks: placed,
        groups,
        width,
        height,
    }
}

fn canvas_size(
    blocks: &BTreeMap<String, LayoutBlock>,
    groups: &[HardwareGroup],
    config: &LayoutConfig,
) -> (f32, f32) {
    let mut max_x: f32 = 0.0;
    let mut max_y: f32 = 0.0;
    for block in blocks.values() {
        max_x = max_x.max(block.x + block.width);
        max_y = max_y.max(block.y + block.height);
    }
    for group in groups {
        max_x = max_x.max(group.x + group.width);
        max_y = max_y.max(group.y + group.height);
    }
    (
        (max_x + config.canvas_margin).max(config.min_canvas_width),
        (max_y + config.canvas_margin).max(config.min_canvas_height),
    )
}

use std::collections::HashMap;

use crate::ir::{Block, Connection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum GroupKey {
    /// Blocks sharing a host.
    Host(String),
    /// A block without a host, alone in its own group.
    Solo(String),
}

#[derive(Debug, Clone)]
pub(super) struct BlockGroup {
    pub(super) key: GroupKey,
    /// Member block ids, in input order.
    pub(super) members: Vec<String>,
}

impl BlockGroup {
    pub(super) fn host_name(&self) -> Option<&str> {
        match &self.key {
            GroupKey::Host(name) => Some(name.as_str()),
            GroupKey::Solo(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct Partition {
    pub(super) groups: Vec<BlockGroup>,
    pub(super) group_of: HashMap<String, usize>,
}

#[derive(Debug, Clone)]
pub(super) struct Ranking {
    pub(super) group_columns: Vec<usize>,
    /// Column of each block inside its own group.
    pub(super) block_columns: HashMap<String, usize>,
}

/// Groups are numbered in order of first appearance in `blocks`.
pub(super) fn partition_blocks(blocks: &[&Block]) -> Partition {
    let mut groups: Vec<BlockGroup> = Vec::new();
    let mut group_of: HashMap<String, usize> = HashMap::new();
    let mut host_index: HashMap<&str, usize> = HashMap::new();

    for block in blocks {
        let idx = match block.host() {
            Some(host) => *host_index.entry(host).or_insert_with(|| {
                groups.push(BlockGroup {
                    key: GroupKey::Host(host.to_string()),
                    members: Vec::new(),
                });
                groups.len() - 1
            }),
            None => {
                groups.push(BlockGroup {
                    key: GroupKey::Solo(block.id.clone()),
                    members: Vec::new(),
                });
                groups.len() - 1
            }
        };
        groups[idx].members.push(block.id.clone());
        group_of.insert(block.id.clone(), idx);
    }

    Partition { groups, group_of }
}

/// Breadth-first frontier layering over nodes `0..node_count`.
///
/// Sources seed column 0. A node joins the next frontier once every one of
/// its predecessors has a column, so no edge ever points to a lower or equal
/// column. Nodes that are never reached (cycles) land one column past the
/// deepest reached layer.
pub(super) fn layer_frontier(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut succs: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for &(from, to) in edges {
        if from == to || from >= node_count || to >= node_count {
            continue;
        }
        if !succs[from].contains(&to) {
            succs[from].push(to);
            preds[to].push(from);
        }
    }

    let mut columns: Vec<Option<usize>> = vec![None; node_count];
    let mut frontier: Vec<usize> = (0..node_count).filter(|&n| preds[n].is_empty()).collect();
    let mut layer = 0usize;
    let mut deepest: Option<usize> = None;

    while !frontier.is_empty() {
        for &node in &frontier {
            columns[node] = Some(layer);
        }
        deepest = Some(layer);
        let mut next: Vec<usize> = Vec::new();
        for &node in &frontier {
            for &succ in &succs[node] {
                if columns[succ].is_some() || next.contains(&succ) {
                    continue;
                }
                if preds[succ].iter().all(|pred| columns[*pred].is_some()) {
                    next.push(succ);
                }
            }
        }
        frontier = next;
        layer += 1;
    }

    let overflow = deepest.map_or(0, |depth| depth + 1);
    columns
        .into_iter()
        .map(|column| column.unwrap_or(overflow))
        .collect()
}

/// `connections` must only reference blocks present in `partition`.
pub(super) fn compute_ranking(partition: &Partition, connections: &[&Connection]) -> Ranking {
    let mut group_edges: Vec<(usize, usize)> = Vec::new();
    let mut inner_edges: Vec<Vec<(String, String)>> = vec![Vec::new(); partition.groups.len()];

    for conn in connections {
        let (Some(&from_group), Some(&to_group)) = (
            partition.group_of.get(&conn.from_block),
            partition.group_of.get(&conn.to_block),
        ) else {
            continue;
        };
        if from_group != to_group {
            group_edges.push((from_group, to_group));
        } else {
            inner_edges[from_group].push((conn.from_block.clone(), conn.to_block.clone()));
        }
    }

    let group_columns = layer_frontier(partition.groups.len(), &group_edges);

    let mut block_columns: HashMap<String, usize> = HashMap::new();
    for (group_idx, group) in partition.groups.iter().enumerate() {
        let local: HashMap<&str, usize> = group
            .members
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.as_str(), idx))
            .collect();
        let edges: Vec<(usize, usize)> = inner_edges[group_idx]
            .iter()
            .filter_map(|(from, to)| Some((*local.get(from.as_str())?, *local.get(to.as_str())?)))
            .collect();
        let columns = layer_frontier(group.members.len(), &edges);
        for (member, column) in group.members.iter().zip(columns) {
            block_columns.insert(member.clone(), column);
        }
    }

    Ranking {
        group_columns,
        block_columns,
    }
}

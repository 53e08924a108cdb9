use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::config::LayoutConfig;
use crate::graph::{Edge, GraphModel};

/// Primary flow axis of the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LeftRight,
    TopDown,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "LR" | "lr" => Some(Self::LeftRight),
            "TD" | "td" | "TB" | "tb" => Some(Self::TopDown),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftRight)
    }
}

impl Default for Direction {
    fn default() -> Self {
        Self::LeftRight
    }
}

/// Side of a node's rectangle used as an edge anchor. Derived from the
/// flow direction alone, never from geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub id: String,
    /// Top-left corner.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rank: usize,
    pub source_side: Side,
    pub target_side: Side,
    /// True when this entry exists only because an edge referenced the id;
    /// the renderer decides whether to draw it.
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub direction: Direction,
    /// Model nodes in input order, then placeholder entries in first
    /// reference order.
    pub nodes: Vec<NodeLayout>,
    pub width: f32,
    pub height: f32,
    index: HashMap<String, usize>,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.index.get(id).map(|idx| &self.nodes[*idx])
    }
}

/// Assigns coordinates to every node of the graph, layered along the
/// primary axis.
///
/// Ranks come from a longest-path pass over a deterministic topological
/// order; in-rank order is refined by median sweeps; coordinates follow
/// directly from rank index and in-rank index over the uniform node
/// footprint. The result is reproducible for a fixed input order.
///
/// Edge endpoints missing from the node set do not abort the layout: each
/// becomes an isolated placeholder entry at its own root rank, and its
/// edges are excluded from ranking.
pub fn compute_layout(graph: &GraphModel, direction: Direction, config: &LayoutConfig) -> Layout {
    let known: HashSet<&str> = graph.nodes.iter().map(|node| node.id.as_str()).collect();

    let mut ids: Vec<String> = graph.nodes.iter().map(|node| node.id.clone()).collect();
    let mut seen_placeholder: HashSet<&str> = HashSet::new();
    for edge in &graph.edges {
        for endpoint in [edge.source.as_str(), edge.target.as_str()] {
            if !known.contains(endpoint) && seen_placeholder.insert(endpoint) {
                tracing::warn!(id = endpoint, "edge references a node missing from the step list");
                ids.push(endpoint.to_string());
            }
        }
    }

    let order: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();

    // Placeholder endpoints stay isolated: only fully-resolved edges rank.
    let rank_edges: Vec<&Edge> = graph
        .edges
        .iter()
        .filter(|edge| known.contains(edge.source.as_str()) && known.contains(edge.target.as_str()))
        .collect();

    let ranks = compute_ranks(&ids, &rank_edges, &order);

    let mut max_rank = 0usize;
    for rank in ranks.values() {
        max_rank = max_rank.max(*rank);
    }
    let mut buckets: Vec<Vec<String>> = vec![Vec::new(); max_rank + 1];
    for id in &ids {
        buckets[*ranks.get(id.as_str()).unwrap_or(&0)].push(id.clone());
    }
    for bucket in &mut buckets {
        bucket.sort_by_key(|id| order.get(id.as_str()).copied().unwrap_or(usize::MAX));
    }

    order_buckets(&mut buckets, &rank_edges, &order, config.order_passes);

    let (source_side, target_side) = anchor_sides(direction);
    let (extent_main, extent_cross) = if direction.is_horizontal() {
        (config.node_width, config.node_height)
    } else {
        (config.node_height, config.node_width)
    };
    let cross_pitch = extent_cross + config.node_gap;
    let widest = buckets.iter().map(|bucket| bucket.len()).max().unwrap_or(0);

    let mut placed: HashMap<&str, (f32, f32, usize)> = HashMap::new();
    for (rank, bucket) in buckets.iter().enumerate() {
        let main = rank as f32 * (extent_main + config.rank_gap);
        // Center each rank on the widest one so short ranks sit mid-flow.
        let offset = (widest - bucket.len()) as f32 * cross_pitch / 2.0;
        for (slot, id) in bucket.iter().enumerate() {
            let cross = offset + slot as f32 * cross_pitch;
            placed.insert(id.as_str(), (main, cross, rank));
        }
    }

    let mut nodes = Vec::with_capacity(ids.len());
    let mut index = HashMap::with_capacity(ids.len());
    for id in &ids {
        let (main, cross, rank) = placed.get(id.as_str()).copied().unwrap_or((0.0, 0.0, 0));
        let (x, y) = if direction.is_horizontal() {
            (main, cross)
        } else {
            (cross, main)
        };
        index.insert(id.clone(), nodes.len());
        nodes.push(NodeLayout {
            id: id.clone(),
            x,
            y,
            width: config.node_width,
            height: config.node_height,
            rank,
            source_side,
            target_side,
            placeholder: !known.contains(id.as_str()),
        });
    }

    let mut width = 0.0f32;
    let mut height = 0.0f32;
    for node in &nodes {
        width = width.max(node.x + node.width);
        height = height.max(node.y + node.height);
    }

    Layout {
        direction,
        nodes,
        width,
        height,
        index,
    }
}

fn anchor_sides(direction: Direction) -> (Side, Side) {
    if direction.is_horizontal() {
        (Side::Right, Side::Left)
    } else {
        (Side::Bottom, Side::Top)
    }
}

/// Longest-path ranks over a deterministic topological order.
///
/// The ready heap is keyed by input order, so ties always resolve the same
/// way. When no node is ready but some remain (a cycle), the earliest
/// remaining node in input order is forced as a source and its incoming
/// edges become back-edges; back-edges do not contribute to ranks.
fn compute_ranks(
    ids: &[String],
    edges: &[&Edge],
    order: &HashMap<&str, usize>,
) -> HashMap<String, usize> {
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut indeg: HashMap<&str, usize> = HashMap::new();
    for id in ids {
        indeg.insert(id.as_str(), 0);
    }
    for edge in edges {
        adj.entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        *indeg.entry(edge.target.as_str()).or_insert(0) += 1;
    }

    let order_key = |id: &str| order.get(id).copied().unwrap_or(usize::MAX);

    let mut ready: BinaryHeap<Reverse<(usize, &str)>> = BinaryHeap::new();
    for id in ids {
        if indeg.get(id.as_str()) == Some(&0) {
            ready.push(Reverse((order_key(id), id.as_str())));
        }
    }

    let mut topo: Vec<&str> = Vec::with_capacity(ids.len());
    let mut processed: HashSet<&str> = HashSet::new();
    loop {
        while let Some(Reverse((_, id))) = ready.pop() {
            if !processed.insert(id) {
                continue;
            }
            topo.push(id);
            if let Some(nexts) = adj.get(id) {
                for next in nexts {
                    if processed.contains(next) {
                        continue;
                    }
                    if let Some(deg) = indeg.get_mut(next) {
                        *deg = deg.saturating_sub(1);
                        if *deg == 0 {
                            ready.push(Reverse((order_key(next), next)));
                        }
                    }
                }
            }
        }

        if topo.len() >= ids.len() {
            break;
        }

        // Cycle: force the earliest remaining node as a source.
        let mut best: Option<(usize, &str)> = None;
        for id in ids {
            if !processed.contains(id.as_str()) {
                let key = order_key(id);
                if best.map_or(true, |(bk, _)| key < bk) {
                    best = Some((key, id.as_str()));
                }
            }
        }
        match best {
            Some((key, id)) => ready.push(Reverse((key, id))),
            None => break,
        }
    }

    let topo_index: HashMap<&str, usize> = topo
        .iter()
        .enumerate()
        .map(|(idx, id)| (*id, idx))
        .collect();

    let mut ranks: HashMap<String, usize> = HashMap::new();
    for id in &topo {
        let rank = *ranks.get(*id).unwrap_or(&0);
        ranks.entry(id.to_string()).or_insert(rank);
        let Some(nexts) = adj.get(id) else {
            continue;
        };
        let from_idx = topo_index[id];
        for next in nexts {
            // Skip back-edges introduced by the cycle fallback.
            if topo_index.get(next).is_none_or(|to_idx| *to_idx <= from_idx) {
                continue;
            }
            let entry = ranks.entry(next.to_string()).or_insert(0);
            *entry = (*entry).max(rank + 1);
        }
    }

    ranks
}

/// Median-of-neighbors sweeps over the rank buckets: a downward pass
/// ordering each rank by incoming-neighbor medians, then an upward pass by
/// outgoing-neighbor medians. Ties keep the current position, then input
/// order.
fn order_buckets(
    buckets: &mut [Vec<String>],
    edges: &[&Edge],
    order: &HashMap<&str, usize>,
    passes: usize,
) {
    if buckets.len() <= 1 {
        return;
    }

    let mut incoming: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        outgoing
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        incoming
            .entry(edge.target.as_str())
            .or_default()
            .push(edge.source.as_str());
    }

    let mut positions: HashMap<String, usize> = HashMap::new();
    let update_positions = |buckets: &[Vec<String>], positions: &mut HashMap<String, usize>| {
        positions.clear();
        for bucket in buckets {
            for (idx, id) in bucket.iter().enumerate() {
                positions.insert(id.clone(), idx);
            }
        }
    };
    update_positions(buckets, &mut positions);

    let sort_bucket = |bucket: &mut Vec<String>,
                       neighbors: &HashMap<&str, Vec<&str>>,
                       positions: &HashMap<String, usize>| {
        let current: HashMap<String, usize> = bucket
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();
        bucket.sort_by(|a, b| {
            let a_score = median_position(a, neighbors, positions, &current);
            let b_score = median_position(b, neighbors, positions, &current);
            match a_score.partial_cmp(&b_score) {
                Some(std::cmp::Ordering::Equal) | None => {
                    let a_pos = current.get(a).copied().unwrap_or(0);
                    let b_pos = current.get(b).copied().unwrap_or(0);
                    a_pos.cmp(&b_pos).then_with(|| {
                        order
                            .get(a.as_str())
                            .copied()
                            .unwrap_or(usize::MAX)
                            .cmp(&order.get(b.as_str()).copied().unwrap_or(usize::MAX))
                    })
                }
                Some(ordering) => ordering,
            }
        });
    };

    for _ in 0..passes.max(1) {
        for rank in 1..buckets.len() {
            if buckets[rank].len() <= 1 {
                continue;
            }
            sort_bucket(&mut buckets[rank], &incoming, &positions);
            update_positions(buckets, &mut positions);
        }
        for rank in (0..buckets.len().saturating_sub(1)).rev() {
            if buckets[rank].len() <= 1 {
                continue;
            }
            sort_bucket(&mut buckets[rank], &outgoing, &positions);
            update_positions(buckets, &mut positions);
        }
    }
}

fn median_position(
    id: &str,
    neighbors: &HashMap<&str, Vec<&str>>,
    positions: &HashMap<String, usize>,
    current: &HashMap<String, usize>,
) -> f32 {
    let Some(list) = neighbors.get(id) else {
        return *current.get(id).unwrap_or(&0) as f32;
    };
    let mut values: Vec<f32> = list
        .iter()
        .filter_map(|neighbor| positions.get(*neighbor).map(|pos| *pos as f32))
        .collect();
    if values.is_empty() {
        return *current.get(id).unwrap_or(&0) as f32;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) * 0.5
    }
}

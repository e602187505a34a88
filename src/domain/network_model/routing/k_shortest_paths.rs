use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::domain::network_model::topology::topology::NetworkTopology;
use crate::domain::network_model::utils::canonical::LinkKey;
use crate::domain::network_model::utils::id::NodeIndex;

#[derive(Debug, Clone, Copy, PartialEq)]
struct QueueEntry {
    distance: f64,
    node: NodeIndex,
}

impl Eq for QueueEntry {}

// Reversed so that `BinaryHeap` pops the closest node first. Equal distances pop the lower index.
impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.distance.total_cmp(&self.distance).then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra on link length, ignoring the given links and nodes.
///
/// Returns the node sequence from `source` to `target` and its length in km.
pub fn shortest_path(
    topology: &NetworkTopology,
    source: NodeIndex,
    target: NodeIndex,
    removed_links: &HashSet<LinkKey>,
    removed_nodes: &HashSet<NodeIndex>,
) -> Option<(Vec<NodeIndex>, f64)> {
    let node_count = topology.node_count();
    if source >= node_count || target >= node_count || removed_nodes.contains(&source) {
        return None;
    }

    let mut distance = vec![f64::INFINITY; node_count];
    let mut previous: Vec<Option<NodeIndex>> = vec![None; node_count];
    let mut heap = BinaryHeap::new();

    distance[source] = 0.0;
    heap.push(QueueEntry { distance: 0.0, node: source });

    while let Some(QueueEntry { distance: current, node }) = heap.pop() {
        if node == target {
            break;
        }
        if current > distance[node] {
            continue;
        }

        for &neighbor in topology.neighbors(node) {
            let key = LinkKey::new(node, neighbor);
            if removed_nodes.contains(&neighbor) || removed_links.contains(&key) {
                continue;
            }

            let Some(link) = topology.link(key) else {
                continue;
            };

            let candidate = current + link.length_km;
            if candidate < distance[neighbor] {
                distance[neighbor] = candidate;
                previous[neighbor] = Some(node);
                heap.push(QueueEntry { distance: candidate, node: neighbor });
            }
        }
    }

    if distance[target].is_infinite() {
        return None;
    }

    let mut path = vec![target];
    let mut current = target;
    while let Some(prev) = previous[current] {
        path.push(prev);
        current = prev;
    }
    path.reverse();

    Some((path, distance[target]))
}

/// Up to `k` loopless paths from `source` to `target`, shortest first (Yen's algorithm).
///
/// Paths of equal length are ordered by hop count, then by node sequence.
pub fn k_shortest_paths(topology: &NetworkTopology, source: NodeIndex, target: NodeIndex, k: usize) -> Vec<Vec<NodeIndex>> {
    if k == 0 || source == target {
        return Vec::new();
    }

    let Some((first, _)) = shortest_path(topology, source, target, &HashSet::new(), &HashSet::new()) else {
        return Vec::new();
    };

    let mut accepted: Vec<Vec<NodeIndex>> = vec![first];
    let mut candidates: Vec<(f64, Vec<NodeIndex>)> = Vec::new();

    while accepted.len() < k {
        let Some(last) = accepted.last().cloned() else {
            break;
        };

        for spur_index in 0..last.len() - 1 {
            let spur_node = last[spur_index];
            let root = &last[..=spur_index];

            let removed_links: HashSet<LinkKey> = accepted
                .iter()
                .filter(|path| path.len() > spur_index + 1 && &path[..=spur_index] == root)
                .map(|path| LinkKey::new(path[spur_index], path[spur_index + 1]))
                .collect();
            let removed_nodes: HashSet<NodeIndex> = root[..spur_index].iter().copied().collect();

            let Some((spur_path, _)) = shortest_path(topology, spur_node, target, &removed_links, &removed_nodes) else {
                continue;
            };

            let mut total: Vec<NodeIndex> = root[..spur_index].to_vec();
            total.extend(spur_path);

            if !accepted.contains(&total) && !candidates.iter().any(|(_, path)| *path == total) {
                candidates.push((topology.path_length(&total), total));
            }
        }

        let best = candidates
            .iter()
            .enumerate()
            .min_by(|(_, (a_len, a)), (_, (b_len, b))| a_len.total_cmp(b_len).then_with(|| a.len().cmp(&b.len())).then_with(|| a.cmp(b)))
            .map(|(index, _)| index);

        match best {
            Some(index) => accepted.push(candidates.swap_remove(index).1),
            None => break,
        }
    }

    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> NetworkTopology {
        // A-B-C-D-A ring plus a long chord A-C.
        NetworkTopology::from_edges("ring", &[("A", "B", 100.0), ("B", "C", 100.0), ("C", "D", 150.0), ("D", "A", 100.0), ("A", "C", 400.0)]).unwrap()
    }

    #[test]
    fn dijkstra_finds_shortest() {
        let topology = ring();
        let (path, length) = shortest_path(&topology, 0, 2, &HashSet::new(), &HashSet::new()).unwrap();
        assert_eq!(path, vec![0, 1, 2]);
        assert_eq!(length, 200.0);
    }

    #[test]
    fn yen_orders_by_length() {
        let topology = ring();
        let paths = k_shortest_paths(&topology, 0, 2, 5);

        let a = topology.node_index("A").unwrap();
        let c = topology.node_index("C").unwrap();
        let d = topology.node_index("D").unwrap();
        let b = topology.node_index("B").unwrap();

        assert_eq!(paths, vec![vec![a, b, c], vec![a, d, c], vec![a, c]]);
    }
}

use serde::Serialize;
use std::fmt;

use crate::domain::network_model::utils::id::NodeIndex;

/// An unordered pair of nodes.
///
/// `UnorderedPair::new(a, b) == UnorderedPair::new(b, a)` always holds, so the pair can be used
/// as the single lookup key for undirected links and for lightpath endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct UnorderedPair {
    pub low: NodeIndex,
    pub high: NodeIndex,
}

impl UnorderedPair {
    pub fn new(a: NodeIndex, b: NodeIndex) -> Self {
        if a <= b { UnorderedPair { low: a, high: b } } else { UnorderedPair { low: b, high: a } }
    }

    pub fn contains(&self, node: NodeIndex) -> bool {
        self.low == node || self.high == node
    }
}

impl fmt::Display for UnorderedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.low, self.high)
    }
}

/// Key of a physical link. Links are undirected, both directions share one slot matrix.
pub type LinkKey = UnorderedPair;

/// Key of the endpoints of a request or lightpath.
pub type NodePair = UnorderedPair;

/// Returns the normalized representation of a path: the lexicographically smaller of the
/// path and its reverse. `[A, B, C]` and `[C, B, A]` map to the same key.
pub fn canonical_path(path: &[NodeIndex]) -> Vec<NodeIndex> {
    let reversed: Vec<NodeIndex> = path.iter().rev().copied().collect();

    if reversed.as_slice() < path { reversed } else { path.to_vec() }
}

/// Iterates over the link keys traversed by a path, in path order.
pub fn path_links(path: &[NodeIndex]) -> impl Iterator<Item = LinkKey> + '_ {
    path.windows(2).map(|hop| LinkKey::new(hop[0], hop[1]))
}

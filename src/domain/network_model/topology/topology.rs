use bimap::BiMap;
use std::collections::BTreeMap;
use union_find::{QuickUnionUf, UnionBySize, UnionFind};

use crate::api::topology_dto::{LinkDto, TopologyDto};
use crate::domain::network_model::topology::fiber::FiberProperties;
use crate::domain::network_model::utils::canonical::{LinkKey, path_links};
use crate::domain::network_model::utils::id::{NodeId, NodeIndex};
use crate::error::{Error, Result};

/// Span length used when a link does not specify one, in km.
pub const DEFAULT_SPAN_LENGTH_KM: f64 = 100.0;

/// A physical, undirected fiber link.
#[derive(Debug, Clone)]
pub struct Link {
    pub key: LinkKey,
    pub length_km: f64,
    pub span_length_km: f64,
    pub fiber: FiberProperties,
}

impl Link {
    /// Number of amplified spans (fractional for links shorter than a span).
    pub fn num_spans(&self) -> f64 {
        self.length_km / self.span_length_km
    }
}

/// The physical network graph. Immutable once loaded.
///
/// Node names are mapped to dense indices on load; the rest of the model only works with
/// `NodeIndex` values and converts back to names for output.
#[derive(Debug, Clone)]
pub struct NetworkTopology {
    name: String,

    /// Node name <-> dense index.
    nodes: BiMap<NodeId, NodeIndex>,

    /// All links, keyed by their unordered endpoint pair.
    links: BTreeMap<LinkKey, Link>,

    /// Sorted neighbor lists, indexed by `NodeIndex`.
    adjacency: Vec<Vec<NodeIndex>>,

    max_link_length: f64,
    max_span_count: f64,
}

impl TryFrom<&TopologyDto> for NetworkTopology {
    type Error = Error;

    fn try_from(dto: &TopologyDto) -> Result<Self> {
        if dto.links.is_empty() {
            return Err(Error::TopologyConstructionError("topology contains no links".to_string()));
        }

        let mut nodes: BiMap<NodeId, NodeIndex> = BiMap::new();
        let mut links: BTreeMap<LinkKey, Link> = BTreeMap::new();

        for link_dto in &dto.links {
            let source = Self::register_node(&mut nodes, &link_dto.source);
            let destination = Self::register_node(&mut nodes, &link_dto.destination);

            let link = Self::build_link(link_dto, source, destination)?;

            if links.contains_key(&link.key) {
                return Err(Error::TopologyConstructionError(format!(
                    "duplicate link between '{}' and '{}'",
                    link_dto.source, link_dto.destination
                )));
            }

            links.insert(link.key, link);
        }

        let mut adjacency: Vec<Vec<NodeIndex>> = vec![Vec::new(); nodes.len()];
        for key in links.keys() {
            adjacency[key.low].push(key.high);
            adjacency[key.high].push(key.low);
        }
        for neighbors in adjacency.iter_mut() {
            neighbors.sort_unstable();
        }

        let max_link_length = links.values().map(|l| l.length_km).fold(0.0, f64::max);
        let max_span_count = links.values().map(|l| l.num_spans()).fold(0.0, f64::max);

        let topology = NetworkTopology {
            name: dto.name.clone().unwrap_or_else(|| "unnamed".to_string()),
            nodes,
            links,
            adjacency,
            max_link_length,
            max_span_count,
        };

        if !topology.is_connected() {
            log::warn!("TopologyNotConnected: Topology '{}' has unreachable node pairs. Requests between them will be blocked.", topology.name);
        }

        log::info!("Topology '{}' loaded: {} nodes, {} links.", topology.name, topology.node_count(), topology.link_count());

        Ok(topology)
    }
}

impl NetworkTopology {
    /// Builds a topology from `(source, destination, length_km)` triples with default fiber parameters.
    pub fn from_edges(name: &str, edges: &[(&str, &str, f64)]) -> Result<Self> {
        let dto = TopologyDto {
            name: Some(name.to_string()),
            links: edges
                .iter()
                .map(|(source, destination, length)| LinkDto {
                    source: source.to_string(),
                    destination: destination.to_string(),
                    length: *length,
                    span_length: None,
                    fiber: None,
                })
                .collect(),
        };

        NetworkTopology::try_from(&dto)
    }

    fn register_node(nodes: &mut BiMap<NodeId, NodeIndex>, name: &str) -> NodeIndex {
        let node_id = NodeId::new(name);

        if let Some(index) = nodes.get_by_left(&node_id) {
            return *index;
        }

        let index = nodes.len();
        nodes.insert(node_id, index);
        index
    }

    fn build_link(dto: &LinkDto, source: NodeIndex, destination: NodeIndex) -> Result<Link> {
        if source == destination {
            return Err(Error::TopologyConstructionError(format!("self loop on node '{}'", dto.source)));
        }

        if !(dto.length > 0.0) {
            return Err(Error::TopologyConstructionError(format!(
                "link '{}' -- '{}' has non-positive length {}",
                dto.source, dto.destination, dto.length
            )));
        }

        let span_length_km = dto.span_length.unwrap_or(DEFAULT_SPAN_LENGTH_KM);
        if !(span_length_km > 0.0) {
            return Err(Error::TopologyConstructionError(format!(
                "link '{}' -- '{}' has non-positive span length {}",
                dto.source, dto.destination, span_length_km
            )));
        }

        Ok(Link {
            key: LinkKey::new(source, destination),
            length_km: dto.length,
            span_length_km,
            fiber: FiberProperties::with_overrides(dto.fiber.as_ref()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.nodes.get_by_left(&NodeId::new(name)).copied()
    }

    pub fn node_name(&self, index: NodeIndex) -> Option<&NodeId> {
        self.nodes.get_by_right(&index)
    }

    /// Node names of a path, for logging and output.
    pub fn path_names(&self, path: &[NodeIndex]) -> Vec<String> {
        path.iter().map(|index| self.node_name(*index).map(|id| id.to_string()).unwrap_or_else(|| format!("#{}", index))).collect()
    }

    pub fn neighbors(&self, node: NodeIndex) -> &[NodeIndex] {
        self.adjacency.get(node).map(|n| n.as_slice()).unwrap_or(&[])
    }

    pub fn link(&self, key: LinkKey) -> Option<&Link> {
        self.links.get(&key)
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn link_keys(&self) -> impl Iterator<Item = LinkKey> + '_ {
        self.links.keys().copied()
    }

    /// Physical length of a path in km. Hops without a link contribute nothing.
    pub fn path_length(&self, path: &[NodeIndex]) -> f64 {
        path_links(path).filter_map(|key| self.links.get(&key)).map(|link| link.length_km).sum()
    }

    pub fn max_link_length(&self) -> f64 {
        self.max_link_length
    }

    pub fn max_span_count(&self) -> f64 {
        self.max_span_count
    }

    /// Returns `true` if every node can reach every other node.
    pub fn is_connected(&self) -> bool {
        if self.node_count() <= 1 {
            return true;
        }

        let mut components = QuickUnionUf::<UnionBySize>::new(self.node_count());
        for key in self.links.keys() {
            components.union(key.low, key.high);
        }

        let root = components.find(0);
        (1..self.node_count()).all(|node| components.find(node) == root)
    }
}

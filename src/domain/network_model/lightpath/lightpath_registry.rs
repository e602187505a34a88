use std::collections::{BTreeMap, HashMap};

use crate::domain::network_model::lightpath::lightpath::Lightpath;
use crate::domain::network_model::utils::canonical::NodePair;
use crate::domain::network_model::utils::id::LightpathId;
use crate::error::{Error, Result};

/// All established lightpaths, grouped by the unordered pair of their endpoints.
#[derive(Debug, Clone)]
pub struct LightpathRegistry {
    lightpaths: HashMap<NodePair, BTreeMap<LightpathId, Lightpath>>,
    next_id: u64,
}

impl Default for LightpathRegistry {
    fn default() -> Self {
        LightpathRegistry::new()
    }
}

impl LightpathRegistry {
    pub fn new() -> Self {
        LightpathRegistry { lightpaths: HashMap::new(), next_id: 1 }
    }

    /// Hands out a fresh, strictly positive id. Ids are never reused within a run.
    pub fn next_id(&mut self) -> LightpathId {
        let id = LightpathId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, lightpath: Lightpath) -> Result<()> {
        let group = self.lightpaths.entry(lightpath.endpoints).or_default();

        if group.contains_key(&lightpath.id) {
            return Err(Error::InvariantViolation(format!("{} registered twice", lightpath.id)));
        }

        group.insert(lightpath.id, lightpath);
        Ok(())
    }

    pub fn get(&self, pair: NodePair, id: LightpathId) -> Option<&Lightpath> {
        self.lightpaths.get(&pair).and_then(|group| group.get(&id))
    }

    pub fn get_mut(&mut self, pair: NodePair, id: LightpathId) -> Option<&mut Lightpath> {
        self.lightpaths.get_mut(&pair).and_then(|group| group.get_mut(&id))
    }

    pub fn remove(&mut self, pair: NodePair, id: LightpathId) -> Option<Lightpath> {
        let group = self.lightpaths.get_mut(&pair)?;
        let removed = group.remove(&id);

        if group.is_empty() {
            self.lightpaths.remove(&pair);
        }

        removed
    }

    /// Lightpaths between the pair, ascending by id.
    pub fn lightpaths_between(&self, pair: NodePair) -> impl Iterator<Item = &Lightpath> {
        self.lightpaths.get(&pair).into_iter().flat_map(|group| group.values())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lightpath> {
        self.lightpaths.values().flat_map(|group| group.values())
    }

    pub fn len(&self) -> usize {
        self.lightpaths.values().map(|group| group.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lightpaths.is_empty()
    }
}

use std::collections::BTreeMap;

use crate::domain::network_model::lightpath::lightpath::Lightpath;
use crate::domain::network_model::lightpath::lightpath_registry::LightpathRegistry;
use crate::domain::network_model::utils::canonical::{NodePair, canonical_path};
use crate::domain::network_model::utils::id::{LightpathId, NodeIndex, RequestId};
use crate::error::{Error, Result};

/// Bandwidth portions a request would take from existing lightpaths.
///
/// A plan is only a proposal; nothing changes until `apply_plan` runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroomingPlan {
    pub endpoints: NodePair,

    /// Normalized path shared by all lightpaths of the plan.
    pub path: Vec<NodeIndex>,

    /// Lightpath and bandwidth taken from it, in consumption order.
    pub portions: Vec<(LightpathId, i64)>,

    /// Bandwidth the plan leaves uncovered.
    pub residual_bandwidth: i64,
}

impl GroomingPlan {
    pub fn groomed_bandwidth(&self) -> i64 {
        self.portions.iter().map(|(_, bandwidth)| bandwidth).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroomingOutcome {
    /// Existing lightpaths cover the whole demand.
    Full(GroomingPlan),
    /// Existing lightpaths cover part of it; `residual_bandwidth` needs a new lightpath.
    Partial(GroomingPlan),
    NotGroomed,
}

/// What a release gave back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    pub returned_bandwidth: i64,

    /// Lightpaths that no longer carry any request. Their spectrum can be freed.
    pub emptied: Vec<LightpathId>,
}

/// Looks for residual capacity between the request's endpoints.
///
/// Lightpaths are grouped by normalized path, so a path and its reverse form one group. The
/// group with the most remaining bandwidth wins (first group on ties) and is consumed in
/// ascending lightpath id order.
pub fn end_to_end_grooming(registry: &LightpathRegistry, endpoints: NodePair, bandwidth: i64) -> GroomingOutcome {
    let mut groups: BTreeMap<Vec<NodeIndex>, Vec<&Lightpath>> = BTreeMap::new();
    for lightpath in registry.lightpaths_between(endpoints) {
        groups.entry(canonical_path(&lightpath.path)).or_default().push(lightpath);
    }

    let best = groups.into_iter().fold(None::<(i64, Vec<NodeIndex>, Vec<&Lightpath>)>, |best, (path, members)| {
        let total: i64 = members.iter().map(|lp| lp.remaining_bandwidth).sum();
        match best {
            Some((best_total, _, _)) if best_total >= total => best,
            _ => Some((total, path, members)),
        }
    });

    let Some((total, path, members)) = best else {
        return GroomingOutcome::NotGroomed;
    };
    if total <= 0 {
        return GroomingOutcome::NotGroomed;
    }

    let mut portions = Vec::new();
    let mut residual = bandwidth;

    for lightpath in members {
        if residual == 0 {
            break;
        }
        let take = residual.min(lightpath.remaining_bandwidth);
        if take > 0 {
            portions.push((lightpath.id, take));
            residual -= take;
        }
    }

    let plan = GroomingPlan { endpoints, path, portions, residual_bandwidth: residual };

    if residual == 0 { GroomingOutcome::Full(plan) } else { GroomingOutcome::Partial(plan) }
}

/// Reserves the plan's portions for `request_id`.
pub fn apply_plan(registry: &mut LightpathRegistry, plan: &GroomingPlan, request_id: RequestId) -> Result<()> {
    for (lightpath_id, bandwidth) in &plan.portions {
        let lightpath = registry
            .get_mut(plan.endpoints, *lightpath_id)
            .ok_or_else(|| Error::InvariantViolation(format!("grooming plan references missing {}", lightpath_id)))?;
        lightpath.assign(request_id, *bandwidth)?;
    }

    log::debug!("GroomingApplied: {} took {} Gbps from {} lightpath(s).", request_id, plan.groomed_bandwidth(), plan.portions.len());

    Ok(())
}

/// Removes `request_id` from every lightpath it was recorded on.
pub fn release_service(registry: &mut LightpathRegistry, endpoints: NodePair, request_id: RequestId, lightpath_ids: &[LightpathId]) -> Result<ReleaseReport> {
    let mut report = ReleaseReport::default();

    for lightpath_id in lightpath_ids {
        let lightpath = registry
            .get_mut(endpoints, *lightpath_id)
            .ok_or_else(|| Error::InvariantViolation(format!("{} is recorded on unknown {}", request_id, lightpath_id)))?;

        report.returned_bandwidth += lightpath.release(request_id)?;

        if lightpath.is_empty() {
            report.emptied.push(*lightpath_id);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::network_model::request::modulation::ModulationFormat;
    use crate::domain::network_model::spectrum::band::SpectrumBand;
    use crate::domain::network_model::spectrum::placement::Placement;

    fn add(registry: &mut LightpathRegistry, path: Vec<NodeIndex>, capacity: i64, used: i64) -> LightpathId {
        let id = registry.next_id();
        let mut lp = Lightpath::new(id, path, Placement::new(SpectrumBand::C, 0, 0, 1, 0), ModulationFormat::Qpsk, capacity, 0.0, 0.0);
        if used > 0 {
            lp.assign(RequestId(1000 + id.0), used).unwrap();
        }
        registry.insert(lp).unwrap();
        id
    }

    #[test]
    fn picks_group_with_most_room() {
        let mut registry = LightpathRegistry::new();
        let short = add(&mut registry, vec![0, 2], 100, 90);
        let a = add(&mut registry, vec![0, 1, 2], 100, 80);
        let b = add(&mut registry, vec![2, 1, 0], 100, 70);

        let GroomingOutcome::Full(plan) = end_to_end_grooming(&registry, NodePair::new(0, 2), 40) else {
            panic!("expected full grooming");
        };

        assert_eq!(plan.path, vec![0, 1, 2]);
        assert_eq!(plan.portions, vec![(a, 20), (b, 20)]);
        assert!(plan.portions.iter().all(|(id, _)| *id != short));
    }

    #[test]
    fn no_room_is_not_groomed() {
        let mut registry = LightpathRegistry::new();
        add(&mut registry, vec![0, 1], 100, 100);

        assert_eq!(end_to_end_grooming(&registry, NodePair::new(0, 1), 10), GroomingOutcome::NotGroomed);
        assert_eq!(end_to_end_grooming(&registry, NodePair::new(1, 2), 10), GroomingOutcome::NotGroomed);
    }
}

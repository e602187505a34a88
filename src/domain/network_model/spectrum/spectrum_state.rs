use std::collections::HashMap;

use crate::domain::network_model::spectrum::band::{BandPlan, SpectrumBand};
use crate::domain::network_model::spectrum::link_spectrum::{FREE_SLOT, LinkSpectrum};
use crate::domain::network_model::spectrum::placement::Placement;
use crate::domain::network_model::spectrum::slot_range::SlotRange;
use crate::domain::network_model::topology::topology::NetworkTopology;
use crate::domain::network_model::utils::canonical::{LinkKey, path_links};
use crate::domain::network_model::utils::id::{LightpathId, NodeIndex};
use crate::error::{Error, Result};

/// Slot occupancy of every link in the network.
///
/// This is the only place where slot cells are written. Writes check the target cells first
/// and fail with `InvariantViolation` instead of overwriting foreign slots. There is no
/// implicit rollback across links: callers undo their own partial work.
#[derive(Debug, Clone)]
pub struct SpectrumState {
    links: HashMap<LinkKey, LinkSpectrum>,
    band_plan: BandPlan,
    cores_per_link: usize,
}

impl SpectrumState {
    pub fn new(topology: &NetworkTopology, band_plan: BandPlan, cores_per_link: usize) -> Self {
        let links = topology.link_keys().map(|key| (key, LinkSpectrum::new(&band_plan, cores_per_link))).collect();

        SpectrumState { links, band_plan, cores_per_link }
    }

    pub fn band_plan(&self) -> &BandPlan {
        &self.band_plan
    }

    pub fn cores_per_link(&self) -> usize {
        self.cores_per_link
    }

    pub fn link(&self, key: LinkKey) -> Option<&LinkSpectrum> {
        self.links.get(&key)
    }

    pub fn links(&self) -> impl Iterator<Item = (&LinkKey, &LinkSpectrum)> {
        self.links.iter()
    }

    fn expect_link(&self, key: LinkKey) -> Result<&LinkSpectrum> {
        self.links.get(&key).ok_or_else(|| Error::InvariantViolation(format!("link {} is not part of the spectrum state", key)))
    }

    fn expect_core_mut(&mut self, key: LinkKey, band: SpectrumBand, core: usize) -> Result<&mut Vec<i64>> {
        self.links
            .get_mut(&key)
            .and_then(|link| link.core_mut(band, core))
            .ok_or_else(|| Error::InvariantViolation(format!("link {} has no core {} in band {}", key, core, band)))
    }

    /// Marks `range` on one link core as data slots of `lightpath_id`. Every slot must be free.
    pub fn mark_slots(&mut self, link: LinkKey, band: SpectrumBand, core: usize, range: SlotRange, lightpath_id: LightpathId) -> Result<()> {
        self.write_free_cells(link, band, core, range, lightpath_id.slot_value())
    }

    /// Marks `range` on one link core as guard band of `lightpath_id`. Every slot must be free.
    pub fn mark_guard_band(&mut self, link: LinkKey, band: SpectrumBand, core: usize, range: SlotRange, lightpath_id: LightpathId) -> Result<()> {
        self.write_free_cells(link, band, core, range, lightpath_id.guard_value())
    }

    fn write_free_cells(&mut self, link: LinkKey, band: SpectrumBand, core: usize, range: SlotRange, value: i64) -> Result<()> {
        let slots = self.expect_core_mut(link, band, core)?;

        if range.end >= slots.len() {
            return Err(Error::InvariantViolation(format!("slot range {} exceeds {} slots on link {}", range, slots.len(), link)));
        }

        if let Some(taken) = range.indices().find(|i| slots[*i] != FREE_SLOT) {
            return Err(Error::InvariantViolation(format!(
                "slot {} on link {} core {} band {} is already held by {}",
                taken, link, core, band, slots[taken]
            )));
        }

        for index in range.indices() {
            slots[index] = value;
        }

        Ok(())
    }

    /// Frees `range` on one link core regardless of its current owner.
    pub fn clear_slots(&mut self, link: LinkKey, band: SpectrumBand, core: usize, range: SlotRange) -> Result<()> {
        let slots = self.expect_core_mut(link, band, core)?;

        if range.end >= slots.len() {
            return Err(Error::InvariantViolation(format!("slot range {} exceeds {} slots on link {}", range, slots.len(), link)));
        }

        for index in range.indices() {
            slots[index] = FREE_SLOT;
        }

        Ok(())
    }

    /// Free slot indices per core of one link.
    pub fn free_slots(&self, link: LinkKey, band: SpectrumBand) -> Result<Vec<Vec<usize>>> {
        Ok(self.expect_link(link)?.free_slots(band))
    }

    /// Every window of exactly `slots_needed` free slots, per core of one link.
    pub fn free_contiguous_blocks(&self, link: LinkKey, band: SpectrumBand, slots_needed: usize) -> Result<Vec<Vec<SlotRange>>> {
        Ok(self.expect_link(link)?.free_contiguous_blocks(band, slots_needed))
    }

    /// Slot-wise AND of the free cells of `core` over every link of `path`.
    ///
    /// Returns `None` if the path uses a link unknown to the state or the band does not exist.
    pub fn path_free_mask(&self, path: &[NodeIndex], band: SpectrumBand, core: usize) -> Option<Vec<bool>> {
        let slots_in_band = self.band_plan.slots_in(band)?;
        let mut mask = vec![true; slots_in_band];

        for key in path_links(path) {
            let slots = self.links.get(&key)?.core(band, core)?;
            for (free, value) in mask.iter_mut().zip(slots.iter()) {
                *free &= *value == FREE_SLOT;
            }
        }

        Some(mask)
    }

    /// Share of occupied slots (data and guard) over all links, bands and cores of a path.
    pub fn path_occupancy(&self, path: &[NodeIndex]) -> f64 {
        let (taken, total) = path_links(path)
            .filter_map(|key| self.links.get(&key))
            .map(|link| link.occupancy())
            .fold((0, 0), |(taken, total), (t, n)| (taken + t, total + n));

        if total == 0 { 0.0 } else { taken as f64 / total as f64 }
    }

    /// Writes a lightpath onto every link of its path.
    ///
    /// All links are checked before the first write, so a failing call leaves the state untouched.
    pub fn allocate_lightpath(&mut self, path: &[NodeIndex], placement: &Placement, lightpath_id: LightpathId) -> Result<()> {
        for key in path_links(path) {
            if !self.expect_link(key)?.is_free(placement.band, placement.core, placement.occupied_range()) {
                return Err(Error::InvariantViolation(format!(
                    "placement {} core {} band {} for {} is not free on link {}",
                    placement.slots, placement.core, placement.band, lightpath_id, key
                )));
            }
        }

        for key in path_links(path) {
            self.mark_slots(key, placement.band, placement.core, placement.slots, lightpath_id)?;
            if let Some(guard) = placement.guard_range() {
                self.mark_guard_band(key, placement.band, placement.core, guard, lightpath_id)?;
            }
        }

        log::debug!("SpectrumAllocate: {} on core {} band {} slots {}", lightpath_id, placement.core, placement.band, placement.slots);

        Ok(())
    }

    /// Removes a lightpath from every link of its path.
    ///
    /// The cells must hold exactly this lightpath's data and guard values; anything else means
    /// the bookkeeping diverged and is reported as `InvariantViolation`.
    pub fn release_lightpath(&mut self, path: &[NodeIndex], placement: &Placement, lightpath_id: LightpathId) -> Result<()> {
        for key in path_links(path) {
            let slots = self
                .expect_link(key)?
                .core(placement.band, placement.core)
                .ok_or_else(|| Error::InvariantViolation(format!("link {} has no core {} in band {}", key, placement.core, placement.band)))?;

            let data_ok = placement.slots.indices().all(|i| slots.get(i) == Some(&lightpath_id.slot_value()));
            let guard_ok = placement.guard_range().is_none_or(|guard| guard.indices().all(|i| slots.get(i) == Some(&lightpath_id.guard_value())));

            if !data_ok || !guard_ok {
                return Err(Error::InvariantViolation(format!(
                    "release of {} found foreign or free cells on link {} core {} slots {}",
                    lightpath_id,
                    key,
                    placement.core,
                    placement.occupied_range()
                )));
            }
        }

        for key in path_links(path) {
            self.clear_slots(key, placement.band, placement.core, placement.occupied_range())?;
        }

        log::debug!("SpectrumRelease: {} freed core {} band {} slots {}", lightpath_id, placement.core, placement.band, placement.occupied_range());

        Ok(())
    }
}

use std::collections::BTreeMap;

use crate::domain::network_model::spectrum::band::{BandPlan, SpectrumBand};
use crate::domain::network_model::spectrum::slot_range::{SlotRange, free_runs};
use crate::domain::network_model::utils::id::LightpathId;

/// Value of an unoccupied slot.
pub const FREE_SLOT: i64 = 0;

/// The slot matrix of one link: per band a `cores x slots` grid.
///
/// Cell values: `0` free, `+id` data slot of lightpath `id`, `-id` guard band of lightpath `id`.
/// Only the spectrum module can write cells; everything else reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpectrum {
    cores: BTreeMap<SpectrumBand, Vec<Vec<i64>>>,
}

/// An occupied channel found on a core: the owning lightpath and its data slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TakenChannel {
    pub lightpath_id: LightpathId,
    pub slots: SlotRange,
}

impl LinkSpectrum {
    pub fn new(band_plan: &BandPlan, cores_per_link: usize) -> Self {
        let cores = band_plan
            .bands()
            .map(|band| {
                let slots = band_plan.slots_in(band).unwrap_or(0);
                (band, vec![vec![FREE_SLOT; slots]; cores_per_link])
            })
            .collect();

        LinkSpectrum { cores }
    }

    pub fn num_cores(&self) -> usize {
        self.cores.values().next().map(|cores| cores.len()).unwrap_or(0)
    }

    pub fn core(&self, band: SpectrumBand, core: usize) -> Option<&[i64]> {
        self.cores.get(&band).and_then(|cores| cores.get(core)).map(|slots| slots.as_slice())
    }

    pub(super) fn core_mut(&mut self, band: SpectrumBand, core: usize) -> Option<&mut Vec<i64>> {
        self.cores.get_mut(&band).and_then(|cores| cores.get_mut(core))
    }

    /// Returns `true` if every slot of `range` exists and is free on the given core.
    pub fn is_free(&self, band: SpectrumBand, core: usize, range: SlotRange) -> bool {
        match self.core(band, core) {
            Some(slots) if range.end < slots.len() => slots[range.start..=range.end].iter().all(|v| *v == FREE_SLOT),
            _ => false,
        }
    }

    /// Free slot indices, per core.
    pub fn free_slots(&self, band: SpectrumBand) -> Vec<Vec<usize>> {
        self.cores
            .get(&band)
            .map(|cores| {
                cores.iter().map(|slots| slots.iter().enumerate().filter(|(_, v)| **v == FREE_SLOT).map(|(i, _)| i).collect()).collect()
            })
            .unwrap_or_default()
    }

    /// Every window of exactly `slots_needed` consecutive free slots, per core.
    /// Windows overlap: a free run of length 4 holds three windows of length 2.
    pub fn free_contiguous_blocks(&self, band: SpectrumBand, slots_needed: usize) -> Vec<Vec<SlotRange>> {
        let Some(cores) = self.cores.get(&band) else {
            return Vec::new();
        };

        cores
            .iter()
            .map(|slots| {
                let mask: Vec<bool> = slots.iter().map(|v| *v == FREE_SLOT).collect();
                free_runs(&mask)
                    .into_iter()
                    .filter(|run| slots_needed > 0 && run.len() >= slots_needed)
                    .flat_map(|run| (run.start..=run.end + 1 - slots_needed).map(move |start| SlotRange::with_len(start, slots_needed)))
                    .collect()
            })
            .collect()
    }

    /// Channels currently carried on a core, in slot order. Guard band slots are not part of a channel.
    pub fn taken_channels(&self, band: SpectrumBand, core: usize) -> Vec<TakenChannel> {
        let Some(slots) = self.core(band, core) else {
            return Vec::new();
        };

        let mut channels: Vec<TakenChannel> = Vec::new();
        for (index, value) in slots.iter().enumerate() {
            if *value <= FREE_SLOT {
                continue;
            }

            match channels.last_mut() {
                Some(last) if last.lightpath_id.slot_value() == *value && last.slots.end + 1 == index => last.slots.end = index,
                _ => channels.push(TakenChannel { lightpath_id: LightpathId(*value as u64), slots: SlotRange { start: index, end: index } }),
            }
        }

        channels
    }

    /// Number of non-free slots and total number of slots, over all bands and cores.
    pub fn occupancy(&self) -> (usize, usize) {
        self.cores.values().flatten().fold((0, 0), |(taken, total), slots| {
            (taken + slots.iter().filter(|v| **v != FREE_SLOT).count(), total + slots.len())
        })
    }
}

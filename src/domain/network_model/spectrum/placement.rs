use serde::Serialize;

use crate::domain::network_model::spectrum::band::SpectrumBand;
use crate::domain::network_model::spectrum::slot_range::SlotRange;

/// Where a lightpath sits in the spectrum: one band, one core, one data slot range and the
/// guard band slots directly behind it. Identical on every link of the lightpath's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub band: SpectrumBand,
    pub core: usize,
    pub slots: SlotRange,
    pub guard_slots: usize,
}

impl Placement {
    pub fn new(band: SpectrumBand, core: usize, start_slot: usize, slots_needed: usize, guard_slots: usize) -> Self {
        Placement { band, core, slots: SlotRange::with_len(start_slot, slots_needed), guard_slots }
    }

    /// Guard band slots trailing the data slots, if any.
    pub fn guard_range(&self) -> Option<SlotRange> {
        if self.guard_slots == 0 { None } else { Some(SlotRange::with_len(self.slots.end + 1, self.guard_slots)) }
    }

    /// Data slots plus guard band.
    pub fn occupied_range(&self) -> SlotRange {
        SlotRange { start: self.slots.start, end: self.slots.end + self.guard_slots }
    }
}

use crate::domain::network_model::spectrum::placement::Placement;
use crate::domain::network_model::spectrum::slot_range::{SlotRange, free_runs};
use crate::domain::network_model::spectrum::spectrum_state::SpectrumState;
use crate::domain::network_model::spectrum_assignment::allocation_method::AllocationMethod;
use crate::domain::network_model::topology::fiber::CoreLayout;
use crate::domain::network_model::utils::id::NodeIndex;

/// Finds contiguous, path-wide free slot ranges.
///
/// A placement is valid only if the same band, core and slot range (data plus trailing guard
/// band) is free on every link of the path. The search never writes to the spectrum state.
#[derive(Debug, Clone)]
pub struct SpectrumAssignment {
    method: AllocationMethod,
    guard_slots: usize,
    layout: CoreLayout,
}

impl SpectrumAssignment {
    pub fn new(method: AllocationMethod, guard_slots: usize, cores_per_link: usize) -> Self {
        SpectrumAssignment { method, guard_slots, layout: CoreLayout::new(cores_per_link) }
    }

    pub fn method(&self) -> AllocationMethod {
        self.method
    }

    pub fn guard_slots(&self) -> usize {
        self.guard_slots
    }

    /// The placement the configured strategy prefers, or `None` if no core of any band has room.
    pub fn find_spectrum(&self, state: &SpectrumState, path: &[NodeIndex], slots_needed: usize) -> Option<Placement> {
        self.candidate_placements(state, path, slots_needed).into_iter().next()
    }

    /// Every window that fits, in the order the strategy prefers them.
    ///
    /// Bands and cores are visited in search order. First fit lists the windows of a core from
    /// the lowest start, last fit from the highest. Best fit ranks all windows by the free slots
    /// their run leaves over, then by search order. The orchestrator walks this list when a
    /// placement fails the signal quality check.
    pub fn candidate_placements(&self, state: &SpectrumState, path: &[NodeIndex], slots_needed: usize) -> Vec<Placement> {
        if slots_needed == 0 || path.len() < 2 {
            return Vec::new();
        }

        let window = slots_needed + self.guard_slots;
        let mut candidates: Vec<(usize, Placement)> = Vec::new();

        for band in state.band_plan().bands() {
            for core in self.core_order() {
                let Some(mask) = state.path_free_mask(path, band, core) else {
                    continue;
                };

                let mut windows: Vec<(usize, usize)> = free_runs(&mask)
                    .into_iter()
                    .filter(|run| run.len() >= window)
                    .flat_map(|run| (run.start..=run.end + 1 - window).map(move |start| (run.len() - window, start)))
                    .collect();

                if self.method == AllocationMethod::LastFit {
                    windows.reverse();
                }

                candidates.extend(windows.into_iter().map(|(leftover, start)| (leftover, Placement::new(band, core, start, slots_needed, self.guard_slots))));
            }
        }

        if self.method == AllocationMethod::BestFit {
            candidates.sort_by_key(|(leftover, _)| *leftover);
        }

        candidates.into_iter().map(|(_, placement)| placement).collect()
    }

    fn core_order(&self) -> Vec<usize> {
        match self.method {
            AllocationMethod::PriorityFirst => self.layout.priority_order(),
            _ => (0..self.layout.num_cores()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::network_model::spectrum::band::{BandPlan, SpectrumBand};
    use crate::domain::network_model::topology::topology::NetworkTopology;
    use crate::domain::network_model::utils::canonical::LinkKey;
    use crate::domain::network_model::utils::id::LightpathId;

    fn line_state(slots: usize, cores: usize) -> (NetworkTopology, SpectrumState) {
        let topology = NetworkTopology::from_edges("line", &[("A", "B", 100.0), ("B", "C", 100.0)]).unwrap();
        let state = SpectrumState::new(&topology, BandPlan::c_band_only(slots).unwrap(), cores);
        (topology, state)
    }

    #[test]
    fn first_fit_respects_continuity() {
        let (_, mut state) = line_state(8, 1);
        state.mark_slots(LinkKey::new(0, 1), SpectrumBand::C, 0, SlotRange { start: 0, end: 1 }, LightpathId(1)).unwrap();
        state.mark_slots(LinkKey::new(1, 2), SpectrumBand::C, 0, SlotRange { start: 3, end: 3 }, LightpathId(2)).unwrap();

        let assignment = SpectrumAssignment::new(AllocationMethod::FirstFit, 0, 1);
        let placement = assignment.find_spectrum(&state, &[0, 1, 2], 2).unwrap();

        assert_eq!(placement.slots, SlotRange { start: 4, end: 5 });
    }

    #[test]
    fn last_fit_and_best_fit() {
        let (_, mut state) = line_state(10, 1);
        // Free runs on A-B afterwards: [0, 2] and [4, 9].
        state.mark_slots(LinkKey::new(0, 1), SpectrumBand::C, 0, SlotRange { start: 3, end: 3 }, LightpathId(1)).unwrap();

        let last = SpectrumAssignment::new(AllocationMethod::LastFit, 0, 1).find_spectrum(&state, &[0, 1], 3).unwrap();
        assert_eq!(last.slots, SlotRange { start: 7, end: 9 });

        let best = SpectrumAssignment::new(AllocationMethod::BestFit, 0, 1).find_spectrum(&state, &[0, 1], 3).unwrap();
        assert_eq!(best.slots, SlotRange { start: 0, end: 2 });
    }

    #[test]
    fn guard_band_must_fit_in_band() {
        let (_, state) = line_state(4, 1);
        let assignment = SpectrumAssignment::new(AllocationMethod::FirstFit, 1, 1);

        assert!(assignment.find_spectrum(&state, &[0, 1], 4).is_none());
        let placement = assignment.find_spectrum(&state, &[0, 1], 3).unwrap();
        assert_eq!(placement.guard_range(), Some(SlotRange { start: 3, end: 3 }));
    }

    #[test]
    fn lists_every_window_in_strategy_order() {
        let (_, mut state) = line_state(8, 1);
        // Free runs on A-B afterwards: [0, 1] and [3, 7].
        state.mark_slots(LinkKey::new(0, 1), SpectrumBand::C, 0, SlotRange { start: 2, end: 2 }, LightpathId(1)).unwrap();

        let starts = |method| -> Vec<usize> {
            SpectrumAssignment::new(method, 0, 1).candidate_placements(&state, &[0, 1], 2).iter().map(|p| p.slots.start).collect()
        };

        assert_eq!(starts(AllocationMethod::FirstFit), vec![0, 3, 4, 5, 6]);
        assert_eq!(starts(AllocationMethod::LastFit), vec![6, 5, 4, 3, 0]);
        assert_eq!(starts(AllocationMethod::BestFit), vec![0, 3, 4, 5, 6]);
    }

    #[test]
    fn falls_through_to_next_core() {
        let (_, mut state) = line_state(2, 2);
        state.mark_slots(LinkKey::new(0, 1), SpectrumBand::C, 0, SlotRange { start: 0, end: 0 }, LightpathId(1)).unwrap();

        let assignment = SpectrumAssignment::new(AllocationMethod::FirstFit, 0, 2);
        let candidates = assignment.candidate_placements(&state, &[0, 1], 2);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].core, 1);
    }

    #[test]
    fn priority_first_skips_neighbors() {
        let (_, state) = line_state(4, 7);
        let assignment = SpectrumAssignment::new(AllocationMethod::PriorityFirst, 0, 7);
        let mut cores: Vec<usize> = assignment.candidate_placements(&state, &[0, 1], 1).iter().map(|p| p.core).collect();
        cores.dedup();

        assert_eq!(cores, vec![0, 2, 4, 1, 3, 5, 6]);
    }
}

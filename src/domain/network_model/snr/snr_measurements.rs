use std::f64::consts::PI;

use crate::domain::network_model::request::modulation::ModulationFormat;
use crate::domain::network_model::sdn::block_reason::BlockReason;
use crate::domain::network_model::snr::snr_props::{LIGHT_FREQUENCY, MEAN_XT, NSP, PLANCK, REQ_BIT_RATE, SnrSettings};
use crate::domain::network_model::snr::snr_type::SnrCheckType;
use crate::domain::network_model::spectrum::band::{BandPlan, SpectrumBand};
use crate::domain::network_model::spectrum::link_spectrum::{FREE_SLOT, LinkSpectrum};
use crate::domain::network_model::spectrum::placement::Placement;
use crate::domain::network_model::spectrum::slot_range::SlotRange;
use crate::domain::network_model::spectrum::spectrum_state::SpectrumState;
use crate::domain::network_model::topology::fiber::CoreLayout;
use crate::domain::network_model::topology::topology::{Link, NetworkTopology};
use crate::domain::network_model::utils::canonical::path_links;
use crate::domain::network_model::utils::id::NodeIndex;
use crate::error::{Error, Result};

/// Link cost reported by the NLI routing metric when no channel fits on the link.
pub const NLI_BLOCKED_COST: f64 = 1000.0;

/// Link cost reported by the XT routing metric when the link has no free slot.
pub const XT_BLOCKED_COST: f64 = 100.0;

/// Outcome of a signal quality check. `cost` is the SNR in dB for SNR checks and the
/// accumulated crosstalk in dB for the XT check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeasibilityResult {
    pub failure: Option<BlockReason>,
    pub cost: f64,
}

impl FeasibilityResult {
    fn passed(cost: f64) -> Self {
        FeasibilityResult { failure: None, cost }
    }

    fn failed(reason: BlockReason, cost: f64) -> Self {
        FeasibilityResult { failure: Some(reason), cost }
    }

    pub fn is_feasible(&self) -> bool {
        self.failure.is_none()
    }
}

/// Center frequency, width and power spectral density of one channel.
#[derive(Debug, Clone, Copy)]
struct Channel {
    center_freq: f64,
    bandwidth: f64,
    center_psd: f64,
}

/// Noise contributions of one link for one channel. PSDs in W/Hz, crosstalk power in W.
#[derive(Debug, Clone, Copy)]
struct LinkNoise {
    psd_ase: f64,
    psd_nli: f64,
    p_xt: f64,
    num_spans: f64,
}

/// Physical layer model of the network: ASE, nonlinear interference (GN model with optional
/// EGN correction) and inter-core crosstalk.
#[derive(Debug, Clone)]
pub struct SnrMeasurements {
    settings: SnrSettings,
    layout: CoreLayout,
}

impl SnrMeasurements {
    pub fn new(settings: SnrSettings, cores_per_link: usize) -> Self {
        SnrMeasurements { settings, layout: CoreLayout::new(cores_per_link) }
    }

    pub fn settings(&self) -> &SnrSettings {
        &self.settings
    }

    pub fn check_type(&self) -> SnrCheckType {
        self.settings.check
    }

    /// Checks a candidate lightpath before anything is written to the spectrum.
    ///
    /// Only channels already present in `state` interfere with the candidate.
    pub fn evaluate(
        &self,
        topology: &NetworkTopology,
        state: &SpectrumState,
        path: &[NodeIndex],
        placement: &Placement,
        modulation: ModulationFormat,
    ) -> Result<FeasibilityResult> {
        let result = match self.settings.check {
            SnrCheckType::None => FeasibilityResult::passed(0.0),
            SnrCheckType::SnrNli => self.check_snr(topology, state, path, placement, modulation, self.settings.xt_noise)?,
            SnrCheckType::Xt => self.check_xt(topology, state, path, placement, modulation)?,
            SnrCheckType::SnrXt => {
                let snr = self.check_snr(topology, state, path, placement, modulation, true)?;
                if !snr.is_feasible() {
                    snr
                } else {
                    let xt = self.check_xt(topology, state, path, placement, modulation)?;
                    if xt.is_feasible() { snr } else { xt }
                }
            }
        };

        log::trace!("FeasibilityCheck: {:?} {} on core {} slots {} -> {:?}", self.settings.check, modulation, placement.core, placement.slots, result);

        Ok(result)
    }

    fn check_snr(
        &self,
        topology: &NetworkTopology,
        state: &SpectrumState,
        path: &[NodeIndex],
        placement: &Placement,
        modulation: ModulationFormat,
        include_xt: bool,
    ) -> Result<FeasibilityResult> {
        let snr_db = self.path_snr(topology, state, path, placement, modulation, include_xt)?;

        if snr_db >= self.settings.required_snr(modulation) {
            Ok(FeasibilityResult::passed(snr_db))
        } else {
            Ok(FeasibilityResult::failed(BlockReason::Snr, snr_db))
        }
    }

    /// End to end SNR in dB of a candidate channel.
    pub fn path_snr(
        &self,
        topology: &NetworkTopology,
        state: &SpectrumState,
        path: &[NodeIndex],
        placement: &Placement,
        modulation: ModulationFormat,
        include_xt: bool,
    ) -> Result<f64> {
        let channel = self.channel(state.band_plan(), placement.band, placement.slots);
        let mut snr_inverse = 0.0;

        for key in path_links(path) {
            let link = topology.link(key).ok_or_else(|| Error::InvariantViolation(format!("path uses unknown link {}", key)))?;
            let spectrum = state.link(key).ok_or_else(|| Error::InvariantViolation(format!("link {} has no spectrum", key)))?;

            let noise = self.link_noise(link, spectrum, state.band_plan(), &channel, placement.band, placement.core, placement.slots, modulation, include_xt);
            snr_inverse += ((noise.psd_ase + noise.psd_nli) * channel.bandwidth + noise.p_xt) * noise.num_spans / (channel.center_psd * channel.bandwidth);
        }

        if snr_inverse <= 0.0 {
            return Ok(f64::INFINITY);
        }

        Ok(10.0 * (1.0 / snr_inverse).log10())
    }

    fn check_xt(
        &self,
        topology: &NetworkTopology,
        state: &SpectrumState,
        path: &[NodeIndex],
        placement: &Placement,
        modulation: ModulationFormat,
    ) -> Result<FeasibilityResult> {
        let mut cross_talk = 0.0;

        for key in path_links(path) {
            let link = topology.link(key).ok_or_else(|| Error::InvariantViolation(format!("path uses unknown link {}", key)))?;
            let spectrum = state.link(key).ok_or_else(|| Error::InvariantViolation(format!("link {} has no spectrum", key)))?;

            let num_adjacent = self.occupied_neighbors(spectrum, placement.band, placement.core, placement.slots) as f64;
            cross_talk += num_adjacent * (MEAN_XT * link.length_km * 1e3).tanh();
        }

        if cross_talk == 0.0 {
            return Ok(FeasibilityResult::passed(f64::NEG_INFINITY));
        }

        let xt_db = 10.0 * cross_talk.log10();
        if xt_db < self.settings.requested_xt(modulation) {
            Ok(FeasibilityResult::passed(xt_db))
        } else {
            Ok(FeasibilityResult::failed(BlockReason::Xt, xt_db))
        }
    }

    /// Nonlinear interference cost of a link for a channel of `slots_needed` slots.
    ///
    /// The channel is placed on the first free window of every band and core; the cost is the
    /// mean NLI to signal ratio over those positions.
    pub fn nli_link_cost(&self, link: &Link, spectrum: &LinkSpectrum, band_plan: &BandPlan, slots_needed: usize) -> f64 {
        let mut costs = Vec::new();

        for band in band_plan.bands() {
            for (core, windows) in spectrum.free_contiguous_blocks(band, slots_needed).iter().enumerate() {
                let Some(window) = windows.first() else {
                    continue;
                };

                let channel = self.channel(band_plan, band, *window);
                let noise = self.link_noise(link, spectrum, band_plan, &channel, band, core, *window, ModulationFormat::Qpsk, false);
                costs.push(noise.psd_nli / channel.center_psd * noise.num_spans);
            }
        }

        if costs.is_empty() { NLI_BLOCKED_COST } else { costs.iter().sum::<f64>() / costs.len() as f64 }
    }

    /// Crosstalk cost of a link: how many free cells already sit next to an occupied core,
    /// blended by `theta` with how full the link is.
    pub fn xt_link_cost(&self, spectrum: &LinkSpectrum, band_plan: &BandPlan) -> f64 {
        let mut free = 0usize;
        let mut overlapped = 0usize;
        let mut total = 0usize;

        for band in band_plan.bands() {
            for core in 0..spectrum.num_cores() {
                let Some(slots) = spectrum.core(band, core) else {
                    continue;
                };
                total += slots.len();

                for (index, value) in slots.iter().enumerate() {
                    if *value != FREE_SLOT {
                        continue;
                    }
                    free += 1;
                    if self.occupied_neighbors(spectrum, band, core, SlotRange { start: index, end: index }) > 0 {
                        overlapped += 1;
                    }
                }
            }
        }

        if free == 0 {
            return XT_BLOCKED_COST;
        }

        let free_ratio = free as f64 / total as f64;
        let overlap_ratio = overlapped as f64 / free as f64;
        let theta = self.settings.theta;

        theta * overlap_ratio + (1.0 - theta) * (1.0 - free_ratio)
    }

    fn channel(&self, band_plan: &BandPlan, band: SpectrumBand, slots: SlotRange) -> Channel {
        let slot_width = self.settings.bw_per_slot;
        let start = (band_plan.slot_offset(band) + slots.start) as f64;
        let width = slots.len() as f64;

        let bandwidth = width * slot_width * 1e9;

        Channel {
            center_freq: (start * slot_width + width * slot_width / 2.0) * 1e9,
            bandwidth,
            center_psd: self.settings.input_power / bandwidth,
        }
    }

    /// Largest number of occupied neighbor cores over the slots of `range`.
    fn occupied_neighbors(&self, spectrum: &LinkSpectrum, band: SpectrumBand, core: usize, range: SlotRange) -> usize {
        let neighbors = self.layout.adjacent_cores(core);

        range
            .indices()
            .map(|slot| {
                neighbors
                    .iter()
                    .filter(|neighbor| spectrum.core(band, **neighbor).and_then(|slots| slots.get(slot)).is_some_and(|value| *value != FREE_SLOT))
                    .count()
            })
            .max()
            .unwrap_or(0)
    }

    #[allow(clippy::too_many_arguments)]
    fn link_noise(
        &self,
        link: &Link,
        spectrum: &LinkSpectrum,
        band_plan: &BandPlan,
        channel: &Channel,
        band: SpectrumBand,
        core: usize,
        slots: SlotRange,
        modulation: ModulationFormat,
        include_xt: bool,
    ) -> LinkNoise {
        let fiber = &link.fiber;
        let alpha = fiber.attenuation;
        let beta2 = fiber.dispersion.abs();
        let gamma = fiber.non_linearity;
        let span_m = link.span_length_km * 1e3;

        let mu = 3.0 * gamma.powi(2) / (2.0 * PI * alpha * beta2);
        let rho = PI.powi(2) * beta2 / (2.0 * alpha);

        let sci = channel.center_psd.powi(2) * (rho * channel.bandwidth.powi(2)).asinh();

        let others = spectrum.taken_channels(band, core);
        let xci: f64 = others
            .iter()
            .map(|taken| {
                let other = self.channel(band_plan, band, taken.slots);
                let delta = (other.center_freq - channel.center_freq).abs();
                let half = other.bandwidth / 2.0;
                if delta <= half { 0.0 } else { other.center_psd.powi(2) * ((delta + half) / (delta - half)).ln() }
            })
            .sum();

        let mut psd_nli = (sci + xci) * mu * channel.center_psd;

        if self.settings.egn_model {
            let pairs = others.len().div_ceil(2);
            let harmonic: f64 = (1..=pairs).map(|i| 1.0 / i as f64).sum();
            let effective_span = (1.0 - (-2.0 * alpha * span_m).exp()) / (2.0 * alpha);
            let baud_rate = REQ_BIT_RATE * 1e9 / 2.0;

            let temp = gamma.powi(2) * effective_span.powi(2) * channel.center_psd.powi(3) * channel.bandwidth.powi(2)
                / (baud_rate.powi(2) * PI * beta2 * span_m);
            let correction = (80.0 / 81.0) * self.settings.phi(modulation) * temp * harmonic;

            psd_nli = (psd_nli - correction).max(0.0);
        }

        let psd_ase = PLANCK * LIGHT_FREQUENCY * NSP * ((alpha * span_m).exp() - 1.0);

        let p_xt = if include_xt {
            let num_adjacent = self.occupied_neighbors(spectrum, band, core, slots) as f64;
            let coupling = 2.0 * fiber.bending_radius * fiber.mode_coupling_co.powi(2) / (fiber.propagation_const * fiber.core_pitch);
            num_adjacent * coupling * span_m * self.settings.input_power
        } else {
            0.0
        };

        LinkNoise { psd_ase, psd_nli, p_xt, num_spans: link.num_spans() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(length: f64, cores: usize) -> (NetworkTopology, SpectrumState) {
        let topology = NetworkTopology::from_edges("pair", &[("A", "B", length)]).unwrap();
        let state = SpectrumState::new(&topology, BandPlan::c_band_only(320).unwrap(), cores);
        (topology, state)
    }

    #[test]
    fn single_span_snr_is_high() {
        let (topology, state) = setup(100.0, 1);
        let model = SnrMeasurements::new(SnrSettings::new(SnrCheckType::SnrNli, 12.5), 1);
        let placement = Placement::new(SpectrumBand::C, 0, 0, 4, 0);

        let snr = model.path_snr(&topology, &state, &[0, 1], &placement, ModulationFormat::Qpsk, false).unwrap();
        assert!(snr > 20.0 && snr < 35.0, "snr was {}", snr);
    }

    #[test]
    fn long_links_reject_dense_formats() {
        let (topology, state) = setup(3000.0, 1);
        let model = SnrMeasurements::new(SnrSettings::new(SnrCheckType::SnrNli, 12.5), 1);
        let placement = Placement::new(SpectrumBand::C, 0, 0, 4, 0);

        let dense = model.evaluate(&topology, &state, &[0, 1], &placement, ModulationFormat::Qam64).unwrap();
        assert_eq!(dense.failure, Some(BlockReason::Snr));

        let robust = model.evaluate(&topology, &state, &[0, 1], &placement, ModulationFormat::Qpsk).unwrap();
        assert!(robust.is_feasible());
    }

    #[test]
    fn crosstalk_counts_occupied_neighbors() {
        use crate::domain::network_model::utils::canonical::LinkKey;
        use crate::domain::network_model::utils::id::LightpathId;

        let (topology, mut state) = setup(100.0, 7);
        let model = SnrMeasurements::new(SnrSettings::new(SnrCheckType::Xt, 12.5), 7);
        let placement = Placement::new(SpectrumBand::C, 6, 0, 2, 0);

        let empty = model.evaluate(&topology, &state, &[0, 1], &placement, ModulationFormat::Qam64).unwrap();
        assert!(empty.is_feasible());

        for core in 0..3 {
            state.mark_slots(LinkKey::new(0, 1), SpectrumBand::C, core, SlotRange { start: 0, end: 1 }, LightpathId(core as u64 + 1)).unwrap();
        }

        let crowded = model.evaluate(&topology, &state, &[0, 1], &placement, ModulationFormat::Qam64).unwrap();
        assert_eq!(crowded.failure, Some(BlockReason::Xt));
        assert!(model.evaluate(&topology, &state, &[0, 1], &placement, ModulationFormat::Qpsk).unwrap().is_feasible());
    }
}

use std::f64::consts::PI;

use crate::api::topology_dto::FiberDto;

/// Conversion factor between dB and neper based attenuation.
const DB_TO_NEPER: f64 = 4.343;

/// Physical parameters of the fiber on one link.
///
/// Attenuation is stored in 1/m, dispersion as the group velocity dispersion parameter in s^2/m.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiberProperties {
    pub attenuation: f64,
    pub dispersion: f64,
    pub non_linearity: f64,
    pub bending_radius: f64,
    pub mode_coupling_co: f64,
    pub propagation_const: f64,
    pub core_pitch: f64,
}

impl Default for FiberProperties {
    fn default() -> Self {
        FiberProperties {
            attenuation: 0.2 / DB_TO_NEPER * 1e-3,
            dispersion: (16e-6 * 1550e-9_f64.powi(2)) / (2.0 * PI * 3e8),
            non_linearity: 1.3e-3,
            bending_radius: 0.05,
            mode_coupling_co: 4.0e-4,
            propagation_const: 4e6,
            core_pitch: 4e-5,
        }
    }
}

impl FiberProperties {
    /// Applies the values present in `dto` on top of the defaults.
    pub fn with_overrides(dto: Option<&FiberDto>) -> Self {
        let mut fiber = FiberProperties::default();

        let Some(dto) = dto else {
            return fiber;
        };

        if let Some(db_per_km) = dto.attenuation_db_per_km {
            fiber.attenuation = db_per_km / DB_TO_NEPER * 1e-3;
        }
        if let Some(v) = dto.dispersion {
            fiber.dispersion = v;
        }
        if let Some(v) = dto.non_linearity {
            fiber.non_linearity = v;
        }
        if let Some(v) = dto.bending_radius {
            fiber.bending_radius = v;
        }
        if let Some(v) = dto.mode_coupling_co {
            fiber.mode_coupling_co = v;
        }
        if let Some(v) = dto.propagation_const {
            fiber.propagation_const = v;
        }
        if let Some(v) = dto.core_pitch {
            fiber.core_pitch = v;
        }

        fiber
    }
}

/// Geometry of the cores inside a multi-core fiber.
///
/// Seven-core fibers use the hexagonal layout: cores 0..=5 form a ring around the center
/// core 6. Other core counts are treated as a ring without center core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreLayout {
    cores: usize,
}

const HEX_CORES: usize = 7;
const HEX_CENTER: usize = 6;

impl CoreLayout {
    pub fn new(cores: usize) -> Self {
        CoreLayout { cores }
    }

    pub fn num_cores(&self) -> usize {
        self.cores
    }

    /// Cores that physically neighbor `core` and therefore couple crosstalk into it.
    pub fn adjacent_cores(&self, core: usize) -> Vec<usize> {
        match self.cores {
            0 | 1 => Vec::new(),
            2 => vec![1 - core],
            HEX_CORES if core == HEX_CENTER => (0..HEX_CENTER).collect(),
            HEX_CORES => {
                let before = if core == 0 { HEX_CENTER - 1 } else { core - 1 };
                let after = if core == HEX_CENTER - 1 { 0 } else { core + 1 };
                vec![before, after, HEX_CENTER]
            }
            n => {
                let before = (core + n - 1) % n;
                let after = (core + 1) % n;
                if before == after { vec![before] } else { vec![before, after] }
            }
        }
    }

    /// The largest neighbor count of any core.
    pub fn max_adjacent(&self) -> usize {
        (0..self.cores).map(|core| self.adjacent_cores(core).len()).max().unwrap_or(0)
    }

    /// Core visiting order that spreads allocations over non-neighboring cores first.
    pub fn priority_order(&self) -> Vec<usize> {
        if self.cores == HEX_CORES {
            return vec![0, 2, 4, 1, 3, 5, 6];
        }

        (0..self.cores).collect()
    }
}

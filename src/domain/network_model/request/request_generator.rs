use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::domain::network_model::request::modulation::ModulationTable;
use crate::domain::network_model::request::request::Request;
use crate::domain::network_model::topology::topology::NetworkTopology;
use crate::domain::network_model::utils::id::RequestId;
use crate::error::{Error, Result};

/// Seeded Poisson arrival process.
///
/// Inter-arrival and holding times are exponential. The bandwidth mix follows the configured
/// shares exactly (rounding leftovers go to the largest share) and is shuffled once per seed.
#[derive(Debug, Clone)]
pub struct RequestGenerator {
    num_requests: usize,
    arrival_rate: f64,
    holding_time: f64,

    /// Bandwidth to share of all requests, ascending by bandwidth.
    distribution: Vec<(i64, f64)>,
}

impl RequestGenerator {
    pub fn new(num_requests: usize, arrival_rate: f64, holding_time: f64, distribution: Vec<(i64, f64)>) -> Result<Self> {
        if !(arrival_rate > 0.0) || !(holding_time > 0.0) {
            return Err(Error::ConfigurationError(format!(
                "arrival rate ({}) and holding time ({}) must be positive",
                arrival_rate, holding_time
            )));
        }
        if distribution.is_empty() {
            return Err(Error::ConfigurationError("request distribution is empty".to_string()));
        }

        Ok(RequestGenerator { num_requests, arrival_rate, holding_time, distribution })
    }

    /// Number of requests per bandwidth, summing to `num_requests`.
    pub fn bandwidth_counts(&self) -> Vec<(i64, usize)> {
        let mut counts: Vec<(i64, usize)> =
            self.distribution.iter().map(|(bandwidth, share)| (*bandwidth, (share * self.num_requests as f64).floor() as usize)).collect();

        let assigned: usize = counts.iter().map(|(_, count)| count).sum();
        let leftover = self.num_requests.saturating_sub(assigned);

        let largest = self
            .distribution
            .iter()
            .enumerate()
            .fold(0, |best, (i, (_, share))| if *share > self.distribution[best].1 { i } else { best });
        counts[largest].1 += leftover;

        counts
    }

    pub fn generate(&self, topology: &NetworkTopology, table: &ModulationTable, seed: u64) -> Result<Vec<Request>> {
        let node_count = topology.node_count();
        if node_count < 2 {
            return Err(Error::ConfigurationError("at least two nodes are needed to generate requests".to_string()));
        }

        let mut rng = StdRng::seed_from_u64(seed);

        let mut bandwidths: Vec<i64> = self.bandwidth_counts().into_iter().flat_map(|(bandwidth, count)| std::iter::repeat_n(bandwidth, count)).collect();
        bandwidths.shuffle(&mut rng);

        let mut requests = Vec::with_capacity(bandwidths.len());
        let mut now = 0.0;

        for (index, bandwidth) in bandwidths.into_iter().enumerate() {
            now += exponential(&mut rng, self.arrival_rate);
            let holding = exponential(&mut rng, 1.0 / self.holding_time);

            let source = rng.random_range(0..node_count);
            let mut destination = rng.random_range(0..node_count - 1);
            if destination >= source {
                destination += 1;
            }

            let mod_formats = table
                .row(bandwidth)
                .cloned()
                .ok_or_else(|| Error::ConfigurationError(format!("no modulation formats configured for {} Gbps", bandwidth)))?;

            requests.push(Request {
                id: RequestId(index as u64 + 1),
                source,
                destination,
                bandwidth,
                arrive: now,
                depart: now + holding,
                mod_formats,
            });
        }

        log::debug!("RequestGeneration: {} requests generated with seed {}.", requests.len(), seed);

        Ok(requests)
    }
}

fn exponential(rng: &mut StdRng, rate: f64) -> f64 {
    -(1.0 - rng.random::<f64>()).ln() / rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::network_model::request::modulation::{ModulationEntry, ModulationFormat, ModulationRow};

    fn table() -> ModulationTable {
        let row = ModulationRow::new([(ModulationFormat::Qpsk, ModulationEntry { max_length_km: 5000.0, slots_needed: 2 })]);
        ModulationTable::new([(25, row.clone()), (100, row)])
    }

    #[test]
    fn counts_are_exact() {
        let generator = RequestGenerator::new(11, 1.0, 1.0, vec![(25, 0.3), (100, 0.7)]).unwrap();
        assert_eq!(generator.bandwidth_counts(), vec![(25, 3), (100, 8)]);
    }

    #[test]
    fn same_seed_same_trace() {
        let topology = NetworkTopology::from_edges("tri", &[("A", "B", 100.0), ("B", "C", 100.0), ("A", "C", 150.0)]).unwrap();
        let generator = RequestGenerator::new(50, 2.0, 1.0, vec![(25, 0.5), (100, 0.5)]).unwrap();

        let first = generator.generate(&topology, &table(), 7).unwrap();
        let second = generator.generate(&topology, &table(), 7).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 50);
        assert!(first.iter().all(|r| r.source != r.destination && r.depart >= r.arrive));
        assert!(first.windows(2).all(|w| w[0].arrive <= w[1].arrive));
        assert_eq!(first[0].id, RequestId(1));
    }
}

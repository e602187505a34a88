use crate::domain::network_model::engine::engine::Engine;
use crate::domain::network_model::engine::sim_stats::SimulationStats;
use crate::domain::network_model::request::request::Request;
use crate::domain::simulator::event_queue::{EventKind, EventQueue};
use crate::error::Result;

/// Sequential discrete event simulation of one run.
///
/// Events are processed strictly in time order. Only committed requests get a departure
/// event. An invariant violation aborts the run.
pub struct Simulator {
    engine: Engine,
    print_step: usize,
}

impl Simulator {
    pub fn new(engine: Engine, print_step: usize) -> Self {
        Simulator { engine, print_step }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn run(mut self, requests: &[Request]) -> Result<SimulationStats> {
        let mut queue = EventQueue::new();
        for (index, request) in requests.iter().enumerate() {
            queue.push(request.arrive, EventKind::Arrival(index));
        }

        let mut arrivals = 0usize;

        while let Some(event) = queue.pop() {
            match event.kind {
                EventKind::Arrival(index) => {
                    let request = &requests[index];
                    let outcome = self.engine.handle_arrival(request, event.time)?;

                    if outcome.is_committed() {
                        queue.push(request.depart, EventKind::Departure(request.id));
                    }

                    arrivals += 1;
                    if self.print_step > 0 && arrivals % self.print_step == 0 {
                        let stats = self.engine.stats();
                        log::info!(
                            "SimulationProgress: {} {}/{} requests, blocking probability {:.4}.",
                            stats.run_id,
                            arrivals,
                            requests.len(),
                            stats.blocking_probability
                        );
                    }
                }
                EventKind::Departure(request_id) => {
                    self.engine.handle_release(request_id, event.time)?;
                }
            }
        }

        Ok(self.engine.into_stats())
    }
}

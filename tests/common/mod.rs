#![allow(dead_code)]

use std::sync::Arc;

use eon_sim::api::engine_config_dto::EngineConfigDto;
use eon_sim::domain::network_model::engine::engine_config::EngineConfig;
use eon_sim::domain::network_model::request::request::Request;
use eon_sim::domain::network_model::sdn::sdn_controller::SdnController;
use eon_sim::domain::network_model::topology::topology::NetworkTopology;
use eon_sim::domain::network_model::utils::id::RequestId;
use eon_sim::loader::parser::parse_json_str;

/// Knobs of the test configuration. Everything else is fixed: 12.5 GHz slots, C band only,
/// QPSK rows for 25/50/100 Gbps with 1/2/4 slots and a reach that never limits.
pub struct TestConfig {
    pub route_method: &'static str,
    pub allocation_method: &'static str,
    pub k_paths: usize,
    pub cores: usize,
    pub c_band: usize,
    pub guard_slots: usize,
    pub grooming: bool,
    pub max_segments: usize,
    pub snr_type: Option<&'static str>,
    pub xt_type: Option<&'static str>,
}

impl Default for TestConfig {
    fn default() -> Self {
        TestConfig {
            route_method: "shortest_path",
            allocation_method: "first_fit",
            k_paths: 3,
            cores: 1,
            c_band: 4,
            guard_slots: 0,
            grooming: false,
            max_segments: 1,
            snr_type: None,
            xt_type: None,
        }
    }
}

impl TestConfig {
    pub fn json(&self) -> String {
        let quoted = |value: Option<&str>| match value {
            Some(name) => format!("\"{}\"", name),
            None => "null".to_string(),
        };

        format!(
            r#"{{
                "general_settings": {{
                    "holding_time": 1.0,
                    "erlangs": [10.0],
                    "guard_slots": {guard},
                    "num_requests": 50,
                    "request_distribution": {{ "25": 0.5, "100": 0.5 }},
                    "max_segments": {segments},
                    "allocation_method": "{allocation}",
                    "route_method": "{route}",
                    "k_paths": {k},
                    "seeds": [7],
                    "is_grooming_enabled": {grooming}
                }},
                "topology_settings": {{ "bw_per_slot": 12.5, "cores_per_link": {cores} }},
                "spectrum_settings": {{ "c_band": {slots} }},
                "snr_settings": {{ "snr_type": {snr_type}, "xt_type": {xt_type} }},
                "mod_per_bw": {{
                    "25": {{ "QPSK": {{ "max_length": 10000, "slots_needed": 1 }} }},
                    "50": {{ "QPSK": {{ "max_length": 10000, "slots_needed": 2 }} }},
                    "100": {{ "QPSK": {{ "max_length": 10000, "slots_needed": 4 }} }}
                }}
            }}"#,
            guard = self.guard_slots,
            segments = self.max_segments,
            allocation = self.allocation_method,
            route = self.route_method,
            k = self.k_paths,
            grooming = self.grooming,
            cores = self.cores,
            slots = self.c_band,
            snr_type = quoted(self.snr_type),
            xt_type = quoted(self.xt_type),
        )
    }

    pub fn build(&self) -> EngineConfig {
        let dto: EngineConfigDto = parse_json_str(&self.json()).unwrap();
        EngineConfig::try_from(dto).unwrap()
    }
}

pub fn topology(edges: &[(&str, &str, f64)]) -> Arc<NetworkTopology> {
    Arc::new(NetworkTopology::from_edges("test", edges).unwrap())
}

pub fn controller(edges: &[(&str, &str, f64)], config: &EngineConfig) -> SdnController {
    SdnController::new(topology(edges), config)
}

/// A request using the configured modulation row of `row_bandwidth`.
pub fn request(controller: &SdnController, config: &EngineConfig, id: u64, source: &str, destination: &str, bandwidth: i64, row_bandwidth: i64) -> Request {
    let topology = controller.topology();
    Request {
        id: RequestId(id),
        source: topology.node_index(source).unwrap(),
        destination: topology.node_index(destination).unwrap(),
        bandwidth,
        arrive: id as f64,
        depart: id as f64 + 100.0,
        mod_formats: config.modulation_table.row(row_bandwidth).unwrap().clone(),
    }
}

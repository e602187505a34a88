use std::sync::Arc;

use crate::api::engine_config_dto::EngineConfigDto;
use crate::api::request_dto::RequestTraceDto;
use crate::api::topology_dto::TopologyDto;
use crate::domain::network_model::engine::engine_config::EngineConfig;
use crate::domain::network_model::request::request::Request;
use crate::domain::network_model::topology::topology::NetworkTopology;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Everything a simulation needs, validated and ready to run.
#[derive(Debug)]
pub struct SimulationInputs {
    pub config: EngineConfig,
    pub topology: Arc<NetworkTopology>,
    pub trace: Option<Vec<Request>>,
}

/// Reads and validates the configuration, the topology and an optional request trace.
pub fn load_inputs(config_path: &str, topology_path: &str, trace_path: Option<&str>) -> Result<SimulationInputs> {
    let config_dto: EngineConfigDto = parse_json_file(config_path)?;
    let config = EngineConfig::try_from(config_dto)?;
    log::info!("LoadInputs: configuration '{}' validated.", config_path);

    let topology_dto: TopologyDto = parse_json_file(topology_path)?;
    let topology = Arc::new(NetworkTopology::try_from(&topology_dto)?);
    log::info!("LoadInputs: topology '{}' has {} nodes and {} links.", topology.name(), topology.node_count(), topology.link_count());

    let trace = match trace_path {
        Some(path) => {
            let trace_dto: RequestTraceDto = parse_json_file(path)?;
            let requests = trace_dto
                .requests
                .iter()
                .map(|dto| Request::from_dto(dto, &topology, &config.modulation_table))
                .collect::<Result<Vec<_>>>()?;
            log::info!("LoadInputs: replaying {} requests from '{}'.", requests.len(), path);
            Some(requests)
        }
        None => None,
    };

    Ok(SimulationInputs { config, topology, trace })
}

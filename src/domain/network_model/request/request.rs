use crate::api::request_dto::RequestDto;
use crate::domain::network_model::request::modulation::{ModulationRow, ModulationTable};
use crate::domain::network_model::topology::topology::NetworkTopology;
use crate::domain::network_model::utils::canonical::NodePair;
use crate::domain::network_model::utils::id::{NodeIndex, RequestId};
use crate::error::{Error, Result};

/// A bandwidth demand between two nodes, alive from `arrive` to `depart`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: RequestId,
    pub source: NodeIndex,
    pub destination: NodeIndex,

    /// Requested bandwidth in Gbps.
    pub bandwidth: i64,
    pub arrive: f64,
    pub depart: f64,

    /// Modulation formats usable for this request's bandwidth.
    pub mod_formats: ModulationRow,
}

impl Request {
    pub fn endpoints(&self) -> NodePair {
        NodePair::new(self.source, self.destination)
    }

    pub fn holding_time(&self) -> f64 {
        self.depart - self.arrive
    }

    /// Resolves a trace record against the topology. Requests without their own modulation table
    /// use the configured row for their bandwidth, or an empty row if none exists.
    pub fn from_dto(dto: &RequestDto, topology: &NetworkTopology, table: &ModulationTable) -> Result<Self> {
        let source = topology
            .node_index(&dto.source)
            .ok_or_else(|| Error::ConfigurationError(format!("request {} uses unknown source '{}'", dto.req_id, dto.source)))?;
        let destination = topology
            .node_index(&dto.destination)
            .ok_or_else(|| Error::ConfigurationError(format!("request {} uses unknown destination '{}'", dto.req_id, dto.destination)))?;

        if source == destination {
            return Err(Error::ConfigurationError(format!("request {} has identical source and destination", dto.req_id)));
        }
        if dto.bandwidth <= 0 {
            return Err(Error::ConfigurationError(format!("request {} has non-positive bandwidth {}", dto.req_id, dto.bandwidth)));
        }
        if dto.depart < dto.arrive {
            return Err(Error::ConfigurationError(format!("request {} departs before it arrives", dto.req_id)));
        }

        let mod_formats = match &dto.mod_formats {
            Some(formats) => ModulationRow::try_from(formats)?,
            None => table.row(dto.bandwidth).cloned().unwrap_or_default(),
        };

        Ok(Request { id: RequestId(dto.req_id), source, destination, bandwidth: dto.bandwidth, arrive: dto.arrive, depart: dto.depart, mod_formats })
    }
}

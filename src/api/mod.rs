pub mod engine_config_dto;
pub mod request_dto;
pub mod topology_dto;

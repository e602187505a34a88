use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON input: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to write statistics: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    ConversionError(#[from] ConversionError),

    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),

    #[error("Failed to build network topology: {0}")]
    TopologyConstructionError(String),

    /// Accounting went wrong somewhere. The run must stop, later events would build on corrupt state.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

/// Raised while resolving configuration names into their typed counterparts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("unknown routing method '{0}'")]
    UnknownRoutingMethod(String),

    #[error("unknown allocation method '{0}'")]
    UnknownAllocationMethod(String),

    #[error("unknown SNR check type '{0}'")]
    UnknownSnrType(String),

    #[error("unknown XT cost type '{0}'")]
    UnknownXtType(String),

    #[error("unknown modulation format '{0}'")]
    UnknownModulationFormat(String),

    #[error("unknown spectral band '{0}'")]
    UnknownBand(String),

    #[error("bandwidth key '{0}' is not an integer")]
    InvalidBandwidth(String),

    #[error("missing required parameter '{0}'")]
    MissingParameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;

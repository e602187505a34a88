use serde::de::DeserializeOwned;
use std::fs;

use crate::error::Result;

/// Parses a JSON file into a given type `T`.
///
/// Errors are converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON is malformed or does not match `T`.
pub fn parse_json_file<T: DeserializeOwned>(file_path: &str) -> Result<T> {
    let data = fs::read_to_string(file_path)?;

    log::debug!("ParseJsonFile: read {} bytes from '{}'", data.len(), file_path);

    let parsed_data: T = serde_json::from_str(&data)?;

    Ok(parsed_data)
}

/// Parses JSON text into `T`. Used for inline fixtures and request traces passed on stdin.
pub fn parse_json_str<T: DeserializeOwned>(json: &str) -> Result<T> {
    Ok(serde_json::from_str(json)?)
}

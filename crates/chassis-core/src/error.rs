//! Error types for configuration, catalog, export and settings operations.

use thiserror::Error;

use crate::{PartType, ServerId};

/// A rejected selection or add/remove action. State is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("No server selected: select a server before adding parts")]
    NoServerSelected,

    #[error("{part} limit reached: at most {limit} can be added")]
    LimitReached { part: PartType, limit: u32 },

    #[error("No {0} to remove")]
    NothingToRemove(PartType),

    #[error("Unknown server id {0}")]
    UnknownServer(ServerId),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid catalog: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: no server selected")]
    NoServerSelected,

    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize export: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_message_names_part_and_limit() {
        let err = ConfigError::LimitReached {
            part: PartType::Cpu,
            limit: 2,
        };
        assert_eq!(err.to_string(), "CPU limit reached: at most 2 can be added");
    }
}

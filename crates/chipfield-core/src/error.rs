use thiserror::Error;

use crate::dom::NodeId;

/// All errors that can occur in chipfield-core.
#[derive(Debug, Error)]
pub enum ChipfieldError {
    #[error("Missing required option: {0}")]
    MissingOption(&'static str),

    #[error("Invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Cannot move {0} inside its own subtree")]
    HierarchyCycle(NodeId),

    #[error("Input element {0} has no parent container")]
    InputDetached(NodeId),

    #[error("Node {0} is not a chip close control")]
    NotACloseControl(NodeId),

    #[error("Lookup source error: {0}")]
    LookupSource(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ChipfieldError>;

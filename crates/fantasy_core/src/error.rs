use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("No statistics for player '{player}' on surface '{surface}'")]
    MissingEntityData { player: String, surface: String },

    #[error("Invalid statistic '{field}' for player '{player}': {reason}")]
    InvalidPlayerStats { player: String, field: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SimError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SimError::InvalidParameter(msg.into())
    }

    /// Whether a batch orchestrator can skip the failing unit and keep going.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimError::MissingEntityData { .. } => true,
            SimError::InvalidPlayerStats { .. } => true,
            SimError::InvalidParameter(_) => false,
            SimError::Config(_) => false,
            SimError::Serialization(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

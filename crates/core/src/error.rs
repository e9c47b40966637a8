use crate::modality::Modality;

/// Why a [`SessionConfig`](crate::session::SessionConfig) was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid size must be between 1 and {max}, got {got}")]
    GridSize { got: u32, max: u32 },

    #[error("n must be at least 1")]
    ZeroLag,

    #[error("at least one modality must be active")]
    NoModalities,

    #[error("interval must be between {min} and {max} ms, got {got}")]
    Interval { got: u64, min: u64, max: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NBackError {
    #[error("invalid session configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("modality '{0}' is not active in this session")]
    InactiveModality(Modality),

    #[error("unknown modality '{0}' (expected position|color|letter|number|shape|audio)")]
    UnknownModality(String),

    /// The round timer needs a Tokio runtime to spawn onto.
    #[error("no Tokio runtime available to drive the round timer")]
    NoRuntime,
}

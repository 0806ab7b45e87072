//! 实验错误

use super::spec::SweepMode;
use crate::traffic::{ConfigError, TrafficKind};

#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    #[error("invalid traffic profile: {0}")]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid experiment json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported schema_version {0}")]
    SchemaVersion(u32),

    #[error("sweep mode `{mode}` requires a main node")]
    NoMainNode { mode: SweepMode },

    #[error("experiment has no nodes")]
    NoNodes,

    #[error("repetitions must be at least 1")]
    ZeroRepetitions,

    #[error("node group `{traffic:?}` has min_nodes={min} > max_nodes={max}")]
    GroupRange { traffic: TrafficKind, min: u32, max: u32 },

    #[error("traffic kind `{0:?}` has no preset; provide an explicit profile")]
    MissingProfile(TrafficKind),
}

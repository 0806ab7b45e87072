//! 实验描述（JSON）

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ExperimentError;
use crate::phy::{NetworkType, Physical80211};
use crate::traffic::{TrafficKind, TrafficProfile};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSpec {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_network")]
    pub network: NetworkType,
    #[serde(default = "default_payload_bytes")]
    pub payload_bytes: u32,
    /// 仿真时长（秒）；给出 `steps` 时被忽略
    #[serde(default = "default_seconds")]
    pub seconds: f64,
    #[serde(default)]
    pub steps: Option<u64>,
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,
    /// 负数表示非复现种子
    #[serde(default = "default_seed")]
    pub seed: i64,
    #[serde(default)]
    pub keep_trace: bool,
    #[serde(default)]
    pub mode: SweepMode,
    #[serde(default)]
    pub main: Option<NodeGroupSpec>,
    #[serde(default)]
    pub competing: Vec<NodeGroupSpec>,
}

/// 竞争节点数量的扫描方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepMode {
    /// 每种竞争类型轮流作为主节点
    #[default]
    Singles,
    /// 主节点对抗单一竞争类型的 n 个节点
    Incremental,
    /// 主节点对抗所有竞争数量组合
    Cartesian,
}

impl SweepMode {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_lowercase().as_str() {
            "singles" | "single" => Ok(Self::Singles),
            "incremental" => Ok(Self::Incremental),
            "cartesian" => Ok(Self::Cartesian),
            _ => Err(format!("unknown sweep mode: {raw}")),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Singles => "singles",
            Self::Incremental => "incremental",
            Self::Cartesian => "cartesian",
        }
    }
}

impl fmt::Display for SweepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 一类节点：流量类型、数量范围与质量阈值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeGroupSpec {
    pub traffic: TrafficKind,
    #[serde(default)]
    pub min_nodes: u32,
    #[serde(default = "default_max_nodes")]
    pub max_nodes: u32,
    /// 上游输入比特率
    #[serde(default = "default_arrival_bps")]
    pub arrival_bps: f64,
    /// 秒
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
    /// 完整参数覆盖；`Custom` 类型必须提供
    #[serde(default)]
    pub profile: Option<TrafficProfile>,
}

impl NodeGroupSpec {
    pub fn new(traffic: TrafficKind, min_nodes: u32, max_nodes: u32) -> Self {
        Self {
            traffic,
            min_nodes,
            max_nodes,
            arrival_bps: default_arrival_bps(),
            quality_threshold: default_quality_threshold(),
            profile: None,
        }
    }

    /// 显式参数优先，否则使用预设
    pub fn resolve_profile(&self, phy: &Physical80211) -> Result<TrafficProfile, ExperimentError> {
        if let Some(profile) = &self.profile {
            let mut profile = profile.clone();
            profile.kind = self.traffic;
            return Ok(profile);
        }
        self.traffic
            .preset(phy, self.arrival_bps)
            .ok_or(ExperimentError::MissingProfile(self.traffic))
    }
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

fn default_network() -> NetworkType {
    NetworkType::B
}

fn default_payload_bytes() -> u32 {
    1500
}

fn default_seconds() -> f64 {
    32.0
}

fn default_repetitions() -> u32 {
    1
}

fn default_seed() -> i64 {
    -1
}

fn default_max_nodes() -> u32 {
    1
}

fn default_arrival_bps() -> f64 {
    500_000.0
}

fn default_quality_threshold() -> f64 {
    0.1
}

impl ExperimentSpec {
    /// 单个主节点、没有竞争者的最小实验
    pub fn single(network: NetworkType, main: NodeGroupSpec) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            name: None,
            network,
            payload_bytes: default_payload_bytes(),
            seconds: default_seconds(),
            steps: None,
            repetitions: default_repetitions(),
            seed: default_seed(),
            keep_trace: false,
            mode: SweepMode::Incremental,
            main: Some(main),
            competing: Vec::new(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ExperimentError> {
        let spec: Self = serde_json::from_str(raw)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExperimentError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn phy(&self) -> Physical80211 {
        Physical80211::from_payload_bytes(self.network, self.payload_bytes)
    }

    /// 显式步数优先，否则按时长换算（向下取整）
    pub fn total_steps(&self) -> u64 {
        match self.steps {
            Some(steps) => steps,
            None => (self.seconds.max(0.0) * self.phy().steps_per_second()).floor() as u64,
        }
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.mode.name().to_string())
    }

    pub fn validate(&self) -> Result<(), ExperimentError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ExperimentError::SchemaVersion(self.schema_version));
        }
        if self.repetitions == 0 {
            return Err(ExperimentError::ZeroRepetitions);
        }
        if self.payload_bytes == 0 {
            return Err(crate::traffic::ConfigError::ZeroBytesPerStep.into());
        }
        for group in self.main.iter().chain(&self.competing) {
            if group.min_nodes > group.max_nodes {
                return Err(ExperimentError::GroupRange {
                    traffic: group.traffic,
                    min: group.min_nodes,
                    max: group.max_nodes,
                });
            }
        }
        match self.mode {
            SweepMode::Singles if self.competing.is_empty() => Err(ExperimentError::NoNodes),
            SweepMode::Incremental | SweepMode::Cartesian if self.main.is_none() => {
                Err(ExperimentError::NoMainNode { mode: self.mode })
            }
            _ => Ok(()),
        }
    }
}

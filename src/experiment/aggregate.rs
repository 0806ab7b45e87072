//! 重复运行的主节点均值

use serde::{Deserialize, Serialize};

use crate::dcf::NodeResult;
use crate::sim::RunResult;

/// 主节点指标在所有重复运行上的平均值
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub runs: usize,
    /// 比特/秒
    pub datarate: f64,
    pub packets_over_threshold: f64,
    /// 以载荷步数计
    pub packets_unsent: f64,
    /// 以载荷步数计
    pub packets_sent: f64,
}

impl Aggregate {
    pub const FIELDS: [&'static str; 4] = [
        "datarate",
        "packets_over_threshold",
        "packets_unsent",
        "packets_sent",
    ];

    pub fn from_runs(runs: &[RunResult]) -> Self {
        let mains: Vec<_> = runs.iter().filter_map(RunResult::main).collect();
        if mains.is_empty() {
            return Self::default();
        }
        let n = mains.len() as f64;
        let mean = |f: fn(&NodeResult) -> f64| mains.iter().map(|r| f(r)).sum::<f64>() / n;
        Self {
            runs: mains.len(),
            datarate: mean(|r| r.datarate),
            packets_over_threshold: mean(|r| r.packets_over_threshold as f64),
            packets_unsent: mean(|r| r.payload_steps_unsent as f64),
            packets_sent: mean(|r| r.payload_steps_sent as f64),
        }
    }

    /// 按字段名取值（CSV 输出使用）
    pub fn field(&self, name: &str) -> Option<f64> {
        match name {
            "datarate" => Some(self.datarate),
            "packets_over_threshold" => Some(self.packets_over_threshold),
            "packets_unsent" => Some(self.packets_unsent),
            "packets_sent" => Some(self.packets_sent),
            _ => None,
        }
    }
}

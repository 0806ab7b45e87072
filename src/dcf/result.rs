//! 单节点运行结果

use serde::{Deserialize, Serialize};

use super::trace::NodeTrace;
use crate::traffic::TrafficKind;

/// 质量阈值（秒）换算为步数，四舍五入
pub fn threshold_steps(threshold_secs: f64, seconds_per_step: f64) -> u64 {
    if !(threshold_secs > 0.0) || !(seconds_per_step > 0.0) {
        return 0;
    }
    (threshold_secs / seconds_per_step + 0.5).floor() as u64
}

/// 等待时间的超阈值计数器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitTally {
    pub threshold: u64,
    pub over: u64,
    pub excess_total: u64,
    pub max_excess: u64,
    pub max_wait: u64,
}

impl WaitTally {
    pub fn new(threshold: u64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// 记录一次等待；严格超过阈值时返回 true
    pub fn record(&mut self, wait: u64) -> bool {
        self.max_wait = self.max_wait.max(wait);
        if wait > self.threshold {
            let excess = wait - self.threshold;
            self.over += 1;
            self.excess_total += excess;
            self.max_excess = self.max_excess.max(excess);
            true
        } else {
            false
        }
    }
}

/// 一次运行结束后单个节点的统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    pub name: String,
    pub kind: TrafficKind,
    /// 质量阈值（秒）
    pub quality_threshold: f64,
    pub steps: u64,
    pub seconds_per_step: f64,
    pub time_spent: f64,
    pub threshold_steps: u64,

    pub packets_generated: u64,
    pub packets_sent: u64,
    pub payload_steps_sent: u64,
    /// 仍在队列中或在途的数据包
    pub packets_unsent: u64,
    pub payload_steps_unsent: u64,

    /// 已发送与未发送数据包中等待超过阈值的总数
    pub packets_over_threshold: u64,
    /// 其中属于未发送数据包的部分
    pub unsent_over_threshold: u64,
    pub steps_over_threshold: u64,
    pub max_steps_over_threshold: u64,
    /// 已发送数据包的最大排队等待
    pub max_wait_steps: u64,
    pub avg_steps_over_threshold: f64,

    pub max_sleep_stage: u32,
    pub avg_sleep_stage: f64,

    pub bits_sent: u64,
    /// 比特/秒
    pub datarate: f64,
    pub collisions: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<NodeTrace>,
}

impl NodeResult {
    pub fn datarate_mbps(&self) -> f64 {
        self.datarate / 1e6
    }

    /// 全部已生成数据包中超过阈值的比例
    pub fn over_threshold_fraction(&self) -> f64 {
        let total = self.packets_sent + self.packets_unsent;
        if total == 0 {
            0.0
        } else {
            self.packets_over_threshold as f64 / total as f64
        }
    }
}

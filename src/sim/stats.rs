//! 统计信息
//!
//! 定义信道占用统计数据结构。

use serde::{Deserialize, Serialize};

use super::observer::{ChannelObserver, TickOutcome};
use crate::dcf::DcfNode;

/// 信道统计信息
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub ticks: u64,
    pub idle_ticks: u64,
    /// 恰好一个节点发送的步数
    pub busy_ticks: u64,
    pub collision_ticks: u64,
    pub max_concurrent: usize,
}

impl ChannelStats {
    /// 有效占用比例
    pub fn utilization(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.busy_ticks as f64 / self.ticks as f64
        }
    }

    /// 有人发送的步数中发生冲突的比例
    pub fn collision_rate(&self) -> f64 {
        let active = self.busy_ticks + self.collision_ticks;
        if active == 0 {
            0.0
        } else {
            self.collision_ticks as f64 / active as f64
        }
    }

    pub fn record(&mut self, outcome: &TickOutcome) {
        self.ticks += 1;
        self.max_concurrent = self.max_concurrent.max(outcome.transmitters.len());
        if outcome.collided {
            self.collision_ticks += 1;
        } else if outcome.is_idle() {
            self.idle_ticks += 1;
        } else {
            self.busy_ticks += 1;
        }
    }
}

impl ChannelObserver for ChannelStats {
    fn on_tick(&mut self, outcome: &TickOutcome, _nodes: &[DcfNode]) {
        self.record(outcome);
    }
}

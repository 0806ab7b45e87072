//! 数据包类型
//!
//! 记录进入队列、首次尝试发送与发送成功的仿真步。

use serde::{Deserialize, Serialize};

/// 节点队列中的一个数据单元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub id: u64,
    pub queue_arrival: u64,
    pub tx_attempt: Option<u64>,
    pub tx_success: Option<u64>,
    /// 发送所需步数
    pub payload_steps: u32,
}

impl Packet {
    pub fn new(id: u64, queue_arrival: u64, payload_steps: u32) -> Self {
        Self {
            id,
            queue_arrival,
            tx_attempt: None,
            tx_success: None,
            payload_steps,
        }
    }

    pub fn is_sent(&self) -> bool {
        self.tx_success.is_some()
    }

    /// 从入队到发送成功的等待步数（未发送时为 `None`）
    pub fn wait(&self) -> Option<u64> {
        self.tx_success
            .map(|done| done.saturating_sub(self.queue_arrival))
    }

    /// 截至 `tick` 已等待的步数
    pub fn wait_at(&self, tick: u64) -> u64 {
        tick.saturating_sub(self.queue_arrival)
    }
}

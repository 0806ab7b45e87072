//! 发送队列
//!
//! 无界 FIFO，同时维护队列中载荷步数的总和。

use std::collections::VecDeque;

use super::packet::Packet;

#[derive(Debug, Default, Clone)]
pub struct TxQueue {
    payload_steps: u64,
    q: VecDeque<Packet>,
}

impl TxQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, pkt: Packet) {
        self.payload_steps = self
            .payload_steps
            .saturating_add(u64::from(pkt.payload_steps));
        self.q.push_back(pkt);
    }

    pub fn dequeue(&mut self) -> Option<Packet> {
        let pkt = self.q.pop_front()?;
        self.payload_steps = self
            .payload_steps
            .saturating_sub(u64::from(pkt.payload_steps));
        Some(pkt)
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    /// 队列中所有数据包的载荷步数之和
    pub fn payload_steps(&self) -> u64 {
        self.payload_steps
    }

    pub fn iter(&self) -> impl Iterator<Item = &Packet> {
        self.q.iter()
    }
}

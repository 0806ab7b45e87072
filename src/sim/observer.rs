//! 逐步观察者
//!
//! 每步所有节点提交之后回调一次，用于统计或自定义检查。

use serde::{Deserialize, Serialize};

use super::id::NodeId;
use crate::dcf::DcfNode;

/// 单步的信道结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickOutcome {
    pub tick: u64,
    /// 本步处于 Transmit 的节点（冲突判定前）
    pub transmitters: Vec<NodeId>,
    pub collided: bool,
}

impl TickOutcome {
    pub fn is_idle(&self) -> bool {
        self.transmitters.is_empty()
    }
}

/// 信道观察者：由调用方实现（例如统计、轨迹检查等）。
pub trait ChannelObserver {
    fn on_tick(&mut self, _outcome: &TickOutcome, _nodes: &[DcfNode]) {}
}

/// 什么都不做的观察者
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ChannelObserver for NoopObserver {}

//! 节点状态
//!
//! 带负载的枚举：每个状态只携带自己需要的计时器。

use serde::{Deserialize, Serialize};

/// 状态机中的当前位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NodeState {
    /// 队列为空，每隔 `sleep_timer` 步检查一次
    BufferEmpty { sleep_timer: u32 },
    /// 有数据但主动暂停
    Interarrival { timer: u32 },
    /// 二进制指数退避，`stage` 从 1 开始
    Backoff { stage: u32, timer: u32 },
    /// 正在发送；`stage` 为本次尝试所处的竞争阶段
    Transmit { stage: u32, payload_timer: u32 },
    /// 发送成功后的深度睡眠
    Sleep { timer: u32 },
}

/// 不带计时器的状态类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    BufferEmpty,
    Interarrival,
    Backoff,
    Transmit,
    Sleep,
}

impl StateKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::BufferEmpty => "buffer_empty",
            Self::Interarrival => "interarrival",
            Self::Backoff => "backoff",
            Self::Transmit => "transmit",
            Self::Sleep => "sleep",
        }
    }
}

impl NodeState {
    pub fn kind(&self) -> StateKind {
        match self {
            Self::BufferEmpty { .. } => StateKind::BufferEmpty,
            Self::Interarrival { .. } => StateKind::Interarrival,
            Self::Backoff { .. } => StateKind::Backoff,
            Self::Transmit { .. } => StateKind::Transmit,
            Self::Sleep { .. } => StateKind::Sleep,
        }
    }

    pub fn is_transmitting(&self) -> bool {
        matches!(self, Self::Transmit { .. })
    }

    /// 退避/发送状态下的竞争阶段
    pub fn stage(&self) -> Option<u32> {
        match self {
            Self::Backoff { stage, .. } | Self::Transmit { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// 当前状态的剩余计时
    pub fn timer(&self) -> u32 {
        match *self {
            Self::BufferEmpty { sleep_timer } => sleep_timer,
            Self::Interarrival { timer } | Self::Backoff { timer, .. } | Self::Sleep { timer } => {
                timer
            }
            Self::Transmit { payload_timer, .. } => payload_timer,
        }
    }
}

/// 每步提交到历史中的一条记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRecord {
    #[serde(flatten)]
    pub state: NodeState,
    /// 连续活跃步数（睡眠阶段）
    pub sleep_stage: u32,
}

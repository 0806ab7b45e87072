//! DCF 节点
//!
//! 每个节点是一个离散时间有限状态机：生成流量、随机退避与睡眠、尝试发送，
//! 并在与其他节点同时发送时被迫重试。

// 子模块声明
mod node;
mod packet;
mod queue;
mod result;
mod seed;
mod state;
mod trace;

// 重新导出公共接口
pub use node::DcfNode;
pub use packet::Packet;
pub use queue::TxQueue;
pub use result::{NodeResult, WaitTally, threshold_steps};
pub use seed::{NodeSeed, mix_seed};
pub use state::{NodeState, StateKind, TickRecord};
pub use trace::NodeTrace;

//! 信道仿真模块
//!
//! 此模块包含离散时间信道仿真的核心组件：节点标识、逐步观察者、信道统计与仿真器。

// 子模块声明
mod id;
mod observer;
mod simulator;
mod stats;

// 重新导出公共接口
pub use id::NodeId;
pub use observer::{ChannelObserver, NoopObserver, TickOutcome};
pub use simulator::{ChannelSimulator, RunResult};
pub use stats::ChannelStats;

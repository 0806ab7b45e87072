//! 流量参数
//!
//! 单个节点的随机行为参数：到达率、载荷分布、退避窗口、睡眠与间歇参数，
//! 以及由这些参数派生出的查找表和若干预设流量类型。

// 子模块声明
mod error;
mod kind;
mod payload;
mod profile;

// 重新导出公共接口
pub use error::ConfigError;
pub use kind::TrafficKind;
pub use payload::PayloadDistribution;
pub use profile::{DerivedTables, TrafficProfile};

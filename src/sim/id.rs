//! 标识符类型
//!
//! 定义信道上节点的唯一标识符。

use serde::{Deserialize, Serialize};

/// 节点标识符（加入信道的顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

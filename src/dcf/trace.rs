//! 单节点运行轨迹

use serde::{Deserialize, Serialize};

use super::packet::Packet;
use super::state::TickRecord;

/// 可选的完整轨迹：逐步状态、已发送数据包以及运行结束时仍未发送的数据包
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTrace {
    pub states: Vec<TickRecord>,
    pub sent: Vec<Packet>,
    pub queued: Vec<Packet>,
}

//! 物理层参数
//!
//! 一个仿真步 = 一次完整的传输事务（载荷 + 开销 + SIFS + ACK + DIFS）。

use serde::{Deserialize, Serialize};

use super::network_type::NetworkType;

/// 网络类型 + 名义载荷大小
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Physical80211 {
    pub network: NetworkType,
    pub payload_bits: u64,
}

impl Physical80211 {
    pub fn new(network: NetworkType, payload_bits: u64) -> Self {
        Self {
            network,
            payload_bits,
        }
    }

    pub fn from_payload_bytes(network: NetworkType, payload_bytes: u32) -> Self {
        Self::new(network, u64::from(payload_bytes).saturating_mul(8))
    }

    /// 单个载荷字节数
    pub fn payload_bytes(&self) -> u32 {
        u32::try_from(self.payload_bits / 8).unwrap_or(u32::MAX)
    }

    /// 完整发送一个数据包所需时间（微秒）
    pub fn transaction_time_us(network: NetworkType, payload_bits: u64) -> f64 {
        let bits_per_us = network.raw_datarate() / 1_000_000.0;
        let payload_us = payload_bits as f64 / bits_per_us;
        payload_us + network.difs() + network.overhead_time() + network.sifs() + network.ack()
    }

    /// 本配置下一个仿真步对应的真实时长（微秒）
    pub fn transaction_time(&self) -> f64 {
        Self::transaction_time_us(self.network, self.payload_bits)
    }

    /// 单个退避窗口的时长（微秒），与一次事务等长
    pub fn backoff_time(&self) -> f64 {
        self.transaction_time()
    }

    pub fn steps_per_second(&self) -> f64 {
        1_000_000.0 / self.transaction_time()
    }

    pub fn seconds_per_step(&self) -> f64 {
        self.transaction_time() / 1_000_000.0
    }

    /// 把外部输入的 bps 换算为每步到达的数据包数
    pub fn packet_arrival_rate(&self, incoming_bps: f64) -> f64 {
        if self.payload_bits == 0 {
            return 0.0;
        }
        let packets_per_second = incoming_bps / self.payload_bits as f64;
        packets_per_second * self.seconds_per_step()
    }

    /// 无竞争时单节点的最大有效速率（bps）
    ///
    /// `avg_backoff` 为每次发送后平均等待的退避步数。
    pub fn max_effective_datarate(&self, avg_backoff: f64) -> f64 {
        let transmit_s = self.seconds_per_step();
        let backoff_s = avg_backoff.max(0.0) * self.backoff_time() / 1_000_000.0;
        let busy_fraction = transmit_s / (transmit_s + backoff_s);
        self.payload_bits as f64 * busy_fraction / transmit_s
    }

    /// 信道完全饱和、没有任何退避时的理论上限（bps）
    pub fn max_channel_datarate(&self) -> f64 {
        self.max_effective_datarate(0.0)
    }
}

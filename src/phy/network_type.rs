//! 网络类型
//!
//! 传统 802.11 物理层变体及其固定时序参数（单位：微秒 / bps）。

use serde::{Deserialize, Serialize};

/// 传统 802.11 物理层变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    /// 1-2 Mbit
    Fhss,
    /// 1-2 Mbit
    Dhss,
    /// 1-11 Mbit
    B,
    /// 1.5-54 Mbit
    A,
    /// 1-54 Mbit，短时隙
    GShort,
    /// 1-54 Mbit，长时隙
    GLong,
    /// 1-600 Mbit，2.4 GHz
    N24,
    /// 1-600 Mbit，5 GHz
    N50,
    /// 1-500 Mbit
    Ac,
}

impl NetworkType {
    pub const ALL: [NetworkType; 9] = [
        Self::Fhss,
        Self::Dhss,
        Self::B,
        Self::A,
        Self::GShort,
        Self::GLong,
        Self::N24,
        Self::N50,
        Self::Ac,
    ];

    /// 宽松解析：忽略大小写、`802.11` 前缀以及 `-`/`_`/空格。
    pub fn parse(raw: &str) -> Result<Self, String> {
        let compact: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect();
        let compact = compact.strip_prefix("80211").unwrap_or(&compact);
        match compact {
            "fhss" => Ok(Self::Fhss),
            "dhss" | "dsss" => Ok(Self::Dhss),
            "b" => Ok(Self::B),
            "a" => Ok(Self::A),
            "gshort" | "g" => Ok(Self::GShort),
            "glong" => Ok(Self::GLong),
            "n24" | "n" => Ok(Self::N24),
            "n50" => Ok(Self::N50),
            "ac" => Ok(Self::Ac),
            _ => Err(format!("unknown network type: {raw}")),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Fhss => "802.11 FHSS",
            Self::Dhss => "802.11 DHSS",
            Self::B => "802.11 B",
            Self::A => "802.11 A",
            Self::GShort => "802.11 G (short)",
            Self::GLong => "802.11 G (long)",
            Self::N24 => "802.11 N (24)",
            Self::N50 => "802.11 N (50)",
            Self::Ac => "802.11 AC",
        }
    }

    /// 理想条件下的原始比特率（bps）
    pub fn raw_datarate(self) -> f64 {
        match self {
            Self::Fhss | Self::Dhss => 2_000_000.0,
            Self::B => 11_000_000.0,
            Self::A | Self::GShort | Self::GLong => 54_000_000.0,
            Self::N24 | Self::N50 => 600_000_000.0,
            Self::Ac => 500_000_000.0,
        }
    }

    /// 时隙长度（微秒）
    pub fn slot_time(self) -> f64 {
        match self {
            Self::Fhss => 50.0,
            Self::Dhss | Self::B | Self::GLong | Self::N24 => 20.0,
            Self::A | Self::GShort | Self::N50 | Self::Ac => 9.0,
        }
    }

    /// SIFS（微秒）
    pub fn sifs(self) -> f64 {
        match self {
            Self::Fhss => 28.0,
            Self::Dhss | Self::B | Self::GShort | Self::GLong | Self::N24 => 10.0,
            Self::A | Self::N50 | Self::Ac => 16.0,
        }
    }

    /// 发送 ACK 所需时间（微秒）
    pub fn ack(self) -> f64 {
        match self {
            Self::Fhss | Self::Dhss => 200.0,
            Self::B => 203.0,
            _ => 24.0,
        }
    }

    /// 每个载荷附带的前导/头部开销时间（微秒）
    pub fn overhead_time(self) -> f64 {
        match self {
            Self::Fhss | Self::Dhss => 200.0,
            Self::B => 192.0,
            _ => 20.0,
        }
    }

    /// DIFS = SIFS + 2 * slot
    pub fn difs(self) -> f64 {
        self.sifs() + 2.0 * self.slot_time()
    }

    /// PIFS = SIFS + slot
    pub fn pifs(self) -> f64 {
        self.sifs() + self.slot_time()
    }
}

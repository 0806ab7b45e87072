//! 预设流量类型
//!
//! 几种典型应用的经验参数：视频通话、流媒体、BT 下载、网页浏览与饱和流。

use serde::{Deserialize, Serialize};

use super::payload::PayloadDistribution;
use super::profile::TrafficProfile;
use crate::phy::Physical80211;

/// 预设载荷分布中最大载荷的步数
const PRESET_MAX_PAYLOAD_STEPS: u32 = 4;

/// 流量类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficKind {
    Custom,
    SkypeVideo,
    #[serde(rename = "youtube")]
    YouTube,
    #[serde(rename = "bittorrent")]
    BitTorrent,
    WebBrowsing,
    ConstantStream,
}

impl TrafficKind {
    /// 除 `Custom` 外的全部预设
    pub const PRESETS: [TrafficKind; 5] = [
        Self::SkypeVideo,
        Self::YouTube,
        Self::BitTorrent,
        Self::WebBrowsing,
        Self::ConstantStream,
    ];

    pub fn parse(raw: &str) -> Result<Self, String> {
        let compact: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .filter(|ch| *ch != '_' && *ch != '-' && !ch.is_whitespace())
            .collect();
        match compact.as_str() {
            "custom" | "xx" => Ok(Self::Custom),
            "skypevideo" | "sv" => Ok(Self::SkypeVideo),
            "youtube" | "yt" => Ok(Self::YouTube),
            "bittorrent" | "bt" => Ok(Self::BitTorrent),
            "webbrowsing" | "web" | "wb" => Ok(Self::WebBrowsing),
            "constantstream" | "constant" | "cs" => Ok(Self::ConstantStream),
            _ => Err(format!("unknown traffic kind: {raw}")),
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Self::SkypeVideo => "SV",
            Self::YouTube => "YT",
            Self::BitTorrent => "BT",
            Self::WebBrowsing => "WB",
            Self::ConstantStream => "CS",
            Self::Custom => "XX",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SkypeVideo => "SkypeVideo",
            Self::YouTube => "YouTube",
            Self::BitTorrent => "BitTorrent",
            Self::WebBrowsing => "WebBrowsing",
            Self::ConstantStream => "ConstantStream",
            Self::Custom => "Custom",
        }
    }

    /// 构建预设参数；`Custom` 没有预设，返回 `None`
    ///
    /// `incoming_bps` 为该节点上游输入的比特率。
    pub fn preset(self, phy: &Physical80211, incoming_bps: f64) -> Option<TrafficProfile> {
        let bytes_per_step = phy.payload_bytes();
        let biased = |p_small| {
            PayloadDistribution::small_biased(bytes_per_step, p_small, PRESET_MAX_PAYLOAD_STEPS)
        };
        let mut cfg = TrafficProfile {
            kind: self,
            arrival_rate: phy.packet_arrival_rate(incoming_bps),
            payload: biased(0.8),
            ..TrafficProfile::default()
        };

        match self {
            Self::Custom => return None,
            Self::BitTorrent => {
                // 完全依赖缓冲区形成间隔
                cfg.p_interarrival = 0.0;
                cfg.awake_time = 25;
                cfg.drowsy_time = 100;
                cfg.p_drowsy_sleep = 0.01;
                cfg.min_sleep = 1;
                cfg.max_sleep = 25;
                cfg.min_buffer_empty_sleep = 100;
                cfg.max_buffer_empty_sleep = 500;
            }
            Self::WebBrowsing => {
                // 突发之间有较多空隙
                cfg.p_interarrival = 0.65;
                cfg.min_interarrival = 2;
                cfg.max_interarrival = 15;
                cfg.awake_time = 50;
                cfg.drowsy_time = 150;
                cfg.p_drowsy_sleep = 0.01;
                cfg.min_sleep = 1;
                cfg.max_sleep = 100;
                cfg.min_buffer_empty_sleep = 250;
                cfg.max_buffer_empty_sleep = 1750;
            }
            Self::SkypeVideo => {
                // 间歇频繁且很短，睡眠也很短
                cfg.p_interarrival = 0.25;
                cfg.min_interarrival = 1;
                cfg.max_interarrival = 8;
                cfg.awake_time = 5;
                cfg.drowsy_time = 200;
                cfg.p_drowsy_sleep = 0.02;
                cfg.min_sleep = 1;
                cfg.max_sleep = 8;
                cfg.min_buffer_empty_sleep = 1;
                cfg.max_buffer_empty_sleep = 100;
                cfg.payload = biased(0.26);
            }
            Self::YouTube => {
                // 长缓冲：活跃期很长，空缓冲时等待也很长
                cfg.p_interarrival = 0.7;
                cfg.min_interarrival = 1;
                cfg.max_interarrival = 10;
                cfg.awake_time = 500;
                cfg.drowsy_time = 500;
                cfg.p_drowsy_sleep = 0.001;
                cfg.min_sleep = 100;
                cfg.max_sleep = 200;
                cfg.min_buffer_empty_sleep = 2400;
                cfg.max_buffer_empty_sleep = 2600;
                cfg.payload = biased(0.56);
            }
            Self::ConstantStream => {
                // 饱和流：不间歇、不睡眠、总是单步载荷
                cfg.p_interarrival = 0.0;
                cfg.awake_time = 0;
                cfg.drowsy_time = 0;
                cfg.p_drowsy_sleep = 0.0;
                cfg.min_sleep = 0;
                cfg.max_sleep = 0;
                cfg.payload = PayloadDistribution::single(bytes_per_step);
            }
        }

        Some(cfg)
    }
}

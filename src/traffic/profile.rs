//! 节点流量参数
//!
//! 由外部构建，仿真期间只读。`validate` 同时负责派生退避窗口表与睡眠概率表。

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::kind::TrafficKind;
use super::payload::PayloadDistribution;

/// 一个节点的完整流量参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficProfile {
    #[serde(default = "default_kind")]
    pub kind: TrafficKind,
    /// 每步期望到达的数据包数（小数部分跨步累积）
    pub arrival_rate: f64,
    pub payload: PayloadDistribution,

    /// 竞争窗口上下界，max/min 必须是 2 的幂
    pub min_backoff: u32,
    pub max_backoff: u32,

    /// 队列较浅时主动暂停的步数范围 `[min, max)`
    pub min_interarrival: u32,
    pub max_interarrival: u32,
    /// 只有队列长度低于该值时才可能进入间歇
    pub interarrival_cutoff: u32,
    pub p_interarrival: f64,

    /// 深度睡眠时长范围 `[min, max)`；`min_sleep == 0` 表示从不睡眠
    pub min_sleep: u32,
    pub max_sleep: u32,
    /// 缓冲区为空时的轮询间隔 `[min, max)`
    pub min_buffer_empty_sleep: u32,
    pub max_buffer_empty_sleep: u32,

    /// 连续活跃步数低于 awake_time 时不会睡眠
    pub awake_time: u32,
    /// 之后 drowsy_time 步内以 p_drowsy_sleep 概率睡眠，超出则强制睡眠
    pub drowsy_time: u32,
    pub p_drowsy_sleep: f64,
}

fn default_kind() -> TrafficKind {
    TrafficKind::Custom
}

impl Default for TrafficProfile {
    fn default() -> Self {
        Self {
            kind: TrafficKind::Custom,
            arrival_rate: 0.1,
            payload: PayloadDistribution::small_biased(1500, 0.8, 4),
            min_backoff: 8,
            max_backoff: 32,
            min_interarrival: 1,
            max_interarrival: 4,
            interarrival_cutoff: 5,
            p_interarrival: 0.0,
            min_sleep: 1,
            max_sleep: 200,
            min_buffer_empty_sleep: 10,
            max_buffer_empty_sleep: 50,
            awake_time: 300,
            drowsy_time: 100,
            p_drowsy_sleep: 0.05,
        }
    }
}

/// 由 `TrafficProfile` 一次性派生、整个运行期间不变的查找表
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTables {
    /// `backoff_windows[stage] = 2^stage * min_backoff - 1`
    pub backoff_windows: Vec<u32>,
    /// 按连续活跃步数索引的睡眠概率，最后一项恒为 1.0
    pub sleep_probabilities: Vec<f64>,
    /// `min_interarrival == 0` 时被强制为 0
    pub p_interarrival: f64,
}

impl DerivedTables {
    pub fn backoff_stages(&self) -> u32 {
        u32::try_from(self.backoff_windows.len()).unwrap_or(u32::MAX)
    }

    /// 指定阶段（从 1 开始）的退避窗口
    pub fn backoff_window(&self, stage: u32) -> u32 {
        let idx = stage.clamp(1, self.backoff_stages()) as usize - 1;
        self.backoff_windows[idx]
    }

    /// 连续活跃步数对应的睡眠概率（超出表长时取最后一项）
    pub fn sleep_probability(&self, sleep_stage: u32) -> f64 {
        let last = self.sleep_probabilities.len() - 1;
        self.sleep_probabilities[(sleep_stage as usize).min(last)]
    }
}

impl TrafficProfile {
    /// 校验参数并派生查找表
    pub fn validate(&self) -> Result<DerivedTables, ConfigError> {
        if !self.arrival_rate.is_finite() || self.arrival_rate < 0.0 {
            return Err(ConfigError::ArrivalRate(self.arrival_rate));
        }
        self.payload.validate()?;
        check_probability("p_interarrival", self.p_interarrival)?;
        check_probability("p_drowsy_sleep", self.p_drowsy_sleep)?;
        check_range("interarrival", self.min_interarrival, self.max_interarrival)?;
        check_range("sleep", self.min_sleep, self.max_sleep)?;
        check_range(
            "buffer_empty_sleep",
            self.min_buffer_empty_sleep,
            self.max_buffer_empty_sleep,
        )?;

        Ok(DerivedTables {
            backoff_windows: self.backoff_windows()?,
            sleep_probabilities: self.sleep_probabilities(),
            p_interarrival: if self.min_interarrival == 0 {
                0.0
            } else {
                self.p_interarrival
            },
        })
    }

    /// `1 + log2(max_backoff / min_backoff)`
    pub fn backoff_stages(&self) -> Result<u32, ConfigError> {
        let bad = ConfigError::BackoffBounds {
            min: self.min_backoff,
            max: self.max_backoff,
        };
        if self.min_backoff == 0 || self.max_backoff < self.min_backoff {
            return Err(bad);
        }
        if self.max_backoff % self.min_backoff != 0 {
            return Err(bad);
        }
        let ratio = self.max_backoff / self.min_backoff;
        if !ratio.is_power_of_two() {
            return Err(bad);
        }
        Ok(1 + ratio.trailing_zeros())
    }

    fn backoff_windows(&self) -> Result<Vec<u32>, ConfigError> {
        let stages = self.backoff_stages()?;
        // 一步用于发送本身，因此每个阶段可选的退避步数比窗口列数少 1
        Ok((0..stages)
            .map(|stage| (self.min_backoff << stage) - 1)
            .collect())
    }

    fn sleep_probabilities(&self) -> Vec<f64> {
        let awake = self.awake_time as usize;
        let drowsy = self.drowsy_time as usize;
        let mut table = vec![0.0; awake + drowsy + 1];
        for p in &mut table[awake..awake + drowsy] {
            *p = self.p_drowsy_sleep;
        }
        table[awake + drowsy] = 1.0;
        table
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { name, value })
    }
}

fn check_range(name: &'static str, min: u32, max: u32) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedRange { name, min, max });
    }
    Ok(())
}

//! 载荷大小分布
//!
//! 以累积概率表描述载荷分箱，抽样时取第一个累积概率大于均匀随机数的分箱。

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// 累积概率容差（与外部统计得到的分布对齐）
const CUMULATIVE_TOLERANCE: f64 = 1e-4;

/// 载荷大小的累积分布
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadDistribution {
    /// 各分箱的载荷大小（字节）
    pub bins: Vec<u32>,
    /// 累积概率，与 `bins` 一一对应
    pub cumulative: Vec<f64>,
    /// 每个仿真步可承载的字节数
    pub bytes_per_step: u32,
}

impl PayloadDistribution {
    /// 校验并构建；末项在容差范围内时被规整为精确的 1.0
    pub fn new(
        bins: Vec<u32>,
        cumulative: Vec<f64>,
        bytes_per_step: u32,
    ) -> Result<Self, ConfigError> {
        let mut dist = Self {
            bins,
            cumulative,
            bytes_per_step,
        };
        dist.validate()?;
        if let Some(last) = dist.cumulative.last_mut() {
            *last = 1.0;
        }
        Ok(dist)
    }

    /// 只有一个分箱：每个数据包恰好占用一个仿真步
    pub fn single(bytes_per_step: u32) -> Self {
        Self {
            bins: vec![bytes_per_step.max(1)],
            cumulative: vec![1.0],
            bytes_per_step: bytes_per_step.max(1),
        }
    }

    /// 最小载荷（1 步）的概率为 `p_small`，其余概率平均分配到 2..=`max_steps` 步
    pub fn small_biased(bytes_per_step: u32, p_small: f64, max_steps: u32) -> Self {
        let bytes_per_step = bytes_per_step.max(1);
        if max_steps <= 1 {
            return Self::single(bytes_per_step);
        }
        let p_small = p_small.clamp(0.0, 1.0);
        let rest = f64::from(max_steps - 1);
        let bins = (1..=max_steps)
            .map(|steps| steps.saturating_mul(bytes_per_step))
            .collect();
        let mut cumulative: Vec<f64> = (0..max_steps)
            .map(|i| p_small + (1.0 - p_small) * f64::from(i) / rest)
            .collect();
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }
        Self {
            bins,
            cumulative,
            bytes_per_step,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bytes_per_step == 0 {
            return Err(ConfigError::ZeroBytesPerStep);
        }
        if self.bins.is_empty() {
            return Err(ConfigError::EmptyPayloadDistribution);
        }
        if self.bins.len() != self.cumulative.len() {
            return Err(ConfigError::PayloadLengthMismatch {
                bins: self.bins.len(),
                probabilities: self.cumulative.len(),
            });
        }
        if let Some(index) = self.bins.iter().position(|b| *b == 0) {
            return Err(ConfigError::ZeroPayloadBin { index });
        }

        let mut prev = 0.0;
        for (index, &value) in self.cumulative.iter().enumerate() {
            if !value.is_finite() || value < prev || value > 1.0 + CUMULATIVE_TOLERANCE {
                return Err(ConfigError::NonMonotonicPayload { index, value });
            }
            prev = value;
        }
        if (prev - 1.0).abs() > CUMULATIVE_TOLERANCE {
            return Err(ConfigError::UnnormalizedPayload(prev));
        }
        Ok(())
    }

    /// 字节数换算为发送所需步数：`1 + (bytes - 1) / bytes_per_step`
    pub fn steps_for_bytes(&self, bytes: u32) -> u32 {
        1 + bytes.saturating_sub(1) / self.bytes_per_step.max(1)
    }

    /// 第一个累积概率严格大于 `u` 的分箱；浮点误差兜底到最后一个分箱
    pub fn sample_bin(&self, u: f64) -> usize {
        self.cumulative
            .iter()
            .position(|c| *c > u)
            .unwrap_or(self.bins.len().saturating_sub(1))
    }

    /// 按均匀随机数 `u` 抽取一个载荷并返回其步数
    pub fn sample_steps(&self, u: f64) -> u32 {
        let bin = self.sample_bin(u);
        let bytes = self.bins.get(bin).copied().unwrap_or(self.bytes_per_step);
        self.steps_for_bytes(bytes)
    }

    /// 载荷步数的期望值
    pub fn mean_steps(&self) -> f64 {
        let mut prev = 0.0;
        let mut mean = 0.0;
        for (bytes, cum) in self.bins.iter().zip(&self.cumulative) {
            mean += (cum - prev) * f64::from(self.steps_for_bytes(*bytes));
            prev = *cum;
        }
        mean
    }
}

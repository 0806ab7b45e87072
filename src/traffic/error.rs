//! 配置错误
//!
//! 在节点构造阶段检测，直接终止本次仿真的构建，不做重试。

/// 流量参数校验失败
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("backoff bounds must be positive with max/min a power of two (min={min}, max={max})")]
    BackoffBounds { min: u32, max: u32 },

    #[error("payload distribution has no bins")]
    EmptyPayloadDistribution,

    #[error("payload distribution has {bins} bins but {probabilities} cumulative probabilities")]
    PayloadLengthMismatch { bins: usize, probabilities: usize },

    #[error("cumulative payload probabilities must be non-decreasing within [0, 1] (index {index}: {value})")]
    NonMonotonicPayload { index: usize, value: f64 },

    #[error("cumulative payload probabilities must end at 1.0 (got {0})")]
    UnnormalizedPayload(f64),

    #[error("payload bin {index} has zero bytes")]
    ZeroPayloadBin { index: usize },

    #[error("bytes per step must be positive")]
    ZeroBytesPerStep,

    #[error("probability `{name}` must lie in [0, 1] (got {value})")]
    Probability { name: &'static str, value: f64 },

    #[error("range `{name}` is inverted (min={min}, max={max})")]
    InvertedRange { name: &'static str, min: u32, max: u32 },

    #[error("arrival rate must be finite and non-negative (got {0})")]
    ArrivalRate(f64),
}

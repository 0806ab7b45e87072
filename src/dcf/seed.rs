//! 随机数种子
//!
//! 种子由调用方显式提供；负数种子表示请求一个尽力唯一的非复现种子。

use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// 节点随机流的种子来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSeed {
    /// 可复现
    Fixed(u64),
    /// 墙钟时间混合调用方给出的盐（通常是节点序号）
    Entropy { salt: u64 },
}

impl NodeSeed {
    /// 非负为固定种子，负数为非复现种子
    pub fn from_raw(seed: i64, salt: u64) -> Self {
        match u64::try_from(seed) {
            Ok(seed) => Self::Fixed(seed),
            Err(_) => Self::Entropy { salt },
        }
    }

    /// 为一次重复运行中的某个节点派生互不相同的种子
    pub fn for_run(seed: i64, run_index: u64, node_index: u64) -> Self {
        let salt = mix_seed(run_index, node_index);
        match u64::try_from(seed) {
            Ok(base) => Self::Fixed(mix_seed(base, salt)),
            Err(_) => Self::Entropy { salt },
        }
    }

    pub fn into_rng(self) -> ChaCha8Rng {
        match self {
            Self::Fixed(seed) => ChaCha8Rng::seed_from_u64(seed),
            Self::Entropy { salt } => {
                let nanos = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_nanos() as u64)
                    .unwrap_or(0);
                ChaCha8Rng::seed_from_u64(mix_seed(nanos, salt))
            }
        }
    }
}

/// splitmix64 风格的两值混合
pub fn mix_seed(a: u64, b: u64) -> u64 {
    let mut z = a
        .wrapping_add(b.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

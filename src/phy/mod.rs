//! 802.11 物理层时间模型
//!
//! 把网络类型与载荷大小换算成真实时间：时隙、SIFS/DIFS/PIFS、单次传输事务时长，
//! 以及每秒仿真步数。本模块无状态，全部为纯函数。

// 子模块声明
mod network_type;
mod physical;

// 重新导出公共接口
pub use network_type::NetworkType;
pub use physical::Physical80211;

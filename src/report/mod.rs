//! 结果输出
//!
//! 数据包轨迹 CSV、逐步状态 CSV、分组均值 CSV 与 JSON 汇总。

// 子模块声明
mod csv;
mod json;

// 重新导出公共接口
pub use csv::{
    PACKET_TRACE_HEADER, STATE_TRACE_HEADER, write_aggregate_csv, write_group_trace_csv,
    write_packet_trace_csv, write_state_trace_csv,
};
pub use json::write_summary_json;

//! 实验编排
//!
//! 从 JSON 实验描述生成一组仿真计划，按重复次数并行运行并汇总主节点指标。

// 子模块声明
mod aggregate;
mod error;
mod plan;
mod runner;
mod spec;

// 重新导出公共接口
pub use aggregate::Aggregate;
pub use error::ExperimentError;
pub use plan::{NodePlan, SimulationPlan, build_plans};
pub use runner::{ExperimentResults, ExperimentRunner, PlanResult};
pub use spec::{ExperimentSpec, NodeGroupSpec, SweepMode};

//! 实验运行器
//!
//! 各计划的每次重复运行互相独立，统一交给 rayon 并行执行；单次运行内部严格串行。

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use super::aggregate::Aggregate;
use super::error::ExperimentError;
use super::plan::{SimulationPlan, build_plans};
use super::spec::{ExperimentSpec, SweepMode};
use crate::dcf::{DcfNode, NodeSeed};
use crate::phy::{NetworkType, Physical80211};
use crate::sim::{ChannelSimulator, RunResult};

pub struct ExperimentRunner {
    spec: ExperimentSpec,
    plans: Vec<SimulationPlan>,
    steps: u64,
}

impl ExperimentRunner {
    pub fn new(spec: ExperimentSpec) -> Result<Self, ExperimentError> {
        if spec.mode == SweepMode::Singles && spec.main.is_some() {
            warn!("singles 模式忽略 main 节点配置");
        }
        let plans = build_plans(&spec)?;
        let steps = spec.total_steps();
        Ok(Self { spec, plans, steps })
    }

    pub fn spec(&self) -> &ExperimentSpec {
        &self.spec
    }

    pub fn plans(&self) -> &[SimulationPlan] {
        &self.plans
    }

    /// 每次运行的步数
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn phy(&self) -> Physical80211 {
        self.spec.phy()
    }

    /// 运行全部计划，保持计划顺序与重复顺序
    #[tracing::instrument(skip(self), fields(experiment = %self.spec.display_name()))]
    pub fn run(&self) -> Result<ExperimentResults, ExperimentError> {
        info!(
            plans = self.plans.len(),
            repetitions = self.spec.repetitions,
            steps = self.steps,
            "▶️  开始运行实验"
        );

        // 所有 (计划, 重复) 一起并行，collect 保持顺序
        let reps = self.spec.repetitions as usize;
        let jobs: Vec<(usize, u64)> = (0..self.plans.len())
            .flat_map(|pi| (0..reps as u64).map(move |run_index| (pi, run_index)))
            .collect();
        let all_runs = jobs
            .into_par_iter()
            .map(|(pi, run_index)| self.run_once(&self.plans[pi], run_index))
            .collect::<Result<Vec<_>, _>>()?;

        let mut all_runs = all_runs.into_iter();
        let mut plans = Vec::with_capacity(self.plans.len());
        for plan in &self.plans {
            let runs: Vec<RunResult> = all_runs.by_ref().take(reps).collect();
            let aggregate = Aggregate::from_runs(&runs);
            info!(
                plan = %plan.name,
                group = %plan.group,
                datarate_bps = aggregate.datarate,
                over_threshold = aggregate.packets_over_threshold,
                "计划完成"
            );
            plans.push(PlanResult {
                name: plan.name.clone(),
                group: plan.group.clone(),
                index: plan.index,
                aggregate,
                runs,
            });
        }

        info!(plans = plans.len(), "✅ 实验完成");
        Ok(ExperimentResults {
            name: self.spec.display_name(),
            network: self.spec.network,
            payload_bits: self.phy().payload_bits,
            steps: self.steps,
            plans,
        })
    }

    /// 按计划构建一个全新的仿真并运行
    pub fn run_once(
        &self,
        plan: &SimulationPlan,
        run_index: u64,
    ) -> Result<RunResult, ExperimentError> {
        let mut sim =
            ChannelSimulator::new(self.phy()).with_name(&plan.name, &plan.group, run_index);
        for (node_index, node) in plan.nodes.iter().enumerate() {
            let seed = NodeSeed::for_run(self.spec.seed, run_index, node_index as u64);
            let node = DcfNode::new(&node.name, node.profile.clone(), seed)?
                .with_quality_threshold(node.quality_threshold)
                .with_trace(self.spec.keep_trace);
            sim.add_node(node);
        }
        Ok(sim.run_steps(self.steps))
    }
}

/// 单个计划的全部重复运行与均值
#[derive(Debug, Clone, Serialize)]
pub struct PlanResult {
    pub name: String,
    pub group: String,
    pub index: u32,
    pub aggregate: Aggregate,
    pub runs: Vec<RunResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperimentResults {
    pub name: String,
    pub network: NetworkType,
    pub payload_bits: u64,
    pub steps: u64,
    pub plans: Vec<PlanResult>,
}

impl ExperimentResults {
    pub fn plan(&self, name: &str) -> Option<&PlanResult> {
        self.plans.iter().find(|p| p.name == name)
    }

    /// 按分组名聚合计划（保持首次出现的顺序）
    pub fn groups(&self) -> Vec<(&str, Vec<&PlanResult>)> {
        let mut groups: Vec<(&str, Vec<&PlanResult>)> = Vec::new();
        for plan in &self.plans {
            match groups.iter_mut().find(|(g, _)| *g == plan.group) {
                Some((_, members)) => members.push(plan),
                None => groups.push((plan.group.as_str(), vec![plan])),
            }
        }
        groups
    }
}

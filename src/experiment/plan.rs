//! 仿真计划生成
//!
//! 每个计划对应一组固定的节点（主节点在前），按扫描方式枚举竞争节点数量。

use serde::Serialize;
use tracing::debug;

use super::error::ExperimentError;
use super::spec::{ExperimentSpec, NodeGroupSpec, SweepMode};
use crate::phy::Physical80211;
use crate::traffic::TrafficProfile;

/// 计划中的单个节点
#[derive(Debug, Clone, Serialize)]
pub struct NodePlan {
    pub name: String,
    pub profile: TrafficProfile,
    pub quality_threshold: f64,
}

/// 一次仿真的节点组成；重复运行共享同一计划
#[derive(Debug, Clone, Serialize)]
pub struct SimulationPlan {
    pub name: String,
    pub group: String,
    pub index: u32,
    pub nodes: Vec<NodePlan>,
}

/// 按扫描方式生成全部计划（保持生成顺序）
pub fn build_plans(spec: &ExperimentSpec) -> Result<Vec<SimulationPlan>, ExperimentError> {
    spec.validate()?;
    let phy = spec.phy();
    let competing = &spec.competing;

    let plans = match (spec.mode, &spec.main) {
        (SweepMode::Singles, _) => singles(&phy, competing)?,
        (_, None) => return Err(ExperimentError::NoMainNode { mode: spec.mode }),
        (_, Some(main)) if competing.is_empty() => {
            vec![make_plan(&phy, main, competing, &[], None, 0)?]
        }
        (SweepMode::Incremental, Some(main)) => incremental(&phy, main, competing)?,
        (SweepMode::Cartesian, Some(main)) => cartesian(&phy, main, competing)?,
    };

    debug!(mode = %spec.mode, plans = plans.len(), "仿真计划生成完成");
    Ok(plans)
}

/// 主节点对抗竞争数量在 `[min, max]` 内的所有组合（最后一维变化最快）
fn cartesian(
    phy: &Physical80211,
    main: &NodeGroupSpec,
    competing: &[NodeGroupSpec],
) -> Result<Vec<SimulationPlan>, ExperimentError> {
    let mut plans = Vec::new();
    let mut counts: Vec<u32> = competing.iter().map(|g| g.min_nodes).collect();
    let mut index = 0;

    'outer: loop {
        plans.push(make_plan(phy, main, competing, &counts, None, index)?);
        index += 1;

        let mut i = counts.len();
        loop {
            if i == 0 {
                break 'outer;
            }
            i -= 1;
            counts[i] += 1;
            if counts[i] <= competing[i].max_nodes {
                break;
            }
            counts[i] = competing[i].min_nodes;
        }
    }
    Ok(plans)
}

/// 每种竞争类型单独变化，数量取 `[min, max)`，其余为 0；按类型分组
fn incremental(
    phy: &Physical80211,
    main: &NodeGroupSpec,
    competing: &[NodeGroupSpec],
) -> Result<Vec<SimulationPlan>, ExperimentError> {
    let mut plans = Vec::new();
    for (ci, group) in competing.iter().enumerate() {
        let group_name = group.traffic.name().to_string();
        for n in group.min_nodes..group.max_nodes {
            let mut counts = vec![0; competing.len()];
            counts[ci] = n;
            plans.push(make_plan(
                phy,
                main,
                competing,
                &counts,
                Some(group_name.clone()),
                n,
            )?);
        }
    }
    Ok(plans)
}

/// 每种竞争类型轮流作为主节点：自身再加 `max - 1` 个副本，其余类型取最小值
fn singles(
    phy: &Physical80211,
    competing: &[NodeGroupSpec],
) -> Result<Vec<SimulationPlan>, ExperimentError> {
    let mut plans = Vec::new();
    for (mi, main) in competing.iter().enumerate() {
        let counts: Vec<u32> = competing
            .iter()
            .enumerate()
            .map(|(ci, g)| {
                if ci == mi {
                    g.max_nodes.saturating_sub(1)
                } else {
                    g.min_nodes
                }
            })
            .collect();
        plans.push(make_plan(
            phy,
            main,
            competing,
            &counts,
            Some(main.traffic.name().to_string()),
            1,
        )?);
    }
    Ok(plans)
}

fn plan_name(main: &NodeGroupSpec, competing: &[NodeGroupSpec], counts: &[u32]) -> String {
    let mut name = format!("main-{}_", main.traffic.short_name());
    for (group, n) in competing.iter().zip(counts) {
        name.push_str(&format!("_{}-{}", group.traffic.short_name(), n));
    }
    name
}

fn make_plan(
    phy: &Physical80211,
    main: &NodeGroupSpec,
    competing: &[NodeGroupSpec],
    counts: &[u32],
    group: Option<String>,
    index: u32,
) -> Result<SimulationPlan, ExperimentError> {
    let name = plan_name(main, competing, counts);
    let mut nodes = Vec::new();
    push_nodes(&mut nodes, phy, main, "main", 1)?;
    for (spec, n) in competing.iter().zip(counts) {
        push_nodes(&mut nodes, phy, spec, "node", *n)?;
    }

    Ok(SimulationPlan {
        group: group.unwrap_or_else(|| name.clone()),
        name,
        index,
        nodes,
    })
}

fn push_nodes(
    nodes: &mut Vec<NodePlan>,
    phy: &Physical80211,
    spec: &NodeGroupSpec,
    prefix: &str,
    count: u32,
) -> Result<(), ExperimentError> {
    if count == 0 {
        return Ok(());
    }
    let profile = spec.resolve_profile(phy)?;
    // 参数错误在生成计划时返回
    profile.validate()?;
    for i in 1..=count {
        nodes.push(NodePlan {
            name: format!("{prefix}{}-{i}", spec.traffic.name()),
            profile: profile.clone(),
            quality_threshold: spec.quality_threshold,
        });
    }
    Ok(())
}

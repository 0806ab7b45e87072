//! 仿真器
//!
//! 定义离散时间信道仿真器：所有节点共享同一信道，按固定步长同步推进。

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::id::NodeId;
use super::observer::{ChannelObserver, NoopObserver, TickOutcome};
use super::stats::ChannelStats;
use crate::dcf::{DcfNode, NodeResult};
use crate::phy::{NetworkType, Physical80211};

/// 离散时间信道仿真器：维护节点集合、当前步与信道统计。
#[derive(Debug, Clone)]
pub struct ChannelSimulator {
    name: String,
    group: String,
    run_index: u64,
    phy: Physical80211,
    nodes: Vec<DcfNode>,
    stats: ChannelStats,
    tick: u64,
    initialized: bool,
}

impl ChannelSimulator {
    pub fn new(phy: Physical80211) -> Self {
        Self {
            name: String::new(),
            group: String::new(),
            run_index: 0,
            phy,
            nodes: Vec::new(),
            stats: ChannelStats::default(),
            tick: 0,
            initialized: false,
        }
    }

    /// 设置仿真名称、所属分组与重复运行序号
    pub fn with_name(
        mut self,
        name: impl Into<String>,
        group: impl Into<String>,
        run_index: u64,
    ) -> Self {
        self.name = name.into();
        self.group = group.into();
        self.run_index = run_index;
        self
    }

    /// 加入一个节点；第一个节点约定为主节点
    pub fn add_node(&mut self, node: DcfNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phy(&self) -> &Physical80211 {
        &self.phy
    }

    pub fn nodes(&self) -> &[DcfNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&DcfNode> {
        self.nodes.get(id.0)
    }

    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }

    /// 已推进的步数
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// 初始化所有节点；重复调用无效果
    pub fn initialize(&mut self, total_steps: u64) {
        if self.initialized {
            return;
        }
        for node in &mut self.nodes {
            node.initialize(total_steps, &self.phy);
        }
        self.initialized = true;
        debug!(
            sim = %self.name,
            nodes = self.nodes.len(),
            total_steps,
            "信道初始化完成"
        );
    }

    /// 推进一步，返回本步的信道结果
    ///
    /// 先让所有节点完成到达与状态推进，再判定冲突；超过一个节点发送时，
    /// 对每个节点调用 `fail`（非发送节点为空操作），最后统一提交。
    pub fn step(&mut self) -> TickOutcome {
        self.step_with(&mut NoopObserver)
    }

    fn step_with(&mut self, observer: &mut dyn ChannelObserver) -> TickOutcome {
        let mut transmitters = Vec::new();
        for (idx, node) in self.nodes.iter_mut().enumerate() {
            node.generate_arrivals();
            node.advance();
            if node.is_transmitting() {
                transmitters.push(NodeId(idx));
            }
        }

        let collided = transmitters.len() > 1;
        if collided {
            trace!(tick = self.tick, transmitters = transmitters.len(), "💥 信道冲突");
            for node in &mut self.nodes {
                node.fail();
            }
        }

        for node in &mut self.nodes {
            node.commit();
        }

        let outcome = TickOutcome {
            tick: self.tick,
            transmitters,
            collided,
        };
        self.stats.record(&outcome);
        observer.on_tick(&outcome, &self.nodes);
        self.tick += 1;
        outcome
    }

    /// 运行 `total_steps` 步并汇总结果
    pub fn run_steps(&mut self, total_steps: u64) -> RunResult {
        self.run_steps_with(total_steps, &mut NoopObserver)
    }

    /// 同 `run_steps`，每步之后回调观察者
    #[tracing::instrument(skip(self, observer), fields(sim = %self.name, run = self.run_index))]
    pub fn run_steps_with(
        &mut self,
        total_steps: u64,
        observer: &mut dyn ChannelObserver,
    ) -> RunResult {
        info!(
            nodes = self.nodes.len(),
            total_steps,
            network = self.phy.network.name(),
            "▶️  开始运行仿真"
        );

        self.initialize(total_steps);
        for _ in 0..total_steps {
            self.step_with(observer);
        }

        let result = self.results();
        info!(
            steps = self.tick,
            collision_ticks = self.stats.collision_ticks,
            utilization = self.stats.utilization(),
            "✅ 仿真完成"
        );
        result
    }

    /// 汇总当前所有节点的结果
    pub fn results(&self) -> RunResult {
        RunResult {
            name: self.name.clone(),
            group: self.group.clone(),
            run_index: self.run_index,
            network: self.phy.network,
            payload_bits: self.phy.payload_bits,
            steps: self.tick,
            nodes: self.nodes.iter().map(|n| n.results(&self.phy)).collect(),
            channel: self.stats.clone(),
        }
    }
}

/// 一次运行的完整结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub name: String,
    pub group: String,
    pub run_index: u64,
    pub network: NetworkType,
    pub payload_bits: u64,
    pub steps: u64,
    pub nodes: Vec<NodeResult>,
    pub channel: ChannelStats,
}

impl RunResult {
    /// 主节点（第一个加入的节点）
    pub fn main(&self) -> Option<&NodeResult> {
        self.nodes.first()
    }

    /// 所有节点数据率之和（比特/秒）
    pub fn aggregate_datarate(&self) -> f64 {
        self.nodes.iter().map(|n| n.datarate).sum()
    }
}

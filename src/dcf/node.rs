//! DCF 节点状态机
//!
//! 每步调用顺序：`generate_arrivals` → `advance` →（可能的）`fail` → `commit`。
//!
//! 状态迁移：
//! - BufferEmpty：计时结束后队列非空则进入 Backoff(1)，否则重新计时
//! - Interarrival / Sleep：计时结束后进入发送选择
//! - Backoff(stage)：计时结束后进入发送选择
//! - Transmit：载荷计时结束即发送成功，随后按睡眠概率进入 Sleep 或 Backoff(1)
//!
//! 在途数据包（`current`）只在 Transmit 以及冲突后的重试退避中存在。

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use super::packet::Packet;
use super::queue::TxQueue;
use super::result::{NodeResult, WaitTally, threshold_steps};
use super::seed::NodeSeed;
use super::state::{NodeState, TickRecord};
use super::trace::NodeTrace;
use crate::phy::Physical80211;
use crate::traffic::{ConfigError, DerivedTables, TrafficProfile};

/// 一个参与竞争的无线节点
#[derive(Debug, Clone)]
pub struct DcfNode {
    name: String,
    profile: TrafficProfile,
    tables: DerivedTables,
    rng: ChaCha8Rng,

    queue: TxQueue,
    current: Option<Packet>,
    leftover_arrival: f64,
    next_packet_id: u64,

    tick: u64,
    state: NodeState,
    prev: NodeState,
    /// 连续活跃步数，进入 Sleep 时清零
    sleep_stage: u32,

    // stats
    sleep_stage_sum: u64,
    sleep_stage_max: u32,
    collisions: u64,
    quality_threshold: f64,
    seconds_per_step: f64,

    // trace
    keep_trace: bool,
    history: Vec<TickRecord>,
    sent: Vec<Packet>,
}

impl DcfNode {
    /// 校验参数并派生查找表；配置错误直接返回
    pub fn new(
        name: impl Into<String>,
        profile: TrafficProfile,
        seed: NodeSeed,
    ) -> Result<Self, ConfigError> {
        let tables = profile.validate()?;
        let initial = NodeState::BufferEmpty { sleep_timer: 0 };
        Ok(Self {
            name: name.into(),
            profile,
            tables,
            rng: seed.into_rng(),
            queue: TxQueue::new(),
            current: None,
            leftover_arrival: 0.0,
            next_packet_id: 0,
            tick: 0,
            state: initial,
            prev: initial,
            sleep_stage: 0,
            sleep_stage_sum: 0,
            sleep_stage_max: 0,
            collisions: 0,
            quality_threshold: 0.0,
            seconds_per_step: 0.0,
            keep_trace: false,
            history: Vec::new(),
            sent: Vec::new(),
        })
    }

    /// 质量阈值（秒），只用于结果统计
    pub fn with_quality_threshold(mut self, seconds: f64) -> Self {
        self.quality_threshold = seconds;
        self
    }

    /// 是否保留逐步状态历史
    pub fn with_trace(mut self, keep_trace: bool) -> Self {
        self.keep_trace = keep_trace;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn profile(&self) -> &TrafficProfile {
        &self.profile
    }

    pub fn tables(&self) -> &DerivedTables {
        &self.tables
    }

    pub fn backoff_stages(&self) -> u32 {
        self.tables.backoff_stages()
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    /// 上一次 `commit` 时的状态
    pub fn previous_state(&self) -> NodeState {
        self.prev
    }

    pub fn is_transmitting(&self) -> bool {
        self.state.is_transmitting()
    }

    /// 已提交的步数
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn queue(&self) -> &TxQueue {
        &self.queue
    }

    pub fn current_packet(&self) -> Option<&Packet> {
        self.current.as_ref()
    }

    pub fn sent(&self) -> &[Packet] {
        &self.sent
    }

    pub fn history(&self) -> &[TickRecord] {
        &self.history
    }

    pub fn sleep_stage(&self) -> u32 {
        self.sleep_stage
    }

    pub fn leftover_arrival(&self) -> f64 {
        self.leftover_arrival
    }

    /// 迄今生成（含预置）的数据包总数
    pub fn packets_generated(&self) -> u64 {
        self.next_packet_id
    }

    /// 因冲突被迫退避的次数
    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    /// 直接向队列追加一个数据包（以当前步为到达时间），返回其 id
    pub fn enqueue_packet(&mut self, payload_steps: u32) -> u64 {
        let pkt = self.make_packet(payload_steps.max(1));
        self.queue.enqueue(pkt);
        pkt.id
    }

    /// 分配轨迹存储并随机化初始到达偏移，从 BufferEmpty 开始
    ///
    /// 已预置在队列中的数据包保持不变。
    pub fn initialize(&mut self, total_steps: u64, phy: &Physical80211) {
        debug_assert_eq!(self.tick, 0, "节点只能初始化一次");

        self.seconds_per_step = phy.seconds_per_step();
        if self.keep_trace {
            self.history = Vec::with_capacity(usize::try_from(total_steps).unwrap_or(0));
        }
        self.leftover_arrival = self.rng.random::<f64>();
        self.enter_buffer_empty();
        self.prev = self.state;

        debug!(
            node = %self.name,
            kind = self.profile.kind.name(),
            arrival_rate = self.profile.arrival_rate,
            backoff_stages = self.backoff_stages(),
            queued = self.queue.len(),
            "节点初始化完成"
        );
    }

    /// 本步的数据包到达：累加到达率，每生成一个包扣除其载荷步数
    ///
    /// 大包会消耗更多的到达预算，累加器可以暂时为负。
    pub fn generate_arrivals(&mut self) {
        self.leftover_arrival += self.profile.arrival_rate;
        while self.leftover_arrival >= 1.0 {
            let u = self.rng.random::<f64>();
            let steps = self.profile.payload.sample_steps(u);
            let pkt = self.make_packet(steps);
            self.queue.enqueue(pkt);
            self.leftover_arrival -= f64::from(pkt.payload_steps);
        }
    }

    /// 状态机前进一步
    pub fn advance(&mut self) {
        match self.state {
            NodeState::BufferEmpty { sleep_timer } => {
                let sleep_timer = sleep_timer.saturating_sub(1);
                if sleep_timer > 0 {
                    self.state = NodeState::BufferEmpty { sleep_timer };
                } else if self.queue.is_empty() {
                    self.enter_buffer_empty();
                } else {
                    self.enter_backoff(1);
                }
            }
            NodeState::Interarrival { timer } => {
                let timer = timer.saturating_sub(1);
                if timer > 0 {
                    self.state = NodeState::Interarrival { timer };
                } else {
                    self.select_transmit(1);
                }
            }
            NodeState::Backoff { stage, timer } => {
                let timer = timer.saturating_sub(1);
                if timer > 0 {
                    self.state = NodeState::Backoff { stage, timer };
                } else {
                    self.select_transmit(stage);
                }
            }
            NodeState::Transmit {
                stage,
                payload_timer,
            } => {
                self.sleep_stage = self.sleep_stage.saturating_add(1);
                let payload_timer = payload_timer.saturating_sub(1);
                if payload_timer > 0 {
                    self.state = NodeState::Transmit {
                        stage,
                        payload_timer,
                    };
                } else {
                    self.complete_transmit();
                }
            }
            NodeState::Sleep { timer } => {
                let timer = timer.saturating_sub(1);
                if timer > 0 {
                    self.state = NodeState::Sleep { timer };
                } else {
                    self.select_transmit(1);
                }
            }
        }
    }

    /// 本步发生冲突
    ///
    /// 只有 Transmit 状态会受影响：保留在途数据包与连续活跃步数，
    /// 以更高一级（封顶）的阶段重新退避。其他状态下调用是空操作，
    /// 仿真器每次冲突都会对所有节点统一调用。
    pub fn fail(&mut self) {
        if let NodeState::Transmit { stage, .. } = self.state {
            debug_assert!(self.current.is_some(), "Transmit 状态必须持有在途数据包");
            self.collisions = self.collisions.saturating_add(1);
            self.enter_backoff(stage.saturating_add(1));
            trace!(node = %self.name, tick = self.tick, stage = ?self.state.stage(), "💥 冲突退避");
        }
    }

    /// 把本步状态写入历史并推进步数
    pub fn commit(&mut self) {
        self.sleep_stage_sum = self
            .sleep_stage_sum
            .saturating_add(u64::from(self.sleep_stage));
        self.sleep_stage_max = self.sleep_stage_max.max(self.sleep_stage);

        if self.keep_trace {
            self.history.push(TickRecord {
                state: self.state,
                sleep_stage: self.sleep_stage,
            });
        }

        if self.prev.kind() != self.state.kind() {
            trace!(
                node = %self.name,
                tick = self.tick,
                from = self.prev.kind().name(),
                to = self.state.kind().name(),
                "状态迁移"
            );
        }

        self.prev = self.state;
        self.tick += 1;
    }

    /// 汇总本节点的运行结果
    pub fn results(&self, phy: &Physical80211) -> NodeResult {
        let seconds_per_step = phy.seconds_per_step();
        let steps = self.tick;
        let time_spent = steps as f64 * seconds_per_step;
        let threshold = threshold_steps(self.quality_threshold, seconds_per_step);

        let mut sent_tally = WaitTally::new(threshold);
        let mut payload_steps_sent = 0u64;
        for pkt in &self.sent {
            payload_steps_sent += u64::from(pkt.payload_steps);
            if let Some(wait) = pkt.wait() {
                sent_tally.record(wait);
            }
        }

        // 未发送的数据包按最后一步计算已等待时间
        let last_tick = steps.saturating_sub(1);
        let mut unsent_tally = WaitTally::new(threshold);
        let mut payload_steps_unsent = self.queue.payload_steps();
        for pkt in self.queue.iter() {
            unsent_tally.record(pkt.wait_at(last_tick));
        }
        if let Some(pkt) = &self.current {
            payload_steps_unsent += u64::from(pkt.payload_steps);
            unsent_tally.record(pkt.wait_at(last_tick));
        }

        let packets_over_threshold = sent_tally.over + unsent_tally.over;
        let steps_over_threshold = sent_tally.excess_total + unsent_tally.excess_total;
        let bits_sent = payload_steps_sent.saturating_mul(phy.payload_bits);

        let result = NodeResult {
            name: self.name.clone(),
            kind: self.profile.kind,
            quality_threshold: self.quality_threshold,
            steps,
            seconds_per_step,
            time_spent,
            threshold_steps: threshold,
            packets_generated: self.next_packet_id,
            packets_sent: self.sent.len() as u64,
            payload_steps_sent,
            packets_unsent: self.queue.len() as u64 + u64::from(self.current.is_some()),
            payload_steps_unsent,
            packets_over_threshold,
            unsent_over_threshold: unsent_tally.over,
            steps_over_threshold,
            max_steps_over_threshold: sent_tally.max_excess.max(unsent_tally.max_excess),
            max_wait_steps: sent_tally.max_wait,
            avg_steps_over_threshold: ratio(steps_over_threshold as f64, packets_over_threshold),
            max_sleep_stage: self.sleep_stage_max,
            avg_sleep_stage: ratio(self.sleep_stage_sum as f64, steps),
            bits_sent,
            datarate: if time_spent > 0.0 {
                bits_sent as f64 / time_spent
            } else {
                0.0
            },
            collisions: self.collisions,
            trace: self.keep_trace.then(|| self.trace()),
        };

        debug!(
            node = %result.name,
            packets_sent = result.packets_sent,
            packets_unsent = result.packets_unsent,
            over_threshold = result.packets_over_threshold,
            datarate_bps = result.datarate,
            "节点结果"
        );
        result
    }

    /// 当前完整轨迹的快照
    pub fn trace(&self) -> NodeTrace {
        NodeTrace {
            states: self.history.clone(),
            sent: self.sent.clone(),
            queued: self.current.iter().chain(self.queue.iter()).copied().collect(),
        }
    }

    fn make_packet(&mut self, payload_steps: u32) -> Packet {
        let id = self.next_packet_id;
        self.next_packet_id += 1;
        Packet::new(id, self.tick, payload_steps)
    }

    /// `[lo, hi)` 上的均匀整数；区间为空时返回 `lo`
    fn uniform(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            lo
        } else {
            self.rng.random_range(lo..hi)
        }
    }

    fn enter_buffer_empty(&mut self) {
        debug_assert!(self.current.is_none(), "BufferEmpty 状态不能持有在途数据包");
        let sleep_timer = self.uniform(
            self.profile.min_buffer_empty_sleep,
            self.profile.max_buffer_empty_sleep,
        );
        self.state = NodeState::BufferEmpty { sleep_timer };
    }

    fn enter_backoff(&mut self, stage: u32) {
        let stage = stage.clamp(1, self.backoff_stages());
        let window = self.tables.backoff_window(stage);
        let timer = self.uniform(1, window);
        self.state = NodeState::Backoff { stage, timer };
    }

    fn enter_sleep(&mut self) {
        debug_assert!(self.current.is_none(), "Sleep 状态不能持有在途数据包");
        self.sleep_stage = 0;
        let timer = self.uniform(self.profile.min_sleep, self.profile.max_sleep);
        self.state = NodeState::Sleep { timer };
    }

    /// 决定下一步做什么：续传在途包、空缓冲、间歇，或者取队首开始发送
    fn select_transmit(&mut self, stage: u32) {
        loop {
            if let Some(pkt) = &self.current {
                self.state = NodeState::Transmit {
                    stage,
                    payload_timer: pkt.payload_steps,
                };
                return;
            }

            if self.queue.is_empty() {
                self.enter_buffer_empty();
                return;
            }

            let shallow = self.queue.len() < self.profile.interarrival_cutoff as usize;
            if shallow
                && self.tables.p_interarrival > 0.0
                && self.rng.random::<f64>() < self.tables.p_interarrival
            {
                let timer = self.uniform(
                    self.profile.min_interarrival,
                    self.profile.max_interarrival,
                );
                if timer > 0 {
                    self.state = NodeState::Interarrival { timer };
                    return;
                }
                // 抽到 0 步间歇：立即重新选择
                continue;
            }

            let mut pkt = self.queue.dequeue().expect("queue checked non-empty");
            pkt.tx_attempt = Some(self.tick);
            self.state = NodeState::Transmit {
                stage,
                payload_timer: pkt.payload_steps,
            };
            self.current = Some(pkt);
            return;
        }
    }

    fn complete_transmit(&mut self) {
        let mut pkt = self
            .current
            .take()
            .expect("Transmit completed without an in-flight packet");
        pkt.tx_success = Some(self.tick);
        self.sent.push(pkt);

        if self.profile.min_sleep > 0 {
            let p_sleep = self.tables.sleep_probability(self.sleep_stage);
            if self.rng.random::<f64>() < p_sleep {
                self.enter_sleep();
                return;
            }
        }
        self.enter_backoff(1);
    }
}

fn ratio(total: f64, count: u64) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

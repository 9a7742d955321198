//! 仿真控制器
//!
//! 维护当前拓扑、路由策略、步数/包计数器、按速率注入、就绪状态与撤销。
//!
//! 状态：未配置（无策略）→ 就绪（有策略且拓扑有效）→ 运行中（至少走过一步）。
//! 所有调用必须由单一调用方串行发起；核心内部不加锁。

use std::sync::mpsc::{self, Receiver};

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::event::SimulationEvent;
use super::notify::{Notification, Notifier, SubscriberId};
use super::step_result::StepResult;
use crate::algorithm::RoutingAlgorithm;
use crate::error::{Result, SimError};
use crate::net::{PacketId, Topology};
use tracing::{debug, info, trace, warn};

/// 仿真配置选项
#[derive(Debug, Clone)]
pub struct SimOpts {
    /// 注入周期：每 `rate` 步注入一个包
    pub rate: u64,
    /// 随机数种子（注入端点与随机游走）
    pub seed: u64,
    /// 最多可撤销的步数；更早的日志帧被丢弃
    pub undo_depth: usize,
}

/// 默认撤销深度
pub const DEFAULT_UNDO_DEPTH: usize = 1024;

impl Default for SimOpts {
    fn default() -> Self {
        Self {
            rate: 1,
            seed: 0,
            undo_depth: DEFAULT_UNDO_DEPTH,
        }
    }
}

/// 路由仿真
#[derive(Debug)]
pub struct Simulation {
    rate: u64,
    step: u64,
    packet_count: u64,
    undo_depth: usize,
    undoable: usize,
    ready: bool,
    tables_dirty: bool,
    topology: Topology,
    algorithm: Option<RoutingAlgorithm>,
    rng: StdRng,
    notifier: Notifier,
}

impl Default for Simulation {
    fn default() -> Self {
        let opts = SimOpts::default();
        Self::with_rng(&opts, StdRng::seed_from_u64(opts.seed))
    }
}

impl Simulation {
    pub fn new(opts: &SimOpts) -> Result<Self> {
        if opts.rate == 0 {
            return Err(SimError::InvalidRate(opts.rate));
        }
        Ok(Self::with_rng(opts, StdRng::seed_from_u64(opts.seed)))
    }

    fn with_rng(opts: &SimOpts, rng: StdRng) -> Self {
        Self {
            rate: opts.rate,
            step: 0,
            packet_count: 0,
            undo_depth: opts.undo_depth,
            undoable: 0,
            ready: false,
            tables_dirty: true,
            topology: Topology::new(),
            algorithm: None,
            rng,
            notifier: Notifier::default(),
        }
    }

    /// 注册订阅者：同一通道既收到仿真事件，也收到当前（及之后替换的）拓扑事件
    pub fn subscribe(&mut self) -> (SubscriberId, Receiver<Notification>) {
        // 两侧共用同一个通道，订阅者看到的事件顺序与发生顺序一致
        let (tx, rx) = mpsc::channel();
        let id = self.notifier.register(tx.clone());
        self.topology.notifier_mut().attach(id, tx);
        (id, rx)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let topo = self.topology.notifier_mut().unsubscribe(id);
        self.notifier.unsubscribe(id) || topo
    }

    pub fn rate(&self) -> u64 {
        self.rate
    }

    /// 修改注入周期；运行已推进（步数 > 1）时重置度量
    pub fn set_rate(&mut self, rate: u64) -> Result<()> {
        if rate == 0 {
            return Err(SimError::InvalidRate(rate));
        }
        self.rate = rate;
        info!(rate, "注入周期变更");
        self.emit(SimulationEvent::RateChanged(rate));

        if self.step > 1 {
            self.reset_metrics();
        }
        Ok(())
    }

    pub fn step_number(&self) -> u64 {
        self.step
    }

    pub fn packet_count(&self) -> u64 {
        self.packet_count
    }

    /// 当前还能撤销的步数（不超过 `SimOpts::undo_depth`）
    pub fn undoable_steps(&self) -> usize {
        self.undoable
    }

    pub fn has_started(&self) -> bool {
        self.step != 0
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[cfg(test)]
    pub(crate) fn topology_mut(&mut self) -> &mut Topology {
        &mut self.topology
    }

    pub fn routing_algorithm(&self) -> Option<RoutingAlgorithm> {
        self.algorithm
    }

    /// 选择路由策略。首次选择可能使仿真进入就绪；之后的切换只发出变更通知，
    /// 不重置度量（与切换速率或拓扑不同）。
    pub fn set_routing_algorithm(&mut self, algorithm: RoutingAlgorithm) {
        let first = self.algorithm.is_none();
        self.algorithm = Some(algorithm);
        self.tables_dirty = true;
        info!(%algorithm, "选择路由策略");

        if first {
            self.check_ready();
        } else {
            self.emit(SimulationEvent::AlgorithmChanged(algorithm));
        }
    }

    /// 换成一个空拓扑
    pub fn new_topology(&mut self) {
        self.set_topology(Topology::new());
    }

    /// 替换拓扑；已走过至少一步时先重置度量。订阅者随之迁移。
    pub fn set_topology(&mut self, mut topology: Topology) {
        for (id, tx) in self.topology.notifier_mut().take_subscribers() {
            topology.notifier_mut().attach(id, tx);
        }
        self.topology = topology;
        self.tables_dirty = true;

        if self.step > 0 {
            self.reset_metrics();
        }
        info!(routers = self.topology.len(), edges = self.topology.edge_count(), "🔄 替换拓扑");
        self.emit(SimulationEvent::TopologyReset);
        self.check_ready();
    }

    /// 添加路由器；同名路由器已存在时报错
    pub fn add_router(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if !self.topology.add_router(name.clone())? {
            return Err(SimError::DuplicateRouter(name));
        }
        self.on_structure_changed();
        Ok(())
    }

    pub fn remove_router(&mut self, name: &str) -> bool {
        let removed = self.topology.remove_router(name);
        if removed {
            self.on_structure_changed();
        }
        removed
    }

    pub fn add_edge(&mut self, a: &str, b: &str) -> Result<bool> {
        let added = self.topology.add_edge(a, b)?;
        if added {
            self.on_structure_changed();
        }
        Ok(added)
    }

    pub fn remove_edge(&mut self, a: &str, b: &str) -> Result<bool> {
        let removed = self.topology.remove_edge(a, b)?;
        if removed {
            self.on_structure_changed();
        }
        Ok(removed)
    }

    /// 结构变化后在途的包可能指向已不存在的路由器或边，只要走过一步就重置
    fn on_structure_changed(&mut self) {
        self.tables_dirty = true;
        if self.step > 0 {
            self.reset_metrics();
        }
        self.check_ready();
    }

    /// 重新计算就绪状态，返回是否发生变化
    pub fn ready_state_changed(&mut self) -> bool {
        let ready = self.algorithm.is_some() && self.topology.is_valid();
        if ready != self.ready {
            self.ready = ready;
            true
        } else {
            false
        }
    }

    fn check_ready(&mut self) {
        if self.ready_state_changed() {
            debug!(ready = self.ready, "就绪状态变化");
            self.emit(SimulationEvent::ReadyStateChanged(self.ready));
        }
    }

    /// 清空全部数据包状态并把两个计数器归零，拓扑结构与策略保持不变
    pub fn reset_metrics(&mut self) {
        self.topology.reset_packets();
        self.step = 0;
        self.packet_count = 0;
        self.undoable = 0;
        self.tables_dirty = true;
        info!("度量已重置");
        self.emit(SimulationEvent::MetricsReset);
    }

    /// 前进一步。必须处于就绪状态。
    ///
    /// 转发失败时本步的部分移动被整体回滚，计数器与数据包保持调用前的样子。
    #[tracing::instrument(skip(self), fields(step = self.step + 1))]
    pub fn step(&mut self) -> Result<StepResult> {
        let algorithm = match self.algorithm {
            Some(algorithm) if self.ready => algorithm,
            _ => return Err(SimError::NotReady),
        };

        if self.step == 0 || self.tables_dirty {
            algorithm.build_routing_tables(&mut self.topology)?;
            self.tables_dirty = false;
        }

        // 先判断再自增，因此第一步总会注入
        let inject = self.step % self.rate == 0;
        self.step += 1;

        let mut result = match algorithm.step(self.step, &mut self.topology, &mut self.rng) {
            Ok(result) => result,
            Err(err) => {
                self.abort_step(algorithm, &err);
                return Err(err);
            }
        };

        if inject {
            match self
                .topology
                .inject_packet(PacketId(self.packet_count), &mut self.rng)
            {
                Ok(packet) => {
                    result.push_injected(&packet);
                    self.packet_count += 1;
                }
                Err(err) => {
                    self.abort_step(algorithm, &err);
                    return Err(err);
                }
            }
        }

        self.undoable = (self.undoable + 1).min(self.undo_depth);
        self.topology.trim_journal(self.undo_depth);

        if self.step == 1 {
            self.emit(SimulationEvent::FirstStepTaken);
        }
        trace!(transmitted = result.transmitted(), "发出 StepTaken 通知");
        self.emit(SimulationEvent::StepTaken(result.clone()));
        Ok(result)
    }

    /// 失败的一步：弹出本步打开的日志帧并退回步数，不发任何通知
    fn abort_step(&mut self, algorithm: RoutingAlgorithm, err: &SimError) {
        algorithm.undo_step(&mut self.topology);
        self.step -= 1;
        warn!(step = self.step + 1, %err, "❌ 本步失败，已回滚");
    }

    /// 撤销最近一步；步数为 0 或超出撤销深度时什么也不做并返回 false
    #[tracing::instrument(skip(self), fields(step = self.step))]
    pub fn undo_step(&mut self) -> bool {
        if self.step == 0 || self.undoable == 0 {
            return false;
        }
        let Some(algorithm) = self.algorithm else {
            return false;
        };

        algorithm.undo_step(&mut self.topology);
        self.emit(SimulationEvent::UndoStep);
        self.step -= 1;
        self.undoable -= 1;

        if self.step % self.rate == 0 {
            self.packet_count = self.packet_count.saturating_sub(1);
        }
        info!(step = self.step, packets = self.packet_count, "↩️  撤销一步");
        true
    }

    fn emit(&mut self, ev: SimulationEvent) {
        self.notifier.emit(ev);
    }
}

//! 统计信息
//!
//! 由通知驱动的实时度量：注入/送达/丢弃/转发计数，
//! 以及按 (源, 目的) 统计的平均跳数。撤销一步时按该步的结果精确回退。
//! 只保留最近 `history` 步的结果，与仿真的撤销深度对齐。

use std::collections::{BTreeMap, VecDeque};
use std::sync::mpsc::Receiver;

use super::event::SimulationEvent;
use super::notify::Notification;
use super::simulation::DEFAULT_UNDO_DEPTH;
use super::step_result::{StepEvent, StepResult};

/// 平均跳数累加器
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HopTally {
    pub sum: u64,
    pub count: u64,
}

impl HopTally {
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum as f64 / self.count as f64
    }
}

/// 路由仿真统计信息
#[derive(Debug, Clone)]
pub struct Stats {
    pub steps: u64,
    pub injected_pkts: u64,
    pub delivered_pkts: u64,
    pub dropped_pkts: u64,
    pub transmitted_pkts: u64,
    hops: BTreeMap<(String, String), HopTally>,
    applied: VecDeque<StepResult>,
    history: usize,
}

impl Default for Stats {
    fn default() -> Self {
        Self::with_history(DEFAULT_UNDO_DEPTH)
    }
}

impl Stats {
    /// 最多为 `history` 步保留撤销所需的结果
    pub fn with_history(history: usize) -> Self {
        Self {
            steps: 0,
            injected_pkts: 0,
            delivered_pkts: 0,
            dropped_pkts: 0,
            transmitted_pkts: 0,
            hops: BTreeMap::new(),
            applied: VecDeque::new(),
            history,
        }
    }

    /// 消费一条通知
    pub fn observe(&mut self, n: &Notification) {
        let Notification::Simulation(ev) = n else {
            return;
        };
        match ev {
            SimulationEvent::StepTaken(result) => {
                self.apply(result, true);
                self.applied.push_back(result.clone());
                if self.applied.len() > self.history {
                    self.applied.pop_front();
                }
            }
            SimulationEvent::UndoStep => {
                if let Some(result) = self.applied.pop_back() {
                    self.apply(&result, false);
                }
            }
            SimulationEvent::MetricsReset => self.clear(),
            _ => {}
        }
    }

    /// 取走接收端中积压的全部通知，返回处理的条数
    pub fn drain(&mut self, rx: &Receiver<Notification>) -> usize {
        let mut n = 0;
        for notification in rx.try_iter() {
            self.observe(&notification);
            n += 1;
        }
        n
    }

    pub fn clear(&mut self) {
        *self = Stats::with_history(self.history);
    }

    /// 某对 (源, 目的) 的平均送达跳数
    pub fn average_hops(&self, source: &str, destination: &str) -> Option<f64> {
        self.hops
            .get(&(source.to_string(), destination.to_string()))
            .map(HopTally::average)
    }

    /// 平均跳数表，按 (源, 目的) 排序
    pub fn average_hops_table(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.hops
            .iter()
            .map(|((s, d), t)| (s.as_str(), d.as_str(), t.average()))
    }

    fn apply(&mut self, result: &StepResult, forward: bool) {
        let bump = |v: &mut u64, by: u64| {
            *v = if forward {
                v.saturating_add(by)
            } else {
                v.saturating_sub(by)
            };
        };

        bump(&mut self.steps, 1);
        bump(&mut self.transmitted_pkts, result.transmitted());

        for ev in result.events() {
            match ev {
                StepEvent::Injected { .. } => bump(&mut self.injected_pkts, 1),
                StepEvent::Dropped { .. } => bump(&mut self.dropped_pkts, 1),
                StepEvent::Sent { .. } => {}
                StepEvent::Received {
                    source,
                    destination,
                    hops,
                    ..
                } => {
                    bump(&mut self.delivered_pkts, 1);
                    let key = (source.clone(), destination.clone());
                    let tally = self.hops.entry(key.clone()).or_default();
                    bump(&mut tally.sum, *hops);
                    bump(&mut tally.count, 1);
                    if tally.count == 0 {
                        self.hops.remove(&key);
                    }
                }
            }
        }
    }
}

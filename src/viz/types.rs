use serde::{Deserialize, Serialize};

use crate::algorithm::RoutingAlgorithm;
use crate::sim::{Notification, Simulation, SimulationEvent, StepEvent};

/// 可视化事件类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VizEventKind {
    /// 拓扑与配置元信息（作为第一条事件）
    Meta {
        routers: Vec<String>,
        edges: Vec<VizEdgeInfo>,
        algorithm: Option<RoutingAlgorithm>,
        rate: u64,
    },
    /// 一步完成
    Step {
        transmitted: u64,
        events: Vec<StepEvent>,
    },
    /// 撤销了第 `step` 步
    Undo,
    /// 度量被重置
    MetricsReset,
    /// 拓扑被替换
    TopologyReset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VizEdgeInfo {
    pub a: String,
    pub b: String,
}

/// 一个可回放的事件（JSON）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VizEvent {
    /// 事件对应的仿真步号
    pub step: u64,
    #[serde(flatten)]
    pub kind: VizEventKind,
}

/// 一个简单的事件收集器（存内存，仿真结束写 JSON 文件）
#[derive(Debug, Default)]
pub struct VizLogger {
    pub events: Vec<VizEvent>,
    step: u64,
}

impl VizLogger {
    pub fn push(&mut self, ev: VizEvent) {
        self.events.push(ev);
    }

    pub fn emit_meta(&mut self, sim: &Simulation) {
        let topology = sim.topology();
        let routers = topology.router_names().map(str::to_owned).collect();
        let edges = topology
            .edges()
            .into_iter()
            .map(|e| VizEdgeInfo { a: e.a, b: e.b })
            .collect();
        self.step = sim.step_number();
        self.push(VizEvent {
            step: self.step,
            kind: VizEventKind::Meta {
                routers,
                edges,
                algorithm: sim.routing_algorithm(),
                rate: sim.rate(),
            },
        });
    }

    /// 把一条通知转成回放事件；拓扑层面的细粒度通知不单独记录
    pub fn observe(&mut self, n: &Notification) {
        let Notification::Simulation(ev) = n else {
            return;
        };
        let (step, kind) = match ev {
            SimulationEvent::StepTaken(result) => {
                self.step = result.step();
                (
                    result.step(),
                    VizEventKind::Step {
                        transmitted: result.transmitted(),
                        events: result.events().to_vec(),
                    },
                )
            }
            SimulationEvent::UndoStep => {
                let undone = self.step;
                self.step = self.step.saturating_sub(1);
                (undone, VizEventKind::Undo)
            }
            SimulationEvent::MetricsReset => {
                self.step = 0;
                (0, VizEventKind::MetricsReset)
            }
            SimulationEvent::TopologyReset => (self.step, VizEventKind::TopologyReset),
            _ => return,
        };
        self.push(VizEvent { step, kind });
    }
}

//! 路由策略
//!
//! 三种转发策略以枚举表示，按变体穷举分派：
//! - 洪泛（Flooding）：向所有未访问过的邻居复制转发
//! - 随机路径（RandomPath）：随机挑一个邻居
//! - 最短路径（ShortestPath）：按预先构建的路由表转发
//!
//! 每一步的公共骨架：
//! 1. （仅洪泛）丢弃各路由器上 id 已见过的重复包
//! 2. 刷新各路由器队列，统计送达/重复送达
//! 3. 对每个可转发的包执行变体各自的转发决策

mod flooding;
mod random_path;
mod shortest_path;

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::net::Topology;
use crate::sim::{DropReason, StepResult};
use tracing::{debug, info};

pub use random_path::choose_neighbor;

/// 路由策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingAlgorithm {
    Flooding,
    RandomPath,
    ShortestPath,
}

impl RoutingAlgorithm {
    /// 全部可选策略（静态注册表）
    pub const ALL: [RoutingAlgorithm; 3] = [
        RoutingAlgorithm::Flooding,
        RoutingAlgorithm::RandomPath,
        RoutingAlgorithm::ShortestPath,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RoutingAlgorithm::Flooding => "Flooding",
            RoutingAlgorithm::RandomPath => "Random Path",
            RoutingAlgorithm::ShortestPath => "Shortest Path",
        }
    }

    /// 是否在步首丢弃重复到达的包
    pub fn suppresses_duplicates(self) -> bool {
        matches!(self, RoutingAlgorithm::Flooding)
    }

    /// 预计算路由表；只有最短路径需要
    pub fn build_routing_tables(self, topology: &mut Topology) -> Result<()> {
        match self {
            RoutingAlgorithm::ShortestPath => shortest_path::build_routing_tables(topology),
            RoutingAlgorithm::Flooding | RoutingAlgorithm::RandomPath => Ok(()),
        }
    }

    /// 执行一步转发
    #[tracing::instrument(skip(self, topology, rng), fields(algorithm = %self))]
    pub fn step<R: Rng + ?Sized>(
        self,
        step: u64,
        topology: &mut Topology,
        rng: &mut R,
    ) -> Result<StepResult> {
        let mut result = StepResult::new(step);
        let names: Vec<String> = topology.router_names().map(str::to_owned).collect();

        topology.begin_step();

        for name in &names {
            let (repeated, refreshed) = {
                let router = topology.router_mut(name)?;
                let repeated = if self.suppresses_duplicates() {
                    router.drop_repeated_packets()
                } else {
                    Vec::new()
                };
                (repeated, router.refresh_packets())
            };

            for packet in &repeated {
                result.push_dropped(packet, DropReason::Repeated);
            }
            for packet in &refreshed.dropped {
                result.push_dropped(packet, DropReason::DuplicateDelivery);
            }
            for packet in &refreshed.removed {
                info!(pkt_id = %packet.id(), hops = packet.hops(), router = %name, "✅ 数据包送达目的地");
                result.push_received(packet);
            }
            for packet in refreshed.removed.into_iter().chain(refreshed.dropped) {
                topology.notify_received(packet);
            }
        }

        for name in &names {
            while let Some(pos) = topology.router(name).and_then(|r| r.first_non_stale()) {
                match self {
                    RoutingAlgorithm::Flooding => {
                        flooding::forward(topology, name, pos, &mut result)?
                    }
                    RoutingAlgorithm::RandomPath => {
                        random_path::forward(topology, name, pos, rng, &mut result)?
                    }
                    RoutingAlgorithm::ShortestPath => {
                        shortest_path::forward(topology, name, pos, &mut result)?
                    }
                }
            }
        }

        debug!(
            step,
            transmitted = result.transmitted(),
            events = result.events().len(),
            in_flight = topology.packet_count(),
            "步骤完成"
        );
        Ok(result)
    }

    /// 撤销最近一步，对所有策略相同
    pub fn undo_step(self, topology: &mut Topology) {
        topology.undo_step();
    }
}

impl fmt::Display for RoutingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RoutingAlgorithm {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flooding" | "flood" => Ok(RoutingAlgorithm::Flooding),
            "random-path" | "random_path" | "random path" | "random" => {
                Ok(RoutingAlgorithm::RandomPath)
            }
            "shortest-path" | "shortest_path" | "shortest path" | "shortest" => {
                Ok(RoutingAlgorithm::ShortestPath)
            }
            _ => Err(SimError::UnknownAlgorithm(s.to_string())),
        }
    }
}

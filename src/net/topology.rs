//! 网络拓扑管理
//!
//! 拓扑独占所有路由器与数据包：负责路由器/边的增删、连通性校验、
//! 随机注入数据包、在路由器之间搬运数据包，以及撤销时的整体回退。
//!
//! 调用约定：所有变更由单一调用方串行发起；运行中修改结构会使路由表失效，
//! 下一步之前必须重置度量（由 `Simulation` 负责）。

use std::collections::{BTreeMap, BTreeSet, HashSet};

use rand::Rng;

use super::event::TopologyEvent;
use super::id::PacketId;
use super::packet::Packet;
use super::router::Router;
use crate::error::{Result, SimError};
use crate::sim::{Notification, Notifier, SubscriberId};
use tracing::{debug, info, trace, warn};

/// 一条无向边（`a < b`）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub a: String,
    pub b: String,
}

/// 网络拓扑
#[derive(Debug, Default)]
pub struct Topology {
    routers: BTreeMap<String, Router>,
    edge_count: usize,
    notifier: Notifier,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅拓扑通知
    pub fn subscribe(&mut self) -> (SubscriberId, std::sync::mpsc::Receiver<Notification>) {
        self.notifier.subscribe()
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.notifier.unsubscribe(id)
    }

    pub(crate) fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// 添加路由器；同名路由器已存在时返回 `Ok(false)`
    #[tracing::instrument(skip(self, name))]
    pub fn add_router(&mut self, name: impl Into<String>) -> Result<bool> {
        let router = Router::new(name)?;
        if self.routers.contains_key(router.name()) {
            debug!(router = %router.name(), "路由器已存在");
            return Ok(false);
        }

        let name = router.name().to_string();
        self.routers.insert(name.clone(), router);
        info!(router = %name, router_count = self.routers.len(), "➕ 添加路由器");
        self.notifier.emit(TopologyEvent::RouterAdded {
            router: name,
            router_count: self.routers.len(),
        });
        Ok(true)
    }

    /// 移除路由器，先切断它的全部边；不存在时返回 false
    #[tracing::instrument(skip(self))]
    pub fn remove_router(&mut self, name: &str) -> bool {
        let Some(router) = self.routers.remove(name) else {
            return false;
        };

        for nbr in router.neighbors() {
            if let Some(other) = self.routers.get_mut(nbr) {
                other.disconnect(name);
            }
            self.edge_count = self.edge_count.saturating_sub(1);
            trace!(a = %name, b = %nbr, "切断边");
            self.notifier.emit(TopologyEvent::EdgeRemoved {
                routers: (name.to_string(), nbr.clone()),
                edge_count: self.edge_count,
            });
        }

        info!(router = %name, router_count = self.routers.len(), "➖ 移除路由器");
        self.notifier.emit(TopologyEvent::RouterRemoved {
            router: name.to_string(),
            router_count: self.routers.len(),
        });
        true
    }

    /// 连接两个路由器（无向）；边已存在时返回 `Ok(false)`
    #[tracing::instrument(skip(self))]
    pub fn add_edge(&mut self, a: &str, b: &str) -> Result<bool> {
        self.check_pair(a, b)?;
        if self.routers[a].is_connected_to(b) {
            return Ok(false);
        }

        self.router_mut(a)?.connect(b);
        self.router_mut(b)?.connect(a);
        self.edge_count += 1;
        debug!(edge_count = self.edge_count, "🔗 添加边");
        self.notifier.emit(TopologyEvent::EdgeAdded {
            routers: (a.to_string(), b.to_string()),
            edge_count: self.edge_count,
        });
        Ok(true)
    }

    /// 断开两个路由器；边不存在时返回 `Ok(false)`
    #[tracing::instrument(skip(self))]
    pub fn remove_edge(&mut self, a: &str, b: &str) -> Result<bool> {
        self.check_pair(a, b)?;
        if !self.router_mut(a)?.disconnect(b) {
            return Ok(false);
        }

        self.router_mut(b)?.disconnect(a);
        self.edge_count = self.edge_count.saturating_sub(1);
        debug!(edge_count = self.edge_count, "✂️  移除边");
        self.notifier.emit(TopologyEvent::EdgeRemoved {
            routers: (a.to_string(), b.to_string()),
            edge_count: self.edge_count,
        });
        Ok(true)
    }

    fn check_pair(&self, a: &str, b: &str) -> Result<()> {
        for name in [a, b] {
            if !self.routers.contains_key(name) {
                return Err(SimError::UnknownRouter(name.to_string()));
            }
        }
        if a == b {
            return Err(SimError::SelfLoop(a.to_string()));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn has_edges(&self) -> bool {
        self.edge_count > 0
    }

    pub fn router(&self, name: &str) -> Option<&Router> {
        self.routers.get(name)
    }

    pub(crate) fn router_mut(&mut self, name: &str) -> Result<&mut Router> {
        self.routers
            .get_mut(name)
            .ok_or_else(|| SimError::UnknownRouter(name.to_string()))
    }

    /// 按名称顺序遍历路由器
    pub fn routers(&self) -> impl Iterator<Item = &Router> {
        self.routers.values()
    }

    pub fn router_names(&self) -> impl Iterator<Item = &str> {
        self.routers.keys().map(String::as_str)
    }

    pub fn neighbors(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.routers.get(name).map(Router::neighbors)
    }

    /// 枚举所有无向边，每条只出现一次
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(self.edge_count);
        for (name, router) in &self.routers {
            for nbr in router.neighbors() {
                if name < nbr {
                    edges.push(Edge {
                        a: name.clone(),
                        b: nbr.clone(),
                    });
                }
            }
        }
        edges
    }

    /// 遍历所有在途数据包及其所在路由器
    pub fn packets(&self) -> impl Iterator<Item = (&str, &Packet)> {
        self.routers
            .iter()
            .flat_map(|(name, r)| r.packets().iter().map(move |p| (name.as_str(), p)))
    }

    pub fn packet_count(&self) -> usize {
        self.routers.values().map(|r| r.packets().len()).sum()
    }

    /// 拓扑是否可仿真：至少两个路由器，并且从第 0 个路由器出发全部可达
    pub fn is_valid(&self) -> bool {
        if self.routers.len() < 2 {
            return false;
        }
        let Some(root) = self.routers.keys().next() else {
            return false;
        };

        let mut visited: HashSet<&str> = HashSet::from([root.as_str()]);
        loop {
            let frontier: Vec<&str> = visited.iter().copied().collect();
            let mut added = false;
            for name in frontier {
                for nbr in self.routers[name].neighbors() {
                    added |= visited.insert(nbr.as_str());
                }
            }
            if !added {
                break;
            }
        }

        visited.len() == self.routers.len()
    }

    fn router_at(&self, index: usize) -> Option<&Router> {
        self.routers.values().nth(index)
    }

    /// 随机选择目的地与（不同的）源，在源处注入一个新数据包
    #[tracing::instrument(skip(self, rng), fields(pkt_id = %id))]
    pub fn inject_packet<R: Rng + ?Sized>(&mut self, id: PacketId, rng: &mut R) -> Result<Packet> {
        let n = self.routers.len();
        if n < 2 {
            return Err(SimError::TooFewRouters { count: n });
        }

        let dst_idx = rng.gen_range(0..n);
        let src_idx = loop {
            let idx = rng.gen_range(0..n);
            if idx != dst_idx {
                break idx;
            }
        };

        let (src, dst) = match (self.router_at(src_idx), self.router_at(dst_idx)) {
            (Some(s), Some(d)) => (s.name().to_string(), d.name().to_string()),
            _ => return Err(SimError::TooFewRouters { count: n }),
        };

        let packet = Packet::new(id, src.clone(), dst);
        self.router_mut(&src)?.add_packet(packet.clone());
        info!(src = %packet.source(), dst = %packet.destination(), "📦 注入数据包");
        self.notifier.emit(TopologyEvent::PacketInjected {
            packet: packet.clone(),
        });
        Ok(packet)
    }

    /// 在指定路由器处放入一份已有数据包的副本（洪泛分支），返回它在队列中的位置
    pub fn inject_packet_copy(&mut self, packet: Packet, router: &str) -> Result<usize> {
        let pos = self.router_mut(router)?.add_packet(packet.clone());
        trace!(router, pkt_id = %packet.id(), "生成分支副本");
        self.notifier.emit(TopologyEvent::PacketInjected { packet });
        Ok(pos)
    }

    /// 把 `from` 队列中位置为 `position` 的数据包转发到相邻路由器 `to`
    #[tracing::instrument(skip(self))]
    pub(crate) fn send_packet(&mut self, from: &str, position: usize, to: &str) -> Result<()> {
        if !self.routers.contains_key(to) {
            return Err(SimError::UnknownRouter(to.to_string()));
        }
        let packet = self.router_mut(from)?.send_packet(position, to);
        trace!(pkt_id = %packet.id(), hops = packet.hops(), "🚀 转发数据包");
        self.router_mut(to)?.add_packet(packet);
        Ok(())
    }

    pub(crate) fn notify_received(&mut self, packet: Packet) {
        self.notifier.emit(TopologyEvent::PacketReceived { packet });
    }

    /// 为每个路由器打开一帧撤销日志
    pub(crate) fn begin_step(&mut self) {
        for router in self.routers.values_mut() {
            router.begin_step();
        }
    }

    /// 丢弃超出撤销深度的旧日志帧
    pub(crate) fn trim_journal(&mut self, depth: usize) {
        for router in self.routers.values_mut() {
            router.trim_journal(depth);
        }
    }

    /// 撤销最近一步：回退所有冷却中的包，合并分支副本，回滚各路由器的日志
    #[tracing::instrument(skip(self))]
    pub(crate) fn undo_step(&mut self) {
        let mut reversed = Vec::new();
        for router in self.routers.values_mut() {
            reversed.extend(router.unsend_packets());
        }

        for packet in reversed {
            let prev = packet.current_router().to_string();
            match self.routers.get_mut(&prev) {
                Some(router) => {
                    router.add_packet(packet);
                }
                None => warn!(router = %prev, pkt_id = %packet.id(), "上一跳路由器已不存在，丢弃回退的包"),
            }
        }

        for router in self.routers.values_mut() {
            let merged = router.merge_branch_copies();
            if merged > 0 {
                trace!(router = %router.name(), merged, "合并分支副本");
            }
            router.rollback_step();
            router.restale_packets();
        }
        debug!(in_flight = self.packet_count(), "↩️  撤销完成");
    }

    /// 清空全部数据包状态（不改变结构）
    pub fn reset_packets(&mut self) {
        for router in self.routers.values_mut() {
            router.reset_packets();
            router.set_routing_table(None);
        }
    }
}

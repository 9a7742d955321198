//! 路由器
//!
//! 路由器持有当前位于它上面的数据包、无向邻居集合、
//! 用于重复抑制的已见包 id 集合，以及（最短路径模式下的）路由表。

use std::collections::{BTreeSet, HashSet, VecDeque};

use super::id::PacketId;
use super::packet::Packet;
use super::routing::RoutingTable;
use crate::error::{Result, SimError};
use tracing::trace;

/// 一次刷新的结果：首次送达的包与重复送达的包
#[derive(Debug, Default)]
pub struct Refreshed {
    pub removed: Vec<Packet>,
    pub dropped: Vec<Packet>,
}

/// 单步日志：记录本步被移出队列的包与新加入已见集合的 id，用于精确撤销
#[derive(Debug, Default)]
struct StepFrame {
    retired: Vec<Packet>,
    newly_seen: Vec<PacketId>,
}

/// 网络路由器
#[derive(Debug)]
pub struct Router {
    name: String,
    neighbors: BTreeSet<String>,
    packets: Vec<Packet>,
    seen: HashSet<PacketId>,
    routing_table: Option<RoutingTable>,
    journal: VecDeque<StepFrame>,
}

impl Router {
    /// 创建新路由器，名称不能为空
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(SimError::EmptyRouterName);
        }
        Ok(Self {
            name,
            neighbors: BTreeSet::new(),
            packets: Vec::new(),
            seen: HashSet::new(),
            routing_table: None,
            journal: VecDeque::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn neighbors(&self) -> &BTreeSet<String> {
        &self.neighbors
    }

    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_connected_to(&self, router: &str) -> bool {
        self.neighbors.contains(router)
    }

    /// 当前排队的数据包（按到达顺序）
    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn seen_packet_ids(&self) -> &HashSet<PacketId> {
        &self.seen
    }

    pub fn has_seen(&self, id: PacketId) -> bool {
        self.seen.contains(&id)
    }

    pub fn routing_table(&self) -> Option<&RoutingTable> {
        self.routing_table.as_ref()
    }

    pub(crate) fn set_routing_table(&mut self, table: Option<RoutingTable>) {
        self.routing_table = table;
    }

    /// 查询去往 `destination` 的下一跳
    pub fn next_hop(&self, destination: &str) -> Option<&str> {
        self.routing_table.as_ref()?.next_hop(destination)
    }

    pub(crate) fn connect(&mut self, router: &str) -> bool {
        self.neighbors.insert(router.to_string())
    }

    pub(crate) fn disconnect(&mut self, router: &str) -> bool {
        self.neighbors.remove(router)
    }

    /// 本步可以转发的数据包（冷却已解除）
    pub fn non_stale_packets(&self) -> impl Iterator<Item = &Packet> {
        self.packets.iter().filter(|p| !p.is_stale())
    }

    pub(crate) fn first_non_stale(&self) -> Option<usize> {
        self.packets.iter().position(|p| !p.is_stale())
    }

    pub(crate) fn add_packet(&mut self, packet: Packet) -> usize {
        self.packets.push(packet);
        self.packets.len() - 1
    }

    /// 丢弃指定位置的数据包
    pub(crate) fn drop_packet(&mut self, position: usize) -> Packet {
        let packet = self.packets.remove(position);
        self.retire(packet.clone());
        packet
    }

    /// 把指定位置的数据包出队并发往 `next`；调用方负责把它放进 `next` 的队列
    pub(crate) fn send_packet(&mut self, position: usize, next: &str) -> Packet {
        let mut packet = self.packets.remove(position);
        packet.send_to(next);
        packet
    }

    /// 步首：丢弃 id 已在本路由器出现过的包（来自另一条洪泛分支的重复到达）
    pub fn drop_repeated_packets(&mut self) -> Vec<Packet> {
        let (dropped, kept): (Vec<Packet>, Vec<Packet>) = std::mem::take(&mut self.packets)
            .into_iter()
            .partition(|p| self.seen.contains(&p.id()));
        self.packets = kept;
        for packet in &dropped {
            trace!(router = %self.name, pkt_id = %packet.id(), "丢弃重复包");
            self.retire(packet.clone());
        }
        dropped
    }

    /// 刷新队列：已到达目的地的包移出（首次为 removed，重复为 dropped），
    /// 其余包解除冷却。所有处理过的包 id 都记入已见集合。
    pub fn refresh_packets(&mut self) -> Refreshed {
        let mut result = Refreshed::default();
        let mut kept = Vec::with_capacity(self.packets.len());

        for mut packet in std::mem::take(&mut self.packets) {
            let id = packet.id();
            if packet.destination_reached() {
                if self.seen.contains(&id) {
                    result.dropped.push(packet);
                } else {
                    result.removed.push(packet);
                }
            } else {
                packet.unstale();
                kept.push(packet);
            }
            if self.seen.insert(id) {
                if let Some(frame) = self.journal.back_mut() {
                    frame.newly_seen.push(id);
                }
            }
        }

        self.packets = kept;
        for packet in result.removed.iter().chain(&result.dropped) {
            self.retire(packet.clone());
        }
        result
    }

    /// 撤销本步的转发：取出所有冷却中的包并各自回退一跳。
    /// 返回回退成功的包（当前位置即上一跳路由器）；0 跳的包是本步注入的，直接丢弃。
    pub fn unsend_packets(&mut self) -> Vec<Packet> {
        let (stale, kept): (Vec<Packet>, Vec<Packet>) = std::mem::take(&mut self.packets)
            .into_iter()
            .partition(Packet::is_stale);
        self.packets = kept;

        stale
            .into_iter()
            .filter_map(|mut packet| {
                if packet.unsend().is_some() {
                    Some(packet)
                } else {
                    trace!(router = %self.name, pkt_id = %packet.id(), "撤销注入");
                    None
                }
            })
            .collect()
    }

    /// 合并回退后重合的洪泛副本（同 id 且历史完全相同），返回合并掉的数量
    pub(crate) fn merge_branch_copies(&mut self) -> usize {
        let before = self.packets.len();
        let mut merged: Vec<Packet> = Vec::with_capacity(before);
        for packet in std::mem::take(&mut self.packets) {
            let duplicate = merged
                .iter()
                .any(|p| p.id() == packet.id() && p.history() == packet.history());
            if !duplicate {
                merged.push(packet);
            }
        }
        self.packets = merged;
        before - self.packets.len()
    }

    pub(crate) fn begin_step(&mut self) {
        self.journal.push_back(StepFrame::default());
    }

    /// 只保留最近 `depth` 帧日志
    pub(crate) fn trim_journal(&mut self, depth: usize) {
        let excess = self.journal.len().saturating_sub(depth);
        self.journal.drain(..excess);
    }

    /// 可回滚的日志帧数
    pub fn journal_depth(&self) -> usize {
        self.journal.len()
    }

    /// 回滚最近一步的日志：恢复被移出的包，撤回新记入的已见 id
    pub(crate) fn rollback_step(&mut self) {
        let Some(frame) = self.journal.pop_back() else {
            return;
        };
        for id in frame.newly_seen {
            self.seen.remove(&id);
        }
        self.packets.extend(frame.retired);
    }

    /// 每步结束后队列中的包都处于冷却状态；撤销后恢复这一点
    pub(crate) fn restale_packets(&mut self) {
        for packet in &mut self.packets {
            packet.mark_stale();
        }
    }

    /// 清空队列、已见集合和撤销日志（度量重置时调用）
    pub fn reset_packets(&mut self) {
        self.packets.clear();
        self.seen.clear();
        self.journal.clear();
    }

    fn retire(&mut self, packet: Packet) {
        if let Some(frame) = self.journal.back_mut() {
            frame.retired.push(packet);
        }
    }
}

//! 拓扑变更通知
//!
//! 拓扑结构变化与数据包注入/到达时发出的事件，供展示层等订阅者消费。

use super::packet::Packet;

/// 拓扑事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyEvent {
    RouterAdded { router: String, router_count: usize },
    RouterRemoved { router: String, router_count: usize },
    EdgeAdded { routers: (String, String), edge_count: usize },
    EdgeRemoved { routers: (String, String), edge_count: usize },
    /// 新包注入，或洪泛在某路由器处生成了分支副本
    PacketInjected { packet: Packet },
    /// 数据包到达目的地（重复送达也会触发）
    PacketReceived { packet: Packet },
}

impl TopologyEvent {
    /// 是否为结构性变更（路由器/边的增删）
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TopologyEvent::RouterAdded { .. }
                | TopologyEvent::RouterRemoved { .. }
                | TopologyEvent::EdgeAdded { .. }
                | TopologyEvent::EdgeRemoved { .. }
        )
    }
}

//! 最短路径转发
//!
//! 为每个路由器构建一张基于 BFS 生成树的路由表，转发时查表得到下一跳。
//! 拓扑在启用前已校验连通，因此查表不会失败。

use crate::error::{Result, SimError};
use crate::net::{RoutingTable, Topology};
use crate::sim::StepResult;
use tracing::debug;

pub(super) fn build_routing_tables(topology: &mut Topology) -> Result<()> {
    let names: Vec<String> = topology.router_names().map(str::to_owned).collect();
    for name in &names {
        let table = RoutingTable::build(topology, name)?;
        topology.router_mut(name)?.set_routing_table(Some(table));
    }
    debug!(routers = names.len(), "🗺️  路由表构建完成");
    Ok(())
}

pub(super) fn forward(
    topology: &mut Topology,
    from: &str,
    pos: usize,
    result: &mut StepResult,
) -> Result<()> {
    let router = topology
        .router(from)
        .ok_or_else(|| SimError::UnknownRouter(from.to_string()))?;
    let packet = &router.packets()[pos];
    let id = packet.id();
    let next = router
        .next_hop(packet.destination())
        .map(str::to_owned)
        .ok_or_else(|| SimError::NoRoute {
            from: from.to_string(),
            to: packet.destination().to_string(),
        })?;

    topology.send_packet(from, pos, &next)?;
    result.push_sent(id, from, &next);
    Ok(())
}

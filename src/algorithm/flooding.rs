//! 洪泛转发
//!
//! 向所有尚未访问过的邻居转发：原包走第一个邻居，其余每个邻居各得一份副本。
//! “未访问”按整条历史判断，而不仅仅排除上一跳。

use crate::error::{Result, SimError};
use crate::net::Topology;
use crate::sim::{DropReason, StepResult};
use tracing::trace;

pub(super) fn forward(
    topology: &mut Topology,
    from: &str,
    pos: usize,
    result: &mut StepResult,
) -> Result<()> {
    let router = topology
        .router(from)
        .ok_or_else(|| SimError::UnknownRouter(from.to_string()))?;
    let packet = router.packets()[pos].clone();
    let targets: Vec<String> = router
        .neighbors()
        .iter()
        .filter(|nbr| !packet.has_visited(nbr))
        .cloned()
        .collect();

    let Some((first, rest)) = targets.split_first() else {
        let dropped = topology.router_mut(from)?.drop_packet(pos);
        trace!(router = %from, pkt_id = %dropped.id(), "无未访问邻居，丢弃");
        result.push_dropped(&dropped, DropReason::DeadEnd);
        return Ok(());
    };

    for next in rest {
        let copy_pos = topology.inject_packet_copy(packet.clone(), from)?;
        topology.send_packet(from, copy_pos, next)?;
        result.push_sent(packet.id(), from, next);
    }

    topology.send_packet(from, pos, first)?;
    result.push_sent(packet.id(), from, first);
    Ok(())
}

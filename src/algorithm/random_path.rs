//! 随机路径转发
//!
//! 从邻居集合中均匀随机选一个转发。不回避上一跳，也不回避已访问过的路由器，
//! 因此数据包可能无限游走。

use rand::Rng;

use crate::error::{Result, SimError};
use crate::net::{Router, Topology};
use crate::sim::{DropReason, StepResult};

/// 均匀随机选择一个邻居；没有邻居时返回 None
pub fn choose_neighbor<'a, R: Rng + ?Sized>(router: &'a Router, rng: &mut R) -> Option<&'a str> {
    let degree = router.degree();
    if degree == 0 {
        return None;
    }
    let idx = rng.gen_range(0..degree);
    router.neighbors().iter().nth(idx).map(String::as_str)
}

pub(super) fn forward<R: Rng + ?Sized>(
    topology: &mut Topology,
    from: &str,
    pos: usize,
    rng: &mut R,
    result: &mut StepResult,
) -> Result<()> {
    let router = topology
        .router(from)
        .ok_or_else(|| SimError::UnknownRouter(from.to_string()))?;
    let id = router.packets()[pos].id();

    let Some(next) = choose_neighbor(router, rng).map(str::to_owned) else {
        let dropped = topology.router_mut(from)?.drop_packet(pos);
        result.push_dropped(&dropped, DropReason::Isolated);
        return Ok(());
    };

    topology.send_packet(from, pos, &next)?;
    result.push_sent(id, from, &next);
    Ok(())
}

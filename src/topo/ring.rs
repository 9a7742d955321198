//! 环形拓扑构建

use super::line::{LineOpts, build_line};
use crate::error::Result;
use crate::net::Topology;

#[derive(Debug, Clone)]
pub struct RingOpts {
    pub routers: usize,
}

impl Default for RingOpts {
    fn default() -> Self {
        Self { routers: 6 }
    }
}

/// 构建环形拓扑：在线形拓扑的基础上把首尾相连（至少 3 个路由器时）
pub fn build_ring(topology: &mut Topology, opts: &RingOpts) -> Result<Vec<String>> {
    let names = build_line(
        topology,
        &LineOpts {
            routers: opts.routers,
        },
    )?;
    if let [first, .., last] = names.as_slice() {
        if names.len() >= 3 {
            topology.add_edge(last, first)?;
        }
    }
    Ok(names)
}

//! 星形拓扑构建

use super::{add_routers, router_name};
use crate::error::Result;
use crate::net::Topology;

/// 星形拓扑配置选项（`routers` 含中心节点）
#[derive(Debug, Clone)]
pub struct StarOpts {
    pub routers: usize,
}

impl Default for StarOpts {
    fn default() -> Self {
        Self { routers: 5 }
    }
}

/// 构建星形拓扑：R0 为中心，其余路由器各连一条边到中心
pub fn build_star(topology: &mut Topology, opts: &StarOpts) -> Result<Vec<String>> {
    let names: Vec<String> = (0..opts.routers).map(router_name).collect();
    add_routers(topology, &names)?;
    if let Some((hub, spokes)) = names.split_first() {
        for spoke in spokes {
            topology.add_edge(hub, spoke)?;
        }
    }
    Ok(names)
}

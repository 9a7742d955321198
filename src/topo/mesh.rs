//! 全连接拓扑构建

use super::{add_routers, router_name};
use crate::error::Result;
use crate::net::Topology;

#[derive(Debug, Clone)]
pub struct MeshOpts {
    pub routers: usize,
}

impl Default for MeshOpts {
    fn default() -> Self {
        Self { routers: 4 }
    }
}

/// 构建全连接拓扑：任意两个路由器之间都有一条边
pub fn build_mesh(topology: &mut Topology, opts: &MeshOpts) -> Result<Vec<String>> {
    let names: Vec<String> = (0..opts.routers).map(router_name).collect();
    add_routers(topology, &names)?;
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            topology.add_edge(a, b)?;
        }
    }
    Ok(names)
}

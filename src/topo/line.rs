//! 线形拓扑构建

use super::{add_routers, router_name};
use crate::error::Result;
use crate::net::Topology;

/// 线形拓扑配置选项
#[derive(Debug, Clone)]
pub struct LineOpts {
    pub routers: usize,
}

impl Default for LineOpts {
    fn default() -> Self {
        Self { routers: 4 }
    }
}

/// 构建线形拓扑
///
/// 拓扑结构：R0 <-> R1 <-> ... <-> R(n-1)
/// 返回：按链上顺序排列的路由器名称
pub fn build_line(topology: &mut Topology, opts: &LineOpts) -> Result<Vec<String>> {
    let names: Vec<String> = (0..opts.routers).map(router_name).collect();
    add_routers(topology, &names)?;
    for pair in names.windows(2) {
        topology.add_edge(&pair[0], &pair[1])?;
    }
    Ok(names)
}

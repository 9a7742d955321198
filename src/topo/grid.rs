//! 网格拓扑构建

use super::add_routers;
use crate::error::Result;
use crate::net::Topology;

#[derive(Debug, Clone)]
pub struct GridOpts {
    pub width: usize,
    pub height: usize,
}

impl Default for GridOpts {
    fn default() -> Self {
        Self {
            width: 3,
            height: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GridTopology {
    pub width: usize,
    pub height: usize,
    pub routers: Vec<String>,
}

impl GridTopology {
    /// 第 `row` 行第 `col` 列的路由器名；越界时返回 `None`
    pub fn at(&self, row: usize, col: usize) -> Option<&str> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.routers.get(row * self.width + col).map(String::as_str)
    }
}

pub fn grid_router_name(row: usize, col: usize) -> String {
    format!("R{row}_{col}")
}

/// 构建 `height` 行 `width` 列的四邻接网格
pub fn build_grid(topology: &mut Topology, opts: &GridOpts) -> Result<GridTopology> {
    let mut routers = Vec::with_capacity(opts.width * opts.height);
    for row in 0..opts.height {
        for col in 0..opts.width {
            routers.push(grid_router_name(row, col));
        }
    }
    add_routers(topology, &routers)?;

    let width = opts.width;
    for row in 0..opts.height {
        for col in 0..width {
            let here = &routers[row * width + col];
            if col + 1 < width {
                topology.add_edge(here, &routers[row * width + col + 1])?;
            }
            if row + 1 < opts.height {
                topology.add_edge(here, &routers[(row + 1) * width + col])?;
            }
        }
    }
    Ok(GridTopology {
        width,
        height: opts.height,
        routers,
    })
}

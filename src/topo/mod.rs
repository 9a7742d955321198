//! 预置拓扑
//!
//! 常用形状的拓扑构建函数，每种形状带一个 `*Opts` 配置。
//! 路由器命名为 `R0, R1, ...`（网格为 `R<行>_<列>`）。

pub mod grid;
pub mod line;
pub mod mesh;
pub mod ring;
pub mod star;

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SimError};
use crate::net::Topology;

/// 预置拓扑形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyPreset {
    Line,
    Ring,
    Star,
    Grid,
    Mesh,
}

impl fmt::Display for TopologyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TopologyPreset::Line => "line",
            TopologyPreset::Ring => "ring",
            TopologyPreset::Star => "star",
            TopologyPreset::Grid => "grid",
            TopologyPreset::Mesh => "mesh",
        })
    }
}

impl FromStr for TopologyPreset {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(TopologyPreset::Line),
            "ring" => Ok(TopologyPreset::Ring),
            "star" => Ok(TopologyPreset::Star),
            "grid" => Ok(TopologyPreset::Grid),
            "mesh" | "full_mesh" | "full-mesh" => Ok(TopologyPreset::Mesh),
            _ => Err(SimError::UnknownTopology(s.to_string())),
        }
    }
}

/// 第 `i` 个路由器的名称
pub fn router_name(i: usize) -> String {
    format!("R{i}")
}

/// 依次添加路由器；名称重复视为参数错误
pub(crate) fn add_routers(topology: &mut Topology, names: &[String]) -> Result<()> {
    for name in names {
        if !topology.add_router(name.clone())? {
            return Err(SimError::DuplicateRouter(name.clone()));
        }
    }
    Ok(())
}

//! 网络模型模块
//!
//! 此模块包含路由仿真的图模型：数据包、路由器、拓扑，以及最短路径路由表。

// 子模块声明
mod event;
mod id;
mod packet;
mod router;
mod routing;
mod topology;

// 重新导出公共接口
pub use event::TopologyEvent;
pub use id::PacketId;
pub use packet::Packet;
pub use router::{Refreshed, Router};
pub use routing::{RoutingTable, SpanningTree};
pub use topology::{Edge, Topology};

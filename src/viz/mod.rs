//! 可视化事件记录（用于离线回放）
//!
//! 设计目标：
//! - **结构化**：用 JSON 事件而不是解析文本日志
//! - **只输出**：记录一次运行的过程，不会被读回来重建拓扑
//! - **可回放**：按步回放，撤销也作为事件记录

mod types;

pub use types::{VizEdgeInfo, VizEvent, VizEventKind, VizLogger};

//! 仿真核心模块
//!
//! 此模块包含单步推进的仿真控制器、单步结果、通知通道和实时统计。

// 子模块声明
mod event;
mod notify;
mod simulation;
mod stats;
mod step_result;

// 重新导出公共接口
pub use event::SimulationEvent;
pub use notify::{Notification, Notifier, SubscriberId};
pub use simulation::{DEFAULT_UNDO_DEPTH, SimOpts, Simulation};
pub use stats::{HopTally, Stats};
pub use step_result::{DropReason, StepEvent, StepResult};

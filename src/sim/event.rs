//! 仿真控制器通知

use super::step_result::StepResult;
use crate::algorithm::RoutingAlgorithm;

/// 仿真事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationEvent {
    RateChanged(u64),
    AlgorithmChanged(RoutingAlgorithm),
    ReadyStateChanged(bool),
    FirstStepTaken,
    StepTaken(StepResult),
    MetricsReset,
    TopologyReset,
    UndoStep,
}

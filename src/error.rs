//! 错误类型
//!
//! 路由仿真核心的错误定义：参数错误、状态错误与查找失败。

use thiserror::Error;

/// 仿真核心错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("router name must not be empty")]
    EmptyRouterName,

    #[error("router {0} already exists")]
    DuplicateRouter(String),

    #[error("router {0} is not part of the topology")]
    UnknownRouter(String),

    #[error("router {0} cannot be connected to itself")]
    SelfLoop(String),

    #[error("injection rate must be a positive integer, got {0}")]
    InvalidRate(u64),

    #[error("unknown routing algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("unknown topology preset: {0}")]
    UnknownTopology(String),

    #[error("simulation is not ready: select a routing algorithm and build a connected topology")]
    NotReady,

    #[error("cannot inject a packet into a topology with {count} router(s)")]
    TooFewRouters { count: usize },

    #[error("no route from {from} to {to}")]
    NoRoute { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, SimError>;

//! 标识符类型
//!
//! 定义数据包的唯一标识符。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 数据包标识符（由仿真的包计数器分配，洪泛副本共享同一个 id）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PacketId(pub u64);

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

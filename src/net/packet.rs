//! 数据包类型
//!
//! 定义网络数据包及其前进/回退操作。

use super::id::PacketId;

/// 网络数据包
///
/// `history` 的最后一个元素永远是数据包当前所在的路由器，
/// 因此始终满足 `hops == history.len() - 1`。
/// `Clone` 即洪泛分支时的复制：历史按值拷贝，之后两份各自演化。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    id: PacketId,
    source: String,
    destination: String,
    hops: u64,
    stale: bool,
    history: Vec<String>,
}

impl Packet {
    /// 创建新数据包：位于源路由器，0 跳，处于冷却状态（需先刷新才能转发）
    pub fn new(id: PacketId, source: impl Into<String>, destination: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            id,
            history: vec![source.clone()],
            source,
            destination: destination.into(),
            hops: 0,
            stale: true,
        }
    }

    pub fn id(&self) -> PacketId {
        self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn hops(&self) -> u64 {
        self.hops
    }

    /// 本步刚到达、尚不能再次转发
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// 经过的路由器序列（源在前，当前位置在后）
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// 获取当前所在路由器
    pub fn current_router(&self) -> &str {
        self.history
            .last()
            .expect("packet history always holds its source")
    }

    /// 检查是否已到达目的地
    pub fn destination_reached(&self) -> bool {
        self.current_router() == self.destination
    }

    /// 检查整条历史中是否经过某路由器（不只是上一跳）
    pub fn has_visited(&self, router: &str) -> bool {
        self.history.iter().any(|r| r == router)
    }

    /// 前进一跳：记录新位置、跳数加一并进入冷却
    pub(crate) fn send_to(&mut self, router: impl Into<String>) {
        self.history.push(router.into());
        self.hops = self.hops.saturating_add(1);
        self.stale = true;
    }

    /// 回退一跳，返回回退后所在的路由器；0 跳时无法回退，返回 None
    pub(crate) fn unsend(&mut self) -> Option<&str> {
        if self.hops == 0 {
            return None;
        }
        self.history.pop();
        self.hops -= 1;
        self.stale = false;
        Some(self.current_router())
    }

    pub(crate) fn unstale(&mut self) {
        self.stale = false;
    }

    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
    }
}

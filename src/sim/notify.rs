//! 通知通道
//!
//! 核心只负责把类型化的通知投递给已注册的订阅者，从不检查订阅者本身。
//! 每个订阅者持有一个 mpsc `Receiver`；接收端被丢弃后，下次投递时自动移除。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use super::event::SimulationEvent;
use crate::net::TopologyEvent;

/// 订阅者标识，进程内唯一
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

// 所有通知器共用同一个 id 来源，拓扑迁移后挂接的订阅者不会撞号
static NEXT_SUBSCRIBER: AtomicU64 = AtomicU64::new(0);

impl SubscriberId {
    fn next() -> Self {
        SubscriberId(NEXT_SUBSCRIBER.fetch_add(1, Ordering::Relaxed))
    }
}

/// 订阅者收到的通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Topology(TopologyEvent),
    Simulation(SimulationEvent),
}

impl From<TopologyEvent> for Notification {
    fn from(ev: TopologyEvent) -> Self {
        Notification::Topology(ev)
    }
}

impl From<SimulationEvent> for Notification {
    fn from(ev: SimulationEvent) -> Self {
        Notification::Simulation(ev)
    }
}

/// 订阅者列表
#[derive(Debug, Default)]
pub struct Notifier {
    subscribers: Vec<(SubscriberId, Sender<Notification>)>,
}

impl Notifier {
    /// 注册新订阅者
    pub fn subscribe(&mut self) -> (SubscriberId, Receiver<Notification>) {
        let (tx, rx) = mpsc::channel();
        (self.register(tx), rx)
    }

    /// 以新分配的 id 登记一个发送端
    pub(crate) fn register(&mut self, tx: Sender<Notification>) -> SubscriberId {
        let id = SubscriberId::next();
        self.subscribers.push((id, tx));
        id
    }

    /// 以既有 id 挂接一个发送端（用于让同一订阅者同时接收多个来源的通知）
    pub(crate) fn attach(&mut self, id: SubscriberId, tx: Sender<Notification>) {
        self.subscribers.push((id, tx));
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// 交出全部订阅者（替换拓扑时迁移到新拓扑）
    pub(crate) fn take_subscribers(&mut self) -> Vec<(SubscriberId, Sender<Notification>)> {
        std::mem::take(&mut self.subscribers)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// 投递通知
    pub fn emit(&mut self, ev: impl Into<Notification>) {
        if self.subscribers.is_empty() {
            return;
        }
        let n = ev.into();
        self.subscribers.retain(|(_, tx)| tx.send(n.clone()).is_ok());
    }
}

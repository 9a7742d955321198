//! 单步结果
//!
//! 一次仿真步产生的有序事件日志与本步转发次数。产出后只读。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::net::{Packet, PacketId};

/// 丢包原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// 另一条洪泛分支先到过此路由器
    Repeated,
    /// 目的地已收到过同 id 的包
    DuplicateDelivery,
    /// 洪泛时所有邻居都已访问过
    DeadEnd,
    /// 路由器没有任何邻居
    Isolated,
}

/// 单步中的一条事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepEvent {
    Dropped {
        packet: PacketId,
        router: String,
        reason: DropReason,
    },
    Received {
        packet: PacketId,
        source: String,
        destination: String,
        hops: u64,
    },
    Sent {
        packet: PacketId,
        from: String,
        to: String,
    },
    Injected {
        packet: PacketId,
        source: String,
        destination: String,
    },
}

impl fmt::Display for StepEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepEvent::Dropped { packet, router, .. } => write!(f, "{router} dropped {packet}"),
            StepEvent::Received {
                packet,
                destination,
                ..
            } => write!(f, "{packet} reached its destination {destination}."),
            StepEvent::Sent { packet, from, to } => write!(f, "{from} sent {packet} to {to}"),
            StepEvent::Injected { packet, source, .. } => write!(f, "{packet} added to {source}"),
        }
    }
}

/// 一次仿真步的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    step: u64,
    transmitted: u64,
    events: Vec<StepEvent>,
}

impl StepResult {
    pub(crate) fn new(step: u64) -> Self {
        Self {
            step,
            transmitted: 0,
            events: Vec::new(),
        }
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    /// 本步成功转发的次数
    pub fn transmitted(&self) -> u64 {
        self.transmitted
    }

    pub fn events(&self) -> &[StepEvent] {
        &self.events
    }

    /// 人类可读的事件文本，顺序与事件一致
    pub fn messages(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }

    pub fn received(&self) -> impl Iterator<Item = &StepEvent> {
        self.events
            .iter()
            .filter(|ev| matches!(ev, StepEvent::Received { .. }))
    }

    pub fn dropped(&self) -> impl Iterator<Item = &StepEvent> {
        self.events
            .iter()
            .filter(|ev| matches!(ev, StepEvent::Dropped { .. }))
    }

    pub(crate) fn push_dropped(&mut self, packet: &Packet, reason: DropReason) {
        self.events.push(StepEvent::Dropped {
            packet: packet.id(),
            router: packet.current_router().to_string(),
            reason,
        });
    }

    pub(crate) fn push_received(&mut self, packet: &Packet) {
        self.events.push(StepEvent::Received {
            packet: packet.id(),
            source: packet.source().to_string(),
            destination: packet.destination().to_string(),
            hops: packet.hops(),
        });
    }

    pub(crate) fn push_sent(&mut self, packet: PacketId, from: &str, to: &str) {
        self.transmitted += 1;
        self.events.push(StepEvent::Sent {
            packet,
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    pub(crate) fn push_injected(&mut self, packet: &Packet) {
        self.events.push(StepEvent::Injected {
            packet: packet.id(),
            source: packet.source().to_string(),
            destination: packet.destination().to_string(),
        });
    }
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}:", self.step)?;
        for ev in &self.events {
            write!(f, "\n  {ev}")?;
        }
        Ok(())
    }
}

//! # Event 模块
//!
//! 战斗事件定义与同步分发。
//!
//! [`AttackEvent`] 在攻击结算时创建，由 [`AttackEventBus`] 立即分发给所有订阅者，
//! 分发完成后不保留。

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// 战斗参与者标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u64);

impl ActorId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

/// 三维坐标
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// 攻击事件
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackEvent {
    /// 攻击方
    pub attacker: ActorId,
    /// 被攻击方
    pub target: ActorId,
    /// 命中位置
    pub hit_position: Vec3,
}

impl AttackEvent {
    pub fn new(attacker: ActorId, target: ActorId, hit_position: Vec3) -> Self {
        Self {
            attacker,
            target,
            hit_position,
        }
    }
}

/// 订阅者标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Handler = Box<dyn FnMut(&AttackEvent)>;

/// 攻击事件总线
///
/// 按订阅顺序同步调用所有订阅者。
pub struct AttackEventBus {
    subscribers: Vec<(SubscriberId, Handler)>,
    next_id: u64,
}

impl Default for AttackEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AttackEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttackEventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl AttackEventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 1,
        }
    }

    /// 注册订阅者，返回用于注销的 ID
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: FnMut(&AttackEvent) + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// 注销订阅者
    ///
    /// 返回该 ID 是否存在。
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// 分发事件，返回收到事件的订阅者数量
    pub fn publish(&mut self, event: &AttackEvent) -> usize {
        trace!(
            attacker = %event.attacker,
            target = %event.target,
            "分发攻击事件"
        );
        for (_, handler) in &mut self.subscribers {
            handler(event);
        }
        self.subscribers.len()
    }
}

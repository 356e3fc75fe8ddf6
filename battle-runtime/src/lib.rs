//! # Battle Runtime
//!
//! 战斗场景的纯逻辑核心库，不依赖任何渲染引擎。
//!
//! ## 架构概述
//!
//! 宿主层（Host）持有 [`GimmickManager`]，按帧驱动 Gimmick 生命周期：
//!
//! ```text
//! Host                          GimmickManager
//!   │──── init() ─────────────────►│ on_enter × N
//!   │──── update(dt) ─────────────►│ on_update(dt) × N   （每帧）
//!   │──── release() ──────────────►│ on_exit × N
//! ```
//!
//! 攻击结算时，宿主创建 [`AttackEvent`] 并通过 [`AttackEventBus`] 同步分发；
//! 评论文本来自启动时加载的只读 [`CommentCatalog`]。
//!
//! ## 模块结构
//!
//! - [`gimmick`]：Gimmick 接口、通知 Gimmick、生命周期管理器
//! - [`comment`]：评论分类与评论表查询
//! - [`event`]：攻击事件与事件总线
//! - [`error`]：错误类型定义

pub mod comment;
pub mod error;
pub mod event;
pub mod gimmick;

// 重导出核心类型
pub use comment::{
    BuffCommentEntry, BuffCommentTable, BuffKind, CommentCatalog, CommentCategory, CommentRecord,
    NormalCommentTable,
};
pub use error::{
    BattleError, BattleResult, CommentError, GimmickError, GimmickResult, LifecycleError,
};
pub use event::{ActorId, AttackEvent, AttackEventBus, SubscriberId, Vec3};
pub use gimmick::{
    CycleReport, Gimmick, GimmickConfig, GimmickFailure, GimmickManager, GimmickPhase,
    ManagerState, Notice, TabNotificationGimmick, WindowNotificationGimmick,
};

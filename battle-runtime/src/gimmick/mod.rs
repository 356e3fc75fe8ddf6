//! # Gimmick 模块
//!
//! 战斗中的 UI/行为单元（通知标签、通知窗口等）及其生命周期管理。
//!
//! ## 生命周期
//!
//! ```text
//! Uninitialized ──init()──► Active ──release()──► Released
//!                             │ ▲
//!                             └─┘ update(dt)，每帧一次
//! ```
//!
//! - [`Gimmick`]：单个 Gimmick 需要实现的回调接口
//! - [`GimmickManager`]：按注册顺序驱动所有 Gimmick
//! - [`notification`]：通知标签与通知窗口两种 Gimmick

pub mod manager;
pub mod notification;

use std::any::Any;

use crate::error::GimmickResult;

pub use manager::{CycleReport, GimmickFailure, GimmickManager, GimmickPhase, ManagerState};
pub use notification::{GimmickConfig, Notice, TabNotificationGimmick, WindowNotificationGimmick};

/// Gimmick 回调接口
///
/// 所有回调都在宿主的帧线程上同步执行，不允许阻塞。
/// 回调失败时返回 [`GimmickError`](crate::error::GimmickError)，
/// 管理器只记录该错误，不会影响同一帧内其他 Gimmick 的回调。
pub trait Gimmick: 'static {
    /// 用于日志的名称
    fn name(&self) -> &str;

    /// 进入：管理器初始化时调用一次
    fn on_enter(&mut self) -> GimmickResult<()>;

    /// 每帧更新
    ///
    /// # 参数
    /// - `delta_seconds`: 距上一帧经过的时间（秒）
    fn on_update(&mut self, delta_seconds: f32) -> GimmickResult<()>;

    /// 退出：管理器释放时调用一次
    fn on_exit(&mut self) -> GimmickResult<()>;

    /// 供宿主按具体类型访问
    fn as_any(&self) -> &dyn Any;

    /// 供宿主按具体类型访问
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

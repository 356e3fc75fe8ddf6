//! # Error 模块
//!
//! 定义 battle-runtime 中使用的错误类型。

use thiserror::Error;

use crate::comment::{BuffKind, CommentCategory};
use crate::gimmick::ManagerState;

/// 生命周期错误
///
/// 属于调用方的编程错误，宿主应当立即中止而不是忽略。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    /// 在错误的状态下调用生命周期方法
    #[error("`{operation}` 需要状态 {expected:?}，实际为 {actual:?}")]
    InvalidState {
        operation: &'static str,
        expected: ManagerState,
        actual: ManagerState,
    },

    /// 帧间隔不是有限的非负数
    #[error("无效的帧间隔: {delta}")]
    InvalidDeltaTime { delta: f32 },
}

/// 评论配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommentError {
    /// 请求的分类/Buff 组合没有配置
    #[error("评论表中没有 {category:?} / {buff_kind:?} 的配置")]
    ConfigurationMissing {
        category: CommentCategory,
        buff_kind: Option<BuffKind>,
    },

    /// 候选列表为空
    #[error("评论表 {table} 的候选列表为空")]
    EmptyTable { table: String },

    /// 同一种 Buff 配置了多次
    #[error("Buff {buff_kind:?} 重复配置")]
    DuplicateBuffKind { buff_kind: BuffKind },

    /// 配置文本解析失败
    #[error("评论表解析失败: {message}")]
    Parse { message: String },

    /// 配置文件读取失败
    #[error("评论表读取失败 {path}: {message}")]
    Io { path: String, message: String },
}

/// Gimmick 回调错误
///
/// 由单个 Gimmick 返回，管理器记录后继续调用其余 Gimmick。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GimmickError {
    #[error("Gimmick '{gimmick}' 执行失败: {message}")]
    Failed { gimmick: String, message: String },
}

impl GimmickError {
    pub fn failed(gimmick: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            gimmick: gimmick.into(),
            message: message.into(),
        }
    }
}

/// battle-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BattleError {
    /// 生命周期错误
    #[error("生命周期错误: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// 评论配置错误
    #[error("评论配置错误: {0}")]
    Comment(#[from] CommentError),

    /// Gimmick 错误
    #[error("Gimmick 错误: {0}")]
    Gimmick(#[from] GimmickError),
}

/// Gimmick 回调的 Result 类型别名
pub type GimmickResult<T> = Result<T, GimmickError>;

/// Result 类型别名
pub type BattleResult<T> = Result<T, BattleError>;

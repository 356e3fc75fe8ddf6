//! # Config 模块
//!
//! 宿主配置管理，集中管理所有配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use battle_runtime::{CommentCategory, GimmickConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 评论表路径
    #[serde(default = "default_comments_path")]
    pub comments_path: PathBuf,

    /// 通知 Gimmick 参数
    #[serde(default)]
    pub gimmicks: GimmickConfig,

    /// 帧循环配置
    #[serde(default)]
    pub frame: FrameConfig,

    /// 战斗配置
    #[serde(default)]
    pub battle: BattleConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 帧循环配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameConfig {
    /// 目标帧率
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,

    /// headless 模式下运行的帧数
    #[serde(default = "default_frames")]
    pub frames: u64,

    /// 每隔多少帧产生一次模拟攻击（0 表示不产生）
    #[serde(default = "default_attack_every")]
    pub attack_every: u64,

    /// 是否按真实时间推进（否则使用固定帧间隔）
    #[serde(default)]
    pub realtime: bool,
}

/// 战斗配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleConfig {
    /// 攻击命中时使用的评论分类
    #[serde(default = "default_comment_category")]
    pub comment_category: CommentCategory,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别（trace/debug/info/warn/error）
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 默认配置文件名
pub const CONFIG_FILE_NAME: &str = "config.json";

// 默认值函数
fn default_comments_path() -> PathBuf {
    PathBuf::from("assets/comments.json")
}

fn default_target_fps() -> u32 {
    60
}

fn default_frames() -> u64 {
    600
}

fn default_attack_every() -> u64 {
    90
}

fn default_comment_category() -> CommentCategory {
    CommentCategory::Normal
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            comments_path: default_comments_path(),
            gimmicks: GimmickConfig::default(),
            frame: FrameConfig::default(),
            battle: BattleConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
            frames: default_frames(),
            attack_every: default_attack_every(),
            realtime: false,
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            comment_category: default_comment_category(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 查找配置文件
    ///
    /// 显式指定时直接使用；否则依次尝试当前目录和 battle-host 包目录下的
    /// `config.json`，都不存在时返回当前目录下的路径。
    pub fn locate(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }

        let candidates = [
            PathBuf::from(CONFIG_FILE_NAME),
            Path::new(env!("CARGO_MANIFEST_DIR")).join(CONFIG_FILE_NAME),
        ];
        candidates
            .iter()
            .find(|path| path.exists())
            .cloned()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// 加载配置文件
    ///
    /// 文件不存在时返回默认配置；文件存在但无法解析时返回错误。
    /// 配置中的相对路径以配置文件所在目录为基准。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let mut config: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;

        if let Some(base_dir) = path.parent() {
            config.resolve_paths(base_dir);
        }
        Ok(config)
    }

    /// 把相对路径改为以 `base_dir` 为基准
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        if self.comments_path.is_relative() {
            self.comments_path = base_dir.join(&self.comments_path);
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 解析日志级别
    pub fn log_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log.level).map_err(|_| {
            ConfigError::ValidationFailed(format!("未知的日志级别: {}", self.log.level))
        })
    }

    /// 固定帧间隔（秒）
    pub fn frame_delta(&self) -> f32 {
        1.0 / self.frame.target_fps.max(1) as f32
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame.target_fps == 0 {
            return Err(ConfigError::ValidationFailed(
                "target_fps 必须大于 0".to_string(),
            ));
        }

        // 检查评论表存在
        if !self.comments_path.exists() {
            return Err(ConfigError::ValidationFailed(format!(
                "评论表不存在: {:?}",
                self.comments_path
            )));
        }

        let gimmicks = &self.gimmicks;
        if !gimmicks.blink_interval.is_finite() || gimmicks.blink_interval <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "blink_interval 必须大于 0".to_string(),
            ));
        }

        if !gimmicks.display_duration.is_finite() || gimmicks.display_duration <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "display_duration 必须大于 0".to_string(),
            ));
        }

        let fade_in_range =
            gimmicks.fade_duration >= 0.0 && gimmicks.fade_duration <= gimmicks.display_duration;
        if !fade_in_range {
            return Err(ConfigError::ValidationFailed(
                "fade_duration 必须在 0 与 display_duration 之间".to_string(),
            ));
        }

        self.log_level()?;

        Ok(())
    }
}

/// 配置错误
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    /// 解析失败
    #[error("配置解析失败: {0}")]
    ParseFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}

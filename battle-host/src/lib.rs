//! Battle Host
//!
//! 负责配置、日志和帧循环，驱动 battle-runtime 中的 Gimmick 生命周期。

pub mod app;
pub mod config;
pub mod logging;

pub use app::{BattleApp, RunSummary, run};
pub use config::{AppConfig, ConfigError};

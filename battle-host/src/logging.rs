//! # Logging 模块
//!
//! 安装全局 tracing subscriber。只应在二进制入口调用一次。

use tracing::Level;

/// 初始化日志输出
///
/// 已经安装过 subscriber 时静默跳过（测试中多次调用的情况）。
pub fn init(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

//! Battle Host - headless 帧循环
//!
//! ```bash
//! cargo run -p battle-host
//! cargo run -p battle-host -- --config config.json --frames 300 --log-level debug
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use battle_host::{AppConfig, logging};
use battle_runtime::CommentCatalog;
use clap::Parser;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "battle-host")]
#[command(about = "战斗 Gimmick 帧循环（headless）")]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认查找 config.json）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 评论表路径（覆盖配置文件）
    #[arg(long)]
    comments: Option<PathBuf>,

    /// 运行帧数（覆盖配置文件）
    #[arg(long)]
    frames: Option<u64>,

    /// 目标帧率（覆盖配置文件）
    #[arg(long)]
    fps: Option<u32>,

    /// 日志级别（覆盖配置文件）
    #[arg(long)]
    log_level: Option<String>,

    /// 按真实时间推进
    #[arg(long)]
    realtime: bool,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{e:#}");
        eprintln!("battle-host error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = AppConfig::locate(cli.config.as_deref());
    let config_exists = config_path.exists();
    let mut config = AppConfig::load(&config_path)
        .with_context(|| format!("无法加载配置文件 {}", config_path.display()))?;
    apply_overrides(&mut config, &cli);
    config.validate()?;

    logging::init(config.log_level()?);
    if config_exists {
        info!(path = %config_path.display(), "配置文件加载成功");
    } else {
        info!(path = %config_path.display(), "配置文件不存在，使用默认配置");
    }

    let catalog = CommentCatalog::load(&config.comments_path)
        .with_context(|| format!("无法加载评论表 {}", config.comments_path.display()))?;
    info!(
        path = %config.comments_path.display(),
        categories = ?catalog.configured_categories(),
        "评论表加载成功"
    );

    battle_host::run(&config, catalog)?;
    Ok(())
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(path) = &cli.comments {
        config.comments_path = path.clone();
    }
    if let Some(frames) = cli.frames {
        config.frame.frames = frames;
    }
    if let Some(fps) = cli.fps {
        config.frame.target_fps = fps;
    }
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    if cli.realtime {
        config.frame.realtime = true;
    }
}

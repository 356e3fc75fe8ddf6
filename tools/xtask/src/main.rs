//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 battle-runtime 覆盖率
//! - `comment-check`: 检查评论表文件（格式、空表、重复 Buff）

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use battle_runtime::{CommentCatalog, CommentCategory};
use clap::{Parser, Subcommand};
use walkdir::WalkDir;
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "开发辅助工具")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行 fmt、clippy、test 门禁检查
    CheckAll,
    /// 运行 battle-runtime 覆盖率报告
    CovRuntime,
    /// 检查评论表文件
    CommentCheck {
        /// 文件或目录（默认：battle-host/assets）
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    match cli.command {
        Commands::CheckAll => {
            eprintln!("\n==> cargo fmt --all -- --check");
            cmd!(sh, "cargo fmt --all -- --check").run()?;

            eprintln!("\n==> cargo clippy --workspace --all-targets");
            cmd!(sh, "cargo clippy --workspace --all-targets").run()?;

            eprintln!("\n==> cargo test --workspace");
            cmd!(sh, "cargo test --workspace").run()?;
        }
        Commands::CovRuntime => {
            if cmd!(sh, "cargo llvm-cov --version").quiet().run().is_err() {
                anyhow::bail!(
                    "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
                );
            }

            eprintln!("\n==> cargo llvm-cov -p battle-runtime --all-features --html");
            cmd!(sh, "cargo llvm-cov -p battle-runtime --all-features --html").run()?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        Commands::CommentCheck { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from("battle-host/assets"));
            comment_check(&path)?;
        }
    }

    Ok(())
}

//=============================================================================
// comment-check 命令实现
//=============================================================================

/// 检查评论表文件
fn comment_check(path: &Path) -> anyhow::Result<()> {
    let files = collect_comment_files(path)?;

    if files.is_empty() {
        eprintln!("未找到评论表文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个评论表文件...\n", files.len());

    let mut errors = 0;
    for file in &files {
        match CommentCatalog::load(file) {
            Ok(catalog) => {
                let configured = catalog.configured_categories();
                let missing: Vec<CommentCategory> = CommentCategory::ALL
                    .into_iter()
                    .filter(|category| !configured.contains(category))
                    .collect();
                if missing.is_empty() {
                    eprintln!("[OK]   {}", file.display());
                } else {
                    eprintln!("[WARN] {}: 未配置 {:?}", file.display(), missing);
                }
            }
            Err(e) => {
                eprintln!("[ERROR] {}: {}", file.display(), e);
                errors += 1;
            }
        }
    }

    eprintln!();
    if errors > 0 {
        anyhow::bail!("评论表检查发现 {} 个错误", errors);
    }
    eprintln!("✅ 检查通过，无错误");
    Ok(())
}

/// 收集评论表文件：指定文件直接返回，目录则递归查找 `comments*.json`
fn collect_comment_files(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        anyhow::bail!("路径不存在: {}", path.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path) {
        let entry = entry?;
        let is_comment_table = entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with("comments") && name.ends_with(".json"));
        if is_comment_table {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

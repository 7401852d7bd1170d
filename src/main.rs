mod cli;
mod report;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use cli::Cli;
use rmnode::{CleanupOperation, Config, NodeModulesScanner};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 日志输出到 stderr，避免干扰 JSON 输出
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    // 加载配置
    let mut config = if let Some(config_path) = &cli.config {
        Config::load_from_file(config_path)?
    } else {
        Config::load_or_create_default()?
    };
    cli.apply_overrides(&mut config);

    let progress = if cli.json {
        ProgressBar::hidden()
    } else {
        create_progress_bar()
    };

    // Ctrl+C 取消扫描
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let found = Arc::new(AtomicUsize::new(0));
    let on_item_found = {
        let progress = progress.clone();
        let found = found.clone();
        move |item: rmnode::TargetDirectory| {
            if item.is_calculating() {
                let count = found.fetch_add(1, Ordering::Relaxed) + 1;
                progress.set_message(format!("发现 {} 个目录 | {}", count, item.path.display()));
            }
        }
    };
    let on_error = |error: rmnode::ScanError| {
        tracing::debug!("无法访问: {}", error);
    };

    let scanner = NodeModulesScanner::new(config);
    let result = scanner
        .scan_with_cancel(&cli.path, cancel, on_item_found, on_error)
        .await?;
    progress.finish_and_clear();

    // 取消的扫描结果不完整，不进入删除阶段
    let cleanup = match cli.delete_mode() {
        Some(mode) if !result.cancelled => {
            let operation = CleanupOperation::new(mode);
            let results = operation.delete_all(&result.items).await;
            Some((operation, results))
        }
        _ => None,
    };

    if cli.json {
        report::print_json(&result, cleanup.as_ref().map(|(_, results)| results.as_slice()))?;
    } else {
        report::print_table(&result);
        if let Some((operation, results)) = &cleanup {
            println!();
            report::print_cleanup(results, operation.mode());
        }
    }

    Ok(())
}

/// 创建进度条
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

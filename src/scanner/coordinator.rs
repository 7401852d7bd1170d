use std::path::Path;
use std::sync::Arc;
use anyhow::{Context, Result};
use tokio::fs;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, SettleMode};
use crate::models::{ScanError, ScanResult, TargetDirectory};
use crate::scanner::directory_walker::{self, ScanContext};
use crate::scanner::{PathClassifier, SizeEstimator};

/// node_modules 扫描器 - 并发遍历目录树，发现目标目录后立即回调，并在后台计算大小
pub struct NodeModulesScanner {
    config: Config,
    classifier: PathClassifier,
}

impl NodeModulesScanner {
    /// 创建新的扫描器
    pub fn new(config: Config) -> Self {
        Self {
            classifier: PathClassifier::new(&config),
            config,
        }
    }

    /// 扫描指定路径
    ///
    /// 每个目标目录会触发两次 `on_item_found`：发现时（大小未知）和大小计算完成后。
    /// 调用方应按 `id` 替换已有记录。
    pub async fn scan<F, E>(&self, root_path: &Path, on_item_found: F, on_error: E) -> Result<ScanResult>
    where
        F: Fn(TargetDirectory) + Send + Sync + 'static,
        E: Fn(ScanError) + Send + Sync + 'static,
    {
        self.scan_with_cancel(root_path, CancellationToken::new(), on_item_found, on_error)
            .await
    }

    /// 可取消的扫描，取消后不再触发任何回调，返回取消前已提交的部分结果
    pub async fn scan_with_cancel<F, E>(
        &self,
        root_path: &Path,
        cancel: CancellationToken,
        on_item_found: F,
        on_error: E,
    ) -> Result<ScanResult>
    where
        F: Fn(TargetDirectory) + Send + Sync + 'static,
        E: Fn(ScanError) + Send + Sync + 'static,
    {
        let root = std::path::absolute(root_path)
            .with_context(|| format!("无效的路径: {}", root_path.display()))?;

        let metadata = fs::metadata(&root)
            .await
            .with_context(|| format!("无法访问扫描路径: {}", root.display()))?;
        if !metadata.is_dir() {
            anyhow::bail!("不是目录: {}", root.display());
        }

        let scan_config = &self.config.scan;
        tracing::info!(
            "开始扫描 {}，并发数: {}",
            root.display(),
            scan_config.concurrency
        );

        let mut result = ScanResult::new(root.clone());
        let ctx = Arc::new(ScanContext::new(
            root,
            self.classifier.clone(),
            SizeEstimator::new(scan_config.size_batch_width),
            cancel.clone(),
            Arc::new(on_item_found),
            Arc::new(on_error),
            scan_config.idle_backoff(),
            scan_config.follow_symlinks,
        ));

        let workers: Vec<_> = (0..scan_config.concurrency.max(1))
            .map(|_| tokio::spawn(directory_walker::run_worker(Arc::clone(&ctx))))
            .collect();

        for joined in futures::future::join_all(workers).await {
            if let Err(e) = joined {
                tracing::warn!("扫描 worker 异常退出: {}", e);
            }
        }

        ctx.tracker().close();
        match scan_config.settle_mode {
            SettleMode::JoinAll => {
                tokio::select! {
                    _ = ctx.tracker().wait() => {}
                    _ = cancel.cancelled() => {}
                }
            }
            SettleMode::Grace => {
                tokio::select! {
                    _ = tokio::time::sleep(scan_config.settle_window()) => {}
                    _ = cancel.cancelled() => {}
                }
            }
        }

        let (items, errors) = ctx.snapshot();
        result.finish_scan(items, errors);
        result.cancelled = cancel.is_cancelled();

        tracing::info!(
            "扫描完成：发现 {} 个目录，共 {}，{} 个错误，耗时 {}",
            result.count,
            crate::utils::format_size(result.total_size),
            result.errors.len(),
            result.scan_duration_display()
        );
        if result.pending_sizes > 0 {
            tracing::info!("{} 个目录的大小仍在计算中，未计入总量", result.pending_sizes);
        }

        Ok(result)
    }
}

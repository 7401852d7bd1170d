use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::TargetDirectory;

/// 删除方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteMode {
    /// 只报告，不删除
    DryRun,
    /// 直接递归删除
    Remove,
    /// 移动到回收站
    Trash,
}

/// 单个目录的删除结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResult {
    pub success: bool,
    pub path: PathBuf,
    pub error: Option<String>,
    /// 释放的空间，失败时为 0
    pub freed_space: u64,
}

impl DeleteResult {
    fn succeeded(path: &Path, freed_space: u64) -> Self {
        Self {
            success: true,
            path: path.to_path_buf(),
            error: None,
            freed_space,
        }
    }

    fn failed(path: &Path, error: String) -> Self {
        Self {
            success: false,
            path: path.to_path_buf(),
            error: Some(error),
            freed_space: 0,
        }
    }
}

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(100);

/// 清理操作 - 删除扫描得到的目录
#[derive(Debug, Clone)]
pub struct CleanupOperation {
    mode: DeleteMode,
}

impl CleanupOperation {
    pub fn new(mode: DeleteMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DeleteMode {
        self.mode
    }

    /// 删除单个目录，错误记录在结果中而不是返回
    pub async fn delete_folder(&self, path: &Path, size: u64) -> DeleteResult {
        let outcome = match self.mode {
            DeleteMode::DryRun => Ok(()),
            DeleteMode::Remove => remove_with_retries(path).await,
            DeleteMode::Trash => move_to_trash(path).await,
        };

        match outcome {
            Ok(()) => DeleteResult::succeeded(path, size),
            Err(e) => {
                tracing::warn!("删除失败 {}: {}", path.display(), e);
                DeleteResult::failed(path, e)
            }
        }
    }

    /// 依次删除所有目录
    pub async fn delete_all(&self, items: &[TargetDirectory]) -> Vec<DeleteResult> {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            results.push(self.delete_folder(&item.path, item.size).await);
        }
        results
    }
}

/// 统计成功释放的空间
pub fn total_freed(results: &[DeleteResult]) -> u64 {
    results.iter().map(|r| r.freed_space).sum()
}

async fn remove_with_retries(path: &Path) -> Result<(), String> {
    let mut attempt = 0;
    loop {
        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => return Ok(()),
            // 目录已经不存在，视为删除成功
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) if attempt < MAX_RETRIES => {
                attempt += 1;
                tracing::debug!("删除 {} 失败，第 {} 次重试: {}", path.display(), attempt, e);
                tokio::time::sleep(RETRY_DELAY * attempt).await;
            }
            Err(e) => return Err(e.to_string()),
        }
    }
}

async fn move_to_trash(path: &Path) -> Result<(), String> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || trash::delete(&owned))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use tokio::fs;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// 大小估算器 - 按批次广度优先遍历目录树，统计所有普通文件的字节数
///
/// 无法读取的目录和无法 stat 的文件会被直接跳过，结果允许不完整。
/// 符号链接既不跟随也不计入大小。
#[derive(Debug, Clone)]
pub struct SizeEstimator {
    /// 每批并发处理的目录数量
    batch_width: usize,
}

/// 单个目录的列举结果
#[derive(Debug, Default)]
struct DirectoryListing {
    bytes: u64,
    subdirs: Vec<PathBuf>,
}

impl SizeEstimator {
    pub fn new(batch_width: usize) -> Self {
        Self {
            batch_width: batch_width.max(1),
        }
    }

    /// 计算目录树的总字节数
    ///
    /// 取消时返回错误，批次任务 panic 时同样返回错误。
    pub async fn estimate(&self, root: &Path, cancel: &CancellationToken) -> Result<u64> {
        let mut total = 0u64;
        let mut pending = VecDeque::from([root.to_path_buf()]);

        while !pending.is_empty() {
            if cancel.is_cancelled() {
                anyhow::bail!("大小计算已取消: {}", root.display());
            }

            let take = self.batch_width.min(pending.len());
            let mut batch = JoinSet::new();
            for dir in pending.drain(..take) {
                batch.spawn(list_directory(dir));
            }

            while let Some(joined) = batch.join_next().await {
                let listing = joined
                    .with_context(|| format!("计算目录大小失败: {}", root.display()))?;
                total += listing.bytes;
                pending.extend(listing.subdirs);
            }
        }

        Ok(total)
    }
}

impl Default for SizeEstimator {
    fn default() -> Self {
        Self::new(crate::config::DefaultConfig::default_size_batch_width())
    }
}

/// 列出目录，累计文件大小并收集子目录
async fn list_directory(dir: PathBuf) -> DirectoryListing {
    let mut listing = DirectoryListing::default();

    let mut entries = match fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(_) => return listing,
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) | Err(_) => break,
        };

        let file_type = match entry.file_type().await {
            Ok(file_type) => file_type,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            listing.subdirs.push(entry.path());
        } else if file_type.is_file() {
            if let Ok(metadata) = entry.metadata().await {
                listing.bytes += metadata.len();
            }
        }
    }

    listing
}

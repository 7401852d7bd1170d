use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::TargetDirectory;

/// 无法列出的目录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanError {
    /// 出错的目录
    pub path: PathBuf,

    /// 错误信息
    pub message: String,
}

impl ScanError {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// 扫描完成后的汇总结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// 发现的目录，按大小降序
    pub items: Vec<TargetDirectory>,

    /// 所有目录大小之和
    pub total_size: u64,

    /// 目录数量
    pub count: usize,

    /// 扫描过程中的错误
    pub errors: Vec<ScanError>,

    /// 扫描的根路径
    pub root_path: PathBuf,

    /// 扫描开始时间
    pub scan_start_time: DateTime<Utc>,

    /// 扫描结束时间
    pub scan_end_time: Option<DateTime<Utc>>,

    /// 扫描耗时
    pub scan_duration: Option<Duration>,

    /// 汇总时仍在计算大小的目录数量
    pub pending_sizes: usize,

    /// 扫描是否被取消
    pub cancelled: bool,
}

impl ScanResult {
    /// 创建新的扫描结果
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            items: Vec::new(),
            total_size: 0,
            count: 0,
            errors: Vec::new(),
            root_path,
            scan_start_time: Utc::now(),
            scan_end_time: None,
            scan_duration: None,
            pending_sizes: 0,
            cancelled: false,
        }
    }

    /// 用最终的目录和错误完成扫描
    pub fn finish_scan(&mut self, items: Vec<TargetDirectory>, errors: Vec<ScanError>) {
        self.items = items;
        self.errors = errors;
        self.scan_end_time = Some(Utc::now());
        self.update_stats();

        if let Some(end_time) = self.scan_end_time {
            self.scan_duration = Some(
                end_time
                    .signed_duration_since(self.scan_start_time)
                    .to_std()
                    .unwrap_or_default(),
            );
        }
    }

    /// 排序并更新统计信息
    fn update_stats(&mut self) {
        self.items
            .sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));

        self.total_size = self.items.iter().map(|i| i.size).sum();
        self.count = self.items.len();
        self.pending_sizes = self.items.iter().filter(|i| i.is_calculating()).count();
    }

    /// 获取扫描耗时的友好显示
    pub fn scan_duration_display(&self) -> String {
        match self.scan_duration {
            Some(duration) => {
                let millis = duration.as_millis();
                if millis < 1000 {
                    format!("{}ms", millis)
                } else if millis < 60_000 {
                    format!("{:.1}s", duration.as_secs_f64())
                } else {
                    let seconds = duration.as_secs();
                    format!("{}m {}s", seconds / 60, seconds % 60)
                }
            }
            None => "进行中...".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(path: &str, size: u64) -> TargetDirectory {
        TargetDirectory::discovered(PathBuf::from(path), "node_modules", Utc::now()).with_size(size)
    }

    #[test]
    fn test_finish_scan_sorts_and_totals() {
        let mut result = ScanResult::new(PathBuf::from("/work"));
        result.finish_scan(
            vec![
                item("/work/a/node_modules", 10),
                item("/work/b/node_modules", 300),
                item("/work/c/node_modules", 20),
            ],
            vec![ScanError::new("/work/locked", "Permission denied")],
        );

        let sizes: Vec<u64> = result.items.iter().map(|i| i.size).collect();
        assert_eq!(sizes, vec![300, 20, 10]);
        assert_eq!(result.total_size, 330);
        assert_eq!(result.count, 3);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.pending_sizes, 0);
        assert!(result.scan_duration.is_some());
    }

    #[test]
    fn test_pending_sizes_counted() {
        let mut result = ScanResult::new(PathBuf::from("/work"));
        let pending = TargetDirectory::discovered(
            PathBuf::from("/work/slow/node_modules"),
            "node_modules",
            Utc::now(),
        );
        result.finish_scan(vec![pending, item("/work/fast/node_modules", 5)], Vec::new());

        assert_eq!(result.pending_sizes, 1);
        assert_eq!(result.total_size, 5);
    }
}

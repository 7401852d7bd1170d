use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 大小计算状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SizeStatus {
    /// 正在后台计算
    Calculating,
    /// 计算完成
    Resolved,
    /// 计算失败，大小未知
    Unknown,
}

/// 扫描时发现的依赖缓存目录（例如 node_modules）
///
/// 记录是不可变的值：大小计算完成后会生成一个 `id` 相同的新记录，
/// 通过同一个回调再次发送给调用方，调用方按 `id` 替换即可。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetDirectory {
    /// 唯一标识，即目录的绝对路径
    pub id: PathBuf,

    /// 目录的绝对路径（与 id 相同）
    pub path: PathBuf,

    /// 显示名称，取父目录的名称
    pub name: String,

    /// 字节数，计算完成前为 0
    pub size: u64,

    /// 大小计算状态
    pub size_status: SizeStatus,

    /// 友好显示的大小
    pub display_size: String,

    /// 目录本身的最后修改时间（发现时记录）
    pub last_modified: DateTime<Utc>,
}

pub const CALCULATING_LABEL: &str = "calculating...";
pub const UNKNOWN_LABEL: &str = "unknown";

impl TargetDirectory {
    /// 创建一个大小待计算的新记录
    pub fn discovered(path: PathBuf, target_name: &str, last_modified: DateTime<Utc>) -> Self {
        let name = display_name_for(&path, target_name);
        Self {
            id: path.clone(),
            path,
            name,
            size: 0,
            size_status: SizeStatus::Calculating,
            display_size: CALCULATING_LABEL.to_string(),
            last_modified,
        }
    }

    /// 返回带有计算完成大小的新记录
    pub fn with_size(&self, size: u64) -> Self {
        Self {
            size,
            size_status: SizeStatus::Resolved,
            display_size: crate::utils::size_format::format_size(size),
            ..self.clone()
        }
    }

    /// 返回大小未知的新记录，已知的字节数保持不变
    pub fn with_unknown_size(&self) -> Self {
        Self {
            size_status: SizeStatus::Unknown,
            display_size: UNKNOWN_LABEL.to_string(),
            ..self.clone()
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.size_status == SizeStatus::Resolved
    }

    pub fn is_calculating(&self) -> bool {
        self.size_status == SizeStatus::Calculating
    }
}

/// 取目标目录的父目录名作为显示名称，为空时使用 "root"
fn display_name_for(path: &Path, target_name: &str) -> String {
    let parent = if path.file_name() == Some(std::ffi::OsStr::new(target_name)) {
        path.parent()
    } else {
        Some(path)
    };

    parent
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "root".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovered_record() {
        let now = Utc::now();
        let item = TargetDirectory::discovered(
            PathBuf::from("/home/me/app/node_modules"),
            "node_modules",
            now,
        );

        assert_eq!(item.id, item.path);
        assert_eq!(item.name, "app");
        assert_eq!(item.size, 0);
        assert!(item.is_calculating());
        assert_eq!(item.display_size, CALCULATING_LABEL);
        assert_eq!(item.last_modified, now);
    }

    #[test]
    fn test_root_fallback_name() {
        let item = TargetDirectory::discovered(
            PathBuf::from("/node_modules"),
            "node_modules",
            Utc::now(),
        );
        assert_eq!(item.name, "root");
    }

    #[test]
    fn test_size_updates_keep_identity() {
        let item = TargetDirectory::discovered(
            PathBuf::from("/srv/web/node_modules"),
            "node_modules",
            Utc::now(),
        );

        let resolved = item.with_size(1000);
        assert_eq!(resolved.id, item.id);
        assert_eq!(resolved.size, 1000);
        assert!(resolved.is_resolved());
        assert_eq!(resolved.display_size, "1000 B");

        // 原记录不受影响
        assert_eq!(item.size, 0);
        assert!(item.is_calculating());

        let failed = item.with_unknown_size();
        assert_eq!(failed.size_status, SizeStatus::Unknown);
        assert_eq!(failed.display_size, UNKNOWN_LABEL);
        assert_eq!(failed.id, item.id);
    }
}

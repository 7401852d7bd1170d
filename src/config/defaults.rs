use std::collections::HashSet;

pub struct DefaultConfig;

impl DefaultConfig {
    /// 默认查找的目录名
    pub fn default_target_name() -> String {
        "node_modules".to_string()
    }

    /// 默认跳过的目录名
    pub fn default_ignore_dirs() -> HashSet<String> {
        [
            // 版本控制
            ".git", ".svn", ".hg",
            // 构建产物和缓存
            ".next", ".nuxt", "dist", "build", "coverage", ".cache",
            // macOS 系统目录
            "Library", "System", "Private", "Applications",
            "Pictures", "Movies", "Music", "Photos Library.photoslibrary",
            ".Trash", ".Spotlight-V100", ".fseventsd",
            ".DocumentRevisions-V100", ".TemporaryItems",
            // 包管理器缓存
            ".npm", ".yarn", ".pnpm", ".pnpm-store", "pnpm-store", ".local",
            // 系统目录
            "Volumes", "dev", "etc", "proc", "sys", "tmp", "var",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// 表示位于包管理器缓存中的路径片段
    ///
    /// 目标目录自身的片段（例如 `/node_modules/`）由分类器根据目标名自动加入。
    pub fn default_nested_markers() -> Vec<String> {
        ["/.npm/", "/.yarn/", "/.pnpm/", "/pnpm-store/", "/_cacache/"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// 默认并发扫描的 worker 数量
    pub fn default_concurrency() -> usize {
        20
    }

    /// 计算大小时每批处理的目录数量
    pub fn default_size_batch_width() -> usize {
        50
    }

    /// 队列为空时 worker 的等待时间（毫秒）
    pub fn default_idle_backoff_ms() -> u64 {
        5
    }

    /// 宽限模式下遍历结束后的等待时间（毫秒）
    pub fn default_settle_ms() -> u64 {
        100
    }
}

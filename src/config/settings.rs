use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};

use crate::config::defaults::DefaultConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 要查找的目录名
    pub target_name: String,

    /// 扫描配置
    pub scan: ScanConfig,

    /// 忽略配置
    pub ignore: IgnoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// 并发遍历目录的 worker 数量
    pub concurrency: usize,

    /// 计算大小时每批并发处理的目录数量
    pub size_batch_width: usize,

    /// 队列暂时为空时 worker 的等待时间（毫秒）
    pub idle_backoff_ms: u64,

    /// 遍历结束后如何等待后台大小计算
    pub settle_mode: SettleMode,

    /// 宽限模式下的等待时间（毫秒）
    pub settle_ms: u64,

    /// 是否跟随符号链接目录
    pub follow_symlinks: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IgnoreConfig {
    /// 跳过的目录名
    pub directories: HashSet<String>,

    /// 表示嵌套在缓存中的路径片段
    pub nested_markers: Vec<String>,

    /// 是否跳过隐藏目录
    pub skip_hidden: bool,
}

/// 遍历结束后的收尾策略
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SettleMode {
    /// 等待所有大小计算任务完成
    JoinAll,
    /// 只等待固定时间，未完成的计算不计入结果
    Grace,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_name: DefaultConfig::default_target_name(),
            scan: ScanConfig::default(),
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: DefaultConfig::default_concurrency(),
            size_batch_width: DefaultConfig::default_size_batch_width(),
            idle_backoff_ms: DefaultConfig::default_idle_backoff_ms(),
            settle_mode: SettleMode::JoinAll,
            settle_ms: DefaultConfig::default_settle_ms(),
            follow_symlinks: false,
        }
    }
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            directories: DefaultConfig::default_ignore_dirs(),
            nested_markers: DefaultConfig::default_nested_markers(),
            skip_hidden: true,
        }
    }
}

impl ScanConfig {
    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }

    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Config {
    /// 从文件加载配置
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("配置文件格式错误: {}", path.display()))?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        // 确保目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// 获取默认配置文件路径
    pub fn default_config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("无法找到配置目录"))?;
        path.push("rmnode");
        path.push("config.toml");
        Ok(path)
    }

    /// 加载配置，如果文件不存在则创建默认配置
    pub fn load_or_create_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            let config = Self::default();
            if let Err(e) = config.save_to_file(&config_path) {
                tracing::warn!("无法写入默认配置 {}: {}", config_path.display(), e);
            }
            Ok(config)
        }
    }
}

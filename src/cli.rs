use clap::Parser;
use std::path::PathBuf;

use rmnode::{Config, DeleteMode};

#[derive(Parser)]
#[command(name = "rmnode")]
#[command(about = "快速查找并清理 node_modules 目录")]
#[command(version)]
pub struct Cli {
    /// 扫描的起始目录
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// 只显示将要删除的内容，不真正删除
    #[arg(short, long)]
    pub dry_run: bool,

    /// 扫描完成后删除所有发现的目录
    #[arg(long)]
    pub delete: bool,

    /// 删除时移动到回收站而不是直接删除
    #[arg(long, requires = "delete")]
    pub trash: bool,

    /// 以 JSON 格式输出结果
    #[arg(long)]
    pub json: bool,

    /// 并发遍历目录的 worker 数量
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// 跟随符号链接目录
    #[arg(long)]
    pub follow_symlinks: bool,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 详细输出
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 用命令行参数覆盖配置文件中的值
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(concurrency) = self.concurrency {
            config.scan.concurrency = concurrency.max(1);
        }
        if self.follow_symlinks {
            config.scan.follow_symlinks = true;
        }
    }

    /// 删除阶段的方式，`None` 表示只扫描
    pub fn delete_mode(&self) -> Option<DeleteMode> {
        if self.dry_run {
            Some(DeleteMode::DryRun)
        } else if self.delete && self.trash {
            Some(DeleteMode::Trash)
        } else if self.delete {
            Some(DeleteMode::Remove)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_flag() {
        let cli = Cli::try_parse_from(["rmnode", "--json", "-p", "/work"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.path, PathBuf::from("/work"));
        assert_eq!(cli.delete_mode(), None);

        let cli = Cli::try_parse_from(["rmnode"]).unwrap();
        assert!(!cli.json);
    }

    #[test]
    fn test_trash_requires_delete() {
        assert!(Cli::try_parse_from(["rmnode", "--trash"]).is_err());

        let cli = Cli::try_parse_from(["rmnode", "--delete", "--trash"]).unwrap();
        assert_eq!(cli.delete_mode(), Some(DeleteMode::Trash));
    }

    #[test]
    fn test_delete_mode() {
        let cli = Cli::try_parse_from(["rmnode", "--delete"]).unwrap();
        assert_eq!(cli.delete_mode(), Some(DeleteMode::Remove));

        // dry-run 优先于真实删除
        let cli = Cli::try_parse_from(["rmnode", "--dry-run", "--delete", "--trash"]).unwrap();
        assert_eq!(cli.delete_mode(), Some(DeleteMode::DryRun));
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from(["rmnode", "-j", "0", "--follow-symlinks"]).unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.scan.concurrency, 1);
        assert!(config.scan.follow_symlinks);
    }
}

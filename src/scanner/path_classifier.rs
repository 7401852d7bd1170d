use std::collections::HashSet;
use std::path::Path;

use crate::config::Config;

/// 路径分类器 - 判断目录是否应该跳过，以及目标目录是否嵌套在其它缓存中
#[derive(Debug, Clone)]
pub struct PathClassifier {
    /// 要查找的目录名
    target_name: String,

    /// 跳过的目录名
    ignore_dirs: HashSet<String>,

    /// 表示嵌套的路径片段，统一使用 `/` 作为分隔符
    nested_markers: Vec<String>,

    /// 是否跳过隐藏目录
    skip_hidden: bool,
}

impl PathClassifier {
    pub fn new(config: &Config) -> Self {
        let target_marker = format!("/{}/", config.target_name);
        let mut nested_markers = vec![target_marker];
        for marker in &config.ignore.nested_markers {
            if !nested_markers.contains(marker) {
                nested_markers.push(marker.clone());
            }
        }

        Self {
            target_name: config.target_name.clone(),
            ignore_dirs: config.ignore.directories.clone(),
            nested_markers,
            skip_hidden: config.ignore.skip_hidden,
        }
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// 是否是要查找的目录名
    pub fn is_target(&self, name: &str) -> bool {
        name == self.target_name
    }

    /// 检查是否应该完全跳过该目录（既不进入也不检查）
    pub fn should_skip(&self, name: &str) -> bool {
        if self.ignore_dirs.contains(name) {
            return true;
        }

        self.skip_hidden && name.starts_with('.')
    }

    /// 检查目标目录是否嵌套在另一个目标目录或包管理器缓存中
    pub fn is_nested_target(&self, candidate: &Path) -> bool {
        let normalized = candidate.to_string_lossy().replace('\\', "/");
        let suffix = format!("/{}", self.target_name);
        let prefix = normalized.strip_suffix(&suffix).unwrap_or(&normalized);

        self.nested_markers
            .iter()
            .any(|marker| prefix.contains(marker.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> PathClassifier {
        PathClassifier::new(&Config::default())
    }

    #[test]
    fn test_should_skip_deny_list() {
        let c = classifier();

        assert!(c.should_skip(".git"));
        assert!(c.should_skip("dist"));
        assert!(c.should_skip("Library"));
        assert!(c.should_skip("pnpm-store"));
        assert!(c.should_skip("proc"));

        assert!(!c.should_skip("src"));
        assert!(!c.should_skip("node_modules"));
        assert!(!c.should_skip("projects"));
    }

    #[test]
    fn test_should_skip_hidden() {
        let c = classifier();
        assert!(c.should_skip(".anything"));

        let mut config = Config::default();
        config.ignore.skip_hidden = false;
        let c = PathClassifier::new(&config);
        assert!(!c.should_skip(".anything"));
        // 仍然受跳过列表约束
        assert!(c.should_skip(".git"));
    }

    #[test]
    fn test_is_nested_target() {
        let c = classifier();

        assert!(!c.is_nested_target(Path::new("/home/me/app/node_modules")));
        assert!(c.is_nested_target(Path::new("/home/me/app/node_modules/pkg/node_modules")));
        assert!(c.is_nested_target(Path::new("/home/me/.npm/_npx/abc/node_modules")));
        assert!(c.is_nested_target(Path::new("/home/me/.pnpm/lodash@4/node_modules")));
        assert!(c.is_nested_target(Path::new("/home/me/pnpm-store/v3/node_modules")));
        assert!(c.is_nested_target(Path::new("/home/me/x/_cacache/y/node_modules")));
        assert!(!c.is_nested_target(Path::new("/home/me/my-npm-app/node_modules")));
    }

    #[test]
    fn test_is_nested_target_windows_separators() {
        let c = classifier();
        assert!(c.is_nested_target(Path::new("C:\\work\\node_modules\\a\\node_modules")));
        assert!(!c.is_nested_target(Path::new("C:\\work\\app\\node_modules")));
    }

    #[test]
    fn test_custom_target_name() {
        let mut config = Config::default();
        config.target_name = "bower_components".to_string();
        let c = PathClassifier::new(&config);

        assert!(c.is_target("bower_components"));
        assert!(!c.is_target("node_modules"));
        assert!(c.is_nested_target(Path::new("/a/bower_components/x/bower_components")));
    }
}

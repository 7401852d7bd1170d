pub mod config;
pub mod models;
pub mod operations;
pub mod scanner;
pub mod utils;

// 重新导出常用模块
pub use config::{Config, SettleMode};
pub use models::{ScanError, ScanResult, SizeStatus, TargetDirectory};
pub use operations::{CleanupOperation, DeleteMode, DeleteResult};
pub use scanner::{NodeModulesScanner, PathClassifier, SizeEstimator};

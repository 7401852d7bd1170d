pub mod scan_result;
pub mod target_directory;

pub use scan_result::{ScanError, ScanResult};
pub use target_directory::{SizeStatus, TargetDirectory};

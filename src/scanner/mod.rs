pub mod coordinator;
pub mod directory_walker;
pub mod path_classifier;
pub mod size_estimator;

pub use coordinator::NodeModulesScanner;
pub use directory_walker::{ErrorCallback, ItemCallback};
pub use path_classifier::PathClassifier;
pub use size_estimator::SizeEstimator;

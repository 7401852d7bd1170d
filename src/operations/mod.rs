pub mod cleanup;

pub use cleanup::{total_freed, CleanupOperation, DeleteMode, DeleteResult};

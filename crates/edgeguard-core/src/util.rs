//! Common utility functions.

pub mod data;
pub mod process;
pub mod fs;

// Re-export commonly used items
pub use data::{load_yaml, load_yaml_file, deep_merge, get_path};
pub use process::{run_async, redact_secrets, CommandOutput};
pub use fs::expand_path;

mod dir_scanner;
mod toolchain;

pub use dir_scanner::{
    ensure_directory_exists, find_sequence_directories, validate_directory_exists,
};
pub use toolchain::ToolPaths;

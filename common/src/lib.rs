pub mod config;
pub mod file_utils;
pub mod types;

pub use config::*;
pub use file_utils::*;
pub use types::*;

//! OS-backed implementations of the sanctuary core traits.

pub mod analyzer;
pub mod backends;
pub mod fs;

pub use analyzer::CommandAnalyzer;
pub use backends::create_backends;
pub use fs::LocalFileSystem;

//! Command implementations for the dotz CLI.

pub mod compress;
pub mod decompress;
pub mod info;
pub mod test;

pub use compress::cmd_compress;
pub use decompress::cmd_decompress;
pub use info::cmd_info;
pub use test::cmd_test;

/// Flags shared by `compress` and `decompress`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOptions {
    /// Write to standard output and keep the inputs.
    pub stdout: bool,
    /// Keep the inputs after a successful run.
    pub keep: bool,
    /// Overwrite without asking; compress even without a gain.
    pub force: bool,
    /// Show a progress bar per file.
    pub progress: bool,
    /// Report per-file statistics.
    pub verbose: bool,
}

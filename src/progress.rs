//! Progress callbacks for long-running operations.
//!
//! All methods have default no-op implementations, so implementors only
//! override the events they care about.

use std::path::Path;

/// Receives updates while the offline cache is being populated.
pub trait InstallProgress: Send + Sync {
    /// Called once with the number of paths to precache.
    fn on_install_start(&self, _total: usize) {}

    /// Called when a path was fetched and stored.
    fn on_cached(&self, _path: &str, _bytes: u64) {}

    /// Called when a path could not be precached.
    fn on_failed(&self, _path: &str, _error: &str) {}
}

/// Receives updates while the static site is being written.
pub trait ExportProgress: Send + Sync {
    /// Called once with the number of files to write.
    fn on_export_start(&self, _total: usize) {}

    /// Called after each file is written.
    fn on_file_written(&self, _path: &Path, _bytes: u64) {}
}

/// A null progress implementation that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl InstallProgress for NoProgress {}
impl ExportProgress for NoProgress {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_progress_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NoProgress>();
    }
}

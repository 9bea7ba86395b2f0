use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::command::SvnRunner;
use crate::log_debug;

/// Name of the administrative directory at the top of a working copy
pub const DEFAULT_METADATA_DIR: &str = ".svn";

/// Decides whether metadata can be collected for a directory.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Whether the `svn` executable responds at all.
    async fn available(&self) -> bool;

    /// Whether `root` lies inside a working copy.
    async fn is_repository(&self, root: &Path) -> bool;
}

/// Prober that shells out through an [`SvnRunner`].
///
/// The availability answer is computed on first use and kept for the life of
/// the prober; hosts keep one prober around for the whole build.
pub struct SvnProber {
    runner: Arc<dyn SvnRunner>,
    metadata_dir: String,
    available: OnceCell<bool>,
}

impl SvnProber {
    pub fn new(runner: Arc<dyn SvnRunner>) -> Self {
        Self {
            runner,
            metadata_dir: DEFAULT_METADATA_DIR.to_string(),
            available: OnceCell::new(),
        }
    }

    /// Creates a prober whose availability is already known.
    pub fn with_availability(runner: Arc<dyn SvnRunner>, available: bool) -> Self {
        Self {
            runner,
            metadata_dir: DEFAULT_METADATA_DIR.to_string(),
            available: OnceCell::new_with(Some(available)),
        }
    }

    #[must_use]
    pub fn metadata_dir(mut self, name: impl Into<String>) -> Self {
        self.metadata_dir = name.into();
        self
    }

    async fn check_executable(&self) -> bool {
        let cwd = std::env::temp_dir();
        let version = self.runner.run(&["--version", "--quiet"], &cwd).await;
        log_debug!("svn version probe returned {:?}", version);
        !version.is_empty()
    }
}

impl std::fmt::Debug for SvnProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvnProber")
            .field("metadata_dir", &self.metadata_dir)
            .field("available", &self.available.get())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Prober for SvnProber {
    async fn available(&self) -> bool {
        *self
            .available
            .get_or_init(|| self.check_executable())
            .await
    }

    async fn is_repository(&self, root: &Path) -> bool {
        if !self.available().await {
            return false;
        }

        if tokio::fs::metadata(root.join(&self.metadata_dir))
            .await
            .is_ok_and(|m| m.is_dir())
        {
            log_debug!("Found {} under {}", self.metadata_dir, root.display());
            return true;
        }

        // Nested directories of a working copy have no admin dir of their own
        let info = self.runner.run(&["info"], root).await;
        !info.is_empty()
    }
}

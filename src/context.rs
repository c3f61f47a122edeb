use std::{
    cell::Cell,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use tempfile::TempDir;

use crate::config::HarnessConfig;
use crate::foundation::error::{HarnessError, HarnessResult};

/// Resolves check names to stored reference images.
#[derive(Clone, Debug)]
pub struct ReferenceStore {
    root: PathBuf,
}

impl ReferenceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the reference for `file_name`. Fails with
    /// [`HarnessError::ReferenceMissing`] when no such file exists.
    pub fn resolve(&self, file_name: &str) -> HarnessResult<PathBuf> {
        let path = self.root.join(file_name);
        if !path.is_file() {
            return Err(HarnessError::ReferenceMissing(path));
        }
        Ok(path)
    }
}

enum ScratchDir {
    Temp(TempDir),
    Kept(PathBuf),
}

impl ScratchDir {
    fn path(&self) -> &Path {
        match self {
            Self::Temp(t) => t.path(),
            Self::Kept(p) => p,
        }
    }
}

/// Everything a scenario needs besides the replay engine: configuration, reference lookup and a
/// private scratch namespace for candidate images.
///
/// Each context owns a freshly created, uniquely named scratch directory, so scenarios running
/// in parallel against different engines never overwrite each other's candidates.
///
/// The scratch directory is removed on drop unless `keep_scratch` is set or an image check
/// failed; failure diagnostics name candidate files inside it.
pub struct RunContext {
    config: HarnessConfig,
    references: ReferenceStore,
    scratch: ScratchDir,
    failed: Cell<bool>,
}

impl RunContext {
    pub fn new(config: HarnessConfig) -> HarnessResult<Self> {
        config.validate()?;

        let root = config.scratch_root.clone().unwrap_or_else(std::env::temp_dir);
        std::fs::create_dir_all(&root)
            .with_context(|| format!("create scratch root '{}'", root.display()))?;
        let dir = tempfile::Builder::new()
            .prefix("overlay-harness-")
            .tempdir_in(&root)
            .with_context(|| format!("create scratch dir under '{}'", root.display()))?;

        let scratch = if config.keep_scratch {
            ScratchDir::Kept(dir.keep())
        } else {
            ScratchDir::Temp(dir)
        };
        tracing::debug!(scratch = %scratch.path().display(), "scratch namespace ready");

        Ok(Self {
            references: ReferenceStore::new(config.reference_dir.clone()),
            config,
            scratch,
            failed: Cell::new(false),
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn references(&self) -> &ReferenceStore {
        &self.references
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Where the candidate image for `file_name` is written.
    pub fn candidate_path(&self, file_name: &str) -> PathBuf {
        self.scratch.path().join(file_name)
    }

    /// Where the diff visualisation for `file_name` is written.
    pub fn diff_path(&self, file_name: &str) -> PathBuf {
        let stem = file_name.strip_suffix(".png").unwrap_or(file_name);
        self.scratch.path().join(format!("{stem}.diff.png"))
    }

    /// Record that an image check failed, so the scratch directory outlives this context.
    pub fn mark_failed(&self) {
        self.failed.set(true);
    }

    /// Whether any image check against this context has failed.
    pub fn has_failures(&self) -> bool {
        self.failed.get()
    }
}

impl Drop for RunContext {
    fn drop(&mut self) {
        if !self.failed.get() {
            return;
        }
        let placeholder = ScratchDir::Kept(PathBuf::new());
        if let ScratchDir::Temp(dir) = std::mem::replace(&mut self.scratch, placeholder) {
            let kept = dir.keep();
            tracing::warn!(scratch = %kept.display(), "keeping scratch directory of failed run");
        }
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("reference_dir", &self.references.root())
            .field("scratch_dir", &self.scratch.path())
            .field("keep_scratch", &self.config.keep_scratch)
            .field("failed", &self.failed.get())
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/unit/context.rs"]
mod tests;

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use crate::foundation::core::Extent;
use crate::foundation::error::{HarnessError, HarnessResult};

/// What the overlay sweep does once an overlay fails to match its reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepPolicy {
    /// Stop at the first mismatching overlay.
    #[default]
    AbortOnFirst,
    /// Compare every overlay, then fail with every mismatch if there was one.
    CollectAll,
}

/// Settings for one scenario run.
///
/// Every field has a default so a config file only needs to name what it changes; in practice
/// that is at least `reference_dir`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Directory holding the golden images, one `<check name>.png` per check.
    pub reference_dir: PathBuf,
    /// Parent of the per-run scratch directory. Defaults to the system temp directory.
    pub scratch_root: Option<PathBuf>,
    /// Keep the scratch directory (and its candidate images) after the run.
    pub keep_scratch: bool,
    /// Name of the marker action the scenario seeks past.
    pub marker: String,
    /// Size of the headless output surface.
    pub output_size: Extent,
    /// Per-channel tolerance for overlay images and the combined check.
    pub overlay_tolerance: u8,
    /// Per-channel tolerance for the depth/stencil extraction checks.
    pub channel_tolerance: u8,
    pub sweep_policy: SweepPolicy,
    /// Write `<name>.diff.png` next to a failing candidate.
    pub write_diff_images: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            reference_dir: PathBuf::from("reference"),
            scratch_root: None,
            keep_scratch: false,
            marker: "Test".to_string(),
            output_size: Extent::new(100, 100),
            overlay_tolerance: 2,
            channel_tolerance: 0,
            sweep_policy: SweepPolicy::AbortOnFirst,
            write_diff_images: true,
        }
    }
}

impl HarnessConfig {
    /// Defaults with the given reference directory.
    pub fn with_reference_dir(reference_dir: impl Into<PathBuf>) -> Self {
        Self {
            reference_dir: reference_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_json_file(path: &Path) -> HarnessResult<Self> {
        let f = File::open(path)
            .map_err(|e| HarnessError::config(format!("open '{}': {e}", path.display())))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| HarnessError::config(format!("parse '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(s: &str) -> HarnessResult<Self> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| HarnessError::config(format!("parse: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> HarnessResult<()> {
        if self.marker.trim().is_empty() {
            return Err(HarnessError::config("marker name must not be empty"));
        }
        if self.output_size.is_empty() {
            return Err(HarnessError::config(format!(
                "output size {}x{} must be non-zero",
                self.output_size.width, self.output_size.height
            )));
        }
        if self.reference_dir.as_os_str().is_empty() {
            return Err(HarnessError::config("reference_dir must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;

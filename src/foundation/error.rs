use std::path::PathBuf;

use crate::foundation::core::Rgba32F;

/// Convenience result type used across the harness.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Top-level error taxonomy. Every variant is fatal to the scenario that raised it.
#[derive(thiserror::Error, Debug)]
pub enum HarnessError {
    /// A baseline pixel check read an unexpected color.
    #[error("pixel mismatch at ({x}, {y}): got {actual}, expected {expected}")]
    PixelMismatch {
        /// Resolved texel column.
        x: u32,
        /// Resolved texel row.
        y: u32,
        /// Color read back from the target.
        actual: Rgba32F,
        /// Color the check asserted.
        expected: Rgba32F,
    },

    /// A saved overlay image differs from its reference beyond tolerance.
    #[error(
        "reference and output image differ for overlay {overlay}: candidate '{}', reference '{}'",
        .candidate.display(),
        .reference.display()
    )]
    OverlayMismatch {
        /// Display name of the overlay that failed.
        overlay: String,
        /// Freshly saved candidate image.
        candidate: PathBuf,
        /// Stored reference image.
        reference: PathBuf,
        /// Diff visualisation, when one was written.
        diff: Option<PathBuf>,
    },

    /// Several overlays differ from their references (collect-all sweep).
    #[error("{0}")]
    OverlayMismatches(OverlayFailures),

    /// A non-overlay image check (depth/stencil extraction, combined check) failed.
    #[error(
        "reference and output image differ for {check}: candidate '{}', reference '{}'",
        .candidate.display(),
        .reference.display()
    )]
    ImageMismatch {
        /// Name of the check that failed.
        check: String,
        /// Freshly saved candidate image.
        candidate: PathBuf,
        /// Stored reference image.
        reference: PathBuf,
        /// Diff visualisation, when one was written.
        diff: Option<PathBuf>,
    },

    /// No reference image is stored for a check.
    #[error("reference image missing: '{}'", .0.display())]
    ReferenceMissing(PathBuf),

    /// An image could not be decoded, or two images cannot be compared.
    #[error("image load error for '{}': {reason}", .path.display())]
    ImageLoad {
        /// Offending file.
        path: PathBuf,
        /// Decoder or dimension message.
        reason: String,
    },

    /// The replay engine failed to save a texture.
    #[error("save error for '{}': {reason}", .path.display())]
    Save {
        /// Destination path.
        path: PathBuf,
        /// Engine message.
        reason: String,
    },

    /// The replay engine reported a failure outside of saving.
    #[error("replay error: {0}")]
    Replay(String),

    /// Invalid caller input (coordinates, catalog entries, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One overlay whose saved image did not match its reference.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct OverlayFailure {
    pub overlay: String,
    pub candidate: PathBuf,
    pub reference: PathBuf,
    pub diff: Option<PathBuf>,
}

impl std::fmt::Display for OverlayFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: candidate '{}', reference '{}'",
            self.overlay,
            self.candidate.display(),
            self.reference.display()
        )
    }
}

/// Every failing overlay of a sweep, in catalog order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct OverlayFailures(pub Vec<OverlayFailure>);

impl std::fmt::Display for OverlayFailures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "reference and output image differ for {} overlays",
            self.0.len()
        )?;
        for failure in &self.0 {
            write!(f, "\n  {failure}")?;
        }
        Ok(())
    }
}

impl HarnessError {
    /// Build a [`HarnessError::Replay`] value.
    pub fn replay(msg: impl Into<String>) -> Self {
        Self::Replay(msg.into())
    }

    /// Build a [`HarnessError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`HarnessError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`HarnessError::ImageLoad`] value.
    pub fn image_load(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::ImageLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`HarnessError::Save`] value.
    pub fn save(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Save {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// The `(candidate, reference)` pair for image-diff failures, for manual inspection.
    ///
    /// For [`HarnessError::OverlayMismatches`] this is the first failing overlay; see
    /// [`HarnessError::overlay_failures`] for all of them.
    pub fn image_paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        match self {
            Self::OverlayMismatches(all) => all
                .0
                .first()
                .map(|f| (&f.candidate, &f.reference)),
            Self::OverlayMismatch {
                candidate,
                reference,
                ..
            }
            | Self::ImageMismatch {
                candidate,
                reference,
                ..
            } => Some((candidate, reference)),
            _ => None,
        }
    }

    /// Failing overlays carried by this error, in catalog order.
    pub fn overlay_failures(&self) -> Vec<OverlayFailure> {
        match self {
            Self::OverlayMismatch {
                overlay,
                candidate,
                reference,
                diff,
            } => vec![OverlayFailure {
                overlay: overlay.clone(),
                candidate: candidate.clone(),
                reference: reference.clone(),
                diff: diff.clone(),
            }],
            Self::OverlayMismatches(all) => all.0.clone(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

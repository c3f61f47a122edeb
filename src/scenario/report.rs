use std::path::PathBuf;

use crate::foundation::core::Rgba32F;
use crate::oracle::pixel::ExpectedPixel;
use crate::overlay::driver::{ComparisonOutcome, ImageCheck};

/// Scenario progress. Stages run strictly in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    BaselineChecks,
    OverlaySweep,
    ChannelChecks,
    CombinedCheck,
    Done,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PixelRecord {
    pub check: ExpectedPixel,
    pub actual: Rgba32F,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ChannelRecord {
    pub name: &'static str,
    pub channel: usize,
    pub check: ImageCheck,
}

/// Everything a passing scenario checked, in execution order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ScenarioReport {
    pub scratch_dir: PathBuf,
    pub pixels: Vec<PixelRecord>,
    pub overlays: Vec<ComparisonOutcome>,
    pub channels: Vec<ChannelRecord>,
    pub combined: Option<ImageCheck>,
    pub stage: Stage,
}

impl ScenarioReport {
    pub(crate) fn new(scratch_dir: PathBuf) -> Self {
        Self {
            scratch_dir,
            pixels: Vec::new(),
            overlays: Vec::new(),
            channels: Vec::new(),
            combined: None,
            stage: Stage::Init,
        }
    }

    pub fn passed(&self) -> bool {
        self.stage == Stage::Done
            && self.overlays.iter().all(ComparisonOutcome::passed)
            && self.channels.iter().all(|c| c.check.passed())
            && self.combined.as_ref().is_some_and(ImageCheck::passed)
    }

    /// Number of image comparisons performed (overlays, channels, combined).
    pub fn image_checks(&self) -> usize {
        self.overlays.len() + self.channels.len() + usize::from(self.combined.is_some())
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

//! Boundary to the frame-capture replay engine.
//!
//! The harness never owns GPU resources. It drives an engine through [`ReplayController`] and a
//! display surface through [`ReplayOutput`], and refers to textures only by [`ResourceId`] for
//! the duration of one check.

use std::path::Path;

use crate::compare::remap::DisplayRange;
use crate::foundation::core::{EventId, Extent, ResourceId, Rgba32F};
use crate::foundation::error::HarnessResult;
use crate::overlay::catalog::OverlayKind;

/// An action (draw, marker, ...) in the captured command stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionInfo {
    pub name: String,
    pub event_id: EventId,
    /// The action that immediately follows this one, if any.
    pub next: Option<EventId>,
}

/// Attachments bound by the active pipeline at the current frame position.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PipelineTargets {
    pub color_targets: Vec<ResourceId>,
    pub depth_target: Option<ResourceId>,
}

/// Window the output surface renders into. Harness runs are always headless.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowSpec {
    Headless(Extent),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputType {
    Texture,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FileType {
    #[default]
    Png,
}

impl FileType {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
        }
    }
}

/// What an output surface shows: a texture plus an optional debug overlay over it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureDisplay {
    pub resource: ResourceId,
    pub overlay: OverlayKind,
}

/// Parameters for writing one texture to disk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureSave {
    pub resource: ResourceId,
    pub file_type: FileType,
    /// Save a single channel as grayscale (0 = depth, 1 = stencil for depth/stencil targets).
    pub channel_extract: Option<usize>,
    pub range: DisplayRange,
}

impl TextureSave {
    pub fn png(resource: ResourceId) -> Self {
        Self {
            resource,
            file_type: FileType::Png,
            channel_extract: None,
            range: DisplayRange::UNIT,
        }
    }

    pub fn with_range(mut self, range: DisplayRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_channel(mut self, channel: usize) -> Self {
        self.channel_extract = Some(channel);
        self
    }
}

/// Control surface of a loaded capture.
///
/// Calls are synchronous: each returns only once the engine has finished the request.
pub trait ReplayController {
    /// Display surface created by [`ReplayController::create_output`].
    type Output: ReplayOutput;

    /// Look up an action by name.
    fn find_action(&self, name: &str) -> Option<ActionInfo>;

    /// Move the replay to `event`, making its state current.
    fn set_frame_event(&mut self, event: EventId) -> HarnessResult<()>;

    /// Targets bound by the pipeline at the current frame position.
    fn pipeline_state(&self) -> HarnessResult<PipelineTargets>;

    fn create_output(
        &mut self,
        window: WindowSpec,
        kind: OutputType,
    ) -> HarnessResult<Self::Output>;

    fn texture_extent(&self, resource: ResourceId) -> HarnessResult<Extent>;

    /// Read one texel of `resource` as float RGBA.
    fn pick_pixel(&mut self, resource: ResourceId, x: u32, y: u32) -> HarnessResult<Rgba32F>;

    /// Encode `save.resource` and write it to `path`. Failures are [`HarnessError::Save`].
    ///
    /// [`HarnessError::Save`]: crate::HarnessError::Save
    fn save_texture(&mut self, save: &TextureSave, path: &Path) -> HarnessResult<()>;
}

/// A display surface that can compute debug overlays.
pub trait ReplayOutput {
    fn set_texture_display(&mut self, display: &TextureDisplay) -> HarnessResult<()>;

    /// Render the configured overlay and return the texture holding it.
    ///
    /// Overlays that modify the displayed texture in place still return an id; callers that need
    /// the modified contents read the displayed texture instead.
    fn compute_overlay(&mut self) -> HarnessResult<ResourceId>;

    fn shutdown(&mut self) -> HarnessResult<()>;
}

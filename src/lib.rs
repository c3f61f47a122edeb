//! Visual-regression verification for GPU frame-capture debug overlays.
//!
//! Given a replayed frame, the harness asserts exact colors at fixed pixels of the rendered
//! output, then renders every supported debug overlay, saves it as a PNG and diffs it against a
//! stored reference within a per-channel tolerance.
//!
//! # Pipeline overview
//!
//! 1. **Init**: seek past the marker action, look up the color and depth/stencil targets
//! 2. **Baseline**: pixel checks on the plain color target ([`check_pixel`])
//! 3. **Overlay sweep**: every catalog entry that is not excluded ([`validate_all`])
//! 4. **Channels**: depth and stencil of the depth/stencil target saved separately
//! 5. **Combined**: clear-before-draw over the depth target
//!
//! The replay engine, its GPU resources and the output surface stay behind the
//! [`ReplayController`] / [`ReplayOutput`] traits; the harness only orchestrates and judges.
#![forbid(unsafe_code)]

mod compare;
mod config;
mod context;
mod foundation;
mod oracle;
mod overlay;
mod replay;
mod scenario;

pub use compare::image_diff::{
    Channel, ComparisonResult, Mismatch, compare, compare_images, load_rgba8, write_diff_image,
};
pub use compare::remap::{DisplayRange, FloatImage, encode_texture};
pub use config::{HarnessConfig, SweepPolicy};
pub use context::{ReferenceStore, RunContext};
pub use foundation::core::{Coord, EventId, Extent, ResourceId, Rgba32F};
pub use foundation::error::{HarnessError, HarnessResult, OverlayFailure, OverlayFailures};
pub use oracle::pixel::{ExpectedPixel, PIXEL_EPSILON, check_pixel, colors_match};
pub use overlay::catalog::{
    Exclusion, OverlayCatalog, OverlayDescriptor, OverlayKind, OverlaySource, descriptor,
};
pub use overlay::driver::{
    ComparisonOutcome, ImageCheck, check_image, sweep, validate_all, validate_overlay,
};
pub use replay::{
    ActionInfo, FileType, OutputType, PipelineTargets, ReplayController, ReplayOutput,
    TextureDisplay, TextureSave, WindowSpec,
};
pub use scenario::baseline::{self, BASELINE_PIXELS, ChannelCheck};
pub use scenario::report::{ChannelRecord, PixelRecord, ScenarioReport, Stage};
pub use scenario::runner::{ScenarioRunner, ScopedOutput};

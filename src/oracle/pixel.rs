use crate::foundation::core::{Coord, ResourceId, Rgba32F};
use crate::foundation::error::{HarnessError, HarnessResult};
use crate::replay::ReplayController;

/// Slack added to every pixel comparison to absorb float round-off in the readback.
pub const PIXEL_EPSILON: f32 = f32::EPSILON;

/// One asserted pixel.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ExpectedPixel {
    /// What the pixel is supposed to show; used in logs only.
    pub label: &'static str,
    pub coord: Coord,
    pub color: Rgba32F,
    /// Allowed absolute difference per channel, on top of [`PIXEL_EPSILON`].
    pub tolerance: f32,
}

impl ExpectedPixel {
    pub const fn new(label: &'static str, coord: Coord, color: Rgba32F) -> Self {
        Self {
            label,
            coord,
            color,
            tolerance: 0.0,
        }
    }

    pub const fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Whether every channel of `actual` is within `tolerance` (+ epsilon) of `expected`.
pub fn colors_match(actual: Rgba32F, expected: Rgba32F, tolerance: f32) -> bool {
    let limit = tolerance.max(0.0) + PIXEL_EPSILON;
    actual
        .0
        .iter()
        .zip(expected.0.iter())
        .all(|(a, e)| (a - e).abs() <= limit)
}

/// Read one pixel of `target` and assert its color.
///
/// Normalized coordinates are resolved against the target's extent at call time; every call
/// re-reads from the engine. Returns the color read on success.
pub fn check_pixel<R: ReplayController + ?Sized>(
    replay: &mut R,
    target: ResourceId,
    expected: &ExpectedPixel,
) -> HarnessResult<Rgba32F> {
    let extent = replay.texture_extent(target)?;
    let (x, y) = expected.coord.resolve(extent)?;
    let actual = replay.pick_pixel(target, x, y)?;

    if !colors_match(actual, expected.color, expected.tolerance) {
        return Err(HarnessError::PixelMismatch {
            x,
            y,
            actual,
            expected: expected.color,
        });
    }

    tracing::info!(
        label = expected.label,
        x,
        y,
        "picked value {} matches expected",
        actual
    );
    Ok(actual)
}

#[cfg(test)]
#[path = "../../tests/unit/oracle/pixel.rs"]
mod tests;

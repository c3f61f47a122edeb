//! Fixed expectations for the overlay test frame.
//!
//! The frame clears to dark grey and draws: a large darker triangle, a triangle split into a red
//! upper half and a blue lower half, a black triangle clipped by the right edge of the viewport,
//! and four small triangles whose colors encode their screen-space size.

use crate::foundation::core::{Coord, Rgba32F};
use crate::oracle::pixel::ExpectedPixel;
use crate::overlay::catalog::OverlayKind;

pub const BACKGROUND: Rgba32F = Rgba32F::new(0.2, 0.2, 0.2, 1.0);
pub const DARK_TRIANGLE: Rgba32F = Rgba32F::new(0.1, 0.1, 0.1, 1.0);
pub const RED: Rgba32F = Rgba32F::new(1.0, 0.0, 0.0, 1.0);
pub const BLUE: Rgba32F = Rgba32F::new(0.0, 0.0, 1.0, 1.0);
pub const BLACK: Rgba32F = Rgba32F::new(0.0, 0.0, 0.0, 1.0);

const fn norm(label: &'static str, x: f32, y: f32, color: Rgba32F) -> ExpectedPixel {
    ExpectedPixel::new(label, Coord::normalized(x, y), color)
}

const fn abs(label: &'static str, x: u32, y: u32, color: Rgba32F) -> ExpectedPixel {
    ExpectedPixel::new(label, Coord::absolute(x, y), color)
}

/// Pixel checks against the color target with no overlay, in execution order.
pub const BASELINE_PIXELS: [ExpectedPixel; 15] = [
    norm("background top-left", 0.1, 0.1, BACKGROUND),
    norm("background top-right", 0.8, 0.1, BACKGROUND),
    norm("background bottom", 0.5, 0.95, BACKGROUND),
    norm("large triangle apex", 0.5, 0.1, DARK_TRIANGLE),
    norm("large triangle center", 0.5, 0.9, DARK_TRIANGLE),
    norm("large triangle left", 0.2, 0.9, DARK_TRIANGLE),
    norm("large triangle right", 0.8, 0.9, DARK_TRIANGLE),
    norm("split triangle upper half", 0.3, 0.4, RED),
    norm("split triangle lower half", 0.3, 0.6, BLUE),
    abs("clipped triangle inside", 335, 140, BLACK),
    abs("clipped triangle cut off", 340, 140, BACKGROUND),
    abs("size marker 1", 200, 51, Rgba32F::new(1.0, 0.5, 1.0, 1.0)),
    abs("size marker 2", 200, 65, Rgba32F::new(1.0, 1.0, 0.0, 1.0)),
    abs("size marker 3", 200, 79, Rgba32F::new(0.0, 1.0, 1.0, 1.0)),
    abs("size marker 4", 200, 93, Rgba32F::new(0.0, 1.0, 0.0, 1.0)),
];

/// One channel of the depth/stencil target saved on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ChannelCheck {
    pub name: &'static str,
    pub channel: usize,
}

impl ChannelCheck {
    pub fn image_file_name(&self) -> String {
        format!("{}.png", self.name)
    }
}

pub const DEPTH: ChannelCheck = ChannelCheck {
    name: "depth",
    channel: 0,
};

pub const STENCIL: ChannelCheck = ChannelCheck {
    name: "stencil",
    channel: 1,
};

/// Overlay used for the depth-target check.
pub const COMBINED_OVERLAY: OverlayKind = OverlayKind::ClearBeforeDraw;

/// Image name of the depth-target check, distinct from the color-target sweep's.
pub fn combined_image_name() -> String {
    format!("{}.Depth.png", COMBINED_OVERLAY.name())
}

#[cfg(test)]
#[path = "../../tests/unit/scenario/baseline.rs"]
mod tests;

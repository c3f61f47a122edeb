use image::{Rgba, RgbaImage};

use crate::foundation::core::{Extent, Rgba32F};
use crate::foundation::error::{HarnessError, HarnessResult};

/// Linear black/white window applied to texel values before 8-bit encoding.
///
/// Values at `black` encode to 0 and values at `white` encode to 255; anything outside the
/// window saturates. Overlays that count things (overdraw, triangle size) emit values well above
/// 1.0 and are saved through a wider window so the counts stay distinguishable.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DisplayRange {
    pub black: f32,
    pub white: f32,
}

impl DisplayRange {
    /// The identity window `[0, 1]`.
    pub const UNIT: Self = Self::new(0.0, 1.0);

    /// Window used for counter-style overlays.
    pub const COUNTER: Self = Self::new(0.0, 10.0);

    pub const fn new(black: f32, white: f32) -> Self {
        Self { black, white }
    }

    pub fn validate(self) -> HarnessResult<()> {
        if !self.black.is_finite() || !self.white.is_finite() {
            return Err(HarnessError::validation("display range must be finite"));
        }
        if self.white <= self.black {
            return Err(HarnessError::validation(format!(
                "display range white point {} must exceed black point {}",
                self.white, self.black
            )));
        }
        Ok(())
    }

    /// Map `v` into `[0, 1]` through the window.
    pub fn remap(self, v: f32) -> f32 {
        if v.is_nan() {
            return 0.0;
        }
        ((v - self.black) / (self.white - self.black)).clamp(0.0, 1.0)
    }

    /// Map `v` through the window and quantise to an 8-bit channel (round to nearest).
    pub fn to_unorm8(self, v: f32) -> u8 {
        (self.remap(v) * 255.0).round() as u8
    }
}

impl Default for DisplayRange {
    fn default() -> Self {
        Self::UNIT
    }
}

/// CPU-side float texture contents, row-major, four channels per texel.
///
/// Replay adapters that read textures back to the host use this as the common input to
/// [`encode_texture`].
#[derive(Clone, Debug, PartialEq)]
pub struct FloatImage {
    extent: Extent,
    texels: Vec<[f32; 4]>,
}

impl FloatImage {
    /// A `width x height` image filled with `fill`.
    pub fn filled(extent: Extent, fill: Rgba32F) -> Self {
        let len = extent.width as usize * extent.height as usize;
        Self {
            extent,
            texels: vec![fill.0; len],
        }
    }

    /// Build an image by evaluating `f(x, y)` for every texel.
    pub fn from_fn(extent: Extent, mut f: impl FnMut(u32, u32) -> Rgba32F) -> Self {
        let mut texels = Vec::with_capacity(extent.width as usize * extent.height as usize);
        for y in 0..extent.height {
            for x in 0..extent.width {
                texels.push(f(x, y).0);
            }
        }
        Self { extent, texels }
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgba32F> {
        if !self.extent.contains(x, y) {
            return None;
        }
        self.texels
            .get(self.index(x, y))
            .copied()
            .map(Rgba32F)
    }

    pub fn put(&mut self, x: u32, y: u32, value: Rgba32F) {
        if self.extent.contains(x, y) {
            let idx = self.index(x, y);
            self.texels[idx] = value.0;
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.extent.width as usize + x as usize
    }
}

/// Encode a float texture to RGBA8 the way a texture save does.
///
/// - Without `channel_extract`, RGB go through `range` and alpha is clamped to `[0, 1]`.
/// - With `channel_extract = Some(c)`, channel `c` goes through `range` and is replicated into a
///   gray, fully opaque pixel. Depth lives in channel 0 and stencil in channel 1 of a combined
///   depth/stencil texture.
pub fn encode_texture(
    image: &FloatImage,
    range: DisplayRange,
    channel_extract: Option<usize>,
) -> HarnessResult<RgbaImage> {
    range.validate()?;
    if let Some(c) = channel_extract.filter(|&c| c > 3) {
        return Err(HarnessError::validation(format!(
            "channel extract index {c} is out of range"
        )));
    }

    let Extent { width, height } = image.extent();
    let mut out = RgbaImage::new(width, height);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let [r, g, b, a] = image.texels[image.index(x, y)];
        *px = match channel_extract {
            Some(c) => {
                let v = range.to_unorm8([r, g, b, a][c]);
                Rgba([v, v, v, 255])
            }
            None => Rgba([
                range.to_unorm8(r),
                range.to_unorm8(g),
                range.to_unorm8(b),
                DisplayRange::UNIT.to_unorm8(a),
            ]),
        };
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/compare/remap.rs"]
mod tests;

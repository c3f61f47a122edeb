use std::path::Path;

use anyhow::Context;
use image::{Rgba, RgbaImage};

use crate::foundation::error::{HarnessError, HarnessResult};

/// Color channel of an RGBA8 pixel, in scan order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Channel {
    R,
    G,
    B,
    A,
}

impl Channel {
    pub const ALL: [Self; 4] = [Self::R, Self::G, Self::B, Self::A];
}

/// First channel found out of tolerance while scanning row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Mismatch {
    pub x: u32,
    pub y: u32,
    pub channel: Channel,
    pub actual: u8,
    pub expected: u8,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}) channel {:?}: got {}, expected {}",
            self.x, self.y, self.channel, self.actual, self.expected
        )
    }
}

/// Verdict of one image comparison.
///
/// `equal` and `first_mismatch` decide the check; the counters are diagnostics only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ComparisonResult {
    pub equal: bool,
    pub first_mismatch: Option<Mismatch>,
    /// Pixels with at least one channel out of tolerance.
    pub differing_pixels: u64,
    /// Largest absolute channel delta seen anywhere.
    pub max_delta: u8,
}

/// Compare two in-memory RGBA8 images with an absolute per-channel `tolerance`.
///
/// The caller guarantees equal dimensions; see [`compare`] for the checked file-based entry.
pub fn compare_images(
    candidate: &RgbaImage,
    reference: &RgbaImage,
    tolerance: u8,
) -> ComparisonResult {
    debug_assert_eq!(candidate.dimensions(), reference.dimensions());

    let mut first_mismatch = None;
    let mut differing_pixels = 0u64;
    let mut max_delta = 0u8;

    for (y, (cand_row, ref_row)) in candidate.rows().zip(reference.rows()).enumerate() {
        for (x, (cand, refp)) in cand_row.zip(ref_row).enumerate() {
            let mut pixel_differs = false;
            for (i, channel) in Channel::ALL.into_iter().enumerate() {
                let delta = cand.0[i].abs_diff(refp.0[i]);
                max_delta = max_delta.max(delta);
                if delta > tolerance {
                    pixel_differs = true;
                    if first_mismatch.is_none() {
                        first_mismatch = Some(Mismatch {
                            x: x as u32,
                            y: y as u32,
                            channel,
                            actual: cand.0[i],
                            expected: refp.0[i],
                        });
                    }
                }
            }
            if pixel_differs {
                differing_pixels += 1;
            }
        }
    }

    ComparisonResult {
        equal: first_mismatch.is_none(),
        first_mismatch,
        differing_pixels,
        max_delta,
    }
}

/// Decode an image file and normalise it to RGBA8.
pub fn load_rgba8(path: &Path) -> HarnessResult<RgbaImage> {
    let img = image::open(path).map_err(|e| HarnessError::image_load(path, e))?;
    Ok(img.to_rgba8())
}

/// Compare a freshly saved candidate against a stored reference.
///
/// Fails with [`HarnessError::ReferenceMissing`] before touching the candidate when the reference
/// does not exist, and with [`HarnessError::ImageLoad`] when either file is unreadable or the
/// dimensions differ.
pub fn compare(
    candidate: &Path,
    reference: &Path,
    tolerance: u8,
) -> HarnessResult<ComparisonResult> {
    if !reference.is_file() {
        return Err(HarnessError::ReferenceMissing(reference.to_path_buf()));
    }

    let cand = load_rgba8(candidate)?;
    let refi = load_rgba8(reference)?;

    if cand.dimensions() != refi.dimensions() {
        let (cw, ch) = cand.dimensions();
        let (rw, rh) = refi.dimensions();
        return Err(HarnessError::image_load(
            candidate,
            format!("dimension mismatch: candidate {cw}x{ch}, reference {rw}x{rh}"),
        ));
    }

    Ok(compare_images(&cand, &refi, tolerance))
}

/// Write a visualisation of where two images differ.
///
/// Pixels within `tolerance` are shown as a darkened copy of the reference for context; pixels
/// out of tolerance show the per-channel delta amplified 4x on an opaque background.
pub fn write_diff_image(
    candidate: &Path,
    reference: &Path,
    tolerance: u8,
    out: &Path,
) -> HarnessResult<()> {
    let cand = load_rgba8(candidate)?;
    let refi = load_rgba8(reference)?;
    if cand.dimensions() != refi.dimensions() {
        return Err(HarnessError::image_load(
            candidate,
            "cannot diff images of different dimensions",
        ));
    }

    let diff = RgbaImage::from_fn(refi.width(), refi.height(), |x, y| {
        let a = refi.get_pixel(x, y).0;
        let b = cand.get_pixel(x, y).0;
        let d = [
            a[0].abs_diff(b[0]),
            a[1].abs_diff(b[1]),
            a[2].abs_diff(b[2]),
            a[3].abs_diff(b[3]),
        ];
        if d.iter().all(|&v| v <= tolerance) {
            Rgba([a[0] / 4, a[1] / 4, a[2] / 4, 255])
        } else {
            // alpha-only differences would otherwise render black
            let alpha = d[3].saturating_mul(4);
            Rgba([
                d[0].saturating_mul(4).max(alpha),
                d[1].saturating_mul(4),
                d[2].saturating_mul(4).max(alpha),
                255,
            ])
        }
    });

    diff.save(out)
        .with_context(|| format!("write diff png '{}'", out.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/compare/image_diff.rs"]
mod tests;

use std::borrow::Cow;

use crate::compare::remap::DisplayRange;
use crate::foundation::error::{HarnessError, HarnessResult};

/// Every debug overlay the replay engine can draw, in engine declaration order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum OverlayKind {
    NoOverlay,
    Drawcall,
    Wireframe,
    Depth,
    Stencil,
    BackfaceCull,
    ViewportScissor,
    NaN,
    Clipping,
    ClearBeforePass,
    ClearBeforeDraw,
    QuadOverdrawPass,
    QuadOverdrawDraw,
    TriangleSizePass,
    TriangleSizeDraw,
}

impl OverlayKind {
    pub const ALL: [Self; 15] = [
        Self::NoOverlay,
        Self::Drawcall,
        Self::Wireframe,
        Self::Depth,
        Self::Stencil,
        Self::BackfaceCull,
        Self::ViewportScissor,
        Self::NaN,
        Self::Clipping,
        Self::ClearBeforePass,
        Self::ClearBeforeDraw,
        Self::QuadOverdrawPass,
        Self::QuadOverdrawDraw,
        Self::TriangleSizePass,
        Self::TriangleSizeDraw,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::NoOverlay => "NoOverlay",
            Self::Drawcall => "Drawcall",
            Self::Wireframe => "Wireframe",
            Self::Depth => "Depth",
            Self::Stencil => "Stencil",
            Self::BackfaceCull => "BackfaceCull",
            Self::ViewportScissor => "ViewportScissor",
            Self::NaN => "NaN",
            Self::Clipping => "Clipping",
            Self::ClearBeforePass => "ClearBeforePass",
            Self::ClearBeforeDraw => "ClearBeforeDraw",
            Self::QuadOverdrawPass => "QuadOverdrawPass",
            Self::QuadOverdrawDraw => "QuadOverdrawDraw",
            Self::TriangleSizePass => "TriangleSizePass",
            Self::TriangleSizeDraw => "TriangleSizeDraw",
        }
    }
}

impl std::fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for OverlayKind {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| HarnessError::validation(format!("unknown overlay '{s}'")))
    }
}

/// Why an overlay is left out of automated comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Exclusion {
    /// "No overlay" placeholder; nothing to compare.
    Sentinel,
    /// A display filter over the texture rather than a separate overlay.
    DisplayMode,
    /// Output varies between GPU vendors beyond what a tolerance can absorb.
    Unstable,
}

/// Texture that holds an overlay's result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OverlaySource {
    /// The overlay's own output texture.
    OverlayOutput,
    /// The displayed texture itself, modified in place.
    BaseTarget,
}

/// Comparison policy for one overlay kind.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct OverlayDescriptor {
    pub kind: OverlayKind,
    pub display_name: &'static str,
    pub exclusion: Option<Exclusion>,
    pub range: DisplayRange,
    pub source: OverlaySource,
}

impl OverlayDescriptor {
    const fn overlay(kind: OverlayKind, display_name: &'static str) -> Self {
        Self {
            kind,
            display_name,
            exclusion: None,
            range: DisplayRange::UNIT,
            source: OverlaySource::OverlayOutput,
        }
    }

    const fn excluded_as(mut self, why: Exclusion) -> Self {
        self.exclusion = Some(why);
        self
    }

    const fn counter(mut self) -> Self {
        self.range = DisplayRange::COUNTER;
        self
    }

    const fn in_place(mut self) -> Self {
        self.source = OverlaySource::BaseTarget;
        self
    }

    pub fn is_excluded(&self) -> bool {
        self.exclusion.is_some()
    }

    /// Whether the raw output needs a window wider than `[0, 1]` before encoding.
    pub fn rescales(&self) -> bool {
        self.range != DisplayRange::UNIT
    }

    pub fn reads_base_target(&self) -> bool {
        self.source == OverlaySource::BaseTarget
    }

    /// File name of the candidate and reference images for this overlay.
    pub fn image_file_name(&self) -> String {
        format!("{}.png", self.display_name)
    }
}

use OverlayKind as K;

static STANDARD: [OverlayDescriptor; 15] = [
    OverlayDescriptor::overlay(K::NoOverlay, "NoOverlay").excluded_as(Exclusion::Sentinel),
    OverlayDescriptor::overlay(K::Drawcall, "Drawcall"),
    OverlayDescriptor::overlay(K::Wireframe, "Wireframe").excluded_as(Exclusion::Unstable),
    OverlayDescriptor::overlay(K::Depth, "Depth"),
    OverlayDescriptor::overlay(K::Stencil, "Stencil"),
    OverlayDescriptor::overlay(K::BackfaceCull, "BackfaceCull"),
    OverlayDescriptor::overlay(K::ViewportScissor, "ViewportScissor"),
    OverlayDescriptor::overlay(K::NaN, "NaN").excluded_as(Exclusion::DisplayMode),
    OverlayDescriptor::overlay(K::Clipping, "Clipping").excluded_as(Exclusion::DisplayMode),
    OverlayDescriptor::overlay(K::ClearBeforePass, "ClearBeforePass").in_place(),
    OverlayDescriptor::overlay(K::ClearBeforeDraw, "ClearBeforeDraw").in_place(),
    OverlayDescriptor::overlay(K::QuadOverdrawPass, "QuadOverdrawPass").counter(),
    OverlayDescriptor::overlay(K::QuadOverdrawDraw, "QuadOverdrawDraw").counter(),
    OverlayDescriptor::overlay(K::TriangleSizePass, "TriangleSizePass").counter(),
    OverlayDescriptor::overlay(K::TriangleSizeDraw, "TriangleSizeDraw").counter(),
];

/// Ordered, restartable set of overlay descriptors.
#[derive(Clone, Debug)]
pub struct OverlayCatalog {
    entries: Cow<'static, [OverlayDescriptor]>,
}

impl OverlayCatalog {
    /// The full overlay table with the built-in exclusion, rescale and source policies.
    pub fn standard() -> Self {
        Self {
            entries: Cow::Borrowed(&STANDARD),
        }
    }

    /// A custom catalog. Each kind may appear at most once.
    pub fn from_entries(entries: Vec<OverlayDescriptor>) -> HarnessResult<Self> {
        for (i, d) in entries.iter().enumerate() {
            if entries[..i].iter().any(|prev| prev.kind == d.kind) {
                return Err(HarnessError::validation(format!(
                    "overlay {} listed twice in catalog",
                    d.kind
                )));
            }
            d.range.validate()?;
        }
        Ok(Self {
            entries: Cow::Owned(entries),
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = &OverlayDescriptor> + '_ {
        self.entries.iter()
    }

    /// Entries that take part in automated comparison, in catalog order.
    pub fn evaluated(&self) -> impl Iterator<Item = &OverlayDescriptor> + '_ {
        self.entries().filter(|d| !d.is_excluded())
    }

    pub fn get(&self, kind: OverlayKind) -> Option<&OverlayDescriptor> {
        self.entries().find(|d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for OverlayCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Descriptor for `kind` in the standard table.
pub fn descriptor(kind: OverlayKind) -> &'static OverlayDescriptor {
    &STANDARD[kind as usize]
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/catalog.rs"]
mod tests;

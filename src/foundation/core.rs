use crate::foundation::error::{HarnessError, HarnessResult};

/// Opaque identifier of a texture or render target owned by the replay engine.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ResourceId(pub u64);

impl ResourceId {
    /// The null resource (nothing bound).
    pub const NULL: Self = Self(0);

    /// Whether this id refers to an actual resource.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ResourceId::{}", self.0)
    }
}

/// Position in the captured command stream the replay engine can seek to.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct EventId(pub u32);

/// Width/height of a texture or output surface, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }
}

/// Straight (non-premultiplied) RGBA color with `f32` channels, as returned by a pixel pick.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba32F(pub [f32; 4]);

impl Rgba32F {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    pub fn channels(self) -> [f32; 4] {
        self.0
    }
}

impl std::fmt::Display for Rgba32F {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "[{r}, {g}, {b}, {a}]")
    }
}

/// Where to sample a pixel: a fraction of the target extent, or an absolute texel.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Coord {
    Normalized { x: f32, y: f32 },
    Absolute { x: u32, y: u32 },
}

impl Coord {
    pub const fn normalized(x: f32, y: f32) -> Self {
        Self::Normalized { x, y }
    }

    pub const fn absolute(x: u32, y: u32) -> Self {
        Self::Absolute { x, y }
    }

    /// Resolve to a texel position inside `extent`.
    ///
    /// Normalized coordinates map onto the last addressable texel, `floor((w - 1) * x)`, so `1.0`
    /// lands on the final row/column instead of one past it.
    pub fn resolve(self, extent: Extent) -> HarnessResult<(u32, u32)> {
        if extent.is_empty() {
            return Err(HarnessError::validation(format!(
                "cannot sample a {}x{} target",
                extent.width, extent.height
            )));
        }

        let (x, y) = match self {
            Self::Normalized { x, y } => {
                if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
                    return Err(HarnessError::validation(format!(
                        "normalized coordinate ({x}, {y}) is outside [0, 1]"
                    )));
                }
                let max_x = f64::from(extent.width - 1);
                let max_y = f64::from(extent.height - 1);
                (
                    (max_x * f64::from(x)).floor() as u32,
                    (max_y * f64::from(y)).floor() as u32,
                )
            }
            Self::Absolute { x, y } => (x, y),
        };

        if !extent.contains(x, y) {
            return Err(HarnessError::validation(format!(
                "pixel ({x}, {y}) is outside the {}x{} target",
                extent.width, extent.height
            )));
        }
        Ok((x, y))
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normalized { x, y } => write!(f, "({x}, {y}) normalized"),
            Self::Absolute { x, y } => write!(f, "({x}, {y})"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

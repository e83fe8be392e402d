use crate::{
    assets::image_asset::ImageAsset,
    foundation::core::{IdAllocator, Rect},
    foundation::error::{FramestripError, FramestripResult},
};

/// Grid dimensions (columns x rows) used to cut one image into crop views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SplitFactors {
    x: u32,
    y: u32,
}

impl SplitFactors {
    /// Validated factors; both counts must be at least one.
    pub fn new(x: u32, y: u32) -> FramestripResult<Self> {
        if x < 1 || y < 1 {
            return Err(FramestripError::InvalidSplitFactor { x, y });
        }
        Ok(Self { x, y })
    }

    /// Column count.
    pub fn x(self) -> u32 {
        self.x
    }

    /// Row count.
    pub fn y(self) -> u32 {
        self.y
    }

    /// Number of cells, `x * y`.
    pub fn cells(self) -> usize {
        (self.x as usize) * (self.y as usize)
    }
}

/// Row-major crop rectangles tiling a `width x height` extent.
///
/// Cell `i` sits at column `i % x`, row `i / x`, with size `width / x` by `height / y`. Edges are
/// computed as `extent * k / count`, so neighbors share the exact same coordinate and the last
/// cell ends exactly on the extent.
pub fn crop_grid(width: f64, height: f64, factors: SplitFactors) -> Vec<Rect> {
    let (nx, ny) = (f64::from(factors.x), f64::from(factors.y));
    let edge_x = |k: u32| width * f64::from(k) / nx;
    let edge_y = |k: u32| height * f64::from(k) / ny;

    (0..factors.cells())
        .map(|i| {
            let col = (i % factors.x as usize) as u32;
            let row = (i / factors.x as usize) as u32;
            Rect::new(edge_x(col), edge_y(row), edge_x(col + 1), edge_y(row + 1))
        })
        .collect()
}

/// Derive `x * y` crop views of `source`.
///
/// Views share the source's resource handle and natural size and get fresh ids from `ids`.
/// Calling this twice with the same factors yields the same rectangles.
pub fn split(
    source: &ImageAsset,
    x: u32,
    y: u32,
    ids: &IdAllocator,
) -> FramestripResult<Vec<ImageAsset>> {
    split_with(source, SplitFactors::new(x, y)?, ids)
}

/// [`split`] with already validated factors.
///
/// Factors larger than the source's pixel extent are rejected: every cell must be at least one
/// pixel wide and tall.
pub fn split_with(
    source: &ImageAsset,
    factors: SplitFactors,
    ids: &IdAllocator,
) -> FramestripResult<Vec<ImageAsset>> {
    if factors.x > source.width || factors.y > source.height {
        return Err(FramestripError::InvalidSplitFactor {
            x: factors.x,
            y: factors.y,
        });
    }
    crop_grid(f64::from(source.width), f64::from(source.height), factors)
        .into_iter()
        .map(|crop| source.view(ids.asset(), crop))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/split/grid.rs"]
mod tests;

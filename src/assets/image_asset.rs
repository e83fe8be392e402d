use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::{
    collection::ordered::Keyed,
    foundation::core::{AssetId, Rect, ResourceHandle},
    foundation::error::{FramestripError, FramestripResult},
};

/// Raw file blob handed over by the file-selection collaborator.
#[derive(Clone)]
pub struct SourceFile {
    /// File name as shown to the user.
    pub name: String,
    /// Encoded bytes.
    pub bytes: Arc<[u8]>,
}

impl SourceFile {
    /// Wrap an in-memory blob.
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a blob from disk, naming it after the final path component.
    pub fn from_path(path: impl AsRef<Path>) -> FramestripResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("name", &self.name)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

/// A decoded image plus its display geometry and crop.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ImageAsset {
    /// Unique identity, never reused.
    pub id: AssetId,
    /// Handle of the decoded pixels in the resource registry.
    pub handle: ResourceHandle,
    /// Name of the file this asset was decoded from.
    pub file_name: String,
    /// Display name.
    pub name: String,
    /// Position of the file in the batch it was uploaded with.
    pub source_index: usize,
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Displayed sub-region, always inside `[0,width] x [0,height]`.
    pub crop: Rect,
}

impl ImageAsset {
    /// Crop covering the whole natural extent.
    pub fn full_crop(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Copy of this asset under a new identity showing `crop`.
    ///
    /// The copy shares the resource handle, so it is a view and not a second decode.
    pub fn view(&self, id: AssetId, crop: Rect) -> FramestripResult<Self> {
        let bounds = self.full_crop();
        let crop = crop.abs();
        if crop.x0 < bounds.x0 || crop.y0 < bounds.y0 || crop.x1 > bounds.x1 || crop.y1 > bounds.y1
        {
            return Err(FramestripError::validation(format!(
                "crop {crop:?} exceeds the {}x{} image bounds",
                self.width, self.height
            )));
        }
        Ok(Self {
            id,
            crop,
            ..self.clone()
        })
    }

    /// `true` when both assets have identical natural dimensions.
    pub fn same_size(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl Keyed for ImageAsset {
    type Key = AssetId;

    fn key(&self) -> AssetId {
        self.id
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image_asset.rs"]
mod tests;

use crate::{
    aggregate::info::{ItemInfo, ItemInfoPatch},
    assets::image_asset::ImageAsset,
    collection::ordered::{Keyed, OrderedList},
    foundation::core::{AggregateId, IdAllocator},
    foundation::error::{FramestripError, FramestripResult},
    split::grid::{SplitFactors, split_with},
};

/// Reason reported when the item name is empty.
pub const MSG_EMPTY_NAME: &str = "item name must not be empty";
/// Reason reported when there is nothing to commit.
pub const MSG_NO_IMAGES: &str = "at least one image is required";
/// Reason reported when sequence members differ in size.
pub const MSG_SIZE_MISMATCH: &str = "all images must have the same size";

/// Variant-specific part of an [`Aggregate`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregateKind {
    /// Ordered frames uploaded as separate files.
    Sequence,
    /// Frames cut from one source image on a grid.
    Split {
        /// The uploaded image every crop views.
        source: ImageAsset,
        /// Factors the current crops were derived with; `None` before the first derivation.
        factors: Option<SplitFactors>,
    },
}

/// A named grouping of assets: a sequence or a split.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Aggregate {
    id: AggregateId,
    info: ItemInfo,
    images: OrderedList<ImageAsset>,
    #[serde(flatten)]
    kind: AggregateKind,
}

impl Aggregate {
    /// Sequence over `images` in the given order.
    pub fn sequence(
        id: AggregateId,
        images: impl Into<OrderedList<ImageAsset>>,
        info: ItemInfo,
    ) -> Self {
        Self {
            id,
            info,
            images: images.into(),
            kind: AggregateKind::Sequence,
        }
    }

    /// Underived split: its only image is `source` itself.
    pub fn split(id: AggregateId, source: ImageAsset, info: ItemInfo) -> Self {
        Self {
            id,
            info,
            images: OrderedList::from(vec![source.clone()]),
            kind: AggregateKind::Split {
                source,
                factors: None,
            },
        }
    }

    /// Stable identity.
    pub fn id(&self) -> AggregateId {
        self.id
    }

    /// Current metadata.
    pub fn info(&self) -> &ItemInfo {
        &self.info
    }

    /// Frames in display order.
    pub fn images(&self) -> &OrderedList<ImageAsset> {
        &self.images
    }

    /// Variant data.
    pub fn kind(&self) -> &AggregateKind {
        &self.kind
    }

    /// `true` for sequences.
    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, AggregateKind::Sequence)
    }

    /// Source image of a split.
    pub fn source(&self) -> Option<&ImageAsset> {
        match &self.kind {
            AggregateKind::Split { source, .. } => Some(source),
            AggregateKind::Sequence => None,
        }
    }

    /// Factors of a derived split.
    pub fn factors(&self) -> Option<SplitFactors> {
        match &self.kind {
            AggregateKind::Split { factors, .. } => *factors,
            AggregateKind::Sequence => None,
        }
    }

    /// Copy with `patch` applied to the metadata.
    pub fn with_info(&self, patch: ItemInfoPatch) -> Self {
        Self {
            info: self.info.update(patch),
            ..self.clone()
        }
    }

    /// Copy of a sequence with a new frame list. Split frames are derived and cannot be set.
    pub fn with_images(&self, images: OrderedList<ImageAsset>) -> FramestripResult<Self> {
        if !self.is_sequence() {
            return Err(FramestripError::validation(
                "split frames are derived from the source image",
            ));
        }
        Ok(Self {
            images,
            ..self.clone()
        })
    }

    /// New split re-derived with `x * y` crops; `self` is left untouched.
    pub fn resplit(&self, x: u32, y: u32, ids: &IdAllocator) -> FramestripResult<Self> {
        let Some(source) = self.source() else {
            return Err(FramestripError::validation("only splits can be re-split"));
        };
        let factors = SplitFactors::new(x, y)?;
        let images = split_with(source, factors, ids)?;
        Ok(Self {
            id: self.id,
            info: self.info.clone(),
            images: OrderedList::from(images),
            kind: AggregateKind::Split {
                source: source.clone(),
                factors: Some(factors),
            },
        })
    }

    /// Human-readable reasons this aggregate cannot be committed; empty when valid.
    pub fn validation_messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.is_sequence()
            && let Some(first) = self.images.first()
            && !self.images.iter().all(|img| img.same_size(first))
        {
            out.push(MSG_SIZE_MISMATCH.to_string());
        }
        if !self.info.is_valid() {
            out.push(MSG_EMPTY_NAME.to_string());
        }
        if self.images.is_empty() {
            out.push(MSG_NO_IMAGES.to_string());
        }
        out
    }

    /// `Ok` when [`Aggregate::validation_messages`] is empty.
    pub fn validate(&self) -> FramestripResult<()> {
        let reasons = self.validation_messages();
        if reasons.is_empty() {
            Ok(())
        } else {
            Err(FramestripError::Validation(reasons))
        }
    }

    /// Assets whose resources this aggregate releases when destroyed.
    ///
    /// Split crops share the source's handle, so only the source is owned.
    pub fn owned_assets(&self) -> Vec<&ImageAsset> {
        match &self.kind {
            AggregateKind::Sequence => self.images.iter().collect(),
            AggregateKind::Split { source, .. } => vec![source],
        }
    }
}

impl Keyed for Aggregate {
    type Key = AggregateId;

    fn key(&self) -> AggregateId {
        self.id
    }
}

#[cfg(test)]
#[path = "../../tests/unit/aggregate/item.rs"]
mod tests;

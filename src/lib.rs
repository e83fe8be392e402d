//! framestrip manages decoded image assets and maps them onto a frame timeline.
//!
//! Images arrive as raw files, are decoded concurrently into assets, and are grouped into two
//! kinds of aggregates: ordered *sequences* of frames and *splits* that cut one image into a grid
//! of crops. Committed aggregates live in a [`Store`] that publishes immutable snapshots, and the
//! timeline mapper turns a snapshot into the layers visible at any frame.
//!
//! # Pipeline overview
//!
//! 1. **Decode**: `SourceFile -> ImageAsset` through the [`AssetCatalog`] worker pool
//! 2. **Edit**: build a [`SequenceDraft`] or [`SplitDraft`], reorder, rename, re-split
//! 3. **Commit**: validated aggregates enter the [`Store`]; destroying them releases resources
//! 4. **Map**: `StoreSnapshot + FrameIndex -> FrameState` (what is visible, with what opacity)
//! 5. **Preview** (optional): `FrameState -> FrameRGBA` on the CPU
//!
//! Resource handles are released exactly once. Decodes that finish after their draft was
//! cancelled release themselves on arrival.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod aggregate;
mod animation;
mod assets;
mod collection;
mod foundation;
mod render;
mod split;
mod store;
mod timeline;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;

pub use aggregate::draft::{DraftState, MSG_LOADING, SequenceDraft, SplitDraft};
pub use aggregate::info::{ItemInfo, ItemInfoPatch};
pub use aggregate::item::{
    Aggregate, AggregateKind, MSG_EMPTY_NAME, MSG_NO_IMAGES, MSG_SIZE_MISMATCH,
};
pub use animation::ease::{Ease, ramp_in};
pub use assets::catalog::{AssetCatalog, CancelToken, CatalogOpts, DecodeOutcome, PendingBatch};
pub use assets::decode::{DecodedImage, decode_image};
pub use assets::image_asset::{ImageAsset, SourceFile};
pub use assets::registry::{ReleaseOutcome, ResourceRegistry};
pub use collection::ordered::{Keyed, OrderedList};
pub use foundation::core::{
    AggregateId, AssetId, Canvas, Fps, FrameIndex, FrameRange, IdAllocator, Rect, ResourceHandle,
};
pub use foundation::error::{FramestripError, FramestripResult};
pub use render::composite::{PremulRgba8, over, over_in_place, unpremultiply};
pub use render::preview::{FrameRGBA, render_frame};
pub use split::grid::{SplitFactors, crop_grid, split, split_with};
pub use store::{CatalogEntry, EntryKind, Store, StoreSnapshot, Thumbnail};
pub use timeline::mapper::{
    FrameState, ItemWindow, TimelineOpts, VisibleLayer, duration_frames, evaluate,
    evaluate_aggregate, item_window, opacity_at, schedule,
};

use std::collections::VecDeque;

use crate::{
    aggregate::info::{ItemInfo, ItemInfoPatch},
    aggregate::item::{Aggregate, MSG_EMPTY_NAME, MSG_NO_IMAGES},
    assets::catalog::{AssetCatalog, CancelToken, PendingBatch},
    assets::image_asset::{ImageAsset, SourceFile},
    collection::ordered::OrderedList,
    foundation::core::{AggregateId, AssetId},
    foundation::error::{FramestripError, FramestripResult},
    split::grid::SplitFactors,
    store::Store,
};

/// Reason reported while uploads are still decoding.
pub const MSG_LOADING: &str = "images are still loading";

/// Lifecycle of a draft: `Draft -> Committed` or `Draft -> Destroyed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftState {
    /// Being edited; uploads may be in flight.
    Draft,
    /// Handed over to the store under this id.
    Committed(AggregateId),
    /// Cancelled; every decoded asset was released.
    Destroyed,
}

/// Upload bookkeeping and lifecycle shared by both draft kinds.
struct DraftCore {
    id: AggregateId,
    info: ItemInfo,
    catalog: AssetCatalog,
    token: CancelToken,
    pending: VecDeque<PendingBatch>,
    failures: Vec<FramestripError>,
    state: DraftState,
}

impl DraftCore {
    fn new(catalog: &AssetCatalog) -> Self {
        Self {
            id: catalog.ids().aggregate(),
            info: ItemInfo::default(),
            catalog: catalog.clone(),
            token: CancelToken::new(),
            pending: VecDeque::new(),
            failures: Vec::new(),
            state: DraftState::Draft,
        }
    }

    fn ensure_editable(&self) -> FramestripResult<()> {
        match self.state {
            DraftState::Draft => Ok(()),
            _ => Err(FramestripError::validation("draft is no longer editable")),
        }
    }

    fn spawn(&mut self, files: Vec<SourceFile>) {
        if files.is_empty() {
            return;
        }
        let batch = self.catalog.spawn_many(files, &self.token);
        self.pending.push_back(batch);
    }

    /// Successes of every finished batch, oldest batch first. A batch that finished early waits
    /// for the ones uploaded before it.
    fn collect(&mut self, block: bool) -> Vec<ImageAsset> {
        let mut out = Vec::new();
        loop {
            let outcomes = if block {
                match self.pending.pop_front() {
                    Some(batch) => batch.wait(),
                    None => break,
                }
            } else {
                match self.pending.front_mut().and_then(PendingBatch::try_collect) {
                    Some(outcomes) => {
                        self.pending.pop_front();
                        outcomes
                    }
                    None => break,
                }
            };
            for outcome in outcomes {
                match outcome {
                    Ok(asset) => out.push(asset),
                    Err(err) => self.failures.push(err),
                }
            }
        }
        out
    }

    fn is_loading(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Cancel in-flight decodes and return whatever had already arrived.
    fn abandon_uploads(&mut self) -> Vec<ImageAsset> {
        self.token.cancel();
        let mut arrived = Vec::new();
        for mut batch in self.pending.drain(..) {
            arrived.extend(batch.take_arrived());
        }
        arrived
    }

    fn info_messages(&self, has_images: bool) -> Vec<String> {
        let mut out = Vec::new();
        if !self.info.is_valid() {
            out.push(MSG_EMPTY_NAME.to_string());
        }
        if !has_images {
            out.push(MSG_NO_IMAGES.to_string());
        }
        if self.is_loading() {
            out.push(MSG_LOADING.to_string());
        }
        out
    }
}

/// A sequence under construction.
///
/// Dropping a draft that was neither committed nor cancelled cancels it.
pub struct SequenceDraft {
    core: DraftCore,
    images: OrderedList<ImageAsset>,
}

impl SequenceDraft {
    /// Empty draft decoding through `catalog`.
    pub fn new(catalog: &AssetCatalog) -> Self {
        Self {
            core: DraftCore::new(catalog),
            images: OrderedList::new(),
        }
    }

    /// Lifecycle state.
    pub fn state(&self) -> DraftState {
        self.core.state
    }

    /// Current metadata.
    pub fn info(&self) -> &ItemInfo {
        &self.core.info
    }

    /// Decoded frames in display order.
    pub fn images(&self) -> &OrderedList<ImageAsset> {
        &self.images
    }

    /// Decode failures seen so far, for user-facing messages.
    pub fn failures(&self) -> &[FramestripError] {
        &self.core.failures
    }

    /// `true` while an upload is still decoding.
    pub fn is_loading(&self) -> bool {
        self.core.is_loading()
    }

    /// Start decoding `files`; frames are appended in file order by [`SequenceDraft::poll`].
    pub fn upload(&mut self, files: Vec<SourceFile>) -> FramestripResult<()> {
        self.core.ensure_editable()?;
        self.core.spawn(files);
        Ok(())
    }

    /// Append finished uploads without blocking. Returns the number of frames added.
    pub fn poll(&mut self) -> usize {
        let arrived = self.core.collect(false);
        self.append(arrived)
    }

    /// Block until every upload finished. Returns the number of frames added.
    pub fn wait(&mut self) -> usize {
        let arrived = self.core.collect(true);
        self.append(arrived)
    }

    fn append(&mut self, arrived: Vec<ImageAsset>) -> usize {
        let n = arrived.len();
        if n > 0 {
            self.images = self.images.extend(arrived);
        }
        n
    }

    /// Apply a metadata edit.
    pub fn update_info(&mut self, patch: ItemInfoPatch) -> FramestripResult<()> {
        self.core.ensure_editable()?;
        self.core.info = self.core.info.update(patch);
        Ok(())
    }

    /// Drop frame `id` and release its resource.
    pub fn remove_image(&mut self, id: AssetId) -> FramestripResult<()> {
        self.core.ensure_editable()?;
        if let Some(asset) = self.images.get(id).cloned() {
            self.images = self.images.remove(id);
            self.core.catalog.destroy(&asset);
        }
        Ok(())
    }

    /// Swap frame `id` with its left neighbor.
    pub fn move_left(&mut self, id: AssetId) -> FramestripResult<()> {
        self.core.ensure_editable()?;
        self.images = self.images.move_left(id);
        Ok(())
    }

    /// Swap frame `id` with its right neighbor.
    pub fn move_right(&mut self, id: AssetId) -> FramestripResult<()> {
        self.core.ensure_editable()?;
        self.images = self.images.move_right(id);
        Ok(())
    }

    /// The aggregate this draft would commit.
    pub fn to_aggregate(&self) -> Aggregate {
        Aggregate::sequence(self.core.id, self.images.clone(), self.core.info.clone())
    }

    /// Reasons the draft cannot be committed yet; empty when it can.
    pub fn validation_messages(&self) -> Vec<String> {
        let mut out = self.to_aggregate().validation_messages();
        for msg in self.core.info_messages(!self.images.is_empty()) {
            if !out.contains(&msg) {
                out.push(msg);
            }
        }
        out
    }

    /// Validate and hand the sequence to `store`. On error nothing changes.
    pub fn commit(&mut self, store: &Store) -> FramestripResult<AggregateId> {
        self.core.ensure_editable()?;
        let reasons = self.validation_messages();
        if !reasons.is_empty() {
            return Err(FramestripError::Validation(reasons));
        }
        let id = store.commit(self.to_aggregate())?;
        self.images = OrderedList::new();
        self.core.state = DraftState::Committed(id);
        Ok(id)
    }

    /// Abandon the draft, releasing every decoded frame, including ones still in flight.
    pub fn cancel(&mut self) {
        if self.core.state != DraftState::Draft {
            return;
        }
        let late = self.core.abandon_uploads();
        self.core.catalog.destroy_many(self.images.iter().chain(late.iter()));
        self.images = OrderedList::new();
        self.core.state = DraftState::Destroyed;
        tracing::debug!(id = ?self.core.id, "sequence draft cancelled");
    }
}

impl Drop for SequenceDraft {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A split under construction.
///
/// Dropping a draft that was neither committed nor cancelled cancels it.
pub struct SplitDraft {
    core: DraftCore,
    split: Option<Aggregate>,
    factors: Option<SplitFactors>,
}

impl SplitDraft {
    /// Empty draft decoding through `catalog`.
    pub fn new(catalog: &AssetCatalog) -> Self {
        Self {
            core: DraftCore::new(catalog),
            split: None,
            factors: None,
        }
    }

    /// Lifecycle state.
    pub fn state(&self) -> DraftState {
        self.core.state
    }

    /// Current metadata.
    pub fn info(&self) -> &ItemInfo {
        &self.core.info
    }

    /// Current split, once the source has decoded.
    pub fn split(&self) -> Option<&Aggregate> {
        self.split.as_ref()
    }

    /// Last accepted split factors.
    pub fn factors(&self) -> Option<SplitFactors> {
        self.factors
    }

    /// Decode failures seen so far, for user-facing messages.
    pub fn failures(&self) -> &[FramestripError] {
        &self.core.failures
    }

    /// `true` while the source is still decoding.
    pub fn is_loading(&self) -> bool {
        self.core.is_loading()
    }

    /// Start decoding a new source. The current source, if any, is released right away.
    pub fn upload(&mut self, file: SourceFile) -> FramestripResult<()> {
        self.core.ensure_editable()?;
        if let Some(old) = self.split.take() {
            self.core.catalog.destroy_many(old.owned_assets());
        }
        self.core.spawn(vec![file]);
        Ok(())
    }

    /// Adopt a finished upload without blocking. Returns `true` when the source changed.
    pub fn poll(&mut self) -> FramestripResult<bool> {
        let arrived = self.core.collect(false);
        self.adopt(arrived)
    }

    /// Block until the upload finished. Returns `true` when the source changed.
    pub fn wait(&mut self) -> FramestripResult<bool> {
        let arrived = self.core.collect(true);
        self.adopt(arrived)
    }

    fn adopt(&mut self, arrived: Vec<ImageAsset>) -> FramestripResult<bool> {
        let mut changed = false;
        for source in arrived {
            // Later uploads win; earlier sources are released.
            if let Some(old) = self.split.take() {
                self.core.catalog.destroy_many(old.owned_assets());
            }
            let split = Aggregate::split(self.core.id, source, self.core.info.clone());
            let split = match self.factors {
                Some(f) => match split.resplit(f.x(), f.y(), self.core.catalog.ids()) {
                    Ok(derived) => derived,
                    Err(err) => {
                        self.core.catalog.destroy_many(split.owned_assets());
                        return Err(err);
                    }
                },
                None => split,
            };
            self.split = Some(split);
            changed = true;
        }
        Ok(changed)
    }

    /// Re-derive the crops with `x * y` cells. Invalid factors keep the prior state.
    pub fn set_split(&mut self, x: u32, y: u32) -> FramestripResult<()> {
        self.core.ensure_editable()?;
        let factors = SplitFactors::new(x, y)?;
        if let Some(split) = &self.split {
            self.split = Some(split.resplit(x, y, self.core.catalog.ids())?);
        }
        self.factors = Some(factors);
        Ok(())
    }

    /// Apply a metadata edit.
    pub fn update_info(&mut self, patch: ItemInfoPatch) -> FramestripResult<()> {
        self.core.ensure_editable()?;
        self.core.info = self.core.info.update(patch.clone());
        if let Some(split) = &self.split {
            self.split = Some(split.with_info(patch));
        }
        Ok(())
    }

    /// Reasons the draft cannot be committed yet; empty when it can.
    pub fn validation_messages(&self) -> Vec<String> {
        let mut out = self
            .split
            .as_ref()
            .map(Aggregate::validation_messages)
            .unwrap_or_default();
        for msg in self.core.info_messages(self.split.is_some()) {
            if !out.contains(&msg) {
                out.push(msg);
            }
        }
        out
    }

    /// Validate and hand the split to `store`. On error nothing changes.
    pub fn commit(&mut self, store: &Store) -> FramestripResult<AggregateId> {
        self.core.ensure_editable()?;
        let reasons = self.validation_messages();
        let Some(split) = self.split.as_ref().filter(|_| reasons.is_empty()) else {
            return Err(FramestripError::Validation(reasons));
        };
        let id = store.commit(split.clone())?;
        self.split = None;
        self.core.state = DraftState::Committed(id);
        Ok(id)
    }

    /// Abandon the draft, releasing the source, including one still in flight.
    pub fn cancel(&mut self) {
        if self.core.state != DraftState::Draft {
            return;
        }
        let late = self.core.abandon_uploads();
        if let Some(split) = self.split.take() {
            self.core.catalog.destroy_many(split.owned_assets());
        }
        self.core.catalog.destroy_many(&late);
        self.core.state = DraftState::Destroyed;
        tracing::debug!(id = ?self.core.id, "split draft cancelled");
    }
}

impl Drop for SplitDraft {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/aggregate/draft.rs"]
mod tests;

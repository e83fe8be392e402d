use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    aggregate::item::Aggregate,
    assets::catalog::AssetCatalog,
    assets::image_asset::ImageAsset,
    collection::ordered::OrderedList,
    foundation::core::{AggregateId, AssetId, Rect, ResourceHandle},
    foundation::error::{FramestripError, FramestripResult},
};

/// Immutable view of every committed aggregate.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct StoreSnapshot {
    /// Incremented by every successful write.
    pub version: u64,
    /// Committed sequences in commit order.
    pub sequences: OrderedList<Aggregate>,
    /// Committed splits in commit order.
    pub splits: OrderedList<Aggregate>,
}

impl StoreSnapshot {
    /// Every aggregate, sequences first.
    pub fn iter(&self) -> impl Iterator<Item = &Aggregate> {
        self.sequences.iter().chain(self.splits.iter())
    }

    /// Number of committed aggregates.
    pub fn len(&self) -> usize {
        self.sequences.len() + self.splits.len()
    }

    /// `true` when nothing is committed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aggregate with identity `id`.
    pub fn get(&self, id: AggregateId) -> Option<&Aggregate> {
        self.sequences.get(id).or_else(|| self.splits.get(id))
    }

    /// `true` when any committed aggregate shows or owns asset `id`.
    pub fn references_asset(&self, id: AssetId) -> bool {
        self.iter().any(|agg| {
            agg.images().contains(id) || agg.source().is_some_and(|src| src.id == id)
        })
    }

    fn without(&self, id: AggregateId) -> Self {
        Self {
            version: self.version,
            sequences: self.sequences.remove(id),
            splits: self.splits.remove(id),
        }
    }

    fn with(&self, aggregate: Aggregate) -> Self {
        let (sequences, splits) = if aggregate.is_sequence() {
            (self.sequences.push(aggregate), self.splits.clone())
        } else {
            (self.sequences.clone(), self.splits.push(aggregate))
        };
        Self {
            version: self.version,
            sequences,
            splits,
        }
    }
}

/// Whether a listing row is a sequence or a split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Ordered frames uploaded as separate files.
    Sequence,
    /// Grid crops of one image.
    Split,
}

/// First frame of an aggregate, for list views.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Thumbnail {
    /// Pixels to draw.
    pub handle: ResourceHandle,
    /// Natural width.
    pub width: u32,
    /// Natural height.
    pub height: u32,
    /// Region of the image the frame shows.
    pub crop: Rect,
}

/// One row of the catalog listing.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CatalogEntry {
    /// Aggregate identity.
    pub id: AggregateId,
    /// Sequence or split.
    pub kind: EntryKind,
    /// Display name.
    pub name: String,
    /// Number of frames.
    pub item_count: usize,
    /// First frame, absent only for an empty aggregate.
    pub thumbnail: Option<Thumbnail>,
}

impl CatalogEntry {
    fn of(aggregate: &Aggregate) -> Self {
        Self {
            id: aggregate.id(),
            kind: if aggregate.is_sequence() {
                EntryKind::Sequence
            } else {
                EntryKind::Split
            },
            name: aggregate.info().name.clone(),
            item_count: aggregate.images().len(),
            thumbnail: aggregate.images().first().map(|img| Thumbnail {
                handle: img.handle,
                width: img.width,
                height: img.height,
                crop: img.crop,
            }),
        }
    }
}

/// The process-wide catalog of committed aggregates.
///
/// Writers are serialized; each write reads the current snapshot, builds the next one and
/// publishes it as a whole. Readers hold `Arc` snapshots and never see a partial write.
#[derive(Debug)]
pub struct Store {
    catalog: AssetCatalog,
    current: Mutex<Arc<StoreSnapshot>>,
}

impl Store {
    /// Empty store releasing resources through `catalog`.
    pub fn new(catalog: AssetCatalog) -> Self {
        Self {
            catalog,
            current: Mutex::new(Arc::new(StoreSnapshot::default())),
        }
    }

    /// Catalog used for decoding and releasing.
    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    /// Current published snapshot.
    pub fn snapshot(&self) -> Arc<StoreSnapshot> {
        Arc::clone(&self.lock())
    }

    /// Number of committed aggregates.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` when nothing is committed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Arc<StoreSnapshot>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write<R>(
        &self,
        f: impl FnOnce(&StoreSnapshot) -> FramestripResult<(StoreSnapshot, R)>,
    ) -> FramestripResult<R> {
        let mut current = self.lock();
        let (mut next, out) = f(&current)?;
        next.version = current.version + 1;
        *current = Arc::new(next);
        Ok(out)
    }

    /// Add a validated aggregate. Rejected commits leave the store untouched.
    #[tracing::instrument(skip_all, fields(id = ?aggregate.id(), name = %aggregate.info().name))]
    pub fn commit(&self, aggregate: Aggregate) -> FramestripResult<AggregateId> {
        aggregate.validate()?;
        let id = aggregate.id();
        self.write(|snap| {
            if snap.get(id).is_some() {
                return Err(FramestripError::validation(format!(
                    "aggregate {id:?} is already committed"
                )));
            }
            self.check_ownership(snap, &aggregate)?;
            Ok((snap.with(aggregate), ()))
        })?;
        tracing::debug!("committed");
        Ok(id)
    }

    /// Swap committed `prev` for `next`. `next` goes to the end of its list.
    ///
    /// Resources owned by `prev` and no longer owned by `next` are released.
    #[tracing::instrument(skip_all, fields(prev = ?prev, next = ?next.id()))]
    pub fn replace(&self, prev: AggregateId, next: Aggregate) -> FramestripResult<()> {
        next.validate()?;
        let dropped = self.write(|snap| {
            let Some(old) = snap.get(prev) else {
                return Err(FramestripError::validation(format!(
                    "aggregate {prev:?} is not committed"
                )));
            };
            if old.is_sequence() != next.is_sequence() {
                return Err(FramestripError::validation(
                    "a sequence can only be replaced by a sequence, a split by a split",
                ));
            }
            let old = old.clone();
            let rest = snap.without(prev);
            if next.id() != prev && rest.get(next.id()).is_some() {
                return Err(FramestripError::validation(format!(
                    "aggregate {:?} is already committed",
                    next.id()
                )));
            }
            self.check_ownership(&rest, &next)?;

            let kept: HashSet<ResourceHandle> =
                next.owned_assets().iter().map(|a| a.handle).collect();
            let dropped: Vec<ImageAsset> = old
                .owned_assets()
                .into_iter()
                .filter(|a| !kept.contains(&a.handle))
                .cloned()
                .collect();
            Ok((rest.with(next), dropped))
        })?;
        self.catalog.destroy_many(&dropped);
        Ok(())
    }

    /// Remove aggregate `id` and release every resource it owns.
    #[tracing::instrument(skip(self))]
    pub fn destroy(&self, id: AggregateId) -> FramestripResult<()> {
        let removed = self.write(|snap| {
            let Some(agg) = snap.get(id).cloned() else {
                return Err(FramestripError::validation(format!(
                    "aggregate {id:?} is not committed"
                )));
            };
            Ok((snap.without(id), agg))
        })?;
        self.release(&removed);
        Ok(())
    }

    /// Remove every listed aggregate in one write. Unknown ids are skipped.
    ///
    /// Returns how many aggregates were destroyed.
    #[tracing::instrument(skip_all, fields(requested = ids.len()))]
    pub fn destroy_many(&self, ids: &[AggregateId]) -> FramestripResult<usize> {
        let removed = self.write(|snap| {
            let mut next = snap.clone();
            let mut removed = Vec::new();
            for id in ids {
                if let Some(agg) = next.get(*id).cloned() {
                    next = next.without(*id);
                    removed.push(agg);
                }
            }
            Ok((next, removed))
        })?;
        for agg in &removed {
            self.release(agg);
        }
        Ok(removed.len())
    }

    /// Name, frame count and thumbnail of every committed aggregate.
    pub fn listing(&self) -> Vec<CatalogEntry> {
        self.snapshot().iter().map(CatalogEntry::of).collect()
    }

    fn release(&self, aggregate: &Aggregate) {
        let owned = aggregate.owned_assets();
        tracing::debug!(id = ?aggregate.id(), assets = owned.len(), "releasing aggregate");
        self.catalog.destroy_many(owned);
    }

    fn check_ownership(&self, snap: &StoreSnapshot, aggregate: &Aggregate) -> FramestripResult<()> {
        let mut reasons = Vec::new();
        let mut frames = HashSet::new();
        for asset in aggregate.images() {
            if !frames.insert(asset.id) {
                reasons.push(format!("image '{}' appears more than once", asset.name));
            }
        }
        let (mut owned, mut handles) = (HashSet::new(), HashSet::new());
        for asset in aggregate.owned_assets() {
            let distinct = owned.insert(asset.id);
            if !handles.insert(asset.handle) && distinct {
                reasons.push(format!("image '{}' shares its pixels with another frame", asset.name));
            }
        }

        let registry = self.catalog.registry();
        for asset in aggregate.owned_assets() {
            if snap.references_asset(asset.id) {
                reasons.push(format!("image '{}' already belongs to another item", asset.name));
            }
            if !registry.is_live(asset.handle) {
                reasons.push(format!("image '{}' was already released", asset.name));
            }
        }
        if reasons.is_empty() {
            Ok(())
        } else {
            Err(FramestripError::Validation(reasons))
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/store/store.rs"]
mod tests;

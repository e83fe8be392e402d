use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, mpsc},
};

use rayon::prelude::*;

use crate::{
    assets::image_asset::{ImageAsset, SourceFile},
    assets::registry::{ReleaseOutcome, ResourceRegistry},
    foundation::core::{AssetId, IdAllocator, ResourceHandle},
    foundation::error::{FramestripError, FramestripResult},
};

/// Per-file result of a batch decode.
pub type DecodeOutcome = FramestripResult<ImageAsset>;

/// Options for the catalog's decode worker pool.
#[derive(Clone, Debug, Default)]
pub struct CatalogOpts {
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Cancellation flag shared between a draft and the decodes it started.
///
/// A decode that completes after cancellation releases its own asset. Completion and
/// cancellation serialize on the same lock, so every result is either delivered before the
/// flag flips or released by the worker.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<Mutex<bool>>,
}

impl CancelToken {
    /// Fresh, not-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the token. Idempotent.
    pub fn cancel(&self) {
        *self.guard() = true;
    }

    /// `true` once [`CancelToken::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        *self.guard()
    }

    fn guard(&self) -> MutexGuard<'_, bool> {
        self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Decodes in flight for one upload, reassembled in file input order.
pub struct PendingBatch {
    rx: mpsc::Receiver<(usize, DecodeOutcome)>,
    slots: Vec<Option<DecodeOutcome>>,
    arrived: usize,
}

impl PendingBatch {
    /// Number of files in the batch.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// `true` for a batch with no files.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of decodes that have finished so far.
    pub fn arrived(&self) -> usize {
        self.arrived
    }

    /// `true` once every file has a result.
    pub fn is_complete(&self) -> bool {
        self.arrived == self.slots.len()
    }

    fn store(&mut self, (index, outcome): (usize, DecodeOutcome)) {
        if let Some(slot) = self.slots.get_mut(index) {
            if slot.is_none() {
                self.arrived += 1;
            }
            *slot = Some(outcome);
        }
    }

    fn drain_channel(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.store(msg);
        }
    }

    /// Collect without blocking. Returns every outcome in input order once all have arrived.
    pub fn try_collect(&mut self) -> Option<Vec<DecodeOutcome>> {
        self.drain_channel();
        if !self.is_complete() {
            return None;
        }
        let slots = std::mem::take(&mut self.slots);
        self.arrived = 0;
        Some(slots.into_iter().flatten().collect())
    }

    /// Block until every decode finished, then return outcomes in input order.
    pub fn wait(mut self) -> Vec<DecodeOutcome> {
        while !self.is_complete() {
            match self.rx.recv() {
                Ok(msg) => self.store(msg),
                // Every worker is gone; whatever did not arrive was released by its worker.
                Err(_) => break,
            }
        }
        self.slots.into_iter().flatten().collect()
    }

    /// Take whatever has arrived, leaving the batch empty. Used on cancel.
    pub(crate) fn take_arrived(&mut self) -> Vec<ImageAsset> {
        self.drain_channel();
        self.arrived = 0;
        self.slots
            .iter_mut()
            .filter_map(Option::take)
            .filter_map(Result::ok)
            .collect()
    }
}

impl std::fmt::Debug for PendingBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingBatch")
            .field("len", &self.len())
            .field("arrived", &self.arrived)
            .finish()
    }
}

type Tracked = Arc<Mutex<HashMap<AssetId, ResourceHandle>>>;

fn tracked_lock(tracked: &Tracked) -> MutexGuard<'_, HashMap<AssetId, ResourceHandle>> {
    tracked.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Decoded-asset tracking on top of the [`ResourceRegistry`].
///
/// Cheap to clone; clones share the registry, the tracking set and the worker pool.
#[derive(Clone)]
pub struct AssetCatalog {
    registry: Arc<ResourceRegistry>,
    tracked: Tracked,
    pool: Arc<rayon::ThreadPool>,
}

impl AssetCatalog {
    /// Build a catalog over `registry` with its own decode pool.
    pub fn new(registry: Arc<ResourceRegistry>, opts: CatalogOpts) -> FramestripResult<Self> {
        Ok(Self {
            registry,
            tracked: Arc::new(Mutex::new(HashMap::new())),
            pool: Arc::new(build_thread_pool(opts.threads)?),
        })
    }

    /// The registry holding decoded pixels.
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    /// Id source shared with the registry.
    pub fn ids(&self) -> &IdAllocator {
        self.registry.ids()
    }

    /// Decode `files` concurrently and block until all finished.
    ///
    /// Outcomes are in file input order regardless of completion order. One failing file never
    /// affects its siblings.
    #[tracing::instrument(skip_all, fields(files = files.len()))]
    pub fn create_many(&self, files: &[SourceFile]) -> Vec<DecodeOutcome> {
        let registry = &self.registry;
        let outcomes: Vec<DecodeOutcome> = self.pool.install(|| {
            files
                .par_iter()
                .enumerate()
                .map(|(index, file)| registry.decode(file, index))
                .collect()
        });

        let mut tracked = tracked_lock(&self.tracked);
        for outcome in &outcomes {
            match outcome {
                Ok(asset) => {
                    tracked.insert(asset.id, asset.handle);
                }
                Err(err) => tracing::warn!(%err, "decode failed"),
            }
        }
        outcomes
    }

    /// Start decoding `files` on the worker pool without waiting.
    ///
    /// Results that complete after `token` is cancelled are released on arrival.
    pub fn spawn_many(&self, files: Vec<SourceFile>, token: &CancelToken) -> PendingBatch {
        let (tx, rx) = mpsc::channel();
        let len = files.len();

        for (index, file) in files.into_iter().enumerate() {
            let registry = Arc::clone(&self.registry);
            let tracked = Arc::clone(&self.tracked);
            let token = token.clone();
            let tx = tx.clone();

            self.pool.spawn(move || {
                let outcome = registry.decode(&file, index);
                if let Err(err) = &outcome {
                    tracing::warn!(%err, "decode failed");
                }

                let cancelled = token.guard();
                if *cancelled {
                    if let Ok(asset) = outcome {
                        tracing::debug!(name = %asset.name, "decode finished after cancel; releasing");
                        registry.release(asset.handle);
                    }
                    return;
                }

                if let Ok(asset) = &outcome {
                    tracked_lock(&tracked).insert(asset.id, asset.handle);
                }
                if let Err(mpsc::SendError((_, Ok(asset)))) = tx.send((index, outcome)) {
                    // Receiver dropped: nobody will ever own this asset.
                    tracked_lock(&tracked).remove(&asset.id);
                    registry.release(asset.handle);
                }
                drop(cancelled);
            });
        }

        PendingBatch {
            rx,
            slots: (0..len).map(|_| None).collect(),
            arrived: 0,
        }
    }

    /// Release `asset` and stop tracking it.
    pub fn destroy(&self, asset: &ImageAsset) -> ReleaseOutcome {
        if tracked_lock(&self.tracked).remove(&asset.id).is_none() {
            tracing::debug!(id = ?asset.id, "destroying an asset the catalog does not track");
        }
        self.registry.release(asset.handle)
    }

    /// Release every asset in `assets`.
    pub fn destroy_many<'a>(&self, assets: impl IntoIterator<Item = &'a ImageAsset>) {
        for asset in assets {
            self.destroy(asset);
        }
    }

    /// `true` while `id` was decoded by this catalog and not destroyed.
    pub fn is_tracked(&self, id: AssetId) -> bool {
        tracked_lock(&self.tracked).contains_key(&id)
    }

    /// Number of decoded assets not yet destroyed.
    pub fn tracked_count(&self) -> usize {
        tracked_lock(&self.tracked).len()
    }
}

impl std::fmt::Debug for AssetCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCatalog")
            .field("tracked", &self.tracked_count())
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

fn build_thread_pool(threads: Option<usize>) -> FramestripResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(FramestripError::validation(
            "catalog 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| FramestripError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/catalog.rs"]
mod tests;

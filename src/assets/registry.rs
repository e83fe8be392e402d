use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    assets::decode::{DecodedImage, decode_image},
    assets::image_asset::{ImageAsset, SourceFile},
    foundation::core::{IdAllocator, ResourceHandle},
    foundation::error::FramestripResult,
};

/// Result of a [`ResourceRegistry::release`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The handle was live and is now revoked.
    Released,
    /// The handle was already revoked (or never issued). Logged, never fatal.
    AlreadyReleased,
}

#[derive(Default)]
struct RegistryState {
    live: HashMap<ResourceHandle, Arc<DecodedImage>>,
    double_releases: u64,
    // Per-handle release calls; only kept by audited registries.
    release_calls: Option<HashMap<ResourceHandle, u32>>,
}

/// Owner of every decoded image and of the revocation lifecycle of its handle.
///
/// Shared as `Arc<ResourceRegistry>`: decodes complete on worker threads.
pub struct ResourceRegistry {
    ids: IdAllocator,
    state: Mutex<RegistryState>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry {
    /// Empty registry with a fresh id space.
    pub fn new() -> Self {
        Self {
            ids: IdAllocator::new(),
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Registry that also records every release call per handle, for [`Self::release_count`].
    ///
    /// The record is never pruned; use it in tests and audits, not in long-running hosts.
    pub fn with_release_audit() -> Self {
        Self {
            ids: IdAllocator::new(),
            state: Mutex::new(RegistryState {
                release_calls: Some(HashMap::new()),
                ..RegistryState::default()
            }),
        }
    }

    /// Id source for assets, aggregates and handles minted against this registry.
    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decode `file` and register its pixels under a new live handle.
    ///
    /// The returned asset shows its full natural extent.
    pub fn decode(&self, file: &SourceFile, source_index: usize) -> FramestripResult<ImageAsset> {
        let decoded = decode_image(&file.name, &file.bytes)?;
        let (width, height) = (decoded.width, decoded.height);

        let handle = self.ids.handle();
        self.lock().live.insert(handle, Arc::new(decoded));
        tracing::debug!(?handle, name = %file.name, width, height, "registered decoded image");

        Ok(ImageAsset {
            id: self.ids.asset(),
            handle,
            file_name: file.name.clone(),
            name: file.name.clone(),
            source_index,
            width,
            height,
            crop: kurbo::Rect::new(0.0, 0.0, f64::from(width), f64::from(height)),
        })
    }

    /// Revoke `handle`. Safe to call twice; the second call only warns.
    pub fn release(&self, handle: ResourceHandle) -> ReleaseOutcome {
        let mut state = self.lock();
        if let Some(calls) = state.release_calls.as_mut() {
            *calls.entry(handle).or_insert(0) += 1;
        }
        if state.live.remove(&handle).is_some() {
            tracing::debug!(?handle, "released resource");
            ReleaseOutcome::Released
        } else {
            state.double_releases += 1;
            tracing::warn!(?handle, "double release of resource handle ignored");
            ReleaseOutcome::AlreadyReleased
        }
    }

    /// Pixels behind `handle`, `None` once released.
    pub fn resolve(&self, handle: ResourceHandle) -> Option<Arc<DecodedImage>> {
        self.lock().live.get(&handle).cloned()
    }

    /// `true` while `handle` has not been released.
    pub fn is_live(&self, handle: ResourceHandle) -> bool {
        self.lock().live.contains_key(&handle)
    }

    /// Number of live handles.
    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }

    /// How many times `release` was called for `handle`.
    ///
    /// Always `0` unless the registry was built with [`Self::with_release_audit`].
    pub fn release_count(&self, handle: ResourceHandle) -> u32 {
        self.lock()
            .release_calls
            .as_ref()
            .and_then(|calls| calls.get(&handle).copied())
            .unwrap_or(0)
    }

    /// Number of releases of handles that were not live.
    pub fn double_release_count(&self) -> u64 {
        self.lock().double_releases
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("live", &self.live_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/registry.rs"]
mod tests;

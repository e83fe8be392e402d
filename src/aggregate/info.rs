/// User-entered metadata attached to a sequence or split.
///
/// Values are never edited in place: [`ItemInfo::update`] returns a new value.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ItemInfo {
    /// Display name. Must be non-empty to commit.
    pub name: String,
    /// Mirror horizontally when drawn.
    pub flip_x: bool,
    /// Keyframe markers, in frames.
    pub key_frames: Vec<u64>,
}

/// Partial edit applied by [`ItemInfo::update`]; `None` fields keep their value.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct ItemInfoPatch {
    /// New display name.
    pub name: Option<String>,
    /// New flip flag.
    pub flip_x: Option<bool>,
    /// New keyframe markers.
    pub key_frames: Option<Vec<u64>>,
}

impl ItemInfoPatch {
    /// Patch that only renames.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Patch that only sets the flip flag.
    pub fn flip_x(flip_x: bool) -> Self {
        Self {
            flip_x: Some(flip_x),
            ..Self::default()
        }
    }

    /// Patch that only replaces keyframe markers.
    pub fn key_frames(key_frames: Vec<u64>) -> Self {
        Self {
            key_frames: Some(key_frames),
            ..Self::default()
        }
    }
}

impl ItemInfo {
    /// Defaults with `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Copy of `self` with `patch` applied.
    pub fn update(&self, patch: ItemInfoPatch) -> Self {
        Self {
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            flip_x: patch.flip_x.unwrap_or(self.flip_x),
            key_frames: patch.key_frames.unwrap_or_else(|| self.key_frames.clone()),
        }
    }

    /// `true` iff the name is non-empty.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/aggregate/info.rs"]
mod tests;

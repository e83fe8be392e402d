use crate::{
    aggregate::item::Aggregate,
    animation::ease::{Ease, ramp_in},
    foundation::core::{AggregateId, AssetId, FrameIndex, FrameRange, Fps, Rect, ResourceHandle},
    foundation::error::{FramestripError, FramestripResult},
    store::StoreSnapshot,
};

/// Timing parameters for mapping aggregates onto frames.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimelineOpts {
    /// Playback rate.
    pub fps: Fps,
    /// Window unit `L`: item `i` starts at `L * i`.
    pub window_frames: u64,
    /// Length of the opacity ramp at the start of the aggregate. `0` disables the fade.
    pub fade_frames: u64,
    /// Curve applied to the opacity ramp.
    pub fade_ease: Ease,
}

impl Default for TimelineOpts {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            window_frames: 5,
            fade_frames: 20,
            fade_ease: Ease::Linear,
        }
    }
}

impl TimelineOpts {
    /// Reject a zero window unit or a degenerate frame rate.
    pub fn validate(&self) -> FramestripResult<()> {
        if self.window_frames == 0 {
            return Err(FramestripError::evaluation("window_frames must be >= 1"));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        Ok(())
    }
}

/// Frames during which item `index` is visible.
///
/// Starts at `L * index` and lasts `L * (index + 1)` frames, so consecutive windows overlap.
pub fn item_window(index: usize, opts: &TimelineOpts) -> FrameRange {
    let l = opts.window_frames;
    let i = index as u64;
    let start = l.saturating_mul(i);
    let end = start.saturating_add(l.saturating_mul(i + 1));
    FrameRange {
        start: FrameIndex(start),
        end: FrameIndex(end),
    }
}

/// Opacity at `frame` of the aggregate's own timeline, in `[0, 1]`.
pub fn opacity_at(frame: FrameIndex, opts: &TimelineOpts) -> f64 {
    ramp_in(frame.0, opts.fade_frames, opts.fade_ease)
}

/// Exclusive end of the last window for an aggregate of `n` items; `0` when empty.
pub fn duration_frames(n: usize, opts: &TimelineOpts) -> u64 {
    match n.checked_sub(1) {
        Some(last) => item_window(last, opts).end.0,
        None => 0,
    }
}

/// One item's slot on the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ItemWindow {
    /// Position in the aggregate.
    pub index: usize,
    /// Asset shown.
    pub asset: AssetId,
    /// Display name of the asset.
    pub name: String,
    /// Frames during which the asset is visible.
    pub window: FrameRange,
    /// Length of `window` in frames.
    pub frames: u64,
}

/// Every item's window, in item order.
pub fn schedule(aggregate: &Aggregate, opts: &TimelineOpts) -> FramestripResult<Vec<ItemWindow>> {
    opts.validate()?;
    Ok(aggregate
        .images()
        .iter()
        .enumerate()
        .map(|(index, img)| {
            let window = item_window(index, opts);
            ItemWindow {
                index,
                asset: img.id,
                name: img.name.clone(),
                window,
                frames: window.len_frames(),
            }
        })
        .collect())
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A visible crop handed to the rendering surface.
pub struct VisibleLayer {
    /// Owning aggregate.
    pub aggregate: AggregateId,
    /// Position in the aggregate.
    pub index: usize,
    /// Asset shown.
    pub asset: AssetId,
    /// Pixels to draw.
    pub handle: ResourceHandle,
    /// Natural width of the underlying image.
    pub width: u32,
    /// Natural height of the underlying image.
    pub height: u32,
    /// Region of the image to draw.
    pub crop: Rect,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Frame relative to the start of the item's window.
    pub local_frame: u64,
    /// Mirror horizontally.
    pub flip_x: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Everything visible at one frame, in painter's order.
pub struct FrameState {
    /// Evaluated frame.
    pub frame: FrameIndex,
    /// `frame` in seconds at the configured rate.
    pub time_secs: f64,
    /// Layers to draw back to front.
    pub layers: Vec<VisibleLayer>,
}

/// Layers of one aggregate visible at `frame`, in item order.
pub fn evaluate_aggregate(
    aggregate: &Aggregate,
    frame: FrameIndex,
    opts: &TimelineOpts,
) -> FramestripResult<Vec<VisibleLayer>> {
    opts.validate()?;
    Ok(visible_layers(aggregate, frame, opts))
}

fn visible_layers(aggregate: &Aggregate, frame: FrameIndex, opts: &TimelineOpts) -> Vec<VisibleLayer> {
    let opacity = opacity_at(frame, opts);
    let flip_x = aggregate.info().flip_x;
    aggregate
        .images()
        .iter()
        .enumerate()
        .filter_map(|(index, img)| {
            let window = item_window(index, opts);
            window.contains(frame).then(|| VisibleLayer {
                aggregate: aggregate.id(),
                index,
                asset: img.id,
                handle: img.handle,
                width: img.width,
                height: img.height,
                crop: img.crop,
                opacity,
                local_frame: frame.0 - window.start.0,
                flip_x,
            })
        })
        .collect()
}

/// Evaluate every committed sequence at `frame`.
///
/// Painter's order is store order, then item index.
#[tracing::instrument(skip(snapshot, opts), fields(version = snapshot.version))]
pub fn evaluate(
    snapshot: &StoreSnapshot,
    frame: FrameIndex,
    opts: &TimelineOpts,
) -> FramestripResult<FrameState> {
    opts.validate()?;
    let layers: Vec<VisibleLayer> = snapshot
        .sequences
        .iter()
        .flat_map(|seq| visible_layers(seq, frame, opts))
        .collect();
    tracing::debug!(layers = layers.len(), "evaluated frame");
    Ok(FrameState {
        frame,
        time_secs: opts.fps.frames_to_secs(frame.0),
        layers,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/mapper.rs"]
mod tests;

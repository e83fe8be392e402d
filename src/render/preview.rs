use crate::{
    assets::registry::ResourceRegistry,
    foundation::core::Canvas,
    foundation::error::{FramestripError, FramestripResult},
    render::composite::{over_in_place, unpremultiply},
    timeline::mapper::{FrameState, VisibleLayer},
};

#[derive(Clone, Debug)]
/// CPU-rendered RGBA8 frame.
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    fn transparent(canvas: Canvas) -> FramestripResult<Self> {
        let len = (canvas.width as usize)
            .checked_mul(canvas.height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| FramestripError::evaluation("canvas size overflow"))?;
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; len],
            premultiplied: true,
        })
    }

    /// Pixel at `(x, y)` as stored.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Straight-alpha copy of the frame, ready for PNG encoding.
    pub fn into_straight(mut self) -> Self {
        if self.premultiplied {
            for px in self.data.chunks_exact_mut(4) {
                let out = unpremultiply([px[0], px[1], px[2], px[3]]);
                px.copy_from_slice(&out);
            }
            self.premultiplied = false;
        }
        self
    }
}

/// Draw every layer of `state` onto a transparent `canvas`, back to front.
///
/// Each crop is placed at the canvas origin at its natural size and sampled nearest-neighbor.
/// A layer whose handle was released is an error.
#[tracing::instrument(skip(state, registry), fields(frame = state.frame.0, layers = state.layers.len()))]
pub fn render_frame(
    state: &FrameState,
    registry: &ResourceRegistry,
    canvas: Canvas,
) -> FramestripResult<FrameRGBA> {
    let mut frame = FrameRGBA::transparent(canvas)?;
    let mut layer_buf = vec![0u8; frame.data.len()];
    for layer in &state.layers {
        layer_buf.fill(0);
        draw_layer(&mut layer_buf, canvas, layer, registry)?;
        over_in_place(&mut frame.data, &layer_buf, layer.opacity as f32)?;
    }
    Ok(frame)
}

fn draw_layer(
    buf: &mut [u8],
    canvas: Canvas,
    layer: &VisibleLayer,
    registry: &ResourceRegistry,
) -> FramestripResult<()> {
    let Some(image) = registry.resolve(layer.handle) else {
        return Err(FramestripError::evaluation(format!(
            "layer {} of aggregate {:?} uses released handle {:?}",
            layer.index, layer.aggregate, layer.handle
        )));
    };

    let x0 = layer.crop.x0.floor().max(0.0) as u32;
    let y0 = layer.crop.y0.floor().max(0.0) as u32;
    let cw = (layer.crop.width().round().max(0.0) as u32).min(canvas.width);
    let ch = (layer.crop.height().round().max(0.0) as u32).min(canvas.height);

    for y in 0..ch {
        for x in 0..cw {
            let sx = if layer.flip_x { cw - 1 - x } else { x };
            let px = image.pixel(x0 + sx, y0 + y);
            let i = ((y as usize) * (canvas.width as usize) + (x as usize)) * 4;
            buf[i..i + 4].copy_from_slice(&px);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/preview.rs"]
mod tests;

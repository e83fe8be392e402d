use std::io::Cursor;

use super::*;
use crate::assets::image_asset::{ImageAsset, SourceFile};
use crate::foundation::core::{AggregateId, FrameIndex, Rect};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

/// 2x1 image: red then blue.
fn two_px(registry: &ResourceRegistry) -> ImageAsset {
    let img = image::RgbaImage::from_fn(2, 1, |x, _| image::Rgba(if x == 0 { RED } else { BLUE }));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    registry.decode(&SourceFile::new("two.png", bytes), 0).unwrap()
}

fn layer(asset: &ImageAsset, crop: Rect, opacity: f64, flip_x: bool) -> VisibleLayer {
    VisibleLayer {
        aggregate: AggregateId(1),
        index: 0,
        asset: asset.id,
        handle: asset.handle,
        width: asset.width,
        height: asset.height,
        crop,
        opacity,
        local_frame: 0,
        flip_x,
    }
}

fn state(layers: Vec<VisibleLayer>) -> FrameState {
    FrameState {
        frame: FrameIndex(0),
        time_secs: 0.0,
        layers,
    }
}

const CANVAS: Canvas = Canvas {
    width: 2,
    height: 1,
};

#[test]
fn draws_the_crop_at_the_origin() {
    let registry = ResourceRegistry::new();
    let a = two_px(&registry);
    let s = state(vec![layer(&a, Rect::new(1.0, 0.0, 2.0, 1.0), 1.0, false)]);
    let frame = render_frame(&s, &registry, CANVAS).unwrap();
    assert_eq!(frame.pixel(0, 0), Some(BLUE));
    assert_eq!(frame.pixel(1, 0), Some([0, 0, 0, 0]));
}

#[test]
fn flip_mirrors_the_crop() {
    let registry = ResourceRegistry::new();
    let a = two_px(&registry);
    let s = state(vec![layer(&a, a.full_crop(), 1.0, true)]);
    let frame = render_frame(&s, &registry, CANVAS).unwrap();
    assert_eq!(frame.pixel(0, 0), Some(BLUE));
    assert_eq!(frame.pixel(1, 0), Some(RED));
}

#[test]
fn zero_opacity_draws_nothing() {
    let registry = ResourceRegistry::new();
    let a = two_px(&registry);
    let s = state(vec![layer(&a, a.full_crop(), 0.0, false)]);
    let frame = render_frame(&s, &registry, CANVAS).unwrap();
    assert!(frame.data.iter().all(|b| *b == 0));
}

#[test]
fn later_layers_paint_over_earlier_ones() {
    let registry = ResourceRegistry::new();
    let a = two_px(&registry);
    let s = state(vec![
        layer(&a, a.full_crop(), 1.0, false),
        layer(&a, a.full_crop(), 1.0, true),
    ]);
    let frame = render_frame(&s, &registry, CANVAS).unwrap();
    assert_eq!(frame.pixel(0, 0), Some(BLUE));
}

#[test]
fn released_handle_is_an_error() {
    let registry = ResourceRegistry::new();
    let a = two_px(&registry);
    registry.release(a.handle);
    let s = state(vec![layer(&a, a.full_crop(), 1.0, false)]);
    assert!(matches!(
        render_frame(&s, &registry, CANVAS),
        Err(FramestripError::Evaluation(_))
    ));
}

#[test]
fn straight_copy_clears_the_flag() {
    let registry = ResourceRegistry::new();
    let a = two_px(&registry);
    let s = state(vec![layer(&a, a.full_crop(), 0.5, false)]);
    let frame = render_frame(&s, &registry, CANVAS).unwrap().into_straight();
    assert!(!frame.premultiplied);
    assert_eq!(frame.pixel(0, 0), Some([255, 0, 0, 128]));
}

use super::*;
use crate::foundation::core::{AssetId, ResourceHandle};

fn source(width: u32, height: u32) -> ImageAsset {
    ImageAsset {
        id: AssetId(1_000),
        handle: ResourceHandle(7),
        file_name: "sheet.png".to_string(),
        name: "sheet.png".to_string(),
        source_index: 0,
        width,
        height,
        crop: Rect::new(0.0, 0.0, f64::from(width), f64::from(height)),
    }
}

fn area(r: &Rect) -> f64 {
    r.width() * r.height()
}

fn overlap(a: &Rect, b: &Rect) -> f64 {
    let i = a.intersect(*b);
    if i.width() > 0.0 && i.height() > 0.0 {
        area(&i)
    } else {
        0.0
    }
}

#[test]
fn factors_below_one_are_rejected() {
    assert!(matches!(
        SplitFactors::new(0, 1),
        Err(FramestripError::InvalidSplitFactor { x: 0, y: 1 })
    ));
    assert!(SplitFactors::new(3, 0).is_err());
    let ids = IdAllocator::new();
    assert!(split(&source(10, 10), 0, 2, &ids).is_err());
}

#[test]
fn two_by_one_over_200x100() {
    let ids = IdAllocator::new();
    let crops = split(&source(200, 100), 2, 1, &ids).unwrap();
    assert_eq!(crops.len(), 2);
    assert_eq!(crops[0].crop, Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(crops[1].crop, Rect::new(100.0, 0.0, 200.0, 100.0));
    for c in &crops {
        assert_eq!(c.handle, ResourceHandle(7));
        assert_eq!((c.width, c.height), (200, 100));
    }
    assert_ne!(crops[0].id, crops[1].id);
}

#[test]
fn row_major_cell_order() {
    let cells = crop_grid(90.0, 60.0, SplitFactors::new(3, 2).unwrap());
    assert_eq!(cells.len(), 6);
    assert_eq!((cells[2].x0, cells[2].y0), (60.0, 0.0));
    assert_eq!((cells[3].x0, cells[3].y0), (0.0, 30.0));
    assert_eq!((cells[5].x1, cells[5].y1), (90.0, 60.0));
}

#[test]
fn crops_tile_the_image_exactly() {
    for (w, h) in [(200u32, 100u32), (97, 31), (1, 1), (640, 480)] {
        for (sx, sy) in [(1u32, 1u32), (2, 1), (3, 7), (4, 4), (5, 3)] {
            let cells = crop_grid(f64::from(w), f64::from(h), SplitFactors::new(sx, sy).unwrap());
            assert_eq!(cells.len(), (sx * sy) as usize);

            let total: f64 = cells.iter().map(area).sum();
            assert!((total - f64::from(w) * f64::from(h)).abs() < 1e-6);

            for (i, a) in cells.iter().enumerate() {
                assert!(a.x0 >= 0.0 && a.y0 >= 0.0);
                assert!(a.x1 <= f64::from(w) && a.y1 <= f64::from(h));
                for b in &cells[i + 1..] {
                    assert_eq!(overlap(a, b), 0.0, "{w}x{h} split {sx}x{sy}");
                }
            }
        }
    }
}

#[test]
fn resplit_is_geometrically_idempotent() {
    let ids = IdAllocator::new();
    let s = source(123, 45);
    let a: Vec<_> = split(&s, 4, 3, &ids).unwrap().into_iter().map(|c| c.crop).collect();
    let b: Vec<_> = split(&s, 4, 3, &ids).unwrap().into_iter().map(|c| c.crop).collect();
    assert_eq!(a, b);
}

#[test]
fn factors_beyond_the_pixel_extent_are_rejected() {
    let ids = IdAllocator::new();
    assert!(matches!(
        split(&source(8, 4), 100_000, 100_000, &ids),
        Err(FramestripError::InvalidSplitFactor {
            x: 100_000,
            y: 100_000
        })
    ));
    assert!(split(&source(8, 4), 8, 5, &ids).is_err());
    assert_eq!(split(&source(8, 4), 8, 4, &ids).unwrap().len(), 32);
}

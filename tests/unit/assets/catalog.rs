use super::*;
use crate::test_support::{broken_file, catalog, eventually, png_file};

#[test]
fn zero_threads_is_rejected() {
    let err = AssetCatalog::new(
        Arc::new(ResourceRegistry::with_release_audit()),
        CatalogOpts { threads: Some(0) },
    )
    .unwrap_err();
    assert!(err.to_string().contains("threads"));
}

#[test]
fn create_many_keeps_input_order_and_isolates_failures() {
    let cat = catalog();
    let files = vec![
        png_file("a.png", 3, 3),
        broken_file("b.png"),
        png_file("c.png", 5, 5),
        png_file("d.png", 7, 7),
    ];
    let out = cat.create_many(&files);
    assert_eq!(out.len(), 4);
    assert_eq!(out[0].as_ref().unwrap().name, "a.png");
    assert!(matches!(out[1], Err(FramestripError::Decode { .. })));
    assert_eq!(out[2].as_ref().unwrap().width, 5);
    assert_eq!(out[3].as_ref().unwrap().source_index, 3);
    assert_eq!(cat.tracked_count(), 3);
}

#[test]
fn spawn_many_wait_reassembles_input_order() {
    let cat = catalog();
    let files: Vec<_> = (0..6)
        .map(|i| png_file(&format!("f{i}.png"), 2 + i, 2))
        .collect();
    let batch = cat.spawn_many(files, &CancelToken::new());
    assert_eq!(batch.len(), 6);
    let out = batch.wait();
    let names: Vec<_> = out.iter().map(|o| o.as_ref().unwrap().name.clone()).collect();
    assert_eq!(
        names,
        ["f0.png", "f1.png", "f2.png", "f3.png", "f4.png", "f5.png"]
    );
    assert_eq!(cat.tracked_count(), 6);
}

#[test]
fn decodes_finishing_after_cancel_are_released() {
    let cat = catalog();
    let token = CancelToken::new();
    token.cancel();
    let batch = cat.spawn_many(
        vec![png_file("a.png", 2, 2), png_file("b.png", 2, 2)],
        &token,
    );
    assert!(batch.wait().is_empty());
    assert_eq!(cat.tracked_count(), 0);
    assert_eq!(cat.registry().live_count(), 0);
}

#[test]
fn dropped_batch_does_not_leak() {
    // One worker: the second batch runs strictly after the dropped one.
    let cat = AssetCatalog::new(
        Arc::new(ResourceRegistry::with_release_audit()),
        CatalogOpts { threads: Some(1) },
    )
    .unwrap();
    let token = CancelToken::new();
    drop(cat.spawn_many(vec![png_file("a.png", 2, 2)], &token));
    let kept = cat.spawn_many(vec![png_file("b.png", 2, 2)], &token).wait();
    assert_eq!(kept.len(), 1);
    assert!(eventually(|| cat.registry().live_count() == 1));
    assert_eq!(cat.tracked_count(), 1);
}

#[test]
fn destroy_releases_once_and_untracks() {
    let cat = catalog();
    let out = cat.create_many(&[png_file("a.png", 2, 2)]);
    let a = out.into_iter().next().unwrap().unwrap();
    assert_eq!(cat.destroy(&a), ReleaseOutcome::Released);
    assert!(!cat.is_tracked(a.id));
    assert_eq!(cat.destroy(&a), ReleaseOutcome::AlreadyReleased);
    assert_eq!(cat.registry().release_count(a.handle), 2);
}

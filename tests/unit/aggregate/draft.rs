use super::*;
use crate::test_support::{broken_file, catalog, eventually, png_file};

fn names(images: &OrderedList<ImageAsset>) -> Vec<String> {
    images.iter().map(|i| i.name.clone()).collect()
}

#[test]
fn uploads_append_in_file_order() {
    let cat = catalog();
    let mut draft = SequenceDraft::new(&cat);
    draft
        .upload(vec![png_file("a.png", 4, 4), png_file("b.png", 4, 4)])
        .unwrap();
    draft.upload(vec![png_file("c.png", 4, 4)]).unwrap();
    assert_eq!(draft.wait(), 3);
    assert!(!draft.is_loading());
    assert_eq!(names(draft.images()), ["a.png", "b.png", "c.png"]);
}

#[test]
fn failed_file_is_reported_and_siblings_survive() {
    let cat = catalog();
    let mut draft = SequenceDraft::new(&cat);
    draft
        .upload(vec![
            png_file("a.png", 4, 4),
            broken_file("b.png"),
            png_file("c.png", 4, 4),
        ])
        .unwrap();
    draft.wait();
    assert_eq!(names(draft.images()), ["a.png", "c.png"]);
    assert_eq!(draft.failures().len(), 1);
    assert!(matches!(
        &draft.failures()[0],
        FramestripError::Decode { name, .. } if name == "b.png"
    ));
}

#[test]
fn reorder_and_remove() {
    let cat = catalog();
    let mut draft = SequenceDraft::new(&cat);
    draft
        .upload(vec![
            png_file("a.png", 4, 4),
            png_file("b.png", 4, 4),
            png_file("c.png", 4, 4),
        ])
        .unwrap();
    draft.wait();
    let ids: Vec<AssetId> = draft.images().iter().map(|i| i.id).collect();

    draft.move_right(ids[0]).unwrap();
    assert_eq!(names(draft.images()), ["b.png", "a.png", "c.png"]);
    draft.move_left(ids[0]).unwrap();
    draft.move_left(ids[0]).unwrap();
    assert_eq!(names(draft.images()), ["a.png", "b.png", "c.png"]);

    let removed = draft.images().get(ids[1]).unwrap().handle;
    draft.remove_image(ids[1]).unwrap();
    assert_eq!(names(draft.images()), ["a.png", "c.png"]);
    assert!(!cat.registry().is_live(removed));
    assert_eq!(cat.registry().live_count(), 2);
}

#[test]
fn rejected_commit_leaves_store_and_draft_untouched() {
    let cat = catalog();
    let store = Store::new(cat.clone());
    let mut draft = SequenceDraft::new(&cat);
    draft.upload(vec![png_file("a.png", 4, 4)]).unwrap();
    draft.wait();

    let err = draft.commit(&store).unwrap_err();
    assert_eq!(err.reasons(), [MSG_EMPTY_NAME.to_string()]);
    assert!(store.is_empty());
    assert_eq!(draft.state(), DraftState::Draft);
    assert_eq!(draft.images().len(), 1);
}

#[test]
fn commit_is_refused_while_loading() {
    let cat = catalog();
    let store = Store::new(cat.clone());
    let mut draft = SequenceDraft::new(&cat);
    draft.update_info(ItemInfoPatch::name("walk")).unwrap();
    draft.upload(vec![png_file("a.png", 4, 4)]).unwrap();

    let err = draft.commit(&store).unwrap_err();
    assert!(err.reasons().contains(&MSG_LOADING.to_string()));
    assert!(store.is_empty());

    draft.wait();
    let id = draft.commit(&store).unwrap();
    assert_eq!(draft.state(), DraftState::Committed(id));
    assert_eq!(store.len(), 1);
    assert!(draft.update_info(ItemInfoPatch::name("x")).is_err());
}

#[test]
fn committed_draft_drop_keeps_resources() {
    let cat = catalog();
    let store = Store::new(cat.clone());
    {
        let mut draft = SequenceDraft::new(&cat);
        draft.update_info(ItemInfoPatch::name("walk")).unwrap();
        draft.upload(vec![png_file("a.png", 4, 4)]).unwrap();
        draft.wait();
        draft.commit(&store).unwrap();
    }
    assert_eq!(cat.registry().live_count(), 1);
}

#[test]
fn cancel_with_uploads_in_flight_releases_everything() {
    let cat = catalog();
    let mut draft = SequenceDraft::new(&cat);
    draft.update_info(ItemInfoPatch::name("walk")).unwrap();
    draft
        .upload(vec![
            png_file("a.png", 64, 64),
            png_file("b.png", 64, 64),
            png_file("c.png", 64, 64),
        ])
        .unwrap();
    draft.cancel();
    assert_eq!(draft.state(), DraftState::Destroyed);
    assert!(draft.images().is_empty());
    assert!(eventually(|| cat.registry().live_count() == 0));
    assert!(eventually(|| cat.tracked_count() == 0));
    assert!(draft.upload(vec![png_file("d.png", 4, 4)]).is_err());
}

#[test]
fn dropping_an_open_draft_cancels_it() {
    let cat = catalog();
    {
        let mut draft = SequenceDraft::new(&cat);
        draft.upload(vec![png_file("a.png", 4, 4)]).unwrap();
        draft.wait();
        assert_eq!(cat.registry().live_count(), 1);
    }
    assert_eq!(cat.registry().live_count(), 0);
}

#[test]
fn split_draft_derives_and_keeps_prior_state_on_bad_factors() {
    let cat = catalog();
    let store = Store::new(cat.clone());
    let mut draft = SplitDraft::new(&cat);
    draft.update_info(ItemInfoPatch::name("sheet")).unwrap();
    draft.upload(png_file("sheet.png", 200, 100)).unwrap();
    assert!(draft.wait().unwrap());
    assert_eq!(draft.split().unwrap().images().len(), 1);

    draft.set_split(4, 1).unwrap();
    let split = draft.split().unwrap();
    assert_eq!(split.images().len(), 4);
    let widths: Vec<f64> = split.images().iter().map(|i| i.crop.width()).collect();
    assert_eq!(widths, vec![50.0; 4]);

    assert!(matches!(
        draft.set_split(0, 2),
        Err(FramestripError::InvalidSplitFactor { x: 0, y: 2 })
    ));
    assert_eq!(draft.split().unwrap().images().len(), 4);
    assert!(matches!(
        draft.set_split(100_000, 100_000),
        Err(FramestripError::InvalidSplitFactor { .. })
    ));
    assert_eq!(draft.split().unwrap().images().len(), 4);
    assert_eq!(draft.factors(), Some(SplitFactors::new(4, 1).unwrap()));

    let id = draft.commit(&store).unwrap();
    assert_eq!(store.snapshot().get(id).unwrap().images().len(), 4);
    assert_eq!(cat.registry().live_count(), 1);
}

#[test]
fn split_factors_set_before_upload_apply_on_arrival() {
    let cat = catalog();
    let mut draft = SplitDraft::new(&cat);
    draft.set_split(2, 2).unwrap();
    assert!(draft.split().is_none());
    draft.upload(png_file("sheet.png", 8, 8)).unwrap();
    draft.wait().unwrap();
    assert_eq!(draft.split().unwrap().images().len(), 4);
}

#[test]
fn new_split_source_releases_the_old_one() {
    let cat = catalog();
    let mut draft = SplitDraft::new(&cat);
    draft.upload(png_file("one.png", 8, 8)).unwrap();
    draft.wait().unwrap();
    let old = draft.split().unwrap().source().unwrap().handle;

    draft.upload(png_file("two.png", 8, 8)).unwrap();
    assert!(!cat.registry().is_live(old));
    draft.wait().unwrap();
    assert_eq!(draft.split().unwrap().source().unwrap().name, "two.png");
    assert_eq!(cat.registry().live_count(), 1);

    draft.cancel();
    assert_eq!(cat.registry().live_count(), 0);
}

#[test]
fn split_draft_without_source_cannot_commit() {
    let cat = catalog();
    let store = Store::new(cat.clone());
    let mut draft = SplitDraft::new(&cat);
    draft.update_info(ItemInfoPatch::name("sheet")).unwrap();
    let err = draft.commit(&store).unwrap_err();
    assert_eq!(err.reasons(), [MSG_NO_IMAGES.to_string()]);
    assert!(store.is_empty());
}

use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    assert_eq!(over(dst, [200, 200, 200, 200], 0.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let src = [255, 0, 0, 255];
    assert_eq!(over([0, 0, 0, 255], src, 1.0), src);
}

#[test]
fn half_opacity_mixes_with_the_background() {
    let out = over([0, 0, 255, 255], [255, 0, 0, 255], 0.5);
    assert_eq!(out, [128, 0, 127, 255]);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
    assert!(over_in_place(&mut dst, &[255u8; 8], 1.0).is_ok());
    assert_eq!(dst, vec![255u8; 8]);
}

#[test]
fn unpremultiply_restores_straight_color() {
    assert_eq!(unpremultiply([64, 0, 0, 128]), [128, 0, 0, 128]);
    assert_eq!(unpremultiply([9, 9, 9, 0]), [0, 0, 0, 0]);
}

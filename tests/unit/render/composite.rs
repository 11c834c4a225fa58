use super::*;

#[test]
fn transparent_src_is_noop() {
    assert_eq!(over([10, 20, 30, 40], [0, 0, 0, 0]), [10, 20, 30, 40]);
}

#[test]
fn opaque_src_replaces_dst() {
    assert_eq!(over([10, 20, 30, 255], [1, 2, 3, 255]), [1, 2, 3, 255]);
}

#[test]
fn half_alpha_blends_premultiplied() {
    let out = over([200, 0, 0, 255], [0, 0, 128, 128]);
    assert_eq!(out[3], 255);
    assert_eq!(out[2], 128);
    assert_eq!(out[0], mul_div255_u16(200, 127) as u8);
}

#[test]
fn in_place_checks_lengths() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
    over_in_place(&mut dst, &[9, 9, 9, 255, 0, 0, 0, 0]).unwrap();
    assert_eq!(dst, vec![9, 9, 9, 255, 0, 0, 0, 0]);
}

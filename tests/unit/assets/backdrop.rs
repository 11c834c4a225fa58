use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: Vec<u8>) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_reports_natural_size() {
    let bytes = png_bytes(3, 2, vec![100u8; 3 * 2 * 4]);
    let b = Backdrop::decode(&bytes).unwrap();
    assert_eq!(b.size(), (3, 2));
    assert_eq!(b.width(), 3);
    assert_eq!(b.height(), 2);
}

#[test]
fn decode_garbage_is_an_error() {
    let err = Backdrop::decode(b"definitely not an image").unwrap_err();
    assert!(matches!(err, SaplingError::Other(_)));
}

#[test]
fn raw_pixels_must_match_size() {
    assert!(Backdrop::from_premul_rgba8(2, 2, &[0u8; 16]).is_ok());
    assert!(Backdrop::from_premul_rgba8(2, 2, &[0u8; 12]).is_err());
    assert!(Backdrop::from_premul_rgba8(0, 2, &[]).is_err());
}

use super::*;

#[test]
fn clamp01_handles_nan_and_bounds() {
    assert_eq!(clamp01(f64::NAN), 0.0);
    assert_eq!(clamp01(-0.5), 0.0);
    assert_eq!(clamp01(1.5), 1.0);
    assert_eq!(clamp01(0.25), 0.25);
}

#[test]
fn clamp_finite_maps_nan_to_min() {
    assert_eq!(clamp_finite(f64::INFINITY, 1.0, 11.0), 1.0);
    assert_eq!(clamp_finite(20.0, 1.0, 11.0), 11.0);
}

#[test]
fn premultiply_then_unpremultiply_is_close() {
    let mut px = [200u8, 100, 50, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, [100, 50, 25, 128]);
    unpremultiply_rgba8_in_place(&mut px);
    for (got, want) in px[..3].iter().zip([200u8, 100, 50]) {
        assert!((i32::from(*got) - i32::from(want)).abs() <= 2);
    }
    assert_eq!(px[3], 128);
}

#[test]
fn deg_to_rad_quarter_turn() {
    assert!((deg_to_rad(-90.0) + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
}

use super::*;

#[test]
fn parse_hex_accepts_optional_hash_and_case() {
    assert_eq!(Rgb::parse_hex("#2c7a2c"), Some(Rgb::from_u8(0x2c, 0x7a, 0x2c)));
    assert_eq!(Rgb::parse_hex(" 6D30FD "), Some(Rgb::from_u8(0x6d, 0x30, 0xfd)));
    assert_eq!(Rgb::parse_hex("#fff"), None);
    assert_eq!(Rgb::parse_hex("#gg0000"), None);
    assert_eq!(Rgb::parse_hex("+12345"), None);
    assert_eq!(Rgb::parse_hex(""), None);
}

#[test]
fn to_hex_rounds_and_clamps() {
    assert_eq!(Rgb::new(85.4, 44.6, 34.0).to_hex(), "#552d22");
    assert_eq!(Rgb::new(-20.0, 300.0, f64::NAN).to_hex(), "#00ff00");
    assert_eq!(Rgb::from_u8(0x55, 0x2c, 0x22).to_string(), "#552c22");
}

#[test]
fn mix_interpolates_and_clamps_t() {
    let a = Rgb::BLACK;
    let b = Rgb::new(200.0, 100.0, 50.0);
    assert_eq!(a.mix(b, 0.5), Rgb::new(100.0, 50.0, 25.0));
    assert_eq!(a.mix(b, 2.0), b);
    assert_eq!(a.mix(b, -1.0), a);
    assert_eq!(a.mix(b, f64::NAN), a);
}

#[test]
fn serde_uses_hex_strings() {
    let c = Rgb::from_u8(1, 2, 3);
    let json = serde_json::to_string(&c).unwrap();
    assert_eq!(json, "\"#010203\"");
    let back: Rgb = serde_json::from_str(&json).unwrap();
    assert_eq!(back, c);
    assert!(serde_json::from_str::<Rgb>("\"nope\"").is_err());
}

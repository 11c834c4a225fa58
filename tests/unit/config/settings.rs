use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

#[test]
fn defaults_match_documented_values() {
    let s = TreeSettings::default();
    assert_eq!(s.depth, 10);
    assert_eq!(s.growth_speed, 5.0);
    assert_eq!(s.branch_width, 2.7);
    assert_eq!(s.color_mode, ColorMode::Gradient);
    assert_eq!(s.color.to_hex(), "#2c7a2c");
    assert_eq!(s.gradient_start.to_hex(), "#552c22");
    assert_eq!(s.gradient_end.to_hex(), "#6d30fd");
    assert_eq!(s.seed, Some(1337));
    assert!(!s.depth_mode);
}

#[test]
fn patch_clamps_numeric_fields() {
    let mut s = TreeSettings::default();
    s.apply(&SettingsPatch {
        depth: Some(40),
        growth_speed: Some(0.01),
        tree_scale: Some(9.0),
        branch_width: Some(f64::NAN),
        light_intensity: Some(-3.0),
        render_scale: Some(100.0),
        depth_strength: Some(5.0),
        light_direction: Some(-30.0),
        ..SettingsPatch::default()
    });
    assert_eq!(s.depth, 11);
    assert_eq!(s.growth_speed, 0.5);
    assert_eq!(s.tree_scale, 4.0);
    assert_eq!(s.branch_width, 2.7);
    assert_eq!(s.light_intensity, 0.0);
    assert_eq!(s.render_scale, 8.0);
    assert_eq!(s.depth_strength, 3.0);
    assert_eq!(s.light_direction, 330.0);

    s.apply(&SettingsPatch {
        depth: Some(0),
        light_direction: Some(725.0),
        ..SettingsPatch::default()
    });
    assert_eq!(s.depth, 1);
    assert_eq!(s.light_direction, 5.0);
}

#[test]
fn malformed_colors_keep_last_good_value() {
    let mut s = TreeSettings::default();
    s.apply(&SettingsPatch {
        color: Some("#123456".into()),
        gradient_start: Some("garbage".into()),
        gradient_end: Some("#12345".into()),
        ..SettingsPatch::default()
    });
    assert_eq!(s.color.to_hex(), "#123456");
    assert_eq!(s.gradient_start.to_hex(), "#552c22");
    assert_eq!(s.gradient_end.to_hex(), "#6d30fd");
}

#[test]
fn unknown_color_mode_falls_back_to_gradient() {
    let mut s = TreeSettings::default();
    s.apply(&SettingsPatch {
        color_mode: Some("solid".into()),
        ..SettingsPatch::default()
    });
    assert_eq!(s.color_mode, ColorMode::Solid);
    s.apply(&SettingsPatch {
        color_mode: Some("plaid".into()),
        ..SettingsPatch::default()
    });
    assert_eq!(s.color_mode, ColorMode::Gradient);
}

#[test]
fn seed_can_be_set_and_cleared() {
    let mut s = TreeSettings::default();
    s.apply(&SettingsPatch {
        seed: Some(Some(42)),
        ..SettingsPatch::default()
    });
    assert_eq!(s.seed, Some(42));
    s.apply(&SettingsPatch {
        seed: Some(None),
        ..SettingsPatch::default()
    });
    assert_eq!(s.seed, None);
}

#[test]
fn json_uses_camel_case_and_partial_documents() {
    let s: TreeSettings =
        serde_json::from_str(r##"{"depth": 4, "colorMode": "baseGradient", "gradientEnd": "#ffffff"}"##)
            .unwrap();
    assert_eq!(s.depth, 4);
    assert_eq!(s.color_mode, ColorMode::BaseGradient);
    assert_eq!(s.gradient_end, Rgb::WHITE);
    assert_eq!(s.growth_speed, 5.0);

    let json = serde_json::to_value(TreeSettings::default()).unwrap();
    assert_eq!(json["growthSpeed"], 5.0);
    assert_eq!(json["colorMode"], "gradient");
    assert_eq!(json["gradientStart"], "#552c22");
}

#[test]
fn sanitized_brings_loaded_values_into_range() {
    let s = TreeSettings {
        depth: 99,
        tree_scale: 0.0,
        light_direction: 400.0,
        ..TreeSettings::default()
    }
    .sanitized();
    assert_eq!(s.depth, 11);
    assert_eq!(s.tree_scale, 0.2);
    assert_eq!(s.light_direction, 40.0);
}

#[test]
fn randomize_stays_in_range_and_reseeds() {
    let mut rng = StdRng::seed_from_u64(9);
    for _ in 0..200 {
        let mut s = TreeSettings::default();
        s.randomize(&mut rng);
        assert!((3..=11).contains(&s.depth));
        assert!((0.5..=5.0).contains(&s.growth_speed));
        assert!((0.2..=4.0).contains(&s.tree_scale));
        assert!((0.2..=5.0).contains(&s.branch_width));
        assert!((0.0..360.0).contains(&s.light_direction));
        assert!((0.0..=1.0).contains(&s.light_intensity));
        assert!(matches!(s.seed, Some(1..=999_999_999)));
        assert_ne!(s.color_mode, ColorMode::BaseGradient);
        if s.color_mode == ColorMode::Solid {
            assert_eq!(s.gradient_start, s.color);
        }
        assert_eq!(s.render_scale, 1.0);
    }
}

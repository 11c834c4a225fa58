use super::*;
use crate::foundation::core::Stage;

fn settings(depth: u32, speed: f64) -> TreeSettings {
    TreeSettings {
        depth,
        growth_speed: speed,
        ..TreeSettings::default()
    }
}

fn plant(settings: &TreeSettings) -> GrowingTree {
    let origin = Point::new(400.0, 600.0);
    GrowingTree::plant(
        TreeId(1),
        settings,
        Anchor::Canvas { u: 0.5, v: 0.75 },
        origin,
        1.0,
        None,
        Instant::now(),
    )
}

#[test]
fn depth_one_at_speed_five_finishes_in_twenty_ticks() {
    let mut t = plant(&settings(1, 5.0));
    for tick in 1..20 {
        assert_eq!(t.advance(), GrowthStep::Growing, "tick {tick}");
        assert_eq!(t.current_depth(), 0);
    }
    assert_eq!(t.advance(), GrowthStep::Finished);
    assert!(t.is_finished());
    assert_eq!(t.current_depth(), 1);
    assert_eq!(t.advance(), GrowthStep::Finished);
}

#[test]
fn progress_and_depth_never_decrease() {
    let mut t = plant(&settings(4, 3.3));
    let mut last_depth = 0;
    let mut last_elapsed = vec![0.0; t.structure().segment_count()];
    for _ in 0..400 {
        let step = t.advance();
        assert!(t.current_depth() >= last_depth);
        last_depth = t.current_depth();
        let elapsed: Vec<f64> = t
            .structure()
            .levels()
            .iter()
            .flatten()
            .map(|s| s.frames_elapsed)
            .collect();
        for (now, before) in elapsed.iter().zip(&last_elapsed) {
            assert!(now >= before);
        }
        last_elapsed = elapsed;
        if step == GrowthStep::Finished {
            break;
        }
    }
    assert!(t.is_finished());
    // Levels past the displayed depth never animate.
    assert!(t.structure().level(4).iter().all(|s| s.frames_elapsed == 0.0));
}

#[test]
fn only_the_current_level_advances() {
    let mut t = plant(&settings(3, 10.0));
    t.advance();
    assert_eq!(t.structure().trunk().unwrap().frames_elapsed, 10.0);
    assert!(t.structure().level(1).iter().all(|s| s.frames_elapsed == 0.0));
}

#[test]
fn force_complete_finishes_displayed_levels() {
    let mut t = plant(&settings(6, 0.5));
    t.advance();
    t.force_complete();
    assert!(t.is_finished());
    for d in 0..6 {
        assert!(t.structure().level(d).iter().all(|s| s.is_complete()));
    }
    let finished = t.into_finished();
    assert_eq!(finished.levels().len(), 6);
}

#[test]
fn planting_copies_settings_and_seeded_geometry_is_reproducible() {
    let s = settings(5, 2.0);
    let a = plant(&s);
    let b = plant(&s);
    assert_eq!(a.structure(), b.structure());
    assert_eq!(a.seed(), Some(1337));
    assert!(a.rng_cursor().unwrap() > 0);
    assert_eq!(a.growth_speed(), 2.0);

    let unseeded = plant(&TreeSettings { seed: None, ..s });
    assert_eq!(unseeded.rng_cursor(), None);
}

#[test]
fn builders_override_speed_and_title() {
    let t = plant(&settings(2, 5.0))
        .with_growth_speed(1.25)
        .with_growth_speed(-1.0)
        .with_title("Focus");
    assert_eq!(t.growth_speed(), 1.25);
    assert_eq!(t.into_finished().title(), Some("Focus"));
}

#[test]
fn age_saturates_for_clock_skew() {
    let t = plant(&settings(1, 5.0));
    let later = t.created_at() + STUCK_TREE_TIMEOUT + Duration::from_millis(1);
    assert!(t.age(later) > STUCK_TREE_TIMEOUT);
    assert_eq!(t.age(t.created_at()), Duration::ZERO);
}

#[test]
fn placement_follows_anchor_and_render_scale() {
    let space = CoordinateSpace::new(Stage::new(800, 800).unwrap());
    let t = plant(&settings(2, 5.0));
    let p = t.placement(&space);
    assert_eq!(p.anchor, Point::new(400.0, 600.0));
    assert_eq!(p.origin, Point::new(400.0, 600.0));
    assert_eq!(p.scale, 1.0);
    assert_eq!(t.depth_key(&space), 0.75);
}

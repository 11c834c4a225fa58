use super::*;

fn stage(w: u32, h: u32) -> Stage {
    Stage::new(w, h).unwrap()
}

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
}

#[test]
fn cover_fills_container_and_centers() {
    let c = CoverTransform::cover(800.0, 600.0, 1000.0, 500.0);
    assert!((c.scale - 1.2).abs() < 1e-12);
    assert!((c.offset.x + 200.0).abs() < 1e-9);
    assert!(c.offset.y.abs() < 1e-9);
    assert_eq!(CoverTransform::cover(800.0, 600.0, 0.0, 10.0), CoverTransform::IDENTITY);
}

#[test]
fn round_trip_reproduces_points_with_and_without_image() {
    let mut space = CoordinateSpace::new(stage(800, 600));
    let points = [
        Point::new(0.0, 0.0),
        Point::new(400.0, 300.0),
        Point::new(799.5, 12.25),
        Point::new(133.3, 599.0),
    ];
    for p in points {
        assert!(close(space.uv_to_canvas_xy(space.canvas_to_image_uv(p)), p));
    }

    space.set_image_size(Some((1000, 500)));
    for p in points {
        let a = space.canvas_to_image_uv(p);
        assert!(a.is_image());
        assert!(close(space.uv_to_canvas_xy(a), p), "{p:?}");
    }
}

#[test]
fn image_uv_is_clamped_and_canvas_uv_is_not() {
    let mut space = CoordinateSpace::new(stage(100, 100));
    let a = space.canvas_to_image_uv(Point::new(150.0, -10.0));
    assert_eq!(a, Anchor::Canvas { u: 1.5, v: -0.1 });

    space.set_image_size(Some((100, 100)));
    let b = space.canvas_to_image_uv(Point::new(150.0, -10.0));
    assert_eq!(b, Anchor::Image { u: 1.0, v: 0.0 });
}

#[test]
fn upgrade_is_idempotent_and_only_applies_with_an_image() {
    let mut space = CoordinateSpace::new(stage(800, 600));
    let canvas = Anchor::Canvas { u: 0.5, v: 0.88 };
    assert_eq!(space.upgrade_anchor(canvas), canvas);

    space.set_image_size(Some((1000, 500)));
    let once = space.upgrade_anchor(canvas);
    assert!(once.is_image());
    assert_eq!(space.upgrade_anchor(once), once);

    let image = Anchor::Image { u: 0.25, v: 0.75 };
    assert_eq!(space.upgrade_anchor(image), image);
}

#[test]
fn image_anchor_stays_glued_across_resize() {
    let mut space = CoordinateSpace::new(stage(800, 600));
    space.set_image_size(Some((1000, 500)));
    let anchor = space.canvas_to_image_uv(Point::new(400.0, 300.0));

    space.set_stage(stage(1600, 1200));
    let p = space.uv_to_canvas_xy(anchor);
    assert!(close(p, Point::new(800.0, 600.0)));
    assert!((space.render_scale(1.0, Some(&anchor)) - 2.4).abs() < 1e-12);
    assert_eq!(space.render_scale(1.0, Some(&Anchor::Canvas { u: 0.1, v: 0.1 })), 1.0);
}

#[test]
fn depth_key_prefers_anchor_v() {
    let a = Anchor::Image { u: 0.1, v: 0.3 };
    assert_eq!(depth_sort_key(Some(&a), 999.0, 100.0), 0.3);
    assert_eq!(depth_sort_key(None, 50.0, 100.0), 0.5);
    assert_eq!(depth_sort_key(None, f64::NAN, 100.0), 0.0);
    assert_eq!(depth_sort_key(None, 0.5, 0.0), 0.5);
}

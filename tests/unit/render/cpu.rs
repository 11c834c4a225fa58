use super::*;

fn px(s: &CpuSurface, x: u32, y: u32) -> [u8; 4] {
    let (w, _) = s.size();
    let i = ((y * w + x) * 4) as usize;
    let p = s.pixels();
    [p[i], p[i + 1], p[i + 2], p[i + 3]]
}

#[test]
fn rejects_unusable_sizes() {
    assert!(CpuSurface::new(0, 10).is_err());
    assert!(CpuSurface::new(10, 70_000).is_err());
    let mut s = CpuSurface::new(4, 4).unwrap();
    assert!(s.resize(0, 0).is_err());
    s.resize(8, 2).unwrap();
    assert_eq!(s.size(), (8, 2));
    assert_eq!(s.pixels().len(), 8 * 2 * 4);
}

#[test]
fn fill_rect_paints_premultiplied_color() {
    let mut s = CpuSurface::new(8, 8).unwrap();
    s.begin_frame();
    s.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0), Rgb::from_u8(255, 0, 0), 1.0);
    s.end_frame();
    assert_eq!(px(&s, 3, 3), [255, 0, 0, 255]);

    s.begin_frame();
    s.end_frame();
    assert_eq!(px(&s, 3, 3), [0, 0, 0, 0]);
}

#[test]
fn solid_stroke_covers_its_footprint_only() {
    let mut s = CpuSurface::new(20, 10).unwrap();
    s.begin_frame();
    s.stroke_line(
        Point::new(2.0, 5.0),
        Point::new(18.0, 5.0),
        4.0,
        &StrokeStyle::Solid(Rgb::from_u8(0, 0, 255)),
    );
    s.end_frame();
    assert_eq!(px(&s, 10, 5), [0, 0, 255, 255]);
    assert_eq!(px(&s, 10, 0)[3], 0);
    assert_eq!(px(&s, 0, 5)[3], 0);
    assert_eq!(px(&s, 19, 5)[3], 0);
}

#[test]
fn gradient_stroke_runs_from_start_to_end() {
    let mut s = CpuSurface::new(40, 10).unwrap();
    s.begin_frame();
    s.stroke_line(
        Point::new(0.0, 5.0),
        Point::new(40.0, 5.0),
        6.0,
        &StrokeStyle::Gradient {
            from: Point::new(0.0, 5.0),
            to: Point::new(40.0, 5.0),
            start: Rgb::BLACK,
            end: Rgb::WHITE,
        },
    );
    s.end_frame();
    let left = px(&s, 1, 5);
    let right = px(&s, 38, 5);
    assert_eq!(left[3], 255);
    assert_eq!(right[3], 255);
    assert!(left[0] < 64, "{left:?}");
    assert!(right[0] > 192, "{right:?}");
}

#[test]
fn degenerate_lines_draw_nothing() {
    assert!(line_frame(Point::new(1.0, 1.0), Point::new(1.0, 1.0), 3.0).is_none());
    assert!(line_frame(Point::new(1.0, 1.0), Point::new(5.0, 1.0), 0.0).is_none());
    assert!(line_frame(Point::new(1.0, 1.0), Point::new(f64::NAN, 1.0), 1.0).is_none());

    let mut s = CpuSurface::new(4, 4).unwrap();
    s.begin_frame();
    s.stroke_line(
        Point::new(2.0, 2.0),
        Point::new(2.0, 2.0),
        3.0,
        &StrokeStyle::Solid(Rgb::WHITE),
    );
    s.end_frame();
    assert!(s.pixels().iter().all(|&b| b == 0));
}

#[test]
fn line_frame_maps_unit_square_onto_stroke() {
    let f = line_frame(Point::new(10.0, 10.0), Point::new(10.0, 0.0), 2.0).unwrap();
    let a = f * Point::new(0.0, 0.5);
    let b = f * Point::new(1.0, 0.5);
    assert!((a - Point::new(10.0, 10.0)).hypot() < 1e-9);
    assert!((b - Point::new(10.0, 0.0)).hypot() < 1e-9);
    let edge = f * Point::new(0.0, 0.0);
    assert!(((edge - Point::new(10.0, 10.0)).hypot() - 1.0).abs() < 1e-9);
}

#[test]
fn partial_gradient_stroke_keeps_segment_colors() {
    let style = StrokeStyle::Gradient {
        from: Point::new(0.0, 5.0),
        to: Point::new(40.0, 5.0),
        start: Rgb::BLACK,
        end: Rgb::WHITE,
    };
    let mut full = CpuSurface::new(40, 10).unwrap();
    full.begin_frame();
    full.stroke_line(Point::new(0.0, 5.0), Point::new(40.0, 5.0), 6.0, &style);
    full.end_frame();

    let mut half = CpuSurface::new(40, 10).unwrap();
    half.begin_frame();
    half.stroke_line(Point::new(0.0, 5.0), Point::new(20.0, 5.0), 6.0, &style);
    half.end_frame();

    let tip = px(&half, 18, 5);
    assert_eq!(tip[3], 255);
    assert!((100..=135).contains(&tip[0]), "{tip:?}");
    for x in [2, 10, 18] {
        let (a, b) = (px(&full, x, 5)[0], px(&half, x, 5)[0]);
        assert!(a.abs_diff(b) <= 8, "x={x}: full {a} half {b}");
    }
    assert_eq!(px(&half, 30, 5)[3], 0);
}

#[test]
fn axis_param_projects_onto_gradient_axis() {
    let (a, b) = (Point::new(0.0, 0.0), Point::new(0.0, -40.0));
    assert_eq!(axis_param(Point::new(0.0, -10.0), a, b), 0.25);
    assert_eq!(axis_param(Point::new(3.0, -20.0), a, b), 0.5);
    assert_eq!(axis_param(Point::new(5.0, 5.0), a, a), 0.0);
}

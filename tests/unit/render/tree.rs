use super::*;
use crate::foundation::core::{Rect, Stage};
use crate::foundation::error::SaplingResult;
use crate::random::sequence::TreeRng;
use crate::shading::model::StrokeStyle;
use crate::structure::branch::generate;

#[derive(Debug, PartialEq)]
enum Op {
    Fill(Rect, f64),
    Image(Affine),
    Line(Point, Point, f64),
}

#[derive(Default)]
struct Recorder {
    ops: Vec<Op>,
    buf: Vec<u8>,
}

impl PaintSurface for Recorder {
    fn size(&self) -> (u32, u32) {
        (800, 600)
    }
    fn resize(&mut self, _width: u32, _height: u32) -> SaplingResult<()> {
        Ok(())
    }
    fn begin_frame(&mut self) {
        self.ops.clear();
    }
    fn fill_rect(&mut self, rect: Rect, _color: Rgb, alpha: f64) {
        self.ops.push(Op::Fill(rect, alpha));
    }
    fn draw_image(&mut self, _image: &Backdrop, transform: Affine) {
        self.ops.push(Op::Image(transform));
    }
    fn stroke_line(&mut self, from: Point, to: Point, width: f64, _style: &StrokeStyle) {
        self.ops.push(Op::Line(from, to, width));
    }
    fn end_frame(&mut self) {}
    fn pixels(&self) -> &[u8] {
        &self.buf
    }
}

fn lines(r: &Recorder) -> Vec<(Point, Point, f64)> {
    r.ops
        .iter()
        .filter_map(|op| match *op {
            Op::Line(a, b, w) => Some((a, b, w)),
            _ => None,
        })
        .collect()
}

#[test]
fn placement_scales_about_origin_then_moves_to_anchor() {
    let p = Placement {
        anchor: Point::new(100.0, 200.0),
        origin: Point::new(50.0, 60.0),
        scale: 2.0,
    };
    assert_eq!(p.map(Point::new(50.0, 60.0)), Point::new(100.0, 200.0));
    assert_eq!(p.map(Point::new(51.0, 50.0)), Point::new(102.0, 180.0));
    let q = Point::new(7.0, -3.0);
    let via_affine = p.affine() * q;
    assert!((via_affine - p.map(q)).hypot() < 1e-9);
    assert_eq!(Placement::at_origin(q).map(Point::new(1.0, 1.0)), Point::new(1.0, 1.0));
}

#[test]
fn look_uses_base_color_only_in_base_gradient_mode() {
    let base = Rgb::from_u8(1, 2, 3);
    let mut settings = TreeSettings::default();
    let look = TreeLook::new(&settings, Point::ZERO, -10.0, Some(base));
    assert_eq!(look.gradient_start, settings.gradient_start);

    settings.color_mode = ColorMode::BaseGradient;
    assert_eq!(TreeLook::new(&settings, Point::ZERO, -10.0, Some(base)).gradient_start, base);
    assert_eq!(
        TreeLook::new(&settings, Point::ZERO, -10.0, None).gradient_start,
        settings.gradient_start
    );
}

#[test]
fn growing_draws_completed_levels_full_and_current_level_partially() {
    let origin = Point::new(400.0, 500.0);
    let mut rng = TreeRng::for_tree(Some(11), 3, 1.0);
    let mut s = generate(origin, 1.0, 1.0, &mut rng);
    for seg in s.levels_mut()[1].iter_mut() {
        seg.advance(50.0);
    }
    let look = TreeLook::new(&TreeSettings::default(), origin, s.tree_top(), None);
    let placement = Placement::at_origin(origin);

    let mut rec = Recorder::default();
    draw_growing(&mut rec, s.levels(), 1, 3, &look, &placement);
    let drawn = lines(&rec);
    assert_eq!(drawn.len(), 1 + 2);

    let near = |a: Point, b: Point| (a - b).hypot() < 1e-9;
    let trunk = s.trunk().unwrap().branch;
    assert!(near(drawn[0].0, trunk.start));
    assert!(near(drawn[0].1, trunk.end));
    assert_eq!(drawn[0].2, trunk.line_width);
    let child = s.level(1)[0].branch;
    assert!(near(drawn[1].1, child.point_at(0.5)));
}

#[test]
fn nothing_is_drawn_for_unstarted_segments() {
    let origin = Point::new(400.0, 500.0);
    let mut rng = TreeRng::for_tree(Some(11), 3, 1.0);
    let s = generate(origin, 1.0, 1.0, &mut rng);
    let look = TreeLook::new(&TreeSettings::default(), origin, s.tree_top(), None);
    let mut rec = Recorder::default();
    draw_growing(&mut rec, s.levels(), 0, 3, &look, &Placement::at_origin(origin));
    assert!(lines(&rec).is_empty());
}

#[test]
fn finished_trees_scale_widths_with_placement() {
    let origin = Point::new(400.0, 500.0);
    let mut rng = TreeRng::for_tree(Some(5), 2, 1.0);
    let s = generate(origin, 1.0, 2.0, &mut rng);
    let geometry = s.geometry(2);
    let look = TreeLook::new(&TreeSettings::default(), origin, s.tree_top(), None);
    let placement = Placement {
        anchor: Point::new(100.0, 100.0),
        origin,
        scale: 0.5,
    };
    let mut rec = Recorder::default();
    draw_finished(&mut rec, &geometry, &look, &placement);
    let drawn = lines(&rec);
    assert_eq!(drawn.len(), 3);
    assert_eq!(drawn[0].0, Point::new(100.0, 100.0));
    assert_eq!(drawn[0].2, 11.0 * 2.0 * 0.5);
}

#[test]
fn background_draws_image_and_overlay_only_when_active() {
    let stage = Stage::new(800, 600).unwrap();
    let mut space = CoordinateSpace::new(stage);
    let image = Backdrop::from_premul_rgba8(2, 1, &[0u8; 8]).unwrap();

    let mut rec = Recorder::default();
    paint_background(&mut rec, &space, Some(&image), Rgb::BLACK, 0.35);
    assert_eq!(rec.ops, vec![Op::Fill(stage.rect(), 1.0)]);

    space.set_image_size(Some(image.size()));
    let mut rec = Recorder::default();
    paint_background(&mut rec, &space, Some(&image), Rgb::BLACK, 0.35);
    assert_eq!(rec.ops.len(), 3);
    let Op::Image(tr) = rec.ops[1] else {
        panic!("expected image draw");
    };
    let corner = tr * Point::new(2.0, 1.0);
    assert!((corner.y - 600.0).abs() < 1e-9);
    assert_eq!(rec.ops[2], Op::Fill(stage.rect(), 0.35));
}

//! Canvas rendering for the constellation.
//!
//! Rendering uses three passes for correct z-ordering:
//! 1. Background gradient (screen space)
//! 2. Constellation lines (world space)
//! 3. Idle stars, then hovered or still-animating stars on top
//!
//! Drawing goes through the [`Canvas`] trait so the renderer can run against
//! anything that records or rasterizes primitives.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::interaction::ViewTransform;
use super::scale::{ScaleConfig, ScaledValues};
use super::scene::{Scene, StarVisual};
use super::theme::{Color, Theme};

/// Outline of a line or circle. `width` is in the current coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
	pub color: Color,
	pub width: f64,
}

/// Soft shadow drawn around a primitive. `blur` is always in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
	pub color: Color,
	pub blur: f64,
}

/// The drawing primitives the renderer needs.
pub trait Canvas {
	/// Paints the full surface with a radial gradient from `inner` (center) to
	/// `outer` (rim), ignoring any view transform.
	fn fill_background(&mut self, width: f64, height: f64, inner: Color, outer: Color);
	/// Applies the view transform to everything drawn until [`Canvas::reset_view`].
	fn set_view(&mut self, view: &ViewTransform);
	fn reset_view(&mut self);
	fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke, glow: Option<Glow>);
	fn circle(
		&mut self,
		center: (f64, f64),
		radius: f64,
		fill: Color,
		border: Option<Stroke>,
		glow: Option<Glow>,
	);
	/// Draws `text` horizontally centered on `x`, with its baseline at `y`.
	fn text(&mut self, text: &str, pos: (f64, f64), font: &str, fill: Color, shadow: Option<Glow>);
}

/// Draws the whole scene. Does nothing on a zero-sized surface.
pub fn render(
	scene: &Scene,
	view: &ViewTransform,
	width: f64,
	height: f64,
	canvas: &mut impl Canvas,
	theme: &Theme,
	config: &ScaleConfig,
) {
	if !(width > 0.0 && height > 0.0) {
		return;
	}
	let scale = ScaledValues::new(config, view.k);

	canvas.fill_background(width, height, theme.background.inner, theme.background.outer);

	canvas.set_view(view);
	draw_lines(scene, canvas, theme, &scale);

	// Hover-animating stars are drawn last so they sit above their neighbors.
	for (_, star) in scene.stars().filter(|(_, s)| s.hover_t <= 0.0) {
		draw_star(star, canvas, theme, &scale);
	}
	for (_, star) in scene.stars().filter(|(_, s)| s.hover_t > 0.0) {
		draw_star(star, canvas, theme, &scale);
	}
	canvas.reset_view();
}

fn draw_lines(scene: &Scene, canvas: &mut impl Canvas, theme: &Theme, scale: &ScaledValues) {
	let color = theme.link.color.with_alpha(theme.link.opacity);
	let stroke = Stroke {
		color,
		width: scale.link_width(theme.link.width),
	};
	let glow = (theme.link.glow_blur > 0.0).then_some(Glow {
		color,
		blur: theme.link.glow_blur,
	});

	for line in scene.lines() {
		// An endpoint can vanish between selection and draw; skip the line.
		let (Some(a), Some(b)) = (scene.star(&line.source), scene.star(&line.target)) else {
			continue;
		};
		canvas.line((a.x, a.y), (b.x, b.y), stroke, glow);
	}
}

fn draw_star(star: &StarVisual, canvas: &mut impl Canvas, theme: &Theme, scale: &ScaledValues) {
	let radius = scale.star_radius(star.radius);
	let style = &theme.star;

	canvas.circle(
		(star.x, star.y),
		radius,
		star.color,
		Some(Stroke {
			color: style.border_color,
			width: style.border_width / scale.k,
		}),
		Some(Glow {
			color: star.color,
			blur: style.glow_blur * (1.0 + star.hover_t),
		}),
	);

	if star.sparkle > 0.0 {
		canvas.circle(
			(star.x, star.y),
			radius * style.sparkle_ratio,
			style.sparkle_color.with_alpha(star.sparkle),
			None,
			None,
		);
	}

	if !star.label.is_empty() {
		let label = &theme.label;
		let px = scale.label_px(star.label_px);
		canvas.text(
			&star.label,
			(star.x, star.y - radius - label.offset),
			&format!("{px}px {}", label.font_family),
			label.color.with_alpha(star.label_alpha),
			Some(Glow {
				color: label.shadow,
				blur: 3.0,
			}),
		);
	}
}

fn apply_glow(ctx: &CanvasRenderingContext2d, glow: Option<Glow>) {
	match glow {
		Some(g) => {
			ctx.set_shadow_color(&g.color.to_css());
			ctx.set_shadow_blur(g.blur);
		}
		None => {
			ctx.set_shadow_color("rgba(0, 0, 0, 0)");
			ctx.set_shadow_blur(0.0);
		}
	}
}

impl Canvas for CanvasRenderingContext2d {
	fn fill_background(&mut self, width: f64, height: f64, inner: Color, outer: Color) {
		let _ = self.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
		apply_glow(self, None);
		let (cx, cy) = (width / 2.0, height / 2.0);
		match self.create_radial_gradient(cx, cy, 0.0, cx, cy, width.max(height) * 0.7) {
			Ok(gradient) => {
				let _ = gradient.add_color_stop(0.0, &inner.to_css());
				let _ = gradient.add_color_stop(1.0, &outer.to_css());
				self.set_fill_style_canvas_gradient(&gradient);
			}
			Err(_) => self.set_fill_style_str(&outer.to_css()),
		}
		self.fill_rect(0.0, 0.0, width, height);
	}

	fn set_view(&mut self, view: &ViewTransform) {
		self.save();
		let _ = self.translate(view.x, view.y);
		let _ = self.scale(view.k, view.k);
	}

	fn reset_view(&mut self) {
		self.restore();
	}

	fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke, glow: Option<Glow>) {
		apply_glow(self, glow);
		self.set_stroke_style_str(&stroke.color.to_css());
		self.set_line_width(stroke.width);
		self.begin_path();
		self.move_to(from.0, from.1);
		self.line_to(to.0, to.1);
		self.stroke();
	}

	fn circle(
		&mut self,
		center: (f64, f64),
		radius: f64,
		fill: Color,
		border: Option<Stroke>,
		glow: Option<Glow>,
	) {
		apply_glow(self, glow);
		self.begin_path();
		let _ = self.arc(center.0, center.1, radius, 0.0, 2.0 * PI);
		self.set_fill_style_str(&fill.to_css());
		self.fill();

		if let Some(border) = border {
			apply_glow(self, None);
			self.set_stroke_style_str(&border.color.to_css());
			self.set_line_width(border.width);
			self.stroke();
		}
	}

	fn text(&mut self, text: &str, pos: (f64, f64), font: &str, fill: Color, shadow: Option<Glow>) {
		apply_glow(self, shadow);
		self.set_font(font);
		self.set_text_align("center");
		self.set_fill_style_str(&fill.to_css());
		let _ = self.fill_text(text, pos.0, pos.1);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::constellation::scene::HoverConfig;
	use crate::components::constellation::simulation::{ForceSimulation, SimulationConfig};
	use crate::components::constellation::sparkle::{Sparkle, SparkleConfig};
	use crate::components::constellation::subset::{SubsetLimits, select};
	use crate::components::constellation::types::{GraphNode, flatten_links, node};

	#[derive(Debug, PartialEq)]
	enum Op {
		Background,
		SetView(f64),
		ResetView,
		Line((f64, f64), (f64, f64)),
		Circle((f64, f64), f64, Color),
		Text(String, (f64, f64), String),
	}

	#[derive(Default)]
	struct Recorder(Vec<Op>);

	impl Canvas for Recorder {
		fn fill_background(&mut self, _: f64, _: f64, _: Color, _: Color) {
			self.0.push(Op::Background);
		}
		fn set_view(&mut self, view: &ViewTransform) {
			self.0.push(Op::SetView(view.k));
		}
		fn reset_view(&mut self) {
			self.0.push(Op::ResetView);
		}
		fn line(&mut self, from: (f64, f64), to: (f64, f64), _: Stroke, _: Option<Glow>) {
			self.0.push(Op::Line(from, to));
		}
		fn circle(
			&mut self,
			center: (f64, f64),
			radius: f64,
			fill: Color,
			_: Option<Stroke>,
			_: Option<Glow>,
		) {
			self.0.push(Op::Circle(center, radius, fill));
		}
		fn text(&mut self, text: &str, pos: (f64, f64), font: &str, _: Color, _: Option<Glow>) {
			self.0.push(Op::Text(text.into(), pos, font.into()));
		}
	}

	fn scene_of(nodes: &[GraphNode], hovered: Option<&str>) -> Scene {
		let links = flatten_links(nodes);
		let sim = ForceSimulation::new(
			select(nodes, &links, SubsetLimits::default()),
			800.0,
			600.0,
			SimulationConfig::default(),
		);
		let mut scene = Scene::new();
		let sparkle = Sparkle::new(SparkleConfig::default());
		scene.sync(&sim, hovered, &sparkle, &HoverConfig::default(), 0.0, 1.0);
		scene
	}

	fn draw(scene: &Scene, width: f64, height: f64) -> Vec<Op> {
		let mut rec = Recorder::default();
		render(
			scene,
			&ViewTransform::default(),
			width,
			height,
			&mut rec,
			&Theme::default(),
			&ScaleConfig::default(),
		);
		rec.0
	}

	#[test]
	fn test_empty_scene_draws_only_background() {
		let ops = draw(&Scene::new(), 800.0, 600.0);
		assert_eq!(ops, vec![Op::Background, Op::SetView(1.0), Op::ResetView]);
	}

	#[test]
	fn test_zero_sized_surface_is_noop() {
		let scene = scene_of(&[node("a", &[], &[])], None);
		assert!(draw(&scene, 0.0, 600.0).is_empty());
		assert!(draw(&scene, 800.0, -1.0).is_empty());
		assert!(draw(&scene, f64::NAN, 600.0).is_empty());
	}

	#[test]
	fn test_star_marker_sparkle_and_label() {
		let scene = scene_of(&[node("py", &["AI"], &[])], None);
		let star = scene.star("py").unwrap().clone();
		let ops = draw(&scene, 800.0, 600.0);

		assert!(ops.contains(&Op::Circle((star.x, star.y), 12.0, star.color)));
		assert!(ops.iter().any(|op| matches!(
			op,
			Op::Circle(c, r, _) if *c == (star.x, star.y) && (*r - 12.0 * 0.3).abs() < 1e-9
		)));
		assert!(ops.contains(&Op::Text(
			"PY".into(),
			(star.x, star.y - 12.0 - 5.0),
			"10px Arial, sans-serif".into()
		)));
	}

	#[test]
	fn test_lines_drawn_under_stars() {
		let scene = scene_of(&[node("a", &[], &["b"]), node("b", &[], &[])], None);
		let ops = draw(&scene, 800.0, 600.0);
		let line = ops.iter().position(|op| matches!(op, Op::Line(..))).unwrap();
		let first_star = ops.iter().position(|op| matches!(op, Op::Circle(..))).unwrap();
		assert!(line < first_star);
	}

	#[test]
	fn test_hovered_star_drawn_last() {
		let nodes = [node("a", &[], &[]), node("b", &[], &[])];
		let scene = scene_of(&nodes, Some("a"));
		let a = scene.star("a").unwrap().clone();
		let ops = draw(&scene, 800.0, 600.0);
		let last_marker = ops
			.iter()
			.rev()
			.find_map(|op| match op {
				Op::Circle(c, r, _) if *r > 5.0 => Some(*c),
				_ => None,
			})
			.unwrap();
		assert_eq!(last_marker, (a.x, a.y));
	}

	#[test]
	fn test_dangling_line_is_skipped() {
		let mut scene = scene_of(&[node("a", &[], &["b"]), node("b", &[], &[])], None);
		scene.push_line("a", "gone");
		let ops = draw(&scene, 800.0, 600.0);
		assert_eq!(ops.iter().filter(|op| matches!(op, Op::Line(..))).count(), 1);
	}
}

//! Owned visual state of every star, derived from the simulation each frame.
//!
//! The scene is keyed by node id and diffed against the simulation on every
//! [`Scene::sync`]: new nodes get an entry, vanished nodes are dropped, and
//! surviving entries keep their hover animation progress.

use std::collections::HashMap;

use serde::Deserialize;

use super::simulation::ForceSimulation;
use super::sparkle::{Sparkle, seed_for};
use super::theme::Color;

/// Hover enlargement and label emphasis.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct HoverConfig {
	/// Star radius multiplier while hovered.
	pub radius_scale: f64,
	pub label_px: f64,
	pub hover_label_px: f64,
	pub label_alpha: f64,
	pub hover_label_alpha: f64,
	pub transition_ms: u32,
}

impl Default for HoverConfig {
	fn default() -> Self {
		Self {
			radius_scale: 1.5,
			label_px: 10.0,
			hover_label_px: 12.0,
			label_alpha: 0.8,
			hover_label_alpha: 1.0,
			transition_ms: 200,
		}
	}
}

/// Visual state of one star.
#[derive(Clone, Debug, PartialEq)]
pub struct StarVisual {
	pub x: f64,
	pub y: f64,
	/// Current radius in world units, hover included.
	pub radius: f64,
	pub color: Color,
	pub label: String,
	pub label_px: f64,
	pub label_alpha: f64,
	/// Opacity of the inner sparkle marker.
	pub sparkle: f64,
	/// Hover animation progress, 0 (idle) to 1 (fully hovered).
	pub hover_t: f64,
	seed: u64,
}

/// A constellation line between two stars, by id.
#[derive(Clone, Debug, PartialEq)]
pub struct LineVisual {
	pub source: String,
	pub target: String,
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
	stars: HashMap<String, StarVisual>,
	/// Draw order (simulation order).
	order: Vec<String>,
	lines: Vec<LineVisual>,
}

fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

impl Scene {
	pub fn new() -> Self {
		Self::default()
	}

	#[cfg(test)]
	pub fn is_empty(&self) -> bool {
		self.stars.is_empty()
	}

	pub fn star(&self, id: &str) -> Option<&StarVisual> {
		self.stars.get(id)
	}

	/// Stars in draw order, with their ids.
	pub fn stars(&self) -> impl Iterator<Item = (&str, &StarVisual)> {
		self.order
			.iter()
			.filter_map(|id| self.stars.get(id).map(|s| (id.as_str(), s)))
	}

	pub fn lines(&self) -> &[LineVisual] {
		&self.lines
	}

	/// Brings the scene in line with the simulation. `now` is the session clock
	/// and `dt` the time since the previous sync, both in seconds.
	pub fn sync(
		&mut self,
		sim: &ForceSimulation,
		hovered: Option<&str>,
		sparkle: &Sparkle,
		hover: &HoverConfig,
		now: f64,
		dt: f64,
	) {
		let duration = f64::from(hover.transition_ms) / 1000.0;
		let step = if duration > 0.0 { dt / duration } else { 1.0 };

		self.stars.retain(|id, _| sim.index_of(id).is_some());
		self.order.clear();

		for node in sim.nodes() {
			let style = node.category.style();
			let star = self
				.stars
				.entry(node.id.clone())
				.or_insert_with(|| StarVisual {
					x: node.x,
					y: node.y,
					radius: style.radius,
					color: style.color,
					label: node.title.clone(),
					label_px: hover.label_px,
					label_alpha: hover.label_alpha,
					sparkle: 0.0,
					hover_t: 0.0,
					seed: seed_for(&node.id),
				});

			let target = if hovered == Some(node.id.as_str()) { 1.0 } else { 0.0 };
			if star.hover_t < target {
				star.hover_t = (star.hover_t + step).min(target);
			} else {
				star.hover_t = (star.hover_t - step).max(target);
			}
			let eased = smooth_step(star.hover_t);

			star.x = node.x;
			star.y = node.y;
			star.color = style.color;
			star.label.clone_from(&node.title);
			star.radius = style.radius * (1.0 + (hover.radius_scale - 1.0) * eased);
			star.label_px = hover.label_px + (hover.hover_label_px - hover.label_px) * eased;
			star.label_alpha =
				hover.label_alpha + (hover.hover_label_alpha - hover.label_alpha) * eased;
			star.sparkle = sparkle.opacity(star.seed, now);
			self.order.push(node.id.clone());
		}

		let nodes = sim.nodes();
		self.lines.clear();
		self.lines.extend(sim.links().iter().map(|l| LineVisual {
			source: nodes[l.source].id.clone(),
			target: nodes[l.target].id.clone(),
		}));
	}

	#[cfg(test)]
	pub(crate) fn push_line(&mut self, source: &str, target: &str) {
		self.lines.push(LineVisual {
			source: source.into(),
			target: target.into(),
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::constellation::category::Category;
	use crate::components::constellation::simulation::SimulationConfig;
	use crate::components::constellation::sparkle::SparkleConfig;
	use crate::components::constellation::subset::{SubsetLimits, select};
	use crate::components::constellation::types::{GraphNode, flatten_links, node};

	fn sim_of(nodes: &[GraphNode]) -> ForceSimulation {
		let links = flatten_links(nodes);
		let set = select(nodes, &links, SubsetLimits::default());
		ForceSimulation::new(set, 800.0, 600.0, SimulationConfig::default())
	}

	fn sync(scene: &mut Scene, sim: &ForceSimulation, hovered: Option<&str>, dt: f64) {
		let sparkle = Sparkle::new(SparkleConfig::default());
		scene.sync(sim, hovered, &sparkle, &HoverConfig::default(), 0.0, dt);
	}

	#[test]
	fn test_sync_mirrors_simulation() {
		let sim = sim_of(&[node("py", &["AI"], &["rs"]), node("rs", &[], &[])]);
		let mut scene = Scene::new();
		sync(&mut scene, &sim, None, 0.016);

		let py = scene.star("py").unwrap();
		let sim_py = sim.node("py").unwrap();
		assert_eq!((py.x, py.y), (sim_py.x, sim_py.y));
		assert_eq!(py.radius, Category::Ai.style().radius);
		assert_eq!(py.color, Category::Ai.style().color);
		assert_eq!(py.label, "PY");
		assert_eq!(py.label_alpha, 0.8);
		assert_eq!(
			scene.lines(),
			&[LineVisual {
				source: "py".into(),
				target: "rs".into(),
			}]
		);
		let ids: Vec<&str> = scene.stars().map(|(id, _)| id).collect();
		assert_eq!(ids, vec!["py", "rs"]);
	}

	#[test]
	fn test_hover_enlarges_and_reverts() {
		let sim = sim_of(&[node("py", &["AI"], &[])]);
		let mut scene = Scene::new();
		let base = Category::Ai.style().radius;

		sync(&mut scene, &sim, Some("py"), 0.1);
		let half = scene.star("py").unwrap().radius;
		assert!(half > base && half < base * 1.5);

		sync(&mut scene, &sim, Some("py"), 0.5);
		let star = scene.star("py").unwrap();
		assert_eq!(star.radius, base * 1.5);
		assert_eq!(star.label_px, 12.0);
		assert_eq!(star.label_alpha, 1.0);

		sync(&mut scene, &sim, None, 1.0);
		let star = scene.star("py").unwrap();
		assert_eq!(star.radius, base);
		assert_eq!(star.label_px, 10.0);
	}

	#[test]
	fn test_stale_stars_are_dropped() {
		let mut scene = Scene::new();
		sync(&mut scene, &sim_of(&[node("a", &[], &[]), node("b", &[], &[])]), None, 0.0);
		assert!(scene.star("b").is_some());
		sync(&mut scene, &sim_of(&[node("a", &[], &[])]), None, 0.0);
		assert!(scene.star("b").is_none());
		assert_eq!(scene.stars().count(), 1);
	}

	#[test]
	fn test_empty_simulation_gives_empty_scene() {
		let mut scene = Scene::new();
		sync(&mut scene, &sim_of(&[]), None, 0.016);
		assert!(scene.is_empty());
		assert!(scene.lines().is_empty());
	}
}

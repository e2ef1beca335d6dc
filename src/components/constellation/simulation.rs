//! Force-directed layout engine.
//!
//! A velocity-Verlet style solver in the manner of d3-force: every tick applies a
//! link spring, many-body repulsion (Barnes-Hut), centering and soft collision,
//! all scaled by a decaying `alpha`. Once `alpha` drops below `alpha_min` the
//! engine goes inert until the next pin/unpin or [`ForceSimulation::reheat`].

use std::collections::HashMap;
use std::f64::consts::PI;

use log::debug;
use serde::Deserialize;

use super::category::{Category, classify};
use super::quadtree::QuadNode;
use super::subset::WorkingSet;

/// Tunables for the force layout.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
	/// Rest length of every link spring.
	pub link_distance: f64,
	/// Spring stiffness of every link, independent of relationship.
	pub link_strength: f64,
	/// Many-body charge; negative values repel.
	pub charge_strength: f64,
	/// Barnes-Hut accuracy; cells with `side / distance < theta` are approximated.
	pub theta: f64,
	/// Distance below which repulsion stops growing.
	pub distance_min: f64,
	/// Minimum center-to-center separation kept between any two stars.
	pub collide_radius: f64,
	pub collide_strength: f64,
	/// Fraction of the centroid offset removed each tick.
	pub center_strength: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	/// Alpha target held while at least one node is pinned.
	pub alpha_target_drag: f64,
	/// Alpha is raised to at least this on every pin, unpin or reheat.
	pub reheat_alpha: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_distance: 100.0,
			link_strength: 0.3,
			charge_strength: -200.0,
			theta: 0.9,
			distance_min: 1.0,
			collide_radius: 20.0,
			collide_strength: 1.0,
			center_strength: 1.0,
			alpha_min,
			// Cools from 1.0 to alpha_min in ~300 ticks.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			alpha_target_drag: 0.3,
			reheat_alpha: 0.3,
			velocity_decay: 0.4,
		}
	}
}

/// A node in the working set, owned by the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct SimNode {
	pub id: String,
	pub title: String,
	pub content: String,
	pub tags: Vec<String>,
	pub category: Category,
	/// Out-degree in the full input graph.
	pub degree: usize,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Position override while the node is dragged.
	pub pin: Option<(f64, f64)>,
	pub collide_radius: f64,
}

/// A link whose endpoints are indices into [`ForceSimulation::nodes`].
#[derive(Clone, Debug, PartialEq)]
pub struct SimLink {
	pub source: usize,
	pub target: usize,
	pub relationship: String,
}

/// Deterministic linear congruential generator, used only to break exact
/// coincidences between nodes.
#[derive(Clone, Debug)]
struct Lcg(u32);

impl Lcg {
	fn next(&mut self) -> f64 {
		self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		self.0 as f64 / 4_294_967_296.0
	}

	fn jiggle(&mut self) -> f64 {
		(self.next() - 0.5) * 1e-6
	}
}

#[derive(Clone, Copy)]
struct ChargeParams {
	strength: f64,
	theta2: f64,
	distance_min2: f64,
}

/// The physics engine of one constellation instance.
pub struct ForceSimulation {
	nodes: Vec<SimNode>,
	links: Vec<SimLink>,
	index: HashMap<String, usize>,
	/// Share of each link's correction applied to its target.
	link_bias: Vec<f64>,
	config: SimulationConfig,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	active: bool,
	rng: Lcg,
}

impl ForceSimulation {
	/// Builds the simulation for a working set, laying nodes out on a
	/// phyllotaxis spiral around the canvas center.
	pub fn new(set: WorkingSet, width: f64, height: f64, config: SimulationConfig) -> Self {
		let center = (width / 2.0, height / 2.0);
		let golden_angle = PI * (3.0 - 5f64.sqrt());

		let mut index = HashMap::with_capacity(set.nodes.len());
		let nodes: Vec<SimNode> = set
			.nodes
			.into_iter()
			.enumerate()
			.map(|(i, ranked)| {
				let radius = 10.0 * (0.5 + i as f64).sqrt();
				let angle = i as f64 * golden_angle;
				index.insert(ranked.node.id.clone(), i);
				SimNode {
					category: classify(&ranked.node.tags),
					degree: ranked.degree,
					id: ranked.node.id,
					title: ranked.node.title,
					content: ranked.node.content,
					tags: ranked.node.tags,
					x: center.0 + radius * angle.cos(),
					y: center.1 + radius * angle.sin(),
					vx: 0.0,
					vy: 0.0,
					pin: None,
					collide_radius: config.collide_radius,
				}
			})
			.collect();

		let links: Vec<SimLink> = set
			.links
			.into_iter()
			.filter_map(|link| {
				let (&source, &target) = (index.get(&link.source)?, index.get(&link.target)?);
				Some(SimLink {
					source,
					target,
					relationship: link.relationship,
				})
			})
			.collect();

		let mut counts = vec![0usize; nodes.len()];
		for link in &links {
			counts[link.source] += 1;
			counts[link.target] += 1;
		}
		let link_bias = links
			.iter()
			.map(|l| counts[l.source] as f64 / (counts[l.source] + counts[l.target]) as f64)
			.collect();

		let active = !nodes.is_empty();
		Self {
			nodes,
			links,
			index,
			link_bias,
			config,
			center,
			alpha: 1.0,
			alpha_target: 0.0,
			active,
			rng: Lcg(1),
		}
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn links(&self) -> &[SimLink] {
		&self.links
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	#[cfg(test)]
	pub fn node(&self, id: &str) -> Option<&SimNode> {
		self.index_of(id).map(|i| &self.nodes[i])
	}

	#[cfg(test)]
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	#[cfg(test)]
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Whether the next [`tick`](Self::tick) will move anything.
	pub fn is_active(&self) -> bool {
		self.active
	}

	#[cfg(test)]
	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	/// Returns the closest node whose center lies within `radius(node)` of
	/// `(x, y)`, in simulation space.
	pub fn find(&self, x: f64, y: f64, radius: impl Fn(&SimNode) -> f64) -> Option<usize> {
		self.nodes
			.iter()
			.enumerate()
			.filter_map(|(i, n)| {
				let d2 = (n.x - x).powi(2) + (n.y - y).powi(2);
				let r = radius(n);
				(d2 <= r * r).then_some((i, d2))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(i, _)| i)
	}

	/// Advances the layout by one step. Returns `false` without touching any
	/// node when the engine is inert.
	pub fn tick(&mut self) -> bool {
		if !self.active {
			return false;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		self.apply_links();
		self.apply_charge();
		self.apply_center();
		self.apply_collision();

		let keep = 1.0 - self.config.velocity_decay;
		for node in &mut self.nodes {
			match node.pin {
				Some((px, py)) => {
					node.x = px;
					node.y = py;
					node.vx = 0.0;
					node.vy = 0.0;
				}
				None => {
					node.vx *= keep;
					node.vy *= keep;
					node.x += node.vx;
					node.y += node.vy;
				}
			}
		}

		if self.alpha < self.config.alpha_min {
			self.active = false;
			debug!("constellation: layout settled ({} nodes)", self.nodes.len());
		}
		true
	}

	/// Holds node `id` at `(x, y)` from the next tick on and reheats the layout.
	/// Returns `false` if the id is not in the working set.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) -> bool {
		let Some(i) = self.index_of(id) else {
			return false;
		};
		self.nodes[i].pin = Some((x, y));
		self.alpha_target = self.config.alpha_target_drag;
		self.reheat();
		true
	}

	/// Releases node `id` back to the forces. The alpha target relaxes to zero
	/// once no pins remain.
	pub fn unpin(&mut self, id: &str) -> bool {
		let Some(i) = self.index_of(id) else {
			return false;
		};
		self.nodes[i].pin = None;
		if self.nodes.iter().all(|n| n.pin.is_none()) {
			self.alpha_target = 0.0;
		}
		self.reheat();
		true
	}

	/// Raises alpha to at least `reheat_alpha` and resumes ticking.
	pub fn reheat(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		self.alpha = self.alpha.max(self.config.reheat_alpha);
		if !self.active {
			debug!("constellation: layout reheated");
		}
		self.active = true;
	}

	/// Makes the engine inert immediately. A later pin, unpin or reheat
	/// restarts it.
	pub fn stop(&mut self) {
		self.active = false;
		self.alpha_target = 0.0;
	}

	fn apply_links(&mut self) {
		let strength = self.config.link_strength * self.alpha;
		let distance = self.config.link_distance;
		for (link, &bias) in self.links.iter().zip(&self.link_bias) {
			let (s, t) = (link.source, link.target);
			if s == t {
				continue;
			}
			let mut dx = self.nodes[t].x + self.nodes[t].vx - self.nodes[s].x - self.nodes[s].vx;
			let mut dy = self.nodes[t].y + self.nodes[t].vy - self.nodes[s].y - self.nodes[s].vy;
			if dx == 0.0 {
				dx = self.rng.jiggle();
			}
			if dy == 0.0 {
				dy = self.rng.jiggle();
			}
			let l = (dx * dx + dy * dy).sqrt();
			let f = (l - distance) / l * strength;
			dx *= f;
			dy *= f;
			self.nodes[t].vx -= dx * bias;
			self.nodes[t].vy -= dy * bias;
			self.nodes[s].vx += dx * (1.0 - bias);
			self.nodes[s].vy += dy * (1.0 - bias);
		}
	}

	fn apply_charge(&mut self) {
		let positions: Vec<(f64, f64)> = self.nodes.iter().map(|n| (n.x, n.y)).collect();
		let Some(tree) = QuadNode::build(&positions) else {
			return;
		};
		let params = ChargeParams {
			strength: self.config.charge_strength * self.alpha,
			theta2: self.config.theta * self.config.theta,
			distance_min2: self.config.distance_min * self.config.distance_min,
		};
		for (i, node) in self.nodes.iter_mut().enumerate() {
			let mut force = (0.0, 0.0);
			accumulate_charge(&tree, i, &positions, params, &mut self.rng, &mut force);
			node.vx += force.0;
			node.vy += force.1;
		}
	}

	fn apply_center(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		let n = self.nodes.len() as f64;
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let shift_x = (sx / n - self.center.0) * self.config.center_strength;
		let shift_y = (sy / n - self.center.1) * self.config.center_strength;
		for node in &mut self.nodes {
			node.x -= shift_x;
			node.y -= shift_y;
		}
	}

	fn apply_collision(&mut self) {
		let strength = self.config.collide_strength;
		let count = self.nodes.len();
		for i in 0..count {
			let ri = self.nodes[i].collide_radius;
			let ri2 = ri * ri;
			let xi = self.nodes[i].x + self.nodes[i].vx;
			let yi = self.nodes[i].y + self.nodes[i].vy;
			for j in (i + 1)..count {
				let rj = self.nodes[j].collide_radius;
				let r = ri + rj;
				let mut dx = xi - self.nodes[j].x - self.nodes[j].vx;
				let mut dy = yi - self.nodes[j].y - self.nodes[j].vy;
				let mut l = dx * dx + dy * dy;
				if l >= r * r {
					continue;
				}
				if dx == 0.0 {
					dx = self.rng.jiggle();
					l += dx * dx;
				}
				if dy == 0.0 {
					dy = self.rng.jiggle();
					l += dy * dy;
				}
				let dist = l.sqrt();
				let push = (r - dist) / dist * strength;
				dx *= push;
				dy *= push;
				let share = rj * rj / (ri2 + rj * rj);
				self.nodes[i].vx += dx * share;
				self.nodes[i].vy += dy * share;
				self.nodes[j].vx -= dx * (1.0 - share);
				self.nodes[j].vy -= dy * (1.0 - share);
			}
		}
	}
}

fn accumulate_charge(
	cell: &QuadNode,
	index: usize,
	positions: &[(f64, f64)],
	params: ChargeParams,
	rng: &mut Lcg,
	force: &mut (f64, f64),
) {
	if cell.mass <= 0.0 {
		return;
	}
	let (px, py) = positions[index];

	if !cell.is_leaf() {
		let dx = cell.center_of_mass.0 - px;
		let dy = cell.center_of_mass.1 - py;
		let mut l = dx * dx + dy * dy;
		let side = cell.bounds.side_length();
		if side * side / params.theta2 < l {
			if l < params.distance_min2 {
				l = (params.distance_min2 * l).sqrt();
			}
			let w = params.strength * cell.mass / l;
			force.0 += dx * w;
			force.1 += dy * w;
			return;
		}
		for child in cell.children.iter().flatten() {
			accumulate_charge(child, index, positions, params, rng, force);
		}
		return;
	}

	for &other in &cell.indices {
		if other == index {
			continue;
		}
		let mut dx = positions[other].0 - px;
		let mut dy = positions[other].1 - py;
		let mut l = dx * dx + dy * dy;
		if dx == 0.0 {
			dx = rng.jiggle();
			l += dx * dx;
		}
		if dy == 0.0 {
			dy = rng.jiggle();
			l += dy * dy;
		}
		if l < params.distance_min2 {
			l = (params.distance_min2 * l).sqrt();
		}
		let w = params.strength / l;
		force.0 += dx * w;
		force.1 += dy * w;
	}
}

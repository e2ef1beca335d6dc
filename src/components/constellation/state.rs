//! The per-instance constellation session.
//!
//! [`ConstellationState`] owns everything one rendered graph needs: the input
//! graph, the working set's simulation, the interaction controller, the scene
//! and the sparkle schedule. The hosting component drives it with
//! [`frame`](ConstellationState::frame) and
//! [`sparkle`](ConstellationState::sparkle) from two independent timers and
//! forwards input events to it. After [`stop`](ConstellationState::stop) every
//! driver and input method is a no-op.

use log::{info, warn};

use super::config::ConstellationConfig;
use super::interaction::{InteractionController, PointerState};
use super::render::{self, Canvas};
use super::scale::ScaleConfig;
use super::scene::Scene;
use super::simulation::ForceSimulation;
use super::sparkle::Sparkle;
use super::subset::select;
use super::theme::Theme;
use super::types::GraphData;

/// One running constellation: layout, view, scene and sparkle schedule.
pub struct ConstellationState {
	config: ConstellationConfig,
	graph: GraphData,
	sim: ForceSimulation,
	controller: InteractionController,
	scene: Scene,
	sparkle: Sparkle,
	theme: Theme,
	scale: ScaleConfig,
	width: f64,
	height: f64,
	/// Seconds of frame time since start.
	clock: f64,
	running: bool,
}

impl ConstellationState {
	/// Selects the working set of `graph` and starts a fresh layout centered on
	/// a `width` x `height` surface. An unusable `config` is replaced by the
	/// defaults.
	pub fn start(config: ConstellationConfig, graph: GraphData, width: f64, height: f64) -> Self {
		let config = match config.validate() {
			Ok(()) => config,
			Err(e) => {
				warn!("constellation: {}, using defaults", e);
				ConstellationConfig::default()
			}
		};
		let scale = ScaleConfig::default();
		let mut state = Self {
			controller: InteractionController::new(config.zoom, scale.clone(), &config.hover),
			sim: ForceSimulation::new(Default::default(), width, height, config.simulation),
			scene: Scene::new(),
			sparkle: Sparkle::new(config.sparkle),
			theme: Theme::default(),
			scale,
			config,
			graph,
			width,
			height,
			clock: 0.0,
			running: true,
		};
		state.rebuild();
		state
	}

	/// Replaces the input graph and re-derives the working set. The view
	/// transform is kept.
	pub fn update(&mut self, graph: GraphData) {
		if !self.running {
			return;
		}
		self.graph = graph;
		self.rebuild();
	}

	/// Adapts to a new surface size, re-centering the layout.
	pub fn resize(&mut self, width: f64, height: f64) {
		if !self.running || (width == self.width && height == self.height) {
			return;
		}
		self.width = width;
		self.height = height;
		self.rebuild();
	}

	fn rebuild(&mut self) {
		let set = select(&self.graph.nodes, &self.graph.links, self.config.subset);
		info!(
			"constellation: working set {}/{} nodes, {}/{} links",
			set.nodes.len(),
			self.graph.total_nodes(),
			set.links.len(),
			self.graph.total_links()
		);
		self.sim = ForceSimulation::new(set, self.width, self.height, self.config.simulation);
		self.controller.reset_gestures();
		self.scene.sync(
			&self.sim,
			None,
			&self.sparkle,
			&self.config.hover,
			self.clock,
			0.0,
		);
	}

	/// Advances one animation frame of `dt` seconds: one physics tick, then the
	/// scene is brought up to date. Returns whether any node moved.
	pub fn frame(&mut self, dt: f64) -> bool {
		if !self.running {
			return false;
		}
		let dt = dt.max(0.0);
		self.clock += dt;
		let moved = self.sim.tick();
		self.scene.sync(
			&self.sim,
			self.controller.hovered(),
			&self.sparkle,
			&self.config.hover,
			self.clock,
			dt,
		);
		moved
	}

	/// Starts the next sparkle fade. Called from the coarse sparkle timer.
	pub fn sparkle(&mut self) {
		if self.running {
			self.sparkle.advance(self.clock);
		}
	}

	/// Halts the session for good: the layout goes inert, gestures are dropped,
	/// and every later driver or input call is ignored.
	pub fn stop(&mut self) {
		if !self.running {
			return;
		}
		self.running = false;
		self.sim.stop();
		self.controller.reset_gestures();
		info!("constellation: stopped");
	}

	/// `false` once [`stop`](Self::stop) has been called.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Whether the layout has cooled and frames no longer move anything.
	pub fn is_settled(&self) -> bool {
		!self.sim.is_active()
	}

	/// Draws the current scene onto `canvas`.
	pub fn render(&self, canvas: &mut impl Canvas) {
		render::render(
			&self.scene,
			self.controller.transform(),
			self.width,
			self.height,
			canvas,
			&self.theme,
			&self.scale,
		);
	}

	/// Press at a screen point: grabs the star under it or starts a pan.
	/// Returns `true` when a star was grabbed.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) -> bool {
		self.running && self.controller.pointer_down(&mut self.sim, sx, sy)
	}

	/// Pointer motion: drags, pans, or updates the hovered star.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if self.running {
			self.controller.pointer_move(&mut self.sim, sx, sy);
		}
	}

	/// Release: ends the current drag or pan.
	pub fn pointer_up(&mut self) {
		if self.running {
			self.controller.pointer_up(&mut self.sim);
		}
	}

	/// The pointer left the surface. Ends any gesture and clears hover.
	pub fn pointer_leave(&mut self) {
		if self.running {
			self.controller.pointer_leave(&mut self.sim);
		}
	}

	/// Wheel zoom around the screen point `(sx, sy)`.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		if self.running {
			self.controller.wheel(sx, sy, delta_y);
		}
	}

	/// Two touches went down `distance` pixels apart.
	pub fn pinch_start(&mut self, distance: f64) {
		if self.running {
			self.controller.pinch_start(&mut self.sim, distance);
		}
	}

	/// Pinch update: zooms around the midpoint `(cx, cy)`.
	pub fn pinch_move(&mut self, cx: f64, cy: f64, distance: f64) {
		if self.running {
			self.controller.pinch_move(cx, cy, distance);
		}
	}

	/// One of the pinch touches lifted.
	pub fn pinch_end(&mut self) {
		self.controller.pinch_end();
	}

	/// CSS cursor matching the current gesture.
	pub fn cursor(&self) -> &'static str {
		match self.controller.pointer() {
			PointerState::Dragging { .. } | PointerState::Panning { .. } => "grabbing",
			PointerState::Idle if self.controller.hovered().is_some() => "pointer",
			PointerState::Idle => "grab",
		}
	}

	/// The validated configuration in use.
	pub fn config(&self) -> &ConstellationConfig {
		&self.config
	}

	/// The full input graph.
	pub fn graph(&self) -> &GraphData {
		&self.graph
	}

	#[cfg(test)]
	pub(crate) fn simulation(&self) -> &ForceSimulation {
		&self.sim
	}

	#[cfg(test)]
	pub(crate) fn scene(&self) -> &Scene {
		&self.scene
	}

	#[cfg(test)]
	pub(crate) fn transform(&self) -> &super::interaction::ViewTransform {
		self.controller.transform()
	}

	/// Id of the star under the pointer, if any.
	pub fn hovered(&self) -> Option<&str> {
		self.controller.hovered()
	}

	/// Surface size in CSS pixels.
	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::constellation::types::{GraphNode, node};

	fn graph(nodes: Vec<GraphNode>) -> GraphData {
		GraphData::from_nodes(nodes)
	}

	fn pair() -> GraphData {
		graph(vec![node("a", &[], &["b"]), node("b", &[], &[])])
	}

	fn positions(state: &ConstellationState) -> Vec<(f64, f64)> {
		state.simulation().nodes().iter().map(|n| (n.x, n.y)).collect()
	}

	fn screen_pos(state: &ConstellationState, id: &str) -> (f64, f64) {
		let n = state.simulation().node(id).unwrap();
		state.transform().world_to_screen(n.x, n.y)
	}

	#[test]
	fn test_start_selects_working_set() {
		let nodes = vec![
			node("A", &[], &["B", "C"]),
			node("B", &[], &["C"]),
			node("C", &[], &[]),
		];
		let mut config = ConstellationConfig::default();
		config.subset.max_nodes = 2;
		let state = ConstellationState::start(config, graph(nodes), 800.0, 600.0);

		let ids: Vec<&str> = state
			.simulation()
			.nodes()
			.iter()
			.map(|n| n.id.as_str())
			.collect();
		assert_eq!(ids, vec!["A", "B"]);
		assert_eq!(state.simulation().links().len(), 1);
		assert_eq!(state.scene().lines().len(), 1);
		assert!(state.scene().star("C").is_none());
	}

	#[test]
	fn test_frames_move_nodes_until_settled() {
		let mut state =
			ConstellationState::start(ConstellationConfig::default(), pair(), 800.0, 600.0);
		let before = positions(&state);
		assert!(state.frame(0.016));
		assert_ne!(positions(&state), before);

		for _ in 0..1000 {
			state.frame(0.016);
		}
		assert!(state.is_settled());
		assert!(!state.frame(0.016));
	}

	#[test]
	fn test_drag_pins_then_releases() {
		let mut state =
			ConstellationState::start(ConstellationConfig::default(), pair(), 800.0, 600.0);
		let (sx, sy) = screen_pos(&state, "a");

		assert!(state.pointer_down(sx, sy));
		assert_eq!(state.cursor(), "grabbing");
		state.pointer_move(sx + 30.0, sy + 40.0);
		state.frame(0.016);
		let a = state.simulation().node("a").unwrap();
		assert_eq!((a.x, a.y), (sx + 30.0, sy + 40.0));

		state.pointer_up();
		assert!(state.simulation().node("a").unwrap().pin.is_none());
		let released = positions(&state);
		for _ in 0..5 {
			state.frame(0.016);
		}
		assert_ne!(positions(&state), released);
	}

	#[test]
	fn test_stop_halts_all_mutation() {
		let mut state =
			ConstellationState::start(ConstellationConfig::default(), pair(), 800.0, 600.0);
		state.frame(0.016);
		let (sx, sy) = screen_pos(&state, "a");
		state.stop();
		assert!(!state.is_running());

		let frozen = positions(&state);
		let transform = *state.transform();
		assert!(!state.frame(0.016));
		assert!(!state.pointer_down(sx, sy));
		state.pointer_move(sx + 50.0, sy);
		state.wheel(sx, sy, -100.0);
		state.sparkle();
		state.update(graph(vec![node("z", &[], &[])]));
		state.resize(100.0, 100.0);
		for _ in 0..10 {
			state.frame(0.016);
		}

		assert_eq!(positions(&state), frozen);
		assert_eq!(*state.transform(), transform);
		assert!(state.simulation().node("z").is_none());
		assert_eq!(state.size(), (800.0, 600.0));
	}

	#[test]
	fn test_update_rebuilds_and_keeps_view() {
		let mut state =
			ConstellationState::start(ConstellationConfig::default(), pair(), 800.0, 600.0);
		state.wheel(400.0, 300.0, -1.0);
		let transform = *state.transform();

		state.update(graph(vec![node("x", &["クラウド"], &[]), node("y", &[], &["x"])]));
		assert!(state.simulation().node("a").is_none());
		assert!(state.scene().star("x").is_some());
		assert!(state.scene().star("a").is_none());
		assert_eq!(*state.transform(), transform);
	}

	#[test]
	fn test_unusable_config_falls_back_to_defaults() {
		let mut config = ConstellationConfig::default();
		config.zoom.min = 5.0;
		config.zoom.max = 1.0;
		let mut state = ConstellationState::start(config, pair(), 800.0, 600.0);
		assert_eq!(state.config().zoom, ConstellationConfig::default().zoom);
		state.wheel(10.0, 10.0, -1.0);
		assert!((state.transform().k - 1.1).abs() < 1e-12);
	}

	#[test]
	fn test_resize_recenters_layout() {
		let mut state =
			ConstellationState::start(ConstellationConfig::default(), pair(), 800.0, 600.0);
		state.resize(400.0, 200.0);
		assert_eq!(state.size(), (400.0, 200.0));
		assert_eq!(state.simulation().center(), (200.0, 100.0));
	}

	#[test]
	fn test_empty_graph_is_valid() {
		let mut state = ConstellationState::start(
			ConstellationConfig::default(),
			GraphData::default(),
			800.0,
			600.0,
		);
		assert!(state.scene().is_empty());
		assert!(!state.frame(0.016));
		assert!(!state.pointer_down(400.0, 300.0));
		state.pointer_up();
		assert_eq!(state.cursor(), "grab");
	}

	#[test]
	fn test_hover_cursor() {
		let mut state =
			ConstellationState::start(ConstellationConfig::default(), pair(), 800.0, 600.0);
		let (sx, sy) = screen_pos(&state, "b");
		state.pointer_move(sx, sy);
		assert_eq!(state.hovered(), Some("b"));
		assert_eq!(state.cursor(), "pointer");
		state.pointer_leave();
		assert_eq!(state.cursor(), "grab");
	}
}

//! Pointer, wheel and pinch handling.
//!
//! Translates screen-space input into simulation pins and view-transform changes.
//! One controller exists per constellation instance; it never touches node data
//! other than through [`ForceSimulation::pin`] and [`ForceSimulation::unpin`].

use serde::Deserialize;

use super::scale::{ScaleConfig, ScaledValues};
use super::scene::HoverConfig;
use super::simulation::ForceSimulation;

/// Allowed zoom range and wheel sensitivity.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ZoomLimits {
	pub min: f64,
	pub max: f64,
	/// Zoom factor applied per wheel notch.
	pub wheel_step: f64,
}

impl Default for ZoomLimits {
	fn default() -> Self {
		Self {
			min: 0.1,
			max: 10.0,
			wheel_step: 1.1,
		}
	}
}

impl ZoomLimits {
	/// Clamps `k` into `[min, max]`. Never panics, even on inverted limits.
	pub fn clamp(&self, k: f64) -> f64 {
		if k.is_nan() {
			return self.min;
		}
		k.max(self.min).min(self.max)
	}

	/// Checks that the limits describe a usable, positive zoom range.
	pub fn validate(&self) -> Result<(), String> {
		if !(self.min.is_finite() && self.max.is_finite() && self.min > 0.0) {
			return Err(format!("zoom.min must be positive and finite, got {}", self.min));
		}
		if self.max < self.min {
			return Err(format!(
				"zoom.max ({}) must not be below zoom.min ({})",
				self.max, self.min
			));
		}
		if !(self.wheel_step.is_finite() && self.wheel_step > 0.0) {
			return Err(format!(
				"zoom.wheel_step must be positive and finite, got {}",
				self.wheel_step
			));
		}
		Ok(())
	}
}

/// Pan and zoom transform applied to the entire scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	#[cfg(test)]
	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}

	/// Scales by `factor` around the screen point `(sx, sy)`, which stays fixed
	/// unless the clamp kicks in.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, limits: &ZoomLimits) {
		let new_k = limits.clamp(self.k * factor);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

/// What the primary pointer is currently doing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PointerState {
	#[default]
	Idle,
	/// A node is pinned under the pointer.
	Dragging { node: String },
	/// The background is being dragged.
	Panning {
		start: (f64, f64),
		origin: (f64, f64),
	},
}

pub struct InteractionController {
	pointer: PointerState,
	/// Distance between the two touches of an active pinch.
	pinch: Option<f64>,
	transform: ViewTransform,
	hovered: Option<String>,
	zoom: ZoomLimits,
	scale: ScaleConfig,
	hover_radius_scale: f64,
}

impl InteractionController {
	pub fn new(zoom: ZoomLimits, scale: ScaleConfig, hover: &HoverConfig) -> Self {
		Self {
			pointer: PointerState::Idle,
			pinch: None,
			transform: ViewTransform::default(),
			hovered: None,
			zoom,
			scale,
			hover_radius_scale: hover.radius_scale,
		}
	}

	pub fn transform(&self) -> &ViewTransform {
		&self.transform
	}

	pub fn pointer(&self) -> &PointerState {
		&self.pointer
	}

	pub fn hovered(&self) -> Option<&str> {
		self.hovered.as_deref()
	}

	#[cfg(test)]
	pub fn is_dragging(&self) -> bool {
		matches!(self.pointer, PointerState::Dragging { .. })
	}

	/// Node id under the screen point, if any.
	pub fn pick(&self, sim: &ForceSimulation, sx: f64, sy: f64) -> Option<String> {
		let (wx, wy) = self.transform.screen_to_world(sx, sy);
		let scaled = ScaledValues::new(&self.scale, self.transform.k);
		let hovered = self.hovered.as_deref();
		sim.find(wx, wy, |node| {
			let mut radius = node.category.style().radius;
			if hovered == Some(node.id.as_str()) {
				radius *= self.hover_radius_scale;
			}
			scaled.hit_radius(radius)
		})
		.map(|i| sim.nodes()[i].id.clone())
	}

	/// Starts dragging the node under the pointer, or panning if there is none.
	/// A gesture still in progress is ended first. Returns `true` when a node
	/// was grabbed.
	pub fn pointer_down(&mut self, sim: &mut ForceSimulation, sx: f64, sy: f64) -> bool {
		self.pointer_up(sim);
		if let Some(id) = self.pick(sim, sx, sy) {
			let (wx, wy) = self.transform.screen_to_world(sx, sy);
			sim.pin(&id, wx, wy);
			self.hovered = Some(id.clone());
			self.pointer = PointerState::Dragging { node: id };
			true
		} else {
			self.pointer = PointerState::Panning {
				start: (sx, sy),
				origin: (self.transform.x, self.transform.y),
			};
			false
		}
	}

	pub fn pointer_move(&mut self, sim: &mut ForceSimulation, sx: f64, sy: f64) {
		match &self.pointer {
			PointerState::Dragging { node } => {
				let (wx, wy) = self.transform.screen_to_world(sx, sy);
				sim.pin(node, wx, wy);
			}
			PointerState::Panning { start, origin } => {
				self.transform.x = origin.0 + (sx - start.0);
				self.transform.y = origin.1 + (sy - start.1);
			}
			PointerState::Idle => {
				self.hovered = self.pick(sim, sx, sy);
			}
		}
	}

	/// Ends a drag (releasing the pin) or a pan.
	pub fn pointer_up(&mut self, sim: &mut ForceSimulation) {
		if let PointerState::Dragging { node } = std::mem::take(&mut self.pointer) {
			sim.unpin(&node);
		}
	}

	/// Pointer left the surface: end any gesture and clear hover.
	pub fn pointer_leave(&mut self, sim: &mut ForceSimulation) {
		self.pointer_up(sim);
		self.pinch = None;
		self.hovered = None;
	}

	/// Zooms one wheel notch around the pointer. Negative `delta_y` zooms in.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		if delta_y == 0.0 {
			return;
		}
		let factor = if delta_y < 0.0 {
			self.zoom.wheel_step
		} else {
			1.0 / self.zoom.wheel_step
		};
		self.zoom_by(sx, sy, factor);
	}

	pub fn zoom_by(&mut self, sx: f64, sy: f64, factor: f64) {
		if !factor.is_finite() || factor <= 0.0 {
			return;
		}
		self.transform.zoom_at(sx, sy, factor, &self.zoom);
	}

	/// Begins a two-finger pinch; cancels any single-pointer gesture.
	pub fn pinch_start(&mut self, sim: &mut ForceSimulation, distance: f64) {
		self.pointer_up(sim);
		self.pinch = (distance > 0.0).then_some(distance);
	}

	/// Zooms around the pinch midpoint by the change in finger distance.
	pub fn pinch_move(&mut self, cx: f64, cy: f64, distance: f64) {
		let Some(last) = self.pinch else {
			return;
		};
		if distance <= 0.0 {
			return;
		}
		self.zoom_by(cx, cy, distance / last);
		self.pinch = Some(distance);
	}

	pub fn pinch_end(&mut self) {
		self.pinch = None;
	}

	/// Drops gesture state that refers to a discarded simulation. The view
	/// transform is kept.
	pub fn reset_gestures(&mut self) {
		self.pointer = PointerState::Idle;
		self.pinch = None;
		self.hovered = None;
	}
}

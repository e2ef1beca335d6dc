//! Zoom-dependent sizing of labels, lines and hit targets.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: simulation coordinates. The view transform is applied to the
//!   canvas before stars and lines are drawn, so world sizes grow when zoomed in.
//! - **Screen-space**: canvas pixels, unaffected by zoom.
//!
//! Stars and lines scale with the scene like the rest of the constellation;
//! labels and pointer hit targets are kept within screen-space bounds so they
//! stay readable and grabbable at extreme zoom levels.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space value to draw with, for a base value at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match *self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			// screen_size = world_size * k
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Scaling rules for every zoom-dependent element.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleConfig {
	pub star_radius: ScaleBehavior,
	pub link_width: ScaleBehavior,
	pub label: ScaleBehavior,
	/// Extra grab distance around a star, in screen pixels.
	pub hit_padding: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			star_radius: ScaleBehavior::Clamped {
				min_screen: 1.5,
				max_screen: f64::INFINITY,
			},
			link_width: ScaleBehavior::World,
			label: ScaleBehavior::Clamped {
				min_screen: 7.0,
				max_screen: 32.0,
			},
			hit_padding: 4.0,
		}
	}
}

/// Scale rules resolved for one zoom level.
///
/// Create this once per frame and pass it to rendering and hit-testing.
#[derive(Clone, Debug)]
pub struct ScaledValues<'a> {
	pub k: f64,
	config: &'a ScaleConfig,
}

impl<'a> ScaledValues<'a> {
	pub fn new(config: &'a ScaleConfig, k: f64) -> Self {
		Self { k, config }
	}

	pub fn star_radius(&self, base: f64) -> f64 {
		self.config.star_radius.apply(base, self.k)
	}

	pub fn link_width(&self, base: f64) -> f64 {
		self.config.link_width.apply(base, self.k)
	}

	pub fn label_px(&self, base: f64) -> f64 {
		self.config.label.apply(base, self.k)
	}

	/// Pointer pick radius for a star drawn at `radius` world units.
	pub fn hit_radius(&self, radius: f64) -> f64 {
		self.star_radius(radius) + self.config.hit_padding / self.k
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_world_and_screen_behaviors() {
		assert_eq!(ScaleBehavior::World.apply(8.0, 4.0), 8.0);
		assert_eq!(ScaleBehavior::Screen.apply(8.0, 4.0), 2.0);
	}

	#[test]
	fn test_clamped_keeps_screen_size_in_bounds() {
		let label = ScaleBehavior::Clamped {
			min_screen: 7.0,
			max_screen: 32.0,
		};
		// 10 world px at k=0.1 is 1 screen px: clamped up to 7 screen px.
		assert!((label.apply(10.0, 0.1) * 0.1 - 7.0).abs() < 1e-9);
		// 10 world px at k=10 is 100 screen px: clamped down to 32.
		assert!((label.apply(10.0, 10.0) * 10.0 - 32.0).abs() < 1e-9);
		assert_eq!(label.apply(10.0, 1.0), 10.0);
	}

	#[test]
	fn test_hit_radius_pads_in_screen_space() {
		let config = ScaleConfig::default();
		let scaled = ScaledValues::new(&config, 2.0);
		assert_eq!(scaled.hit_radius(8.0), 8.0 + 2.0);
	}
}

//! Twinkling of the inner star markers.
//!
//! The sparkle runs on its own coarse timer, independent of the physics tick:
//! each [`Sparkle::advance`] picks a new target opacity per star, and frames
//! interpolate towards it over the transition time.

use serde::Deserialize;

/// Timing and range of the sparkle effect.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SparkleConfig {
	/// Time between two opacity changes.
	pub interval_ms: u32,
	/// Duration of the fade towards a new opacity.
	pub transition_ms: u32,
	pub min_opacity: f64,
	pub max_opacity: f64,
	/// Opacity before the first change.
	pub initial_opacity: f64,
}

impl Default for SparkleConfig {
	fn default() -> Self {
		Self {
			interval_ms: 2000,
			transition_ms: 2000,
			min_opacity: 0.4,
			max_opacity: 1.0,
			initial_opacity: 0.8,
		}
	}
}

/// Sparkle schedule state. Times are seconds on the owning session's clock.
#[derive(Clone, Debug)]
pub struct Sparkle {
	config: SparkleConfig,
	generation: u64,
	changed_at: f64,
}

impl Sparkle {
	pub fn new(config: SparkleConfig) -> Self {
		Self {
			config,
			generation: 0,
			changed_at: 0.0,
		}
	}

	pub fn config(&self) -> &SparkleConfig {
		&self.config
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Starts a new fade at time `now`. Called from the sparkle timer.
	pub fn advance(&mut self, now: f64) {
		self.generation += 1;
		self.changed_at = now;
	}

	/// Current opacity of the marker of the star with `seed`.
	pub fn opacity(&self, seed: u64, now: f64) -> f64 {
		let to = self.target(seed, self.generation);
		if self.generation == 0 {
			return to;
		}
		let from = self.target(seed, self.generation - 1);
		let duration = f64::from(self.config.transition_ms) / 1000.0;
		let t = if duration <= 0.0 {
			1.0
		} else {
			((now - self.changed_at) / duration).clamp(0.0, 1.0)
		};
		from + (to - from) * t
	}

	fn target(&self, seed: u64, generation: u64) -> f64 {
		if generation == 0 {
			return self.config.initial_opacity;
		}
		let r = pseudo_random(seed as f64 * 0.618 + generation as f64 * 1.37);
		self.config.min_opacity + r * (self.config.max_opacity - self.config.min_opacity)
	}
}

/// Stable per-star seed derived from its id (FNV-1a).
pub fn seed_for(id: &str) -> u64 {
	id.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
		(hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
	}) % 1_000_003
}

/// Simple pseudo-random function (deterministic), in [0, 1).
fn pseudo_random(seed: f64) -> f64 {
	let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
	x - x.floor()
}

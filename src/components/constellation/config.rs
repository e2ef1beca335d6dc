//! Tunables of one constellation instance.
//!
//! Every section and field falls back to its default, so a host page only
//! needs to spell out what it wants to change:
//!
//! ```json
//! { "subset": { "max_nodes": 80 }, "zoom": { "max": 4.0 } }
//! ```

use serde::Deserialize;

use super::interaction::ZoomLimits;
use super::scene::HoverConfig;
use super::simulation::SimulationConfig;
use super::sparkle::SparkleConfig;
use super::subset::SubsetLimits;
use crate::error::DataError;

/// Everything a host page may tune, grouped by concern.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConstellationConfig {
	/// Working set caps.
	pub subset: SubsetLimits,
	/// Force layout parameters.
	pub simulation: SimulationConfig,
	/// Zoom range and wheel sensitivity.
	pub zoom: ZoomLimits,
	/// Marker twinkle schedule.
	pub sparkle: SparkleConfig,
	/// Hover enlargement and label emphasis.
	pub hover: HoverConfig,
}

impl ConstellationConfig {
	/// Parses and validates a host-page configuration document.
	pub fn from_json(text: &str) -> Result<Self, DataError> {
		let config: Self = serde_json::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	/// Rejects values the constellation cannot run with.
	pub fn validate(&self) -> Result<(), DataError> {
		self.zoom.validate().map_err(DataError::InvalidConfig)?;
		let sparkle = &self.sparkle;
		if sparkle.interval_ms == 0 {
			return Err(DataError::InvalidConfig(
				"sparkle.interval_ms must be positive".into(),
			));
		}
		if !(0.0..=sparkle.max_opacity).contains(&sparkle.min_opacity) || sparkle.max_opacity > 1.0 {
			return Err(DataError::InvalidConfig(format!(
				"sparkle opacity range [{}, {}] must lie within [0, 1]",
				sparkle.min_opacity, sparkle.max_opacity
			)));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_object_gives_defaults() {
		let config = ConstellationConfig::from_json("{}").unwrap();
		assert_eq!(config, ConstellationConfig::default());
		assert_eq!(config.subset.max_nodes, 50);
		assert_eq!(config.subset.max_links, 100);
		assert_eq!(config.zoom.min, 0.1);
		assert_eq!(config.zoom.max, 10.0);
		assert_eq!(config.sparkle.interval_ms, 2000);
	}

	#[test]
	fn test_partial_sections_keep_other_defaults() {
		let config =
			ConstellationConfig::from_json(r#"{"subset": {"max_nodes": 80}, "zoom": {"max": 4.0}}"#)
				.unwrap();
		assert_eq!(config.subset.max_nodes, 80);
		assert_eq!(config.subset.max_links, 100);
		assert_eq!(config.zoom.max, 4.0);
		assert_eq!(config.zoom.min, 0.1);
		assert_eq!(config.simulation, SimulationConfig::default());
	}

	#[test]
	fn test_inverted_zoom_range_is_rejected() {
		let err = ConstellationConfig::from_json(r#"{"zoom": {"min": 5.0, "max": 1.0}}"#).unwrap_err();
		assert!(matches!(err, DataError::InvalidConfig(_)));
	}

	#[test]
	fn test_zero_zoom_min_is_rejected() {
		let err = ConstellationConfig::from_json(r#"{"zoom": {"min": 0.0}}"#).unwrap_err();
		assert!(matches!(err, DataError::InvalidConfig(_)));
		let err = ConstellationConfig::from_json(r#"{"zoom": {"wheel_step": -2.0}}"#).unwrap_err();
		assert!(matches!(err, DataError::InvalidConfig(_)));
	}

	#[test]
	fn test_bad_sparkle_values_are_rejected() {
		for text in [
			r#"{"sparkle": {"interval_ms": 0}}"#,
			r#"{"sparkle": {"min_opacity": 0.9, "max_opacity": 0.2}}"#,
			r#"{"sparkle": {"max_opacity": 3.0}}"#,
		] {
			let err = ConstellationConfig::from_json(text).unwrap_err();
			assert!(matches!(err, DataError::InvalidConfig(_)), "{text}");
		}
	}

	#[test]
	fn test_invalid_json_is_parse_error() {
		let err = ConstellationConfig::from_json(r#"{"subset": {"max_nodes": "many"}}"#).unwrap_err();
		assert!(matches!(err, DataError::Parse(_)));
	}
}

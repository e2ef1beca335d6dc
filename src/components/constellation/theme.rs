//! Visual theming for the constellation.
//!
//! Category colors live in [`super::category`]; this module holds the colors and
//! stroke styles shared by every star and constellation line.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const WHITE: Color = Color::rgb(255, 255, 255);

	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Builds an opaque color from a packed `0xRRGGBB` value.
	pub const fn hex(rgb: u32) -> Self {
		Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self {
			a: a.clamp(0.0, 1.0),
			..self
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			self.to_css_rgb()
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	pub fn to_css_rgb(self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}
}

/// Night-sky backdrop drawn in screen space.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Color at the center of the radial gradient.
	pub inner: Color,
	/// Color at the rim of the radial gradient.
	pub outer: Color,
}

/// Constellation line style.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	pub color: Color,
	pub opacity: f64,
	/// Line width in world units.
	pub width: f64,
	/// Blur radius of the drop-shadow glow, in screen pixels.
	pub glow_blur: f64,
}

/// Star marker style shared by all categories.
#[derive(Clone, Debug)]
pub struct StarStyle {
	pub border_color: Color,
	/// Border width in world units.
	pub border_width: f64,
	/// Blur radius of the category-colored glow, in screen pixels.
	pub glow_blur: f64,
	/// Radius of the inner sparkle marker relative to the star radius.
	pub sparkle_ratio: f64,
	pub sparkle_color: Color,
}

/// Label typography.
#[derive(Clone, Debug)]
pub struct LabelStyle {
	pub color: Color,
	pub shadow: Color,
	pub font_family: &'static str,
	/// Gap between the top of the star and the label baseline, in world units.
	pub offset: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub link: LinkStyle,
	pub star: StarStyle,
	pub label: LabelStyle,
}

impl Theme {
	/// Deep-space theme: indigo core fading to black, faint grey lines.
	pub fn night_sky() -> Self {
		Self {
			name: "night_sky",
			background: BackgroundStyle {
				inner: Color::hex(0x0a0a2e),
				outer: Color::hex(0x000000),
			},
			link: LinkStyle {
				color: Color::hex(0x333333),
				opacity: 0.4,
				width: 1.5,
				glow_blur: 2.0,
			},
			star: StarStyle {
				border_color: Color::WHITE,
				border_width: 1.0,
				glow_blur: 6.0,
				sparkle_ratio: 0.3,
				sparkle_color: Color::WHITE,
			},
			label: LabelStyle {
				color: Color::WHITE,
				shadow: Color::rgba(0, 0, 0, 0.8),
				font_family: "Arial, sans-serif",
				offset: 5.0,
			},
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::night_sky()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_hex_unpacks_channels() {
		let c = Color::hex(0x4fc3f7);
		assert_eq!((c.r, c.g, c.b), (0x4f, 0xc3, 0xf7));
		assert_eq!(c.to_css(), "#4fc3f7");
	}

	#[test]
	fn test_translucent_color_renders_rgba() {
		let c = Color::hex(0x333333).with_alpha(0.4);
		assert_eq!(c.to_css(), "rgba(51, 51, 51, 0.4)");
	}
}

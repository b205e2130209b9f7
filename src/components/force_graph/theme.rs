//! Visual theming for the coupling graph canvas.
//!
//! Node and edge colors come from the reducers; the theme only covers what
//! surrounds them: background, labels, node shading and the highlight ring.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha in `0.0..=1.0`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	/// `rgba(...)` string for canvas styles.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Parses a CSS color string into a [`Color`].
/// Supports hex (`#RRGGBB`, `#RGB`) and `rgb()`/`rgba()` functional notation;
/// anything else is mid grey.
pub fn parse_color(color_str: &str) -> Color {
	let fallback = Color::rgb(128, 128, 128);
	if let Some(hex) = color_str.strip_prefix('#').filter(|h| h.is_ascii()) {
		let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(128);
		return match hex.len() {
			6 => Color::rgb(channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])),
			3 => {
				let short = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map_or(128, |v| v * 17);
				Color::rgb(short(0), short(1), short(2))
			}
			_ => fallback,
		};
	}
	if color_str.starts_with("rgb") {
		let nums: Vec<&str> = color_str
			.trim_start_matches("rgba(")
			.trim_start_matches("rgb(")
			.trim_end_matches(')')
			.split(',')
			.collect();
		let part = |i: usize| nums.get(i).and_then(|s| s.trim().parse().ok()).unwrap_or(128);
		let a = nums
			.get(3)
			.and_then(|s| s.trim().parse().ok())
			.unwrap_or(1.0);
		return Color::rgba(part(0), part(1), part(2), a);
	}
	fallback
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Canvas fill.
	pub background: Color,
	/// Node label text.
	pub label: Color,
	/// Radial shading on nodes.
	pub node_gradient: bool,
	/// Ring drawn around highlighted nodes.
	pub highlight_ring: Color,
}

impl Theme {
	/// White canvas; the grey-out colors are tuned against it.
	pub fn light() -> Self {
		Self {
			background: Color::rgb(255, 255, 255),
			label: Color::rgba(33, 37, 41, 0.9),
			node_gradient: true,
			highlight_ring: Color::rgba(33, 37, 41, 0.6),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::light()
	}
}

//! Zoom-dependent scaling of graph visuals.
//!
//! Reduced node and edge sizes are screen pixels. Drawing happens after the
//! canvas transform, so everything here converts to world-space for the
//! current zoom level `k`.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space value for a base value at zoom level `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Screen-space sizing of labels and highlight rings.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Label font size, world units, clamped in screen pixels.
	pub label_size: f64,
	/// How label size responds to zoom.
	pub label_behavior: ScaleBehavior,
	/// Labels are only drawn for nodes at least this large on screen.
	pub label_min_radius: f64,
	/// Highlight ring stroke width in screen pixels.
	pub ring_width: f64,
	/// Ring offset from the node edge in screen pixels.
	pub ring_offset: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			label_size: 14.0,
			label_behavior: ScaleBehavior::Clamped {
				min_screen: 10.0,
				max_screen: 18.0,
			},
			label_min_radius: 4.0,
			ring_width: 2.0,
			ring_offset: 2.0,
		}
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Zoom factor these values were computed for.
	pub k: f64,
	/// World-space length of one screen pixel.
	pub pixel: f64,
	/// CSS font for labels, in graph units.
	pub label_font: String,
	/// Highlight ring stroke width, in graph units.
	pub ring_width: f64,
	/// Gap between a node and its ring, in graph units.
	pub ring_offset: f64,
	label_min_radius: f64,
}

impl ScaledValues {
	/// Resolve `config` at zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let label_px = config.label_behavior.apply(config.label_size, k);
		Self {
			k,
			pixel: ScaleBehavior::Screen.apply(1.0, k),
			label_font: format!("{}px sans-serif", label_px),
			ring_width: config.ring_width / k,
			ring_offset: config.ring_offset / k,
			label_min_radius: config.label_min_radius,
		}
	}

	/// World-space radius of a node of reduced `size`.
	pub fn node_radius(&self, size: f64) -> f64 {
		size * self.pixel
	}

	/// Line width for an edge of display size `size`.
	pub fn edge_width(&self, size: f64) -> f64 {
		size * self.pixel
	}

	/// Whether a node of this size is large enough on screen to carry a label.
	pub fn shows_label(&self, size: f64, forced: bool) -> bool {
		forced || size >= self.label_min_radius
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn screen_sizes_shrink_in_world_space_when_zoomed_in() {
		let scale = ScaledValues::new(&ScaleConfig::default(), 2.0);
		assert_eq!(scale.pixel, 0.5);
		assert_eq!(scale.node_radius(20.0), 10.0);
		assert_eq!(scale.edge_width(3.0), 1.5);
	}

	#[test]
	fn label_font_is_clamped_on_screen() {
		let config = ScaleConfig::default();
		// 14 world units at k = 4 would be 56 px on screen; capped to 18 px.
		assert_eq!(ScaledValues::new(&config, 4.0).label_font, "4.5px sans-serif");
		assert_eq!(ScaledValues::new(&config, 1.0).label_font, "14px sans-serif");
	}
}

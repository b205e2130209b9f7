//! Capabilities the interaction core needs from the rendering engine and the
//! page, and the pointer events it receives from them.

use std::time::Duration;

/// Camera animation length when a search selects a node.
pub const CAMERA_ANIMATION: Duration = Duration::from_millis(500);

/// A point in viewport (canvas pixel) coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportPoint {
	/// Horizontal pixel offset.
	pub x: f64,
	/// Vertical pixel offset.
	pub y: f64,
}

/// Pointer events emitted by the rendering engine.
#[derive(Clone, Debug, PartialEq)]
pub enum RendererEvent {
	/// Press on a node.
	DownNode(String),
	/// Release over a node.
	UpNode(String),
	/// Release anywhere else.
	UpStage,
	/// Pointer moved anywhere over the stage.
	MoveBody(ViewportPoint),
	/// Pointer entered a node.
	EnterNode(String),
	/// Pointer left a node.
	LeaveNode(String),
	/// Pointer entered an edge.
	EnterEdge(String),
	/// Pointer left an edge.
	LeaveEdge(String),
	/// Click without travel on an edge.
	ClickEdge(String),
}

/// What the caller must do after an event was handled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventOutcome {
	/// Skip the engine's default behavior (camera pan).
	pub prevent_default: bool,
	/// Open this URL in a new tab.
	pub open_url: Option<String>,
}

/// Rendering engine operations used by the handlers.
pub trait Renderer {
	/// Request a redraw; reducers re-run on the next frame.
	fn refresh(&mut self);
	fn viewport_to_graph(&self, point: ViewportPoint) -> (f64, f64);
	/// Center the camera on a graph-space point.
	fn animate_camera(&mut self, target: (f64, f64), duration: Duration);
	/// Whether the auto-fit bounding box has been frozen.
	fn has_custom_bbox(&self) -> bool;
	/// Stop auto-fitting the camera to the graph extent.
	fn freeze_bbox(&mut self);
}

/// The floating edge tooltip element.
pub trait Tooltip {
	fn show(&mut self, html: &str);
	fn hide(&mut self);
	fn is_visible(&self) -> bool;
	/// Place the tooltip's top-left corner in page coordinates.
	fn place(&mut self, left: f64, top: f64);
	/// Current page scroll as `(x, y)`.
	fn scroll_offset(&self) -> (f64, f64);
}

/// What lies under the pointer.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Hit {
	/// Empty canvas.
	#[default]
	Stage,
	/// A node, by key.
	Node(String),
	/// An edge, by key.
	Edge(String),
}

/// Turns raw pointer positions into enter/leave events.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
	current: Hit,
}

impl PointerTracker {
	/// What the pointer was last over.
	pub fn current(&self) -> &Hit {
		&self.current
	}

	/// Events produced by the pointer now being over `hit`.
	pub fn moved(&mut self, hit: Hit) -> Vec<RendererEvent> {
		if hit == self.current {
			return Vec::new();
		}
		let mut events = Vec::with_capacity(2);
		match std::mem::replace(&mut self.current, hit.clone()) {
			Hit::Node(key) => events.push(RendererEvent::LeaveNode(key)),
			Hit::Edge(key) => events.push(RendererEvent::LeaveEdge(key)),
			Hit::Stage => {}
		}
		match hit {
			Hit::Node(key) => events.push(RendererEvent::EnterNode(key)),
			Hit::Edge(key) => events.push(RendererEvent::EnterEdge(key)),
			Hit::Stage => {}
		}
		events
	}

	/// Events for leaving the stage entirely.
	pub fn left(&mut self) -> Vec<RendererEvent> {
		self.moved(Hit::Stage)
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	/// Records every call so tests can assert on handler side effects.
	#[derive(Debug, Default)]
	pub(crate) struct FakeRenderer {
		pub refreshes: usize,
		pub camera: Vec<((f64, f64), Duration)>,
		pub frozen: bool,
		pub freezes: usize,
	}

	impl Renderer for FakeRenderer {
		fn refresh(&mut self) {
			self.refreshes += 1;
		}

		fn viewport_to_graph(&self, point: ViewportPoint) -> (f64, f64) {
			(point.x / 2.0, point.y / 2.0)
		}

		fn animate_camera(&mut self, target: (f64, f64), duration: Duration) {
			self.camera.push((target, duration));
		}

		fn has_custom_bbox(&self) -> bool {
			self.frozen
		}

		fn freeze_bbox(&mut self) {
			self.frozen = true;
			self.freezes += 1;
		}
	}

	#[derive(Debug, Default)]
	pub(crate) struct FakeTooltip {
		pub html: Option<String>,
		pub position: Option<(f64, f64)>,
		pub scroll: (f64, f64),
	}

	impl Tooltip for FakeTooltip {
		fn show(&mut self, html: &str) {
			self.html = Some(html.to_string());
		}

		fn hide(&mut self) {
			self.html = None;
		}

		fn is_visible(&self) -> bool {
			self.html.is_some()
		}

		fn place(&mut self, left: f64, top: f64) {
			self.position = Some((left, top));
		}

		fn scroll_offset(&self) -> (f64, f64) {
			self.scroll
		}
	}

	#[test]
	fn tracker_emits_leave_before_enter() {
		let mut tracker = PointerTracker::default();
		assert_eq!(
			tracker.moved(Hit::Node("a".into())),
			vec![RendererEvent::EnterNode("a".into())]
		);
		assert!(tracker.moved(Hit::Node("a".into())).is_empty());
		assert_eq!(
			tracker.moved(Hit::Edge("ab".into())),
			vec![
				RendererEvent::LeaveNode("a".into()),
				RendererEvent::EnterEdge("ab".into())
			]
		);
		assert_eq!(tracker.left(), vec![RendererEvent::LeaveEdge("ab".into())]);
		assert_eq!(tracker.current(), &Hit::Stage);
	}
}

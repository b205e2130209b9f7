//! Per-page graph session and camera state.
//!
//! [`GraphSession`] owns the graph store, interaction state, page options,
//! layout and legend colors for one page. [`Viewport`] is the camera: the
//! interaction handlers drive it through the [`Renderer`] trait, and the
//! canvas draws through its transform.

use std::time::Duration;

use crate::graph::CouplingGraph;
use crate::graph::style::ColorRegistry;
use crate::interaction::frame::Frame;
use crate::interaction::reducers::ReducerContext;
use crate::interaction::renderer::{Hit, ViewportPoint};
use crate::interaction::{EventOutcome, Handlers, InteractionState, PageOptions, Renderer, RendererEvent, Tooltip};

use super::layout::ForceLayout;

/// Zoom limits.
const MIN_ZOOM: f64 = 0.05;
const MAX_ZOOM: f64 = 20.0;
/// Screen margin kept around the graph when fitting.
const FIT_PADDING: f64 = 40.0;

/// Pan and zoom transform applied to the entire graph view.
/// `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal screen offset.
	pub x: f64,
	/// Vertical screen offset.
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.05..20.0).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

impl ViewTransform {
	/// Inverse of [`Self::graph_to_screen`].
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Where graph point `(gx, gy)` lands on screen.
	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	/// Zoom by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}

	/// Transform showing `bounds` centered in a `width` x `height` screen.
	pub fn fit(bounds: (f64, f64, f64, f64), width: f64, height: f64) -> Self {
		let (x0, y0, x1, y1) = bounds;
		let (w, h) = ((x1 - x0).max(1.0), (y1 - y0).max(1.0));
		let avail_w = (width - 2.0 * FIT_PADDING).max(1.0);
		let avail_h = (height - 2.0 * FIT_PADDING).max(1.0);
		let k = (avail_w / w).min(avail_h / h).clamp(MIN_ZOOM, MAX_ZOOM);
		let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
		Self {
			x: width / 2.0 - cx * k,
			y: height / 2.0 - cy * k,
			k,
		}
	}

	fn lerp(self, to: Self, t: f64) -> Self {
		Self {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// A pan is in progress.
	pub active: bool,
	/// Pointer x at pan start.
	pub start_x: f64,
	/// Pointer y at pan start.
	pub start_y: f64,
	/// Transform x offset at pan start.
	pub transform_start_x: f64,
	/// Transform y offset at pan start.
	pub transform_start_y: f64,
}

#[derive(Clone, Debug)]
struct CameraAnimation {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
	duration: f64,
}

fn ease_in_out(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// The camera. Auto-fits the graph extent until a drag freezes the bounding
/// box or the user moves the camera.
#[derive(Clone, Debug)]
pub struct Viewport {
	/// Current graph-to-screen transform.
	pub transform: ViewTransform,
	/// Pan in progress, if any.
	pub pan: PanState,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	animation: Option<CameraAnimation>,
	custom_bbox: bool,
	user_camera: bool,
	dirty: bool,
}

impl Viewport {
	/// A camera centered on the graph origin.
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			pan: PanState::default(),
			width,
			height,
			animation: None,
			custom_bbox: false,
			user_camera: false,
			dirty: true,
		}
	}

	/// Track a canvas resize.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.dirty = true;
	}

	/// Start panning from screen point `(sx, sy)`.
	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	/// Follow the pointer during a pan. Turns off auto-fit.
	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		self.animation = None;
		self.user_camera = true;
		self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
		self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
	}

	/// Finish the current pan.
	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	/// Zoom around a screen point. Turns off auto-fit.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.animation = None;
		self.user_camera = true;
		self.transform.zoom_at(sx, sy, factor);
	}

	/// Fit the camera to `bounds` unless auto-fit is off.
	pub fn auto_fit(&mut self, bounds: Option<(f64, f64, f64, f64)>) {
		if self.custom_bbox || self.user_camera || self.animation.is_some() {
			return;
		}
		if let Some(bounds) = bounds {
			self.transform = ViewTransform::fit(bounds, self.width, self.height);
		}
	}

	/// Advance a running camera animation by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		let Some(anim) = self.animation.as_mut() else {
			return;
		};
		anim.elapsed += dt;
		let t = if anim.duration > 0.0 {
			(anim.elapsed / anim.duration).min(1.0)
		} else {
			1.0
		};
		self.transform = anim.from.lerp(anim.to, ease_in_out(t));
		if t >= 1.0 {
			self.animation = None;
		}
	}

	/// A camera animation is running.
	pub fn is_animating(&self) -> bool {
		self.animation.is_some()
	}

	/// Whether a refresh was requested since the last call.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}
}

impl Renderer for Viewport {
	fn refresh(&mut self) {
		self.dirty = true;
	}

	fn viewport_to_graph(&self, point: ViewportPoint) -> (f64, f64) {
		self.transform.screen_to_graph(point.x, point.y)
	}

	fn animate_camera(&mut self, target: (f64, f64), duration: Duration) {
		let k = self.transform.k;
		let to = ViewTransform {
			x: self.width / 2.0 - target.0 * k,
			y: self.height / 2.0 - target.1 * k,
			k,
		};
		self.user_camera = true;
		self.animation = Some(CameraAnimation {
			from: self.transform,
			to,
			elapsed: 0.0,
			duration: duration.as_secs_f64(),
		});
	}

	fn has_custom_bbox(&self) -> bool {
		self.custom_bbox
	}

	fn freeze_bbox(&mut self) {
		self.custom_bbox = true;
	}
}

/// Everything one page works on, passed explicitly to the canvas.
pub struct GraphSession {
	/// Graph store, mutated by layout and handlers.
	pub graph: CouplingGraph,
	/// Hover, drag and search state.
	pub state: InteractionState,
	/// Features enabled on this page.
	pub options: PageOptions,
	/// Force layout over `graph`.
	pub layout: ForceLayout,
	/// Legend colors by membership.
	pub colors: ColorRegistry,
	frame: Frame,
}

impl GraphSession {
	/// Session over `graph` with a stopped layout and a built frame.
	pub fn new(graph: CouplingGraph, options: PageOptions, colors: ColorRegistry) -> Self {
		let layout = ForceLayout::new(&graph, &options.layout);
		let mut session = Self {
			graph,
			state: InteractionState::default(),
			options,
			layout,
			colors,
			frame: Frame::default(),
		};
		session.layout.write_positions(&mut session.graph);
		session.rebuild_frame();
		session
	}

	/// Handlers borrowing this session's graph, state and options.
	pub fn handlers(&mut self) -> Handlers<'_> {
		Handlers {
			graph: &mut self.graph,
			state: &mut self.state,
			options: &self.options,
		}
	}

	/// Route a pointer event to the handlers. A dragged node is pinned in
	/// the layout so the simulation does not pull it back.
	pub fn dispatch(
		&mut self,
		event: &RendererEvent,
		renderer: &mut dyn Renderer,
		tooltip: &mut dyn Tooltip,
	) -> EventOutcome {
		let outcome = self.handlers().dispatch(event, renderer, tooltip);
		if let (RendererEvent::MoveBody(_), Some(node)) = (event, self.state.dragged_node.as_deref()) {
			if let Some(attrs) = self.graph.node(node) {
				self.layout.pin(node, attrs.x, attrs.y);
			}
		}
		outcome
	}

	/// Advance layout and camera by `dt` seconds, re-reducing when needed.
	pub fn tick(&mut self, dt: f64, viewport: &mut Viewport) {
		if self.layout.tick(dt as f32) {
			self.layout.write_positions(&mut self.graph);
			viewport.refresh();
		}
		viewport.tick(dt);
		if viewport.take_dirty() {
			self.rebuild_frame();
		}
		viewport.auto_fit(self.frame.bounds());
	}

	/// Re-run the reducers.
	pub fn rebuild_frame(&mut self) {
		self.frame = Frame::build(&ReducerContext {
			graph: &self.graph,
			state: &self.state,
			options: &self.options,
		});
	}

	/// The last reduced frame.
	pub fn frame(&self) -> &Frame {
		&self.frame
	}

	/// What lies under the screen point.
	pub fn hit(&self, viewport: &Viewport, point: ViewportPoint) -> Hit {
		let graph_point = viewport.viewport_to_graph(point);
		self.frame.hit(graph_point, 1.0 / viewport.transform.k)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::tests::graph_of;
	use crate::interaction::renderer::tests::FakeTooltip;

	fn session() -> GraphSession {
		let mut graph = graph_of(
			&[("x", "X"), ("y", "Y"), ("z", "Z")],
			&[("xy", "x", "y", Some(0.2)), ("yz", "y", "z", Some(0.8))],
		);
		graph.set_position("x", -100.0, 0.0);
		graph.set_position("y", 0.0, 0.0);
		graph.set_position("z", 100.0, 50.0);
		GraphSession::new(graph, PageOptions::default(), ColorRegistry::default())
	}

	#[test]
	fn zoom_keeps_anchor_point_fixed() {
		let mut t = ViewTransform { x: 10.0, y: 20.0, k: 1.0 };
		let before = t.screen_to_graph(50.0, 60.0);
		t.zoom_at(50.0, 60.0, 2.0);
		assert_eq!(t.k, 2.0);
		assert_eq!(t.screen_to_graph(50.0, 60.0), before);
		t.zoom_at(0.0, 0.0, 1000.0);
		assert_eq!(t.k, MAX_ZOOM);
	}

	#[test]
	fn fit_centers_bounds() {
		let t = ViewTransform::fit((-100.0, -50.0, 100.0, 50.0), 480.0, 280.0);
		assert_eq!(t.k, 2.0);
		assert_eq!(t.graph_to_screen(0.0, 0.0), (240.0, 140.0));
		assert_eq!(t.graph_to_screen(-100.0, 0.0), (40.0, 140.0));
	}

	#[test]
	fn camera_animation_reaches_target() {
		let mut viewport = Viewport::new(200.0, 100.0);
		viewport.animate_camera((30.0, -10.0), Duration::from_millis(500));
		viewport.tick(0.25);
		assert!(viewport.is_animating());
		viewport.tick(0.25);
		assert!(!viewport.is_animating());
		assert_eq!(viewport.transform.graph_to_screen(30.0, -10.0), (100.0, 50.0));
	}

	#[test]
	fn auto_fit_stops_once_bbox_frozen() {
		let mut viewport = Viewport::new(480.0, 280.0);
		viewport.auto_fit(Some((-100.0, -50.0, 100.0, 50.0)));
		assert_eq!(viewport.transform.k, 2.0);
		viewport.freeze_bbox();
		viewport.auto_fit(Some((-10.0, -5.0, 10.0, 5.0)));
		assert_eq!(viewport.transform.k, 2.0);
	}

	#[test]
	fn dragging_pins_node_in_layout() {
		let mut session = session();
		let mut viewport = Viewport::new(200.0, 200.0);
		viewport.transform = ViewTransform::default();
		let mut tooltip = FakeTooltip::default();

		session.dispatch(&RendererEvent::DownNode("z".into()), &mut viewport, &mut tooltip);
		let outcome = session.dispatch(
			&RendererEvent::MoveBody(ViewportPoint { x: 70.0, y: -30.0 }),
			&mut viewport,
			&mut tooltip,
		);
		assert!(outcome.prevent_default);
		assert!(viewport.has_custom_bbox());
		assert_eq!(session.layout.position("z"), Some((70.0, -30.0)));

		session.layout.start();
		session.tick(0.016, &mut viewport);
		let z = session.graph.node("z").unwrap();
		assert_eq!((z.x, z.y), (70.0, -30.0));
	}

	#[test]
	fn hit_testing_goes_through_the_camera() {
		let mut session = session();
		let mut viewport = Viewport::new(200.0, 200.0);
		viewport.transform = ViewTransform { x: 100.0, y: 100.0, k: 1.0 };
		viewport.freeze_bbox();
		session.tick(0.016, &mut viewport);
		assert_eq!(session.hit(&viewport, ViewportPoint { x: 100.0, y: 100.0 }), Hit::Node("y".into()));
		assert_eq!(session.hit(&viewport, ViewportPoint { x: 50.0, y: 101.0 }), Hit::Edge("xy".into()));
		assert_eq!(session.hit(&viewport, ViewportPoint { x: 100.0, y: 180.0 }), Hit::Stage);
	}

	#[test]
	fn hover_refresh_rebuilds_frame() {
		let mut session = session();
		let mut viewport = Viewport::new(200.0, 200.0);
		let mut tooltip = FakeTooltip::default();
		session.tick(0.016, &mut viewport);
		assert!(session.frame().nodes.iter().all(|n| !n.display.highlighted));

		session.dispatch(&RendererEvent::EnterNode("x".into()), &mut viewport, &mut tooltip);
		session.tick(0.016, &mut viewport);
		let highlighted: Vec<_> = session
			.frame()
			.nodes
			.iter()
			.filter(|n| n.display.highlighted)
			.map(|n| n.key.as_str())
			.collect();
		assert_eq!(highlighted.len(), 2);
		assert!(highlighted.contains(&"x") && highlighted.contains(&"y"));
		// z is greyed, and the y-z edge hidden
		assert_eq!(session.frame().edges.len(), 1);
	}
}

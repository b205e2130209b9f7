//! Leptos component wrapping the coupling graph canvas.
//!
//! The component creates an HTML canvas element and translates mouse and
//! wheel events into [`RendererEvent`]s for the loaded [`GraphSession`], plus
//! camera pan and zoom. An animation loop runs via `requestAnimationFrame`,
//! ticking the layout and camera and drawing the reduced frame.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::scale::ScaleConfig;
use super::state::{GraphSession, Viewport};
use super::theme::Theme;
use super::tooltip::DomTooltip;
use crate::interaction::frame::Frame;
use crate::interaction::renderer::{Hit, PointerTracker, ViewportPoint};
use crate::interaction::{EventOutcome, Handlers, Renderer, RendererEvent, Tooltip};

/// Pointer travel, in pixels, beyond which a press is a pan rather than a click.
const CLICK_SLOP: f64 = 4.0;
/// Frame step bounds, in seconds.
const MIN_FRAME_DT: f64 = 0.001;
const MAX_FRAME_DT: f64 = 0.05;

/// Page-wide graph context shared between the canvas and page controls.
pub struct Stage {
	/// The loaded page session, if any.
	pub session: Option<GraphSession>,
	/// Camera, kept across frames and replaced on load.
	pub viewport: Viewport,
	tooltip: Option<DomTooltip>,
	tracker: PointerTracker,
	press: Option<(f64, f64)>,
	loads: u64,
}

/// Handle shared by the canvas and page controls.
pub type SharedStage = Rc<RefCell<Stage>>;

static EMPTY_FRAME: Frame = Frame {
	nodes: Vec::new(),
	edges: Vec::new(),
};

impl Default for Stage {
	fn default() -> Self {
		Self {
			session: None,
			viewport: Viewport::new(800.0, 600.0),
			tooltip: None,
			tracker: PointerTracker::default(),
			press: None,
			loads: 0,
		}
	}
}

impl Stage {
	/// A fresh empty stage behind a shared handle.
	pub fn shared() -> SharedStage {
		Rc::new(RefCell::new(Self::default()))
	}

	/// Show a new session with a fresh camera. Returns the load number used
	/// to stop this session's layout later.
	pub fn load(&mut self, session: GraphSession) -> u64 {
		self.viewport = Viewport::new(self.viewport.width, self.viewport.height);
		self.tracker = PointerTracker::default();
		self.press = None;
		if let Some(tooltip) = self.tooltip.as_mut() {
			tooltip.hide();
		}
		self.session = Some(session);
		self.loads += 1;
		self.loads
	}

	/// Drop the loaded session. Its pending layout stop becomes a no-op.
	pub fn unload(&mut self) {
		self.session = None;
		self.tracker = PointerTracker::default();
		self.press = None;
		if let Some(tooltip) = self.tooltip.as_mut() {
			tooltip.hide();
		}
		self.loads += 1;
	}

	/// What the canvas draws: the session's frame, or nothing.
	pub fn frame(&self) -> &Frame {
		self.session.as_ref().map_or(&EMPTY_FRAME, GraphSession::frame)
	}

	/// Run `f` on the loaded session's handlers with the camera as renderer.
	pub fn with_handlers<R>(&mut self, f: impl FnOnce(&mut Handlers<'_>, &mut Viewport) -> R) -> Option<R> {
		let session = self.session.as_mut()?;
		Some(f(&mut session.handlers(), &mut self.viewport))
	}

	fn dispatch(&mut self, event: &RendererEvent) -> EventOutcome {
		match (self.session.as_mut(), self.tooltip.as_mut()) {
			(Some(session), Some(tooltip)) => session.dispatch(event, &mut self.viewport, tooltip),
			_ => EventOutcome::default(),
		}
	}

	fn hit(&self, point: ViewportPoint) -> Hit {
		self.session
			.as_ref()
			.map_or(Hit::Stage, |session| session.hit(&self.viewport, point))
	}

	fn track(&mut self, point: ViewportPoint) {
		let hit = self.hit(point);
		for event in self.tracker.moved(hit) {
			self.dispatch(&event);
		}
	}

	fn pointer_down(&mut self, point: ViewportPoint) {
		self.press = Some((point.x, point.y));
		let draggable = self.session.as_ref().is_some_and(|s| s.options.draggable);
		match self.hit(point) {
			Hit::Node(node) if draggable => {
				self.dispatch(&RendererEvent::DownNode(node));
			}
			_ => self.viewport.begin_pan(point.x, point.y),
		}
	}

	fn pointer_move(&mut self, point: ViewportPoint, client: ViewportPoint) {
		let outcome = self.dispatch(&RendererEvent::MoveBody(point));
		if !outcome.prevent_default {
			self.viewport.pan_to(point.x, point.y);
		}
		self.track(point);
		if let (Some(session), Some(tooltip)) = (self.session.as_mut(), self.tooltip.as_mut()) {
			session.handlers().pointer_moved(client, tooltip);
		}
	}

	fn pointer_up(&mut self) {
		let event = match self.tracker.current() {
			Hit::Node(node) => RendererEvent::UpNode(node.clone()),
			_ => RendererEvent::UpStage,
		};
		self.dispatch(&event);
		self.viewport.end_pan();
	}

	/// A press and release without travel. Returns a URL to open, if any.
	fn click(&mut self, point: ViewportPoint) -> Option<String> {
		let (px, py) = self.press.take()?;
		if (point.x - px).hypot(point.y - py) > CLICK_SLOP {
			return None;
		}
		match self.hit(point) {
			Hit::Edge(edge) => self.dispatch(&RendererEvent::ClickEdge(edge)).open_url,
			_ => None,
		}
	}

	fn pointer_left(&mut self) {
		for event in self.tracker.left() {
			self.dispatch(&event);
		}
		self.pointer_up();
		self.press = None;
	}
}

/// Start the loaded session's layout and stop it after its configured run
/// time, unless another session was loaded in the meantime.
pub fn run_layout(stage: &SharedStage, load: u64) {
	let run_for = {
		let mut guard = stage.borrow_mut();
		let Some(session) = guard.session.as_mut() else {
			return;
		};
		session.layout.start();
		session.options.layout.run_for
	};
	let stage = stage.clone();
	let stop = Closure::once_into_js(move || {
		let mut guard = stage.borrow_mut();
		if guard.loads != load {
			return;
		}
		if let Some(session) = guard.session.as_mut() {
			session.layout.stop();
		}
		guard.viewport.refresh();
	});
	let Some(window) = web_sys::window() else {
		return;
	};
	if let Err(err) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
		stop.unchecked_ref(),
		duration_ms(run_for),
	) {
		warn!("coupling-graph: could not schedule layout stop: {:?}", err);
	}
}

fn duration_ms(duration: Duration) -> i32 {
	i32::try_from(duration.as_millis()).unwrap_or(i32::MAX)
}

fn canvas_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> ViewportPoint {
	let rect = canvas.get_bounding_client_rect();
	ViewportPoint {
		x: ev.client_x() as f64 - rect.left(),
		y: ev.client_y() as f64 - rect.top(),
	}
}

fn client_point(ev: &MouseEvent) -> ViewportPoint {
	ViewportPoint {
		x: ev.client_x() as f64,
		y: ev.client_y() as f64,
	}
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64());
	(
		dim(window.inner_width()).unwrap_or(800.0),
		dim(window.inner_height()).unwrap_or(600.0),
	)
}

fn open_in_new_tab(url: &str) {
	debug!("coupling-graph: opening {url}");
	if let Some(window) = web_sys::window() {
		if let Err(err) = window.open_with_url_and_target(url, "_blank") {
			warn!("coupling-graph: could not open {url}: {:?}", err);
		}
	}
}

/// Bundles the visual configuration used by the animation loop.
struct DrawContext {
	ctx: CanvasRenderingContext2d,
	scale: ScaleConfig,
	theme: Theme,
}

/// Renders the stage's session on a canvas element.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize automatically with
/// the window. `tooltip` is the element used for edge tooltips.
#[component]
pub fn CouplingGraphCanvas(
	stage: SharedStage,
	tooltip: NodeRef<leptos::html::Div>,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (stage_init, animate_init, resize_cb_init) = (stage.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			canvas
				.parent_element()
				.map(|p| (p.client_width() as f64, p.client_height() as f64))
				.unwrap_or((800.0, 600.0))
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx = match canvas.get_context("2d") {
			Ok(Some(ctx)) => ctx,
			_ => {
				warn!("coupling-graph: canvas has no 2d context");
				return;
			}
		};
		let Ok(ctx) = ctx.dyn_into::<CanvasRenderingContext2d>() else {
			return;
		};

		{
			let mut stage = stage_init.borrow_mut();
			stage.viewport.resize(w, h);
			if let Some(el) = tooltip.get() {
				let el: HtmlElement = el.into();
				stage.tooltip = Some(DomTooltip::new(el));
			}
		}

		if fullscreen {
			let (stage_resize, canvas_resize) = (stage_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				stage_resize.borrow_mut().viewport.resize(nw, nh);
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let draw = DrawContext {
			ctx,
			scale: ScaleConfig::default(),
			theme: Theme::default(),
		};
		let mut last = js_sys::Date::now();
		let (stage_anim, animate_inner) = (stage_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let now = js_sys::Date::now();
			let dt = ((now - last) / 1000.0).clamp(MIN_FRAME_DT, MAX_FRAME_DT);
			last = now;
			{
				let mut guard = stage_anim.borrow_mut();
				let stage = &mut *guard;
				if let Some(session) = stage.session.as_mut() {
					session.tick(dt, &mut stage.viewport);
				}
				render::render(stage.frame(), &stage.viewport, &draw.ctx, &draw.scale, &draw.theme);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let point_of = move |ev: &MouseEvent| {
		canvas_ref.get().map(|canvas| {
			let canvas: HtmlCanvasElement = canvas.into();
			canvas_point(&canvas, ev)
		})
	};

	let stage_md = stage.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some(point) = point_of(&ev) {
			stage_md.borrow_mut().pointer_down(point);
		}
	};

	let stage_mm = stage.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some(point) = point_of(&ev) {
			stage_mm.borrow_mut().pointer_move(point, client_point(&ev));
		}
	};

	let stage_mu = stage.clone();
	let on_mouseup = move |_: MouseEvent| {
		stage_mu.borrow_mut().pointer_up();
	};

	let stage_cl = stage.clone();
	let on_click = move |ev: MouseEvent| {
		let Some(point) = point_of(&ev) else {
			return;
		};
		let url = stage_cl.borrow_mut().click(point);
		if let Some(url) = url {
			open_in_new_tab(&url);
		}
	};

	let stage_ml = stage.clone();
	let on_mouseleave = move |_: MouseEvent| {
		stage_ml.borrow_mut().pointer_left();
	};

	let stage_wh = stage;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(point) = point_of(&ev) else {
			return;
		};
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		stage_wh.borrow_mut().viewport.zoom_at(point.x, point.y, factor);
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="coupling-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:click=on_click
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

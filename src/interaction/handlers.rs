//! Interaction handlers: drag, hover, search input, tooltip, range filter and
//! edge click. Each handler mutates the interaction state or the stored
//! attributes and then asks the renderer for a refresh.

use log::debug;

use super::options::PageOptions;
use super::renderer::{CAMERA_ANIMATION, EventOutcome, Renderer, RendererEvent, Tooltip, ViewportPoint};
use super::state::InteractionState;
use crate::graph::CouplingGraph;
use crate::graph::filter::{self, GravityRange, RangeSummary, SearchOutcome};
use crate::params::EdgeDetailParams;

/// Tooltip distance from the pointer, in pixels.
pub const TOOLTIP_OFFSET: f64 = 10.0;

/// Mutable view over one session, borrowed for the duration of an event.
pub struct Handlers<'a> {
	/// Graph the handlers update.
	pub graph: &'a mut CouplingGraph,
	/// Hover, drag and search state.
	pub state: &'a mut InteractionState,
	/// Page behavior flags.
	pub options: &'a PageOptions,
}

impl Handlers<'_> {
	/// Route a renderer event to the enabled handlers.
	pub fn dispatch(
		&mut self,
		event: &RendererEvent,
		renderer: &mut dyn Renderer,
		tooltip: &mut dyn Tooltip,
	) -> EventOutcome {
		let opts = self.options;
		match event {
			RendererEvent::DownNode(node) if opts.draggable => self.start_drag(node, renderer),
			RendererEvent::UpNode(_) | RendererEvent::UpStage if opts.draggable => self.end_drag(renderer),
			RendererEvent::MoveBody(point) => {
				let mut outcome = EventOutcome::default();
				if opts.draggable {
					outcome.prevent_default = self.drag_to(*point, renderer);
				}
				outcome
			}
			RendererEvent::EnterNode(node) if opts.hover_nodes => self.enter_node(node, renderer),
			RendererEvent::LeaveNode(_) if opts.hover_nodes => self.leave_node(renderer),
			RendererEvent::EnterEdge(edge) => self.enter_edge(edge, renderer, tooltip),
			RendererEvent::LeaveEdge(_) => self.leave_edge(renderer, tooltip),
			RendererEvent::ClickEdge(edge) if opts.edge_click => EventOutcome {
				open_url: self.edge_detail_url(edge),
				..EventOutcome::default()
			},
			_ => EventOutcome::default(),
		}
	}

	fn start_drag(&mut self, node: &str, renderer: &mut dyn Renderer) -> EventOutcome {
		self.state.dragging = true;
		self.state.dragged_node = Some(node.to_string());
		if let Some(attrs) = self.graph.node_mut(node) {
			attrs.highlighted = true;
		}
		if !renderer.has_custom_bbox() {
			renderer.freeze_bbox();
		}
		renderer.refresh();
		EventOutcome::default()
	}

	/// Move the dragged node under the pointer. Returns whether the default
	/// camera pan must be suppressed.
	fn drag_to(&mut self, point: ViewportPoint, renderer: &mut dyn Renderer) -> bool {
		if !self.state.dragging {
			return false;
		}
		let Some(node) = self.state.dragged_node.as_deref() else {
			return false;
		};
		let (x, y) = renderer.viewport_to_graph(point);
		self.graph.set_position(node, x, y);
		renderer.refresh();
		true
	}

	fn end_drag(&mut self, renderer: &mut dyn Renderer) -> EventOutcome {
		if let Some(node) = self.state.dragged_node.take() {
			if let Some(attrs) = self.graph.node_mut(&node) {
				attrs.highlighted = false;
			}
		}
		self.state.dragging = false;
		renderer.refresh();
		EventOutcome::default()
	}

	/// While dragging, the dragged node stays the hover target.
	fn enter_node(&mut self, node: &str, renderer: &mut dyn Renderer) -> EventOutcome {
		if self.state.dragging {
			if let Some(dragged) = self.state.dragged_node.clone() {
				self.state.hovered_neighbors = Some(self.graph.neighbors(&dragged));
				self.state.hovered_node = Some(dragged);
			}
		} else {
			self.state.hovering = true;
			self.state.hovered_node = Some(node.to_string());
			self.state.hovered_neighbors = Some(self.graph.neighbors(node));
		}
		self.state.hovered_edge = None;
		renderer.refresh();
		EventOutcome::default()
	}

	fn leave_node(&mut self, renderer: &mut dyn Renderer) -> EventOutcome {
		if self.state.dragging {
			return EventOutcome::default();
		}
		self.state.hovered_node = None;
		self.state.hovered_neighbors = None;
		self.state.hovering = false;
		renderer.refresh();
		EventOutcome::default()
	}

	fn enter_edge(&mut self, edge: &str, renderer: &mut dyn Renderer, tooltip: &mut dyn Tooltip) -> EventOutcome {
		if self.options.hover_edges {
			self.state.hovering = true;
			self.state.hovered_edge = Some(edge.to_string());
		}
		if self.options.tooltip {
			let content = self.options.tooltip_content.and_then(|build| build(edge, self.graph));
			if let Some(html) = content {
				tooltip.show(&html);
			}
		}
		renderer.refresh();
		EventOutcome::default()
	}

	fn leave_edge(&mut self, renderer: &mut dyn Renderer, tooltip: &mut dyn Tooltip) -> EventOutcome {
		if self.options.draggable && self.state.dragging {
			return EventOutcome::default();
		}
		if self.options.hover_edges {
			self.state.hovered_edge = None;
			self.state.hovering = false;
		}
		if self.options.tooltip {
			tooltip.hide();
		}
		renderer.refresh();
		EventOutcome::default()
	}

	/// Keep a visible tooltip next to the pointer.
	pub fn pointer_moved(&self, client: ViewportPoint, tooltip: &mut dyn Tooltip) {
		if !self.options.tooltip || !tooltip.is_visible() {
			return;
		}
		let (scroll_x, scroll_y) = tooltip.scroll_offset();
		tooltip.place(
			client.x + scroll_x + TOOLTIP_OFFSET,
			client.y + scroll_y + TOOLTIP_OFFSET,
		);
	}

	/// Re-run search matching for `query` and update selection/suggestions.
	pub fn set_search_query(&mut self, query: &str, renderer: &mut dyn Renderer) {
		if !self.options.searchable {
			return;
		}
		let outcome = filter::search(self.graph, query);
		if let SearchOutcome::Selected(node) = &outcome {
			if let Some(attrs) = self.graph.node(node) {
				renderer.animate_camera((attrs.x, attrs.y), CAMERA_ANIMATION);
			}
		}
		self.state.apply_search(query, outcome);
		renderer.refresh();
	}

	/// The search field changed.
	pub fn search_input(&mut self, value: &str, renderer: &mut dyn Renderer) {
		self.set_search_query(value, renderer);
	}

	/// Leaving the search field resets the view.
	pub fn search_blur(&mut self, renderer: &mut dyn Renderer) {
		self.set_search_query("", renderer);
	}

	/// Apply the slider's two thumb values as a gravity range.
	pub fn range_updated(&mut self, thumbs: (f64, f64), renderer: &mut dyn Renderer) -> RangeSummary {
		let range = GravityRange::new(thumbs.0, thumbs.1);
		let summary = filter::apply_gravity_range(self.graph, range);
		debug!(
			"coupling-graph: gravity [{:.2}, {:.2}] keeps {} edges, {} nodes",
			range.min, range.max, summary.visible_edges, summary.visible_nodes
		);
		renderer.refresh();
		summary
	}

	fn edge_detail_url(&self, edge: &str) -> Option<String> {
		let (source, target) = self.graph.extremities(edge)?;
		let attrs = self.graph.edge(edge)?;
		let params = EdgeDetailParams {
			source: source.to_string(),
			target: target.to_string(),
			files: attrs.files.unwrap_or(0) as f64,
			gravity: attrs.gravity.unwrap_or(0.0),
		};
		Some(params.to_url())
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;
	use std::time::Duration;

	use super::*;
	use crate::graph::tests::graph_of;
	use crate::interaction::renderer::tests::{FakeRenderer, FakeTooltip};

	struct Fixture {
		graph: CouplingGraph,
		state: InteractionState,
		options: PageOptions,
		renderer: FakeRenderer,
		tooltip: FakeTooltip,
	}

	impl Fixture {
		fn new(options: PageOptions) -> Self {
			let mut graph = graph_of(
				&[("x", "X"), ("y", "Y"), ("z", "Z"), ("w", "W")],
				&[("xy", "x", "y", Some(0.2)), ("yz", "y", "z", Some(0.8))],
			);
			graph.set_position("z", 40.0, -8.0);
			Self {
				graph,
				state: InteractionState::default(),
				options,
				renderer: FakeRenderer::default(),
				tooltip: FakeTooltip::default(),
			}
		}

		fn fire(&mut self, event: RendererEvent) -> EventOutcome {
			let mut handlers = Handlers {
				graph: &mut self.graph,
				state: &mut self.state,
				options: &self.options,
			};
			handlers.dispatch(&event, &mut self.renderer, &mut self.tooltip)
		}

		fn handlers(&mut self) -> (Handlers<'_>, &mut FakeRenderer) {
			(
				Handlers {
					graph: &mut self.graph,
					state: &mut self.state,
					options: &self.options,
				},
				&mut self.renderer,
			)
		}
	}

	fn keys(items: &[&str]) -> HashSet<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn drag_moves_node_and_suppresses_pan() {
		let mut f = Fixture::new(PageOptions::default());
		f.fire(RendererEvent::DownNode("x".into()));
		assert!(f.state.dragging);
		assert!(f.graph.node("x").unwrap().highlighted);
		assert_eq!(f.renderer.freezes, 1);

		let outcome = f.fire(RendererEvent::MoveBody(ViewportPoint { x: 10.0, y: 20.0 }));
		assert!(outcome.prevent_default);
		let x = f.graph.node("x").unwrap();
		assert_eq!((x.x, x.y), (5.0, 10.0));

		f.fire(RendererEvent::UpStage);
		assert!(!f.state.dragging);
		assert!(f.state.dragged_node.is_none());
		assert!(!f.graph.node("x").unwrap().highlighted);

		f.fire(RendererEvent::DownNode("y".into()));
		assert_eq!(f.renderer.freezes, 1, "bbox is frozen only once");

		let outcome = f.fire(RendererEvent::UpNode("y".into()));
		assert!(!outcome.prevent_default);
		let outcome = f.fire(RendererEvent::MoveBody(ViewportPoint::default()));
		assert!(!outcome.prevent_default, "no drag, camera may pan");
	}

	#[test]
	fn drag_disabled_ignores_pointer_down() {
		let mut f = Fixture::new(PageOptions {
			draggable: false,
			..PageOptions::default()
		});
		f.fire(RendererEvent::DownNode("x".into()));
		assert!(!f.state.dragging);
		assert_eq!(f.renderer.refreshes, 0);
	}

	#[test]
	fn hover_enter_and_leave_node() {
		let mut f = Fixture::new(PageOptions::default());
		f.state.hovered_edge = Some("xy".into());
		f.fire(RendererEvent::EnterNode("y".into()));
		assert!(f.state.hovering);
		assert_eq!(f.state.hovered_node.as_deref(), Some("y"));
		assert_eq!(f.state.hovered_neighbors, Some(keys(&["x", "z"])));
		assert!(f.state.hovered_edge.is_none());

		f.fire(RendererEvent::LeaveNode("y".into()));
		assert!(!f.state.hovering);
		assert!(f.state.hovered_node.is_none());
		assert!(f.state.hovered_neighbors.is_none());
		assert_eq!(f.renderer.refreshes, 2);
	}

	#[test]
	fn dragged_node_wins_hover_targeting() {
		let mut f = Fixture::new(PageOptions::default());
		f.fire(RendererEvent::EnterNode("x".into()));
		f.fire(RendererEvent::DownNode("x".into()));
		f.fire(RendererEvent::EnterNode("z".into()));
		assert_eq!(f.state.hovered_node.as_deref(), Some("x"));
		assert_eq!(f.state.hovered_neighbors, Some(keys(&["y"])));

		f.fire(RendererEvent::LeaveNode("z".into()));
		assert_eq!(f.state.hovered_node.as_deref(), Some("x"), "leave is ignored while dragging");
		assert!(f.state.hovering);
	}

	#[test]
	fn edge_hover_shows_and_hides_tooltip() {
		let mut f = Fixture::new(PageOptions::default());
		f.fire(RendererEvent::EnterEdge("yz".into()));
		assert!(f.state.hovering);
		assert_eq!(f.state.hovered_edge.as_deref(), Some("yz"));
		let html = f.tooltip.html.clone().unwrap();
		assert!(html.contains("<strong>Coupling:</strong> 0.8"));

		f.fire(RendererEvent::LeaveEdge("yz".into()));
		assert!(f.state.hovered_edge.is_none());
		assert!(!f.state.hovering);
		assert!(!f.tooltip.is_visible());
	}

	#[test]
	fn edge_leave_is_ignored_while_dragging() {
		let mut f = Fixture::new(PageOptions::default());
		f.fire(RendererEvent::EnterEdge("xy".into()));
		f.fire(RendererEvent::DownNode("x".into()));
		f.fire(RendererEvent::LeaveEdge("xy".into()));
		assert_eq!(f.state.hovered_edge.as_deref(), Some("xy"));
		assert!(f.tooltip.is_visible());
	}

	#[test]
	fn tooltip_follows_pointer_with_scroll() {
		let mut f = Fixture::new(PageOptions::default());
		f.tooltip.scroll = (0.0, 100.0);
		let point = ViewportPoint { x: 5.0, y: 7.0 };
		let move_pointer = |f: &mut Fixture| {
			let handlers = Handlers {
				graph: &mut f.graph,
				state: &mut f.state,
				options: &f.options,
			};
			handlers.pointer_moved(point, &mut f.tooltip);
		};
		move_pointer(&mut f);
		assert!(f.tooltip.position.is_none(), "hidden tooltip is not moved");

		f.fire(RendererEvent::EnterEdge("xy".into()));
		move_pointer(&mut f);
		assert_eq!(f.tooltip.position, Some((15.0, 117.0)));
	}

	#[test]
	fn search_selects_unique_exact_match_and_moves_camera() {
		let mut f = Fixture::new(PageOptions::default());
		let (mut handlers, renderer) = f.handlers();
		handlers.search_input("Z", renderer);
		assert_eq!(f.state.selected_node.as_deref(), Some("z"));
		assert!(f.state.suggestions.is_none());
		assert_eq!(f.renderer.camera, vec![((40.0, -8.0), Duration::from_millis(500))]);
	}

	#[test]
	fn search_blur_resets() {
		let mut f = Fixture::new(PageOptions::default());
		let (mut handlers, renderer) = f.handlers();
		handlers.search_input("x", renderer);
		assert_eq!(f.state.suggestions, Some(keys(&["x"])));
		assert!(f.renderer.camera.is_empty());

		let (mut handlers, renderer) = f.handlers();
		handlers.search_blur(renderer);
		assert!(f.state.suggestions.is_none());
		assert!(f.state.selected_node.is_none());
		assert_eq!(f.state.search_query, "");
		assert_eq!(f.renderer.refreshes, 2);
	}

	#[test]
	fn range_update_filters_and_refreshes() {
		let mut f = Fixture::new(PageOptions::default());
		let (mut handlers, renderer) = f.handlers();
		let summary = handlers.range_updated((1.0, 0.5), renderer);
		assert_eq!(summary.visible_edges, 1);
		assert!(f.graph.node("x").unwrap().hidden);
		assert!(f.graph.edge("xy").unwrap().hidden);
		assert!(!f.graph.node("y").unwrap().hidden);
		assert!(!f.graph.node("z").unwrap().hidden);
		assert_eq!(f.renderer.refreshes, 1);
	}

	#[test]
	fn edge_click_opens_detail_page() {
		let mut f = Fixture::new(PageOptions::graph_view());
		f.graph.edge_mut("yz").unwrap().files = Some(7);
		let outcome = f.fire(RendererEvent::ClickEdge("yz".into()));
		assert_eq!(
			outcome.open_url.as_deref(),
			Some("analyze.html?source=y&target=z&files=7&gravity=0.8")
		);

		let mut f = Fixture::new(PageOptions::edge_detail());
		assert!(f.fire(RendererEvent::ClickEdge("yz".into())).open_url.is_none());
	}
}

//! Node and edge reducers.
//!
//! Each reducer runs an ordered list of named contributors. A contributor
//! looks at the interaction state and stored attributes and returns a partial
//! [`Patch`], or nothing when its feature is off or idle. [`Patch::merge`]
//! folds the patches deterministically with the precedence
//! highlight > grey-out > default; hidden flags combine by OR.
//!
//! Reducers are pure: they never touch the state or the graph.

use super::options::PageOptions;
use super::state::InteractionState;
use crate::graph::{CouplingGraph, EdgeAttributes, NodeAttributes};

/// Color of greyed-out nodes.
pub const GREY_NODE: &str = "#f6f6f6";
/// Color of greyed-out edges.
pub const GREY_EDGE: &str = "#f0f0f0";
/// Growth factor of the hovered edge.
pub const HOVERED_EDGE_SCALE: f64 = 1.5;

/// Visual weight of an entity. Ordered by merge precedence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Emphasis {
	/// Stored appearance.
	#[default]
	Default,
	/// Label blanked, color greyed.
	Dimmed,
	/// Drawn on top, with a ring and forced label.
	Highlighted,
}

/// Partial display change proposed by one contributor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch {
	/// Strongest emphasis wins on merge.
	pub emphasis: Emphasis,
	/// `Some(true)` raises to the front, `Some(false)` resets z-order.
	pub raise: Option<bool>,
	/// Drop the item from the frame.
	pub hide: bool,
	/// Draw the label regardless of size.
	pub force_label: bool,
	/// Replacement size; later contributors win among equal emphasis.
	pub size: Option<f64>,
	/// Replacement color.
	pub color: Option<String>,
}

impl Patch {
	fn emphasis(emphasis: Emphasis) -> Self {
		Self {
			emphasis,
			..Self::default()
		}
	}

	fn dimmed() -> Self {
		Self::emphasis(Emphasis::Dimmed)
	}

	fn highlighted() -> Self {
		Self::emphasis(Emphasis::Highlighted)
	}

	/// Fold patches given in contributor order.
	///
	/// Patches are applied from lowest to highest emphasis (stable within one
	/// level), so fields set by a highlighting contributor override those of a
	/// greying one regardless of contributor order.
	pub fn merge(mut patches: Vec<Patch>) -> Patch {
		patches.sort_by_key(|patch| patch.emphasis);
		patches.into_iter().fold(Patch::default(), |mut acc, patch| {
			acc.emphasis = acc.emphasis.max(patch.emphasis);
			acc.hide |= patch.hide;
			acc.force_label |= patch.force_label;
			if patch.raise.is_some() {
				acc.raise = patch.raise;
			}
			if patch.size.is_some() {
				acc.size = patch.size;
			}
			if patch.color.is_some() {
				acc.color = patch.color;
			}
			acc
		})
	}
}

/// Everything a reducer may read.
#[derive(Clone, Copy)]
pub struct ReducerContext<'a> {
	/// Graph being reduced.
	pub graph: &'a CouplingGraph,
	/// Hover and search state.
	pub state: &'a InteractionState,
	/// Page behavior flags.
	pub options: &'a PageOptions,
}

impl ReducerContext<'_> {
	fn hovering_node(&self) -> Option<&str> {
		if self.options.hover_nodes && self.state.hovering {
			self.state.hovered_node.as_deref()
		} else {
			None
		}
	}

	fn hovering_edge(&self) -> Option<&str> {
		if self.options.hover_edges && self.state.hovering {
			self.state.hovered_edge.as_deref()
		} else {
			None
		}
	}

	/// The hovered node itself or one of its neighbors.
	fn in_hover_neighborhood(&self, hovered: &str, node: &str) -> bool {
		node == hovered || self.state.is_neighbor_of_hovered(node) || self.graph.are_neighbors(node, hovered)
	}
}

/// Final node appearance handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDisplay {
	/// Graph-space x.
	pub x: f64,
	/// Graph-space y.
	pub y: f64,
	/// Radius in screen pixels.
	pub size: f64,
	/// Label text.
	pub label: String,
	/// CSS color.
	pub color: String,
	/// Drawn with emphasis.
	pub highlighted: bool,
	/// Draw the label regardless of size.
	pub force_label: bool,
	/// Left out of the frame.
	pub hidden: bool,
	/// Higher paints later.
	pub z_index: i32,
}

/// Final edge appearance handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeDisplay {
	/// Line width in screen pixels.
	pub size: f64,
	/// Label text.
	pub label: String,
	/// CSS color.
	pub color: String,
	/// Drawn with emphasis.
	pub highlighted: bool,
	/// Left out of the frame.
	pub hidden: bool,
	/// Higher paints later.
	pub z_index: i32,
}

/// Named rules feeding the node reducer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeContributor {
	/// Stored attributes, plus grey-out while another node is selected.
	Base,
	/// The hovered node and its neighbors stand out; the rest grey out.
	HoveredNode,
	/// Endpoints of the hovered edge stand out.
	HoveredEdge,
	/// Selected node and suggestions stand out.
	Search,
}

impl NodeContributor {
	/// Evaluation order.
	pub const ORDER: [NodeContributor; 4] = [
		NodeContributor::Base,
		NodeContributor::HoveredNode,
		NodeContributor::HoveredEdge,
		NodeContributor::Search,
	];

	/// Stable name, for logs and tests.
	pub fn name(self) -> &'static str {
		match self {
			NodeContributor::Base => "base",
			NodeContributor::HoveredNode => "hovered-node",
			NodeContributor::HoveredEdge => "hovered-edge",
			NodeContributor::Search => "search",
		}
	}

	/// This rule's contribution for `node`, if it applies.
	pub fn patch(self, ctx: &ReducerContext<'_>, node: &str, attrs: &NodeAttributes) -> Option<Patch> {
		match self {
			NodeContributor::Base => Some(Patch {
				emphasis: if attrs.highlighted {
					Emphasis::Highlighted
				} else {
					Emphasis::Default
				},
				hide: attrs.hidden,
				size: Some(attrs.size),
				color: Some(attrs.color.clone()),
				..Patch::default()
			}),
			NodeContributor::HoveredNode => {
				let hovered = ctx.hovering_node()?;
				if node == hovered {
					Some(Patch {
						raise: Some(true),
						..Patch::highlighted()
					})
				} else if ctx.state.is_neighbor_of_hovered(node) {
					Some(Patch {
						raise: Some(false),
						..Patch::highlighted()
					})
				} else {
					Some(Patch {
						raise: Some(false),
						..Patch::dimmed()
					})
				}
			}
			NodeContributor::HoveredEdge => {
				let edge = ctx.hovering_edge()?;
				let (source, target) = ctx.graph.extremities(edge)?;
				if node == source || node == target {
					Some(Patch::highlighted())
				} else {
					Some(Patch::dimmed())
				}
			}
			NodeContributor::Search => {
				if !ctx.options.searchable {
					return None;
				}
				if ctx.state.selected_node.as_deref() == Some(node) {
					Some(Patch::highlighted())
				} else if ctx.state.suggestions.is_some() {
					if ctx.state.is_suggested(node) {
						Some(Patch {
							force_label: true,
							..Patch::default()
						})
					} else {
						Some(Patch::dimmed())
					}
				} else {
					None
				}
			}
		}
	}
}

/// Named rules feeding the edge reducer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeContributor {
	/// Stored attributes.
	Base,
	/// Page-specific size function.
	Size,
	/// Color from the gravity scale.
	GravityColor,
	/// The hovered edge grows and stands out.
	HoveredEdge,
	/// Edges away from the hovered node are hidden.
	HoveredNode,
	/// Edges with an endpoint outside the suggestions are hidden.
	Suggestions,
}

impl EdgeContributor {
	/// Evaluation order.
	pub const ORDER: [EdgeContributor; 6] = [
		EdgeContributor::Base,
		EdgeContributor::Size,
		EdgeContributor::GravityColor,
		EdgeContributor::HoveredEdge,
		EdgeContributor::HoveredNode,
		EdgeContributor::Suggestions,
	];

	/// Stable name, for logs and tests.
	pub fn name(self) -> &'static str {
		match self {
			EdgeContributor::Base => "base",
			EdgeContributor::Size => "size",
			EdgeContributor::GravityColor => "gravity-color",
			EdgeContributor::HoveredEdge => "hovered-edge",
			EdgeContributor::HoveredNode => "hovered-node",
			EdgeContributor::Suggestions => "suggestions",
		}
	}

	/// This rule's contribution for `edge`, if it applies.
	pub fn patch(self, ctx: &ReducerContext<'_>, edge: &str, attrs: &EdgeAttributes) -> Option<Patch> {
		match self {
			EdgeContributor::Base => Some(Patch {
				hide: attrs.hidden,
				size: Some(attrs.size),
				color: Some(attrs.color.clone()),
				..Patch::default()
			}),
			EdgeContributor::Size => {
				let size_of = ctx.options.edge_size?;
				Some(Patch {
					size: Some(size_of(edge, ctx.graph)),
					..Patch::default()
				})
			}
			EdgeContributor::GravityColor => {
				if !ctx.options.color_by_gravity {
					return None;
				}
				attrs.gravity.map(|g| Patch {
					color: Some(gravity_color(g)),
					..Patch::default()
				})
			}
			EdgeContributor::HoveredEdge => {
				let hovered = ctx.hovering_edge()?;
				let base = sized(ctx, edge, attrs);
				if edge == hovered {
					Some(Patch {
						raise: Some(true),
						size: Some(base * HOVERED_EDGE_SCALE),
						..Patch::highlighted()
					})
				} else {
					Some(Patch {
						raise: Some(false),
						size: Some(base),
						..Patch::dimmed()
					})
				}
			}
			EdgeContributor::HoveredNode => {
				let hovered = ctx.hovering_node()?;
				let (source, target) = ctx.graph.extremities(edge)?;
				if ctx.in_hover_neighborhood(hovered, source) && ctx.in_hover_neighborhood(hovered, target) {
					None
				} else {
					Some(Patch {
						hide: true,
						..Patch::dimmed()
					})
				}
			}
			EdgeContributor::Suggestions => {
				if !ctx.options.searchable || ctx.state.suggestions.is_none() {
					return None;
				}
				let (source, target) = ctx.graph.extremities(edge)?;
				if ctx.state.is_suggested(source) && ctx.state.is_suggested(target) {
					None
				} else {
					Some(Patch {
						hide: true,
						..Patch::default()
					})
				}
			}
		}
	}
}

/// Edge size after the configured size function, before hover scaling.
fn sized(ctx: &ReducerContext<'_>, edge: &str, attrs: &EdgeAttributes) -> f64 {
	ctx.options
		.edge_size
		.map_or(attrs.size, |size_of| size_of(edge, ctx.graph))
}

/// Sequential red scale over `[0, 1]`; out-of-range values are clamped.
pub fn gravity_color(gravity: f64) -> String {
	let c = colorous::REDS.eval_continuous(gravity.clamp(0.0, 1.0));
	format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

/// Merge every node contributor's patch over the stored attributes.
pub fn reduce_node(ctx: &ReducerContext<'_>, node: &str, attrs: &NodeAttributes) -> NodeDisplay {
	let patches = NodeContributor::ORDER
		.iter()
		.filter_map(|c| c.patch(ctx, node, attrs))
		.collect();
	let merged = Patch::merge(patches);
	let dimmed = merged.emphasis == Emphasis::Dimmed;

	NodeDisplay {
		x: attrs.x,
		y: attrs.y,
		size: merged.size.unwrap_or(attrs.size),
		label: if dimmed { String::new() } else { attrs.label.clone() },
		color: if dimmed {
			GREY_NODE.to_string()
		} else {
			merged.color.unwrap_or_else(|| attrs.color.clone())
		},
		highlighted: merged.emphasis == Emphasis::Highlighted,
		force_label: merged.force_label,
		hidden: merged.hide,
		z_index: i32::from(merged.raise == Some(true)),
	}
}

/// Merge every edge contributor's patch over the stored attributes.
pub fn reduce_edge(ctx: &ReducerContext<'_>, edge: &str, attrs: &EdgeAttributes) -> EdgeDisplay {
	let patches = EdgeContributor::ORDER
		.iter()
		.filter_map(|c| c.patch(ctx, edge, attrs))
		.collect();
	let merged = Patch::merge(patches);
	let dimmed = merged.emphasis == Emphasis::Dimmed;

	EdgeDisplay {
		size: merged.size.unwrap_or(attrs.size),
		label: if dimmed { String::new() } else { attrs.label.clone() },
		color: if dimmed {
			GREY_EDGE.to_string()
		} else {
			merged.color.unwrap_or_else(|| attrs.color.clone())
		},
		highlighted: merged.emphasis == Emphasis::Highlighted,
		hidden: merged.hide,
		z_index: i32::from(merged.raise == Some(true)),
	}
}

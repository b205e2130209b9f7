//! Canvas rendering for the coupling graph.
//!
//! Draws a reduced [`Frame`] in paint order:
//! 1. Background (screen space)
//! 2. Edges, lowest z-index first (world space)
//! 3. Nodes, lowest z-index first, then labels on top

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::state::Viewport;
use super::theme::{Theme, parse_color};
use crate::interaction::frame::{Frame, FrameEdge, FrameNode};

/// Renders the complete frame to the canvas.
pub fn render(
	frame: &Frame,
	viewport: &Viewport,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, viewport.transform.k);

	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);

	ctx.save();
	let _ = ctx.translate(viewport.transform.x, viewport.transform.y);
	let _ = ctx.scale(viewport.transform.k, viewport.transform.k);

	for edge in &frame.edges {
		draw_edge(ctx, edge, &scale);
	}
	for node in &frame.nodes {
		draw_node(ctx, node, &scale, theme);
	}
	ctx.set_font(&scale.label_font);
	for node in &frame.nodes {
		draw_label(ctx, node, &scale, theme);
	}

	ctx.restore();
}

fn draw_edge(ctx: &CanvasRenderingContext2d, edge: &FrameEdge, scale: &ScaledValues) {
	let ((x1, y1), (x2, y2)) = (edge.source, edge.target);
	ctx.set_stroke_style_str(&edge.display.color);
	ctx.set_line_width(scale.edge_width(edge.display.size));
	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(x2, y2);
	ctx.stroke();
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &FrameNode, scale: &ScaledValues, theme: &Theme) {
	let d = &node.display;
	let radius = scale.node_radius(d.size);

	if theme.node_gradient {
		let base = parse_color(&d.color);
		match ctx.create_radial_gradient(d.x - radius * 0.3, d.y - radius * 0.3, 0.0, d.x, d.y, radius) {
			Ok(gradient) => {
				let _ = gradient.add_color_stop(0.0, &base.lighten(0.35).to_css());
				let _ = gradient.add_color_stop(0.7, &base.to_css());
				let _ = gradient.add_color_stop(1.0, &base.darken(0.15).to_css());
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
			}
			Err(_) => ctx.set_fill_style_str(&d.color),
		}
	} else {
		ctx.set_fill_style_str(&d.color);
	}
	ctx.begin_path();
	let _ = ctx.arc(d.x, d.y, radius, 0.0, 2.0 * PI);
	ctx.fill();

	if d.highlighted {
		ctx.begin_path();
		let _ = ctx.arc(d.x, d.y, radius + scale.ring_offset, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&theme.highlight_ring.to_css());
		ctx.set_line_width(scale.ring_width);
		ctx.stroke();
	}
}

fn draw_label(ctx: &CanvasRenderingContext2d, node: &FrameNode, scale: &ScaledValues, theme: &Theme) {
	let d = &node.display;
	if d.label.is_empty() || !scale.shows_label(d.size, d.force_label || d.highlighted) {
		return;
	}
	let radius = scale.node_radius(d.size);
	ctx.set_fill_style_str(&theme.label.to_css());
	let _ = ctx.fill_text(&d.label, d.x + radius + 4.0 * scale.pixel, d.y + 3.0 * scale.pixel);
}

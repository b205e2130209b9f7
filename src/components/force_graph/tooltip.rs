//! The floating edge tooltip, backed by a DOM element.

use web_sys::HtmlElement;

use crate::interaction::Tooltip;

/// [`Tooltip`] backed by a positioned DOM element.
pub struct DomTooltip {
	element: HtmlElement,
	visible: bool,
}

impl DomTooltip {
	/// Takes over `element`, hiding it.
	pub fn new(element: HtmlElement) -> Self {
		let mut tooltip = Self {
			element,
			visible: true,
		};
		tooltip.hide();
		tooltip
	}
}

impl Tooltip for DomTooltip {
	fn show(&mut self, html: &str) {
		self.element.set_inner_html(html);
		let _ = self.element.style().set_property("display", "block");
		self.visible = true;
	}

	fn hide(&mut self) {
		let _ = self.element.style().set_property("display", "none");
		self.visible = false;
	}

	fn is_visible(&self) -> bool {
		self.visible
	}

	fn place(&mut self, left: f64, top: f64) {
		let style = self.element.style();
		let _ = style.set_property("left", &format!("{left}px"));
		let _ = style.set_property("top", &format!("{top}px"));
	}

	fn scroll_offset(&self) -> (f64, f64) {
		web_sys::window()
			.map(|w| (w.scroll_x().unwrap_or(0.0), w.scroll_y().unwrap_or(0.0)))
			.unwrap_or((0.0, 0.0))
	}
}

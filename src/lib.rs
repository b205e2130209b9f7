//! coupling-graph: Interactive visualization of coupling between microservices.
//!
//! Renders coupling snapshots (services as nodes, weighted couplings as edges)
//! as a force-directed graph with hover highlighting, search, gravity range
//! filtering and a drill-down page showing the coupled files behind one edge.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info};

pub mod components;
pub mod error;
pub mod graph;
pub mod interaction;
pub mod loader;
pub mod params;

pub use components::{EdgeDetailPage, GraphPage};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("coupling-graph: logging initialized");
}

/// Which page the current document is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
	/// `index.html`: the whole-system graph.
	Graph,
	/// `analyze.html`: files behind one coupling.
	EdgeDetail,
}

impl Route {
	/// Page for a location path.
	pub fn from_path(path: &str) -> Self {
		if path.contains("analyze") {
			Self::EdgeDetail
		} else {
			Self::Graph
		}
	}
}

/// Main application component.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let path = web_sys::window()
		.and_then(|w| w.location().pathname().ok())
		.unwrap_or_default();

	let (title, page) = match Route::from_path(&path) {
		Route::Graph => ("Microservice Coupling", view! { <GraphPage /> }.into_any()),
		Route::EdgeDetail => ("Coupling Analysis", view! { <EdgeDetailPage /> }.into_any()),
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text=title />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		{page}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn analyze_paths_route_to_edge_detail() {
		assert_eq!(Route::from_path("/analyze.html"), Route::EdgeDetail);
		assert_eq!(Route::from_path("/"), Route::Graph);
		assert_eq!(Route::from_path("/index.html"), Route::Graph);
	}
}

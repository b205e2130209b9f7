//! The two pages: the whole-system coupling graph and the file-level detail
//! of one coupling between two microservices.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error, info};
use wasm_bindgen::JsValue;
use web_sys::UrlSearchParams;

use super::force_graph::{CouplingGraphCanvas, GraphSession, SharedStage, Stage, run_layout};
use crate::graph::filter::{GravityRange, membership_subgraph, search_labels};
use crate::graph::style::{self, ColorRegistry};
use crate::interaction::PageOptions;
use crate::interaction::reducers::gravity_color;
use crate::loader::{FILES_SNAPSHOT, LoadGeneration, SnapshotClient};
use crate::params::{EdgeDetailParams, GraphViewParams};

/// Query-string lookup for the current page.
fn query_lookup() -> impl Fn(&str) -> Option<String> {
	let params = web_sys::window()
		.and_then(|w| w.location().search().ok())
		.and_then(|search| UrlSearchParams::new_with_str(&search).ok());
	move |key: &str| params.as_ref().and_then(|p| p.get(key))
}

fn snapshot_client() -> SnapshotClient {
	let origin = web_sys::window()
		.and_then(|w| w.location().origin().ok())
		.unwrap_or_default();
	SnapshotClient::new(origin)
}

fn replace_query(query: &str) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let path = window.location().pathname().unwrap_or_default();
	if let Ok(history) = window.history() {
		let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&format!("{path}{query}")));
	}
}

fn legend_entries(colors: &ColorRegistry) -> Vec<(String, String)> {
	colors
		.entries()
		.map(|(label, color)| (label.to_string(), color.to_string()))
		.collect()
}

/// Reactive UI state shared by both pages' controls.
#[derive(Clone, Copy)]
struct Controls {
	labels: RwSignal<Vec<String>>,
	legend: RwSignal<Vec<(String, String)>>,
	range: RwSignal<(f64, f64)>,
	visible: RwSignal<Option<(usize, usize)>>,
}

impl Controls {
	fn new() -> Self {
		let full = GravityRange::default();
		Self {
			labels: RwSignal::new(Vec::new()),
			legend: RwSignal::new(Vec::new()),
			range: RwSignal::new((full.min, full.max)),
			visible: RwSignal::new(None),
		}
	}

	/// Hand a freshly built session to the stage and start its layout.
	fn show(self, stage: &SharedStage, session: GraphSession) {
		self.reset_range();
		self.labels.set(search_labels(&session.graph));
		self.legend.set(legend_entries(&session.colors));
		let load = stage.borrow_mut().load(session);
		run_layout(stage, load);
	}

	/// Leave the stage empty, as before any load.
	fn clear(self, stage: &SharedStage) {
		self.reset_range();
		self.labels.set(Vec::new());
		self.legend.set(Vec::new());
		stage.borrow_mut().unload();
	}

	fn reset_range(self) {
		let full = GravityRange::default();
		self.range.set((full.min, full.max));
		self.visible.set(None);
	}
}

#[component]
fn SearchBox(stage: SharedStage, controls: Controls) -> impl IntoView {
	let (stage_in, stage_blur) = (stage.clone(), stage);
	view! {
		<div class="search">
			<input
				id="search-input"
				type="search"
				list="suggestions"
				placeholder="Search microservices..."
				on:input=move |ev| {
					let value = event_target_value(&ev);
					stage_in.borrow_mut().with_handlers(|h, vp| h.search_input(&value, vp));
				}
				on:blur=move |_| {
					stage_blur.borrow_mut().with_handlers(|h, vp| h.search_blur(vp));
				}
			/>
			<datalist id="suggestions">
				{move || {
					controls
						.labels
						.get()
						.into_iter()
						.map(|label| view! { <option value=label /> })
						.collect_view()
				}}
			</datalist>
		</div>
	}
}

#[component]
fn GravitySlider(stage: SharedStage, controls: Controls) -> impl IntoView {
	let apply = move |stage: &SharedStage| {
		let thumbs = controls.range.get_untracked();
		let summary = stage.borrow_mut().with_handlers(|h, vp| h.range_updated(thumbs, vp));
		if let Some(summary) = summary {
			controls.visible.set(Some((summary.visible_edges, summary.visible_nodes)));
		}
	};
	let (stage_lo, stage_hi) = (stage.clone(), stage);
	let parse = |ev: &leptos::ev::Event| event_target_value(ev).parse::<f64>().ok();

	view! {
		<div class="gravity-filter">
			<label>"Coupling"</label>
			<input
				id="gravity-min"
				type="range"
				min="0"
				max="1"
				step="0.01"
				prop:value=move || controls.range.get().0.to_string()
				on:input=move |ev| {
					if let Some(v) = parse(&ev) {
						controls.range.update(|r| r.0 = v);
						apply(&stage_lo);
					}
				}
			/>
			<input
				id="gravity-max"
				type="range"
				min="0"
				max="1"
				step="0.01"
				prop:value=move || controls.range.get().1.to_string()
				on:input=move |ev| {
					if let Some(v) = parse(&ev) {
						controls.range.update(|r| r.1 = v);
						apply(&stage_hi);
					}
				}
			/>
			<span id="min-gravity">
				{move || {
					let (a, b) = controls.range.get();
					format!("{:.2}", a.min(b))
				}}
			</span>
			" - "
			<span id="max-gravity">
				{move || {
					let (a, b) = controls.range.get();
					format!("{:.2}", a.max(b))
				}}
			</span>
			{move || {
				controls
					.visible
					.get()
					.map(|(edges, nodes)| format!(" ({edges} couplings, {nodes} services)"))
			}}
		</div>
	}
}

#[component]
fn Legend(controls: Controls) -> impl IntoView {
	view! {
		<div id="legend-items" class="legend">
			{move || {
				controls
					.legend
					.get()
					.into_iter()
					.map(|(label, color)| {
						view! {
							<div class="legend-item">
								<div class="legend-color" style:background-color=color></div>
								<span>{label}</span>
							</div>
						}
					})
					.collect_view()
			}}
		</div>
	}
}

/// Gradient strip for the gravity color scale.
#[component]
fn ColorScaleLegend() -> impl IntoView {
	let stops: Vec<String> = [0.0, 0.25, 0.5, 0.75, 1.0]
		.iter()
		.map(|&g| format!("{} {}%", gravity_color(g), g * 100.0))
		.collect();
	let background = format!("linear-gradient(to right, {})", stops.join(", "));
	view! {
		<div class="color-scale">
			<div
				id="color-scale-gradient"
				style:height="20px"
				style:width="100%"
				style:background=background
			></div>
			<div class="color-scale-labels">
				<span>"0"</span>
				<span>"1"</span>
			</div>
		</div>
	}
}

/// Whole-system coupling graph, optionally for one build.
#[component]
pub fn GraphPage() -> impl IntoView {
	let stage = Stage::shared();
	let tooltip = NodeRef::<leptos::html::Div>::new();
	let controls = Controls::new();
	let generation = LoadGeneration::default();
	let builds = RwSignal::new(Vec::<String>::new());
	let params = RwSignal::new(GraphViewParams::from_lookup(query_lookup()));

	let load = {
		let stage = stage.clone();
		move |params: GraphViewParams| {
			let ticket = generation.next();
			let stage = stage.clone();
			spawn_local(async move {
				let client = snapshot_client();
				let result = client.load_graph_view(&params).await;
				if !ticket.is_current() {
					debug!("coupling-graph: dropping stale load");
					return;
				}
				match result {
					Ok(snapshot) => {
						let (graph, colors) = style::graph_view(&snapshot);
						info!(
							"coupling-graph: showing {} services, {} couplings",
							graph.node_count(),
							graph.edge_count()
						);
						controls.show(&stage, GraphSession::new(graph, PageOptions::graph_view(), colors));
					}
					Err(err) => {
						error!("coupling-graph: {err}");
						controls.clear(&stage);
					}
				}
			});
		}
	};

	load(params.get_untracked());
	spawn_local(async move {
		match snapshot_client().list_builds().await {
			Ok(ids) => builds.set(ids),
			Err(err) => error!("coupling-graph: {err}"),
		}
	});

	let stage_nav = stage.clone();
	let navigate = move |next: GraphViewParams| {
		controls.clear(&stage_nav);
		replace_query(&next.to_query());
		params.set(next.clone());
		load(next);
	};
	let navigate_build = navigate.clone();
	let on_build = move |ev: leptos::ev::Event| {
		let value = event_target_value(&ev);
		let mut next = params.get_untracked();
		next.build_id = (!value.is_empty()).then_some(value);
		navigate_build(next);
	};
	let on_commit_view = move |ev: leptos::ev::Event| {
		let mut next = params.get_untracked();
		next.commit_view = event_target_checked(&ev);
		navigate(next);
	};

	view! {
		<div class="page graph-page">
			<div class="controls">
				<SearchBox stage=stage.clone() controls=controls />
				<GravitySlider stage=stage.clone() controls=controls />
				<div class="build-picker">
					<select id="build-select" on:change=on_build>
						<option value="" selected=move || params.get().build_id.is_none()>
							"Baseline"
						</option>
						{move || {
							let current = params.get().build_id;
							builds
								.get()
								.into_iter()
								.map(|id| {
									let selected = current.as_deref() == Some(id.as_str());
									let value = id.clone();
									view! { <option value=value selected=selected>{id}</option> }
								})
								.collect_view()
						}}
					</select>
					<label>
						<input
							type="checkbox"
							prop:checked=move || params.get().commit_view
							on:change=on_commit_view
						/>
						" Commit view"
					</label>
				</div>
				<Legend controls=controls />
				<ColorScaleLegend />
			</div>
			<div id="sigma-container" class="graph-container">
				<CouplingGraphCanvas stage=stage tooltip=tooltip />
			</div>
			<div id="tooltip" class="tooltip" node_ref=tooltip></div>
		</div>
	}
}

/// Files of two microservices and the couplings between them.
#[component]
pub fn EdgeDetailPage() -> impl IntoView {
	let params = match EdgeDetailParams::from_lookup(query_lookup()) {
		Ok(params) => params,
		Err(err) => {
			error!("coupling-graph: {err}");
			return view! {
				<div id="error-message" class="error-banner" style:display="block">
					{format!("Invalid parameters: {err}")}
				</div>
			}
			.into_any();
		}
	};

	let stage = Stage::shared();
	let tooltip = NodeRef::<leptos::html::Div>::new();
	let controls = Controls::new();
	let heading = format!(
		"{} ↔ {} ({} files, coupling {})",
		params.source, params.target, params.files, params.gravity
	);

	let stage_load = stage.clone();
	spawn_local(async move {
		match snapshot_client().fetch_snapshot(FILES_SNAPSHOT).await {
			Ok(snapshot) => {
				let sub = membership_subgraph(&snapshot, &params.source, &params.target);
				let (graph, colors) = style::edge_detail(&sub, &params.source);
				info!(
					"coupling-graph: {} files coupled between {} and {}",
					graph.node_count(),
					params.source,
					params.target
				);
				controls.show(&stage_load, GraphSession::new(graph, PageOptions::edge_detail(), colors));
			}
			Err(err) => error!("coupling-graph: {err}"),
		}
	});

	view! {
		<div class="page edge-detail-page">
			<div class="controls">
				<h2>{heading}</h2>
				<SearchBox stage=stage.clone() controls=controls />
				<GravitySlider stage=stage.clone() controls=controls />
				<Legend controls=controls />
				<ColorScaleLegend />
			</div>
			<div id="sigma-container" class="graph-container">
				<CouplingGraphCanvas stage=stage tooltip=tooltip />
			</div>
			<div id="tooltip" class="tooltip" node_ref=tooltip></div>
		</div>
	}
	.into_any()
}

//! star-constellation: a knowledge graph rendered as an interactive star map.
//!
//! This crate provides a WASM-based canvas component that lays out the
//! best-connected concepts of a knowledge graph with a force simulation and
//! draws them as stars, with dragging, pan/zoom, hover, and sparkle effects.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

pub mod components;
pub mod error;

pub use components::constellation::{
	Category, ConstellationCanvas, ConstellationConfig, GraphData, GraphLink, GraphNode,
	category_counts, select,
};
pub use error::DataError;

/// Id of the `<script type="application/json">` element holding the graph document.
pub const GRAPH_DATA_ID: &str = "graph-data";
/// Id of the optional `<script type="application/json">` element holding a
/// [`ConstellationConfig`].
pub const CONFIG_ID: &str = "constellation-config";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("constellation: logging initialized");
}

fn script_text(id: &'static str) -> Result<String, DataError> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or(DataError::MissingWindow)?;
	let element = document
		.get_element_by_id(id)
		.ok_or(DataError::MissingElement(id))?;
	let script: HtmlScriptElement = element
		.dyn_into()
		.map_err(|_| DataError::NotAScript(id))?;
	Ok(script.text().unwrap_or_default())
}

/// Load graph data from the script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], links?: [...], metadata?: {...} }
pub fn load_graph_data() -> Result<GraphData, DataError> {
	let data = GraphData::from_json(&script_text(GRAPH_DATA_ID)?)?;
	info!(
		"constellation: loaded {} nodes, {} links",
		data.nodes.len(),
		data.links.len()
	);
	Ok(data)
}

/// Load the constellation configuration from the script element with
/// id="constellation-config".
pub fn load_config() -> Result<ConstellationConfig, DataError> {
	ConstellationConfig::from_json(&script_text(CONFIG_ID)?)
}

/// Main application component.
/// Loads graph data from DOM and renders the constellation with its legend.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_else(|e| {
		warn!("constellation: failed to load graph data: {}", e);
		GraphData::default()
	});
	let config = match load_config() {
		Ok(config) => config,
		// The config element is optional.
		Err(DataError::MissingElement(_)) => ConstellationConfig::default(),
		Err(e) => {
			warn!("constellation: failed to load config, using defaults: {}", e);
			ConstellationConfig::default()
		}
	};

	let shown = select(&graph_data.nodes, &graph_data.links, config.subset);
	let stats = format!(
		"{} / {} concepts, {} / {} links",
		shown.nodes.len(),
		graph_data.total_nodes(),
		shown.links.len(),
		graph_data.total_links()
	);
	let legend = category_counts(&graph_data.nodes);
	let graph_signal = Signal::derive(move || graph_data.clone());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Knowledge Constellation" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ConstellationCanvas data=graph_signal config=config fullscreen=true />
			<div class="graph-overlay">
				<h1>"Knowledge Constellation"</h1>
				<p class="subtitle">"Drag stars to reposition. Scroll or pinch to zoom. Drag the sky to pan."</p>
				<p class="stats">{stats}</p>
				<ul class="legend">
					{legend
						.into_iter()
						.map(|(category, count)| {
							let swatch = format!(
								"background: {};",
								category.style().color.to_css(),
							);
							view! {
								<li>
									<span class="swatch" style=swatch></span>
									{category.as_str()}
									" "
									{count}
								</li>
							}
						})
						.collect_view()}
				</ul>
			</div>
		</div>
	}
}

//! Knowledge-graph constellation component.
//!
//! Renders a knowledge graph on an HTML canvas as a night sky:
//! - Concepts become stars, colored and sized by a category derived from their tags
//! - The best-connected concepts form a bounded working set, laid out by a force simulation
//! - Stars can be dragged; the view pans, zooms and pinches
//! - Hover enlarges a star and its label; markers twinkle on their own timer
//!
//! # Example
//!
//! ```ignore
//! use star_constellation::{ConstellationCanvas, GraphData, GraphNode};
//!
//! let data = GraphData::from_nodes(vec![
//!     GraphNode { id: "rust".into(), title: "Rust".into(), tags: vec!["プログラミング言語".into()], links: vec!["wasm".into()], ..Default::default() },
//!     GraphNode { id: "wasm".into(), title: "WebAssembly".into(), ..Default::default() },
//! ]);
//!
//! view! { <ConstellationCanvas data=Signal::derive(move || data.clone()) fullscreen=true /> }
//! ```

mod category;
mod component;
mod config;
mod interaction;
mod quadtree;
mod render;
mod scale;
mod scene;
mod simulation;
mod sparkle;
mod state;
mod subset;
mod theme;
mod types;

pub use category::{
	CATEGORY_RULES, CATEGORY_RULES_VERSION, Category, CategoryStyle, category_counts, classify,
};
pub use component::ConstellationCanvas;
pub use config::ConstellationConfig;
pub use state::ConstellationState;
pub use subset::{RankedNode, SubsetLimits, WorkingSet, select};
pub use types::{GraphData, GraphLink, GraphMetadata, GraphNode, flatten_links};

//! Bounds a large graph to a renderable working set.
//!
//! Nodes are ranked by out-degree in the full graph; links are filtered to the
//! selected nodes and then hard-capped in their original order.

use std::cmp::Reverse;
use std::collections::HashSet;

use serde::Deserialize;

use super::types::{GraphLink, GraphNode};

/// Caps applied to the working set.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubsetLimits {
	/// Most nodes kept.
	pub max_nodes: usize,
	/// Most links kept, counted after filtering to kept nodes.
	pub max_links: usize,
}

impl Default for SubsetLimits {
	fn default() -> Self {
		Self {
			max_nodes: 50,
			max_links: 100,
		}
	}
}

/// A selected node with its degree in the full input graph.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedNode {
	/// The input node.
	pub node: GraphNode,
	/// Number of input links with this node as source.
	pub degree: usize,
}

/// Output of [`select`]: the nodes and links fed to the simulation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkingSet {
	/// Selected nodes, highest degree first.
	pub nodes: Vec<RankedNode>,
	/// Links between selected nodes, in input order.
	pub links: Vec<GraphLink>,
}

impl WorkingSet {
	/// Whether no node was selected.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Selects at most `limits.max_nodes` nodes by descending degree (ties keep input
/// order), then at most `limits.max_links` links whose endpoints were both
/// selected, taken in input order.
pub fn select(nodes: &[GraphNode], links: &[GraphLink], limits: SubsetLimits) -> WorkingSet {
	let mut ranked: Vec<RankedNode> = nodes
		.iter()
		.map(|node| RankedNode {
			degree: node.links.len(),
			node: node.clone(),
		})
		.collect();
	// `sort_by_key` is stable, which gives the input-order tie-break.
	ranked.sort_by_key(|r| Reverse(r.degree));
	ranked.truncate(limits.max_nodes);

	let ids: HashSet<&str> = ranked.iter().map(|r| r.node.id.as_str()).collect();
	let links = links
		.iter()
		.filter(|l| ids.contains(l.source.as_str()) && ids.contains(l.target.as_str()))
		.take(limits.max_links)
		.cloned()
		.collect();

	WorkingSet {
		nodes: ranked,
		links,
	}
}

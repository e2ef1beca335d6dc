//! Graph data structures handed to the constellation by the data provider.

use serde::Deserialize;

use crate::error::DataError;

/// Relationship label given to links synthesised from `GraphNode::links`.
pub const DEFAULT_RELATIONSHIP: &str = "related";

/// A concept in the knowledge graph.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// Display title, drawn as the star's label.
	pub title: String,
	/// Body text. Carried along but not drawn.
	#[serde(default)]
	pub content: String,
	/// Free-form tags; the category is derived from these.
	#[serde(default)]
	pub tags: Vec<String>,
	/// Ids of related nodes. May reference ids that are not in the graph.
	#[serde(default)]
	pub links: Vec<String>,
}

/// A directed relation between two nodes.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GraphLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Kind of relation, `"related"` unless the provider says otherwise.
	#[serde(default = "default_relationship")]
	pub relationship: String,
}

fn default_relationship() -> String {
	DEFAULT_RELATIONSHIP.to_string()
}

impl GraphLink {
	/// A `"related"` link from `source` to `target`.
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			relationship: default_relationship(),
		}
	}
}

/// Totals reported by the data provider for the full graph.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct GraphMetadata {
	/// Node count of the full graph, 0 when unknown.
	#[serde(default)]
	pub total_nodes: usize,
	/// Link count of the full graph, 0 when unknown.
	#[serde(default)]
	pub total_links: usize,
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	/// All nodes, in provider order.
	pub nodes: Vec<GraphNode>,
	/// All links, in provider order. Endpoints may be missing from `nodes`.
	pub links: Vec<GraphLink>,
	/// Provider totals, if reported.
	pub metadata: Option<GraphMetadata>,
}

/// Wire shape of the provider document. `links` is only present in
/// pre-built sample data.
#[derive(Deserialize)]
struct GraphDocument {
	#[serde(default)]
	nodes: Vec<GraphNode>,
	#[serde(default)]
	links: Option<Vec<GraphLink>>,
	#[serde(default)]
	metadata: Option<GraphMetadata>,
}

impl GraphData {
	/// Builds graph data from nodes alone, synthesising one link per
	/// `node.links` entry.
	pub fn from_nodes(nodes: Vec<GraphNode>) -> Self {
		let links = flatten_links(&nodes);
		Self {
			nodes,
			links,
			metadata: None,
		}
	}

	/// Parses a provider document `{ nodes, links?, metadata? }`.
	pub fn from_json(text: &str) -> Result<Self, DataError> {
		let doc: GraphDocument = serde_json::from_str(text)?;
		let links = match doc.links {
			Some(links) => links,
			None => flatten_links(&doc.nodes),
		};
		Ok(Self {
			nodes: doc.nodes,
			links,
			metadata: doc.metadata,
		})
	}

	/// Total node count, preferring the provider's figure when reported.
	pub fn total_nodes(&self) -> usize {
		self.metadata
			.map(|m| m.total_nodes)
			.filter(|&n| n > 0)
			.unwrap_or(self.nodes.len())
	}

	/// Total link count, preferring the provider's figure when reported.
	pub fn total_links(&self) -> usize {
		self.metadata
			.map(|m| m.total_links)
			.filter(|&n| n > 0)
			.unwrap_or(self.links.len())
	}
}

/// Flattens every node's `links` array into `source -> target` links, in node
/// order then link order. Targets are not checked for existence.
pub fn flatten_links(nodes: &[GraphNode]) -> Vec<GraphLink> {
	nodes
		.iter()
		.flat_map(|node| {
			node.links
				.iter()
				.map(move |target| GraphLink::new(node.id.clone(), target.clone()))
		})
		.collect()
}

#[cfg(test)]
pub(crate) fn node(id: &str, tags: &[&str], links: &[&str]) -> GraphNode {
	GraphNode {
		id: id.to_string(),
		title: id.to_uppercase(),
		content: String::new(),
		tags: tags.iter().map(|t| t.to_string()).collect(),
		links: links.iter().map(|l| l.to_string()).collect(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_flatten_links_preserves_order() {
		let nodes = vec![node("a", &[], &["b", "c"]), node("b", &[], &["c"])];
		let links = flatten_links(&nodes);
		assert_eq!(
			links,
			vec![
				GraphLink::new("a", "b"),
				GraphLink::new("a", "c"),
				GraphLink::new("b", "c"),
			]
		);
		assert!(links.iter().all(|l| l.relationship == "related"));
	}

	#[test]
	fn test_flatten_keeps_unknown_targets() {
		let links = flatten_links(&[node("a", &[], &["ghost"])]);
		assert_eq!(links, vec![GraphLink::new("a", "ghost")]);
	}

	#[test]
	fn test_from_json_synthesises_links() {
		let json = r#"{
			"nodes": [
				{"id": "python", "title": "Python", "content": "", "tags": ["プログラミング言語"], "links": ["django"]},
				{"id": "django", "title": "Django", "content": "", "tags": ["フレームワーク"], "links": []}
			],
			"metadata": {"total_nodes": 101, "total_links": 508}
		}"#;
		let data = GraphData::from_json(json).unwrap();
		assert_eq!(data.nodes.len(), 2);
		assert_eq!(data.links, vec![GraphLink::new("python", "django")]);
		assert_eq!(data.total_nodes(), 101);
		assert_eq!(data.total_links(), 508);
	}

	#[test]
	fn test_from_json_uses_prebuilt_links() {
		let json = r#"{
			"nodes": [{"id": "a", "title": "A"}, {"id": "b", "title": "B"}],
			"links": [{"source": "a", "target": "b", "relationship": "uses"}]
		}"#;
		let data = GraphData::from_json(json).unwrap();
		assert_eq!(data.links.len(), 1);
		assert_eq!(data.links[0].relationship, "uses");
		assert_eq!(data.total_nodes(), 2);
		assert!(data.metadata.is_none());
	}

	#[test]
	fn test_from_json_rejects_malformed() {
		assert!(matches!(
			GraphData::from_json("{\"nodes\": 3}"),
			Err(DataError::Parse(_))
		));
	}
}

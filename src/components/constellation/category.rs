//! Tag-based category classification and the per-category star styles.
//!
//! The priority table and style table here are the only copies in the crate;
//! every renderer resolves colors and sizes through [`Category::style`].

use std::collections::BTreeMap;

use super::theme::Color;
use super::types::GraphNode;

/// Category a concept is drawn as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
	/// Programming languages.
	Language,
	/// Frameworks and libraries.
	Framework,
	/// Developer tooling.
	Tool,
	/// Databases and storage engines.
	Database,
	/// Algorithms.
	Algorithm,
	/// Design patterns.
	Pattern,
	/// Cloud platforms and infrastructure.
	Cloud,
	/// AI and machine learning.
	Ai,
	/// Security.
	Security,
	/// Anything no rule matched.
	Other,
}

/// Fixed visual attributes of a category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CategoryStyle {
	/// Star fill.
	pub color: Color,
	/// Star radius in world units before hover scaling.
	pub radius: f64,
}

/// Revision of [`CATEGORY_RULES`]. Bump whenever the table changes, since any
/// reordering changes classification outcomes.
pub const CATEGORY_RULES_VERSION: u32 = 1;

/// Ordered `(keyword, category)` pairs. The first keyword found as a substring of
/// any tag decides the category.
pub const CATEGORY_RULES: &[(&str, Category)] = &[
	("プログラミング言語", Category::Language),
	("フレームワーク", Category::Framework),
	("開発ツール", Category::Tool),
	("データベース", Category::Database),
	("アルゴリズム", Category::Algorithm),
	("デザインパターン", Category::Pattern),
	("クラウド", Category::Cloud),
	("AI", Category::Ai),
	("機械学習", Category::Ai),
	("セキュリティ", Category::Security),
];

impl Category {
	/// Every category, in legend order.
	pub const ALL: [Category; 10] = [
		Category::Language,
		Category::Framework,
		Category::Tool,
		Category::Database,
		Category::Algorithm,
		Category::Pattern,
		Category::Cloud,
		Category::Ai,
		Category::Security,
		Category::Other,
	];

	/// Stable lowercase name, used as a CSS class in the legend.
	pub fn as_str(self) -> &'static str {
		match self {
			Category::Language => "language",
			Category::Framework => "framework",
			Category::Tool => "tool",
			Category::Database => "database",
			Category::Algorithm => "algorithm",
			Category::Pattern => "pattern",
			Category::Cloud => "cloud",
			Category::Ai => "ai",
			Category::Security => "security",
			Category::Other => "other",
		}
	}

	/// Color and base radius of stars in this category.
	pub fn style(self) -> CategoryStyle {
		let (color, radius) = match self {
			Category::Language => (0x4fc3f7, 8.0),
			Category::Framework => (0x81c784, 10.0),
			Category::Tool => (0xffb74d, 7.0),
			Category::Database => (0xba68c8, 9.0),
			Category::Algorithm => (0xf06292, 6.0),
			Category::Pattern => (0xa1887f, 6.0),
			Category::Cloud => (0x4dd0e1, 11.0),
			Category::Ai => (0xff8a65, 12.0),
			Category::Security => (0xe57373, 8.0),
			Category::Other => (0x90a4ae, 5.0),
		};
		CategoryStyle {
			color: Color::hex(color),
			radius,
		}
	}
}

/// Classifies a tag set by walking [`CATEGORY_RULES`] in order.
pub fn classify<S: AsRef<str>>(tags: &[S]) -> Category {
	CATEGORY_RULES
		.iter()
		.find(|(keyword, _)| tags.iter().any(|tag| tag.as_ref().contains(keyword)))
		.map(|&(_, category)| category)
		.unwrap_or(Category::Other)
}

/// Number of nodes per category over the full graph. Categories without nodes
/// are omitted.
pub fn category_counts(nodes: &[GraphNode]) -> BTreeMap<Category, usize> {
	let mut counts = BTreeMap::new();
	for node in nodes {
		*counts.entry(classify(&node.tags)).or_insert(0) += 1;
	}
	counts
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::constellation::types::node;
	use proptest::prelude::*;

	#[test]
	fn test_first_rule_wins_regardless_of_tag_order() {
		assert_eq!(classify(&["プログラミング言語", "AI"]), Category::Language);
		assert_eq!(classify(&["AI", "プログラミング言語"]), Category::Language);
	}

	#[test]
	fn test_keyword_matches_as_substring() {
		assert_eq!(classify(&["AI・機械学習"]), Category::Ai);
		assert_eq!(classify(&["深層機械学習"]), Category::Ai);
		assert_eq!(classify(&["開発ツール全般", "コンテナ"]), Category::Tool);
	}

	#[test]
	fn test_unmatched_tags_fall_through_to_other() {
		assert_eq!(classify(&["ライブラリ", "3D"]), Category::Other);
		assert_eq!(classify::<&str>(&[]), Category::Other);
	}

	#[test]
	fn test_every_rule_maps_to_its_category() {
		for (keyword, category) in CATEGORY_RULES {
			assert_eq!(classify(&[*keyword]), *category, "keyword {keyword}");
		}
	}

	#[test]
	fn test_styles_are_distinct_per_category() {
		let colors: std::collections::HashSet<String> = Category::ALL
			.iter()
			.map(|c| c.style().color.to_css())
			.collect();
		assert_eq!(colors.len(), Category::ALL.len());
		assert_eq!(Category::Ai.style().radius, 12.0);
		assert_eq!(Category::Other.style().radius, 5.0);
	}

	#[test]
	fn test_category_counts() {
		let nodes = vec![
			node("py", &["プログラミング言語"], &[]),
			node("rs", &["プログラミング言語"], &[]),
			node("pg", &["データベース"], &[]),
			node("x", &["misc"], &[]),
		];
		let counts = category_counts(&nodes);
		assert_eq!(counts.get(&Category::Language), Some(&2));
		assert_eq!(counts.get(&Category::Database), Some(&1));
		assert_eq!(counts.get(&Category::Other), Some(&1));
		assert_eq!(counts.get(&Category::Cloud), None);
	}

	proptest! {
		#[test]
		fn prop_classify_is_deterministic(tags in proptest::collection::vec(".{0,8}", 0..6)) {
			prop_assert_eq!(classify(&tags), classify(&tags));
		}

		#[test]
		fn prop_classify_ignores_tag_order(mut tags in proptest::collection::vec(
			prop_oneof![
				Just("プログラミング言語".to_string()),
				Just("クラウド".to_string()),
				Just("AI".to_string()),
				Just("セキュリティ".to_string()),
				"[a-z]{1,6}",
			],
			0..6,
		)) {
			let forward = classify(&tags);
			tags.reverse();
			prop_assert_eq!(forward, classify(&tags));
		}
	}
}

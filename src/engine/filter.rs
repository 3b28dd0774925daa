//! Category and relation filters and the visibility they imply.

use std::collections::{BTreeMap, HashSet};

use super::types::{NodeRecord, ValidEdge};

/// Enabled/disabled flags for every category and relation present in the
/// loaded scene.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
	categories: BTreeMap<String, bool>,
	relations: BTreeMap<String, bool>,
}

impl FilterState {
	/// Derives the filter sets from the values actually present, all enabled.
	pub fn from_elements(nodes: &[NodeRecord], edges: &[ValidEdge]) -> Self {
		Self {
			categories: nodes
				.iter()
				.map(|n| (n.effective_category().to_owned(), true))
				.collect(),
			relations: edges
				.iter()
				.filter_map(|e| e.relation())
				.map(|r| (r.to_owned(), true))
				.collect(),
		}
	}

	/// Returns `true` if the flag changed. Unknown categories are ignored.
	pub fn toggle_category(&mut self, category: &str, enabled: bool) -> bool {
		set_flag(&mut self.categories, category, enabled)
	}

	/// Returns `true` if the flag changed. Unknown relations are ignored.
	pub fn toggle_relation(&mut self, relation: &str, enabled: bool) -> bool {
		set_flag(&mut self.relations, relation, enabled)
	}

	pub fn is_category_enabled(&self, category: &str) -> bool {
		self.categories.get(category).copied().unwrap_or(false)
	}

	/// Edges without a relation are never filtered by relation.
	pub fn is_relation_enabled(&self, relation: Option<&str>) -> bool {
		match relation {
			Some(rel) => self.relations.get(rel).copied().unwrap_or(false),
			None => true,
		}
	}

	/// Categories in sorted order with their enabled flag.
	pub fn categories(&self) -> impl Iterator<Item = (&str, bool)> {
		self.categories.iter().map(|(k, v)| (k.as_str(), *v))
	}

	/// Relations in sorted order with their enabled flag.
	pub fn relations(&self) -> impl Iterator<Item = (&str, bool)> {
		self.relations.iter().map(|(k, v)| (k.as_str(), *v))
	}
}

fn set_flag(flags: &mut BTreeMap<String, bool>, key: &str, enabled: bool) -> bool {
	match flags.get_mut(key) {
		Some(flag) if *flag != enabled => {
			*flag = enabled;
			true
		}
		_ => false,
	}
}

/// Which elements the current filters hide.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibilitySnapshot {
	pub hidden_nodes: HashSet<String>,
	pub hidden_edges: HashSet<String>,
}

impl VisibilitySnapshot {
	pub fn is_node_hidden(&self, id: &str) -> bool {
		self.hidden_nodes.contains(id)
	}

	pub fn is_edge_hidden(&self, id: &str) -> bool {
		self.hidden_edges.contains(id)
	}
}

/// A node is hidden iff its category is disabled; an edge is hidden iff its
/// relation is disabled or either endpoint is hidden.
pub fn compute_visibility(
	filters: &FilterState,
	nodes: &[NodeRecord],
	edges: &[ValidEdge],
) -> VisibilitySnapshot {
	let hidden_nodes: HashSet<String> = nodes
		.iter()
		.filter(|n| !filters.is_category_enabled(n.effective_category()))
		.map(|n| n.id.clone())
		.collect();
	let hidden_edges = edges
		.iter()
		.filter(|e| {
			!filters.is_relation_enabled(e.relation())
				|| hidden_nodes.contains(&e.source)
				|| hidden_nodes.contains(&e.target)
		})
		.map(|e| e.id.clone())
		.collect();
	VisibilitySnapshot {
		hidden_nodes,
		hidden_edges,
	}
}

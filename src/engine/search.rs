//! Label search and the highlight/fade state it produces.

use std::collections::HashSet;

use log::debug;
use regex::{Regex, RegexBuilder};

use super::types::NodeRecord;

/// Compiled form of a search query.
#[derive(Clone, Debug)]
pub enum Matcher {
	Pattern(Regex),
	/// Lower-cased needle used when the query is not a valid pattern.
	Substring(String),
}

impl Matcher {
	/// Case-insensitive pattern, or case-insensitive substring if the query
	/// does not compile.
	pub fn compile(query: &str) -> Self {
		match RegexBuilder::new(query).case_insensitive(true).build() {
			Ok(rx) => Self::Pattern(rx),
			Err(err) => {
				debug!("search query is not a pattern, using substring match: {err}");
				Self::Substring(query.to_lowercase())
			}
		}
	}

	pub fn is_match(&self, label: &str) -> bool {
		match self {
			Self::Pattern(rx) => rx.is_match(label),
			Self::Substring(needle) => label.to_lowercase().contains(needle.as_str()),
		}
	}
}

/// Search-driven emphasis for the scene.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Highlight {
	/// Nothing faded, nothing highlighted.
	#[default]
	Clear,
	/// Every element is faded except `matched` nodes, which are highlighted.
	Active { matched: HashSet<String> },
}

impl Highlight {
	pub fn is_clear(&self) -> bool {
		matches!(self, Self::Clear)
	}

	pub fn is_node_highlighted(&self, id: &str) -> bool {
		match self {
			Self::Clear => false,
			Self::Active { matched } => matched.contains(id),
		}
	}

	pub fn is_node_faded(&self, id: &str) -> bool {
		match self {
			Self::Clear => false,
			Self::Active { matched } => !matched.contains(id),
		}
	}

	/// Edges are never matched, so any active search fades them all.
	pub fn is_edge_faded(&self) -> bool {
		!self.is_clear()
	}

	pub fn matched(&self) -> Option<&HashSet<String>> {
		match self {
			Self::Clear => None,
			Self::Active { matched } => Some(matched),
		}
	}
}

pub fn search(query: &str, nodes: &[NodeRecord]) -> Highlight {
	if query.is_empty() {
		return Highlight::Clear;
	}
	let matcher = Matcher::compile(query);
	let matched = nodes
		.iter()
		.filter(|n| matcher.is_match(&n.label))
		.map(|n| n.id.clone())
		.collect();
	Highlight::Active { matched }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn nodes() -> Vec<NodeRecord> {
		["Dune", "Dungeons & Dragons", "Neuromancer", "The Hobbit (1937)"]
			.iter()
			.enumerate()
			.map(|(i, label)| NodeRecord {
				id: format!("n{i}"),
				label: (*label).to_owned(),
				category: None,
			})
			.collect()
	}

	fn matched(h: &Highlight) -> Vec<String> {
		let mut ids: Vec<_> = h.matched().into_iter().flatten().cloned().collect();
		ids.sort();
		ids
	}

	#[test]
	fn empty_query_clears() {
		assert_eq!(search("", &nodes()), Highlight::Clear);
	}

	#[test]
	fn matches_are_case_insensitive() {
		let h = search("dun", &nodes());
		assert_eq!(matched(&h), ["n0", "n1"]);
		assert!(h.is_node_highlighted("n0"));
		assert!(h.is_node_faded("n2"));
		assert!(!h.is_node_faded("n1"));
		assert!(h.is_edge_faded());
	}

	#[test]
	fn patterns_are_supported() {
		let h = search("^(dune|neuro)", &nodes());
		assert_eq!(matched(&h), ["n0", "n2"]);
	}

	#[test]
	fn invalid_pattern_falls_back_to_substring() {
		assert!(matches!(Matcher::compile("(1937"), Matcher::Substring(_)));
		let h = search("(1937", &nodes());
		assert_eq!(matched(&h), ["n3"]);
	}

	#[test]
	fn zero_matches_fades_everything() {
		let h = search("zzz", &nodes());
		assert!(matched(&h).is_empty());
		assert!(nodes().iter().all(|n| h.is_node_faded(&n.id)));
		assert!(!h.is_clear());
	}
}

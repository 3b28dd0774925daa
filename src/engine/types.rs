use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

/// Category assumed for nodes that do not carry one.
pub const DEFAULT_CATEGORY: &str = "Literature";

/// A node as it appears in a graph document.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NodeRecord {
	pub id: String,
	#[serde(default, deserialize_with = "null_as_empty")]
	pub label: String,
	#[serde(default)]
	pub category: Option<String>,
}

impl NodeRecord {
	/// The category used for colouring and filtering.
	pub fn effective_category(&self) -> &str {
		match self.category.as_deref() {
			Some(cat) if !cat.is_empty() => cat,
			_ => DEFAULT_CATEGORY,
		}
	}
}

/// An edge as it appears in a graph document.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EdgeRecord {
	#[serde(default)]
	pub id: Option<String>,
	pub source: String,
	pub target: String,
	#[serde(default)]
	pub relation: Option<String>,
	#[serde(default)]
	pub color: Option<String>,
}

impl EdgeRecord {
	/// Relation tag, treating an empty string as absent.
	pub fn relation(&self) -> Option<&str> {
		self.relation.as_deref().filter(|r| !r.is_empty())
	}
}

/// Optional colour overrides shipped with a document.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleLegend {
	#[serde(default)]
	pub node_colors: IndexMap<String, Option<String>>,
	#[serde(default)]
	pub edge_colors: IndexMap<String, Option<String>>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
	Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A validated graph document: every edge id is set and unique, and every
/// edge endpoint names a node in `nodes`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphDocument {
	pub nodes: Vec<NodeRecord>,
	pub edges: Vec<ValidEdge>,
	pub legend: StyleLegend,
}

/// An edge that passed validation.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidEdge {
	pub id: String,
	pub source: String,
	pub target: String,
	pub relation: Option<String>,
	pub color: Option<String>,
}

impl ValidEdge {
	/// Relation tag, if any.
	pub fn relation(&self) -> Option<&str> {
		self.relation.as_deref()
	}
}

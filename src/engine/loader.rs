//! Validation and ingestion of graph documents.
//!
//! Accepts `{ elements: { nodes, edges } }` or the root-level `{ nodes, edges }`
//! shorthand. Each element may be flat or wrapped in a Cytoscape-style
//! `{ data: { .. } }` envelope.

use std::collections::HashSet;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{EngineError, Result};
use super::types::{EdgeRecord, GraphDocument, NodeRecord, StyleLegend, ValidEdge};

/// What to do with an edge whose source or target is not a loaded node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EndpointPolicy {
	/// Drop the edge and keep loading.
	#[default]
	DropDangling,
	/// Fail the whole load.
	Reject,
}

/// Parses raw document text.
pub fn parse_document(text: &str) -> Result<Value> {
	Ok(serde_json::from_str(text)?)
}

/// Turns untyped JSON into a validated [`GraphDocument`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentLoader {
	pub policy: EndpointPolicy,
}

impl DocumentLoader {
	pub fn new(policy: EndpointPolicy) -> Self {
		Self { policy }
	}

	/// Parses and validates raw text in one go.
	pub fn load_str(&self, text: &str) -> Result<GraphDocument> {
		self.load(&parse_document(text)?)
	}

	pub fn load(&self, doc: &Value) -> Result<GraphDocument> {
		let els = match doc.get("elements") {
			Some(els) if !els.is_null() => els,
			_ => doc,
		};
		let raw_nodes = array_field(els, "nodes")?;
		let raw_edges = array_field(els, "edges")?;

		let mut nodes = Vec::with_capacity(raw_nodes.len());
		let mut ids = HashSet::with_capacity(raw_nodes.len());
		for (i, raw) in raw_nodes.iter().enumerate() {
			let node: NodeRecord = element(raw, "nodes", i)?;
			if !ids.insert(node.id.clone()) {
				return Err(EngineError::InvalidDocument(format!(
					"nodes[{i}]: duplicate node id `{}`",
					node.id
				)));
			}
			nodes.push(node);
		}

		let records = raw_edges
			.iter()
			.enumerate()
			.map(|(i, raw)| element::<EdgeRecord>(raw, "edges", i))
			.collect::<Result<Vec<_>>>()?;
		let explicit: HashSet<&str> = records
			.iter()
			.filter_map(|e| e.id.as_deref())
			.filter(|id| !id.is_empty())
			.collect();

		let mut edges = Vec::with_capacity(records.len());
		let mut edge_ids = HashSet::with_capacity(records.len());
		let mut dropped = 0usize;
		for (i, edge) in records.iter().enumerate() {
			let missing = [&edge.source, &edge.target]
				.into_iter()
				.find(|end| !ids.contains(end.as_str()));
			if let Some(end) = missing {
				match self.policy {
					EndpointPolicy::Reject => {
						return Err(EngineError::InvalidDocument(format!(
							"edges[{i}]: endpoint `{end}` does not reference a node"
						)));
					}
					EndpointPolicy::DropDangling => {
						debug!("dropping edges[{i}]: missing endpoint `{end}`");
						dropped += 1;
						continue;
					}
				}
			}
			let id = match edge.id.as_deref().filter(|id| !id.is_empty()) {
				Some(id) => id.to_owned(),
				None => generated_edge_id(&explicit, &edge_ids, i),
			};
			if !edge_ids.insert(id.clone()) {
				return Err(EngineError::InvalidDocument(format!(
					"edges[{i}]: duplicate edge id `{id}`"
				)));
			}
			edges.push(ValidEdge {
				id,
				source: edge.source.clone(),
				target: edge.target.clone(),
				relation: edge.relation().map(str::to_owned),
				color: edge.color.clone().filter(|c| !c.is_empty()),
			});
		}
		if dropped > 0 {
			warn!("dropped {dropped} edge(s) with missing endpoints");
		}

		let legend = match doc.get("styleLegend") {
			Some(legend) if !legend.is_null() => serde_json::from_value::<StyleLegend>(legend.clone())
				.map_err(|e| EngineError::InvalidDocument(format!("styleLegend: {e}")))?,
			_ => StyleLegend::default(),
		};

		Ok(GraphDocument {
			nodes,
			edges,
			legend,
		})
	}
}

fn array_field<'a>(els: &'a Value, field: &str) -> Result<&'a Vec<Value>> {
	match els.get(field) {
		Some(Value::Array(items)) => Ok(items),
		Some(_) => Err(EngineError::InvalidDocument(format!(
			"`{field}` must be an array"
		))),
		None => Err(EngineError::InvalidDocument(format!(
			"missing `{field}` (expected elements.{field} or {field} at root)"
		))),
	}
}

fn element<T: DeserializeOwned>(raw: &Value, field: &str, i: usize) -> Result<T> {
	let body = match raw.get("data") {
		Some(data) if data.is_object() => data,
		_ => raw,
	};
	serde_json::from_value(body.clone())
		.map_err(|e| EngineError::InvalidDocument(format!("{field}[{i}]: {e}")))
}

fn generated_edge_id(explicit: &HashSet<&str>, taken: &HashSet<String>, i: usize) -> String {
	(i..)
		.map(|n| format!("edge-{n}"))
		.find(|id| !explicit.contains(id.as_str()) && !taken.contains(id))
		.unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn sample() -> Value {
		json!({
			"elements": {
				"nodes": [
					{ "data": { "id": "a", "label": "Alpha", "category": "Literature" } },
					{ "data": { "id": "b", "label": "Beta", "category": "Comics" } }
				],
				"edges": [
					{ "data": { "id": "e1", "source": "a", "target": "b", "relation": "lit" } },
					{ "data": { "id": "e2", "source": "a", "target": "ghost" } }
				]
			}
		})
	}

	#[test]
	fn accepts_root_level_shorthand() {
		let doc = json!({
			"nodes": [{ "id": "a", "label": "Alpha" }],
			"edges": []
		});
		let loaded = DocumentLoader::default().load(&doc).unwrap();
		assert_eq!(loaded.nodes.len(), 1);
		assert_eq!(loaded.nodes[0].label, "Alpha");
		assert!(loaded.edges.is_empty());
	}

	#[test]
	fn missing_edges_is_named_in_error() {
		let doc = json!({ "elements": { "nodes": [] } });
		let err = DocumentLoader::default().load(&doc).unwrap_err();
		match err {
			EngineError::InvalidDocument(msg) => assert!(msg.contains("edges"), "{msg}"),
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn non_array_nodes_is_rejected() {
		let doc = json!({ "nodes": {}, "edges": [] });
		let err = DocumentLoader::default().load(&doc).unwrap_err();
		assert_eq!(
			err,
			EngineError::InvalidDocument("`nodes` must be an array".into())
		);
	}

	#[test]
	fn dangling_edges_are_dropped_by_default() {
		let loaded = DocumentLoader::default().load(&sample()).unwrap();
		assert_eq!(loaded.nodes.len(), 2);
		assert_eq!(loaded.edges.len(), 1);
		assert_eq!(loaded.edges[0].id, "e1");
	}

	#[test]
	fn dangling_edges_fail_load_when_rejecting() {
		let err = DocumentLoader::new(EndpointPolicy::Reject)
			.load(&sample())
			.unwrap_err();
		match err {
			EngineError::InvalidDocument(msg) => assert!(msg.contains("ghost"), "{msg}"),
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn duplicate_node_ids_are_rejected() {
		let doc = json!({
			"nodes": [{ "id": "a" }, { "id": "a" }],
			"edges": []
		});
		assert!(matches!(
			DocumentLoader::default().load(&doc),
			Err(EngineError::InvalidDocument(_))
		));
	}

	#[test]
	fn edges_without_id_get_generated_ids() {
		let doc = json!({
			"nodes": [{ "id": "a" }, { "id": "b" }],
			"edges": [
				{ "source": "a", "target": "b" },
				{ "id": "edge-1", "source": "b", "target": "a" },
				{ "source": "b", "target": "b" }
			]
		});
		let loaded = DocumentLoader::default().load(&doc).unwrap();
		let ids: Vec<_> = loaded.edges.iter().map(|e| e.id.as_str()).collect();
		assert_eq!(ids, ["edge-0", "edge-1", "edge-2"]);
	}

	#[test]
	fn parse_errors_carry_parser_message() {
		let err = parse_document("{ not json").unwrap_err();
		assert!(matches!(err, EngineError::Parse(msg) if !msg.is_empty()));
	}

	#[test]
	fn style_legend_is_read() {
		let doc = json!({
			"styleLegend": { "nodeColors": { "Comics": "#000000" } },
			"elements": { "nodes": [], "edges": [] }
		});
		let loaded = DocumentLoader::default().load(&doc).unwrap();
		assert_eq!(loaded.legend.node_colors["Comics"].as_deref(), Some("#000000"));
		assert!(loaded.legend.edge_colors.is_empty());
	}

	#[test]
	fn null_label_reads_as_empty() {
		let doc = json!({
			"nodes": [{ "id": "a", "label": null }, { "data": { "id": "b", "label": null } }],
			"edges": []
		});
		let loaded = DocumentLoader::default().load(&doc).unwrap();
		assert_eq!(loaded.nodes[0].label, "");
		assert_eq!(loaded.nodes[1].label, "");
	}

	#[test]
	fn null_legend_colour_falls_back_to_default() {
		let doc = json!({
			"styleLegend": {
				"nodeColors": { "Literature": null, "Comics": "#000000" },
				"edgeColors": { "lit": null }
			},
			"elements": {
				"nodes": [{ "id": "a", "category": "Literature" }, { "id": "b" }],
				"edges": [{ "source": "a", "target": "b", "relation": "lit" }]
			}
		});
		let loaded = DocumentLoader::default().load(&doc).unwrap();
		assert_eq!(loaded.legend.node_colors["Literature"], None);
		let palette = crate::engine::style::Palette::from_legend(&loaded.legend);
		assert_eq!(palette.categories.resolve("Literature").as_str(), "#66c2a5");
		assert_eq!(palette.categories.resolve("Comics").as_str(), "#000000");
		assert_eq!(palette.relations.resolve("lit").as_str(), "#1b9e77");
	}
}

//! The live graph: loaded elements plus transient view state.

use std::collections::{HashMap, HashSet};

use log::{debug, info};
use serde_json::Value;

use super::error::Result;
use super::filter::{FilterState, VisibilitySnapshot, compute_visibility};
use super::label::{LabelMode, effective_label, font_size, node_diameter};
use super::layout::{
	GridParams, LayoutDispatcher, LayoutEngine, LayoutFrame, LayoutInput, LayoutNode, Point, grid,
};
use super::loader::DocumentLoader;
use super::search::{Highlight, search};
use super::style::{
	Color, DisplayMode, EDGE_OPACITY, EDGE_WIDTH, EdgeStyle, FADED_OPACITY, HIGHLIGHT_BORDER_COLOR,
	NODE_BORDER_COLOR, NodeStyle, Palette, Swatch, arrow_scale, edge_color, node_color, node_size_scale,
};
use super::types::{GraphDocument, NodeRecord, ValidEdge};
use super::viewport::Bounds;

/// Loaded nodes and edges together with colours, filters, search emphasis,
/// label mode and node positions.
///
/// Loading replaces everything at once; filter and search state are always
/// re-derived, never carried over from a previous document.
#[derive(Clone, Debug, Default)]
pub struct GraphScene {
	nodes: Vec<NodeRecord>,
	index: HashMap<String, usize>,
	degrees: Vec<usize>,
	positions: Vec<Point>,
	edges: Vec<ValidEdge>,
	palette: Palette,
	filters: FilterState,
	visibility: VisibilitySnapshot,
	highlight: Highlight,
	label_mode: LabelMode,
	display_mode: DisplayMode,
}

impl GraphScene {
	pub fn new(display_mode: DisplayMode) -> Self {
		Self {
			display_mode,
			..Self::default()
		}
	}

	/// Validates `doc` and swaps it in. On error the scene is unchanged.
	pub fn load(&mut self, loader: &DocumentLoader, doc: &Value) -> Result<()> {
		let document = loader.load(doc)?;
		self.replace(document);
		Ok(())
	}

	/// Parses, validates and swaps in `text`. On error the scene is unchanged.
	pub fn load_str(&mut self, loader: &DocumentLoader, text: &str) -> Result<()> {
		let document = loader.load_str(text)?;
		self.replace(document);
		Ok(())
	}

	pub fn replace(&mut self, document: GraphDocument) {
		let GraphDocument {
			nodes,
			edges,
			legend,
		} = document;
		let index: HashMap<String, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
		let mut degrees = vec![0usize; nodes.len()];
		for e in &edges {
			for end in [&e.source, &e.target] {
				if let Some(&i) = index.get(end) {
					degrees[i] += 1;
				}
			}
		}
		let filters = FilterState::from_elements(&nodes, &edges);
		let visibility = compute_visibility(&filters, &nodes, &edges);

		info!("loaded graph: {} nodes, {} edges", nodes.len(), edges.len());
		self.nodes = nodes;
		self.index = index;
		self.degrees = degrees;
		self.edges = edges;
		self.palette = Palette::from_legend(&legend);
		self.filters = filters;
		self.visibility = visibility;
		self.highlight = Highlight::Clear;
		self.positions = vec![Point::default(); self.nodes.len()];
		self.seed_positions();
	}

	/// Spreads nodes on a grid so nothing is stacked before a layout runs.
	fn seed_positions(&mut self) {
		let input = self.layout_input();
		let seeded = grid(
			&GridParams {
				padding: 0.0,
				avoid_overlap: true,
			},
			&input,
		);
		self.positions = seeded.positions();
	}

	pub fn nodes(&self) -> &[NodeRecord] {
		&self.nodes
	}

	pub fn edges(&self) -> &[ValidEdge] {
		&self.edges
	}

	pub fn node(&self, id: &str) -> Option<&NodeRecord> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	pub fn degree(&self, id: &str) -> Option<usize> {
		self.index.get(id).map(|&i| self.degrees[i])
	}

	pub fn position(&self, id: &str) -> Option<Point> {
		self.index.get(id).map(|&i| self.positions[i])
	}

	pub fn palette(&self) -> &Palette {
		&self.palette
	}

	pub fn filters(&self) -> &FilterState {
		&self.filters
	}

	pub fn visibility(&self) -> &VisibilitySnapshot {
		&self.visibility
	}

	pub fn highlight(&self) -> &Highlight {
		&self.highlight
	}

	pub fn label_mode(&self) -> LabelMode {
		self.label_mode
	}

	pub fn display_mode(&self) -> DisplayMode {
		self.display_mode
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn set_label_mode(&mut self, mode: LabelMode) {
		self.label_mode = mode;
	}

	pub fn set_display_mode(&mut self, mode: DisplayMode) {
		self.display_mode = mode;
	}

	pub fn toggle_category(&mut self, category: &str, enabled: bool) {
		if self.filters.toggle_category(category, enabled) {
			self.recompute_visibility();
		}
	}

	pub fn toggle_relation(&mut self, relation: &str, enabled: bool) {
		if self.filters.toggle_relation(relation, enabled) {
			self.recompute_visibility();
		}
	}

	pub fn recompute_visibility(&mut self) {
		self.visibility = compute_visibility(&self.filters, &self.nodes, &self.edges);
	}

	/// Applies a search and returns the matched ids, if any matched.
	pub fn search(&mut self, query: &str) -> Option<&HashSet<String>> {
		self.highlight = search(query, &self.nodes);
		self.highlight.matched().filter(|m| !m.is_empty())
	}

	pub fn clear_search(&mut self) {
		self.highlight = Highlight::Clear;
	}

	fn node_style_at(&self, i: usize) -> NodeStyle {
		let node = &self.nodes[i];
		let degree = self.degrees[i];
		let label = effective_label(&node.label, self.label_mode);
		let highlighted = self.highlight.is_node_highlighted(&node.id);
		let faded = self.highlight.is_node_faded(&node.id);
		NodeStyle {
			color: node_color(node, &self.palette),
			diameter: node_diameter(&label, degree, self.display_mode),
			font_size: font_size(node_size_scale(degree, self.display_mode)),
			label,
			border_width: if highlighted { 2.0 } else { 1.0 },
			border_color: Color::new(if highlighted {
				HIGHLIGHT_BORDER_COLOR
			} else {
				NODE_BORDER_COLOR
			}),
			opacity: if faded { FADED_OPACITY } else { 1.0 },
			hidden: self.visibility.is_node_hidden(&node.id),
			highlighted,
		}
	}

	pub fn node_style(&self, id: &str) -> Option<NodeStyle> {
		self.index.get(id).map(|&i| self.node_style_at(i))
	}

	/// Every node with its position and resolved style, in document order.
	pub fn node_styles(&self) -> impl Iterator<Item = (&NodeRecord, Point, NodeStyle)> {
		(0..self.nodes.len()).map(|i| (&self.nodes[i], self.positions[i], self.node_style_at(i)))
	}

	pub fn edge_style(&self, edge: &ValidEdge) -> EdgeStyle {
		EdgeStyle {
			color: edge_color(edge, &self.palette),
			width: EDGE_WIDTH,
			arrow_size: arrow_scale(self.display_mode) * EDGE_WIDTH,
			opacity: if self.highlight.is_edge_faded() {
				FADED_OPACITY
			} else {
				EDGE_OPACITY
			},
			hidden: self.visibility.is_edge_hidden(&edge.id),
		}
	}

	pub fn edge_styles(&self) -> impl Iterator<Item = (&ValidEdge, EdgeStyle)> {
		self.edges.iter().map(|e| (e, self.edge_style(e)))
	}

	/// Present categories with colour and enabled flag, sorted.
	pub fn category_swatches(&self) -> Vec<Swatch> {
		self.filters
			.categories()
			.map(|(name, enabled)| Swatch {
				name: name.to_owned(),
				color: self.palette.categories.resolve(name),
				enabled,
			})
			.collect()
	}

	/// Present relations with colour and enabled flag, sorted.
	pub fn relation_swatches(&self) -> Vec<Swatch> {
		self.filters
			.relations()
			.map(|(name, enabled)| Swatch {
				name: name.to_owned(),
				color: self.palette.relations.resolve(name),
				enabled,
			})
			.collect()
	}

	/// Nodes with their current diameters and positions, ready for a layout engine.
	pub fn layout_input(&self) -> LayoutInput {
		let nodes = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| LayoutNode {
				id: n.id.clone(),
				diameter: node_diameter(
					&effective_label(&n.label, self.label_mode),
					self.degrees[i],
					self.display_mode,
				),
				position: self.positions.get(i).copied().unwrap_or_default(),
			})
			.collect();
		let edges = self
			.edges
			.iter()
			.filter_map(|e| Some((*self.index.get(&e.source)?, *self.index.get(&e.target)?)))
			.collect();
		LayoutInput { nodes, edges }
	}

	/// Moves nodes; ids not in the scene are ignored.
	pub fn apply_positions<'a>(&mut self, positions: impl IntoIterator<Item = &'a (String, Point)>) {
		for (id, p) in positions {
			if let Some(&i) = self.index.get(id) {
				self.positions[i] = *p;
			}
		}
	}

	/// Applies a finished layout unless a newer run has been started since.
	pub fn apply_layout(&mut self, dispatcher: &LayoutDispatcher, frame: &LayoutFrame) -> bool {
		if !dispatcher.is_current(frame.ticket) {
			debug!("ignoring stale layout `{}`", frame.name);
			return false;
		}
		self.apply_positions(&frame.positions);
		true
	}

	pub fn set_position(&mut self, id: &str, p: Point) {
		if let Some(&i) = self.index.get(id) {
			self.positions[i] = p;
		}
	}

	/// Bounds of the visible nodes, optionally restricted to `only`.
	pub fn bounds(&self, only: Option<&HashSet<String>>) -> Option<Bounds> {
		self.node_styles()
			.filter(|(n, _, style)| !style.hidden && only.is_none_or(|set| set.contains(&n.id)))
			.map(|(_, p, style)| Bounds::around(p, style.diameter))
			.reduce(Bounds::union)
	}

	/// Topmost visible node under a model-space point.
	pub fn node_at(&self, p: Point) -> Option<&str> {
		self.node_styles()
			.filter(|(_, q, style)| {
				!style.hidden && (q.x - p.x).hypot(q.y - p.y) <= style.diameter / 2.0
			})
			.last()
			.map(|(n, _, _)| n.id.as_str())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::engine::error::EngineError;

	fn doc() -> Value {
		json!({
			"elements": {
				"nodes": [
					{ "data": { "id": "a", "label": "Alpha", "category": "Literature" } },
					{ "data": { "id": "b", "label": "Beta", "category": "Comics" } }
				],
				"edges": [
					{ "data": { "id": "e1", "source": "a", "target": "b", "relation": "lit" } }
				]
			}
		})
	}

	fn loaded() -> GraphScene {
		let mut scene = GraphScene::new(DisplayMode::Full);
		scene.load(&DocumentLoader::default(), &doc()).unwrap();
		scene
	}

	#[test]
	fn degrees_follow_edges() {
		let scene = loaded();
		assert_eq!(scene.degree("a"), Some(1));
		assert_eq!(scene.degree("b"), Some(1));
		assert_eq!(scene.degree("zzz"), None);
	}

	#[test]
	fn failed_load_keeps_previous_scene() {
		let mut scene = loaded();
		let err = scene
			.load(&DocumentLoader::default(), &json!({ "nodes": [] }))
			.unwrap_err();
		assert!(matches!(err, EngineError::InvalidDocument(_)));
		assert_eq!(scene.nodes().len(), 2);
		assert_eq!(scene.edges().len(), 1);

		let err = scene
			.load_str(&DocumentLoader::default(), "{ broken")
			.unwrap_err();
		assert!(matches!(err, EngineError::Parse(_)));
		assert_eq!(scene.nodes().len(), 2);
	}

	#[test]
	fn reload_resets_filters_and_search() {
		let mut scene = loaded();
		scene.toggle_category("Comics", false);
		scene.search("alp");
		scene.load(&DocumentLoader::default(), &doc()).unwrap();
		assert!(scene.visibility().hidden_nodes.is_empty());
		assert!(scene.highlight().is_clear());
		assert!(scene.filters().categories().all(|(_, on)| on));
	}

	#[test]
	fn styles_reflect_search() {
		let mut scene = loaded();
		let matched = scene.search("alpha").cloned().unwrap();
		assert_eq!(matched.len(), 1);
		let a = scene.node_style("a").unwrap();
		let b = scene.node_style("b").unwrap();
		assert!(a.highlighted);
		assert_eq!(a.border_color.as_str(), HIGHLIGHT_BORDER_COLOR);
		assert_eq!(a.opacity, 1.0);
		assert_eq!(b.opacity, FADED_OPACITY);
		let (_, e) = scene.edge_styles().next().unwrap();
		assert_eq!(e.opacity, FADED_OPACITY);

		assert!(scene.search("nothing-here").is_none());
		assert!(scene.node_styles().all(|(_, _, s)| !s.highlighted));
	}

	#[test]
	fn label_mode_changes_labels_and_sizes() {
		let mut scene = GraphScene::new(DisplayMode::Full);
		let long = "word ".repeat(20);
		let doc = json!({ "nodes": [{ "id": "x", "label": long.trim() }], "edges": [] });
		scene.load(&DocumentLoader::default(), &doc).unwrap();
		let full = scene.node_style("x").unwrap();
		scene.set_label_mode(LabelMode::Short);
		let short = scene.node_style("x").unwrap();
		assert!(short.label.ends_with('…'));
		assert!(short.diameter <= full.diameter);
		scene.set_label_mode(LabelMode::Wrap);
		assert!(scene.node_style("x").unwrap().label.contains('\n'));
	}

	#[test]
	fn seeded_positions_do_not_stack() {
		let scene = loaded();
		assert_ne!(scene.position("a"), scene.position("b"));
	}

	#[test]
	fn hit_testing_and_bounds_skip_hidden_nodes() {
		let mut scene = loaded();
		scene.set_position("a", Point::new(0.0, 0.0));
		scene.set_position("b", Point::new(500.0, 0.0));
		assert_eq!(scene.node_at(Point::new(5.0, 5.0)), Some("a"));
		scene.toggle_category("Literature", false);
		assert_eq!(scene.node_at(Point::new(5.0, 5.0)), None);
		let b = scene.bounds(None).unwrap();
		assert!(b.min_x > 0.0);
	}

	#[test]
	fn superseded_layout_is_not_applied() {
		let mut scene = loaded();
		let before = scene.position("a");
		let mut dispatcher = LayoutDispatcher::new();
		let spec = crate::engine::layout::LayoutName::Circle.spec();
		dispatcher.start(&spec, &scene.layout_input());
		let stale = dispatcher.finish().unwrap();
		dispatcher.start(&spec, &scene.layout_input());
		assert!(!scene.apply_layout(&dispatcher, &stale));
		assert_eq!(scene.position("a"), before);

		let fresh = dispatcher.finish().unwrap();
		assert!(scene.apply_layout(&dispatcher, &fresh));
	}

	#[test]
	fn layout_input_indexes_edges() {
		let scene = loaded();
		let input = scene.layout_input();
		assert_eq!(input.nodes.len(), 2);
		assert_eq!(input.edges, vec![(0, 1)]);
		assert!(input.nodes.iter().all(|n| n.diameter >= 60.0));
	}
}

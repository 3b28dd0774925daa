//! Colour and size resolution for nodes and edges.
//!
//! Everything here is a pure function of its inputs so renderers can ask for
//! a plain style record per element without touching scene state.

use std::fmt;

use indexmap::IndexMap;

use super::types::{NodeRecord, StyleLegend, ValidEdge};

const DEFAULT_NODE_COLORS: &[(&str, &str)] = &[
	("Literature", "#66c2a5"),
	("RPG/Board Games", "#8da0cb"),
	("Video Games", "#fc8d62"),
	("Cinema/TV", "#e78ac3"),
	("Comics", "#a6d854"),
	("Mythology", "#ffd92f"),
];

const DEFAULT_RELATION_COLORS: &[(&str, &str)] = &[
	("lit", "#1b9e77"),
	("weird", "#d95f02"),
	("ttrpg", "#3182bd"),
	("game", "#e7298a"),
	("hybrid", "#756bb1"),
];

pub const NEUTRAL_NODE_COLOR: &str = "#7aa7c7";
pub const NEUTRAL_EDGE_COLOR: &str = "#9aa6b2";

pub const NODE_BORDER_COLOR: &str = "#22303b";
pub const HIGHLIGHT_BORDER_COLOR: &str = "#f6c177";
pub const EDGE_WIDTH: f64 = 2.0;
pub const EDGE_OPACITY: f64 = 0.95;
pub const FADED_OPACITY: f64 = 0.15;
pub const LABEL_COLOR: &str = "black";
pub const LABEL_FONT: &str = "system-ui, Segoe UI, Roboto, Arial";

/// Screen-size class the view is running in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayMode {
	/// Small screens: smaller nodes and tighter wrapping.
	Compact,
	#[default]
	Full,
}

/// A CSS colour string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color(String);

impl Color {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Key to colour mapping with a built-in default layer.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMap {
	merged: IndexMap<String, Color>,
	defaults: &'static [(&'static str, &'static str)],
	neutral: &'static str,
}

impl ColorMap {
	fn merged(
		defaults: &'static [(&'static str, &'static str)],
		neutral: &'static str,
		overrides: &IndexMap<String, Option<String>>,
	) -> Self {
		let mut merged: IndexMap<String, Color> = defaults
			.iter()
			.map(|(k, v)| ((*k).to_owned(), Color::new(*v)))
			.collect();
		// Null or empty overrides fall through to the defaults.
		for (k, v) in overrides {
			if let Some(v) = v.as_deref().filter(|v| !v.is_empty()) {
				merged.insert(k.clone(), Color::new(v));
			}
		}
		Self {
			merged,
			defaults,
			neutral,
		}
	}

	/// Merged entry, then built-in default, then the neutral colour.
	pub fn resolve(&self, key: &str) -> Color {
		if let Some(c) = self.merged.get(key) {
			return c.clone();
		}
		self.defaults
			.iter()
			.find(|(k, _)| *k == key)
			.map(|(_, v)| Color::new(*v))
			.unwrap_or_else(|| Color::new(self.neutral))
	}

}

/// Category and relation colour maps in effect for the loaded document.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
	pub categories: ColorMap,
	pub relations: ColorMap,
}

impl Default for Palette {
	fn default() -> Self {
		Self::from_legend(&StyleLegend::default())
	}
}

impl Palette {
	/// Built-in defaults overlaid with the document's legend.
	pub fn from_legend(legend: &StyleLegend) -> Self {
		Self {
			categories: ColorMap::merged(DEFAULT_NODE_COLORS, NEUTRAL_NODE_COLOR, &legend.node_colors),
			relations: ColorMap::merged(
				DEFAULT_RELATION_COLORS,
				NEUTRAL_EDGE_COLOR,
				&legend.edge_colors,
			),
		}
	}
}

pub fn node_color(node: &NodeRecord, palette: &Palette) -> Color {
	palette.categories.resolve(node.effective_category())
}

/// Explicit edge colour wins over the relation colour.
pub fn edge_color(edge: &ValidEdge, palette: &Palette) -> Color {
	if let Some(c) = &edge.color {
		return Color::new(c.clone());
	}
	match edge.relation() {
		Some(rel) => palette.relations.resolve(rel),
		None => Color::new(NEUTRAL_EDGE_COLOR),
	}
}

/// Grows with degree but is capped so hubs cannot swamp the canvas.
pub fn node_size_scale(degree: usize, mode: DisplayMode) -> f64 {
	let (base, max_bonus) = match mode {
		DisplayMode::Compact => (0.7, 2.0),
		DisplayMode::Full => (1.0, 3.0),
	};
	base + (degree as f64 * 0.15).min(max_bonus)
}

/// Arrowhead length, in edge widths.
pub fn arrow_scale(mode: DisplayMode) -> f64 {
	match mode {
		DisplayMode::Compact => 6.0,
		DisplayMode::Full => 12.0,
	}
}

/// Resolved visual properties of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	pub color: Color,
	pub diameter: f64,
	pub font_size: f64,
	pub label: String,
	pub border_width: f64,
	pub border_color: Color,
	pub opacity: f64,
	pub hidden: bool,
	pub highlighted: bool,
}

/// Resolved visual properties of an edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	pub color: Color,
	pub width: f64,
	pub arrow_size: f64,
	pub opacity: f64,
	pub hidden: bool,
}

/// A legend entry for the filter controls.
#[derive(Clone, Debug, PartialEq)]
pub struct Swatch {
	pub name: String,
	pub color: Color,
	pub enabled: bool,
}

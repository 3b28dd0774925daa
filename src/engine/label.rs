//! Label text shaping and the node size needed to contain it.

use super::style::{DisplayMode, node_size_scale};

const SHORT_LABEL_MAX: usize = 60;
const SHORT_LABEL_KEEP: usize = 57;
const ELLIPSIS: char = '…';

/// Line width used by [`LabelMode::Wrap`].
pub const WRAP_WIDTH: usize = 25;
const FOOTPRINT_PADDING: f64 = 20.0;

/// Which form of the label text nodes display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelMode {
	#[default]
	Full,
	Wrap,
	Short,
}

impl LabelMode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Full => "full",
			Self::Wrap => "wrap",
			Self::Short => "short",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"full" => Some(Self::Full),
			"wrap" => Some(Self::Wrap),
			"short" => Some(Self::Short),
			_ => None,
		}
	}
}

pub fn short_label(text: &str) -> String {
	if text.chars().count() > SHORT_LABEL_MAX {
		let mut out: String = text.chars().take(SHORT_LABEL_KEEP).collect();
		out.push(ELLIPSIS);
		out
	} else {
		text.to_owned()
	}
}

fn wrap_lines(text: &str, width: usize) -> Vec<String> {
	let mut lines: Vec<String> = vec![String::new()];
	for word in text.split(' ') {
		let Some(line) = lines.last_mut() else {
			break;
		};
		if line.is_empty() {
			line.push_str(word);
		} else if line.chars().count() + 1 + word.chars().count() > width {
			lines.push(word.to_owned());
		} else {
			line.push(' ');
			line.push_str(word);
		}
	}
	lines
}

/// Greedy word wrap; a word longer than `width` sits on its own line.
pub fn wrap_label(text: &str, width: usize) -> String {
	if text.is_empty() {
		return String::new();
	}
	wrap_lines(text, width).join("\n")
}

pub fn effective_label(text: &str, mode: LabelMode) -> String {
	match mode {
		LabelMode::Full => text.to_owned(),
		LabelMode::Wrap => wrap_label(text, WRAP_WIDTH),
		LabelMode::Short => short_label(text),
	}
}

/// Bounding box of a label, padding included.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
	pub width: f64,
	pub height: f64,
}

impl Footprint {
	pub fn max_side(&self) -> f64 {
		self.width.max(self.height)
	}
}

fn max_chars_per_line(mode: DisplayMode) -> usize {
	match mode {
		DisplayMode::Compact => 20,
		DisplayMode::Full => 25,
	}
}

/// Approximates rendered text size without font metrics.
///
/// Explicit line breaks in `text` are honoured before rewrapping each line.
pub fn measure_footprint(text: &str, font_size: f64, mode: DisplayMode) -> Footprint {
	let char_width = font_size * 0.6;
	let line_height = font_size * 1.2;
	let limit = max_chars_per_line(mode);
	let lines: Vec<String> = text
		.split('\n')
		.flat_map(|line| wrap_lines(line, limit))
		.collect();
	let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
	Footprint {
		width: longest as f64 * char_width + FOOTPRINT_PADDING,
		height: lines.len() as f64 * line_height + FOOTPRINT_PADDING,
	}
}

pub fn font_size(scale: f64) -> f64 {
	(10.0 * scale).max(8.0)
}

fn minimum_diameter(mode: DisplayMode) -> f64 {
	match mode {
		DisplayMode::Compact => 45.0,
		DisplayMode::Full => 60.0,
	}
}

/// Diameter large enough for the node's label at its scaled font size.
pub fn node_diameter(label: &str, degree: usize, mode: DisplayMode) -> f64 {
	let scale = node_size_scale(degree, mode);
	let footprint = measure_footprint(label, font_size(scale), mode);
	(footprint.max_side() * scale).max(minimum_diameter(mode))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn short_label_truncates_long_text() {
		let long = "x".repeat(61);
		let short = short_label(&long);
		assert_eq!(short.chars().count(), 58);
		assert!(short.ends_with('…'));
		assert_eq!(short_label(&"y".repeat(60)), "y".repeat(60));
		assert_eq!(short_label(""), "");
	}

	#[test]
	fn wrap_is_greedy() {
		assert_eq!(wrap_label("the quick brown fox", 10), "the quick\nbrown fox");
		assert_eq!(wrap_label("a b c", 5), "a b c");
		assert_eq!(wrap_label("supercalifragilistic is long", 8), "supercalifragilistic\nis long");
		assert_eq!(wrap_label("", 10), "");
	}

	#[test]
	fn effective_label_follows_mode() {
		let text = "The Left Hand of Darkness and Other Stories";
		assert_eq!(effective_label(text, LabelMode::Full), text);
		assert_eq!(
			effective_label(text, LabelMode::Wrap),
			"The Left Hand of Darkness\nand Other Stories"
		);
		assert_eq!(effective_label(text, LabelMode::Short), text);
	}

	#[test]
	fn footprint_of_single_line() {
		let fp = measure_footprint("Alpha", 10.0, DisplayMode::Full);
		assert!((fp.width - (5.0 * 6.0 + 20.0)).abs() < 1e-9);
		assert!((fp.height - (12.0 + 20.0)).abs() < 1e-9);
	}

	#[test]
	fn compact_mode_wraps_earlier() {
		let text = "twenty two characters!";
		let full = measure_footprint(text, 10.0, DisplayMode::Full);
		let compact = measure_footprint(text, 10.0, DisplayMode::Compact);
		assert!(compact.height > full.height);
	}

	#[test]
	fn diameter_has_mode_floor() {
		assert_eq!(node_diameter("", 0, DisplayMode::Full), 60.0);
		assert_eq!(node_diameter("", 0, DisplayMode::Compact), 45.0);
	}

	#[test]
	fn diameter_contains_label() {
		let label = "A considerably longer label that needs several lines";
		let d = node_diameter(label, 3, DisplayMode::Full);
		let scale = node_size_scale(3, DisplayMode::Full);
		let fp = measure_footprint(label, font_size(scale), DisplayMode::Full);
		assert!(d >= fp.width && d >= fp.height);
	}
}

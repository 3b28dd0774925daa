//! Raster export planning.

use log::warn;

use super::scene::GraphScene;
use super::viewport::{Bounds, Viewport};

/// Margin around the scene in an export, in model units.
const EXPORT_MARGIN: f64 = 10.0;
/// Largest canvas side browsers reliably encode.
pub const MAX_EXPORT_SIDE: f64 = 16384.0;

/// How a full-scene capture is produced.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportSettings {
	pub background: String,
	pub scale: f64,
	pub filename: String,
}

impl Default for ExportSettings {
	fn default() -> Self {
		Self {
			background: "#0d1319".into(),
			scale: 2.0,
			filename: "fantasy_map.png".into(),
		}
	}
}

/// Pixel size and transform of an export canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportPlan {
	pub width: u32,
	pub height: u32,
	pub viewport: Viewport,
	/// Upscale actually used; below the requested one for huge scenes.
	pub scale: f64,
}

impl ExportPlan {
	/// Covers every visible node regardless of the on-screen viewport.
	/// The upscale shrinks so neither side exceeds [`MAX_EXPORT_SIDE`].
	/// Returns `None` for an empty or fully filtered scene.
	pub fn for_scene(scene: &GraphScene, settings: &ExportSettings) -> Option<Self> {
		let b = scene.bounds(None)?;
		let framed = Bounds {
			min_x: b.min_x - EXPORT_MARGIN,
			min_y: b.min_y - EXPORT_MARGIN,
			max_x: b.max_x + EXPORT_MARGIN,
			max_y: b.max_y + EXPORT_MARGIN,
		};
		let longest = framed.width().max(framed.height());
		let k = settings.scale.min(MAX_EXPORT_SIDE / longest);
		if k < settings.scale {
			warn!("export of {longest:.0} units downscaled to {k:.3}x");
		}
		Some(Self {
			width: ((framed.width() * k).ceil() as u32).min(MAX_EXPORT_SIDE as u32),
			height: ((framed.height() * k).ceil() as u32).min(MAX_EXPORT_SIDE as u32),
			viewport: Viewport {
				x: -framed.min_x * k,
				y: -framed.min_y * k,
				k,
			},
			scale: k,
		})
	}

	pub fn is_downscaled(&self, settings: &ExportSettings) -> bool {
		self.scale < settings.scale
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::engine::layout::Point;
	use crate::engine::loader::DocumentLoader;
	use crate::engine::style::DisplayMode;

	#[test]
	fn plan_covers_scene_at_scale() {
		let mut scene = GraphScene::new(DisplayMode::Full);
		let doc = json!({ "nodes": [{ "id": "a" }, { "id": "b" }], "edges": [] });
		scene.load(&DocumentLoader::default(), &doc).unwrap();
		scene.set_position("a", Point::new(0.0, 0.0));
		scene.set_position("b", Point::new(100.0, 0.0));
		let plan = ExportPlan::for_scene(&scene, &ExportSettings::default()).unwrap();
		// Two 60px nodes 100 apart plus margins, doubled.
		assert_eq!(plan.width, 360);
		assert_eq!(plan.height, 160);
		assert_eq!(plan.viewport.model_to_screen(Point::new(-40.0, -40.0)), (0.0, 0.0));
		assert!(!plan.is_downscaled(&ExportSettings::default()));
	}

	#[test]
	fn empty_scene_has_no_plan() {
		let scene = GraphScene::new(DisplayMode::Full);
		assert!(ExportPlan::for_scene(&scene, &ExportSettings::default()).is_none());
	}

	#[test]
	fn huge_scene_is_capped() {
		let mut scene = GraphScene::new(DisplayMode::Full);
		let doc = json!({ "nodes": [{ "id": "a" }, { "id": "b" }], "edges": [] });
		scene.load(&DocumentLoader::default(), &doc).unwrap();
		scene.set_position("a", Point::new(0.0, 0.0));
		scene.set_position("b", Point::new(50_000.0, 0.0));
		let settings = ExportSettings::default();
		let plan = ExportPlan::for_scene(&scene, &settings).unwrap();
		assert!(plan.is_downscaled(&settings));
		assert!(plan.width as f64 <= MAX_EXPORT_SIDE);
		assert!(plan.height as f64 <= MAX_EXPORT_SIDE);
		assert!(plan.scale < 1.0);
	}
}

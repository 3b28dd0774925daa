use log::{debug, info};

use crate::config::{ViewConfig, display_mode_for};
use crate::engine::label::LabelMode;
use crate::engine::layout::{LayoutDispatcher, LayoutName, Point};
use crate::engine::{DocumentLoader, GraphDocument, GraphScene, Result, Swatch, Viewport};

/// Layout iterations run per animation frame.
pub const LAYOUT_BUDGET: usize = 100;

/// Something the control surface asks the view to do.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewCommand {
	SelectLayout(LayoutName),
	Relayout,
	SetLabelMode(LabelMode),
	ToggleCategory(String, bool),
	ToggleRelation(String, bool),
	Search(String),
	ClearSearch,
	Fit,
	LoadText(String),
	ExportPng,
}

/// Category and relation swatches for the filter panel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Legend {
	pub categories: Vec<Swatch>,
	pub relations: Vec<Swatch>,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Point,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub viewport_start_x: f64,
	pub viewport_start_y: f64,
}

/// Scene, layout runner and camera behind one canvas.
pub struct GraphSession {
	pub scene: GraphScene,
	pub config: ViewConfig,
	pub viewport: Viewport,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	/// Finger distance at the previous pinch step.
	pinch: Option<f64>,
	loader: DocumentLoader,
	dispatcher: LayoutDispatcher,
	layout: LayoutName,
	load_ticket: u64,
	layout_started_at: f64,
}

impl GraphSession {
	pub fn new(config: ViewConfig, width: f64, height: f64) -> Self {
		Self {
			scene: GraphScene::new(config.display_mode),
			config,
			viewport: Viewport::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
			pinch: None,
			loader: DocumentLoader::default(),
			dispatcher: LayoutDispatcher::new(),
			layout: LayoutName::Dagre,
			load_ticket: 0,
			layout_started_at: 0.0,
		}
	}

	pub fn loader(&self) -> &DocumentLoader {
		&self.loader
	}

	pub fn is_laying_out(&self) -> bool {
		self.dispatcher.is_running()
	}

	/// Reserves a ticket for a load that completes later.
	pub fn begin_load(&mut self) -> u64 {
		self.load_ticket += 1;
		self.load_ticket
	}

	/// Applies the outcome of the load holding `ticket`.
	///
	/// Returns `Ok(false)` when a newer load has been started in the
	/// meantime; errors leave the current scene in place.
	pub fn finish_load(
		&mut self,
		ticket: u64,
		result: Result<GraphDocument>,
		now: f64,
	) -> Result<bool> {
		if ticket != self.load_ticket {
			debug!("dropping superseded load #{ticket}");
			return Ok(false);
		}
		self.scene.replace(result?);
		self.fit(0.0);
		self.run_layout(now);
		Ok(true)
	}

	/// Loads a document from raw text, e.g. a dropped file.
	pub fn load_text(&mut self, text: &str, now: f64) -> Result<()> {
		let ticket = self.begin_load();
		let result = self.loader.load_str(text);
		self.finish_load(ticket, result, now).map(|_| ())
	}

	pub fn select_layout(&mut self, name: LayoutName, now: f64) {
		self.layout = name;
		self.run_layout(now);
	}

	pub fn run_layout(&mut self, now: f64) {
		if self.scene.is_empty() {
			self.dispatcher.cancel();
			return;
		}
		self.dispatcher
			.start(&self.layout.spec(), &self.scene.layout_input());
		self.layout_started_at = now;
	}

	/// Advances the running layout, applying and framing it once done.
	pub fn tick(&mut self, now: f64) -> bool {
		if !self.is_laying_out() {
			return false;
		}
		let Some(frame) = self.dispatcher.pump(LAYOUT_BUDGET) else {
			return false;
		};
		if !self.scene.apply_layout(&self.dispatcher, &frame) {
			return false;
		}
		info!(
			"layout `{}` applied in {:.0} ms",
			frame.name,
			now - self.layout_started_at
		);
		self.fit(frame.padding);
		true
	}

	/// Frames every visible node.
	pub fn fit(&mut self, padding: f64) {
		if let Some(bounds) = self.scene.bounds(None) {
			self.viewport = Viewport::fit(bounds, self.width, self.height, padding, self.config.zoom);
		}
	}

	/// Highlights matching nodes and frames them if any matched.
	pub fn search(&mut self, query: &str) {
		let Some(matched) = self.scene.search(query).cloned() else {
			return;
		};
		if let Some(bounds) = self.scene.bounds(Some(&matched)) {
			self.viewport = Viewport::fit(
				bounds,
				self.width,
				self.height,
				self.config.search_padding,
				self.config.zoom,
			);
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.fit(0.0);
	}

	/// Re-evaluates compact versus full mode for a new window width.
	pub fn update_display_mode(&mut self, window_width: f64) -> bool {
		let mode = display_mode_for(window_width, &self.config.user_agent);
		if !self.config.set_display_mode(mode) {
			return false;
		}
		self.scene.set_display_mode(mode);
		self.fit(0.0);
		true
	}

	pub fn legend(&self) -> Legend {
		Legend {
			categories: self.scene.category_swatches(),
			relations: self.scene.relation_swatches(),
		}
	}

	/// Handles every command except `ExportPng`, which needs the canvas.
	pub fn apply(&mut self, command: ViewCommand, now: f64) -> Result<()> {
		match command {
			ViewCommand::SelectLayout(name) => self.select_layout(name, now),
			ViewCommand::Relayout => self.run_layout(now),
			ViewCommand::SetLabelMode(mode) => self.scene.set_label_mode(mode),
			ViewCommand::ToggleCategory(name, on) => self.scene.toggle_category(&name, on),
			ViewCommand::ToggleRelation(name, on) => self.scene.toggle_relation(&name, on),
			ViewCommand::Search(query) => self.search(query.trim()),
			ViewCommand::ClearSearch => self.scene.clear_search(),
			ViewCommand::Fit => self.fit(0.0),
			ViewCommand::LoadText(text) => self.load_text(&text, now)?,
			ViewCommand::ExportPng => {}
		}
		Ok(())
	}

	pub fn node_at_screen(&self, sx: f64, sy: f64) -> Option<String> {
		let p = self.viewport.screen_to_model(sx, sy);
		self.scene.node_at(p).map(str::to_owned)
	}

	/// Starts dragging the node under the pointer, or panning if there is none.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		match self.node_at_screen(sx, sy) {
			Some(id) => {
				self.drag = DragState {
					node_start: self.scene.position(&id).unwrap_or_default(),
					node: Some(id),
					start_x: sx,
					start_y: sy,
				};
			}
			None => {
				self.pan = PanState {
					active: true,
					start_x: sx,
					start_y: sy,
					viewport_start_x: self.viewport.x,
					viewport_start_y: self.viewport.y,
				};
			}
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if let Some(id) = &self.drag.node {
			let k = self.viewport.k;
			let p = Point::new(
				self.drag.node_start.x + (sx - self.drag.start_x) / k,
				self.drag.node_start.y + (sy - self.drag.start_y) / k,
			);
			self.scene.set_position(id, p);
		} else if self.pan.active {
			self.viewport.x = self.pan.viewport_start_x + (sx - self.pan.start_x);
			self.viewport.y = self.pan.viewport_start_y + (sy - self.pan.start_y);
		}
	}

	pub fn pointer_up(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
		self.pinch = None;
	}

	/// Two-finger zoom around the midpoint of the fingers.
	pub fn pinch(&mut self, (x1, y1): (f64, f64), (x2, y2): (f64, f64)) {
		self.drag = DragState::default();
		self.pan.active = false;
		let distance = (x2 - x1).hypot(y2 - y1);
		if let Some(prev) = self.pinch.filter(|d| *d > f64::EPSILON) {
			self.viewport.zoom_at(
				(x1 + x2) / 2.0,
				(y1 + y2) / 2.0,
				distance / prev,
				self.config.zoom,
			);
		}
		self.pinch = Some(distance);
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = self.config.wheel_factor(delta_y);
		self.viewport.zoom_at(sx, sy, factor, self.config.zoom);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::{DisplayMode, EngineError};

	const DOC: &str = r#"{
		"elements": {
			"nodes": [
				{ "data": { "id": "a", "label": "Dune", "category": "Literature" } },
				{ "data": { "id": "b", "label": "Watchmen", "category": "Comics" } },
				{ "data": { "id": "c", "label": "Doom", "category": "Video Games" } }
			],
			"edges": [
				{ "data": { "source": "a", "target": "b", "relation": "lit" } },
				{ "data": { "source": "b", "target": "c", "relation": "game" } }
			]
		}
	}"#;

	fn session() -> GraphSession {
		let mut s = GraphSession::new(ViewConfig::default(), 800.0, 600.0);
		s.load_text(DOC, 0.0).unwrap();
		s
	}

	fn settle(s: &mut GraphSession) {
		let mut frames = 0;
		while s.is_laying_out() {
			s.tick(frames as f64);
			frames += 1;
			assert!(frames < 10_000);
		}
	}

	#[test]
	fn load_starts_a_layout() {
		let mut s = session();
		assert!(s.is_laying_out());
		settle(&mut s);
		assert_eq!(s.scene.nodes().len(), 3);
	}

	#[test]
	fn superseded_load_is_dropped() {
		let mut s = GraphSession::new(ViewConfig::default(), 800.0, 600.0);
		let slow = s.begin_load();
		s.load_text(r#"{"nodes":[{"id":"x"}],"edges":[]}"#, 0.0).unwrap();
		let doc = s.loader().load_str(DOC).unwrap();
		assert_eq!(s.finish_load(slow, Ok(doc), 0.0), Ok(false));
		assert_eq!(s.scene.nodes().len(), 1);
	}

	#[test]
	fn failed_load_keeps_scene() {
		let mut s = session();
		let err = s.apply(ViewCommand::LoadText("[1, 2".into()), 0.0).unwrap_err();
		assert!(matches!(err, EngineError::Parse(_)));
		assert_eq!(s.scene.nodes().len(), 3);
	}

	#[test]
	fn search_frames_matches() {
		let mut s = session();
		settle(&mut s);
		let before = s.viewport;
		s.apply(ViewCommand::Search("  watch ".into()), 0.0).unwrap();
		assert!(s.scene.node_style("b").unwrap().highlighted);
		assert_ne!(s.viewport, before);

		let framed = s.viewport;
		s.apply(ViewCommand::Search("zzz".into()), 0.0).unwrap();
		assert_eq!(s.viewport, framed);
		assert!(s.scene.node_styles().all(|(_, _, st)| !st.highlighted));
	}

	#[test]
	fn dragging_moves_only_the_grabbed_node() {
		let mut s = session();
		settle(&mut s);
		let a = s.scene.position("a").unwrap();
		let c = s.scene.position("c").unwrap();
		let (sx, sy) = s.viewport.model_to_screen(a);
		s.pointer_down(sx, sy);
		s.pointer_move(sx + 20.0, sy + 10.0);
		s.pointer_up();
		let moved = s.scene.position("a").unwrap();
		let k = s.viewport.k;
		assert!((moved.x - (a.x + 20.0 / k)).abs() < 1e-9);
		assert!((moved.y - (a.y + 10.0 / k)).abs() < 1e-9);
		assert_eq!(s.scene.position("c"), Some(c));
	}

	#[test]
	fn background_drag_pans() {
		let mut s = GraphSession::new(ViewConfig::default(), 800.0, 600.0);
		s.pointer_down(5.0, 5.0);
		s.pointer_move(25.0, 15.0);
		assert_eq!((s.viewport.x, s.viewport.y), (20.0, 10.0));
		s.pointer_up();
		s.pointer_move(100.0, 100.0);
		assert_eq!((s.viewport.x, s.viewport.y), (20.0, 10.0));
	}

	#[test]
	fn pinch_zooms_by_finger_spread() {
		let mut s = GraphSession::new(ViewConfig::default(), 800.0, 600.0);
		s.pinch((350.0, 300.0), (450.0, 300.0));
		assert_eq!(s.viewport.k, 1.0);
		s.pinch((300.0, 300.0), (500.0, 300.0));
		assert_eq!(s.viewport.k, 2.0);
		assert_eq!(s.viewport.screen_to_model(400.0, 300.0), Point::new(400.0, 300.0));
		s.pointer_up();
		s.pinch((0.0, 0.0), (10.0, 0.0));
		assert_eq!(s.viewport.k, 2.0);
	}

	#[test]
	fn wheel_respects_zoom_bounds() {
		let mut s = GraphSession::new(ViewConfig::default(), 800.0, 600.0);
		for _ in 0..100 {
			s.wheel(400.0, 300.0, -1.0);
		}
		assert_eq!(s.viewport.k, 4.0);
		for _ in 0..200 {
			s.wheel(400.0, 300.0, 1.0);
		}
		assert_eq!(s.viewport.k, 0.05);
	}

	#[test]
	fn narrowing_the_window_switches_to_compact() {
		let mut s = session();
		let full = s.scene.node_style("a").unwrap().diameter;
		let (_, edge) = s.scene.edge_styles().next().unwrap();
		assert_eq!(edge.arrow_size, 24.0);

		assert!(s.update_display_mode(600.0));
		assert_eq!(s.scene.display_mode(), DisplayMode::Compact);
		assert_eq!(s.config.wheel_sensitivity, 0.5);
		assert!(s.scene.node_style("a").unwrap().diameter < full);
		let (_, edge) = s.scene.edge_styles().next().unwrap();
		assert_eq!(edge.arrow_size, 12.0);

		assert!(!s.update_display_mode(500.0));
		assert!(s.update_display_mode(1280.0));
		assert_eq!(s.scene.display_mode(), DisplayMode::Full);
	}

	#[test]
	fn legend_lists_present_values() {
		let mut s = session();
		s.apply(ViewCommand::ToggleRelation("game".into(), false), 0.0)
			.unwrap();
		let legend = s.legend();
		let cats: Vec<_> = legend.categories.iter().map(|w| w.name.as_str()).collect();
		assert_eq!(cats, ["Comics", "Literature", "Video Games"]);
		let game = legend.relations.iter().find(|w| w.name == "game").unwrap();
		assert!(!game.enabled);
		assert_eq!(game.color.as_str(), "#e7298a");
	}
}

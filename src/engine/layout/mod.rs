//! Layout selection and dispatch.
//!
//! A closed set of named strategies maps to parameter records. The
//! dispatcher drives one layout engine at a time; starting a new run
//! supersedes the previous one and its results are never handed out.

mod force;
mod geometric;

use log::{debug, info};

pub use force::ForceLayout;
pub use geometric::{OneShotLayout, breadth_first, circle, concentric, grid, hierarchical};

/// Named layout strategies offered by the view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutName {
	Dagre,
	BreadthFirst,
	Cose,
	Concentric,
	Grid,
	Circle,
}

impl LayoutName {
	pub const ALL: [LayoutName; 6] = [
		Self::Dagre,
		Self::BreadthFirst,
		Self::Cose,
		Self::Concentric,
		Self::Grid,
		Self::Circle,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Dagre => "dagre",
			Self::BreadthFirst => "breadthfirst",
			Self::Cose => "cose",
			Self::Concentric => "concentric",
			Self::Grid => "grid",
			Self::Circle => "circle",
		}
	}

	/// Human-readable name for selectors.
	pub fn title(self) -> &'static str {
		match self {
			Self::Dagre => "Hierarchical (dagre)",
			Self::BreadthFirst => "Breadth-first",
			Self::Cose => "Force-directed (cose)",
			Self::Concentric => "Concentric",
			Self::Grid => "Grid",
			Self::Circle => "Circle",
		}
	}

	pub fn parse(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|l| l.as_str() == name)
	}

	pub fn spec(self) -> LayoutSpec {
		match self {
			Self::Dagre => LayoutSpec::Hierarchical(HierarchicalParams {
				rank_dir: RankDir::TopBottom,
				node_sep: 50.0,
				rank_sep: 120.0,
				edge_sep: 20.0,
			}),
			Self::BreadthFirst => LayoutSpec::BreadthFirst(BreadthFirstParams {
				directed: true,
				spacing_factor: 1.5,
				padding: 50.0,
			}),
			Self::Cose => LayoutSpec::Force(ForceParams {
				padding: 200.0,
				node_repulsion: 300_000.0,
				ideal_edge_length: 400.0,
				edge_elasticity: 40.0,
				gravity: 1.2,
				num_iter: 5000,
				avoid_overlap: true,
				node_overlap: 120.0,
				cooling_factor: 0.9,
				min_temp: 0.5,
				component_spacing: 250.0,
			}),
			Self::Concentric => LayoutSpec::Concentric(ConcentricParams {
				min_node_spacing: 20.0,
				padding: 30.0,
			}),
			Self::Grid => LayoutSpec::Grid(GridParams {
				padding: 20.0,
				avoid_overlap: true,
			}),
			Self::Circle => LayoutSpec::Circle(CircleParams { padding: 20.0 }),
		}
	}
}

/// Flow direction of a hierarchical layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankDir {
	TopBottom,
	LeftRight,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HierarchicalParams {
	pub rank_dir: RankDir,
	pub node_sep: f64,
	pub rank_sep: f64,
	pub edge_sep: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BreadthFirstParams {
	pub directed: bool,
	pub spacing_factor: f64,
	pub padding: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForceParams {
	pub padding: f64,
	pub node_repulsion: f64,
	pub ideal_edge_length: f64,
	pub edge_elasticity: f64,
	pub gravity: f64,
	pub num_iter: usize,
	pub avoid_overlap: bool,
	pub node_overlap: f64,
	pub cooling_factor: f64,
	pub min_temp: f64,
	pub component_spacing: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConcentricParams {
	pub min_node_spacing: f64,
	pub padding: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridParams {
	pub padding: f64,
	pub avoid_overlap: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CircleParams {
	pub padding: f64,
}

/// A strategy plus its parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutSpec {
	Hierarchical(HierarchicalParams),
	BreadthFirst(BreadthFirstParams),
	Force(ForceParams),
	Concentric(ConcentricParams),
	Grid(GridParams),
	Circle(CircleParams),
}

impl LayoutSpec {
	/// Compact top-to-bottom hierarchy used for unknown names.
	pub fn fallback() -> Self {
		Self::Hierarchical(HierarchicalParams {
			rank_dir: RankDir::TopBottom,
			node_sep: 15.0,
			rank_sep: 40.0,
			edge_sep: 5.0,
		})
	}

	pub fn name(&self) -> &'static str {
		match self {
			Self::Hierarchical(_) => LayoutName::Dagre.as_str(),
			Self::BreadthFirst(_) => LayoutName::BreadthFirst.as_str(),
			Self::Force(_) => LayoutName::Cose.as_str(),
			Self::Concentric(_) => LayoutName::Concentric.as_str(),
			Self::Grid(_) => LayoutName::Grid.as_str(),
			Self::Circle(_) => LayoutName::Circle.as_str(),
		}
	}

	/// Margin kept around the laid-out nodes when fitting the view.
	pub fn padding(&self) -> f64 {
		match self {
			Self::Hierarchical(_) => 30.0,
			Self::BreadthFirst(p) => p.padding,
			Self::Force(p) => p.padding,
			Self::Concentric(p) => p.padding,
			Self::Grid(p) => p.padding,
			Self::Circle(p) => p.padding,
		}
	}

	/// Builds the engine that computes this layout.
	pub fn engine(&self, input: &LayoutInput) -> Box<dyn LayoutEngine> {
		match self {
			Self::Hierarchical(p) => Box::new(hierarchical(p, input)),
			Self::BreadthFirst(p) => Box::new(breadth_first(p, input)),
			Self::Force(p) => Box::new(ForceLayout::new(p, input)),
			Self::Concentric(p) => Box::new(concentric(p, input)),
			Self::Grid(p) => Box::new(grid(p, input)),
			Self::Circle(p) => Box::new(circle(p, input)),
		}
	}
}

/// Looks up a layout by name, falling back to a hierarchical layout.
pub fn select_layout(name: &str) -> LayoutSpec {
	match LayoutName::parse(name) {
		Some(layout) => layout.spec(),
		None => {
			debug!("unknown layout `{name}`, using fallback hierarchy");
			LayoutSpec::fallback()
		}
	}
}

/// Model-space coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
	pub id: String,
	pub diameter: f64,
	pub position: Point,
}

/// The graph handed to a layout engine. Edges index into `nodes`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutInput {
	pub nodes: Vec<LayoutNode>,
	pub edges: Vec<(usize, usize)>,
}

impl LayoutInput {
	pub(crate) fn max_diameter(&self) -> f64 {
		self.nodes.iter().map(|n| n.diameter).fold(0.0, f64::max)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutStep {
	Running,
	Done,
}

/// A positioning algorithm that may run over several steps.
pub trait LayoutEngine {
	/// Advances by at most `budget` iterations.
	fn step(&mut self, budget: usize) -> LayoutStep;

	/// Current positions, indexed like [`LayoutInput::nodes`].
	fn positions(&self) -> Vec<Point>;
}

/// Identifies one layout run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayoutTicket(u64);

/// Final positions of a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutFrame {
	pub ticket: LayoutTicket,
	pub name: &'static str,
	pub padding: f64,
	pub positions: Vec<(String, Point)>,
}

struct ActiveRun {
	ticket: LayoutTicket,
	name: &'static str,
	padding: f64,
	ids: Vec<String>,
	engine: Box<dyn LayoutEngine>,
}

/// Drives at most one layout run at a time.
#[derive(Default)]
pub struct LayoutDispatcher {
	issued: u64,
	active: Option<ActiveRun>,
}

impl LayoutDispatcher {
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a run, superseding any run still in flight.
	pub fn start(&mut self, spec: &LayoutSpec, input: &LayoutInput) -> LayoutTicket {
		self.issued += 1;
		let ticket = LayoutTicket(self.issued);
		if let Some(stale) = self.active.take() {
			info!("layout `{}` superseded by `{}`", stale.name, spec.name());
		}
		debug!(
			"starting layout `{}` on {} nodes",
			spec.name(),
			input.nodes.len()
		);
		self.active = Some(ActiveRun {
			ticket,
			name: spec.name(),
			padding: spec.padding(),
			ids: input.nodes.iter().map(|n| n.id.clone()).collect(),
			engine: spec.engine(input),
		});
		ticket
	}

	/// Steps the active run; yields its frame once it has finished.
	pub fn pump(&mut self, budget: usize) -> Option<LayoutFrame> {
		let run = self.active.as_mut()?;
		if run.engine.step(budget) == LayoutStep::Running {
			return None;
		}
		let run = self.active.take()?;
		info!("layout `{}` finished", run.name);
		let positions = run.ids.into_iter().zip(run.engine.positions()).collect();
		Some(LayoutFrame {
			ticket: run.ticket,
			name: run.name,
			padding: run.padding,
			positions,
		})
	}

	/// Runs the active layout to completion.
	pub fn finish(&mut self) -> Option<LayoutFrame> {
		loop {
			self.active.as_ref()?;
			if let Some(frame) = self.pump(usize::MAX) {
				return Some(frame);
			}
		}
	}

	/// Whether `ticket` belongs to the most recently started run.
	pub fn is_current(&self, ticket: LayoutTicket) -> bool {
		ticket.0 == self.issued
	}

	pub fn is_running(&self) -> bool {
		self.active.is_some()
	}

	pub fn cancel(&mut self) {
		if let Some(run) = self.active.take() {
			info!("layout `{}` cancelled", run.name);
		}
		self.issued += 1;
	}
}

use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::{ForceParams, LayoutEngine, LayoutInput, LayoutStep, Point};

const TICK: f32 = 0.016;
const INITIAL_TEMP: f64 = 1000.0;
/// Simulation ticks per cooling round.
const ROUND: usize = 50;
const GRAVITY_STEP: f64 = 0.001;
const OVERLAP_SWEEPS: usize = 200;

/// Iterative force-directed layout on top of `force_graph`.
///
/// The simulation cools once per round of ticks and stops when the
/// temperature drops below `min_temp` or the iteration cap is reached. The
/// settled positions are then rescaled to the ideal edge length and, if
/// requested, pushed apart until no two nodes overlap.
pub struct ForceLayout {
	graph: ForceGraph<usize, ()>,
	handles: Vec<DefaultNodeIdx>,
	diameters: Vec<f64>,
	edges: Vec<(usize, usize)>,
	params: ForceParams,
	iterations: usize,
	temperature: f64,
	finished: Option<Vec<Point>>,
}

impl ForceLayout {
	pub fn new(params: &ForceParams, input: &LayoutInput) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: (params.node_repulsion / 1000.0) as f32,
			force_spring: (params.edge_elasticity / 1000.0) as f32,
			force_max: (params.ideal_edge_length / 4.0) as f32,
			node_speed: 3000.0,
			damping_factor: params.cooling_factor as f32,
		});
		let n = input.nodes.len();
		let mut degree = vec![0usize; n];
		for &(s, t) in &input.edges {
			degree[s] += 1;
			degree[t] += 1;
		}

		let mut handles = Vec::with_capacity(n);
		for i in 0..n {
			let angle = (i as f64) * 2.0 * PI / n.max(1) as f64;
			let (x, y) = (
				(100.0 * angle.cos()) as f32,
				(100.0 * angle.sin()) as f32,
			);
			handles.push(graph.add_node(NodeData {
				x,
				y,
				mass: 10.0 + degree[i] as f32,
				is_anchor: false,
				user_data: i,
			}));
		}
		for &(s, t) in &input.edges {
			if s != t {
				graph.add_edge(handles[s], handles[t], EdgeData::default());
			}
		}

		Self {
			graph,
			handles,
			diameters: input.nodes.iter().map(|n| n.diameter).collect(),
			edges: input.edges.clone(),
			params: params.clone(),
			iterations: 0,
			temperature: INITIAL_TEMP,
			finished: None,
		}
	}

	fn raw_positions(&self) -> Vec<Point> {
		let mut out = vec![Point::default(); self.handles.len()];
		self.graph.visit_nodes(|node| {
			out[node.data.user_data] = Point::new(node.x() as f64, node.y() as f64);
		});
		out
	}

	fn apply_gravity(&mut self) {
		let n = self.handles.len();
		if n == 0 {
			return;
		}
		let (mut cx, mut cy) = (0.0f64, 0.0f64);
		self.graph.visit_nodes(|node| {
			cx += node.x() as f64;
			cy += node.y() as f64;
		});
		let (cx, cy) = (cx / n as f64, cy / n as f64);
		let pull = self.params.gravity * GRAVITY_STEP;
		self.graph.visit_nodes_mut(|node| {
			node.data.x -= ((node.data.x as f64 - cx) * pull) as f32;
			node.data.y -= ((node.data.y as f64 - cy) * pull) as f32;
		});
	}

	fn settle(&self) -> Vec<Point> {
		let mut positions = self.raw_positions();
		let lengths: Vec<f64> = self
			.edges
			.iter()
			.filter(|(s, t)| s != t)
			.map(|&(s, t)| {
				let (a, b) = (positions[s], positions[t]);
				(a.x - b.x).hypot(a.y - b.y)
			})
			.collect();
		let mean = lengths.iter().sum::<f64>() / lengths.len().max(1) as f64;
		if mean > f64::EPSILON {
			let factor = self.params.ideal_edge_length / mean;
			for p in &mut positions {
				p.x *= factor;
				p.y *= factor;
			}
		}
		if self.params.avoid_overlap {
			separate_overlaps(&mut positions, &self.diameters, self.params.node_overlap);
		}
		positions
	}
}

impl LayoutEngine for ForceLayout {
	fn step(&mut self, budget: usize) -> LayoutStep {
		if self.finished.is_some() {
			return LayoutStep::Done;
		}
		if self.handles.is_empty() {
			self.finished = Some(Vec::new());
			return LayoutStep::Done;
		}
		let mut remaining = budget;
		while remaining > 0
			&& self.iterations < self.params.num_iter
			&& self.temperature >= self.params.min_temp
		{
			self.graph.update(TICK);
			self.apply_gravity();
			self.iterations += 1;
			remaining -= 1;
			if self.iterations % ROUND == 0 {
				self.temperature *= self.params.cooling_factor;
			}
		}
		if self.iterations >= self.params.num_iter || self.temperature < self.params.min_temp {
			self.finished = Some(self.settle());
			LayoutStep::Done
		} else {
			LayoutStep::Running
		}
	}

	fn positions(&self) -> Vec<Point> {
		match &self.finished {
			Some(done) => done.clone(),
			None => self.raw_positions(),
		}
	}
}

/// Pushes node pairs apart until every pair is at least the sum of their
/// radii plus `gap` apart, or the sweep budget runs out.
fn separate_overlaps(positions: &mut [Point], diameters: &[f64], gap: f64) {
	let n = positions.len();
	for _ in 0..OVERLAP_SWEEPS {
		let mut moved = false;
		for i in 0..n {
			for j in (i + 1)..n {
				let min = (diameters[i] + diameters[j]) / 2.0 + gap;
				let (dx, dy) = (positions[j].x - positions[i].x, positions[j].y - positions[i].y);
				let dist = dx.hypot(dy);
				if dist >= min {
					continue;
				}
				// Coincident nodes get a deterministic direction.
				let (ux, uy) = if dist > f64::EPSILON {
					(dx / dist, dy / dist)
				} else {
					let a = (i * 7 + j) as f64;
					(a.cos(), a.sin())
				};
				let push = (min - dist) / 2.0;
				positions[i].x -= ux * push;
				positions[i].y -= uy * push;
				positions[j].x += ux * push;
				positions[j].y += uy * push;
				moved = true;
			}
		}
		if !moved {
			break;
		}
	}
}

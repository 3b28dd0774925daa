use std::collections::VecDeque;
use std::f64::consts::PI;

use super::{
	BreadthFirstParams, CircleParams, ConcentricParams, GridParams, HierarchicalParams,
	LayoutEngine, LayoutInput, LayoutStep, Point, RankDir,
};

const GRID_GAP: f64 = 10.0;

/// Layout computed up front; the first step completes it.
#[derive(Clone, Debug, Default)]
pub struct OneShotLayout {
	positions: Vec<Point>,
}

impl LayoutEngine for OneShotLayout {
	fn step(&mut self, _budget: usize) -> LayoutStep {
		LayoutStep::Done
	}

	fn positions(&self) -> Vec<Point> {
		self.positions.clone()
	}
}

fn adjacency(input: &LayoutInput, directed: bool) -> Vec<Vec<usize>> {
	let mut out = vec![Vec::new(); input.nodes.len()];
	for &(s, t) in &input.edges {
		if s == t {
			continue;
		}
		out[s].push(t);
		if !directed {
			out[t].push(s);
		}
	}
	out
}

/// Marks the edges that close a cycle in a depth-first walk.
fn back_edges(input: &LayoutInput) -> Vec<bool> {
	let n = input.nodes.len();
	let mut out_edges: Vec<Vec<usize>> = vec![Vec::new(); n];
	for (i, &(s, _)) in input.edges.iter().enumerate() {
		out_edges[s].push(i);
	}
	// 0 = unvisited, 1 = on stack, 2 = done
	let mut state = vec![0u8; n];
	let mut back = vec![false; input.edges.len()];
	for root in 0..n {
		if state[root] != 0 {
			continue;
		}
		let mut stack = vec![(root, 0usize)];
		state[root] = 1;
		while let Some(top) = stack.last_mut() {
			let v = top.0;
			if let Some(&e) = out_edges[v].get(top.1) {
				top.1 += 1;
				let t = input.edges[e].1;
				match state[t] {
					0 => {
						state[t] = 1;
						stack.push((t, 0));
					}
					1 => back[e] = true,
					_ => {}
				}
			} else {
				state[v] = 2;
				stack.pop();
			}
		}
	}
	back
}

/// Longest-path layering over the graph with cycles broken.
fn ranks(input: &LayoutInput) -> Vec<usize> {
	let n = input.nodes.len();
	let back = back_edges(input);
	let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
	let mut succs: Vec<Vec<usize>> = vec![Vec::new(); n];
	for (i, &(s, t)) in input.edges.iter().enumerate() {
		if back[i] || s == t {
			continue;
		}
		succs[s].push(t);
		preds[t].push(s);
	}
	let mut indegree: Vec<usize> = preds.iter().map(Vec::len).collect();
	let mut queue: VecDeque<usize> = (0..n).filter(|&v| indegree[v] == 0).collect();
	let mut rank = vec![0usize; n];
	while let Some(v) = queue.pop_front() {
		for &t in &succs[v] {
			rank[t] = rank[t].max(rank[v] + 1);
			indegree[t] -= 1;
			if indegree[t] == 0 {
				queue.push_back(t);
			}
		}
	}
	rank
}

fn group_by_level(levels: &[usize]) -> Vec<Vec<usize>> {
	let depth = levels.iter().copied().max().map_or(0, |m| m + 1);
	let mut grouped = vec![Vec::new(); depth];
	for (v, &level) in levels.iter().enumerate() {
		grouped[level].push(v);
	}
	grouped
}

/// Reorders each layer by the mean position of its neighbours in the layer
/// above.
fn barycenter_sweep(layers: &mut [Vec<usize>], preds: &[Vec<usize>]) {
	let mut order = vec![0.0f64; preds.len()];
	for layer in layers.iter() {
		for (i, &v) in layer.iter().enumerate() {
			order[v] = i as f64;
		}
	}
	for r in 1..layers.len() {
		let mut sorted: Vec<(usize, f64)> = layers[r]
			.iter()
			.map(|&v| {
				let above = &preds[v];
				let key = if above.is_empty() {
					order[v]
				} else {
					above.iter().map(|&p| order[p]).sum::<f64>() / above.len() as f64
				};
				(v, key)
			})
			.collect();
		sorted.sort_by(|a, b| a.1.total_cmp(&b.1));
		layers[r] = sorted.into_iter().map(|(v, _)| v).collect();
		for (i, &v) in layers[r].iter().enumerate() {
			order[v] = i as f64;
		}
	}
}

/// Places layers along the main axis and spreads each layer, centred, along
/// the cross axis.
fn place_layers(
	input: &LayoutInput,
	layers: &[Vec<usize>],
	node_gap: f64,
	layer_gap: f64,
	dir: RankDir,
) -> Vec<Point> {
	let mut positions = vec![Point::default(); input.nodes.len()];
	let mut main = 0.0;
	let mut prev_depth = 0.0;
	for (r, layer) in layers.iter().enumerate() {
		let depth = layer
			.iter()
			.map(|&v| input.nodes[v].diameter)
			.fold(0.0, f64::max);
		if r > 0 {
			main += prev_depth / 2.0 + layer_gap + depth / 2.0;
		}
		prev_depth = depth;

		let span: f64 = layer.iter().map(|&v| input.nodes[v].diameter).sum::<f64>()
			+ node_gap * layer.len().saturating_sub(1) as f64;
		let mut cross = -span / 2.0;
		for &v in layer {
			let d = input.nodes[v].diameter;
			let c = cross + d / 2.0;
			positions[v] = match dir {
				RankDir::TopBottom => Point::new(c, main),
				RankDir::LeftRight => Point::new(main, c),
			};
			cross += d + node_gap;
		}
	}
	positions
}

pub fn hierarchical(params: &HierarchicalParams, input: &LayoutInput) -> OneShotLayout {
	let rank = ranks(input);
	let mut layers = group_by_level(&rank);
	let mut preds: Vec<Vec<usize>> = vec![Vec::new(); input.nodes.len()];
	for &(s, t) in &input.edges {
		if rank[s] < rank[t] {
			preds[t].push(s);
		}
	}
	barycenter_sweep(&mut layers, &preds);
	let node_gap = params.node_sep.max(params.edge_sep);
	OneShotLayout {
		positions: place_layers(input, &layers, node_gap, params.rank_sep, params.rank_dir),
	}
}

pub fn breadth_first(params: &BreadthFirstParams, input: &LayoutInput) -> OneShotLayout {
	let n = input.nodes.len();
	let adj = adjacency(input, params.directed);
	let mut indegree = vec![0usize; n];
	for &(s, t) in &input.edges {
		if s != t {
			indegree[t] += 1;
		}
	}
	let mut roots: Vec<usize> = if params.directed {
		(0..n).filter(|&v| indegree[v] == 0).collect()
	} else {
		Vec::new()
	};
	let mut depth = vec![usize::MAX; n];
	let mut queue = VecDeque::new();
	let mut seeded = 0;
	loop {
		for &r in &roots[seeded..] {
			if depth[r] == usize::MAX {
				depth[r] = 0;
				queue.push_back(r);
			}
		}
		seeded = roots.len();
		while let Some(v) = queue.pop_front() {
			for &t in &adj[v] {
				if depth[t] == usize::MAX {
					depth[t] = depth[v] + 1;
					queue.push_back(t);
				}
			}
		}
		// Anything unreached (cycles, undirected mode) roots its own tree.
		match (0..n).find(|&v| depth[v] == usize::MAX) {
			Some(v) => roots.push(v),
			None => break,
		}
	}
	let layers = group_by_level(&depth);
	let cell = input.max_diameter() * params.spacing_factor;
	let node_gap = (cell - input.max_diameter()).max(0.0);
	OneShotLayout {
		positions: place_layers(input, &layers, node_gap, cell, RankDir::TopBottom),
	}
}

pub fn concentric(params: &ConcentricParams, input: &LayoutInput) -> OneShotLayout {
	let n = input.nodes.len();
	let mut degree = vec![0usize; n];
	for &(s, t) in &input.edges {
		degree[s] += 1;
		degree[t] += 1;
	}
	let max_degree = degree.iter().copied().max().unwrap_or(0);
	let level_width = (max_degree / 4).max(1);
	let levels: Vec<usize> = degree
		.iter()
		.map(|&d| (max_degree - d) / level_width)
		.collect();

	let step = input.max_diameter() + params.min_node_spacing;
	let mut positions = vec![Point::default(); n];
	let mut radius: f64 = 0.0;
	for (ring, members) in group_by_level(&levels)
		.into_iter()
		.filter(|m| !m.is_empty())
		.enumerate()
	{
		if ring > 0 || members.len() > 1 {
			let fit = members.len() as f64 * step / (2.0 * PI);
			radius = fit.max(if ring == 0 { 0.0 } else { radius + step });
		}
		let dtheta = 2.0 * PI / members.len() as f64;
		for (i, &v) in members.iter().enumerate() {
			let theta = -PI / 2.0 + dtheta * i as f64;
			positions[v] = Point::new(radius * theta.cos(), radius * theta.sin());
		}
	}
	OneShotLayout { positions }
}

pub fn grid(params: &GridParams, input: &LayoutInput) -> OneShotLayout {
	let n = input.nodes.len();
	let cols = (n as f64).sqrt().ceil().max(1.0) as usize;
	let cell = input.max_diameter() + if params.avoid_overlap { GRID_GAP } else { 0.0 };
	let positions = (0..n)
		.map(|i| Point::new((i % cols) as f64 * cell, (i / cols) as f64 * cell))
		.collect();
	OneShotLayout { positions }
}

pub fn circle(params: &CircleParams, input: &LayoutInput) -> OneShotLayout {
	let n = input.nodes.len();
	if n <= 1 {
		return OneShotLayout {
			positions: vec![Point::default(); n],
		};
	}
	let circumference: f64 = input
		.nodes
		.iter()
		.map(|node| node.diameter + params.padding)
		.sum();
	let radius = (circumference / (2.0 * PI)).max(input.max_diameter());
	let dtheta = 2.0 * PI / n as f64;
	let positions = (0..n)
		.map(|i| {
			let theta = -PI / 2.0 + dtheta * i as f64;
			Point::new(radius * theta.cos(), radius * theta.sin())
		})
		.collect();
	OneShotLayout { positions }
}

#[cfg(test)]
mod tests {
	use super::super::{LayoutName, LayoutNode, LayoutSpec};
	use super::*;

	fn input(n: usize, edges: &[(usize, usize)]) -> LayoutInput {
		LayoutInput {
			nodes: (0..n)
				.map(|i| LayoutNode {
					id: format!("n{i}"),
					diameter: 60.0,
					position: Point::default(),
				})
				.collect(),
			edges: edges.to_vec(),
		}
	}

	fn params<T>(name: LayoutName, pick: impl Fn(LayoutSpec) -> Option<T>) -> T {
		pick(name.spec()).unwrap()
	}

	fn hier() -> HierarchicalParams {
		params(LayoutName::Dagre, |s| match s {
			LayoutSpec::Hierarchical(p) => Some(p),
			_ => None,
		})
	}

	fn no_overlap(positions: &[Point], diameter: f64) -> bool {
		positions.iter().enumerate().all(|(i, a)| {
			positions[i + 1..]
				.iter()
				.all(|b| ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt() >= diameter - 1e-6)
		})
	}

	#[test]
	fn hierarchy_puts_targets_below_sources() {
		let g = input(4, &[(0, 1), (1, 2), (0, 3)]);
		let pos = hierarchical(&hier(), &g).positions;
		assert!(pos[1].y > pos[0].y);
		assert!(pos[2].y > pos[1].y);
		assert_eq!(pos[1].y, pos[3].y);
		assert!(no_overlap(&pos, 60.0));
	}

	#[test]
	fn hierarchy_tolerates_cycles() {
		let g = input(3, &[(0, 1), (1, 2), (2, 0)]);
		let pos = hierarchical(&hier(), &g).positions;
		assert!(pos.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
		assert!(no_overlap(&pos, 60.0));
	}

	#[test]
	fn left_right_swaps_axes() {
		let mut p = hier();
		p.rank_dir = RankDir::LeftRight;
		let pos = hierarchical(&p, &input(2, &[(0, 1)])).positions;
		assert!(pos[1].x > pos[0].x);
		assert_eq!(pos[0].y, pos[1].y);
	}

	#[test]
	fn breadth_first_levels_follow_distance() {
		let p = BreadthFirstParams {
			directed: true,
			spacing_factor: 1.5,
			padding: 50.0,
		};
		let pos = breadth_first(&p, &input(4, &[(0, 1), (1, 2), (2, 1)])).positions;
		assert!(pos[1].y > pos[0].y);
		assert!(pos[2].y > pos[1].y);
		// Isolated node is a root of its own.
		assert_eq!(pos[3].y, pos[0].y);
	}

	#[test]
	fn concentric_puts_hub_in_centre() {
		let p = ConcentricParams {
			min_node_spacing: 20.0,
			padding: 30.0,
		};
		let g = input(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]);
		let pos = concentric(&p, &g).positions;
		assert_eq!(pos[0], Point::default());
		assert!(pos[1..].iter().all(|q| (q.x.hypot(q.y) - pos[1].x.hypot(pos[1].y)).abs() < 1e-6));
		assert!(no_overlap(&pos, 60.0));
	}

	#[test]
	fn grid_and_circle_avoid_overlap() {
		let g = input(7, &[]);
		let grid_pos = grid(
			&GridParams {
				padding: 20.0,
				avoid_overlap: true,
			},
			&g,
		)
		.positions;
		assert!(no_overlap(&grid_pos, 60.0));
		let circle_pos = circle(&CircleParams { padding: 20.0 }, &g).positions;
		assert!(no_overlap(&circle_pos, 60.0));
	}
}

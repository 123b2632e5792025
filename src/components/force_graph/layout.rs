//! Force layout driven by `force_graph`, with link-distance, centering and
//! collision constraints and alpha cooling layered over each library step.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::{debug, warn};

use super::types::GraphData;
use crate::config::ForceConfig;

const NODE_MASS: f32 = 10.0;

/// A link whose endpoints both resolved. Indices are positions in node order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedLink {
	/// Position of the link in the source `GraphData`.
	pub link: usize,
	pub source: usize,
	pub target: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodePosition {
	pub x: f64,
	pub y: f64,
	pub pinned: bool,
}

/// Positions keyed by node id, separate from the domain records.
#[derive(Clone, Debug, Default)]
pub struct LayoutSnapshot {
	pub positions: HashMap<String, NodePosition>,
}

impl LayoutSnapshot {
	pub fn get(&self, id: &str) -> Option<NodePosition> {
		self.positions.get(id).copied()
	}
}

pub struct Simulation {
	graph: ForceGraph<(), ()>,
	config: ForceConfig,
	ids: Vec<String>,
	order: Vec<DefaultNodeIdx>,
	slot: HashMap<DefaultNodeIdx, usize>,
	by_id: HashMap<String, usize>,
	links: Vec<ResolvedLink>,
	degree: Vec<usize>,
	pins: HashMap<usize, (f64, f64)>,
	alpha: f64,
	alpha_target: f64,
	center: (f64, f64),
}

fn parameters(config: &ForceConfig) -> SimulationParameters {
	SimulationParameters {
		force_charge: (-config.charge_strength).max(0.0) as f32,
		// link length is held by the rest-length pass instead
		force_spring: 0.0,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: config.velocity_damping as f32,
	}
}

fn phyllotaxis(i: usize, center: (f64, f64)) -> (f64, f64) {
	let radius = 10.0 * (0.5 + i as f64).sqrt();
	let angle = i as f64 * PI * (3.0 - 5.0_f64.sqrt());
	(center.0 + radius * angle.cos(), center.1 + radius * angle.sin())
}

impl Simulation {
	pub fn new(data: &GraphData, config: &ForceConfig, width: f64, height: f64) -> Self {
		let center = (width / 2.0, height / 2.0);
		let mut graph = ForceGraph::new(parameters(config));
		let mut order = Vec::with_capacity(data.nodes.len());
		let mut slot = HashMap::new();
		let mut by_id = HashMap::new();

		for (i, node) in data.nodes.iter().enumerate() {
			let (x, y) = phyllotaxis(i, center);
			let idx = graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: NODE_MASS,
				is_anchor: false,
				user_data: (),
			});
			order.push(idx);
			slot.insert(idx, i);
			by_id.entry(node.id.clone()).or_insert(i);
		}

		let mut links = Vec::new();
		let mut degree = vec![0; order.len()];
		for (i, link) in data.links.iter().enumerate() {
			match (by_id.get(&link.source), by_id.get(&link.target)) {
				(Some(&source), Some(&target)) => {
					graph.add_edge(order[source], order[target], EdgeData::default());
					degree[source] += 1;
					degree[target] += 1;
					links.push(ResolvedLink {
						link: i,
						source,
						target,
					});
				}
				_ => warn!(
					"dropping link {} -> {}: endpoint not in graph",
					link.source, link.target
				),
			}
		}
		debug!(
			"simulation built: {} nodes, {} links",
			order.len(),
			links.len()
		);

		Self {
			graph,
			config: config.clone(),
			ids: data.nodes.iter().map(|n| n.id.clone()).collect(),
			order,
			slot,
			by_id,
			links,
			degree,
			pins: HashMap::new(),
			alpha: 1.0,
			alpha_target: 0.0,
			center,
		}
	}

	pub fn links(&self) -> &[ResolvedLink] {
		&self.links
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn is_running(&self) -> bool {
		self.alpha_target > 0.0 || self.alpha >= self.config.alpha_min
	}

	/// Node positions in node order.
	pub fn positions(&self) -> Vec<(f64, f64)> {
		let mut out = vec![(0.0, 0.0); self.order.len()];
		self.graph.visit_nodes(|node| {
			if let Some(&i) = self.slot.get(&node.index()) {
				out[i] = (node.x() as f64, node.y() as f64);
			}
		});
		out
	}

	fn write_positions(&mut self, positions: &[(f64, f64)]) {
		let slot = &self.slot;
		self.graph.visit_nodes_mut(|node| {
			if let Some(&i) = slot.get(&node.index()) {
				node.data.x = positions[i].0 as f32;
				node.data.y = positions[i].1 as f32;
			}
		});
	}

	pub fn snapshot(&self) -> LayoutSnapshot {
		let positions = self
			.positions()
			.into_iter()
			.enumerate()
			.map(|(i, (x, y))| {
				(
					self.ids[i].clone(),
					NodePosition {
						x,
						y,
						pinned: self.pins.contains_key(&i),
					},
				)
			})
			.collect();
		LayoutSnapshot { positions }
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.by_id.get(id).copied()
	}

	pub fn is_pinned(&self, id: &str) -> bool {
		self.index_of(id)
			.is_some_and(|i| self.pins.contains_key(&i))
	}

	/// Fix `id` at graph position `(x, y)` until [`Simulation::unpin`].
	pub fn pin(&mut self, id: &str, x: f64, y: f64) -> bool {
		let Some(i) = self.index_of(id) else {
			return false;
		};
		self.pins.insert(i, (x, y));
		let target = self.order[i];
		self.graph.visit_nodes_mut(|node| {
			if node.index() == target {
				node.data.x = x as f32;
				node.data.y = y as f32;
				node.data.is_anchor = true;
			}
		});
		true
	}

	pub fn unpin(&mut self, id: &str) {
		let Some(i) = self.index_of(id) else {
			return;
		};
		self.pins.remove(&i);
		let target = self.order[i];
		self.graph.visit_nodes_mut(|node| {
			if node.index() == target {
				node.data.is_anchor = false;
			}
		});
	}

	pub fn reheat(&mut self, target: f64) {
		self.alpha_target = target.max(0.0);
	}

	pub fn cool(&mut self) {
		self.alpha_target = 0.0;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.center = (width / 2.0, height / 2.0);
	}

	/// Index of the top-most node within `radius` of graph point `(x, y)`.
	pub fn node_at(&self, x: f64, y: f64, radius: f64) -> Option<usize> {
		self.positions()
			.iter()
			.enumerate()
			.rev()
			.find(|(_, (nx, ny))| (nx - x).hypot(ny - y) < radius)
			.map(|(i, _)| i)
	}

	/// Advances one step. Returns false once the simulation has come to rest.
	pub fn tick(&mut self, dt: f32) -> bool {
		if !self.is_running() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		self.graph.update(dt * self.alpha as f32);

		let mut positions = self.positions();
		self.apply_links(&mut positions);
		self.apply_center(&mut positions);
		self.apply_collision(&mut positions);
		for (&i, &p) in &self.pins {
			positions[i] = p;
		}
		self.write_positions(&positions);
		true
	}

	fn apply_links(&self, positions: &mut [(f64, f64)]) {
		let (distance, strength) = (self.config.link_distance, self.config.link_strength);
		for link in &self.links {
			let (s, t) = (link.source, link.target);
			if s == t {
				continue;
			}
			let (mut dx, mut dy) = (
				positions[t].0 - positions[s].0,
				positions[t].1 - positions[s].1,
			);
			let mut d = dx.hypot(dy);
			if d < 1e-6 {
				(dx, dy, d) = (1e-3, 0.0, 1e-3);
			}
			let l = (d - distance) / d * self.alpha * strength;
			dx *= l;
			dy *= l;

			let (s_pinned, t_pinned) = (self.pins.contains_key(&s), self.pins.contains_key(&t));
			let bias = match (s_pinned, t_pinned) {
				(true, _) => 1.0,
				(_, true) => 0.0,
				_ => self.degree[s] as f64 / (self.degree[s] + self.degree[t]) as f64,
			};
			if !t_pinned {
				positions[t].0 -= dx * bias;
				positions[t].1 -= dy * bias;
			}
			if !s_pinned {
				positions[s].0 += dx * (1.0 - bias);
				positions[s].1 += dy * (1.0 - bias);
			}
		}
	}

	fn apply_center(&self, positions: &mut [(f64, f64)]) {
		if positions.is_empty() {
			return;
		}
		let n = positions.len() as f64;
		let (sx, sy) = positions
			.iter()
			.fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
		let shift = (
			(self.center.0 - sx / n) * self.config.center_strength,
			(self.center.1 - sy / n) * self.config.center_strength,
		);
		for (i, p) in positions.iter_mut().enumerate() {
			if !self.pins.contains_key(&i) {
				p.0 += shift.0;
				p.1 += shift.1;
			}
		}
	}

	fn apply_collision(&self, positions: &mut [(f64, f64)]) {
		let min_distance = self.config.collision_radius * 2.0;
		for a in 0..positions.len() {
			for b in (a + 1)..positions.len() {
				let (dx, dy) = (
					positions[a].0 - positions[b].0,
					positions[a].1 - positions[b].1,
				);
				let d = dx.hypot(dy);
				if d >= min_distance {
					continue;
				}
				let (ux, uy) = if d > 1e-6 {
					(dx / d, dy / d)
				} else {
					let angle = (a as f64 * 0.618_034 + b as f64 * 0.414_214) * 2.0 * PI;
					(angle.cos(), angle.sin())
				};
				let push = (min_distance - d) * self.config.collision_strength;
				let (a_pinned, b_pinned) = (self.pins.contains_key(&a), self.pins.contains_key(&b));
				let share_a = match (a_pinned, b_pinned) {
					(true, true) => continue,
					(true, false) => 0.0,
					(false, true) => 1.0,
					_ => 0.5,
				};
				positions[a].0 += ux * push * share_a;
				positions[a].1 += uy * push * share_a;
				positions[b].0 -= ux * push * (1.0 - share_a);
				positions[b].1 -= uy * push * (1.0 - share_a);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	fn graph(ids: &[&str], links: &[(&str, &str)]) -> GraphData {
		GraphData {
			nodes: ids
				.iter()
				.map(|id| GraphNode {
					id: id.to_string(),
					label: id.to_uppercase(),
					group: "g".into(),
					description: None,
				})
				.collect(),
			links: links
				.iter()
				.map(|(s, t)| GraphLink {
					source: s.to_string(),
					target: t.to_string(),
					relation: "r".into(),
				})
				.collect(),
		}
	}

	fn quiet() -> ForceConfig {
		ForceConfig {
			charge_strength: 0.0,
			..ForceConfig::default()
		}
	}

	fn distance(sim: &Simulation, a: &str, b: &str) -> f64 {
		let snap = sim.snapshot();
		let (a, b) = (snap.get(a).unwrap(), snap.get(b).unwrap());
		(a.x - b.x).hypot(a.y - b.y)
	}

	#[test]
	fn dangling_links_are_dropped_not_fatal() {
		let data = graph(&["a", "b"], &[("a", "b"), ("a", "ghost"), ("ghost", "b")]);
		let mut sim = Simulation::new(&data, &ForceConfig::default(), 800.0, 600.0);
		assert_eq!(
			sim.links(),
			&[ResolvedLink {
				link: 0,
				source: 0,
				target: 1
			}]
		);
		for _ in 0..10 {
			sim.tick(0.016);
		}
		assert_eq!(sim.snapshot().positions.len(), 2);
	}

	#[test]
	fn seeding_is_deterministic() {
		let data = graph(&["a", "b", "c"], &[("a", "b")]);
		let one = Simulation::new(&data, &ForceConfig::default(), 800.0, 600.0).positions();
		let two = Simulation::new(&data, &ForceConfig::default(), 800.0, 600.0).positions();
		assert_eq!(one, two);
	}

	#[test]
	fn pinned_node_does_not_move() {
		let data = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
		let mut sim = Simulation::new(&data, &ForceConfig::default(), 800.0, 600.0);
		assert!(sim.pin("a", 500.0, 500.0));
		for _ in 0..50 {
			sim.tick(0.016);
		}
		let a = sim.snapshot().get("a").unwrap();
		assert_eq!((a.x, a.y, a.pinned), (500.0, 500.0, true));
		assert!(!sim.pin("missing", 0.0, 0.0));
	}

	#[test]
	fn released_node_moves_again() {
		let data = graph(&["a", "b"], &[]);
		let mut sim = Simulation::new(&data, &quiet(), 800.0, 600.0);
		sim.pin("b", 30.0, 0.0);
		sim.pin("a", 0.0, 0.0);
		for _ in 0..5 {
			sim.tick(0.016);
		}
		assert_eq!(sim.snapshot().get("a").map(|p| (p.x, p.y)), Some((0.0, 0.0)));

		sim.unpin("a");
		assert!(!sim.is_pinned("a"));
		for _ in 0..5 {
			sim.tick(0.016);
		}
		let a = sim.snapshot().get("a").unwrap();
		assert!(!a.pinned);
		assert_ne!((a.x, a.y), (0.0, 0.0));
	}

	#[test]
	fn links_settle_near_rest_length() {
		let data = graph(&["a", "b"], &[("a", "b")]);
		let mut sim = Simulation::new(&data, &quiet(), 800.0, 600.0);
		sim.pin("a", 100.0, 300.0);
		sim.pin("b", 700.0, 300.0);
		sim.unpin("a");
		sim.unpin("b");
		for _ in 0..400 {
			sim.tick(0.016);
		}
		let d = distance(&sim, "a", "b");
		assert!((d - 150.0).abs() < 20.0, "settled at {d}");
	}

	#[test]
	fn collision_separates_overlapping_nodes() {
		let data = graph(&["a", "b"], &[]);
		let mut sim = Simulation::new(&data, &quiet(), 800.0, 600.0);
		sim.pin("a", 400.0, 300.0);
		sim.pin("b", 410.0, 300.0);
		sim.unpin("a");
		sim.unpin("b");
		for _ in 0..30 {
			sim.tick(0.016);
		}
		assert!(distance(&sim, "a", "b") > 70.0);
	}

	#[test]
	fn cools_to_rest_and_reheats_for_drag() {
		let data = graph(&["a", "b", "c"], &[("a", "b"), ("a", "c")]);
		let mut sim = Simulation::new(&data, &ForceConfig::default(), 800.0, 600.0);
		let mut ticks = 0;
		while sim.tick(0.016) {
			ticks += 1;
			assert!(ticks < 1000, "never cooled");
		}
		assert!(!sim.is_running());
		let before = sim.positions();
		assert!(!sim.tick(0.016));
		assert_eq!(before, sim.positions());

		sim.reheat(0.3);
		assert!(sim.is_running());
		let alpha = sim.alpha();
		sim.tick(0.016);
		assert!(sim.alpha() > alpha);

		sim.cool();
		let mut ticks = 0;
		while sim.tick(0.016) {
			ticks += 1;
			assert!(ticks < 1000, "never cooled after drag");
		}
	}

	#[test]
	fn hit_test_prefers_top_most_node() {
		let data = graph(&["a", "b"], &[]);
		let mut sim = Simulation::new(&data, &quiet(), 800.0, 600.0);
		sim.pin("a", 0.0, 0.0);
		sim.pin("b", 5.0, 0.0);
		assert_eq!(sim.node_at(2.0, 0.0, 20.0), Some(1));
		assert_eq!(sim.node_at(-15.0, 0.0, 20.0), Some(0));
		assert_eq!(sim.node_at(300.0, 300.0, 20.0), None);
	}
}

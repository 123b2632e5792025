//! Search and selection highlighting.
//!
//! A non-empty search decides which nodes are lit; otherwise the selected
//! node and its one-hop neighbors are. For links the selection is checked
//! first, then the search. Targets feed [`Fade`]s so changes ease in.

use std::collections::{HashMap, HashSet};

use super::types::GraphData;

/// Which elements are lit for one (search, selection) pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Highlight {
	/// False when neither a search nor a resolvable selection is set.
	pub active: bool,
	pub nodes: Vec<bool>,
	pub links: Vec<bool>,
	/// First matching node in node order, when searching.
	pub focus: Option<usize>,
}

impl Highlight {
	pub fn node(&self, i: usize) -> bool {
		!self.active || self.nodes.get(i).copied().unwrap_or(false)
	}

	pub fn link(&self, i: usize) -> bool {
		!self.active || self.links.get(i).copied().unwrap_or(false)
	}
}

fn label_matches(label: &str, needle: &str) -> bool {
	label.to_lowercase().contains(needle)
}

pub fn compute(graph: &GraphData, search: &str, selected: Option<&str>) -> Highlight {
	let needle = search.trim().to_lowercase();
	let searching = !needle.is_empty();
	// a selection whose node is gone counts as no selection
	let selected = selected.filter(|id| graph.contains(id));

	if !searching && selected.is_none() {
		return Highlight {
			active: false,
			nodes: vec![true; graph.nodes.len()],
			links: vec![true; graph.links.len()],
			focus: None,
		};
	}

	let nodes: Vec<bool> = if searching {
		graph
			.nodes
			.iter()
			.map(|n| label_matches(&n.label, &needle))
			.collect()
	} else {
		let sel = selected.unwrap_or_default();
		let neighbors: HashSet<&str> = graph.neighbors(sel).into_iter().collect();
		graph
			.nodes
			.iter()
			.map(|n| n.id == sel || neighbors.contains(n.id.as_str()))
			.collect()
	};

	let links: Vec<bool> = if let Some(sel) = selected {
		graph.links.iter().map(|l| l.touches(sel)).collect()
	} else {
		let labels: HashMap<&str, &str> = graph
			.nodes
			.iter()
			.map(|n| (n.id.as_str(), n.label.as_str()))
			.collect();
		let matches = |id: &str| {
			labels
				.get(id)
				.is_some_and(|label| label_matches(label, &needle))
		};
		graph
			.links
			.iter()
			.map(|l| matches(&l.source) && matches(&l.target))
			.collect()
	};

	let focus = if searching {
		nodes.iter().position(|&hit| hit)
	} else {
		None
	};

	Highlight {
		active: true,
		nodes,
		links,
		focus,
	}
}

/// Linear opacity tween that restarts from its current value on retarget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fade {
	from: f64,
	to: f64,
	elapsed_ms: f64,
	duration_ms: f64,
}

impl Fade {
	pub fn settled(value: f64) -> Self {
		Self {
			from: value,
			to: value,
			elapsed_ms: 0.0,
			duration_ms: 0.0,
		}
	}

	pub fn value(&self) -> f64 {
		if self.duration_ms <= 0.0 || self.elapsed_ms >= self.duration_ms {
			return self.to;
		}
		self.from + (self.to - self.from) * (self.elapsed_ms / self.duration_ms)
	}

	pub fn retarget(&mut self, to: f64, duration_ms: f64) {
		if to == self.to {
			return;
		}
		*self = Self {
			from: self.value(),
			to,
			elapsed_ms: 0.0,
			duration_ms,
		};
	}

	pub fn advance(&mut self, dt_ms: f64) {
		self.elapsed_ms += dt_ms.max(0.0);
	}
}

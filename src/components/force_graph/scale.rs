//! Ordinal color scale keyed on node group.

use super::types::GraphNode;

/// The category-10 palette.
pub const CATEGORY10: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Maps each distinct group to a palette entry in order of first appearance.
#[derive(Clone, Debug, Default)]
pub struct OrdinalScale {
	domain: Vec<String>,
}

impl OrdinalScale {
	pub fn from_nodes(nodes: &[GraphNode]) -> Self {
		let mut scale = Self::default();
		for node in nodes {
			scale.insert(&node.group);
		}
		scale
	}

	fn insert(&mut self, group: &str) -> usize {
		match self.domain.iter().position(|g| g == group) {
			Some(i) => i,
			None => {
				self.domain.push(group.to_string());
				self.domain.len() - 1
			}
		}
	}

	/// Color for `group`. Groups outside the domain fall back to the first entry.
	pub fn color(&self, group: &str) -> &'static str {
		let i = self.domain.iter().position(|g| g == group).unwrap_or(0);
		CATEGORY10[i % CATEGORY10.len()]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(group: &str) -> GraphNode {
		GraphNode {
			id: group.into(),
			label: group.into(),
			group: group.into(),
			description: None,
		}
	}

	#[test]
	fn colors_follow_first_appearance() {
		let scale = OrdinalScale::from_nodes(&[node("b"), node("a"), node("b"), node("c")]);
		assert_eq!(scale.color("b"), CATEGORY10[0]);
		assert_eq!(scale.color("a"), CATEGORY10[1]);
		assert_eq!(scale.color("c"), CATEGORY10[2]);
	}

	#[test]
	fn palette_wraps_after_ten_groups() {
		let nodes: Vec<_> = (0..12).map(|i| node(&format!("g{i}"))).collect();
		let scale = OrdinalScale::from_nodes(&nodes);
		assert_eq!(scale.color("g10"), scale.color("g0"));
		assert_eq!(scale.color("g11"), scale.color("g1"));
	}
}

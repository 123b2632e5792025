use serde::{Deserialize, Serialize};

/// Group assigned to nodes that arrive without one.
pub const DEFAULT_GROUP: &str = "default";

fn default_group() -> String {
	DEFAULT_GROUP.to_string()
}

/// An entity in the graph. Positions are simulation state and live elsewhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: String,
	pub label: String,
	#[serde(default = "default_group")]
	pub group: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

impl GraphNode {
	/// First two characters of the label, uppercased.
	pub fn initials(&self) -> String {
		self.label.chars().take(2).collect::<String>().to_uppercase()
	}
}

/// A directed relation between two node ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	#[serde(default)]
	pub relation: String,
}

impl GraphLink {
	pub fn touches(&self, id: &str) -> bool {
		self.source == id || self.target == id
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.node(id).is_some()
	}

	/// Ids one link away from `id`, in either direction, in link order.
	pub fn neighbors(&self, id: &str) -> Vec<&str> {
		let mut out: Vec<&str> = Vec::new();
		for link in &self.links {
			let other = if link.source == id {
				link.target.as_str()
			} else if link.target == id {
				link.source.as_str()
			} else {
				continue;
			};
			if other != id && !out.contains(&other) {
				out.push(other);
			}
		}
		out
	}
}

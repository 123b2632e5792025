//! Validation of user-supplied files before they may replace the graph.

use serde_json::Value;

use crate::components::force_graph::GraphData;

/// Files above this size are rejected before they are read.
pub const MAX_IMPORT_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
	#[error("file is {size} bytes; the limit is {limit} bytes")]
	TooLarge { size: u64, limit: u64 },
	#[error("not valid JSON: {0}")]
	Parse(#[from] serde_json::Error),
	#[error("graph file must be a JSON object")]
	NotAnObject,
	#[error("graph file needs a `{0}` array")]
	MissingArray(&'static str),
	#[error("node {index} needs a non-empty `id` and `label`")]
	InvalidNode { index: usize },
	#[error("node id `{0}` appears more than once")]
	DuplicateId(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportKind {
	/// Graph data to load directly.
	Graph,
	/// Raw text to hand to the generator.
	Text,
}

pub fn classify(file_name: &str) -> ImportKind {
	let is_json = file_name
		.rsplit_once('.')
		.is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("json"));
	if is_json {
		ImportKind::Graph
	} else {
		ImportKind::Text
	}
}

pub fn check_size(size: u64) -> Result<(), ImportError> {
	if size > MAX_IMPORT_BYTES {
		return Err(ImportError::TooLarge {
			size,
			limit: MAX_IMPORT_BYTES,
		});
	}
	Ok(())
}

fn non_empty_str(node: &Value, key: &str) -> bool {
	node.get(key)
		.and_then(Value::as_str)
		.is_some_and(|s| !s.trim().is_empty())
}

/// Checks the structure of an already parsed graph value and converts it.
pub fn validate_graph(value: Value) -> Result<GraphData, ImportError> {
	let root = value.as_object().ok_or(ImportError::NotAnObject)?;
	let nodes = root
		.get("nodes")
		.and_then(Value::as_array)
		.ok_or(ImportError::MissingArray("nodes"))?;
	if !root.get("links").is_some_and(Value::is_array) {
		return Err(ImportError::MissingArray("links"));
	}

	let mut seen = std::collections::HashSet::new();
	for (index, node) in nodes.iter().enumerate() {
		if !non_empty_str(node, "id") || !non_empty_str(node, "label") {
			return Err(ImportError::InvalidNode { index });
		}
		if let Some(id) = node.get("id").and_then(Value::as_str) {
			if !seen.insert(id) {
				return Err(ImportError::DuplicateId(id.to_string()));
			}
		}
	}

	Ok(serde_json::from_value(value)?)
}

pub fn parse_graph_json(text: &str) -> Result<GraphData, ImportError> {
	validate_graph(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn classifies_by_extension() {
		assert_eq!(classify("graph.json"), ImportKind::Graph);
		assert_eq!(classify("GRAPH.JSON"), ImportKind::Graph);
		assert_eq!(classify("notes.md"), ImportKind::Text);
		assert_eq!(classify("paper.txt"), ImportKind::Text);
		assert_eq!(classify("json"), ImportKind::Text);
	}

	#[test]
	fn rejects_oversized_files() {
		assert!(check_size(MAX_IMPORT_BYTES).is_ok());
		assert!(matches!(
			check_size(MAX_IMPORT_BYTES + 1),
			Err(ImportError::TooLarge { .. })
		));
	}

	#[test]
	fn accepts_a_valid_graph() {
		let text = json!({
			"nodes": [
				{ "id": "1", "label": "机器学习", "group": "领域", "description": "学习" },
				{ "id": "2", "label": "深度学习", "group": "领域" }
			],
			"links": [{ "source": "2", "target": "1", "relation": "属于" }]
		})
		.to_string();
		let graph = parse_graph_json(&text).unwrap();
		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.nodes[0].description.as_deref(), Some("学习"));
		assert_eq!(graph.links[0].relation, "属于");
	}

	#[test]
	fn missing_links_array_is_rejected() {
		let err = parse_graph_json(r#"{"nodes": []}"#).unwrap_err();
		assert!(matches!(err, ImportError::MissingArray("links")));
		let err = parse_graph_json(r#"{"nodes": {}, "links": []}"#).unwrap_err();
		assert!(matches!(err, ImportError::MissingArray("nodes")));
	}

	#[test]
	fn nodes_need_id_and_label() {
		let err = validate_graph(json!({
			"nodes": [{ "id": "a", "label": "A" }, { "id": "b", "label": "  " }],
			"links": []
		}))
		.unwrap_err();
		assert!(matches!(err, ImportError::InvalidNode { index: 1 }));

		let err = validate_graph(json!({ "nodes": [{ "label": "A" }], "links": [] })).unwrap_err();
		assert!(matches!(err, ImportError::InvalidNode { index: 0 }));
	}

	#[test]
	fn duplicate_ids_are_rejected() {
		let err = validate_graph(json!({
			"nodes": [{ "id": "a", "label": "A" }, { "id": "a", "label": "B" }],
			"links": []
		}))
		.unwrap_err();
		assert!(matches!(err, ImportError::DuplicateId(id) if id == "a"));
	}

	#[test]
	fn garbage_is_a_parse_error() {
		assert!(matches!(parse_graph_json("{nodes"), Err(ImportError::Parse(_))));
		assert!(matches!(parse_graph_json("[1, 2]"), Err(ImportError::NotAnObject)));
	}
}

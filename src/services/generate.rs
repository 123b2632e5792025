//! Client for the hosted model that turns prose into graph data.

use serde::Deserialize;
use serde_json::{Value, json};

use super::import::{ImportError, validate_graph};
use crate::components::force_graph::GraphData;
use crate::config::GenerationConfig;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
	#[error("no API key configured")]
	MissingApiKey,
	#[error("nothing to analyze; enter some text first")]
	EmptyInput,
	#[error("request failed: {0}")]
	Http(#[from] reqwest::Error),
	#[error("service answered {0}: {1}")]
	Status(u16, String),
	#[error("service returned no content")]
	EmptyResponse,
	#[error("service returned unreadable data: {0}")]
	MalformedPayload(#[from] serde_json::Error),
	#[error("service returned an invalid graph: {0}")]
	InvalidGraph(ImportError),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationRequest {
	pub text: String,
	/// Subject area hint, e.g. "medicine".
	pub domain: Option<String>,
	/// Comma-separated entity kinds to prefer.
	pub entity_types: Option<String>,
}

/// Where a generation currently stands, for the status line.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum GenerationStep {
	#[default]
	Idle,
	Requesting,
	Parsing,
	Done,
	Failed(String),
}

impl GenerationStep {
	pub fn is_loading(&self) -> bool {
		matches!(self, Self::Requesting | Self::Parsing)
	}

	pub fn message(&self) -> Option<String> {
		match self {
			Self::Idle => None,
			Self::Requesting => Some("Extracting entities and relations…".into()),
			Self::Parsing => Some("Building graph…".into()),
			Self::Done => Some("Graph ready.".into()),
			Self::Failed(msg) => Some(format!("Generation failed: {msg}")),
		}
	}
}

fn hint(value: &Option<String>) -> Option<&str> {
	value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub fn build_prompt(request: &GenerationRequest, language: &str) -> String {
	let mut prompt = format!(
		"Extract a knowledge graph from the text below.\n\
		 Return between 10 and 25 nodes. Each node has a unique `id`, a short `label`, a `group` naming its entity type, and an optional one-sentence `description`.\n\
		 Each link has `source` and `target` set to existing node ids and a short `relation`.\n\
		 Write every label, group, description and relation in {language}.\n"
	);
	if let Some(domain) = hint(&request.domain) {
		prompt.push_str(&format!("The text belongs to the domain: {domain}.\n"));
	}
	if let Some(types) = hint(&request.entity_types) {
		prompt.push_str(&format!("Prefer these entity types: {types}.\n"));
	}
	prompt.push_str("\nText:\n");
	prompt.push_str(request.text.trim());
	prompt
}

fn response_schema() -> Value {
	json!({
		"type": "OBJECT",
		"properties": {
			"nodes": {
				"type": "ARRAY",
				"items": {
					"type": "OBJECT",
					"properties": {
						"id": { "type": "STRING" },
						"label": { "type": "STRING" },
						"group": { "type": "STRING" },
						"description": { "type": "STRING" }
					},
					"required": ["id", "label", "group"]
				}
			},
			"links": {
				"type": "ARRAY",
				"items": {
					"type": "OBJECT",
					"properties": {
						"source": { "type": "STRING" },
						"target": { "type": "STRING" },
						"relation": { "type": "STRING" }
					},
					"required": ["source", "target", "relation"]
				}
			}
		},
		"required": ["nodes", "links"]
	})
}

#[derive(Deserialize)]
struct Envelope {
	#[serde(default)]
	candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
	content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
	#[serde(default)]
	parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
	text: Option<String>,
}

/// Pulls the graph out of a `generateContent` response body.
pub fn parse_generation_response(body: &str) -> Result<GraphData, GenerateError> {
	let envelope: Envelope = serde_json::from_str(body)?;
	let text = envelope
		.candidates
		.into_iter()
		.filter_map(|c| c.content)
		.flat_map(|c| c.parts)
		.find_map(|p| p.text.filter(|t| !t.trim().is_empty()))
		.ok_or(GenerateError::EmptyResponse)?;
	let value: Value = serde_json::from_str(strip_fence(&text))?;
	validate_graph(value).map_err(GenerateError::InvalidGraph)
}

/// Models sometimes wrap JSON in a markdown code fence.
fn strip_fence(text: &str) -> &str {
	let trimmed = text.trim();
	let Some(rest) = trimmed.strip_prefix("```") else {
		return trimmed;
	};
	let rest = rest.strip_prefix("json").unwrap_or(rest);
	rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Constructed once by the app root and handed out through context.
#[derive(Clone, Debug)]
pub struct GenerationClient {
	config: GenerationConfig,
}

impl GenerationClient {
	pub fn new(config: GenerationConfig) -> Self {
		Self { config }
	}

	pub fn has_api_key(&self) -> bool {
		self.config.api_key.is_some()
	}

	/// Copy of this client using `key` instead of the configured one.
	pub fn with_api_key(&self, key: Option<String>) -> Self {
		let mut config = self.config.clone();
		if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
			config.api_key = Some(key.trim().to_string());
		}
		Self { config }
	}

	fn url(&self, key: &str) -> String {
		format!(
			"{}/models/{}:generateContent?key={}",
			self.config.endpoint.trim_end_matches('/'),
			self.config.model,
			key
		)
	}

	/// Sends the request and returns the raw response body.
	pub async fn fetch(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
		if request.text.trim().is_empty() {
			return Err(GenerateError::EmptyInput);
		}
		let key = self
			.config
			.api_key
			.as_deref()
			.ok_or(GenerateError::MissingApiKey)?;
		let body = json!({
			"contents": [{ "parts": [{ "text": build_prompt(request, &self.config.language) }] }],
			"generationConfig": {
				"responseMimeType": "application/json",
				"responseSchema": response_schema()
			}
		});

		let response = reqwest::Client::new()
			.post(self.url(key))
			.json(&body)
			.send()
			.await?;
		let status = response.status();
		let text = response.text().await?;
		if !status.is_success() {
			return Err(GenerateError::Status(status.as_u16(), text));
		}
		Ok(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn envelope(text: &str) -> String {
		json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }).to_string()
	}

	#[test]
	fn prompt_carries_hints_only_when_given() {
		let request = GenerationRequest {
			text: "  机器学习是人工智能的分支。 ".into(),
			domain: Some("计算机科学".into()),
			entity_types: Some("  ".into()),
		};
		let prompt = build_prompt(&request, "Simplified Chinese");
		assert!(prompt.contains("between 10 and 25 nodes"));
		assert!(prompt.contains("in Simplified Chinese"));
		assert!(prompt.contains("domain: 计算机科学"));
		assert!(!prompt.contains("entity types"));
		assert!(prompt.ends_with("Text:\n机器学习是人工智能的分支。"));
	}

	#[test]
	fn parses_graph_from_candidate_text() {
		let graph = json!({
			"nodes": [{ "id": "n1", "label": "机器学习", "group": "概念" }],
			"links": []
		})
		.to_string();
		let parsed = parse_generation_response(&envelope(&graph)).unwrap();
		assert_eq!(parsed.nodes[0].label, "机器学习");

		let fenced = format!("```json\n{graph}\n```");
		assert_eq!(parse_generation_response(&envelope(&fenced)).unwrap(), parsed);
	}

	#[test]
	fn failure_modes_are_distinct() {
		assert!(matches!(
			parse_generation_response(r#"{"candidates": []}"#),
			Err(GenerateError::EmptyResponse)
		));
		assert!(matches!(
			parse_generation_response(&envelope("not json")),
			Err(GenerateError::MalformedPayload(_))
		));
		assert!(matches!(
			parse_generation_response(&envelope(r#"{"nodes": []}"#)),
			Err(GenerateError::InvalidGraph(ImportError::MissingArray("links")))
		));
		assert!(matches!(
			parse_generation_response("<html>"),
			Err(GenerateError::MalformedPayload(_))
		));
	}

	#[test]
	fn api_key_override_ignores_blank_input() {
		let client = GenerationClient::new(GenerationConfig::default());
		assert!(!client.has_api_key());
		assert!(!client.with_api_key(Some("   ".into())).has_api_key());
		let keyed = client.with_api_key(Some(" k ".into()));
		assert!(keyed.url("k").ends_with(":generateContent?key=k"));
		assert!(keyed.has_api_key());
	}

	#[test]
	fn steps_report_loading() {
		assert!(GenerationStep::Requesting.is_loading());
		assert!(GenerationStep::Parsing.is_loading());
		assert!(!GenerationStep::Failed("x".into()).is_loading());
		assert_eq!(GenerationStep::Idle.message(), None);
	}
}

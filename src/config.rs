//! Application configuration: layout forces, view behavior and the generation service.

use serde::Deserialize;

/// Forces applied by the layout simulation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
	/// Rest length of every link.
	pub link_distance: f64,
	/// Fraction of the link length error corrected per tick at alpha 1.
	pub link_strength: f64,
	/// Pairwise charge; negative values repel.
	pub charge_strength: f64,
	/// Nodes closer than twice this radius are pushed apart.
	pub collision_radius: f64,
	pub collision_strength: f64,
	/// Pull of the mean node position toward the viewport center.
	pub center_strength: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	/// Alpha target held while a node is dragged.
	pub alpha_drag_target: f64,
	pub velocity_damping: f64,
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			link_distance: 150.0,
			link_strength: 0.3,
			charge_strength: -400.0,
			collision_radius: 40.0,
			collision_strength: 0.7,
			center_strength: 1.0,
			alpha_min: 0.001,
			// cools from 1 to alpha_min in ~300 ticks
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			alpha_drag_target: 0.3,
			velocity_damping: 0.6,
		}
	}
}

/// Viewport, hit-testing and highlight timing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Multiplicative zoom per wheel notch.
	pub zoom_step: f64,
	pub node_radius: f64,
	pub hit_radius: f64,
	pub dim_opacity: f64,
	pub fade_ms: f64,
	pub focus_ms: f64,
	pub focus_scale: f64,
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.1,
			max_zoom: 4.0,
			zoom_step: 1.1,
			node_radius: 20.0,
			hit_radius: 22.0,
			dim_opacity: 0.1,
			fade_ms: 300.0,
			focus_ms: 750.0,
			focus_scale: 1.5,
		}
	}
}

/// Hosted text-to-graph model settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
	pub api_key: Option<String>,
	pub model: String,
	pub endpoint: String,
	/// Natural language every label, group, description and relation is written in.
	pub language: String,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self {
			api_key: None,
			model: "gemini-2.0-flash".into(),
			endpoint: "https://generativelanguage.googleapis.com/v1beta".into(),
			language: "Simplified Chinese".into(),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	pub force: ForceConfig,
	pub view: ViewConfig,
	pub generation: GenerationConfig,
}

impl AppConfig {
	/// Defaults, with generation credentials baked in at build time when present.
	pub fn from_build_env() -> Self {
		let mut config = Self::default();
		config.generation.api_key = option_env!("GEMINI_API_KEY")
			.filter(|key| !key.trim().is_empty())
			.map(str::to_string);
		if let Some(model) = option_env!("GEMINI_MODEL").filter(|m| !m.trim().is_empty()) {
			config.generation.model = model.to_string();
		}
		config
	}
}

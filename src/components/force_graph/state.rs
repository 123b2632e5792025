use log::debug;

use super::highlight::{self, Fade, Highlight};
use super::interaction::Gesture;
use super::layout::{LayoutSnapshot, Simulation};
use super::scale::OrdinalScale;
use super::types::GraphData;
use super::viewport::{ViewTransform, ViewTransition, ZoomExtent};
use crate::config::{AppConfig, ForceConfig, ViewConfig};

/// Simulation step per animation frame, in seconds.
pub const SIM_DT: f32 = 0.016;

pub const LINK_COLOR: &str = "#94a3b8";
pub const LINK_ACCENT: &str = "#f97316";

/// Everything one mounted canvas owns for the graph it currently shows.
/// Built fresh on every graph replacement.
pub struct ForceGraphState {
	pub data: GraphData,
	pub sim: Simulation,
	pub scale: OrdinalScale,
	pub transform: ViewTransform,
	pub transition: Option<ViewTransition>,
	pub gesture: Gesture,
	pub highlight: Highlight,
	pub selected: Option<String>,
	pub width: f64,
	pub height: f64,
	pub view: ViewConfig,
	pub extent: ZoomExtent,
	pub(super) force: ForceConfig,
	node_fades: Vec<Fade>,
	link_fades: Vec<Fade>,
}

impl ForceGraphState {
	pub fn new(data: GraphData, config: &AppConfig, width: f64, height: f64) -> Self {
		let sim = Simulation::new(&data, &config.force, width, height);
		let extent = ZoomExtent::new(config.view.min_zoom, config.view.max_zoom);
		debug!(
			"graph view reset: {} nodes, {} links",
			data.nodes.len(),
			data.links.len()
		);
		Self {
			scale: OrdinalScale::from_nodes(&data.nodes),
			highlight: highlight::compute(&data, "", None),
			node_fades: vec![Fade::settled(1.0); data.nodes.len()],
			link_fades: vec![Fade::settled(1.0); data.links.len()],
			data,
			sim,
			transform: ViewTransform::identity(extent),
			transition: None,
			gesture: Gesture::Idle,
			selected: None,
			width,
			height,
			extent,
			view: config.view.clone(),
			force: config.force.clone(),
		}
	}

	/// Recomputes highlighting and, for a search hit, flies the view to it.
	pub fn set_highlight(&mut self, search: &str, selected: Option<&str>) {
		self.highlight = highlight::compute(&self.data, search, selected);
		self.selected = selected
			.filter(|id| self.data.contains(id))
			.map(str::to_string);

		let (fade_ms, dim) = (self.view.fade_ms, self.view.dim_opacity);
		for (i, fade) in self.node_fades.iter_mut().enumerate() {
			fade.retarget(if self.highlight.node(i) { 1.0 } else { dim }, fade_ms);
		}
		for (i, fade) in self.link_fades.iter_mut().enumerate() {
			fade.retarget(if self.highlight.link(i) { 1.0 } else { dim }, fade_ms);
		}

		if let Some(i) = self.highlight.focus {
			let (x, y) = self.sim.positions()[i];
			let to = ViewTransform::centered_on(
				x,
				y,
				self.view.focus_scale,
				self.width,
				self.height,
				self.extent,
			);
			self.transition = Some(ViewTransition::new(self.transform, to, self.view.focus_ms));
		}
	}

	/// One animation frame.
	pub fn advance(&mut self, dt_ms: f64) {
		self.sim.tick(SIM_DT);
		for fade in self.node_fades.iter_mut().chain(self.link_fades.iter_mut()) {
			fade.advance(dt_ms);
		}
		if let Some(transition) = self.transition.as_mut() {
			self.transform = transition.step(dt_ms);
			if transition.is_finished() {
				self.transition = None;
			}
		}
	}

	pub fn node_opacity(&self, i: usize) -> f64 {
		self.node_fades.get(i).map_or(1.0, Fade::value)
	}

	pub fn link_opacity(&self, i: usize) -> f64 {
		self.link_fades.get(i).map_or(1.0, Fade::value)
	}

	pub fn link_color(&self, i: usize) -> &'static str {
		if self.highlight.active && self.highlight.link(i) {
			LINK_ACCENT
		} else {
			LINK_COLOR
		}
	}

	pub fn is_selected(&self, i: usize) -> bool {
		self.selected
			.as_deref()
			.is_some_and(|id| self.data.nodes.get(i).is_some_and(|n| n.id == id))
	}

	pub fn snapshot(&self) -> LayoutSnapshot {
		self.sim.snapshot()
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.sim.resize(width, height);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pages::home::sample_graph;

	fn state() -> ForceGraphState {
		ForceGraphState::new(sample_graph(), &AppConfig::default(), 800.0, 600.0)
	}

	#[test]
	fn fresh_state_is_fully_visible_and_unpinned() {
		let s = state();
		assert_eq!(s.transform, ViewTransform::identity(s.extent));
		assert!(s.selected.is_none());
		assert!(s.snapshot().positions.values().all(|p| !p.pinned));
		assert!((0..s.data.nodes.len()).all(|i| s.node_opacity(i) == 1.0));
		assert!((0..s.data.links.len()).all(|i| s.link_color(i) == LINK_COLOR));
	}

	#[test]
	fn initial_view_honors_configured_zoom_range() {
		let config = AppConfig {
			view: ViewConfig {
				min_zoom: 1.5,
				..ViewConfig::default()
			},
			..AppConfig::default()
		};
		let s = ForceGraphState::new(sample_graph(), &config, 800.0, 600.0);
		assert_eq!(s.transform.k, 1.5);
	}

	#[test]
	fn search_dims_others_and_targets_first_match() {
		let mut s = state();
		s.set_highlight("机器学习", None);
		let hit = s
			.data
			.nodes
			.iter()
			.position(|n| n.label == "机器学习")
			.unwrap();
		assert_eq!(s.highlight.focus, Some(hit));
		let (x, y) = s.sim.positions()[hit];
		let expected = ViewTransform::centered_on(x, y, 1.5, 800.0, 600.0, s.extent);
		assert_eq!(s.transition.as_ref().map(|t| t.target()), Some(expected));

		s.advance(300.0);
		for (i, node) in s.data.nodes.iter().enumerate() {
			let want = if node.label.to_lowercase().contains("机器学习") {
				1.0
			} else {
				0.1
			};
			assert!((s.node_opacity(i) - want).abs() < 1e-9, "{}", node.label);
		}

		s.advance(450.0);
		assert!(s.transition.is_none());
		assert_eq!(s.transform, expected);
	}

	#[test]
	fn clearing_restores_full_opacity() {
		let mut s = state();
		let id = s.data.nodes[0].id.clone();
		s.set_highlight("", Some(&id));
		s.advance(300.0);
		assert!((0..s.data.nodes.len()).any(|i| s.node_opacity(i) < 1.0));
		assert!(s.is_selected(0));

		s.set_highlight("", None);
		s.advance(300.0);
		assert!((0..s.data.nodes.len()).all(|i| s.node_opacity(i) == 1.0));
		assert!((0..s.data.links.len()).all(|i| s.link_opacity(i) == 1.0));
		assert!((0..s.data.links.len()).all(|i| s.link_color(i) == LINK_COLOR));
		assert!(!s.is_selected(0));
	}

	#[test]
	fn selection_accents_touching_links() {
		let mut s = state();
		let id = s.data.nodes[0].id.clone();
		s.set_highlight("", Some(&id));
		for (i, link) in s.data.links.iter().enumerate() {
			let want = if link.touches(&id) { LINK_ACCENT } else { LINK_COLOR };
			assert_eq!(s.link_color(i), want);
		}
	}
}

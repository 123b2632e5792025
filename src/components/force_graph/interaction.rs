use super::state::ForceGraphState;
use super::viewport::ViewTransform;

/// Pointer travel, in screen pixels, below which a press counts as a click.
pub const CLICK_SLOP: f64 = 3.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	Dragging {
		id: String,
		start: (f64, f64),
		/// Graph-space offset from the node center to where it was grabbed.
		grab: (f64, f64),
		moved: bool,
	},
	Panning {
		start: (f64, f64),
		origin: ViewTransform,
		moved: bool,
	},
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointerOutcome {
	None,
	NodeClicked(String),
	BackgroundClicked,
}

fn beyond_slop(start: (f64, f64), x: f64, y: f64) -> bool {
	(x - start.0).hypot(y - start.1) > CLICK_SLOP
}

/// Clicking the selected node deselects it; clicking another selects that one.
pub fn toggle_selection(current: Option<&str>, clicked: &str) -> Option<String> {
	if current == Some(clicked) {
		None
	} else {
		Some(clicked.to_string())
	}
}

impl ForceGraphState {
	/// Press at screen `(x, y)`. A node under the pointer is grabbed and
	/// pinned; anything else starts a pan.
	pub fn pointer_down(&mut self, x: f64, y: f64) {
		self.transition = None;
		let (gx, gy) = self.transform.screen_to_graph(x, y);
		let hit = self.sim.node_at(gx, gy, self.view.hit_radius);

		self.gesture = match hit {
			Some(i) => {
				let id = self.data.nodes[i].id.clone();
				let (nx, ny) = self.sim.positions()[i];
				self.sim.pin(&id, nx, ny);
				self.sim.reheat(self.force.alpha_drag_target);
				Gesture::Dragging {
					id,
					start: (x, y),
					grab: (gx - nx, gy - ny),
					moved: false,
				}
			}
			None => Gesture::Panning {
				start: (x, y),
				origin: self.transform,
				moved: false,
			},
		};
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		let (gx, gy) = self.transform.screen_to_graph(x, y);
		match &mut self.gesture {
			Gesture::Idle => {}
			Gesture::Dragging {
				id,
				start,
				grab,
				moved,
			} => {
				*moved |= beyond_slop(*start, x, y);
				if *moved {
					self.sim.pin(id, gx - grab.0, gy - grab.1);
				}
			}
			Gesture::Panning {
				start,
				origin,
				moved,
			} => {
				*moved |= beyond_slop(*start, x, y);
				if *moved {
					let mut t = *origin;
					t.pan_by(x - start.0, y - start.1);
					self.transform = t;
				}
			}
		}
	}

	/// Release. Returns what the press amounted to if it never left the slop.
	pub fn pointer_up(&mut self) -> PointerOutcome {
		match std::mem::take(&mut self.gesture) {
			Gesture::Idle => PointerOutcome::None,
			Gesture::Dragging { id, moved, .. } => {
				self.sim.unpin(&id);
				self.sim.cool();
				if moved {
					PointerOutcome::None
				} else {
					PointerOutcome::NodeClicked(id)
				}
			}
			Gesture::Panning { moved, .. } => {
				if moved {
					PointerOutcome::None
				} else {
					PointerOutcome::BackgroundClicked
				}
			}
		}
	}

	/// Pointer left the canvas: finish any gesture without a click.
	pub fn pointer_leave(&mut self) {
		if let Gesture::Dragging { id, .. } = std::mem::take(&mut self.gesture) {
			self.sim.unpin(&id);
			self.sim.cool();
		}
	}

	/// Wheel notch at screen `(x, y)`; positive `delta_y` zooms out.
	/// Purely horizontal scrolls carry no vertical delta and leave the view alone.
	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
		if delta_y == 0.0 || delta_y.is_nan() {
			return;
		}
		self.transition = None;
		let factor = if delta_y > 0.0 {
			1.0 / self.view.zoom_step
		} else {
			self.view.zoom_step
		};
		self.transform.zoom_at(x, y, factor, self.extent);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphData, GraphLink, GraphNode};
	use crate::config::AppConfig;

	fn state() -> ForceGraphState {
		let node = |id: &str| GraphNode {
			id: id.into(),
			label: id.into(),
			group: "g".into(),
			description: None,
		};
		let data = GraphData {
			nodes: vec![node("a"), node("b")],
			links: vec![GraphLink {
				source: "a".into(),
				target: "b".into(),
				relation: "r".into(),
			}],
		};
		let mut s = ForceGraphState::new(data, &AppConfig::default(), 800.0, 600.0);
		s.sim.pin("a", 100.0, 100.0);
		s.sim.pin("b", 400.0, 400.0);
		s.sim.unpin("a");
		s.sim.unpin("b");
		s
	}

	#[test]
	fn drag_pins_while_moving_and_releases_on_end() {
		let mut s = state();
		s.pointer_down(105.0, 100.0);
		assert!(s.sim.is_pinned("a"));
		assert!(s.sim.is_running());

		s.pointer_move(205.0, 150.0);
		s.advance(16.0);
		let a = s.snapshot().get("a").unwrap();
		assert_eq!((a.x, a.y, a.pinned), (200.0, 150.0, true));

		assert_eq!(s.pointer_up(), PointerOutcome::None);
		assert!(!s.sim.is_pinned("a"));
		assert_eq!(s.gesture, Gesture::Idle);
	}

	#[test]
	fn still_press_on_node_is_a_click_not_a_pan() {
		let mut s = state();
		let before = s.transform;
		s.pointer_down(400.0, 400.0);
		s.pointer_move(401.0, 401.0);
		assert_eq!(s.pointer_up(), PointerOutcome::NodeClicked("b".into()));
		assert_eq!(s.transform, before);
		assert!(!s.sim.is_pinned("b"));
	}

	#[test]
	fn background_press_pans_or_clicks() {
		let mut s = state();
		s.pointer_down(700.0, 50.0);
		s.pointer_move(720.0, 80.0);
		assert_eq!((s.transform.x, s.transform.y), (20.0, 30.0));
		assert_eq!(s.pointer_up(), PointerOutcome::None);

		s.pointer_down(700.0, 50.0);
		assert_eq!(s.pointer_up(), PointerOutcome::BackgroundClicked);
	}

	#[test]
	fn leaving_mid_drag_unpins() {
		let mut s = state();
		s.pointer_down(100.0, 100.0);
		s.pointer_move(150.0, 150.0);
		s.pointer_leave();
		assert!(!s.sim.is_pinned("a"));
		assert_eq!(s.pointer_up(), PointerOutcome::None);
	}

	#[test]
	fn wheel_zoom_stays_in_range_and_cancels_focus() {
		let mut s = state();
		s.set_highlight("a", None);
		assert!(s.transition.is_some());
		for _ in 0..200 {
			s.wheel(300.0, 300.0, -120.0);
		}
		assert!(s.transition.is_none());
		assert_eq!(s.transform.k, 4.0);
		for _ in 0..200 {
			s.wheel(300.0, 300.0, 120.0);
		}
		assert!((s.transform.k - 0.1).abs() < 1e-12);
	}

	#[test]
	fn horizontal_scroll_does_not_zoom() {
		let mut s = state();
		s.set_highlight("a", None);
		let before = s.transform;
		s.wheel(400.0, 300.0, 0.0);
		assert_eq!(s.transform, before);
		assert!(s.transition.is_some());
	}

	#[test]
	fn toggling_selection() {
		assert_eq!(toggle_selection(None, "a"), Some("a".into()));
		assert_eq!(toggle_selection(Some("a"), "a"), None);
		assert_eq!(toggle_selection(Some("a"), "b"), Some("b".into()));
	}
}

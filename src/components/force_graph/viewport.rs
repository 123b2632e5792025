//! Pan/zoom transform and its programmatic animation.

/// Scale bounds for the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomExtent {
	pub min: f64,
	pub max: f64,
}

impl ZoomExtent {
	pub fn new(min: f64, max: f64) -> Self {
		Self {
			min: min.min(max),
			max: max.max(min),
		}
	}

	pub fn clamp(&self, k: f64) -> f64 {
		if k.is_nan() {
			return 1.0_f64.clamp(self.min, self.max);
		}
		k.clamp(self.min, self.max)
	}
}

/// Screen = graph * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl ViewTransform {
	pub fn new(x: f64, y: f64, k: f64, extent: ZoomExtent) -> Self {
		Self {
			x,
			y,
			k: extent.clamp(k),
		}
	}

	/// Untranslated view at unit scale, or the nearest scale `extent` allows.
	pub fn identity(extent: ZoomExtent) -> Self {
		Self::new(0.0, 0.0, 1.0, extent)
	}

	/// Transform that puts graph point `(gx, gy)` in the middle of a `width`×`height` viewport.
	pub fn centered_on(gx: f64, gy: f64, k: f64, width: f64, height: f64, extent: ZoomExtent) -> Self {
		let k = extent.clamp(k);
		Self {
			x: width / 2.0 - gx * k,
			y: height / 2.0 - gy * k,
			k,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	/// Scale by `factor` keeping screen point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, extent: ZoomExtent) {
		let new_k = extent.clamp(self.k * factor);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.x += dx;
		self.y += dy;
	}

	fn lerp(&self, to: &Self, t: f64) -> Self {
		Self {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

pub fn ease_cubic_in_out(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

/// A timed move from one transform to another.
#[derive(Clone, Debug)]
pub struct ViewTransition {
	from: ViewTransform,
	to: ViewTransform,
	elapsed_ms: f64,
	duration_ms: f64,
}

impl ViewTransition {
	pub fn new(from: ViewTransform, to: ViewTransform, duration_ms: f64) -> Self {
		Self {
			from,
			to,
			elapsed_ms: 0.0,
			duration_ms: duration_ms.max(0.0),
		}
	}

	/// Advances the clock and returns the transform to show now.
	pub fn step(&mut self, dt_ms: f64) -> ViewTransform {
		self.elapsed_ms += dt_ms.max(0.0);
		if self.is_finished() {
			return self.to;
		}
		self.from
			.lerp(&self.to, ease_cubic_in_out(self.elapsed_ms / self.duration_ms))
	}

	pub fn is_finished(&self) -> bool {
		self.elapsed_ms >= self.duration_ms
	}

	pub fn target(&self) -> ViewTransform {
		self.to
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn extent() -> ZoomExtent {
		ZoomExtent::new(0.1, 4.0)
	}

	#[test]
	fn zoom_is_clamped_under_aggressive_gestures() {
		let mut t = ViewTransform::identity(extent());
		for _ in 0..500 {
			t.zoom_at(100.0, 100.0, 1.5, extent());
		}
		assert_eq!(t.k, 4.0);
		for _ in 0..500 {
			t.zoom_at(100.0, 100.0, 0.2, extent());
		}
		assert_eq!(t.k, 0.1);
		t.zoom_at(0.0, 0.0, f64::NAN, extent());
		assert!(t.k >= 0.1 && t.k <= 4.0);
	}

	#[test]
	fn identity_respects_a_zoom_floor_above_one() {
		let t = ViewTransform::identity(ZoomExtent::new(2.0, 4.0));
		assert_eq!((t.x, t.y, t.k), (0.0, 0.0, 2.0));
		assert_eq!(ViewTransform::identity(extent()).k, 1.0);
	}

	#[test]
	fn zoom_keeps_anchor_point_fixed() {
		let mut t = ViewTransform::new(30.0, -20.0, 1.0, extent());
		let before = t.screen_to_graph(200.0, 150.0);
		t.zoom_at(200.0, 150.0, 2.0, extent());
		let after = t.screen_to_graph(200.0, 150.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn centered_on_maps_point_to_viewport_middle() {
		let t = ViewTransform::centered_on(50.0, -80.0, 1.5, 800.0, 600.0, extent());
		let (sx, sy) = t.graph_to_screen(50.0, -80.0);
		assert!((sx - 400.0).abs() < 1e-9);
		assert!((sy - 300.0).abs() < 1e-9);
		assert_eq!(ViewTransform::centered_on(0.0, 0.0, 99.0, 1.0, 1.0, extent()).k, 4.0);
	}

	#[test]
	fn transition_lands_exactly_on_target() {
		let from = ViewTransform::identity(extent());
		let to = ViewTransform::new(100.0, 50.0, 2.0, extent());
		let mut tr = ViewTransition::new(from, to, 750.0);
		let mid = tr.step(375.0);
		assert!(mid.k > 1.0 && mid.k < 2.0);
		assert!(!tr.is_finished());
		assert_eq!(tr.step(1000.0), to);
		assert!(tr.is_finished());
	}

	#[test]
	fn easing_is_symmetric() {
		assert_eq!(ease_cubic_in_out(0.0), 0.0);
		assert_eq!(ease_cubic_in_out(1.0), 1.0);
		assert!((ease_cubic_in_out(0.5) - 0.5).abs() < 1e-12);
		assert!((ease_cubic_in_out(0.25) + ease_cubic_in_out(0.75) - 1.0).abs() < 1e-12);
	}
}

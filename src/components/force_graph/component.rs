use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::interaction::{PointerOutcome, toggle_selection};
use super::render;
use super::state::ForceGraphState;
use super::types::GraphData;
use crate::config::AppConfig;
use crate::services::browser::{self, EventListener};

/// Shared access to whatever graph the canvas is showing, for export.
#[derive(Clone, Default)]
pub struct GraphHandle(Rc<RefCell<Option<ForceGraphState>>>);

impl GraphHandle {
	pub fn with_state<R>(&self, f: impl FnOnce(&ForceGraphState) -> R) -> Option<R> {
		self.0.borrow().as_ref().map(f)
	}
}

fn canvas_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn local_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] search: Signal<String>,
	selected: RwSignal<Option<String>>,
	is_fullscreen: RwSignal<bool>,
	#[prop(optional)] handle: GraphHandle,
) -> impl IntoView {
	let config = use_context::<AppConfig>().unwrap_or_default();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state = handle.0.clone();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let listeners: Rc<RefCell<Vec<EventListener>>> = Rc::new(RefCell::new(Vec::new()));
	let alive = Arc::new(AtomicBool::new(true));

	let alive_cleanup = alive.clone();
	on_cleanup(move || alive_cleanup.store(false, Ordering::Relaxed));

	// one loop per mounted canvas; it always drives the current state
	let (state_init, animate_init, listeners_init) =
		(state.clone(), animate.clone(), listeners.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if animate_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			warn!("no window; graph canvas stays blank");
			return;
		};
		let (w, h) = canvas_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				warn!("canvas 2d context unavailable");
				return;
			}
		};

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		match EventListener::new(&window, "resize", move |_| {
			let (nw, nh) = canvas_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}) {
			Ok(l) => listeners_init.borrow_mut().push(l),
			Err(e) => warn!("resize listener: {e}"),
		}
		match browser::watch_fullscreen(move |on| is_fullscreen.set(on)) {
			Ok(l) => listeners_init.borrow_mut().push(l),
			Err(e) => warn!("fullscreen listener: {e}"),
		}

		let (state_anim, animate_inner, listeners_anim, alive_anim) = (
			state_init.clone(),
			animate_init.clone(),
			listeners_init.clone(),
			alive.clone(),
		);
		let last = Cell::new(None::<f64>);
		*animate_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			if !alive_anim.load(Ordering::Relaxed) {
				listeners_anim.borrow_mut().clear();
				state_anim.borrow_mut().take();
				let _ = animate_inner.borrow_mut().take();
				info!("graph canvas torn down");
				return;
			}
			let dt = last
				.replace(Some(now))
				.map_or(16.0, |prev| (now - prev).clamp(0.0, 100.0));
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.advance(dt);
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// replacing the graph swaps the state wholesale; the old simulation is gone
	// before the next frame runs
	let (state_data, config_data) = (state.clone(), config.clone());
	Effect::new(move |_| {
		let graph = data.get();
		let (w, h) = canvas_ref
			.get_untracked()
			.map(|c| canvas_size(&c))
			.unwrap_or((800.0, 600.0));
		info!(
			"graph replaced: {} nodes, {} links",
			graph.nodes.len(),
			graph.links.len()
		);
		let mut next = ForceGraphState::new(graph, &config_data, w, h);
		next.set_highlight(
			&search.get_untracked(),
			selected.get_untracked().as_deref(),
		);
		*state_data.borrow_mut() = Some(next);
	});

	let state_hl = state.clone();
	Effect::new(move |_| {
		let (query, sel) = (search.get(), selected.get());
		if let Some(ref mut s) = *state_hl.borrow_mut() {
			s.set_highlight(&query, sel.as_deref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
			if matches!(s.gesture, super::interaction::Gesture::Dragging { .. }) {
				ev.stop_propagation();
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let outcome = state_mu.borrow_mut().as_mut().map(|s| s.pointer_up());
		match outcome {
			Some(PointerOutcome::NodeClicked(id)) => {
				ev.stop_propagation();
				selected.update(|cur| *cur = toggle_selection(cur.as_deref(), &id));
			}
			Some(PointerOutcome::BackgroundClicked) => selected.set(None),
			_ => {}
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
		}
	};

	let state_wh = state;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::ForceGraphState;

const BACKGROUND: &str = "#f8fafc";
const ARROW_SIZE: f64 = 8.0;

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	let positions = state.sim.positions();
	draw_links(state, ctx, &positions);
	draw_nodes(state, ctx, &positions);
	ctx.restore();
}

fn draw_links(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, positions: &[(f64, f64)]) {
	let radius = state.view.node_radius;

	for link in state.sim.links() {
		let ((x1, y1), (x2, y2)) = (positions[link.source], positions[link.target]);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist <= 2.0 * radius {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let (alpha, color) = (state.link_opacity(link.link), state.link_color(link.link));

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(1.5);
		ctx.begin_path();
		ctx.move_to(x1 + ux * radius, y1 + uy * radius);
		ctx.line_to(
			x2 - ux * (radius + ARROW_SIZE),
			y2 - uy * (radius + ARROW_SIZE),
		);
		ctx.stroke();

		ctx.set_fill_style_str(color);
		let (tip_x, tip_y) = (x2 - ux * radius, y2 - uy * radius);
		let (back_x, back_y) = (tip_x - ux * ARROW_SIZE, tip_y - uy * ARROW_SIZE);
		let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();

		let relation = &state.data.links[link.link].relation;
		if !relation.is_empty() {
			ctx.set_fill_style_str("#475569");
			ctx.set_font("10px sans-serif");
			ctx.set_text_align("center");
			ctx.set_text_baseline("middle");
			let _ = ctx.fill_text(relation, (x1 + x2) / 2.0, (y1 + y2) / 2.0);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, positions: &[(f64, f64)]) {
	let radius = state.view.node_radius;

	for (i, node) in state.data.nodes.iter().enumerate() {
		let Some(&(x, y)) = positions.get(i) else {
			continue;
		};
		ctx.set_global_alpha(state.node_opacity(i));

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(state.scale.color(&node.group));
		ctx.fill();
		ctx.set_stroke_style_str("#ffffff");
		ctx.set_line_width(2.0);
		ctx.stroke();

		if state.is_selected(i) {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 4.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("#0f172a");
			ctx.set_line_width(2.0);
			ctx.stroke();
		}

		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		ctx.set_fill_style_str("#ffffff");
		ctx.set_font("bold 12px sans-serif");
		let _ = ctx.fill_text(&node.initials(), x, y);

		ctx.set_text_baseline("top");
		ctx.set_fill_style_str("#1e293b");
		ctx.set_font("12px sans-serif");
		let _ = ctx.fill_text(&node.label, x, y + radius + 4.0);
	}
	ctx.set_global_alpha(1.0);
}

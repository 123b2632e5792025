//! Serializers for the download buttons.

use crate::components::force_graph::GraphData;
use crate::components::force_graph::state::{ForceGraphState, LINK_COLOR};

pub const JSON_FILE_NAME: &str = "knowledge-graph.json";
pub const SVG_FILE_NAME: &str = "knowledge-graph.svg";

pub fn to_json(graph: &GraphData) -> Result<String, serde_json::Error> {
	serde_json::to_string_pretty(graph)
}

fn escape_xml(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	for ch in input.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&apos;"),
			_ => out.push(ch),
		}
	}
	out
}

/// The graph as currently laid out and highlighted, as a standalone SVG document.
pub fn to_svg(state: &ForceGraphState) -> String {
	let (width, height, r) = (state.width, state.height, state.view.node_radius);
	let t = state.transform;
	let layout = state.snapshot();
	let mut svg = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

	svg.push_str(&format!(
		"<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
	));
	svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"#f8fafc\"/>");
	svg.push_str(&format!(
		"<defs><marker id=\"arrowhead\" viewBox=\"0 -5 10 10\" refX=\"10\" refY=\"0\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto\"><path d=\"M0,-5L10,0L0,5\" fill=\"{LINK_COLOR}\"/></marker></defs>",
	));
	svg.push_str(&format!(
		"<g transform=\"translate({:.2},{:.2}) scale({:.4})\">",
		t.x, t.y, t.k
	));

	for (i, link) in state.data.links.iter().enumerate() {
		let (Some(s), Some(e)) = (layout.get(&link.source), layout.get(&link.target)) else {
			continue;
		};
		let (dx, dy) = (e.x - s.x, e.y - s.y);
		let dist = dx.hypot(dy);
		// overlapping circles leave no visible segment between their rims
		if dist <= 2.0 * r {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let opacity = state.link_opacity(i);
		svg.push_str(&format!(
			"<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-opacity=\"{opacity:.2}\" stroke-width=\"1.5\" marker-end=\"url(#arrowhead)\"/>",
			s.x + ux * r,
			s.y + uy * r,
			e.x - ux * r,
			e.y - uy * r,
			state.link_color(i)
		));
		if !link.relation.is_empty() {
			svg.push_str(&format!(
				"<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"10\" fill=\"#475569\" opacity=\"{opacity:.2}\">{}</text>",
				(s.x + e.x) / 2.0,
				(s.y + e.y) / 2.0,
				escape_xml(&link.relation)
			));
		}
	}

	for (i, node) in state.data.nodes.iter().enumerate() {
		let Some(p) = layout.get(&node.id) else {
			continue;
		};
		svg.push_str(&format!(
			"<g transform=\"translate({:.2},{:.2})\" opacity=\"{:.2}\"><circle r=\"{r}\" fill=\"{}\" stroke=\"#ffffff\" stroke-width=\"2\"/><text text-anchor=\"middle\" dy=\"0.35em\" font-family=\"sans-serif\" font-size=\"12\" font-weight=\"bold\" fill=\"#ffffff\">{}</text><text y=\"{:.1}\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"12\" fill=\"#1e293b\">{}</text></g>",
			p.x,
			p.y,
			state.node_opacity(i),
			state.scale.color(&node.group),
			escape_xml(&node.initials()),
			r + 16.0,
			escape_xml(&node.label)
		));
	}

	svg.push_str("</g></svg>");
	svg
}

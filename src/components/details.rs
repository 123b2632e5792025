use leptos::prelude::*;

use super::force_graph::GraphData;

struct Relation {
	outgoing: bool,
	relation: String,
	other: String,
}

fn relations(graph: &GraphData, id: &str) -> Vec<Relation> {
	let label = |other: &str| {
		graph
			.node(other)
			.map_or_else(|| other.to_string(), |n| n.label.clone())
	};
	graph
		.links
		.iter()
		.filter(|l| l.touches(id))
		.map(|l| {
			let outgoing = l.source == id;
			Relation {
				outgoing,
				relation: l.relation.clone(),
				other: label(if outgoing { &l.target } else { &l.source }),
			}
		})
		.collect()
}

/// Label, group, description and one-hop relations of the selected node.
#[component]
pub fn DetailsPanel(
	#[prop(into)] graph: Signal<GraphData>,
	selected: RwSignal<Option<String>>,
) -> impl IntoView {
	let details = move || {
		let id = selected.get()?;
		graph.with(|g| {
			let node = g.node(&id)?;
			Some((
				node.label.clone(),
				node.group.clone(),
				node.description.clone(),
				relations(g, &id),
			))
		})
	};

	move || {
		details().map(|(label, group, description, rels)| {
			view! {
				<aside class="details-panel">
					<button class="details-close" on:click=move |_| selected.set(None)>"×"</button>
					<h2>{label}</h2>
					<p class="details-group">{group}</p>
					{description.map(|d| view! { <p class="details-description">{d}</p> })}
					<ul class="details-relations">
						{rels
							.into_iter()
							.map(|r| {
								let arrow = if r.outgoing { "→" } else { "←" };
								view! {
									<li>
										<span class="relation">{format!("{arrow} {}", r.relation)}</span>
										" "
										<span class="other">{r.other}</span>
									</li>
								}
							})
							.collect_view()}
					</ul>
				</aside>
			}
		})
	}
}

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info, warn};
use web_sys::HtmlInputElement;

use crate::components::details::DetailsPanel;
use crate::components::force_graph::{ForceGraphCanvas, GraphData, GraphHandle, GraphLink, GraphNode};
use crate::config::GenerationConfig;
use crate::services::browser;
use crate::services::export::{self, JSON_FILE_NAME, SVG_FILE_NAME};
use crate::services::generate::{
	GenerationClient, GenerationRequest, GenerationStep, parse_generation_response,
};
use crate::services::import::{self, ImportKind};

/// Graph shown before anything has been generated or imported.
pub fn sample_graph() -> GraphData {
	let nodes = [
		("ai", "人工智能", "领域", Some("让机器表现出智能行为的学科。")),
		("ml", "机器学习", "领域", Some("从数据中学习规律的人工智能分支。")),
		("dl", "深度学习", "方法", Some("基于多层神经网络的机器学习方法。")),
		("nn", "神经网络", "模型", None),
		("nlp", "自然语言处理", "领域", None),
		("cv", "计算机视觉", "领域", None),
		("rl", "强化学习", "方法", None),
		("sl", "监督学习", "方法", None),
		("llm", "大语言模型", "模型", Some("在海量文本上训练的语言模型。")),
		("tf", "Transformer", "模型", None),
		("data", "数据集", "资源", None),
		("turing", "图灵测试", "概念", None),
	]
	.into_iter()
	.map(|(id, label, group, description)| GraphNode {
		id: id.into(),
		label: label.into(),
		group: group.into(),
		description: description.map(str::to_string),
	})
	.collect();

	let links = [
		("ml", "ai", "属于"),
		("dl", "ml", "属于"),
		("sl", "ml", "属于"),
		("rl", "ml", "属于"),
		("dl", "nn", "基于"),
		("nlp", "ai", "属于"),
		("cv", "ai", "属于"),
		("llm", "nlp", "应用于"),
		("llm", "tf", "采用"),
		("tf", "nn", "属于"),
		("ml", "data", "依赖"),
		("turing", "ai", "评估"),
		("cv", "dl", "使用"),
	]
	.into_iter()
	.map(|(source, target, relation)| GraphLink {
		source: source.into(),
		target: target.into(),
		relation: relation.into(),
	})
	.collect();

	GraphData { nodes, links }
}

fn non_blank(s: String) -> Option<String> {
	Some(s).filter(|s| !s.trim().is_empty())
}

/// Input, toolbar and the graph itself.
#[component]
pub fn Home() -> impl IntoView {
	let client = use_context::<GenerationClient>()
		.unwrap_or_else(|| GenerationClient::new(GenerationConfig::default()));

	let graph = RwSignal::new(sample_graph());
	let search = RwSignal::new(String::new());
	let selected = RwSignal::new(None::<String>);
	let text = RwSignal::new(String::new());
	let domain = RwSignal::new(String::new());
	let entity_types = RwSignal::new(String::new());
	let api_key = RwSignal::new(String::new());
	let show_advanced = RwSignal::new(false);
	let step = RwSignal::new(GenerationStep::Idle);
	let notice = RwSignal::new(None::<String>);
	let is_fullscreen = RwSignal::new(false);
	let handle = GraphHandle::default();
	let container = NodeRef::<leptos::html::Div>::new();

	// all-or-nothing: callers only get here with a fully validated graph
	let replace_graph = move |next: GraphData| {
		search.set(String::new());
		selected.set(None);
		graph.set(next);
	};

	let needs_key = !client.has_api_key();
	let on_generate = move |_| {
		if step.get_untracked().is_loading() {
			return;
		}
		let request = GenerationRequest {
			text: text.get_untracked(),
			domain: non_blank(domain.get_untracked()),
			entity_types: non_blank(entity_types.get_untracked()),
		};
		let client = client.with_api_key(non_blank(api_key.get_untracked()));
		notice.set(None);
		step.set(GenerationStep::Requesting);
		info!("generation requested: {} chars", request.text.chars().count());

		spawn_local(async move {
			let result = match client.fetch(&request).await {
				Ok(body) => {
					step.set(GenerationStep::Parsing);
					parse_generation_response(&body)
				}
				Err(e) => Err(e),
			};
			match result {
				Ok(next) => {
					info!(
						"generation finished: {} nodes, {} links",
						next.nodes.len(),
						next.links.len()
					);
					replace_graph(next);
					step.set(GenerationStep::Done);
				}
				Err(e) => {
					error!("generation failed: {e}");
					step.set(GenerationStep::Failed(e.to_string()));
				}
			}
		});
	};

	let on_file = move |ev: leptos::ev::Event| {
		let input: HtmlInputElement = event_target(&ev);
		let Some(file) = input.files().and_then(|files| files.get(0)) else {
			return;
		};
		// cleared up front so picking the same file again fires `change`
		input.set_value("");

		let name = file.name();
		if let Err(e) = import::check_size(file.size() as u64) {
			warn!("import of {name} rejected: {e}");
			notice.set(Some(format!("Import rejected: {e}")));
			return;
		}
		let kind = import::classify(&name);
		spawn_local(async move {
			let contents = match browser::read_file_text(&file).await {
				Ok(contents) => contents,
				Err(e) => {
					warn!("reading {name} failed: {e}");
					notice.set(Some(format!("Could not read {name}: {e}")));
					return;
				}
			};
			match kind {
				ImportKind::Text => {
					info!("loaded {name} as input text");
					text.set(contents);
					notice.set(Some(format!("Loaded {name} as input text.")));
				}
				ImportKind::Graph => match import::parse_graph_json(&contents) {
					Ok(next) => {
						info!("imported {name}: {} nodes", next.nodes.len());
						replace_graph(next);
						notice.set(None);
					}
					Err(e) => {
						warn!("import of {name} rejected: {e}");
						notice.set(Some(format!("Import rejected: {e}")));
					}
				},
			}
		});
	};

	let on_export_json = move |_| {
		let result = export::to_json(&graph.get_untracked())
			.map_err(|e| e.to_string())
			.and_then(|json| {
				browser::download_text(JSON_FILE_NAME, "application/json", &json)
					.map_err(|e| e.to_string())
			});
		match result {
			Ok(()) => info!("exported {JSON_FILE_NAME}"),
			Err(e) => notice.set(Some(format!("Export failed: {e}"))),
		}
	};

	let handle_svg = handle.clone();
	let on_export_svg = move |_| {
		let Some(svg) = handle_svg.with_state(export::to_svg) else {
			return;
		};
		match browser::download_text(SVG_FILE_NAME, "image/svg+xml", &svg) {
			Ok(()) => info!("exported {SVG_FILE_NAME}"),
			Err(e) => notice.set(Some(format!("Export failed: {e}"))),
		}
	};

	let on_fullscreen = move |_| {
		let Some(el) = container.get_untracked() else {
			return;
		};
		if let Err(e) = browser::toggle_fullscreen(&el) {
			warn!("fullscreen toggle failed: {e}");
		}
	};

	view! {
		<main class="layout">
			<section class="input-panel">
				<h1>"Knowledge Graph Canvas"</h1>
				<textarea
					placeholder="Paste text to turn into a graph…"
					prop:value=move || text.get()
					on:input=move |ev| text.set(event_target_value(&ev))
				/>
				<label class="file-input">
					"Import .json graph or text file"
					<input type="file" accept=".json,.txt,.md,text/*" on:change=on_file />
				</label>
				<button on:click=move |_| show_advanced.update(|open| *open = !*open)>
					{move || if show_advanced.get() { "Hide advanced" } else { "Advanced options" }}
				</button>
				<Show when=move || show_advanced.get()>
					<div class="advanced">
						<input
							placeholder="Domain (optional)"
							prop:value=move || domain.get()
							on:input=move |ev| domain.set(event_target_value(&ev))
						/>
						<input
							placeholder="Entity types, comma separated (optional)"
							prop:value=move || entity_types.get()
							on:input=move |ev| entity_types.set(event_target_value(&ev))
						/>
						<Show when=move || needs_key>
							<input
								type="password"
								placeholder="API key"
								prop:value=move || api_key.get()
								on:input=move |ev| api_key.set(event_target_value(&ev))
							/>
						</Show>
					</div>
				</Show>
				<button
					class="primary"
					on:click=on_generate
					disabled=move || step.get().is_loading()
				>
					{move || if step.get().is_loading() { "Generating…" } else { "Generate graph" }}
				</button>
				<p class="status">{move || step.get().message()}</p>
				<p class="notice">{move || notice.get()}</p>
			</section>

			<section class="graph-panel">
				<div class="toolbar">
					<input
						type="search"
						placeholder="Search nodes…"
						prop:value=move || search.get()
						on:input=move |ev| search.set(event_target_value(&ev))
						on:keydown=move |ev: leptos::ev::KeyboardEvent| {
							if ev.key() == "Escape" {
								search.set(String::new());
								selected.set(None);
							}
						}
					/>
					<button on:click=on_export_json>"Export JSON"</button>
					<button on:click=on_export_svg>"Export SVG"</button>
					<button on:click=on_fullscreen>
						{move || if is_fullscreen.get() { "Exit fullscreen" } else { "Fullscreen" }}
					</button>
				</div>
				<div class="graph-container" node_ref=container>
					<ForceGraphCanvas
						data=graph
						search=search
						selected=selected
						is_fullscreen=is_fullscreen
						handle=handle
					/>
					<DetailsPanel graph=graph selected=selected />
				</div>
			</section>
		</main>
	}
}

use leptos::prelude::*;
use log::info;

use crate::components::graphviz_svg::{GraphvizHandle, GraphvizSvg, GraphvizSvgView, Hooks, Options};

const PIPELINE: &str = include_str!("pipeline.svg");

/// Highlights `name` together with everything downstream of it.
fn focus_downstream(g: &mut GraphvizSvg, name: &str) {
	let Some(node) = g.node(name) else {
		return;
	};
	let mut selection = vec![node];
	selection.extend(g.linked_from(node, true).all());
	g.highlight(&selection, true);
	g.bring_to_front(&selection);
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let handle = GraphvizHandle::new(Hooks::default().on_ready(|g| {
		info!(
			"{} nodes: {:?}",
			g.name().unwrap_or("diagram"),
			g.nodes_by_name().keys().collect::<Vec<_>>()
		);
	}));
	let options = Options {
		svg: Some(PIPELINE.to_string()),
		..Options::default()
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="graph-page">
				<div class="graph-overlay">
					<h1>"Graphviz SVG"</h1>
					<p class="subtitle">"Shift+scroll to zoom. Highlight a node to dim the rest."</p>
					<button on:click=move |_| {
						handle.update(|g| focus_downstream(g, "build"));
					}>"Downstream of build"</button>
					<button on:click=move |_| {
						handle.update(GraphvizSvg::clear_highlight);
					}>"Clear"</button>
				</div>
				<GraphvizSvgView handle=handle options=options />
			</div>
		</ErrorBoundary>
	}
}

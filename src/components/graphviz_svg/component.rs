use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use leptos::task::spawn_local;
use log::{error, warn};
use web_sys::{Element, WheelEvent};

use super::error;
use super::fetch::fetch_markup;
use super::options::{Hooks, Options, Source};
use super::state::GraphvizSvg;
use super::viewport::{Rect, WheelGesture, ZoomOutcome};

/// Caller-owned handle to a mounted diagram. `Copy` like any other signal;
/// the instance lives in thread-local reactive storage and only exists once
/// the markup has been attached, so nothing can touch it before then.
#[derive(Clone, Copy)]
pub struct GraphvizHandle {
	inner: StoredValue<Option<GraphvizSvg>, LocalStorage>,
	hooks: StoredValue<Option<Hooks>, LocalStorage>,
	markup: RwSignal<String>,
	background: RwSignal<Option<String>>,
}

impl GraphvizHandle {
	pub fn new(hooks: Hooks) -> Self {
		Self {
			inner: StoredValue::new_local(None),
			hooks: StoredValue::new_local(Some(hooks)),
			markup: RwSignal::new(String::new()),
			background: RwSignal::new(None),
		}
	}

	pub fn is_ready(&self) -> bool {
		self.inner.try_with_value(Option::is_some).unwrap_or(false)
	}

	/// Reactive copy of the current markup.
	pub fn markup(&self) -> ReadSignal<String> {
		self.markup.read_only()
	}

	fn attach(&self, markup: &str, options: Options) -> error::Result<()> {
		let hooks = self.hooks.try_update_value(Option::take).flatten().unwrap_or_default();
		let diagram = GraphvizSvg::new(markup, options, hooks)?;
		self.inner.set_value(Some(diagram));
		self.sync();
		Ok(())
	}

	fn sync(&self) {
		let rendered = self
			.inner
			.try_with_value(|g| g.as_ref().map(|g| (g.to_markup(), g.background().map(str::to_string))))
			.flatten();
		if let Some((markup, background)) = rendered {
			self.markup.set(markup);
			self.background.set(background);
		}
	}

	pub fn with<R>(&self, f: impl FnOnce(&GraphvizSvg) -> R) -> Option<R> {
		self.inner.try_with_value(|g| g.as_ref().map(f)).flatten()
	}

	/// Runs `f` against the diagram and re-renders it.
	pub fn update<R>(&self, f: impl FnOnce(&mut GraphvizSvg) -> R) -> Option<R> {
		let out = self.inner.try_update_value(|g| g.as_mut().map(f)).flatten();
		self.sync();
		out
	}

	/// Feeds a wheel gesture to the diagram without re-rendering it. The
	/// caller resizes the live `<svg>`; the markup signal is refreshed
	/// untracked so it stays current without replacing the element.
	pub fn zoom(&self, gesture: &WheelGesture) -> Option<ZoomOutcome> {
		let (outcome, markup) = self
			.inner
			.try_update_value(|g| {
				let g = g.as_mut()?;
				let outcome = g.wheel(gesture)?;
				Some((outcome, g.to_markup()))
			})
			.flatten()?;
		self.markup.update_untracked(|m| *m = markup);
		Some(outcome)
	}

	/// Drops the diagram, leaving its final markup on the page.
	pub fn destroy(&self) -> Option<String> {
		let markup = self.inner.try_update_value(Option::take).flatten()?.destroy();
		self.markup.set(markup.clone());
		Some(markup)
	}
}

fn attach_logged(handle: &GraphvizHandle, markup: &str, options: Options) {
	if let Err(e) = handle.attach(markup, options) {
		error!("graphviz diagram setup failed: {e}");
	}
}

fn rect_of(el: &Element) -> Rect {
	let r = el.get_bounding_client_rect();
	Rect {
		left: r.left(),
		top: r.top(),
		width: r.width(),
		height: r.height(),
	}
}

/// Percentage points per unit of wheel travel.
fn delta_factor(mode: u32) -> f64 {
	match mode {
		WheelEvent::DOM_DELTA_LINE => 33.0,
		WheelEvent::DOM_DELTA_PAGE => 400.0,
		_ => 1.0,
	}
}

#[component]
pub fn GraphvizSvgView(
	handle: GraphvizHandle,
	#[prop(optional)] options: Option<Options>,
) -> impl IntoView {
	let options = options.unwrap_or_default();
	let host_ref = NodeRef::<leptos::html::Div>::new();
	let zoom = options.zoom;

	match options.source() {
		Some(Source::Inline(svg)) => attach_logged(&handle, &svg, options),
		Some(Source::Url(url)) => {
			spawn_local(async move {
				match fetch_markup(&url).await {
					Ok(markup) => attach_logged(&handle, &markup, options),
					Err(e) => error!("{e}"),
				}
			});
		}
		None => warn!("graphviz diagram has neither `url` nor `svg`"),
	}

	let (markup, background) = (handle.markup, handle.background);
	let on_wheel = move |ev: WheelEvent| {
		if !zoom || !ev.shift_key() {
			return;
		}
		let Some(host) = host_ref.get() else {
			return;
		};
		let Ok(Some(svg)) = host.query_selector("svg") else {
			return;
		};
		let gesture = WheelGesture {
			delta: ev.delta_y(),
			delta_factor: delta_factor(ev.delta_mode()),
			modifier: ev.shift_key(),
			pointer: (ev.client_x() as f64, ev.client_y() as f64),
			diagram: rect_of(&svg),
			frame: rect_of(&host),
		};
		let Some(outcome) = handle.zoom(&gesture) else {
			return;
		};
		ev.prevent_default();
		ev.stop_propagation();

		// the page is not re-rendered on zoom; resize the live element and
		// measure it so the scroll is computed on the new layout
		let size = format!("{}%", outcome.percentage);
		let _ = svg.set_attribute("width", &size);
		let _ = svg.set_attribute("height", &size);
		let rendered = rect_of(&svg);
		let (left, top) = outcome.anchor.scroll_for(rendered.width, rendered.height);
		host.set_scroll_left(left.round() as i32);
		host.set_scroll_top(top.round() as i32);
	};

	view! {
		<div
			node_ref=host_ref
			class="graphviz-svg"
			style=move || {
				background
					.get()
					.map(|bg| format!("overflow: auto; background: {bg};"))
					.unwrap_or_else(|| "overflow: auto;".to_string())
			}
			on:wheel=on_wheel
			inner_html=move || markup.get()
		/>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const PIPELINE: &str = include_str!("../../../tests/fixtures/pipeline.svg");

	fn shareable<T: Copy + Send + 'static>(_: T) {}

	fn gesture(delta: f64) -> WheelGesture {
		let rect = Rect {
			left: 0.0,
			top: 0.0,
			width: 300.0,
			height: 200.0,
		};
		WheelGesture {
			delta,
			delta_factor: 10.0,
			modifier: true,
			pointer: (50.0, 50.0),
			diagram: rect,
			frame: rect,
		}
	}

	#[test]
	fn handle_moves_into_send_closures() {
		Owner::new().with(|| {
			let handle = GraphvizHandle::new(Hooks::default());
			shareable(handle);
			let on_click = move || handle.is_ready();
			shareable(on_click);
			assert!(!on_click());
		});
	}

	#[test]
	fn attach_then_update_and_destroy() {
		Owner::new().with(|| {
			let handle = GraphvizHandle::new(Hooks::default());
			assert_eq!(handle.with(|g| g.nodes().len()), None);
			handle.attach(PIPELINE, Options::default()).unwrap();
			assert!(handle.is_ready());
			assert_eq!(handle.background.get_untracked().as_deref(), Some("white"));

			let before = handle.markup().get_untracked();
			let fetch = handle.with(|g| g.node("fetch")).flatten().unwrap();
			handle.update(|g| g.highlight(&[fetch], false));
			assert_ne!(handle.markup().get_untracked(), before);
			assert!(!handle.markup().get_untracked().contains(r#"fill="lightgrey""#));

			let last = handle.destroy().unwrap();
			assert!(!handle.is_ready());
			assert_eq!(handle.markup().get_untracked(), last);
			assert_eq!(handle.update(|_| ()), None);
		});
	}

	#[test]
	fn zoom_keeps_markup_current() {
		Owner::new().with(|| {
			let handle = GraphvizHandle::new(Hooks::default());
			assert_eq!(handle.zoom(&gesture(-5.0)), None);
			handle.attach(PIPELINE, Options::default()).unwrap();

			let outcome = handle.zoom(&gesture(-5.0)).unwrap();
			assert_eq!(outcome.percentage, 150.0);
			assert_eq!(handle.with(GraphvizSvg::zoom_percentage).flatten(), Some(150.0));
			assert!(handle.markup().get_untracked().contains(r#"width="150%""#));
		});
	}
}

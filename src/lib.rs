//! Interactive Graphviz SVG diagrams for Leptos client-side apps.
//!
//! The diagram model (`GraphvizSvg`) is plain Rust over an owned SVG tree;
//! `GraphvizSvgView` mounts it into the page and wires shift+wheel zoom.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
pub mod components;
mod pages;

pub use components::graphviz_svg::{
	Colors, DimUnselected, Direction, ElementIndex, ElementKind, Error, GraphElement,
	GraphvizHandle, GraphvizSvg, GraphvizSvgView, HighlightPolicy, Hooks, ItemId,
	KeepVisibleTooltips, Layer, Link, Linked, Options, ReadyHook, Scene, ShapeRecord,
	Shrink, Source, TooltipAdapter, blend, fetch_markup, geometry, logical_name, markup,
	parse_color, viewport,
};

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the homepage and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="Graphviz SVG" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}

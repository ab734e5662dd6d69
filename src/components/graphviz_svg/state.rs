use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, info};

use super::adjacency::{Adjacency, Direction, Link, Linked};
use super::error::Result;
use super::highlight::{HighlightPolicy, recolor, restore};
use super::index::{ElementIndex, Scene, build};
use super::markup::{Element, parse};
use super::options::{Hooks, Options};
use super::tooltip::TooltipAdapter;
use super::types::{GraphElement, ItemId, Layer};
use super::viewport::{ViewportController, WheelGesture, ZoomOutcome};

/// One interactive diagram. Owns the indexed markup and every piece of
/// mutable state; independent instances share nothing.
pub struct GraphvizSvg {
	scene: Scene,
	index: ElementIndex,
	adjacency: Adjacency,
	zoom: Option<ViewportController>,
	tooltips: Option<Box<dyn TooltipAdapter>>,
	policy: Box<dyn HighlightPolicy>,
	options: Options,
}

impl GraphvizSvg {
	/// Parses and indexes `markup`, then runs the `ready` hook.
	pub fn new(markup: &str, options: Options, hooks: Hooks) -> Result<Self> {
		Self::from_svg(parse(markup)?, options, hooks)
	}

	pub fn from_svg(svg: Element, options: Options, hooks: Hooks) -> Result<Self> {
		let Hooks {
			tooltips,
			highlight,
			ready,
		} = hooks;
		let (scene, index) = build(svg, options.shrink_px())?;
		let adjacency = Adjacency::build(&index);
		let mut this = Self {
			scene,
			index,
			adjacency,
			zoom: None,
			tooltips,
			policy: highlight,
			options,
		};

		if let Some(tips) = this.tooltips.as_mut() {
			for item in this.scene.items.iter_mut() {
				item.converted_mut().for_each(|a| tips.init(a));
			}
		}
		if this.options.zoom {
			this.zoom = Some(ViewportController::initialize(&mut this.scene.svg));
		}
		info!(
			"graphviz diagram {:?} ready: {} nodes, {} edges",
			this.scene.name.as_deref().unwrap_or(""),
			this.scene.nodes.len(),
			this.scene.edges.len()
		);

		if let Some(ready) = ready {
			ready(&mut this);
		}
		Ok(this)
	}

	pub fn options(&self) -> &Options {
		&self.options
	}

	/// Diagram title from the graph's own `<title>`.
	pub fn name(&self) -> Option<&str> {
		self.scene.name.as_deref()
	}

	/// Fill of the background polygon.
	pub fn background(&self) -> Option<&str> {
		self.scene.background.as_deref()
	}

	pub fn nodes(&self) -> &[ItemId] {
		&self.scene.nodes
	}

	pub fn edges(&self) -> &[ItemId] {
		&self.scene.edges
	}

	pub fn nodes_by_name(&self) -> &IndexMap<String, ItemId> {
		self.index.nodes()
	}

	pub fn edges_by_name(&self) -> &IndexMap<String, ItemId> {
		self.index.edges()
	}

	pub fn node(&self, name: &str) -> Option<ItemId> {
		self.index.node(name)
	}

	pub fn edge(&self, name: &str) -> Option<ItemId> {
		self.index.edge(name)
	}

	/// `None` when `id` does not belong to this diagram.
	pub fn element(&self, id: ItemId) -> Option<&GraphElement> {
		self.scene.item(id)
	}

	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	fn linked_by(&self, node: ItemId, direction: Direction, include_edges: bool) -> Linked {
		match self.element(node).and_then(GraphElement::name) {
			Some(name) => self.adjacency.expand_reachable(name, direction, include_edges),
			None => Linked::default(),
		}
	}

	/// Everything with a path to `node`.
	pub fn linked_to(&self, node: ItemId, include_edges: bool) -> Linked {
		self.linked_by(node, Direction::To, include_edges)
	}

	/// Everything reachable from `node`.
	pub fn linked_from(&self, node: ItemId, include_edges: bool) -> Linked {
		self.linked_by(node, Direction::From, include_edges)
	}

	/// Everything connected to `node` through undirected edges.
	pub fn linked(&self, node: ItemId, include_edges: bool) -> Linked {
		self.linked_by(node, Direction::Undirected, include_edges)
	}

	/// Immediate links only.
	pub fn neighbors(&self, node: ItemId, direction: Direction) -> &[Link] {
		match self.element(node).and_then(GraphElement::name) {
			Some(name) => self.adjacency.find_edges_matching(name, direction),
			None => &[],
		}
	}

	pub fn tooltip(&mut self, ids: &[ItemId], show: bool) {
		let Some(tips) = self.tooltips.as_mut() else {
			return;
		};
		for &id in ids {
			let Some(item) = self.scene.items.get_mut(id.0) else {
				continue;
			};
			for anchor in item.anchors_mut() {
				if show {
					tips.show(anchor);
				} else {
					tips.hide(anchor);
				}
			}
		}
	}

	fn take_layers(&mut self, ids: &[ItemId]) -> Vec<Layer> {
		let wanted: HashSet<ItemId> = ids.iter().copied().collect();
		let mut moved = Vec::new();
		self.scene.layers.retain(|l| match l {
			Layer::Item(id) if wanted.contains(id) => {
				moved.push(l.clone());
				false
			}
			_ => true,
		});
		moved
	}

	/// Moves `ids` to the end of the draw order, keeping their relative order.
	pub fn bring_to_front(&mut self, ids: &[ItemId]) {
		let moved = self.take_layers(ids);
		self.scene.layers.extend(moved);
	}

	/// Moves `ids` to the start of the draw order, just above the background.
	pub fn send_to_back(&mut self, ids: &[ItemId]) {
		let moved = self.take_layers(ids);
		let at = self.scene.background_layer().map_or(0, |pos| pos + 1);
		self.scene.layers.splice(at..at, moved);
	}

	/// Dims everything outside `selection`. An empty selection restores the
	/// original colors and hides every tooltip.
	pub fn highlight(&mut self, selection: &[ItemId], tooltips: bool) {
		let all: Vec<ItemId> = self.scene.all().collect();
		if selection.is_empty() {
			for &id in &all {
				if let Some(item) = self.scene.item_mut(id) {
					restore(item);
				}
			}
			self.tooltip(&all, false);
			debug!("highlight cleared");
			return;
		}

		let selected: HashSet<ItemId> = selection.iter().copied().collect();
		let (chosen, others): (Vec<ItemId>, Vec<ItemId>) =
			all.into_iter().partition(|id| selected.contains(id));
		let background = self.scene.background.clone();
		let bg = background.as_deref();
		for &id in &others {
			let policy = &self.policy;
			recolor(&mut self.scene.items[id.0], |c| policy.unselected(c, bg));
		}
		self.tooltip(&others, false);
		for &id in &chosen {
			let policy = &self.policy;
			recolor(&mut self.scene.items[id.0], |c| policy.selected(c, bg));
		}
		if tooltips {
			self.tooltip(&chosen, true);
		}
		debug!("highlighted {} of {} elements", chosen.len(), chosen.len() + others.len());
	}

	pub fn clear_highlight(&mut self) {
		self.highlight(&[], false);
	}

	pub fn zoom_percentage(&self) -> Option<f64> {
		self.zoom.as_ref().map(ViewportController::percentage)
	}

	fn update_tooltips(&mut self, percentage: f64) {
		let Some(tips) = self.tooltips.as_mut() else {
			return;
		};
		for item in self.scene.items.iter_mut() {
			item.anchors_mut().for_each(|a| tips.update(a, percentage));
		}
	}

	/// Sets the zoom directly, never below 100%. Does nothing when zoom is
	/// disabled.
	pub fn set_scale(&mut self, percentage: f64) {
		let Some(zoom) = self.zoom.as_mut() else {
			return;
		};
		let applied = zoom.set_scale(&mut self.scene.svg, percentage);
		self.update_tooltips(applied);
	}

	/// Feeds a wheel gesture to the viewport. `None` means the gesture was
	/// not a zoom and should scroll as usual.
	pub fn wheel(&mut self, gesture: &WheelGesture) -> Option<ZoomOutcome> {
		let outcome = self.zoom.as_mut()?.on_wheel(&mut self.scene.svg, gesture)?;
		self.update_tooltips(outcome.percentage);
		Some(outcome)
	}

	pub fn to_markup(&self) -> String {
		self.scene.to_markup()
	}

	/// Hides every tooltip and hands back the final markup.
	pub fn destroy(mut self) -> String {
		let all: Vec<ItemId> = self.scene.all().collect();
		self.tooltip(&all, false);
		debug!("graphviz diagram torn down");
		self.to_markup()
	}
}

//! One-shot indexing of a Graphviz `<svg>`: nodes and edges by logical name.

use std::sync::OnceLock;

use indexmap::IndexMap;
use log::debug;
use regex::Regex;

use super::error::{Error, Result};
use super::geometry::{ShapeKind, shrink_element};
use super::markup::{Element, Markup};
use super::types::{Colors, ElementKind, GraphElement, ItemId, Layer, ShapeRecord};

/// Name lookup for the two independent namespaces. Insertion ordered; a
/// repeated name keeps its first position and points at the last element.
#[derive(Clone, Debug, Default)]
pub struct ElementIndex {
	pub(crate) nodes: IndexMap<String, ItemId>,
	pub(crate) edges: IndexMap<String, ItemId>,
}

impl ElementIndex {
	pub fn node(&self, name: &str) -> Option<ItemId> {
		self.nodes.get(name).copied()
	}

	pub fn edge(&self, name: &str) -> Option<ItemId> {
		self.edges.get(name).copied()
	}

	pub fn nodes(&self) -> &IndexMap<String, ItemId> {
		&self.nodes
	}

	pub fn edges(&self) -> &IndexMap<String, ItemId> {
		&self.edges
	}
}

/// The indexed diagram. The graph group's children are split out into
/// `layers` so that nodes and edges can be addressed by `ItemId` and moved
/// around without invalidating anything.
#[derive(Clone, Debug)]
pub struct Scene {
	/// The `<svg>` root; the graph group's slot in `children` is a placeholder.
	pub svg: Element,
	pub(crate) graph_slot: usize,
	/// The graph group itself, without children.
	pub graph: Element,
	pub layers: Vec<Layer>,
	pub items: Vec<GraphElement>,
	pub(crate) nodes: Vec<ItemId>,
	pub(crate) edges: Vec<ItemId>,
	pub name: Option<String>,
	pub background: Option<String>,
}

impl Scene {
	/// `None` for an id that belongs to some other diagram.
	pub fn item(&self, id: ItemId) -> Option<&GraphElement> {
		self.items.get(id.0)
	}

	pub fn item_mut(&mut self, id: ItemId) -> Option<&mut GraphElement> {
		self.items.get_mut(id.0)
	}

	pub fn all(&self) -> impl Iterator<Item = ItemId> + '_ {
		self.nodes.iter().chain(self.edges.iter()).copied()
	}

	pub fn write_to(&self, out: &mut String) {
		self.svg.write_open_tag(out);
		for (i, child) in self.svg.children.iter().enumerate() {
			if i != self.graph_slot {
				child.write_to(out);
				continue;
			}
			self.graph.write_open_tag(out);
			for layer in &self.layers {
				match layer {
					Layer::Markup(m) => m.write_to(out),
					Layer::Item(id) => {
						if let Some(item) = self.item(*id) {
							item.element.write_to(out);
						}
					}
				}
			}
			self.graph.write_close_tag(out);
		}
		self.svg.write_close_tag(out);
	}

	pub fn to_markup(&self) -> String {
		let mut out = String::new();
		self.write_to(&mut out);
		out
	}

	/// Position of the background polygon among the layers, if any.
	pub fn background_layer(&self) -> Option<usize> {
		self.layers.iter().position(|l| {
			matches!(l, Layer::Markup(Markup::Element(el)) if el.local_name() == "polygon")
		})
	}
}

fn re_compass() -> &'static Regex {
	static ONCE: OnceLock<Regex> = OnceLock::new();
	ONCE.get_or_init(|| Regex::new(r":[snew][ew]?").unwrap())
}

/// Strips compass-point port suffixes, `node1:ne` -> `node1`, `a:s->b:n` -> `a->b`.
pub fn logical_name(title: &str) -> String {
	re_compass().replace_all(title, "").into_owned()
}

fn is_graph_item(el: &Element, class: &str) -> bool {
	el.local_name() == "g" && el.has_class(class)
}

/// Builds the scene and the name index in a single pass over the markup:
/// nodes first, then edges. `shrink` is the per-axis margin applied to node
/// outlines.
pub fn build(mut svg: Element, shrink: Option<(f64, f64)>) -> Result<(Scene, ElementIndex)> {
	let graph_slot = svg
		.children
		.iter()
		.position(|c| c.as_element().is_some_and(|el| el.local_name() == "g"))
		.ok_or(Error::MissingGraph)?;
	let mut graph = match std::mem::replace(
		&mut svg.children[graph_slot],
		Markup::Text(String::new()),
	) {
		Markup::Element(el) => el,
		_ => return Err(Error::MissingGraph),
	};

	let mut layers = Vec::with_capacity(graph.children.len());
	let mut items = Vec::new();
	let (mut nodes, mut edges) = (Vec::new(), Vec::new());
	let mut name = None;
	for child in std::mem::take(&mut graph.children) {
		let kind = match child.as_element() {
			Some(el) if el.local_name() == "title" => {
				if name.is_none() {
					name = Some(el.text());
				}
				continue;
			}
			Some(el) if is_graph_item(el, "node") => Some(ElementKind::Node),
			Some(el) if is_graph_item(el, "edge") => Some(ElementKind::Edge),
			_ => None,
		};
		match (kind, child) {
			(Some(kind), Markup::Element(el)) => {
				let id = ItemId(items.len());
				items.push(GraphElement::new(kind, el));
				match kind {
					ElementKind::Node => nodes.push(id),
					ElementKind::Edge => edges.push(id),
				}
				layers.push(Layer::Item(id));
			}
			(_, child) => layers.push(Layer::Markup(child)),
		}
	}
	if let Some(name) = &name {
		graph.set_attr("data-name", name.as_str());
	}

	let mut scene = Scene {
		svg,
		graph_slot,
		graph,
		layers,
		items,
		nodes,
		edges,
		name,
		background: None,
	};
	scene.background = scene.background_layer().and_then(|pos| match &scene.layers[pos] {
		Layer::Markup(Markup::Element(el)) => el.attr("fill").map(str::to_string),
		_ => None,
	});

	let shrink = shrink.filter(|&(dx, dy)| dx != 0.0 || dy != 0.0);
	let mut index = ElementIndex::default();
	let order: Vec<(usize, ItemId)> = scene
		.layers
		.iter()
		.enumerate()
		.filter_map(|(pos, l)| match l {
			Layer::Item(id) => Some((pos, *id)),
			_ => None,
		})
		.collect();
	let (node_order, edge_order): (Vec<_>, Vec<_>) = order
		.into_iter()
		.partition(|(_, id)| scene.items[id.0].is_node());
	for (pos, id) in node_order.into_iter().chain(edge_order) {
		let comment = preceding_comment(&scene.layers[..pos]);
		let item = &mut scene.items[id.0];
		setup_item(item, shrink, comment);
		if let Some(name) = item.name.clone() {
			match item.kind {
				ElementKind::Node => index.nodes.insert(name, id),
				ElementKind::Edge => index.edges.insert(name, id),
			};
		} else {
			debug!("{:?} without a title left unindexed", item.kind);
		}
	}

	debug!(
		"indexed {} nodes ({} named) and {} edges ({} named)",
		scene.nodes.len(),
		index.nodes.len(),
		scene.edges.len(),
		index.edges.len()
	);
	Ok((scene, index))
}

/// Nearest comment among the earlier siblings, decoded.
fn preceding_comment(before: &[Layer]) -> Option<String> {
	before.iter().rev().find_map(|l| match l {
		Layer::Markup(Markup::Comment(body)) => {
			Some(htmlize::unescape(body.trim()).into_owned())
		}
		_ => None,
	})
}

fn setup_item(item: &mut GraphElement, shrink: Option<(f64, f64)>, comment: Option<String>) {
	let el = &mut item.element;

	let titles = el.take_children("title");
	if !titles.is_empty() {
		let title: String = titles.iter().map(Element::text).collect();
		let name = logical_name(&title);
		el.set_attr("data-name", name.as_str());
		if let Some(comment) = comment.filter(|c| *c != name) {
			el.set_attr("data-comment", comment.as_str());
			item.comment = Some(comment);
		}
		item.name = Some(name);
	}

	let paths = el.descendant_paths(&|e| ShapeKind::from_tag(e.local_name()).is_some());
	for path in paths {
		let Some(shape) = el.at_path_mut(&path) else {
			continue;
		};
		let Some(kind) = ShapeKind::from_tag(shape.local_name()) else {
			continue;
		};
		let original = Colors {
			fill: shape.attr("fill").map(str::to_string),
			stroke: shape.attr("stroke").map(str::to_string),
		};
		if let (ElementKind::Node, Some((dx, dy))) = (item.kind, shrink) {
			shrink_element(shape, kind, dx, dy);
		}
		item.shapes.push(ShapeRecord {
			path,
			kind,
			original,
		});
	}

	for (i, child) in el.children.iter_mut().enumerate() {
		let Some(a) = child.as_element_mut().filter(|a| a.local_name() == "a") else {
			continue;
		};
		if let Some(title) = a.remove_attr("xlink:title") {
			a.set_attr("title", title);
			item.converted.push(i);
		}
		if a.attr("title").is_some() {
			item.anchors.push(i);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::super::markup::parse;
	use super::*;

	fn scene(body: &str) -> (Scene, ElementIndex) {
		let svg = parse(&format!(
			r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="100pt" height="50pt"><g class="graph">{body}</g></svg>"#
		))
		.unwrap();
		build(svg, None).unwrap()
	}

	#[test]
	fn strips_compass_points() {
		assert_eq!(logical_name("node1:ne"), "node1");
		assert_eq!(logical_name("node1:w"), "node1");
		assert_eq!(logical_name("a:s->b:nw"), "a->b");
		assert_eq!(logical_name("plain"), "plain");
	}

	#[test]
	fn indexes_nodes_and_edges_separately() {
		let (scene, index) = scene(
			r#"<title>G</title>
			<g class="node"><title>a:ne</title><ellipse fill="red" stroke="black" rx="5" ry="5"/></g>
			<g class="node"><title>a</title><ellipse rx="5" ry="5"/></g>
			<g class="edge"><title>a</title><path stroke="black" d="M0,0"/></g>"#,
		);
		assert_eq!(scene.nodes.len(), 2);
		assert_eq!(index.nodes().len(), 1);
		assert_eq!(index.node("a"), Some(scene.nodes[1]));
		assert_eq!(index.edge("a"), Some(scene.edges[0]));
		assert_eq!(scene.name.as_deref(), Some("G"));
		assert_eq!(scene.graph.attr("data-name"), Some("G"));
		let first = scene.item(scene.nodes[0]).unwrap();
		assert_eq!(first.element.attr("data-name"), Some("a"));
		assert!(first.element.child_elements().all(|(_, c)| c.local_name() != "title"));
		assert_eq!(
			first.shapes[0].original,
			Colors {
				fill: Some("red".into()),
				stroke: Some("black".into())
			}
		);
	}

	#[test]
	fn untitled_elements_are_kept_but_not_named() {
		let (scene, index) = scene(r#"<g class="node"><ellipse rx="5" ry="5"/></g>"#);
		assert_eq!(scene.nodes.len(), 1);
		assert!(index.nodes().is_empty());
		assert_eq!(scene.item(scene.nodes[0]).unwrap().shapes.len(), 1);
	}

	#[test]
	fn picks_up_author_comments() {
		let (scene, index) = scene(
			r#"<!-- a -->
			<g class="node"><title>a</title></g>
			<!-- Start &amp; stop -->
			<g class="node"><title>b</title></g>"#,
		);
		let a = scene.item(index.node("a").unwrap()).unwrap();
		assert_eq!(a.comment(), None);
		assert_eq!(a.element.attr("data-comment"), None);
		let b = scene.item(index.node("b").unwrap()).unwrap();
		assert_eq!(b.comment(), Some("Start & stop"));
		assert_eq!(b.element.attr("data-comment"), Some("Start & stop"));
	}

	#[test]
	fn drops_every_graph_title() {
		let (scene, _) = scene(
			r#"<title>G</title><title>again</title><g class="node"><title>a</title></g>"#,
		);
		assert_eq!(scene.name.as_deref(), Some("G"));
		assert!(!scene.to_markup().contains("<title>"));
		assert!(scene.layers.iter().all(|l| match l {
			Layer::Markup(Markup::Element(el)) => el.local_name() != "title",
			_ => true,
		}));
	}

	#[test]
	fn moves_namespaced_anchor_titles() {
		let (scene, index) = scene(
			r#"<g class="node"><title>a</title><a xlink:title="hello"><text>a</text></a><a title="plain"><text>p</text></a><a><text>x</text></a></g>"#,
		);
		let a = scene.item(index.node("a").unwrap()).unwrap();
		assert_eq!(a.anchors, vec![0, 1]);
		assert_eq!(a.converted, vec![0]);
		let anchor = a.element.children[a.anchors[0]].as_element().unwrap();
		assert_eq!(anchor.attr("title"), Some("hello"));
		assert_eq!(anchor.attr("xlink:title"), None);
	}

	#[test]
	fn shrinks_nodes_only() {
		let svg = parse(
			r#"<svg xmlns="http://www.w3.org/2000/svg"><g>
			<g class="node"><title>a</title><ellipse rx="10" ry="8"/></g>
			<g class="edge"><title>a->a</title><polygon points="0,0 4,0 4,4"/></g>
			</g></svg>"#,
		)
		.unwrap();
		let (scene, index) = build(svg, Some((1.0, 2.0))).unwrap();
		let node = scene.item(index.node("a").unwrap()).unwrap();
		let ellipse = node.element.at_path(&node.shapes[0].path).unwrap();
		assert_eq!(ellipse.attr("rx"), Some("9"));
		assert_eq!(ellipse.attr("ry"), Some("6"));
		let edge = scene.item(index.edge("a->a").unwrap()).unwrap();
		let poly = edge.element.at_path(&edge.shapes[0].path).unwrap();
		assert_eq!(poly.attr("points"), Some("0,0 4,0 4,4"));
	}

	#[test]
	fn background_and_round_trip() {
		let (scene, _) = scene(
			r#"<polygon fill="white" stroke="none" points="0,0 1,0 1,1"/><g class="node"><title>a</title></g>"#,
		);
		assert_eq!(scene.background.as_deref(), Some("white"));
		assert_eq!(scene.background_layer(), Some(0));
		let markup = scene.to_markup();
		assert!(markup.starts_with("<svg"));
		assert!(markup.contains(r#"<g class="node" data-name="a"/>"#));
		assert!(parse(&markup).is_ok());
	}

	#[test]
	fn missing_graph_group() {
		let svg = parse(r#"<svg xmlns="http://www.w3.org/2000/svg"><rect/></svg>"#).unwrap();
		assert!(matches!(build(svg, None), Err(Error::MissingGraph)));
	}
}

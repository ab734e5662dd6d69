//! Owned, mutable SVG tree.
//!
//! The diagram is parsed once with `roxmltree` and then lives as plain Rust
//! values, so every interaction is an attribute write on this tree and can be
//! tested without a browser. `to_markup` projects it back into the page.

use std::fmt::Write as _;

use super::error::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub enum Markup {
	Element(Element),
	Text(String),
	/// Raw comment body, entities left undecoded.
	Comment(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
	/// Qualified tag name, prefix included (`svg:g`) when the source had one.
	pub name: String,
	pub attrs: Vec<(String, String)>,
	pub children: Vec<Markup>,
}

impl Markup {
	pub fn as_element(&self) -> Option<&Element> {
		match self {
			Markup::Element(el) => Some(el),
			_ => None,
		}
	}

	pub fn as_element_mut(&mut self) -> Option<&mut Element> {
		match self {
			Markup::Element(el) => Some(el),
			_ => None,
		}
	}

	pub fn write_to(&self, out: &mut String) {
		match self {
			Markup::Element(el) => el.write_to(out),
			Markup::Text(text) => out.push_str(&htmlize::escape_text(text.as_str())),
			Markup::Comment(body) => {
				let _ = write!(out, "<!--{body}-->");
			}
		}
	}
}

impl Element {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Default::default()
		}
	}

	/// Builder-style attribute setter, mostly for tests and synthetic markup.
	pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
		self.set_attr(key, value);
		self
	}

	pub fn with_child(mut self, child: Markup) -> Self {
		self.children.push(child);
		self
	}

	/// Tag name without any namespace prefix.
	pub fn local_name(&self) -> &str {
		self.name.rsplit(':').next().unwrap_or(&self.name)
	}

	pub fn attr(&self, key: &str) -> Option<&str> {
		self.attrs
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, v)| v.as_str())
	}

	pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
		let value = value.into();
		match self.attrs.iter_mut().find(|(k, _)| k == key) {
			Some((_, v)) => *v = value,
			None => self.attrs.push((key.to_string(), value)),
		}
	}

	pub fn remove_attr(&mut self, key: &str) -> Option<String> {
		let pos = self.attrs.iter().position(|(k, _)| k == key)?;
		Some(self.attrs.remove(pos).1)
	}

	pub fn has_class(&self, class: &str) -> bool {
		self.attr("class")
			.is_some_and(|c| c.split_whitespace().any(|t| t == class))
	}

	pub fn child_elements(&self) -> impl Iterator<Item = (usize, &Element)> {
		self.children
			.iter()
			.enumerate()
			.filter_map(|(i, c)| c.as_element().map(|el| (i, el)))
	}

	/// Concatenated text of all descendants, like the DOM `textContent`.
	pub fn text(&self) -> String {
		let mut out = String::new();
		self.collect_text(&mut out);
		out
	}

	fn collect_text(&self, out: &mut String) {
		for child in &self.children {
			match child {
				Markup::Text(t) => out.push_str(t),
				Markup::Element(el) => el.collect_text(out),
				Markup::Comment(_) => {}
			}
		}
	}

	/// Removes every direct child element with the given local name and returns them.
	pub fn take_children(&mut self, local: &str) -> Vec<Element> {
		let (taken, kept) = std::mem::take(&mut self.children)
			.into_iter()
			.partition::<Vec<_>, _>(|c| c.as_element().is_some_and(|el| el.local_name() == local));
		self.children = kept;
		taken
			.into_iter()
			.filter_map(|c| match c {
				Markup::Element(el) => Some(el),
				_ => None,
			})
			.collect()
	}

	/// Child-index paths of every descendant element matching `pred`, in document order.
	pub fn descendant_paths(&self, pred: &dyn Fn(&Element) -> bool) -> Vec<Vec<usize>> {
		let mut out = Vec::new();
		let mut prefix = Vec::new();
		self.walk_paths(pred, &mut prefix, &mut out);
		out
	}

	fn walk_paths(
		&self,
		pred: &dyn Fn(&Element) -> bool,
		prefix: &mut Vec<usize>,
		out: &mut Vec<Vec<usize>>,
	) {
		for (i, child) in self.child_elements() {
			prefix.push(i);
			if pred(child) {
				out.push(prefix.clone());
			}
			child.walk_paths(pred, prefix, out);
			prefix.pop();
		}
	}

	pub fn at_path(&self, path: &[usize]) -> Option<&Element> {
		path.iter()
			.try_fold(self, |el, &i| el.children.get(i)?.as_element())
	}

	pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
		path.iter()
			.try_fold(self, |el, &i| el.children.get_mut(i)?.as_element_mut())
	}

	pub fn write_open_tag(&self, out: &mut String) {
		out.push('<');
		out.push_str(&self.name);
		for (k, v) in &self.attrs {
			let _ = write!(out, " {k}=\"{}\"", htmlize::escape_attribute(v.as_str()));
		}
		out.push('>');
	}

	pub fn write_close_tag(&self, out: &mut String) {
		let _ = write!(out, "</{}>", self.name);
	}

	pub fn write_to(&self, out: &mut String) {
		if self.children.is_empty() {
			self.write_open_tag(out);
			// turn `<x ...>` into `<x .../>`
			out.pop();
			out.push_str("/>");
			return;
		}
		self.write_open_tag(out);
		for child in &self.children {
			child.write_to(out);
		}
		self.write_close_tag(out);
	}

	pub fn to_markup(&self) -> String {
		let mut out = String::new();
		self.write_to(&mut out);
		out
	}
}

/// Parses a document and returns its first `<svg>` element as an owned tree.
///
/// Graphviz output carries a DOCTYPE and a leading generator comment; the
/// former needs DTD support switched on, the latter is dropped along with
/// everything else outside the `<svg>` element.
pub fn parse(markup: &str) -> Result<Element> {
	let opts = roxmltree::ParsingOptions {
		allow_dtd: true,
		..Default::default()
	};
	let doc = roxmltree::Document::parse_with_options(markup, opts)?;
	let svg = doc
		.descendants()
		.find(|n| n.is_element() && n.tag_name().name() == "svg")
		.ok_or(Error::MissingSvg)?;

	let mut root = build_element(svg);
	let mut decls = Vec::new();
	for ns in svg.namespaces() {
		match ns.name() {
			Some("xml") => {}
			Some(prefix) => decls.push((format!("xmlns:{prefix}"), ns.uri().to_string())),
			None => decls.push(("xmlns".to_string(), ns.uri().to_string())),
		}
	}
	decls.append(&mut root.attrs);
	root.attrs = decls;
	Ok(root)
}

fn qualified(node: roxmltree::Node<'_, '_>, ns: Option<&str>, local: &str) -> String {
	match ns
		.and_then(|uri| node.lookup_prefix(uri))
		.filter(|p| !p.is_empty())
	{
		Some(prefix) => format!("{prefix}:{local}"),
		None => local.to_string(),
	}
}

fn build_element(node: roxmltree::Node<'_, '_>) -> Element {
	let tag = node.tag_name();
	let mut el = Element::new(qualified(node, tag.namespace(), tag.name()));
	for a in node.attributes() {
		el.attrs
			.push((qualified(node, a.namespace(), a.name()), a.value().to_string()));
	}
	for child in node.children() {
		if child.is_element() {
			el.children.push(Markup::Element(build_element(child)));
		} else if child.is_text() {
			el.children
				.push(Markup::Text(child.text().unwrap_or_default().to_string()));
		} else if child.is_comment() {
			el.children
				.push(Markup::Comment(child.text().unwrap_or_default().to_string()));
		}
	}
	el
}

use super::geometry::ShapeKind;
use super::markup::{Element, Markup};

/// Stable handle to a node or edge of one diagram. Survives reordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) usize);

impl ItemId {
	pub fn index(self) -> usize {
		self.0
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
	Node,
	Edge,
}

/// Fill and stroke as they were in the markup at setup. Never overwritten.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Colors {
	pub fill: Option<String>,
	pub stroke: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShapeRecord {
	/// Child-index path from the owning element.
	pub path: Vec<usize>,
	pub kind: ShapeKind,
	pub original: Colors,
}

#[derive(Clone, Debug)]
pub struct GraphElement {
	pub kind: ElementKind,
	pub name: Option<String>,
	pub comment: Option<String>,
	pub element: Element,
	pub shapes: Vec<ShapeRecord>,
	/// Child indices of the `<a title>` anchors tooltips hang off.
	pub anchors: Vec<usize>,
	/// The subset of `anchors` whose title was moved off `xlink:title`.
	pub converted: Vec<usize>,
}

impl GraphElement {
	pub(crate) fn new(kind: ElementKind, element: Element) -> Self {
		Self {
			kind,
			name: None,
			comment: None,
			element,
			shapes: Vec::new(),
			anchors: Vec::new(),
			converted: Vec::new(),
		}
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn comment(&self) -> Option<&str> {
		self.comment.as_deref()
	}

	pub fn is_node(&self) -> bool {
		self.kind == ElementKind::Node
	}

	pub fn anchors_mut(&mut self) -> impl Iterator<Item = &mut Element> {
		children_at(&mut self.element, &self.anchors)
	}

	pub fn converted_mut(&mut self) -> impl Iterator<Item = &mut Element> {
		children_at(&mut self.element, &self.converted)
	}
}

fn children_at<'a>(
	element: &'a mut Element,
	at: &'a [usize],
) -> impl Iterator<Item = &'a mut Element> + 'a {
	element
		.children
		.iter_mut()
		.enumerate()
		.filter(move |(i, _)| at.contains(i))
		.filter_map(|(_, c)| c.as_element_mut())
}

/// One child of the graph group, in draw order.
#[derive(Clone, Debug)]
pub enum Layer {
	Markup(Markup),
	Item(ItemId),
}

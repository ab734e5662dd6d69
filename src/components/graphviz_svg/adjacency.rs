//! Node adjacency recovered from edge names.
//!
//! Graphviz names edges `a->b` in digraphs and `a--b` in graphs. The names
//! are split once at setup into per-node link lists, so every query after
//! that is a plain graph search.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use super::index::ElementIndex;
use super::types::ItemId;

const DIRECTED: &str = "->";
const UNDIRECTED: &str = "--";

/// Which links to follow, relative to the node being asked about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
	/// Edges pointing at the node; the other end is the source.
	To,
	/// Edges leaving the node; the other end is the target.
	From,
	/// `--` edges, either orientation.
	Undirected,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
	pub edge: ItemId,
	pub other_name: String,
	/// `None` when the far end names no indexed node.
	pub other: Option<ItemId>,
}

/// Ordered, duplicate-free result of a traversal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Linked {
	pub nodes: Vec<ItemId>,
	pub edges: Vec<ItemId>,
}

impl Linked {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	/// Nodes then edges, ready to hand to `highlight`.
	pub fn all(&self) -> Vec<ItemId> {
		self.nodes.iter().chain(&self.edges).copied().collect()
	}
}

#[derive(Clone, Debug, Default)]
pub struct Adjacency {
	links: HashMap<(String, Direction), Vec<Link>>,
}

/// Splits `edge` around `op`, preferring a split where both sides are known
/// nodes so names containing the operator still resolve.
fn split_endpoints<'a>(
	edge: &'a str,
	op: &str,
	nodes: &IndexMap<String, ItemId>,
) -> Option<(&'a str, &'a str)> {
	let mut fallback = None;
	for (pos, _) in edge.match_indices(op) {
		let (left, right) = (&edge[..pos], &edge[pos + op.len()..]);
		if nodes.contains_key(left) && nodes.contains_key(right) {
			return Some((left, right));
		}
		fallback.get_or_insert((left, right));
	}
	fallback
}

impl Adjacency {
	pub fn build(index: &ElementIndex) -> Self {
		let mut this = Self::default();
		let nodes = index.nodes();
		for (name, &edge) in index.edges() {
			if let Some((source, target)) = split_endpoints(name, DIRECTED, nodes) {
				this.push(source, Direction::From, target, edge, nodes);
				this.push(target, Direction::To, source, edge, nodes);
			} else if let Some((a, b)) = split_endpoints(name, UNDIRECTED, nodes) {
				this.push(a, Direction::Undirected, b, edge, nodes);
				if a != b {
					this.push(b, Direction::Undirected, a, edge, nodes);
				}
			}
		}
		this
	}

	fn push(
		&mut self,
		at: &str,
		direction: Direction,
		other: &str,
		edge: ItemId,
		nodes: &IndexMap<String, ItemId>,
	) {
		self.links
			.entry((at.to_string(), direction))
			.or_default()
			.push(Link {
				edge,
				other_name: other.to_string(),
				other: nodes.get(other).copied(),
			});
	}

	/// Immediate links of `node` in `direction`, in edge order.
	pub fn find_edges_matching(&self, node: &str, direction: Direction) -> &[Link] {
		self.links
			.get(&(node.to_string(), direction))
			.map(Vec::as_slice)
			.unwrap_or_default()
	}

	/// Depth-first closure from `start`. Each discovered node is expanded
	/// once; `start` itself only shows up if a cycle leads back to it.
	pub fn expand_reachable(&self, start: &str, direction: Direction, include_edges: bool) -> Linked {
		let mut out = Linked::default();
		let mut seen_nodes = HashSet::new();
		let mut seen_edges = HashSet::new();
		let mut stack: Vec<&Link> = Vec::new();

		self.visit(start, direction, include_edges, &mut out, &mut seen_edges, &mut stack);
		while let Some(link) = stack.pop() {
			let Some(other) = link.other else {
				continue;
			};
			if !seen_nodes.insert(other) {
				continue;
			}
			out.nodes.push(other);
			self.visit(
				&link.other_name,
				direction,
				include_edges,
				&mut out,
				&mut seen_edges,
				&mut stack,
			);
		}
		out
	}

	fn visit<'a>(
		&'a self,
		node: &str,
		direction: Direction,
		include_edges: bool,
		out: &mut Linked,
		seen_edges: &mut HashSet<ItemId>,
		stack: &mut Vec<&'a Link>,
	) {
		let links = self.find_edges_matching(node, direction);
		if include_edges {
			out.edges
				.extend(links.iter().map(|l| l.edge).filter(|e| seen_edges.insert(*e)));
		}
		stack.extend(links.iter().rev());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn index(nodes: &[&str], edges: &[&str]) -> ElementIndex {
		let mut index = ElementIndex::default();
		for (i, n) in nodes.iter().enumerate() {
			index.nodes.insert(n.to_string(), ItemId(i));
		}
		for (i, e) in edges.iter().enumerate() {
			index.edges.insert(e.to_string(), ItemId(100 + i));
		}
		index
	}

	const A: ItemId = ItemId(0);
	const B: ItemId = ItemId(1);
	const C: ItemId = ItemId(2);

	#[test]
	fn chain_closure_both_ways() {
		let adj = Adjacency::build(&index(&["A", "B", "C"], &["A->B", "B->C"]));

		assert_eq!(adj.expand_reachable("A", Direction::From, false).nodes, vec![B, C]);
		assert_eq!(adj.expand_reachable("C", Direction::To, false).nodes, vec![B, A]);

		let from_a: Vec<_> = adj
			.find_edges_matching("A", Direction::From)
			.iter()
			.filter_map(|l| l.other)
			.collect();
		assert_eq!(from_a, vec![B]);
		let to_c: Vec<_> = adj
			.find_edges_matching("C", Direction::To)
			.iter()
			.filter_map(|l| l.other)
			.collect();
		assert_eq!(to_c, vec![B]);
	}

	#[test]
	fn includes_connecting_edges_once() {
		let adj = Adjacency::build(&index(&["A", "B", "C"], &["A->B", "B->C", "A->C"]));
		let linked = adj.expand_reachable("A", Direction::From, true);
		assert_eq!(linked.nodes, vec![B, C]);
		assert_eq!(linked.edges, vec![ItemId(100), ItemId(102), ItemId(101)]);
		assert_eq!(linked.all().len(), 5);
	}

	#[test]
	fn cycles_terminate_and_revisit_start() {
		let adj = Adjacency::build(&index(&["A", "B"], &["A->B", "B->A"]));
		let linked = adj.expand_reachable("A", Direction::From, true);
		assert_eq!(linked.nodes, vec![B, A]);
		assert_eq!(linked.edges, vec![ItemId(100), ItemId(101)]);
	}

	#[test]
	fn depth_first_preorder() {
		let adj = Adjacency::build(&index(
			&["A", "B", "C", "D"],
			&["A->B", "A->C", "B->D"],
		));
		let d = ItemId(3);
		assert_eq!(adj.expand_reachable("A", Direction::From, false).nodes, vec![B, d, C]);
	}

	#[test]
	fn undirected_resolves_other_end() {
		let adj = Adjacency::build(&index(&["A", "B", "C"], &["A--B", "C--B"]));
		assert_eq!(
			adj.expand_reachable("A", Direction::Undirected, false).nodes,
			vec![B, A, C]
		);
		let from_b: Vec<_> = adj
			.find_edges_matching("B", Direction::Undirected)
			.iter()
			.map(|l| l.other_name.as_str())
			.collect();
		assert_eq!(from_b, vec!["A", "C"]);
		assert!(adj.expand_reachable("A", Direction::From, false).is_empty());
	}

	#[test]
	fn malformed_names_do_not_match() {
		let adj = Adjacency::build(&index(&["A", "B"], &["A=>B", "stray"]));
		assert!(adj.expand_reachable("A", Direction::From, true).is_empty());
		assert!(adj.expand_reachable("B", Direction::To, true).is_empty());
	}

	#[test]
	fn prefers_split_between_known_nodes() {
		let adj = Adjacency::build(&index(&["x->y", "z"], &["x->y->z"]));
		let to_z = adj.find_edges_matching("z", Direction::To);
		assert_eq!(to_z.len(), 1);
		assert_eq!(to_z[0].other, Some(A));
	}

	#[test]
	fn unknown_far_end_still_reports_edge() {
		let adj = Adjacency::build(&index(&["A"], &["A->ghost"]));
		let linked = adj.expand_reachable("A", Direction::From, true);
		assert!(linked.nodes.is_empty());
		assert_eq!(linked.edges, vec![ItemId(100)]);
	}
}

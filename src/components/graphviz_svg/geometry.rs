//! Length conversion and outline shrinking for node shapes.

use std::sync::OnceLock;

use log::warn;
use regex::Regex;
use serde::Deserialize;

use super::markup::Element;

/// Graphviz points to pixels; deliberately generous so the default margin
/// removes the padding Graphviz leaves around labels.
pub const PT_TO_PX: f64 = 32.5;

/// A length as it appears in options: a bare number, or a string with an
/// optional `px`/`pt` suffix.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Length {
	Number(f64),
	Text(String),
}

impl Length {
	pub fn to_px(&self) -> f64 {
		match self {
			Length::Number(v) => *v,
			Length::Text(s) => unit_to_px(s),
		}
	}
}

impl From<f64> for Length {
	fn from(v: f64) -> Self {
		Length::Number(v)
	}
}

impl From<&str> for Length {
	fn from(s: &str) -> Self {
		Length::Text(s.to_string())
	}
}

fn re_leading_number() -> &'static Regex {
	static ONCE: OnceLock<Regex> = OnceLock::new();
	ONCE.get_or_init(|| {
		Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap()
	})
}

/// Parses the leading float of `s`, ignoring whatever follows it.
pub fn leading_float(s: &str) -> Option<f64> {
	re_leading_number()
		.find(s)
		.and_then(|m| m.as_str().trim().parse().ok())
}

/// Converts `"12px"`, `"0.5pt"` or a bare number to pixels. Unknown suffixes
/// are taken as pixels already.
pub fn unit_to_px(value: &str) -> f64 {
	let value = value.trim();
	let (number, factor) = if let Some(v) = value.strip_suffix("px") {
		(v, 1.0)
	} else if let Some(v) = value.strip_suffix("pt") {
		(v, PT_TO_PX)
	} else {
		(value, 1.0)
	};
	match leading_float(number) {
		Some(v) => v * factor,
		None => {
			warn!("unparseable length {value:?}, using 0");
			0.0
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
	Ellipse,
	Polygon,
	Path,
}

impl ShapeKind {
	pub fn from_tag(local_name: &str) -> Option<Self> {
		match local_name {
			"ellipse" => Some(ShapeKind::Ellipse),
			"polygon" => Some(ShapeKind::Polygon),
			"path" => Some(ShapeKind::Path),
			_ => None,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
	Ellipse { rx: f64, ry: f64 },
	Polygon(Vec<(f64, f64)>),
	Path,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl BBox {
	pub fn of_points(points: &[(f64, f64)]) -> Option<Self> {
		let (first, rest) = points.split_first()?;
		let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.0, first.1, first.0, first.1);
		for &(x, y) in rest {
			min_x = min_x.min(x);
			min_y = min_y.min(y);
			max_x = max_x.max(x);
			max_y = max_y.max(y);
		}
		Some(Self {
			x: min_x,
			y: min_y,
			width: max_x - min_x,
			height: max_y - min_y,
		})
	}

	pub fn center(&self) -> (f64, f64) {
		(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}
}

/// Pulls every vertex toward the bounding-box center by `d` scaled by its
/// distance from the center relative to the half extent, so vertices on the
/// box edge move exactly `d`.
fn inset(o: f64, c: f64, half: f64, d: f64) -> f64 {
	if half == 0.0 {
		return o;
	}
	(c - o) / half * d + o
}

pub fn shrink(shape: Shape, dx: f64, dy: f64) -> Shape {
	match shape {
		Shape::Ellipse { rx, ry } => Shape::Ellipse {
			rx: rx - dx,
			ry: ry - dy,
		},
		Shape::Polygon(points) => {
			let Some(bbox) = BBox::of_points(&points) else {
				return Shape::Polygon(points);
			};
			let (cx, cy) = bbox.center();
			let (hw, hh) = (bbox.width / 2.0, bbox.height / 2.0);
			Shape::Polygon(
				points
					.into_iter()
					.map(|(ox, oy)| (inset(ox, cx, hw, dx), inset(oy, cy, hh, dy)))
					.collect(),
			)
		}
		Shape::Path => Shape::Path,
	}
}

pub fn parse_points(points: &str) -> Option<Vec<(f64, f64)>> {
	points
		.split_whitespace()
		.map(|pair| {
			let (x, y) = pair.split_once(',')?;
			Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
		})
		.collect()
}

pub fn format_points(points: &[(f64, f64)]) -> String {
	points
		.iter()
		.map(|(x, y)| format!("{x},{y}"))
		.collect::<Vec<_>>()
		.join(" ")
}

/// Reads the shape out of `el`'s attributes, shrinks it and writes it back.
/// Elements whose geometry cannot be read are left untouched.
pub fn shrink_element(el: &mut Element, kind: ShapeKind, dx: f64, dy: f64) {
	match kind {
		ShapeKind::Ellipse => {
			let (Some(rx), Some(ry)) = (
				el.attr("rx").and_then(leading_float),
				el.attr("ry").and_then(leading_float),
			) else {
				return;
			};
			if let Shape::Ellipse { rx, ry } = shrink(Shape::Ellipse { rx, ry }, dx, dy) {
				el.set_attr("rx", rx.to_string());
				el.set_attr("ry", ry.to_string());
			}
		}
		ShapeKind::Polygon => {
			let Some(points) = el.attr("points").and_then(parse_points) else {
				return;
			};
			if let Shape::Polygon(points) = shrink(Shape::Polygon(points), dx, dy) {
				el.set_attr("points", format_points(&points));
			}
		}
		ShapeKind::Path => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn converts_units() {
		assert_eq!(unit_to_px("12px"), 12.0);
		assert_eq!(unit_to_px("2pt"), 65.0);
		assert_eq!(unit_to_px("0.125pt"), 4.0625);
		assert_eq!(unit_to_px("3em"), 3.0);
		assert_eq!(unit_to_px("7"), 7.0);
		assert_eq!(unit_to_px("wide"), 0.0);
		assert_eq!(Length::Number(1.5).to_px(), 1.5);
	}

	#[test]
	fn ellipse_radii_shrink_without_clamping() {
		let shape = shrink(Shape::Ellipse { rx: 27.0, ry: 18.0 }, 2.0, 20.0);
		assert_eq!(shape, Shape::Ellipse { rx: 25.0, ry: -2.0 });
	}

	#[test]
	fn rectangle_insets_toward_fixed_center() {
		let rect = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 20.0), (0.0, 20.0)];
		let Shape::Polygon(out) = shrink(Shape::Polygon(rect.clone()), 1.0, 2.0) else {
			panic!("polygon expected");
		};
		assert_eq!(out, vec![(1.0, 2.0), (9.0, 2.0), (9.0, 18.0), (1.0, 18.0)]);
		assert_eq!(
			BBox::of_points(&out).unwrap().center(),
			BBox::of_points(&rect).unwrap().center()
		);
	}

	#[test]
	fn degenerate_polygon_axis_is_left_alone() {
		let line = vec![(0.0, 5.0), (10.0, 5.0)];
		let Shape::Polygon(out) = shrink(Shape::Polygon(line), 1.0, 1.0) else {
			panic!("polygon expected");
		};
		assert_eq!(out, vec![(1.0, 5.0), (9.0, 5.0)]);
	}

	#[test]
	fn paths_are_untouched() {
		assert_eq!(shrink(Shape::Path, 3.0, 3.0), Shape::Path);
		let mut path = Element::new("path").with_attr("d", "M0,0L1,1");
		shrink_element(&mut path, ShapeKind::Path, 3.0, 3.0);
		assert_eq!(path.attr("d"), Some("M0,0L1,1"));
	}

	#[test]
	fn shrinks_element_attributes() {
		let mut poly = Element::new("polygon").with_attr("points", "0,0 4,0 4,-4 0,-4 0,0");
		shrink_element(&mut poly, ShapeKind::Polygon, 1.0, 1.0);
		assert_eq!(poly.attr("points"), Some("1,-1 3,-1 3,-3 1,-3 1,-1"));

		let mut ellipse = Element::new("ellipse")
			.with_attr("rx", "27")
			.with_attr("ry", "18");
		shrink_element(&mut ellipse, ShapeKind::Ellipse, 0.5, 0.5);
		assert_eq!(ellipse.attr("rx"), Some("26.5"));
		assert_eq!(ellipse.attr("ry"), Some("17.5"));
	}
}

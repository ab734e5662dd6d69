//! Selected/unselected recoloring of nodes and edges.

use std::sync::OnceLock;

use palette::{Mix, Srgb, named};
use regex::Regex;

use super::geometry::ShapeKind;
use super::types::GraphElement;

/// Maps an original color and the diagram background to the displayed color.
pub trait HighlightPolicy {
	fn selected(&self, color: &str, _background: Option<&str>) -> String {
		color.to_string()
	}

	fn unselected(&self, color: &str, background: Option<&str>) -> String;
}

/// Fades everything that is not selected toward the background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DimUnselected {
	/// 0 keeps the color, 1 turns it into the background.
	pub amount: f32,
}

impl Default for DimUnselected {
	fn default() -> Self {
		Self { amount: 0.9 }
	}
}

impl HighlightPolicy for DimUnselected {
	fn unselected(&self, color: &str, background: Option<&str>) -> String {
		blend(color, background.unwrap_or("white"), self.amount).unwrap_or_else(|| color.to_string())
	}
}

fn re_rgb() -> &'static Regex {
	static ONCE: OnceLock<Regex> = OnceLock::new();
	ONCE.get_or_init(|| {
		Regex::new(r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,[^)]*)?\)$").unwrap()
	})
}

/// Parses `#rgb`, `#rrggbb`, `rgb(r, g, b)` and CSS color names.
pub fn parse_color(color: &str) -> Option<Srgb<u8>> {
	let color = color.trim();
	if color.starts_with('#') {
		return color.parse().ok();
	}
	if let Some(caps) = re_rgb().captures(color) {
		let channel = |i: usize| caps.get(i)?.as_str().parse::<u8>().ok();
		return Some(Srgb::new(channel(1)?, channel(2)?, channel(3)?));
	}
	named::from_str(&color.to_ascii_lowercase())
}

pub fn to_hex(color: Srgb<u8>) -> String {
	format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// Linear sRGB transition from `color` toward `target`; `None` if either
/// side is not a color (`none`, `transparent`, ...).
pub fn blend(color: &str, target: &str, amount: f32) -> Option<String> {
	let from = parse_color(color)?.into_format::<f32>();
	let to = parse_color(target)?.into_format::<f32>();
	Some(to_hex(from.mix(to, amount).into_format()))
}

/// Recolors every primitive of `item` from its captured originals. Path
/// fills are left alone: a path's fill region carries no meaning in
/// Graphviz output.
pub fn recolor(item: &mut GraphElement, transform: impl Fn(&str) -> String) {
	let GraphElement { element, shapes, .. } = item;
	for shape in shapes.iter() {
		let Some(el) = element.at_path_mut(&shape.path) else {
			continue;
		};
		if let Some(fill) = &shape.original.fill {
			if shape.kind != ShapeKind::Path {
				el.set_attr("fill", transform(fill));
			}
		}
		if let Some(stroke) = &shape.original.stroke {
			el.set_attr("stroke", transform(stroke));
		}
	}
}

/// Writes the captured fill and stroke back.
pub fn restore(item: &mut GraphElement) {
	let GraphElement { element, shapes, .. } = item;
	for shape in shapes.iter() {
		let Some(el) = element.at_path_mut(&shape.path) else {
			continue;
		};
		if let Some(fill) = &shape.original.fill {
			el.set_attr("fill", fill.as_str());
		}
		if let Some(stroke) = &shape.original.stroke {
			el.set_attr("stroke", stroke.as_str());
		}
	}
}

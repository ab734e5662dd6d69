use super::markup::Element;

/// Tooltip widget hooks. Each hook gets the `<a title="...">` anchor the
/// tooltip belongs to; the widget itself lives outside this crate.
pub trait TooltipAdapter {
	fn init(&mut self, _anchor: &mut Element) {}

	fn show(&mut self, anchor: &mut Element);

	fn hide(&mut self, anchor: &mut Element);

	/// Called after every zoom change with the new percentage.
	fn update(&mut self, _anchor: &mut Element, _zoom: f64) {}
}

pub const KEEP_VISIBLE: &str = "data-tooltip-keepvisible";
pub const VISIBLE: &str = "data-tooltip-visible";

/// Marks anchors with data attributes and leaves the drawing to CSS.
/// Shown tooltips stay visible until explicitly hidden.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeepVisibleTooltips;

impl TooltipAdapter for KeepVisibleTooltips {
	fn init(&mut self, anchor: &mut Element) {
		anchor.set_attr("data-toggle", "tooltip");
	}

	fn show(&mut self, anchor: &mut Element) {
		anchor.set_attr(KEEP_VISIBLE, "true");
		anchor.set_attr(VISIBLE, "true");
	}

	fn hide(&mut self, anchor: &mut Element) {
		anchor.remove_attr(KEEP_VISIBLE);
		anchor.remove_attr(VISIBLE);
	}

	fn update(&mut self, anchor: &mut Element, _zoom: f64) {
		if anchor.attr(KEEP_VISIBLE).is_some() {
			anchor.set_attr(VISIBLE, "true");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn show_hide_cycle() {
		let mut tips = KeepVisibleTooltips;
		let mut a = Element::new("a").with_attr("title", "hello");
		tips.init(&mut a);
		assert_eq!(a.attr("data-toggle"), Some("tooltip"));

		tips.show(&mut a);
		assert_eq!(a.attr(KEEP_VISIBLE), Some("true"));
		a.remove_attr(VISIBLE);
		tips.update(&mut a, 150.0);
		assert_eq!(a.attr(VISIBLE), Some("true"));

		tips.hide(&mut a);
		assert_eq!(a.attr(KEEP_VISIBLE), None);
		tips.update(&mut a, 100.0);
		assert_eq!(a.attr(VISIBLE), None);
	}
}

//! Percentage zoom with the point under the pointer held in place.
//!
//! Pure calculation; the component measures the DOM and applies the outcome.

use super::markup::Element;

/// Never zoom out past the natural size.
pub const MIN_PERCENTAGE: f64 = 100.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub left: f64,
	pub top: f64,
	pub width: f64,
	pub height: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ZoomState {
	pub base_width: Option<String>,
	pub base_height: Option<String>,
	pub percentage: f64,
}

/// A wheel event, already in page coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelGesture {
	/// Wheel travel as the browser reports it; scrolling down is positive and zooms out.
	pub delta: f64,
	/// Percentage points per unit of `delta`.
	pub delta_factor: f64,
	/// Whether the zoom modifier (shift) is held.
	pub modifier: bool,
	pub pointer: (f64, f64),
	/// Rendered box of the `<svg>`.
	pub diagram: Rect,
	/// Box of the scrollable host frame.
	pub frame: Rect,
}

/// Where the pointer sits: as a fraction of the diagram, and in pixels
/// inside the frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerAnchor {
	pub rx: f64,
	pub ry: f64,
	pub px: f64,
	pub py: f64,
}

impl PointerAnchor {
	pub fn capture(pointer: (f64, f64), diagram: Rect, frame: Rect) -> Self {
		let ratio = |offset: f64, extent: f64| if extent > 0.0 { offset / extent } else { 0.0 };
		Self {
			rx: ratio(pointer.0 - diagram.left, diagram.width),
			ry: ratio(pointer.1 - diagram.top, diagram.height),
			px: pointer.0 - frame.left,
			py: pointer.1 - frame.top,
		}
	}

	/// Frame scroll offsets that put the same diagram fraction back under the pointer.
	pub fn scroll_for(&self, width: f64, height: f64) -> (f64, f64) {
		(self.rx * width - self.px, self.ry * height - self.py)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomOutcome {
	pub percentage: f64,
	pub anchor: PointerAnchor,
	pub scroll_left: f64,
	pub scroll_top: f64,
}

#[derive(Clone, Debug)]
pub struct ViewportController {
	state: ZoomState,
}

impl ViewportController {
	/// Remembers the natural size of `svg` and switches it to percentage sizing at 100%.
	pub fn initialize(svg: &mut Element) -> Self {
		let mut this = Self {
			state: ZoomState {
				base_width: svg.attr("width").map(str::to_string),
				base_height: svg.attr("height").map(str::to_string),
				percentage: MIN_PERCENTAGE,
			},
		};
		this.set_scale(svg, MIN_PERCENTAGE);
		this
	}

	pub fn state(&self) -> &ZoomState {
		&self.state
	}

	pub fn percentage(&self) -> f64 {
		self.state.percentage
	}

	/// Sizes `svg` to `percentage`, floored at `MIN_PERCENTAGE`, and returns
	/// the percentage actually applied. Non-finite input keeps the current one.
	pub fn set_scale(&mut self, svg: &mut Element, percentage: f64) -> f64 {
		let percentage = if percentage.is_finite() {
			percentage.max(MIN_PERCENTAGE)
		} else {
			self.state.percentage
		};
		svg.set_attr("width", format!("{percentage}%"));
		svg.set_attr("height", format!("{percentage}%"));
		self.state.percentage = percentage;
		percentage
	}

	pub fn next_percentage(&self, delta: f64, delta_factor: f64) -> f64 {
		(self.state.percentage - delta * delta_factor).max(MIN_PERCENTAGE)
	}

	/// Applies a modified wheel gesture. The rendered size is assumed to
	/// scale linearly with the percentage; `None` when the modifier is up.
	pub fn on_wheel(&mut self, svg: &mut Element, gesture: &WheelGesture) -> Option<ZoomOutcome> {
		if !gesture.modifier {
			return None;
		}
		let before = self.state.percentage;
		let next = self.next_percentage(gesture.delta, gesture.delta_factor);
		let anchor = PointerAnchor::capture(gesture.pointer, gesture.diagram, gesture.frame);
		let percentage = self.set_scale(svg, next);

		let ratio = percentage / before;
		let (scroll_left, scroll_top) =
			anchor.scroll_for(gesture.diagram.width * ratio, gesture.diagram.height * ratio);
		Some(ZoomOutcome {
			percentage,
			anchor,
			scroll_left,
			scroll_top,
		})
	}
}

use serde::Deserialize;

use super::error::Result;
use super::geometry::Length;
use super::highlight::{DimUnselected, HighlightPolicy};
use super::state::GraphvizSvg;
use super::tooltip::{KeepVisibleTooltips, TooltipAdapter};

/// Node outline margin: one length for both axes or one per axis.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Shrink {
	Axes { x: Length, y: Length },
	Uniform(Length),
}

impl Shrink {
	pub fn to_px(&self) -> (f64, f64) {
		match self {
			Shrink::Axes { x, y } => (x.to_px(), y.to_px()),
			Shrink::Uniform(v) => {
				let v = v.to_px();
				(v, v)
			}
		}
	}
}

/// Declarative options; loadable from JSON.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Options {
	/// Fetch the markup from here. Takes precedence over `svg`.
	pub url: Option<String>,
	/// Inline markup.
	pub svg: Option<String>,
	pub shrink: Option<Shrink>,
	/// Shift+wheel zoom.
	pub zoom: bool,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			url: None,
			svg: None,
			shrink: Some(Shrink::Uniform(Length::from("0.125pt"))),
			zoom: true,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
	Url(String),
	Inline(String),
}

impl Options {
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn source(&self) -> Option<Source> {
		match (&self.url, &self.svg) {
			(Some(url), _) => Some(Source::Url(url.clone())),
			(None, Some(svg)) => Some(Source::Inline(svg.clone())),
			(None, None) => None,
		}
	}

	pub fn shrink_px(&self) -> Option<(f64, f64)> {
		self.shrink.as_ref().map(Shrink::to_px)
	}
}

pub type ReadyHook = Box<dyn FnOnce(&mut GraphvizSvg)>;

/// Behavior injected at construction: tooltip widget, highlight colors and
/// a one-shot callback once setup is complete.
pub struct Hooks {
	pub tooltips: Option<Box<dyn TooltipAdapter>>,
	pub highlight: Box<dyn HighlightPolicy>,
	pub ready: Option<ReadyHook>,
}

impl Default for Hooks {
	fn default() -> Self {
		Self {
			tooltips: Some(Box::new(KeepVisibleTooltips)),
			highlight: Box::new(DimUnselected::default()),
			ready: None,
		}
	}
}

impl Hooks {
	pub fn without_tooltips(mut self) -> Self {
		self.tooltips = None;
		self
	}

	pub fn with_tooltips(mut self, tooltips: impl TooltipAdapter + 'static) -> Self {
		self.tooltips = Some(Box::new(tooltips));
		self
	}

	pub fn with_highlight(mut self, highlight: impl HighlightPolicy + 'static) -> Self {
		self.highlight = Box::new(highlight);
		self
	}

	pub fn on_ready(mut self, ready: impl FnOnce(&mut GraphvizSvg) + 'static) -> Self {
		self.ready = Some(Box::new(ready));
		self
	}
}

mod adjacency;
mod component;
mod error;
mod fetch;
pub mod geometry;
mod highlight;
mod index;
pub mod markup;
mod options;
mod state;
mod tooltip;
mod types;
pub mod viewport;

pub use adjacency::{Direction, Link, Linked};
pub use component::{GraphvizHandle, GraphvizSvgView};
pub use error::{Error, Result};
pub use fetch::fetch_markup;
pub use highlight::{DimUnselected, HighlightPolicy, blend, parse_color};
pub use index::{ElementIndex, Scene, logical_name};
pub use options::{Hooks, Options, ReadyHook, Shrink, Source};
pub use state::GraphvizSvg;
pub use tooltip::{KeepVisibleTooltips, TooltipAdapter};
pub use types::{Colors, ElementKind, GraphElement, ItemId, Layer, ShapeRecord};

pub type Result<T> = std::result::Result<T, Error>;

/// Failures while loading a diagram. Everything after setup is permissive and never fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid SVG markup: {0}")]
	Xml(#[from] roxmltree::Error),

	#[error("markup contains no <svg> element")]
	MissingSvg,

	#[error("<svg> has no top-level <g> graph group")]
	MissingGraph,

	#[error("failed to fetch {url}: {message}")]
	Fetch { url: String, message: String },

	#[error("invalid options: {0}")]
	Options(#[from] serde_json::Error),
}

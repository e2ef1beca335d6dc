//! Errors raised at the host-page boundary.
//!
//! Only loading graph data or configuration out of the page can fail; the
//! constellation itself treats dangling links and empty graphs as normal input.

/// Errors that can occur while reading data provided by the host page.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
	/// No browser window or document is available.
	#[error("no browser window available")]
	MissingWindow,

	/// The expected element is not present in the document.
	#[error("element '#{0}' not found")]
	MissingElement(&'static str),

	/// The element exists but is not a `<script>` tag.
	#[error("element '#{0}' is not a script element")]
	NotAScript(&'static str),

	/// The configuration parsed but describes unusable values.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// The payload is not valid JSON for the expected shape.
	#[error("invalid JSON payload: {0}")]
	Parse(#[from] serde_json::Error),
}

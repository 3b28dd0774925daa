/// Errors surfaced to the user by the presentation engine.
///
/// None of these are fatal: the scene that was loaded before the failure
/// stays in place and the view remains interactive.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
	/// The document is valid JSON but not a usable graph.
	#[error("Invalid document: {0}")]
	InvalidDocument(String),

	/// The raw text could not be parsed as JSON.
	#[error("Invalid JSON: {0}")]
	Parse(String),

	/// The external data provider failed to deliver a document.
	#[error("Data provider error: {0}")]
	DataProvider(String),
}

impl From<serde_json::Error> for EngineError {
	fn from(err: serde_json::Error) -> Self {
		Self::Parse(err.to_string())
	}
}

/// Engine result alias.
pub type Result<T> = std::result::Result<T, EngineError>;

//! External document sources.

use gloo_net::http::Request;
use log::error;

use super::error::{EngineError, Result};
use super::loader::DocumentLoader;
use super::types::GraphDocument;

/// Something that can hand over a serialized graph document.
#[allow(async_fn_in_trait)]
pub trait DataProvider {
	async fn fetch_document(&self) -> Result<String>;
}

/// Fetches the document over HTTP.
#[derive(Clone, Debug)]
pub struct HttpProvider {
	url: String,
}

impl HttpProvider {
	pub fn new(url: impl Into<String>) -> Self {
		Self { url: url.into() }
	}
}

impl DataProvider for HttpProvider {
	async fn fetch_document(&self) -> Result<String> {
		let resp = Request::get(&self.url)
			.send()
			.await
			.map_err(|e| EngineError::DataProvider(format!("{}: {e}", self.url)))?;
		if !resp.ok() {
			return Err(EngineError::DataProvider(format!(
				"{}: HTTP {} {}",
				self.url,
				resp.status(),
				resp.status_text()
			)));
		}
		resp.text()
			.await
			.map_err(|e| EngineError::DataProvider(format!("{}: {e}", self.url)))
	}
}

/// Fetches and validates a document without touching any scene.
///
/// Transport failures and malformed bodies both come back as errors, so the
/// caller can leave its current scene in place either way.
pub async fn fetch_document<P: DataProvider>(
	provider: &P,
	loader: &DocumentLoader,
) -> Result<GraphDocument> {
	let result = match provider.fetch_document().await {
		Ok(text) => loader.load_str(&text),
		Err(err) => Err(err),
	};
	if let Err(err) = &result {
		error!("error loading graph document: {err}");
	}
	result
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;

	use super::*;

	struct Fixed(Result<String>);

	impl DataProvider for Fixed {
		async fn fetch_document(&self) -> Result<String> {
			self.0.clone()
		}
	}

	#[test]
	fn valid_body_is_loaded() {
		let provider = Fixed(Ok(r#"{"nodes":[{"id":"a"}],"edges":[]}"#.into()));
		let doc = block_on(fetch_document(&provider, &DocumentLoader::default())).unwrap();
		assert_eq!(doc.nodes.len(), 1);
	}

	#[test]
	fn provider_failure_is_reported() {
		let provider = Fixed(Err(EngineError::DataProvider("HTTP 500".into())));
		let err = block_on(fetch_document(&provider, &DocumentLoader::default())).unwrap_err();
		assert_eq!(err, EngineError::DataProvider("HTTP 500".into()));
	}

	#[test]
	fn malformed_body_is_a_recoverable_error() {
		let provider = Fixed(Ok("<html>oops</html>".into()));
		let err = block_on(fetch_document(&provider, &DocumentLoader::default())).unwrap_err();
		assert!(matches!(err, EngineError::Parse(_)));
	}
}

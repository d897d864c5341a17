use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use crate::error::{IngestionError, Result};

fn fetch_error(value: JsValue) -> IngestionError {
	IngestionError::Fetch(
		value
			.as_string()
			.unwrap_or_else(|| format!("{:?}", value)),
	)
}

/// Fetches `url` relative to the page and returns the body as text.
pub async fn fetch_text(url: &str) -> Result<String> {
	let window = web_sys::window().ok_or_else(|| IngestionError::Fetch("no window".into()))?;
	let response = JsFuture::from(window.fetch_with_str(url))
		.await
		.map_err(fetch_error)?;
	let response: Response = response.dyn_into().map_err(fetch_error)?;
	if !response.ok() {
		return Err(IngestionError::Fetch(format!(
			"{} returned HTTP {}",
			url,
			response.status()
		)));
	}
	let body = JsFuture::from(response.text().map_err(fetch_error)?)
		.await
		.map_err(fetch_error)?;
	body.as_string()
		.ok_or_else(|| IngestionError::Fetch(format!("{} body is not text", url)))
}

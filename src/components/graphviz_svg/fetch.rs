use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::error::{Error, Result};

fn fetch_error(url: &str, err: JsValue) -> Error {
	Error::Fetch {
		url: url.to_string(),
		message: err
			.as_string()
			.unwrap_or_else(|| format!("{err:?}")),
	}
}

/// GETs `url` and returns the body as text. No retry, no timeout.
pub async fn fetch_markup(url: &str) -> Result<String> {
	let window = web_sys::window().ok_or_else(|| fetch_error(url, JsValue::from_str("no window")))?;
	let promise: js_sys::Promise = window.fetch_with_str(url);
	let response: Response = JsFuture::from(promise)
		.await
		.map_err(|e| fetch_error(url, e))?
		.dyn_into()
		.map_err(|e| fetch_error(url, e))?;
	if !response.ok() {
		return Err(Error::Fetch {
			url: url.to_string(),
			message: format!("HTTP {}", response.status()),
		});
	}
	let text = JsFuture::from(response.text().map_err(|e| fetch_error(url, e))?)
		.await
		.map_err(|e| fetch_error(url, e))?;
	text.as_string()
		.ok_or_else(|| fetch_error(url, JsValue::from_str("response body is not text")))
}

use reqwest::{Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::client::ApiRequest;

/// The shape every API failure is normalized into before it reaches the
/// caller (and the global error hook): a message plus the status, URL and
/// method of the call that produced it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
	pub message: String,
	/// Raw JSON error body, when the server sent one
	pub json: Option<Value>,
	pub status: u16,
	pub url: Option<String>,
	pub method: Option<Method>,
	/// Marks errors already normalized by the client, as opposed to raw
	/// errors bubbling up from elsewhere in an application
	pub handled: bool,
}

impl ApiError {
	/// Build an error from a non-2xx/3xx response. The message is read from
	/// the body's `message` field, falling back to its `error` field and
	/// then to the canonical status reason.
	pub(crate) fn from_response(
		req: &ApiRequest,
		url: &Url,
		status: u16,
		body: Option<String>,
	) -> Self {
		let json = body.and_then(|text| serde_json::from_str::<Value>(&text).ok());

		let message = json
			.as_ref()
			.and_then(|json| {
				json.get("message")
					.and_then(Value::as_str)
					.or_else(|| json.get("error").and_then(Value::as_str))
					.map(str::to_string)
			})
			.or_else(|| {
				StatusCode::from_u16(status)
					.ok()
					.and_then(|status| status.canonical_reason())
					.map(str::to_string)
			})
			.unwrap_or_else(|| "Request failed".to_string());

		Self {
			message,
			json,
			status,
			url: Some(url.to_string()),
			method: Some(req.method.clone()),
			handled: true,
		}
	}

	pub(crate) fn request_failed(req: &ApiRequest, url: &Url) -> Self {
		Self {
			message: "Failed to send request".to_string(),
			json: None,
			status: 400,
			url: Some(url.to_string()),
			method: Some(req.method.clone()),
			handled: true,
		}
	}

	pub(crate) fn invalid_body(req: &ApiRequest) -> Self {
		Self {
			message: "Invalid JSON body".to_string(),
			json: None,
			status: 400,
			url: Some(req.url.clone()),
			method: Some(req.method.clone()),
			handled: true,
		}
	}

	pub(crate) fn invalid_url(req: &ApiRequest) -> Self {
		Self {
			message: "Invalid request URL".to_string(),
			json: None,
			status: 400,
			url: Some(req.url.clone()),
			method: Some(req.method.clone()),
			handled: true,
		}
	}

	pub(crate) fn decode(req: &ApiRequest, error: &serde_json::Error) -> Self {
		Self {
			message: format!("Failed to decode response body: {error}"),
			json: None,
			status: 400,
			url: Some(req.url.clone()),
			method: Some(req.method.clone()),
			handled: true,
		}
	}

	pub(crate) fn from_message(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			json: None,
			status: 400,
			url: None,
			method: None,
			handled: true,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn request() -> (ApiRequest, Url) {
		(
			ApiRequest::get("tables/ta_1"),
			Url::parse("http://localhost:5000/tables/ta_1").unwrap(),
		)
	}

	#[test]
	fn message_is_read_from_the_message_field() {
		let (req, url) = request();
		let error = ApiError::from_response(
			&req,
			&url,
			404,
			Some(json!({ "message": "The requested table does not exist", "status": 404 }).to_string()),
		);

		assert_eq!(error.message, "The requested table does not exist");
		assert_eq!(error.status, 404);
		assert_eq!(error.method, Some(Method::GET));
		assert!(error.handled);
	}

	#[test]
	fn message_falls_back_to_the_error_field() {
		let (req, url) = request();
		let error =
			ApiError::from_response(&req, &url, 400, Some(json!({ "error": "bad id" }).to_string()));

		assert_eq!(error.message, "bad id");
		assert_eq!(error.json, Some(json!({ "error": "bad id" })));
	}

	#[test]
	fn message_falls_back_to_the_status_reason() {
		let (req, url) = request();

		let error = ApiError::from_response(&req, &url, 502, Some("<html>".to_string()));
		assert_eq!(error.message, "Bad Gateway");
		assert!(error.json.is_none());

		let error = ApiError::from_response(&req, &url, 599, None);
		assert_eq!(error.message, "Request failed");
	}
}

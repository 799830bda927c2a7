use anyhow::Result;
use reqwest::{
	header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
	Client, Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use url::Url;

use gridbase_core::http::{API_VERSION, API_VERSION_HEADER};

use crate::error::ApiError;

type AttachHeaders = Arc<dyn Fn(&mut HeaderMap) + Send + Sync>;
type OnError = Arc<dyn Fn(&ApiError) + Send + Sync>;

#[derive(Clone, Default)]
struct Config {
	enable_caching: bool,
	attach_headers: Option<AttachHeaders>,
	on_error: Option<OnError>,
}

/// Builds an [`ApiClient`] for the platform at the given base URL.
pub struct ApiClientBuilder {
	base_url: Url,
	config: Config,
}

impl ApiClientBuilder {
	/// Certain definitions can't change at runtime for client apps, such as
	/// the schema of tables, and calls marked as cacheable only memoize
	/// their responses once this is switched on. It's disabled by default
	/// to avoid bugs with stale data.
	#[must_use]
	pub fn enable_caching(mut self) -> Self {
		self.config.enable_caching = true;
		self
	}

	/// Register a hook invoked with the header map of every outgoing
	/// request, to attach extra headers.
	#[must_use]
	pub fn attach_headers(mut self, hook: impl Fn(&mut HeaderMap) + Send + Sync + 'static) -> Self {
		self.config.attach_headers = Some(Arc::new(hook));
		self
	}

	/// Register a hook invoked with every [`ApiError`] before it propagates
	/// up the stack.
	#[must_use]
	pub fn on_error(mut self, hook: impl Fn(&ApiError) + Send + Sync + 'static) -> Self {
		self.config.on_error = Some(Arc::new(hook));
		self
	}

	/// Construct the client.
	///
	/// # Errors
	///
	/// Returns an error if the base URL cannot host paths, or if the
	/// underlying HTTP client fails to initialize.
	pub fn build(self) -> Result<ApiClient> {
		if self.base_url.cannot_be_a_base() {
			anyhow::bail!("base URL must be able to host paths");
		}

		let mut headers = HeaderMap::new();
		headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

		Ok(ApiClient {
			http: Client::builder()
				.user_agent(format!("gridbase-client/{}", env!("CARGO_PKG_VERSION")))
				.default_headers(headers)
				.build()?,
			base_url: self.base_url,
			config: self.config,
			cache: RwLock::new(HashMap::new()),
		})
	}
}

/// A client for the platform API. The per-resource methods live in
/// `endpoints`; everything funnels through [`ApiClient::call`].
pub struct ApiClient {
	http: Client,
	base_url: Url,
	config: Config,
	cache: RwLock<HashMap<String, Value>>,
}

/// Descriptor for a single API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
	pub(crate) method: Method,
	pub(crate) url: String,
	pub(crate) body: Option<String>,
	pub(crate) external: bool,
	pub(crate) cache: bool,
}

impl ApiRequest {
	fn new(method: Method, url: impl Into<String>) -> Self {
		Self {
			method,
			url: url.into(),
			body: None,
			external: false,
			cache: false,
		}
	}

	#[must_use]
	pub fn get(url: impl Into<String>) -> Self {
		Self::new(Method::GET, url)
	}

	#[must_use]
	pub fn post(url: impl Into<String>) -> Self {
		Self::new(Method::POST, url)
	}

	#[must_use]
	pub fn put(url: impl Into<String>) -> Self {
		Self::new(Method::PUT, url)
	}

	#[must_use]
	pub fn patch(url: impl Into<String>) -> Self {
		Self::new(Method::PATCH, url)
	}

	#[must_use]
	pub fn delete(url: impl Into<String>) -> Self {
		Self::new(Method::DELETE, url)
	}

	/// Attach a JSON body to the request.
	///
	/// # Errors
	///
	/// Returns an error if the body cannot be serialized.
	pub fn body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
		match serde_json::to_string(body) {
			Ok(serialized) => {
				self.body = Some(serialized);
				Ok(self)
			},
			Err(_) => Err(ApiError::invalid_body(&self)),
		}
	}

	/// Mark the URL as external: it is used verbatim instead of being
	/// joined onto the platform base, and no platform version header is
	/// sent.
	#[must_use]
	pub const fn external(mut self) -> Self {
		self.external = true;
		self
	}

	/// Mark the response as memoizable. Only honored when the client was
	/// built with caching enabled.
	#[must_use]
	pub const fn cached(mut self) -> Self {
		self.cache = true;
		self
	}
}

impl ApiClient {
	#[must_use]
	pub fn builder(base_url: Url) -> ApiClientBuilder {
		ApiClientBuilder {
			base_url,
			config: Config::default(),
		}
	}

	/// Construct a synthetic [`ApiError`], for application code that wants
	/// to raise errors shaped like the client's own.
	#[must_use]
	pub fn error(message: impl Into<String>) -> ApiError {
		ApiError::from_message(message)
	}

	/// Perform an API call and decode the JSON response.
	///
	/// # Errors
	///
	/// Returns an error for transport failures, non-2xx/3xx responses and
	/// undecodable bodies, after invoking the `on_error` hook if one is
	/// registered.
	pub async fn call<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, ApiError> {
		let result = self.dispatch(&req).await.and_then(|value| {
			serde_json::from_value(value).map_err(|e| ApiError::decode(&req, &e))
		});

		result.map_err(|error| self.report(error))
	}

	/// Perform an API call and return the raw response body, for endpoints
	/// that don't speak JSON.
	///
	/// # Errors
	///
	/// Returns an error for transport failures and non-2xx/3xx responses,
	/// after invoking the `on_error` hook if one is registered.
	pub async fn call_raw(&self, req: ApiRequest) -> Result<String, ApiError> {
		let result = match self.resolve(&req) {
			Ok(url) => self.fetch(&req, url).await,
			Err(error) => Err(error),
		};

		result.map_err(|error| self.report(error))
	}

	pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
		self.call(ApiRequest::get(url)).await
	}

	pub async fn post<T: DeserializeOwned>(
		&self,
		url: &str,
		body: &(impl Serialize + ?Sized),
	) -> Result<T, ApiError> {
		self.call(ApiRequest::post(url).body(body)?).await
	}

	pub async fn put<T: DeserializeOwned>(
		&self,
		url: &str,
		body: &(impl Serialize + ?Sized),
	) -> Result<T, ApiError> {
		self.call(ApiRequest::put(url).body(body)?).await
	}

	pub async fn patch<T: DeserializeOwned>(
		&self,
		url: &str,
		body: &(impl Serialize + ?Sized),
	) -> Result<T, ApiError> {
		self.call(ApiRequest::patch(url).body(body)?).await
	}

	pub async fn delete<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
		self.call(ApiRequest::delete(url)).await
	}

	/// Run the error hook before handing the error back to the caller.
	fn report(&self, error: ApiError) -> ApiError {
		if let Some(hook) = &self.config.on_error {
			hook(&error);
		}

		error
	}

	async fn dispatch(&self, req: &ApiRequest) -> Result<Value, ApiError> {
		let url = self.resolve(req)?;

		if req.cache && self.config.enable_caching {
			if let Some(cached) = self.cache.read().await.get(url.as_str()) {
				tracing::debug!("Serving {url} from the response cache");
				return Ok(cached.clone());
			}

			// Concurrent callers that miss here each fetch. The memoized
			// responses are immutable definitions, so last write wins with
			// the same value.
			let value = self.fetch_json(req, url.clone()).await?;
			self.cache
				.write()
				.await
				.insert(url.as_str().to_string(), value.clone());

			return Ok(value);
		}

		self.fetch_json(req, url).await
	}

	async fn fetch_json(&self, req: &ApiRequest, url: Url) -> Result<Value, ApiError> {
		let text = self.fetch(req, url).await?;

		// Empty bodies (204s and friends) decode as null.
		if text.is_empty() {
			return Ok(Value::Null);
		}

		serde_json::from_str(&text).map_err(|e| ApiError::decode(req, &e))
	}

	async fn fetch(&self, req: &ApiRequest, url: Url) -> Result<String, ApiError> {
		let mut headers = HeaderMap::new();
		if !req.external {
			headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
		}
		if req.body.is_some() {
			headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		}
		if let Some(hook) = &self.config.attach_headers {
			hook(&mut headers);
		}

		tracing::debug!("{} {url}", req.method);

		let mut request = self.http.request(req.method.clone(), url.clone()).headers(headers);
		if let Some(body) = &req.body {
			request = request.body(body.clone());
		}

		let response = request
			.send()
			.await
			.map_err(|_| ApiError::request_failed(req, &url))?;

		let status = response.status().as_u16();
		if (200..400).contains(&status) {
			response
				.text()
				.await
				.map_err(|_| ApiError::request_failed(req, &url))
		} else {
			let body = response.text().await.ok();
			Err(ApiError::from_response(req, &url, status, body))
		}
	}

	fn resolve(&self, req: &ApiRequest) -> Result<Url, ApiError> {
		if req.external {
			return Url::parse(&req.url).map_err(|_| ApiError::invalid_url(req));
		}

		Ok(self.internal_url(&req.url))
	}

	/// Join a relative path onto the base URL with exactly one slash
	/// between every segment.
	fn internal_url(&self, path: &str) -> Url {
		let mut url = self.base_url.clone();

		{
			// Guarded against cannot-be-a-base URLs when the client is built.
			let mut segments = url.path_segments_mut().unwrap();
			segments.pop_if_empty();
			segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
		}

		url
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn client(base: &str) -> ApiClient {
		ApiClient::builder(Url::parse(base).unwrap()).build().unwrap()
	}

	#[test]
	fn internal_urls_join_with_single_slashes() {
		let client = client("http://localhost:5000");

		assert_eq!(
			client.internal_url("tables/ta_1").as_str(),
			"http://localhost:5000/tables/ta_1"
		);
		assert_eq!(
			client.internal_url("/tables//ta_1").as_str(),
			"http://localhost:5000/tables/ta_1"
		);
	}

	#[test]
	fn internal_urls_respect_base_paths() {
		let client = client("http://localhost:5000/api/public/v1/");

		assert_eq!(
			client.internal_url("queries/search").as_str(),
			"http://localhost:5000/api/public/v1/queries/search"
		);
	}

	#[test]
	fn cannot_be_a_base_urls_are_rejected() {
		assert!(ApiClient::builder(Url::parse("data:text/plain,hi").unwrap())
			.build()
			.is_err());
	}

	#[test]
	fn verb_constructors_set_the_method() {
		assert_eq!(ApiRequest::get("x").method, Method::GET);
		assert_eq!(ApiRequest::post("x").method, Method::POST);
		assert_eq!(ApiRequest::put("x").method, Method::PUT);
		assert_eq!(ApiRequest::patch("x").method, Method::PATCH);
		assert_eq!(ApiRequest::delete("x").method, Method::DELETE);
	}

	#[test]
	fn synthetic_errors_are_handled() {
		let error = ApiClient::error("No datasource configured");

		assert_eq!(error.message, "No datasource configured");
		assert_eq!(error.status, 400);
		assert!(error.handled);
		assert!(error.url.is_none());
	}

	#[test]
	fn unserializable_bodies_are_reported() {
		let error = ApiRequest::post("queries/search")
			.body(&f64::NAN)
			.unwrap_err();

		assert_eq!(error.message, "Invalid JSON body");
		assert_eq!(error.status, 400);
		assert_eq!(error.url.as_deref(), Some("queries/search"));
	}

	#[test]
	fn external_requests_must_carry_absolute_urls() {
		let client = client("http://localhost:5000");

		let error = client
			.resolve(&ApiRequest::get("not-a-url").external())
			.unwrap_err();
		assert_eq!(error.message, "Invalid request URL");

		let url = client
			.resolve(&ApiRequest::get("https://api.example.com/things").external())
			.unwrap();
		assert_eq!(url.as_str(), "https://api.example.com/things");
	}
}

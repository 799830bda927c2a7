use std::sync::atomic::Ordering;

use aide::{
	axum::{
		routing::{get, post},
		ApiRouter,
	},
	openapi::OpenApi,
};
use axum::Extension;
use axum_jsonschema::Json;
use schemars::JsonSchema;
use serde_json::Value;

use gridbase_core::http::API_VERSION;

use crate::{
	executor::{Health, EXECUTOR_HEALTH},
	shutdown::Agent as Shutdown,
};

pub fn handler() -> ApiRouter {
	ApiRouter::new()
		.api_route("/", get(root))
		.api_route("/health-check", get(health_check))
		.api_route("/openapi.json", get(openapi))
		.api_route("/shutdown", post(shutdown))
}

#[derive(Debug, serde::Serialize, JsonSchema)]
pub struct RootResponse {
	/// Relative URL to the OpenAPI specification
	pub openapi_url: String,
	/// API version served by this instance
	pub version: String,
}

#[allow(clippy::unused_async)]
pub async fn root() -> Json<RootResponse> {
	Json(RootResponse {
		openapi_url: "/openapi.json".to_string(),
		version: API_VERSION.to_string(),
	})
}

#[derive(Debug, serde::Serialize, JsonSchema)]
pub struct HealthCheck {
	/// Current datasource health
	pub status: Health,
}

#[allow(clippy::unused_async)]
pub async fn health_check() -> Json<HealthCheck> {
	Json(HealthCheck {
		status: EXECUTOR_HEALTH.load(Ordering::SeqCst),
	})
}

#[allow(clippy::unused_async)]
pub async fn openapi(Extension(openapi): Extension<OpenApi>) -> Json<Value> {
	Json(serde_json::to_value(openapi).unwrap_or_default())
}

#[allow(clippy::unused_async)]
pub async fn shutdown(Extension(shutdown): Extension<Shutdown>) -> Json<String> {
	shutdown.start();

	Json(String::new())
}

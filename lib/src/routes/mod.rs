use aide::axum::ApiRouter;
use axum::{
	body::Body,
	headers::HeaderMapExt,
	http::{Request, StatusCode},
	middleware::Next,
	response::{IntoResponse, Response},
};

pub mod applications;
pub mod queries;
pub mod rows;
pub mod system;
pub mod tables;
pub mod users;

use crate::{errors::HTTPError, helpers::headers::ApiVersion};

pub fn handler() -> ApiRouter {
	ApiRouter::new()
		.merge(system::handler())
		.merge(applications::handler())
		.merge(tables::handler())
		.merge(rows::handler())
		.merge(users::handler())
		.merge(queries::read())
		.merge(queries::write())
}

/// Reject requests that pin an API version this server does not speak.
/// Requests without the header are served as the current version.
pub async fn require_supported_version(req: Request<Body>, next: Next<Body>) -> Response {
	if let Some(version) = req.headers().typed_get::<ApiVersion>() {
		if !version.is_supported() {
			tracing::debug!("Rejecting request with unsupported API version {}", version.0);

			return HTTPError::new(format!("Unsupported API version '{}'", version.0))
				.with_status(StatusCode::BAD_REQUEST)
				.into_response();
		}
	}

	next.run(req).await
}

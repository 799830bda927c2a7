use aide::axum::{
	routing::{get, post},
	ApiRouter,
};
use axum::{extract::Path, http::StatusCode, Extension};
use axum_jsonschema::Json;

use gridbase_core::{
	http::{ApplicationParams, SearchApplicationsResponse, SearchRequest},
	model::Application,
};

use crate::{errors::HTTPError, store};

pub fn handler() -> ApiRouter {
	ApiRouter::new()
		.api_route("/applications/search", post(search_applications))
		.api_route("/applications", post(create_application))
		.api_route(
			"/applications/:app_id",
			get(get_application)
				.put(update_application)
				.delete(delete_application),
		)
}

/// Search for applications by name.
pub async fn search_applications(
	Extension(store): store::Extension,
	Json(req): Json<SearchRequest>,
) -> Json<SearchApplicationsResponse> {
	Json(SearchApplicationsResponse {
		applications: store.search_applications(&req.name).await,
	})
}

pub async fn create_application(
	Extension(store): store::Extension,
	Json(params): Json<ApplicationParams>,
) -> (StatusCode, Json<Application>) {
	(
		StatusCode::CREATED,
		Json(store.create_application(params).await),
	)
}

pub async fn get_application(
	Path(app_id): Path<String>,
	Extension(store): store::Extension,
) -> Result<Json<Application>, HTTPError> {
	Ok(Json(store.get_application(&app_id).await?))
}

pub async fn update_application(
	Path(app_id): Path<String>,
	Extension(store): store::Extension,
	Json(params): Json<ApplicationParams>,
) -> Result<Json<Application>, HTTPError> {
	Ok(Json(store.update_application(&app_id, params).await?))
}

pub async fn delete_application(
	Path(app_id): Path<String>,
	Extension(store): store::Extension,
) -> Result<Json<Application>, HTTPError> {
	Ok(Json(store.delete_application(&app_id).await?))
}

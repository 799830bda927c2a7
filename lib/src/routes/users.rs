use aide::axum::{
	routing::{get, post},
	ApiRouter,
};
use axum::{extract::Path, http::StatusCode, Extension};
use axum_jsonschema::Json;

use gridbase_core::{
	http::{SearchRequest, SearchUsersResponse, UserParams},
	model::User,
};

use crate::{errors::HTTPError, store};

pub fn handler() -> ApiRouter {
	ApiRouter::new()
		.api_route("/users/search", post(search_users))
		.api_route("/users", post(create_user))
		.api_route(
			"/users/:user_id",
			get(get_user).put(update_user).delete(delete_user),
		)
}

/// Search for users by email prefix.
pub async fn search_users(
	Extension(store): store::Extension,
	Json(req): Json<SearchRequest>,
) -> Json<SearchUsersResponse> {
	Json(SearchUsersResponse {
		users: store.search_users(&req.name).await,
	})
}

pub async fn create_user(
	Extension(store): store::Extension,
	Json(params): Json<UserParams>,
) -> (StatusCode, Json<User>) {
	(StatusCode::CREATED, Json(store.create_user(params).await))
}

pub async fn get_user(
	Path(user_id): Path<String>,
	Extension(store): store::Extension,
) -> Result<Json<User>, HTTPError> {
	Ok(Json(store.get_user(&user_id).await?))
}

pub async fn update_user(
	Path(user_id): Path<String>,
	Extension(store): store::Extension,
	Json(params): Json<UserParams>,
) -> Result<Json<User>, HTTPError> {
	Ok(Json(store.update_user(&user_id, params).await?))
}

pub async fn delete_user(
	Path(user_id): Path<String>,
	Extension(store): store::Extension,
) -> Result<Json<User>, HTTPError> {
	Ok(Json(store.delete_user(&user_id).await?))
}

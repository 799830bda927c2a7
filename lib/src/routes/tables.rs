use aide::axum::{
	routing::{get, post},
	ApiRouter,
};
use axum::{extract::Path, http::StatusCode, Extension};
use axum_jsonschema::Json;

use gridbase_core::{
	http::{SearchRequest, SearchTablesResponse, TableParams},
	model::Table,
};

use crate::{errors::HTTPError, store};

pub fn handler() -> ApiRouter {
	ApiRouter::new()
		.api_route("/tables/search", post(search_tables))
		.api_route("/tables", post(create_table))
		.api_route(
			"/tables/:table_id",
			get(get_table).put(update_table).delete(delete_table),
		)
}

/// Search for tables by name.
pub async fn search_tables(
	Extension(store): store::Extension,
	Json(req): Json<SearchRequest>,
) -> Json<SearchTablesResponse> {
	Json(SearchTablesResponse {
		tables: store.search_tables(&req.name).await,
	})
}

pub async fn create_table(
	Extension(store): store::Extension,
	Json(params): Json<TableParams>,
) -> (StatusCode, Json<Table>) {
	(StatusCode::CREATED, Json(store.create_table(params).await))
}

/// Fetch a table definition. Definitions can't change at runtime for client
/// apps, which is why clients may cache this endpoint.
pub async fn get_table(
	Path(table_id): Path<String>,
	Extension(store): store::Extension,
) -> Result<Json<Table>, HTTPError> {
	Ok(Json(store.get_table(&table_id).await?))
}

pub async fn update_table(
	Path(table_id): Path<String>,
	Extension(store): store::Extension,
	Json(params): Json<TableParams>,
) -> Result<Json<Table>, HTTPError> {
	Ok(Json(store.update_table(&table_id, params).await?))
}

/// Delete a table and every row stored in it.
pub async fn delete_table(
	Path(table_id): Path<String>,
	Extension(store): store::Extension,
) -> Result<Json<Table>, HTTPError> {
	Ok(Json(store.delete_table(&table_id).await?))
}

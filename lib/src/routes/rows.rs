use aide::axum::{
	routing::{get, post},
	ApiRouter,
};
use axum::{extract::Path, http::StatusCode, Extension};
use axum_jsonschema::Json;

use gridbase_core::{
	http::{RowParams, SearchRowsRequest, SearchRowsResponse},
	model::Row,
};

use crate::{errors::HTTPError, store};

pub fn handler() -> ApiRouter {
	ApiRouter::new()
		.api_route("/tables/:table_id/rows/search", post(search_rows))
		.api_route("/tables/:table_id/rows", post(create_row))
		.api_route(
			"/tables/:table_id/rows/:row_id",
			get(get_row).put(update_row).delete(delete_row),
		)
}

/// Search a table's rows. Rows match when every filtered field equals the
/// given value; an empty filter returns the whole table.
pub async fn search_rows(
	Path(table_id): Path<String>,
	Extension(store): store::Extension,
	Json(filter): Json<SearchRowsRequest>,
) -> Result<Json<SearchRowsResponse>, HTTPError> {
	Ok(Json(SearchRowsResponse {
		rows: store.search_rows(&table_id, &filter).await?,
	}))
}

pub async fn create_row(
	Path(table_id): Path<String>,
	Extension(store): store::Extension,
	Json(fields): Json<RowParams>,
) -> Result<(StatusCode, Json<Row>), HTTPError> {
	let row = store.create_row(&table_id, fields).await?;

	Ok((StatusCode::CREATED, Json(row)))
}

pub async fn get_row(
	Path((table_id, row_id)): Path<(String, String)>,
	Extension(store): store::Extension,
) -> Result<Json<Row>, HTTPError> {
	Ok(Json(store.get_row(&table_id, &row_id).await?))
}

pub async fn update_row(
	Path((table_id, row_id)): Path<(String, String)>,
	Extension(store): store::Extension,
	Json(fields): Json<RowParams>,
) -> Result<Json<Row>, HTTPError> {
	Ok(Json(store.update_row(&table_id, &row_id, fields).await?))
}

pub async fn delete_row(
	Path((table_id, row_id)): Path<(String, String)>,
	Extension(store): store::Extension,
) -> Result<Json<Row>, HTTPError> {
	Ok(Json(store.delete_row(&table_id, &row_id).await?))
}

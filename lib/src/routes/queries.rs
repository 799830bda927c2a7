use aide::axum::{routing::post, ApiRouter};
use axum::{extract::Path, Extension};
use axum_jsonschema::Json;
use serde_json::Value;

use gridbase_core::http::{ExecuteQueryRequest, SearchQueriesResponse, SearchRequest};

use crate::{errors::HTTPError, executor, store};

/// Query routes that only read platform state.
pub fn read() -> ApiRouter {
	ApiRouter::new().api_route("/queries/search", post(search_queries))
}

/// Executing a query may write through to the datasource, so the execute
/// route is classified as a write.
pub fn write() -> ApiRouter {
	ApiRouter::new().api_route("/queries/:query_id", post(execute_query))
}

/// Search for queries by name.
pub async fn search_queries(
	Extension(store): store::Extension,
	Json(req): Json<SearchRequest>,
) -> Json<SearchQueriesResponse> {
	Json(SearchQueriesResponse {
		queries: store.search_queries(&req.name).await,
	})
}

/// Execute a query and return its result rows.
pub async fn execute_query(
	Path(query_id): Path<String>,
	Extension(store): store::Extension,
	Extension(executor): executor::Extension,
	Json(req): Json<ExecuteQueryRequest>,
) -> Result<Json<Vec<Value>>, HTTPError> {
	tracing::debug!("Received execute request for query {query_id}");

	let query = store.get_query(&query_id).await?;
	let rows = executor.run(query, req.parameters).await?;

	Ok(Json(rows))
}

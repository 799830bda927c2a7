use serde_json::Value;
use std::collections::HashMap;

use gridbase_core::{
	http::{ExecuteQueryRequest, SearchQueriesResponse, SearchRequest},
	model::Query,
};

use crate::{
	client::{ApiClient, ApiRequest},
	error::ApiError,
};

impl ApiClient {
	/// Search for queries by name.
	///
	/// # Errors
	///
	/// Returns an error if the call fails.
	pub async fn search_queries(&self, name: &str) -> Result<Vec<Query>, ApiError> {
		let res: SearchQueriesResponse = self
			.call(ApiRequest::post("queries/search").body(&SearchRequest {
				name: name.to_string(),
			})?)
			.await?;

		Ok(res.queries)
	}

	/// Execute a query and return its result rows.
	///
	/// # Errors
	///
	/// Returns an error if the query is unknown, its parameters fail
	/// validation, or execution fails upstream.
	pub async fn execute_query(
		&self,
		query_id: &str,
		parameters: HashMap<String, String>,
	) -> Result<Vec<Value>, ApiError> {
		self.call(
			ApiRequest::post(format!("queries/{query_id}"))
				.body(&ExecuteQueryRequest { parameters })?,
		)
		.await
	}
}

use gridbase_core::{
	http::{SearchRequest, SearchTablesResponse, TableParams},
	model::Table,
};

use crate::{
	client::{ApiClient, ApiRequest},
	error::ApiError,
};

impl ApiClient {
	/// Search for tables by name.
	///
	/// # Errors
	///
	/// Returns an error if the call fails.
	pub async fn search_tables(&self, name: &str) -> Result<Vec<Table>, ApiError> {
		let res: SearchTablesResponse = self
			.call(ApiRequest::post("tables/search").body(&SearchRequest {
				name: name.to_string(),
			})?)
			.await?;

		Ok(res.tables)
	}

	/// Fetch a table definition. Definitions can't change at runtime for
	/// client apps, so the response is memoized when caching is enabled.
	///
	/// # Errors
	///
	/// Returns an error if the table does not exist.
	pub async fn get_table(&self, table_id: &str) -> Result<Table, ApiError> {
		self.call(ApiRequest::get(format!("tables/{table_id}")).cached())
			.await
	}

	/// # Errors
	///
	/// Returns an error if the call fails.
	pub async fn create_table(&self, params: &TableParams) -> Result<Table, ApiError> {
		self.call(ApiRequest::post("tables").body(params)?).await
	}

	/// # Errors
	///
	/// Returns an error if the table does not exist.
	pub async fn update_table(&self, table_id: &str, params: &TableParams) -> Result<Table, ApiError> {
		self.call(ApiRequest::put(format!("tables/{table_id}")).body(params)?)
			.await
	}

	/// Delete a table and every row stored in it.
	///
	/// # Errors
	///
	/// Returns an error if the table does not exist.
	pub async fn delete_table(&self, table_id: &str) -> Result<Table, ApiError> {
		self.call(ApiRequest::delete(format!("tables/{table_id}")))
			.await
	}
}

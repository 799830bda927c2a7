use gridbase_core::{
	http::{RowParams, SearchRowsRequest, SearchRowsResponse},
	model::Row,
};

use crate::{
	client::{ApiClient, ApiRequest},
	error::ApiError,
};

impl ApiClient {
	/// Search a table's rows by field equality. An empty filter returns the
	/// whole table.
	///
	/// # Errors
	///
	/// Returns an error if the table does not exist.
	pub async fn search_rows(
		&self,
		table_id: &str,
		filter: &SearchRowsRequest,
	) -> Result<Vec<Row>, ApiError> {
		let res: SearchRowsResponse = self
			.call(ApiRequest::post(format!("tables/{table_id}/rows/search")).body(filter)?)
			.await?;

		Ok(res.rows)
	}

	/// # Errors
	///
	/// Returns an error if the table does not exist or the fields fail
	/// validation against its schema.
	pub async fn create_row(&self, table_id: &str, fields: &RowParams) -> Result<Row, ApiError> {
		self.call(ApiRequest::post(format!("tables/{table_id}/rows")).body(fields)?)
			.await
	}

	/// # Errors
	///
	/// Returns an error if the row does not exist in the table.
	pub async fn get_row(&self, table_id: &str, row_id: &str) -> Result<Row, ApiError> {
		self.call(ApiRequest::get(format!("tables/{table_id}/rows/{row_id}")))
			.await
	}

	/// Replace a row's fields.
	///
	/// # Errors
	///
	/// Returns an error if the row does not exist or the fields fail
	/// validation against the table's schema.
	pub async fn update_row(
		&self,
		table_id: &str,
		row_id: &str,
		fields: &RowParams,
	) -> Result<Row, ApiError> {
		self.call(ApiRequest::put(format!("tables/{table_id}/rows/{row_id}")).body(fields)?)
			.await
	}

	/// # Errors
	///
	/// Returns an error if the row does not exist in the table.
	pub async fn delete_row(&self, table_id: &str, row_id: &str) -> Result<Row, ApiError> {
		self.call(ApiRequest::delete(format!("tables/{table_id}/rows/{row_id}")))
			.await
	}
}

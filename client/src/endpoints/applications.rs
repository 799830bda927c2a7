use gridbase_core::{
	http::{ApplicationParams, SearchApplicationsResponse, SearchRequest},
	model::Application,
};

use crate::{
	client::{ApiClient, ApiRequest},
	error::ApiError,
};

impl ApiClient {
	/// Search for applications by name.
	///
	/// # Errors
	///
	/// Returns an error if the call fails.
	pub async fn search_applications(&self, name: &str) -> Result<Vec<Application>, ApiError> {
		let res: SearchApplicationsResponse = self
			.call(ApiRequest::post("applications/search").body(&SearchRequest {
				name: name.to_string(),
			})?)
			.await?;

		Ok(res.applications)
	}

	/// # Errors
	///
	/// Returns an error if the call fails.
	pub async fn create_application(
		&self,
		params: &ApplicationParams,
	) -> Result<Application, ApiError> {
		self.call(ApiRequest::post("applications").body(params)?)
			.await
	}

	/// # Errors
	///
	/// Returns an error if the application does not exist.
	pub async fn get_application(&self, app_id: &str) -> Result<Application, ApiError> {
		self.call(ApiRequest::get(format!("applications/{app_id}")))
			.await
	}

	/// # Errors
	///
	/// Returns an error if the application does not exist.
	pub async fn update_application(
		&self,
		app_id: &str,
		params: &ApplicationParams,
	) -> Result<Application, ApiError> {
		self.call(ApiRequest::put(format!("applications/{app_id}")).body(params)?)
			.await
	}

	/// # Errors
	///
	/// Returns an error if the application does not exist.
	pub async fn delete_application(&self, app_id: &str) -> Result<Application, ApiError> {
		self.call(ApiRequest::delete(format!("applications/{app_id}")))
			.await
	}
}

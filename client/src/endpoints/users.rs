use gridbase_core::{
	http::{SearchRequest, SearchUsersResponse, UserParams},
	model::User,
};

use crate::{
	client::{ApiClient, ApiRequest},
	error::ApiError,
};

impl ApiClient {
	/// Search for users by email prefix.
	///
	/// # Errors
	///
	/// Returns an error if the call fails.
	pub async fn search_users(&self, email: &str) -> Result<Vec<User>, ApiError> {
		let res: SearchUsersResponse = self
			.call(ApiRequest::post("users/search").body(&SearchRequest {
				name: email.to_string(),
			})?)
			.await?;

		Ok(res.users)
	}

	/// # Errors
	///
	/// Returns an error if the call fails.
	pub async fn create_user(&self, params: &UserParams) -> Result<User, ApiError> {
		self.call(ApiRequest::post("users").body(params)?).await
	}

	/// # Errors
	///
	/// Returns an error if the user does not exist.
	pub async fn get_user(&self, user_id: &str) -> Result<User, ApiError> {
		self.call(ApiRequest::get(format!("users/{user_id}"))).await
	}

	/// # Errors
	///
	/// Returns an error if the user does not exist.
	pub async fn update_user(&self, user_id: &str, params: &UserParams) -> Result<User, ApiError> {
		self.call(ApiRequest::put(format!("users/{user_id}")).body(params)?)
			.await
	}

	/// # Errors
	///
	/// Returns an error if the user does not exist.
	pub async fn delete_user(&self, user_id: &str) -> Result<User, ApiError> {
		self.call(ApiRequest::delete(format!("users/{user_id}")))
			.await
	}
}

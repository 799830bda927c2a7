use anyhow::Result;
use serde_json::Value;
use std::{collections::HashMap, future::Future};

use crate::model::Query;

/// A datasource Gridbase queries run against
pub trait Datasource: Sized + Send + Sync {
	/// Prepare the datasource (open connections, authenticate, ...)
	///
	/// # Errors
	///
	/// Returns an error if the datasource cannot be prepared.
	fn setup() -> impl Future<Output = Result<Self>> + Send;

	/// Execute a query with its bound parameters, returning the result rows.
	///
	/// # Errors
	///
	/// Returns an error if the query fails upstream.
	fn execute(
		&self,
		query: &Query,
		parameters: &HashMap<String, String>,
	) -> impl Future<Output = Result<Vec<Value>>> + Send;
}

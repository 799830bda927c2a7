use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

use crate::model::{
	Application, Column, Query, QueryParameter, QueryVerb, RestQueryFields, Row, Table, User,
};

/// The platform API version spoken by this crate.
pub const API_VERSION: &str = "1";

/// Header carrying the caller's expected API version. Must be lowercase so
/// it can back a static `HeaderName`.
pub const API_VERSION_HEADER: &str = "x-gridbase-api-version";

/// Body of every resource search call: a case-insensitive prefix match
/// on the resource's display name.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
	pub name: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchApplicationsResponse {
	pub applications: Vec<Application>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchTablesResponse {
	pub tables: Vec<Table>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchRowsResponse {
	pub rows: Vec<Row>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchUsersResponse {
	pub users: Vec<User>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchQueriesResponse {
	pub queries: Vec<Query>,
}

/// Body of `POST /tables/:table_id/rows/search`: rows match when every
/// listed field equals the given value. An empty filter matches all rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchRowsRequest {
	#[serde(default)]
	pub query: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteQueryRequest {
	#[serde(default)]
	pub parameters: HashMap<String, String>,
}

/// Error body emitted by the server and understood by the client.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
	pub message: String,
	pub status: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationParams {
	pub name: String,
	#[serde(default)]
	pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableParams {
	pub name: String,
	#[serde(default)]
	pub schema: BTreeMap<String, Column>,
}

/// Column values for a new or replaced row.
pub type RowParams = Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserParams {
	pub email: String,
	#[serde(default)]
	pub first_name: Option<String>,
	#[serde(default)]
	pub last_name: Option<String>,
}

/// Definition of a query, as registered with the store at startup.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QueryParams {
	pub name: String,
	#[serde(default)]
	pub parameters: Vec<QueryParameter>,
	pub fields: RestQueryFields,
	#[serde(rename = "queryVerb")]
	pub verb: QueryVerb,
}

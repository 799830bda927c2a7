use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// An application hosted on the platform.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Application {
	#[serde(rename = "_id")]
	pub id: String,
	pub name: String,
	/// URL slug the app is served under
	pub url: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A table definition. The schema maps column names to their definitions;
/// it cannot change at runtime for client apps, which is what makes table
/// lookups safe to cache on the client.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Table {
	#[serde(rename = "_id")]
	pub id: String,
	pub name: String,
	pub schema: BTreeMap<String, Column>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Column {
	#[serde(rename = "type")]
	pub kind: ColumnType,
	#[serde(default)]
	pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
	String,
	Number,
	Boolean,
	Json,
}

/// A row in a table. Everything beyond the identifiers is dynamic, keyed by
/// column name.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Row {
	#[serde(rename = "_id")]
	pub id: String,
	pub table_id: String,
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
	#[serde(rename = "_id")]
	pub id: String,
	pub email: String,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A named, parameterized query served by the platform's datasource.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Query {
	#[serde(rename = "_id")]
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub parameters: Vec<QueryParameter>,
	pub fields: RestQueryFields,
	#[serde(rename = "queryVerb")]
	pub verb: QueryVerb,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QueryParameter {
	pub name: String,
	/// Value bound when the caller doesn't supply one
	#[serde(default)]
	pub default: Option<String>,
}

/// The request template a query binds its parameters into. `{{name}}`
/// placeholders in the url, header values and body are replaced at
/// execution time.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestQueryFields {
	pub url: String,
	#[serde(default)]
	pub method: RestMethod,
	#[serde(default)]
	pub headers: BTreeMap<String, String>,
	#[serde(default)]
	pub body: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RestMethod {
	#[default]
	Get,
	Post,
	Put,
	Patch,
	Delete,
}

impl RestMethod {
	#[must_use]
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
			Self::Put => "PUT",
			Self::Patch => "PATCH",
			Self::Delete => "DELETE",
		}
	}
}

/// Whether executing the query reads from or writes to the datasource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum QueryVerb {
	Read,
	Write,
}

use anyhow::{bail, Result};
use reqwest::{
	header::{HeaderMap, HeaderValue},
	Client, Method,
};
use serde_json::Value;
use std::{collections::HashMap, env};

use gridbase_core::{
	model::{Query, RestMethod},
	Datasource,
};

/// The built-in datasource for REST-backed queries: binds the caller's
/// parameters into the query's request template and performs it.
pub struct RestSource {
	client: Client,
}

impl Datasource for RestSource {
	async fn setup() -> Result<Self> {
		let mut headers = HeaderMap::new();
		let client = Client::builder();

		if let Ok(token) = env::var("GRIDBASE_SOURCE_TOKEN") {
			let mut authorization = HeaderValue::from_str(&format!("Bearer {token}"))?;
			authorization.set_sensitive(true);
			headers.insert("Authorization", authorization);
		}

		Ok(Self {
			client: client
				.user_agent(format!("gridbase-server/{}", env!("CARGO_PKG_VERSION")))
				.default_headers(headers)
				.build()?,
		})
	}

	async fn execute(
		&self,
		query: &Query,
		parameters: &HashMap<String, String>,
	) -> Result<Vec<Value>> {
		let url = bind(&query.fields.url, parameters);
		tracing::debug!("Executing query {} against {url}", query.id);

		let mut request = self.client.request(method_of(query.fields.method), url);

		for (name, value) in &query.fields.headers {
			request = request.header(name.as_str(), bind(value, parameters));
		}

		if let Some(body) = &query.fields.body {
			request = request
				.header(reqwest::header::CONTENT_TYPE, "application/json")
				.body(bind(body, parameters));
		}

		let response = request.send().await?;
		let status = response.status();
		if !status.is_success() {
			bail!("Query {} returned status {status}", query.id);
		}

		let text = response.text().await?;
		if text.is_empty() {
			return Ok(Vec::new());
		}

		Ok(match serde_json::from_str::<Value>(&text)? {
			Value::Array(rows) => rows,
			value => vec![value],
		})
	}
}

const fn method_of(method: RestMethod) -> Method {
	match method {
		RestMethod::Get => Method::GET,
		RestMethod::Post => Method::POST,
		RestMethod::Put => Method::PUT,
		RestMethod::Patch => Method::PATCH,
		RestMethod::Delete => Method::DELETE,
	}
}

/// Replace `{{name}}` placeholders (with or without inner padding) with the
/// bound parameter values.
fn bind(template: &str, parameters: &HashMap<String, String>) -> String {
	let mut bound = template.to_string();

	for (name, value) in parameters {
		bound = bound.replace(&format!("{{{{{name}}}}}"), value);
		bound = bound.replace(&format!("{{{{ {name} }}}}"), value);
	}

	bound
}

#[cfg(test)]
mod tests {
	use super::*;
	use map_macro::hash_map;

	#[test]
	fn placeholders_are_bound() {
		let parameters = hash_map! {
			"id".to_string() => "42".to_string(),
			"status".to_string() => "open".to_string(),
		};

		assert_eq!(
			bind("https://api.example.com/tickets/{{id}}?status={{ status }}", &parameters),
			"https://api.example.com/tickets/42?status=open"
		);
	}

	#[test]
	fn unbound_placeholders_are_left_alone() {
		assert_eq!(bind("/tickets/{{id}}", &HashMap::new()), "/tickets/{{id}}");
	}

	#[test]
	fn rest_methods_map_to_http_methods() {
		assert_eq!(method_of(RestMethod::Get), Method::GET);
		assert_eq!(method_of(RestMethod::Delete), Method::DELETE);
	}
}

use atomic_enum::atomic_enum;
use jsonschema::JSONSchema;
use schemars::JsonSchema;
use serde_json::{json, Value};
use std::{
	collections::HashMap,
	sync::{atomic::Ordering, Arc},
	time::{Duration, Instant},
};
use tokio::sync::{mpsc, oneshot};

use gridbase_core::{model::Query, Datasource};

use crate::{errors::ValidationErrorSet, shutdown::Shutdown};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Datasource is not ready")]
	NotReady,

	#[error("Failed to validate query parameters.")]
	Validation(ValidationErrorSet),

	#[error("Failed to execute query: {0}")]
	Execution(#[from] anyhow::Error),

	#[error("Failed to wait for query result: {0}")]
	Receiver(#[from] oneshot::error::RecvError),
}

#[atomic_enum]
#[derive(serde::Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Health {
	Unknown,
	Starting,
	Ready,
	SetupFailed,
}

pub static EXECUTOR_HEALTH: AtomicHealth = AtomicHealth::new(Health::Unknown);

type ResponseSender = oneshot::Sender<Result<(Vec<Value>, Duration), Error>>;

pub type Extension = axum::Extension<Executor>;

/// Runs queries against the user-provided [`Datasource`]. The datasource
/// itself lives on a worker task, so routes stay untyped; executions are
/// handed over through a channel and run concurrently.
#[derive(Clone)]
pub struct Executor {
	sender: mpsc::Sender<(ResponseSender, Query, HashMap<String, String>)>,
}

impl Executor {
	pub fn new<T: Datasource + 'static>(shutdown: Shutdown) -> Self {
		EXECUTOR_HEALTH.swap(Health::Starting, Ordering::SeqCst);

		let (sender, mut rx) =
			mpsc::channel::<(ResponseSender, Query, HashMap<String, String>)>(32);

		let handle_shutdown = shutdown.clone();
		let handle = tokio::spawn(async move {
			let source = match T::setup().await {
				Ok(source) => Arc::new(source),
				Err(error) => {
					tracing::error!("Datasource setup failed: {error:?}");
					EXECUTOR_HEALTH.swap(Health::SetupFailed, Ordering::SeqCst);
					handle_shutdown.start();
					return;
				},
			};

			EXECUTOR_HEALTH.swap(Health::Ready, Ordering::SeqCst);

			while let Some((tx, query, parameters)) = rx.recv().await {
				let source = Arc::clone(&source);

				tokio::spawn(async move {
					tracing::debug!("Executing query: {}", query.id);
					let started = Instant::now();

					let result = source.execute(&query, &parameters).await;
					tx.send(
						result
							.map(|rows| (rows, started.elapsed()))
							.map_err(Error::Execution),
					)
					.ok();
				});
			}
		});

		tokio::spawn(async move {
			shutdown.handle().await;
			handle.abort();
		});

		Self { sender }
	}

	/// Merge declared defaults into the caller's parameters, then check the
	/// result against the schema derived from the query's declaration.
	pub fn bind_parameters(
		query: &Query,
		mut parameters: HashMap<String, String>,
	) -> Result<HashMap<String, String>, ValidationErrorSet> {
		for parameter in &query.parameters {
			if !parameters.contains_key(&parameter.name) {
				parameters.insert(
					parameter.name.clone(),
					parameter.default.clone().unwrap_or_default(),
				);
			}
		}

		let schema_value = parameter_schema(query);
		let schema = JSONSchema::compile(&schema_value).unwrap();

		let bound = serde_json::to_value(&parameters).unwrap();
		schema.validate(&bound).map_err(ValidationErrorSet::from)?;

		Ok(parameters)
	}

	pub async fn run(
		&self,
		query: Query,
		parameters: HashMap<String, String>,
	) -> Result<Vec<Value>, Error> {
		if !matches!(EXECUTOR_HEALTH.load(Ordering::SeqCst), Health::Ready) {
			return Err(Error::NotReady);
		}

		let parameters = Self::bind_parameters(&query, parameters)
			.map_err(|e| Error::Validation(e.fill_loc(&["body", "parameters"])))?;

		let (tx, rx) = oneshot::channel();
		self.sender
			.send((tx, query, parameters))
			.await
			.map_err(|_| Error::NotReady)?;

		let (rows, elapsed) = rx.await??;
		tracing::debug!("Query executed in {elapsed:?}");

		Ok(rows)
	}

	pub fn extension(&self) -> Extension {
		axum::Extension(self.clone())
	}
}

fn parameter_schema(query: &Query) -> Value {
	let properties = query
		.parameters
		.iter()
		.map(|parameter| (parameter.name.clone(), json!({ "type": "string" })))
		.collect::<serde_json::Map<_, _>>();

	json!({
		"type": "object",
		"properties": properties,
		"additionalProperties": false,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::Result;
	use gridbase_core::model::{QueryParameter, QueryVerb, RestQueryFields};
	use map_macro::hash_map;

	fn query(parameters: Vec<QueryParameter>) -> Query {
		Query {
			id: "q_test".to_string(),
			name: "Fetch things".to_string(),
			parameters,
			fields: RestQueryFields {
				url: "https://api.example.com/things".to_string(),
				method: gridbase_core::model::RestMethod::Get,
				headers: std::collections::BTreeMap::new(),
				body: None,
			},
			verb: QueryVerb::Read,
		}
	}

	#[test]
	fn defaults_are_merged_into_parameters() {
		let query = query(vec![
			QueryParameter {
				name: "page".to_string(),
				default: Some("1".to_string()),
			},
			QueryParameter {
				name: "filter".to_string(),
				default: None,
			},
		]);

		let bound = Executor::bind_parameters(
			&query,
			hash_map! { "filter".to_string() => "active".to_string() },
		)
		.unwrap();

		assert_eq!(bound["page"], "1");
		assert_eq!(bound["filter"], "active");
	}

	#[test]
	fn undeclared_parameters_are_rejected() {
		let query = query(vec![QueryParameter {
			name: "page".to_string(),
			default: Some("1".to_string()),
		}]);

		let result = Executor::bind_parameters(
			&query,
			hash_map! { "limit".to_string() => "10".to_string() },
		);

		assert!(result.is_err());
	}

	#[tokio::test]
	async fn queries_run_against_the_datasource() {
		struct Canned;

		impl Datasource for Canned {
			async fn setup() -> Result<Self> {
				Ok(Self)
			}

			async fn execute(
				&self,
				query: &Query,
				parameters: &HashMap<String, String>,
			) -> Result<Vec<Value>> {
				Ok(vec![json!({
					"query": query.id.as_str(),
					"page": parameters.get("page"),
				})])
			}
		}

		let shutdown = crate::shutdown::test_support::shutdown();
		let executor = Executor::new::<Canned>(shutdown);

		// Wait for setup to flip the health state.
		while !matches!(EXECUTOR_HEALTH.load(Ordering::SeqCst), Health::Ready) {
			tokio::task::yield_now().await;
		}

		let rows = executor
			.run(
				query(vec![QueryParameter {
					name: "page".to_string(),
					default: Some("1".to_string()),
				}]),
				HashMap::new(),
			)
			.await
			.unwrap();

		assert_eq!(rows, vec![json!({ "query": "q_test", "page": "1" })]);
	}
}

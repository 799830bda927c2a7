//! Black-box test of the public API: boots the server on an ephemeral port
//! and drives every resource through the client SDK.

use std::{collections::HashMap, time::Duration};

use anyhow::Result;
use gridbase::{
	http::{ApplicationParams, SearchRowsRequest, TableParams, UserParams},
	model::{Column, ColumnType, Query},
	Datasource, Shutdown, Store,
};
use gridbase_client::{ApiClient, ApiRequest};
use serde_json::{json, Value};
use url::Url;

struct EchoSource;

impl Datasource for EchoSource {
	async fn setup() -> Result<Self> {
		Ok(Self)
	}

	async fn execute(
		&self,
		query: &Query,
		parameters: &HashMap<String, String>,
	) -> Result<Vec<Value>> {
		Ok(vec![json!({ "query": query.name.as_str(), "parameters": parameters })])
	}
}

async fn wait_until_ready(client: &ApiClient) {
	for _ in 0..500 {
		if let Ok(health) = client.get::<Value>("health-check").await {
			if health["status"] == "READY" {
				return;
			}
		}

		tokio::time::sleep(Duration::from_millis(10)).await;
	}

	panic!("server did not become ready");
}

#[tokio::test]
async fn the_public_api_end_to_end() {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.try_init()
		.ok();

	let shutdown = Shutdown::new().unwrap();
	let app = gridbase::router::<EchoSource>(Store::new(), &shutdown);

	let server = axum::Server::bind(&"127.0.0.1:0".parse().unwrap())
		.serve(app.into_make_service());
	let addr = server.local_addr();
	tokio::spawn(server.with_graceful_shutdown(shutdown.handle()));

	let base_url = Url::parse(&format!("http://{addr}")).unwrap();
	let client = ApiClient::builder(base_url).build().unwrap();
	wait_until_ready(&client).await;

	// The root links to the OpenAPI document, which documents the route
	// tables we just mounted.
	let root: Value = client.get("").await.unwrap();
	assert_eq!(root["openapi_url"], "/openapi.json");

	let openapi: Value =
		serde_json::from_str(&client.call_raw(ApiRequest::get("openapi.json")).await.unwrap())
			.unwrap();
	assert_eq!(openapi["info"]["title"], "Gridbase API");
	assert!(openapi["paths"]["/queries/search"]["post"].is_object());
	assert!(openapi["paths"]["/queries/{query_id}"]["post"].is_object());
	assert!(openapi["paths"]["/tables/{table_id}/rows/{row_id}"]["delete"].is_object());

	// Applications.
	let app = client
		.create_application(&ApplicationParams {
			name: "CRM".to_string(),
			url: Some("/crm".to_string()),
		})
		.await
		.unwrap();

	let fetched = client.get_application(&app.id).await.unwrap();
	assert_eq!(fetched.name, "CRM");

	let updated = client
		.update_application(
			&app.id,
			&ApplicationParams {
				name: "CRM v2".to_string(),
				url: None,
			},
		)
		.await
		.unwrap();
	assert_eq!(updated.name, "CRM v2");

	assert_eq!(client.search_applications("crm").await.unwrap().len(), 1);
	assert!(client.search_applications("billing").await.unwrap().is_empty());

	client.delete_application(&app.id).await.unwrap();
	let error = client.get_application(&app.id).await.unwrap_err();
	assert_eq!(error.status, 404);
	assert_eq!(error.message, "The requested application does not exist");

	// Tables and rows.
	let table = client
		.create_table(&TableParams {
			name: "Tickets".to_string(),
			schema: [
				(
					"title".to_string(),
					Column {
						kind: ColumnType::String,
						required: true,
					},
				),
				(
					"open".to_string(),
					Column {
						kind: ColumnType::Boolean,
						required: false,
					},
				),
			]
			.into(),
		})
		.await
		.unwrap();

	let mut fields = serde_json::Map::new();
	fields.insert("title".to_string(), json!("Broken login"));
	fields.insert("open".to_string(), json!(true));
	let row = client.create_row(&table.id, &fields).await.unwrap();
	assert_eq!(row.table_id, table.id);
	assert_eq!(row.fields["title"], json!("Broken login"));

	// Rows are validated against the table schema.
	let mut invalid = serde_json::Map::new();
	invalid.insert("severity".to_string(), json!("high"));
	let error = client.create_row(&table.id, &invalid).await.unwrap_err();
	assert_eq!(error.status, 422);
	assert!(error.message.contains("severity"));

	let mut closed = fields.clone();
	closed.insert("open".to_string(), json!(false));
	let updated = client.update_row(&table.id, &row.id, &closed).await.unwrap();
	assert_eq!(updated.fields["open"], json!(false));

	let mut filter = SearchRowsRequest::default();
	filter.query.insert("open".to_string(), json!(false));
	let matches = client.search_rows(&table.id, &filter).await.unwrap();
	assert_eq!(matches.len(), 1);
	assert_eq!(matches[0].id, row.id);

	client.delete_row(&table.id, &row.id).await.unwrap();
	assert!(client
		.search_rows(&table.id, &SearchRowsRequest::default())
		.await
		.unwrap()
		.is_empty());

	// Users.
	let user = client
		.create_user(&UserParams {
			email: "ada@example.com".to_string(),
			first_name: Some("Ada".to_string()),
			last_name: None,
		})
		.await
		.unwrap();

	assert_eq!(client.search_users("ada@").await.unwrap().len(), 1);

	let updated = client
		.update_user(
			&user.id,
			&UserParams {
				email: "ada@example.org".to_string(),
				first_name: Some("Ada".to_string()),
				last_name: Some("Lovelace".to_string()),
			},
		)
		.await
		.unwrap();
	assert_eq!(updated.email, "ada@example.org");

	client.delete_user(&user.id).await.unwrap();
	assert_eq!(client.get_user(&user.id).await.unwrap_err().status, 404);

	// Graceful shutdown through the system route.
	let _: String = client.call(ApiRequest::post("shutdown")).await.unwrap();
	tokio::time::sleep(Duration::from_millis(50)).await;

	let error = client.get::<Value>("health-check").await.unwrap_err();
	assert_eq!(error.message, "Failed to send request");
	assert_eq!(error.status, 400);
}

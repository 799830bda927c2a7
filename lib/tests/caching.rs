//! Black-box test of the client's response cache: opt-in, URL-keyed, and
//! never invalidated.

use std::{collections::HashMap, time::Duration};

use anyhow::Result;
use gridbase::{http::TableParams, model::Query, Datasource, Shutdown, Store};
use gridbase_client::ApiClient;
use serde_json::{json, Value};
use url::Url;

struct EchoSource;

impl Datasource for EchoSource {
	async fn setup() -> Result<Self> {
		Ok(Self)
	}

	async fn execute(&self, _: &Query, _: &HashMap<String, String>) -> Result<Vec<Value>> {
		Ok(vec![json!({})])
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
async fn cacheable_calls_memoize_per_url_when_enabled() {
	let shutdown = Shutdown::new().unwrap();
	let app = gridbase::router::<EchoSource>(Store::new(), &shutdown);

	let server = axum::Server::bind(&"127.0.0.1:0".parse().unwrap())
		.serve(app.into_make_service());
	let addr = server.local_addr();
	tokio::spawn(server);

	let base_url = Url::parse(&format!("http://{addr}")).unwrap();
	let caching = ApiClient::builder(base_url.clone())
		.enable_caching()
		.build()
		.unwrap();
	let uncached = ApiClient::builder(base_url).build().unwrap();
	wait_until_ready(&caching).await;

	let table = caching
		.create_table(&TableParams {
			name: "Inventory".to_string(),
			schema: std::collections::BTreeMap::new(),
		})
		.await
		.unwrap();

	// Warm the cache, then change the definition server-side.
	assert_eq!(caching.get_table(&table.id).await.unwrap().name, "Inventory");
	uncached
		.update_table(
			&table.id,
			&TableParams {
				name: "Inventory v2".to_string(),
				schema: std::collections::BTreeMap::new(),
			},
		)
		.await
		.unwrap();

	// The memoized response is served forever; nothing invalidates it.
	assert_eq!(caching.get_table(&table.id).await.unwrap().name, "Inventory");

	// A client without caching enabled always sees the live definition,
	// even though the endpoint is marked cacheable.
	assert_eq!(
		uncached.get_table(&table.id).await.unwrap().name,
		"Inventory v2"
	);

	// The cache is keyed by URL, so other tables are unaffected.
	let other = caching
		.create_table(&TableParams {
			name: "Orders".to_string(),
			schema: std::collections::BTreeMap::new(),
		})
		.await
		.unwrap();
	assert_eq!(caching.get_table(&other.id).await.unwrap().name, "Orders");

	// Search is not a cacheable endpoint and reflects the update.
	let names = caching
		.search_tables("inventory")
		.await
		.unwrap()
		.into_iter()
		.map(|table| table.name)
		.collect::<Vec<_>>();
	assert_eq!(names, vec!["Inventory v2".to_string()]);
}

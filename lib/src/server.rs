use std::{env, net::SocketAddr, num::ParseIntError};

use aide::openapi::{self, OpenApi};
use anyhow::Result;
use axum::{Extension, Router, Server};

use gridbase_core::{http::API_VERSION, Datasource};

use crate::{executor::Executor, routes, shutdown::Shutdown, store::Store};

/// Start the server for the given datasource.
///
/// # Errors
///
/// This function will return an error if the PORT environment variable is
/// set but cannot be parsed, if the shutdown handler was already installed,
/// or if the server fails to start.
pub async fn start<T: Datasource + 'static>(store: Store) -> Result<()> {
	let shutdown = Shutdown::new()?;
	let app = router::<T>(store, &shutdown);

	let addr = SocketAddr::from((
		[0, 0, 0, 0],
		env::var("PORT").map_or(Ok::<u16, ParseIntError>(5000), |p| p.parse())?,
	));

	tracing::info!("Starting server on {addr}...");
	Server::bind(&addr)
		.serve(app.into_make_service())
		.with_graceful_shutdown(shutdown.handle())
		.await?;

	Ok(())
}

/// Build the application router: the route tables, the generated OpenAPI
/// document and the state extensions. Exposed for embedding and for
/// black-box tests; most consumers want [`start`].
pub fn router<T: Datasource + 'static>(store: Store, shutdown: &Shutdown) -> Router {
	let executor = Executor::new::<T>(shutdown.clone());

	let mut openapi = openapi_info();
	routes::handler()
		.finish_api(&mut openapi)
		.layer(axum::middleware::from_fn(routes::require_supported_version))
		.layer(store.extension())
		.layer(executor.extension())
		.layer(shutdown.extension())
		.layer(Extension(openapi))
}

fn openapi_info() -> OpenApi {
	OpenApi {
		info: openapi::Info {
			title: "Gridbase API".to_string(),
			description: Some(
				"The REST interface for managing Gridbase applications, tables, rows, users and queries.".to_string(),
			),
			version: API_VERSION.to_string(),
			..openapi::Info::default()
		},
		..OpenApi::default()
	}
}

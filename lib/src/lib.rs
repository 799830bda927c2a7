#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub use gridbase_core::{http, model, Datasource};

pub use crate::{
	server::{router, start},
	shutdown::Shutdown,
	sources::RestSource,
	store::Store,
};

mod errors;
mod executor;
mod helpers;
mod routes;
mod server;
mod shutdown;
mod sources;
mod store;

/// Generate a `main` function that serves the given datasource, optionally
/// with a pre-seeded store.
#[macro_export]
macro_rules! start {
	($source:ty) => {
		$crate::start!($source, $crate::Store::new());
	};
	($source:ty, $store:expr) => {
		#[tokio::main]
		async fn main() {
			$crate::start::<$source>($store).await.unwrap();
		}
	};
}

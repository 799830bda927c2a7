#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub use gridbase_core::{http, model};

pub use crate::{
	client::{ApiClient, ApiClientBuilder, ApiRequest},
	error::ApiError,
};

mod client;
mod endpoints;
mod error;

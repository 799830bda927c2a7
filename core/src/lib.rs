#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod http;
pub mod model;

mod datasource;

pub use datasource::Datasource;

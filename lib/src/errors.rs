use aide::OperationOutput;
use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use jsonschema::ErrorIterator;

use gridbase_core::http::ErrorResponse;

use crate::{executor, store};

/// An error response in the platform's wire format: a message plus the
/// status code, repeated in the body so clients behind proxies can still
/// read it.
#[derive(Debug)]
pub struct HTTPError {
	message: String,
	status_code: StatusCode,
}

impl HTTPError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			status_code: StatusCode::UNPROCESSABLE_ENTITY,
		}
	}

	pub const fn with_status(mut self, status_code: StatusCode) -> Self {
		self.status_code = status_code;
		self
	}
}

impl IntoResponse for HTTPError {
	fn into_response(self) -> Response {
		(
			self.status_code,
			Json(ErrorResponse {
				message: self.message,
				status: self.status_code.as_u16(),
			}),
		)
			.into_response()
	}
}

impl OperationOutput for HTTPError {
	type Inner = Self;
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ValidationError {
	msg: String,
	loc: Vec<String>,
}

impl ValidationError {
	pub fn new(msg: impl Into<String>, loc: Vec<String>) -> Self {
		Self {
			msg: msg.into(),
			loc,
		}
	}
}

#[derive(Debug, Clone, thiserror::Error, serde::Serialize)]
#[error("Validation Errors")]
pub struct ValidationErrorSet {
	errors: Vec<ValidationError>,
}

impl ValidationErrorSet {
	pub fn new(errors: Vec<ValidationError>) -> Self {
		Self { errors }
	}

	pub fn fill_loc(mut self, loc: &[&str]) -> Self {
		self.errors
			.iter_mut()
			.map(|error| {
				error.loc = loc
					.iter()
					.map(ToString::to_string)
					.chain(error.loc.clone())
					.collect();
			})
			.for_each(drop);

		self
	}

	/// Flatten the set into a single message for the wire format.
	#[must_use]
	pub fn describe(&self) -> String {
		self.errors
			.iter()
			.map(|error| {
				if error.loc.is_empty() {
					error.msg.clone()
				} else {
					format!("{}: {}", error.loc.join("."), error.msg)
				}
			})
			.collect::<Vec<_>>()
			.join("; ")
	}
}

impl From<ErrorIterator<'_>> for ValidationErrorSet {
	fn from(e: ErrorIterator<'_>) -> Self {
		Self {
			errors: e
				.map(|e| ValidationError {
					msg: e.to_string(),
					loc: e.instance_path.into_vec(),
				})
				.collect(),
		}
	}
}

impl From<ValidationErrorSet> for HTTPError {
	fn from(e: ValidationErrorSet) -> Self {
		Self {
			status_code: StatusCode::UNPROCESSABLE_ENTITY,
			message: e.describe(),
		}
	}
}

impl From<store::Error> for HTTPError {
	fn from(e: store::Error) -> Self {
		match e {
			store::Error::NotFound(_) => Self::new(e.to_string()).with_status(StatusCode::NOT_FOUND),
			store::Error::Validation(e) => e.into(),
		}
	}
}

impl From<executor::Error> for HTTPError {
	fn from(e: executor::Error) -> Self {
		match e {
			executor::Error::NotReady => {
				Self::new(e.to_string()).with_status(StatusCode::SERVICE_UNAVAILABLE)
			},
			executor::Error::Validation(e) => e.into(),
			executor::Error::Execution(_) => {
				Self::new(e.to_string()).with_status(StatusCode::BAD_GATEWAY)
			},
			executor::Error::Receiver(_) => {
				Self::new(e.to_string()).with_status(StatusCode::INTERNAL_SERVER_ERROR)
			},
		}
	}
}

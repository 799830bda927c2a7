use axum::{
	headers::{Error, Header},
	http::{HeaderName, HeaderValue},
};
use lazy_static::lazy_static;

use gridbase_core::http::{API_VERSION, API_VERSION_HEADER};

lazy_static! {
	static ref VERSION: HeaderName = HeaderName::from_static(API_VERSION_HEADER);
}

/// Typed `x-gridbase-api-version` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersion(pub String);

impl ApiVersion {
	#[must_use]
	pub fn is_supported(&self) -> bool {
		self.0 == API_VERSION
	}
}

impl Header for ApiVersion {
	fn name() -> &'static HeaderName {
		&VERSION
	}

	fn decode<'i, I>(values: &mut I) -> Result<Self, Error>
	where
		Self: Sized,
		I: Iterator<Item = &'i HeaderValue>,
	{
		let value = values.next().ok_or_else(Error::invalid)?;
		let version = value.to_str().map_err(|_| Error::invalid())?.trim();

		if version.is_empty() {
			return Err(Error::invalid());
		}

		Ok(Self(version.to_string()))
	}

	fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
		if let Ok(value) = HeaderValue::from_str(&self.0) {
			values.extend(std::iter::once(value));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::HeaderMap;

	#[test]
	fn header_is_parsed_correctly() {
		let mut headers = HeaderMap::new();
		headers.insert(API_VERSION_HEADER, HeaderValue::from_static(" 1 "));

		let version = ApiVersion::decode(&mut headers.get_all(API_VERSION_HEADER).iter()).unwrap();

		assert_eq!(version, ApiVersion("1".to_string()));
		assert!(version.is_supported());
	}

	#[test]
	fn unknown_versions_are_not_supported() {
		assert!(!ApiVersion("2".to_string()).is_supported());
	}

	#[test]
	fn empty_values_fail_to_decode() {
		let mut headers = HeaderMap::new();
		headers.insert(API_VERSION_HEADER, HeaderValue::from_static(""));

		assert!(ApiVersion::decode(&mut headers.get_all(API_VERSION_HEADER).iter()).is_err());
	}

	#[test]
	fn header_is_encoded_correctly() {
		let mut values = Vec::new();
		ApiVersion(API_VERSION.to_string()).encode(&mut values);

		assert_eq!(values, vec![HeaderValue::from_static("1")]);
	}
}

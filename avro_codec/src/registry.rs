//! Wire framing and the schema-registry collaborator interface (§6.2/§6.3)
//!
//! This module does not implement a registry server — only the framing a
//! registry-fronted message carries on the wire, and the
//! [`SchemaRegistryClient`] trait a caller's registry of choice (Confluent
//! Schema Registry, Apicurio, a homegrown one, ...) is expected to satisfy.
//! An optional [`HttpSchemaRegistryClient`] is provided behind the
//! `registry-http` feature as a convenience for registries that speak the
//! de facto Confluent REST API.

use crate::error::{CodecError, ErrorLocation};
use crate::schema::Schema;

const WIRE_MAGIC: u8 = 0x00;

/// Prepend the `0x00` magic byte and big-endian schema id to an
/// already-encoded Avro binary payload (§6.2).
pub fn wrap(schema_id: u32, payload: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(payload.len() + 5);
	out.push(WIRE_MAGIC);
	out.extend_from_slice(&schema_id.to_be_bytes());
	out.extend_from_slice(payload);
	out
}

/// Split a wire-framed message into its schema id and payload, verifying
/// the magic byte (§6.2).
pub fn unwrap(message: &[u8]) -> Result<(u32, &[u8]), CodecError> {
	if message.len() < 5 {
		return Err(CodecError::invalid_data(
			ErrorLocation::Unknown,
			"wire-framed message shorter than the 5-byte magic+schema-id header",
		));
	}
	let (header, payload) = message.split_at(5);
	if header[0] != WIRE_MAGIC {
		return Err(CodecError::invalid_data(
			ErrorLocation::Unknown,
			format!("unexpected wire-format magic byte: {:#04x}", header[0]),
		));
	}
	let schema_id = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
	Ok((schema_id, payload))
}

/// A collaborator, not built by this crate, that resolves schema ids/subjects
/// to JSON and back (§6.3)
///
/// Implementations are assumed to provide at-most-once registration per
/// subject to their caller — this crate never retries [`Self::register_schema`]
/// on failure.
pub trait SchemaRegistryClient {
	/// The canonical schema JSON registered under `id`.
	fn get_schema_by_id(&self, id: u32) -> Result<String, RegistryError>;

	/// The `(id, json)` pair registered for `subject` at `version`.
	fn get_schema_by_subject_and_version(
		&self,
		subject: &str,
		version: u32,
	) -> Result<(u32, String), RegistryError>;

	/// The `(id, json)` pair of the latest version registered for `subject`.
	fn get_latest_schema_by_subject(&self, subject: &str) -> Result<(u32, String), RegistryError>;

	/// Register `schema_json` under `subject`, returning its assigned id.
	fn register_schema(&self, subject: &str, schema_json: &str) -> Result<u32, RegistryError>;
}

/// Failure from a [`SchemaRegistryClient`] call
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
	#[error("schema registry request failed: {0}")]
	Transport(String),
	#[error("schema registry returned malformed data: {0}")]
	Malformed(String),
	#[error("schema registry has no entry for {0}")]
	NotFound(String),
}

/// Resolve a wire-framed message's schema against `registry`, parsing it
/// into a [`Schema`] ready to hand to a cached codec (§6.3 tying §6.2's
/// framing to the registry).
pub fn resolve_wire_format(
	message: &[u8],
	registry: &impl SchemaRegistryClient,
) -> Result<(Schema, u32, Vec<u8>), CodecError> {
	let (schema_id, payload) = unwrap(message)?;
	tracing::trace!(schema_id, "resolving wire-framed message against registry");
	let json = registry.get_schema_by_id(schema_id).map_err(|e| {
		tracing::debug!(schema_id, %e, "registry lookup failed");
		CodecError::invalid_data(ErrorLocation::Unknown, format!("failed to resolve schema id {schema_id}: {e}"))
	})?;
	let schema: Schema = json
		.parse()
		.map_err(|e: crate::error::SchemaError| CodecError::invalid_data(ErrorLocation::Unknown, e.to_string()))?;
	Ok((schema, schema_id, payload.to_vec()))
}

#[cfg(feature = "registry-http")]
pub use http::HttpSchemaRegistryClient;

#[cfg(feature = "registry-http")]
mod http {
	use super::{RegistryError, SchemaRegistryClient};
	use serde::Deserialize;

	/// A [`SchemaRegistryClient`] speaking the Confluent Schema Registry
	/// REST API (`GET /schemas/ids/{id}`, `GET /subjects/{subject}/versions/{version}`,
	/// `GET /subjects/{subject}/versions/latest`, `POST /subjects/{subject}/versions`).
	pub struct HttpSchemaRegistryClient {
		base_url: String,
		client: reqwest::blocking::Client,
	}

	impl HttpSchemaRegistryClient {
		/// `base_url` should not have a trailing slash, e.g.
		/// `http://localhost:8081`.
		pub fn new(base_url: impl Into<String>) -> Self {
			Self {
				base_url: base_url.into(),
				client: reqwest::blocking::Client::new(),
			}
		}

		fn get(&self, path: &str) -> Result<reqwest::blocking::Response, RegistryError> {
			let url = format!("{}{}", self.base_url, path);
			let response = self
				.client
				.get(&url)
				.send()
				.map_err(|e| RegistryError::Transport(e.to_string()))?;
			if response.status() == reqwest::StatusCode::NOT_FOUND {
				return Err(RegistryError::NotFound(path.to_owned()));
			}
			response
				.error_for_status()
				.map_err(|e| RegistryError::Transport(e.to_string()))
		}
	}

	#[derive(Deserialize)]
	struct SchemaOnly {
		schema: String,
	}

	#[derive(Deserialize)]
	struct SubjectVersion {
		id: u32,
		schema: String,
	}

	#[derive(serde_derive::Serialize)]
	struct RegisterRequest<'a> {
		schema: &'a str,
	}

	#[derive(Deserialize)]
	struct RegisterResponse {
		id: u32,
	}

	impl SchemaRegistryClient for HttpSchemaRegistryClient {
		fn get_schema_by_id(&self, id: u32) -> Result<String, RegistryError> {
			let body: SchemaOnly = self
				.get(&format!("/schemas/ids/{id}"))?
				.json()
				.map_err(|e| RegistryError::Malformed(e.to_string()))?;
			Ok(body.schema)
		}

		fn get_schema_by_subject_and_version(
			&self,
			subject: &str,
			version: u32,
		) -> Result<(u32, String), RegistryError> {
			let body: SubjectVersion = self
				.get(&format!("/subjects/{subject}/versions/{version}"))?
				.json()
				.map_err(|e| RegistryError::Malformed(e.to_string()))?;
			Ok((body.id, body.schema))
		}

		fn get_latest_schema_by_subject(&self, subject: &str) -> Result<(u32, String), RegistryError> {
			let body: SubjectVersion = self
				.get(&format!("/subjects/{subject}/versions/latest"))?
				.json()
				.map_err(|e| RegistryError::Malformed(e.to_string()))?;
			Ok((body.id, body.schema))
		}

		fn register_schema(&self, subject: &str, schema_json: &str) -> Result<u32, RegistryError> {
			let url = format!("{}/subjects/{}/versions", self.base_url, subject);
			let response = self
				.client
				.post(&url)
				.json(&RegisterRequest { schema: schema_json })
				.send()
				.map_err(|e| RegistryError::Transport(e.to_string()))?
				.error_for_status()
				.map_err(|e| RegistryError::Transport(e.to_string()))?;
			let body: RegisterResponse = response.json().map_err(|e| RegistryError::Malformed(e.to_string()))?;
			Ok(body.id)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wraps_and_unwraps_round_trip() {
		let wrapped = wrap(7, &[1, 2, 3]);
		assert_eq!(wrapped[0], 0x00);
		let (id, payload) = unwrap(&wrapped).unwrap();
		assert_eq!(id, 7);
		assert_eq!(payload, &[1, 2, 3]);
	}

	#[test]
	fn rejects_wrong_magic_byte() {
		let mut message = wrap(1, &[9]);
		message[0] = 0x01;
		assert!(unwrap(&message).is_err());
	}

	#[test]
	fn rejects_too_short_messages() {
		assert!(unwrap(&[0x00, 0x00]).is_err());
	}

	struct StaticRegistry(&'static str);
	impl SchemaRegistryClient for StaticRegistry {
		fn get_schema_by_id(&self, _id: u32) -> Result<String, RegistryError> {
			Ok(self.0.to_owned())
		}
		fn get_schema_by_subject_and_version(&self, _s: &str, _v: u32) -> Result<(u32, String), RegistryError> {
			Ok((1, self.0.to_owned()))
		}
		fn get_latest_schema_by_subject(&self, _s: &str) -> Result<(u32, String), RegistryError> {
			Ok((1, self.0.to_owned()))
		}
		fn register_schema(&self, _s: &str, _j: &str) -> Result<u32, RegistryError> {
			Ok(1)
		}
	}

	#[test]
	fn resolves_wire_format_against_a_registry() {
		let registry = StaticRegistry(r#"{"type":"string"}"#);
		let message = wrap(42, &[6, b'f', b'o', b'o']);
		let (schema, id, payload) = resolve_wire_format(&message, &registry).unwrap();
		assert_eq!(id, 42);
		assert_eq!(payload, vec![6, b'f', b'o', b'o']);
		assert!(matches!(schema.root().type_, crate::schema::RegularType::String));
	}
}

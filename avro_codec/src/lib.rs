//! Compiles Avro schemas into specialized `(encoder, decoder)` pairs for
//! host Rust types.
//!
//! # Getting started
//!
//! ```
//! let schema: avro_codec::Schema = r#"
//! {
//! 	"type": "record",
//! 	"name": "test.Test",
//! 	"fields": [
//! 		{ "type": "string", "name": "field" }
//! 	]
//! }
//! "#
//! .parse()
//! .expect("failed to parse schema");
//!
//! #[derive(serde_derive::Serialize, serde_derive::Deserialize, Debug, PartialEq)]
//! struct Test {
//! 	field: String,
//! }
//!
//! let bytes = avro_codec::to_binary(&Test { field: "foo".to_owned() }, &schema)
//! 	.expect("failed to encode");
//! assert_eq!(bytes, &[6, b'f', b'o', b'o']);
//! assert_eq!(
//! 	avro_codec::from_binary::<Test>(&bytes, &schema).expect("failed to decode"),
//! 	Test { field: "foo".to_owned() }
//! );
//! ```
//!
//! # Architecture
//!
//! This crate is organized around the pipeline described by its design
//! document (`SPEC_FULL.md` in the repository root):
//!
//! - [`schema`] — the Abstract Schema Model (component A): an arena of
//!   [`schema::SchemaNode`]s with logical-type overlays and a named-type
//!   graph, plus its JSON surface ([`schema::json`]).
//! - [`descriptor`] — the Type-Descriptor Model (component B): a
//!   host-language-neutral description of a Rust type, produced by the
//!   [`descriptor::Described`] trait (hand-written here for primitives and
//!   collections, derived for structs/enums by `avro_codec_derive`).
//! - [`codec`] — the Codec Builder (component E): [`codec::CodecBuilder`]
//!   owns the ordered chain of user [`codec::BuilderCase`]s and compiles
//!   `(Schema, T)` pairs into the binary/JSON codecs in [`ser`]/[`de`].
//! - [`schema_builder`] — derives a default schema from a type descriptor
//!   (component F).
//! - [`cache`] — the process-wide `(schema-identity, T)` codec cache (§5).
//! - [`registry`] — the wire-framing and schema-registry collaborator
//!   interfaces (§6.2/§6.3), feature-gated.
//!
//! Run-time failures are reported through [`error::CodecError`]; build-time
//! failures (a schema cannot be represented, or a host type cannot satisfy
//! a schema) are reported through [`error::BuildError`]/[`error::SchemaError`].

pub mod cache;
pub mod codec;
pub mod de;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod schema;
pub mod schema_builder;
pub mod ser;

pub use error::{BuildError, CodecError, ProgramError, SchemaError};
pub use schema::Schema;

use std::io::Write;

/// Encode `value` to Avro binary against `schema`, using a fresh,
/// case-free [`codec::CodecBuilder`] (§4.2 `build_encoder` + `encode`
/// combined, for the common case that needs no custom [`codec::BuilderCase`]).
pub fn to_binary<T: serde::Serialize + descriptor::Described>(value: &T, schema: &Schema) -> Result<Vec<u8>, CodecError> {
	let encoder = codec::CodecBuilder::new()
		.build_binary_encoder::<T>(schema)
		.map_err(|e| CodecError::invalid_data(error::ErrorLocation::Unknown, e.to_string()))?;
	encoder.encode_to_vec(value)
}

/// Encode `value` to Avro binary directly into `writer`.
pub fn to_binary_writer<T: serde::Serialize + descriptor::Described>(
	value: &T,
	schema: &Schema,
	writer: &mut impl Write,
) -> Result<(), CodecError> {
	let encoder = codec::CodecBuilder::new()
		.build_binary_encoder::<T>(schema)
		.map_err(|e| CodecError::invalid_data(error::ErrorLocation::Unknown, e.to_string()))?;
	encoder.encode(value, writer)
}

/// Decode a `T` out of Avro binary `bytes` against `schema`.
pub fn from_binary<T: serde::de::DeserializeOwned + descriptor::Described>(
	bytes: &[u8],
	schema: &Schema,
) -> Result<T, CodecError> {
	let decoder = codec::CodecBuilder::new()
		.build_binary_decoder::<T>(schema)
		.map_err(|e| CodecError::invalid_data(error::ErrorLocation::Unknown, e.to_string()))?;
	decoder.decode(bytes)
}

/// Encode `value` to an Avro-JSON string against `schema`.
pub fn to_json<T: serde::Serialize + descriptor::Described>(value: &T, schema: &Schema) -> Result<String, CodecError> {
	let encoder = codec::CodecBuilder::new()
		.build_json_encoder::<T>(schema)
		.map_err(|e| CodecError::invalid_data(error::ErrorLocation::Unknown, e.to_string()))?;
	encoder.encode_to_string(value)
}

/// Decode a `T` out of an Avro-JSON string against `schema`.
pub fn from_json<T: serde::de::DeserializeOwned + descriptor::Described>(json: &str, schema: &Schema) -> Result<T, CodecError> {
	let decoder = codec::CodecBuilder::new()
		.build_json_decoder::<T>(schema)
		.map_err(|e| CodecError::invalid_data(error::ErrorLocation::Unknown, e.to_string()))?;
	decoder.decode_str(json)
}

//! JSON Avro mapping helpers (§4.4, component D)
//!
//! These are the bits of the JSON mapping that are independent of `serde`
//! dispatch: the `bytes`/`fixed` ISO-8859-1 byte-string mapping and the
//! tagged-union wrapper shape. The actual tree walk lives in
//! [`crate::ser::json`]/[`crate::de::json`], which call back into these
//! helpers at the leaves.

pub mod default_value;

use crate::error::{CodecError, ErrorLocation};

/// Encode raw bytes as a JSON string, one byte per Unicode codepoint
/// (ISO-8859-1, i.e. Latin-1) — this is how the Avro JSON encoding
/// represents `bytes`/`fixed` values, since JSON strings are Unicode text.
pub fn bytes_to_iso8859_1(bytes: &[u8]) -> String {
	bytes.iter().map(|&b| b as char).collect()
}

/// Decode a JSON string produced by [`bytes_to_iso8859_1`] back to bytes.
/// Fails if any character is outside the Latin-1 range (not producible by
/// this library's own encoder, but input from other implementations may be
/// malformed).
pub fn iso8859_1_to_bytes(s: &str) -> Result<Vec<u8>, CodecError> {
	s.chars()
		.map(|c| {
			u8::try_from(c as u32).map_err(|_| {
				CodecError::invalid_data(
					ErrorLocation::Unknown,
					format!("character {c:?} is not representable as a single byte"),
				)
			})
		})
		.collect()
}

/// The Avro JSON name used inside a union's `{"<type-name>": value}` wrapper
/// for a given schema node (§4.4).
pub fn union_branch_tag(schema: &crate::schema::Schema, key: crate::schema::SchemaKey) -> String {
	let node = schema.get(key);
	if let Some(logical) = &node.logical_type {
		return match logical {
			crate::schema::LogicalType::Unknown(name) => name.clone(),
			other => other.as_str().to_owned(),
		};
	}
	use crate::schema::RegularType::*;
	match &node.type_ {
		Null => "null".to_owned(),
		Boolean => "boolean".to_owned(),
		Int => "int".to_owned(),
		Long => "long".to_owned(),
		Float => "float".to_owned(),
		Double => "double".to_owned(),
		Bytes => "bytes".to_owned(),
		String => "string".to_owned(),
		Array(_) => "array".to_owned(),
		Map(_) => "map".to_owned(),
		Union(_) => unreachable!("validated: unions never nest"),
		Record(r) => r.name.fully_qualified_name().to_owned(),
		Enum(e) => e.name.fully_qualified_name().to_owned(),
		Fixed(f) => f.name.fully_qualified_name().to_owned(),
	}
}

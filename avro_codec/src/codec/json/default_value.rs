//! Encodes a record field's schema-supplied JSON default (§4.9) directly to
//! binary, without going through `serde`/a host type — defaults are plain
//! `serde_json::Value`s already parsed out of the schema document.

use crate::error::{CodecError, ErrorLocation};
use crate::schema::{LogicalType, RegularType, Schema, SchemaKey};
use std::io::Write;

/// Encode `value` to binary against `key`'s schema node.
///
/// Per Avro convention (§4.9), a union field's default is interpreted
/// against the union's **first** branch, not dispatched by shape.
pub fn encode_as_binary(
	schema: &Schema,
	key: SchemaKey,
	value: &serde_json::Value,
	writer: &mut impl Write,
) -> Result<(), CodecError> {
	use crate::codec::binary::primitives::*;
	let node = schema.get(key);
	if let RegularType::Union(union) = &node.type_ {
		let first = *union.variants.first().ok_or_else(|| {
			CodecError::invalid_data(ErrorLocation::Unknown, "union schema has no branches")
		})?;
		write_long(writer, 0)?;
		return encode_as_binary(schema, first, value, writer);
	}
	match (&node.type_, value) {
		(RegularType::Null, serde_json::Value::Null) => Ok(()),
		(RegularType::Boolean, serde_json::Value::Bool(b)) => write_boolean(writer, *b),
		(RegularType::Int, serde_json::Value::Number(n)) => {
			write_int(writer, n.as_i64().unwrap_or_default() as i32)
		}
		(RegularType::Long, serde_json::Value::Number(n)) => write_long(writer, n.as_i64().unwrap_or_default()),
		(RegularType::Float, serde_json::Value::Number(n)) => {
			write_float(writer, n.as_f64().unwrap_or_default() as f32)
		}
		(RegularType::Double, serde_json::Value::Number(n)) => write_double(writer, n.as_f64().unwrap_or_default()),
		(RegularType::Bytes, serde_json::Value::String(s)) => match &node.logical_type {
			Some(LogicalType::Decimal(d)) => {
				let dec: rust_decimal::Decimal = s.parse().map_err(|e| {
					CodecError::invalid_data(ErrorLocation::Unknown, format!("default '{s}' not a decimal: {e}"))
				})?;
				crate::codec::binary::decimal::encode(
					writer,
					crate::codec::binary::decimal::Repr::Bytes,
					d.precision,
					d.scale,
					dec,
				)
			}
			_ => write_bytes(writer, &crate::codec::json::iso8859_1_to_bytes(s)?),
		},
		(RegularType::Fixed(fixed), serde_json::Value::String(s)) => {
			let bytes = crate::codec::json::iso8859_1_to_bytes(s)?;
			if bytes.len() != fixed.size {
				return Err(CodecError::invalid_data(
					ErrorLocation::Unknown,
					format!("fixed default has {} bytes, expected {}", bytes.len(), fixed.size),
				));
			}
			write_fixed(writer, &bytes)
		}
		(RegularType::String, serde_json::Value::String(s)) => write_string(writer, s),
		(RegularType::Enum(e), serde_json::Value::String(s)) => {
			let ordinal = e
				.position(s)
				.ok_or_else(|| CodecError::invalid_data(ErrorLocation::Unknown, format!("'{s}' not a symbol of '{}'", e.name)))?;
			write_int(writer, ordinal as i32)
		}
		(RegularType::Array(array), serde_json::Value::Array(items)) => {
			if !items.is_empty() {
				write_long(writer, items.len() as i64)?;
				for item in items {
					encode_as_binary(schema, array.items, item, writer)?;
				}
			}
			write_long(writer, 0)
		}
		(RegularType::Map(map), serde_json::Value::Object(entries)) => {
			if !entries.is_empty() {
				write_long(writer, entries.len() as i64)?;
				for (k, v) in entries {
					write_string(writer, k)?;
					encode_as_binary(schema, map.values, v, writer)?;
				}
			}
			write_long(writer, 0)
		}
		(RegularType::Record(record), serde_json::Value::Object(entries)) => {
			for field in &record.fields {
				match entries.get(&field.name) {
					Some(v) => encode_as_binary(schema, field.type_, v, writer)?,
					None => match &field.default {
						Some(d) => encode_as_binary(schema, field.type_, d, writer)?,
						None => {
							return Err(CodecError::default_missing(
								ErrorLocation::Unknown,
								format!("field '{}' missing from default and has no default of its own", field.name),
							))
						}
					},
				}
			}
			Ok(())
		}
		_ => Err(CodecError::invalid_data(
			ErrorLocation::Unknown,
			format!("default value shape does not match schema kind '{}'", node.kind_name()),
		)),
	}
}

//! Bit-exact Avro binary encoding of primitives (§4.3)
//!
//! `int`/`long` use zig-zag variable-length encoding (delegated to the
//! `integer-encoding` crate, as the teacher does); `float`/`double` are raw
//! IEEE-754 little-endian; `bytes`/`string` are length-prefixed; `fixed` has
//! no prefix at all.

use super::reader::{BinaryRead, BinaryReadSlice, SliceVisitor};
use crate::error::{CodecError, ErrorLocation};
use integer_encoding::VarIntWriter;
use std::io::Write;

pub fn write_null() {}

pub fn write_boolean<W: Write>(w: &mut W, v: bool) -> Result<(), CodecError> {
	w.write_all(&[v as u8])?;
	Ok(())
}

pub fn write_int<W: Write>(w: &mut W, v: i32) -> Result<(), CodecError> {
	w.write_varint(v)?;
	Ok(())
}

pub fn write_long<W: Write>(w: &mut W, v: i64) -> Result<(), CodecError> {
	w.write_varint(v)?;
	Ok(())
}

pub fn write_float<W: Write>(w: &mut W, v: f32) -> Result<(), CodecError> {
	w.write_all(&v.to_le_bytes())?;
	Ok(())
}

pub fn write_double<W: Write>(w: &mut W, v: f64) -> Result<(), CodecError> {
	w.write_all(&v.to_le_bytes())?;
	Ok(())
}

pub fn write_bytes<W: Write>(w: &mut W, v: &[u8]) -> Result<(), CodecError> {
	write_long(w, v.len() as i64)?;
	w.write_all(v)?;
	Ok(())
}

pub fn write_string<W: Write>(w: &mut W, v: &str) -> Result<(), CodecError> {
	write_bytes(w, v.as_bytes())
}

pub fn write_fixed<W: Write>(w: &mut W, v: &[u8]) -> Result<(), CodecError> {
	w.write_all(v)?;
	Ok(())
}

pub fn read_boolean<R: BinaryRead>(r: &mut R) -> Result<bool, CodecError> {
	let [byte] = r.read_const_size_buf::<1>()?;
	match byte {
		0 => Ok(false),
		1 => Ok(true),
		other => Err(CodecError::invalid_data(
			location(r),
			format!("boolean byte must be 0 or 1, got {other}"),
		)),
	}
}

pub fn read_int<R: BinaryRead>(r: &mut R) -> Result<i32, CodecError> {
	r.read_varint()
}

pub fn read_long<R: BinaryRead>(r: &mut R) -> Result<i64, CodecError> {
	r.read_varint()
}

pub fn read_float<R: BinaryRead>(r: &mut R) -> Result<f32, CodecError> {
	Ok(f32::from_le_bytes(r.read_const_size_buf::<4>()?))
}

pub fn read_double<R: BinaryRead>(r: &mut R) -> Result<f64, CodecError> {
	Ok(f64::from_le_bytes(r.read_const_size_buf::<8>()?))
}

/// Reads a `bytes`/`string` length prefix, validating it is non-negative
pub fn read_length<R: BinaryRead>(r: &mut R) -> Result<usize, CodecError> {
	let len: i64 = r.read_varint()?;
	if len < 0 {
		return Err(CodecError::invalid_data(
			location(r),
			format!("negative length prefix: {len}"),
		));
	}
	Ok(len as usize)
}

pub fn read_bytes<'de, R: BinaryReadSlice<'de>>(r: &mut R) -> Result<Vec<u8>, CodecError> {
	let len = read_length(r)?;
	r.read_slice(len, |bytes: &[u8]| Ok(bytes.to_vec()))
}

pub fn read_bytes_borrowed<'de, R: BinaryReadSlice<'de>>(
	r: &mut R,
) -> Result<std::borrow::Cow<'de, [u8]>, CodecError> {
	let len = read_length(r)?;
	struct V;
	impl<'de> SliceVisitor<'de> for V {
		type Value = std::borrow::Cow<'de, [u8]>;
		fn visit(self, bytes: &[u8]) -> Result<Self::Value, CodecError> {
			Ok(std::borrow::Cow::Owned(bytes.to_vec()))
		}
		fn visit_borrowed(self, bytes: &'de [u8]) -> Result<Self::Value, CodecError> {
			Ok(std::borrow::Cow::Borrowed(bytes))
		}
	}
	r.read_slice(len, V)
}

pub fn read_string<'de, R: BinaryReadSlice<'de>>(r: &mut R) -> Result<String, CodecError> {
	let len = read_length(r)?;
	r.read_slice(len, |bytes: &[u8]| {
		std::str::from_utf8(bytes)
			.map(str::to_owned)
			.map_err(|e| CodecError::invalid_data(ErrorLocation::Unknown, format!("invalid UTF-8: {e}")))
	})
}

pub fn read_fixed<'de, R: BinaryReadSlice<'de>>(r: &mut R, size: usize) -> Result<Vec<u8>, CodecError> {
	r.read_slice(size, |bytes: &[u8]| Ok(bytes.to_vec()))
}

fn location<R: BinaryRead>(r: &R) -> ErrorLocation {
	match r.byte_offset() {
		Some(offset) => ErrorLocation::ByteOffset(offset),
		None => ErrorLocation::Unknown,
	}
}

/// Skip rules (§4.3 "Skip rules"): advance past a value without producing
/// one, used when a record's input contains a field absent from the host
/// type (§4.2.3 item 11, §8 property 5).
pub fn skip<'de, R: BinaryReadSlice<'de>>(
	r: &mut R,
	node: &crate::schema::SchemaNode,
	schema: &crate::schema::Schema,
) -> Result<(), CodecError> {
	use crate::schema::RegularType;
	match &node.type_ {
		RegularType::Null => {}
		RegularType::Boolean => {
			read_boolean(r)?;
		}
		RegularType::Int => {
			read_int(r)?;
		}
		RegularType::Long => {
			read_long(r)?;
		}
		RegularType::Float => {
			read_float(r)?;
		}
		RegularType::Double => {
			read_double(r)?;
		}
		RegularType::Bytes | RegularType::String => {
			let len = read_length(r)?;
			r.read_slice(len, |_: &[u8]| Ok(()))?;
		}
		RegularType::Fixed(fixed) => {
			r.read_slice(fixed.size, |_: &[u8]| Ok(()))?;
		}
		RegularType::Enum(_) => {
			read_int(r)?;
		}
		RegularType::Array(array) => {
			super::blocks::skip_blocks(r, |r| skip(r, schema.get(array.items), schema))?;
		}
		RegularType::Map(map) => {
			super::blocks::skip_blocks(r, |r| {
				let _key = read_string(r)?;
				skip(r, schema.get(map.values), schema)
			})?;
		}
		RegularType::Union(union) => {
			let idx = read_long(r)? as usize;
			let variant_key = *union.variants.get(idx).ok_or_else(|| {
				CodecError::invalid_data(location(r), format!("union branch index {idx} out of range"))
			})?;
			skip(r, schema.get(variant_key), schema)?;
		}
		RegularType::Record(record) => {
			for field in &record.fields {
				skip(r, schema.get(field.type_), schema)?;
			}
		}
	}
	Ok(())
}

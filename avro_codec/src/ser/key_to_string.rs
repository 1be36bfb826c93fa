//! Coerces a map key to a string (§4.2.3 item 10: "Key coercion:
//! `toString()`/parse for non-string keys is allowed")

use crate::error::{CodecError, ErrorLocation};
use serde::ser::{self, Serialize};

pub(crate) struct KeyToStringSerializer;

fn unsupported(what: &str) -> CodecError {
	CodecError::invalid_data(ErrorLocation::Unknown, format!("map key of kind '{what}' is not string-convertible"))
}

impl ser::Serializer for KeyToStringSerializer {
	type Ok = String;
	type Error = CodecError;
	type SerializeSeq = ser::Impossible<String, CodecError>;
	type SerializeTuple = ser::Impossible<String, CodecError>;
	type SerializeTupleStruct = ser::Impossible<String, CodecError>;
	type SerializeTupleVariant = ser::Impossible<String, CodecError>;
	type SerializeMap = ser::Impossible<String, CodecError>;
	type SerializeStruct = ser::Impossible<String, CodecError>;
	type SerializeStructVariant = ser::Impossible<String, CodecError>;

	fn serialize_bool(self, v: bool) -> Result<String, CodecError> {
		Ok(v.to_string())
	}
	fn serialize_i8(self, v: i8) -> Result<String, CodecError> {
		Ok(v.to_string())
	}
	fn serialize_i16(self, v: i16) -> Result<String, CodecError> {
		Ok(v.to_string())
	}
	fn serialize_i32(self, v: i32) -> Result<String, CodecError> {
		Ok(v.to_string())
	}
	fn serialize_i64(self, v: i64) -> Result<String, CodecError> {
		Ok(v.to_string())
	}
	fn serialize_u8(self, v: u8) -> Result<String, CodecError> {
		Ok(v.to_string())
	}
	fn serialize_u16(self, v: u16) -> Result<String, CodecError> {
		Ok(v.to_string())
	}
	fn serialize_u32(self, v: u32) -> Result<String, CodecError> {
		Ok(v.to_string())
	}
	fn serialize_u64(self, v: u64) -> Result<String, CodecError> {
		Ok(v.to_string())
	}
	fn serialize_f32(self, v: f32) -> Result<String, CodecError> {
		Ok(v.to_string())
	}
	fn serialize_f64(self, v: f64) -> Result<String, CodecError> {
		Ok(v.to_string())
	}
	fn serialize_char(self, v: char) -> Result<String, CodecError> {
		Ok(v.to_string())
	}
	fn serialize_str(self, v: &str) -> Result<String, CodecError> {
		Ok(v.to_owned())
	}
	fn serialize_bytes(self, _v: &[u8]) -> Result<String, CodecError> {
		Err(unsupported("bytes"))
	}
	fn serialize_none(self) -> Result<String, CodecError> {
		Err(unsupported("none"))
	}
	fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<String, CodecError> {
		value.serialize(self)
	}
	fn serialize_unit(self) -> Result<String, CodecError> {
		Err(unsupported("unit"))
	}
	fn serialize_unit_struct(self, _name: &'static str) -> Result<String, CodecError> {
		Err(unsupported("unit struct"))
	}
	fn serialize_unit_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
	) -> Result<String, CodecError> {
		Ok(variant.to_owned())
	}
	fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<String, CodecError> {
		value.serialize(self)
	}
	fn serialize_newtype_variant<T: ?Sized + Serialize>(
		self,
		_name: &'static str,
		_variant_index: u32,
		_variant: &'static str,
		_value: &T,
	) -> Result<String, CodecError> {
		Err(unsupported("newtype variant"))
	}
	fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, CodecError> {
		Err(unsupported("sequence"))
	}
	fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, CodecError> {
		Err(unsupported("tuple"))
	}
	fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeTupleStruct, CodecError> {
		Err(unsupported("tuple struct"))
	}
	fn serialize_tuple_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		_variant: &'static str,
		_len: usize,
	) -> Result<Self::SerializeTupleVariant, CodecError> {
		Err(unsupported("tuple variant"))
	}
	fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, CodecError> {
		Err(unsupported("map"))
	}
	fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct, CodecError> {
		Err(unsupported("struct"))
	}
	fn serialize_struct_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		_variant: &'static str,
		_len: usize,
	) -> Result<Self::SerializeStructVariant, CodecError> {
		Err(unsupported("struct variant"))
	}
}

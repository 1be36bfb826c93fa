//! Binary deserialization driven by a [`Schema`] (§4.2/§4.3, components C+E)
//!
//! Mirrors [`crate::ser`]'s shape, but union resolution is simpler on this
//! side: the wire always carries an explicit branch index ahead of a union
//! value, so [`NodeDeserializer`] only ever has to *read* which branch was
//! chosen, never guess it from a value in hand the way the encoder does.
//!
//! # For advanced usage
//!
//! Most callers want [`crate::codec::CodecBuilder::build_binary_decoder`] or
//! [`crate::from_binary`]. This module is exposed for callers who need to
//! drive [`NodeDeserializer`] directly.

pub mod json;
mod error;

use crate::codec::binary::blocks::BlockCursor;
use crate::codec::binary::primitives::*;
use crate::codec::binary::reader::{BinaryRead, BinaryReadSlice, IoReader, SliceReader};
use crate::codec::{CaseOutcome, SharedCases};
use crate::error::{BuildError, CodecError, ErrorLocation};
use crate::schema::{LogicalType, RegularType, Record, Schema, SchemaKey, SchemaNode};
use serde::de::{self, Deserialize, DeserializeOwned, DeserializeSeed, Visitor};
use std::marker::PhantomData;

/// A compiled `(Schema, T)` binary decoder (§4.2 `build_decoder`)
///
/// Like [`crate::ser::BinaryEncoder`], build-time failure is limited to what
/// can be known without bytes in hand; malformed input or a schema/type
/// mismatch surfaces as [`CodecError`] from [`Self::decode`]/
/// [`Self::decode_reader`] rather than at [`Self::new`].
pub struct BinaryDecoder<'s, T> {
	schema: &'s Schema,
	cases: SharedCases,
	_marker: PhantomData<fn() -> T>,
}

impl<'s, T: DeserializeOwned> BinaryDecoder<'s, T> {
	pub(crate) fn new(schema: &'s Schema, cases: SharedCases) -> Result<Self, BuildError> {
		Ok(Self {
			schema,
			cases,
			_marker: PhantomData,
		})
	}

	/// Decode a value out of an in-memory buffer.
	pub fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
		let mut reader = SliceReader::new(bytes);
		self.decode_from(&mut reader)
	}

	/// Decode a value out of any [`std::io::Read`], copying into scratch
	/// buffers as needed.
	pub fn decode_reader(&self, reader: impl std::io::Read) -> Result<T, CodecError> {
		let mut reader = IoReader::new(reader);
		self.decode_from(&mut reader)
	}

	/// Decode a single value from `reader`, leaving it positioned right after
	/// the value's bytes.
	pub(crate) fn decode_from<'de, R: BinaryReadSlice<'de>>(&self, reader: &mut R) -> Result<T, CodecError> {
		T::deserialize(NodeDeserializer {
			schema: self.schema,
			key: self.schema.root_key(),
			cases: &self.cases,
			reader,
		})
	}
}

/// Implements `serde::Deserializer` for a single schema node; sub-structures
/// (seq/map/struct/enum) build child `NodeDeserializer`s for their
/// elements/fields/payload.
pub(crate) struct NodeDeserializer<'a, 's, R> {
	pub(crate) schema: &'s Schema,
	pub(crate) key: SchemaKey,
	pub(crate) cases: &'a SharedCases,
	pub(crate) reader: &'a mut R,
}

impl<'a, 's, R> NodeDeserializer<'a, 's, R> {
	fn node(&self) -> &'s SchemaNode {
		self.schema.get(self.key)
	}

	fn unsupported(&self, what: &str) -> CodecError {
		CodecError::invalid_data(
			ErrorLocation::Unknown,
			format!("cannot decode a {what} from schema kind {}", self.node().kind_name()),
		)
	}

	/// Applies a §4.2.3 item 8 enum-symbol rename (the decode-side
	/// counterpart of [`crate::ser::NodeSerializer`]'s symmetric lookup):
	/// given the symbol read off the wire, ask each case in turn whether it
	/// maps to a different host variant name, falling back to the schema
	/// symbol unchanged (case-sensitive match against the host enum).
	fn emitted_symbol(&self, schema_symbol: &str) -> String {
		emitted_symbol(self.cases, schema_symbol)
	}
}

/// Shared between the binary and JSON decoders; see
/// [`NodeDeserializer::emitted_symbol`].
pub(crate) fn emitted_symbol(cases: &SharedCases, schema_symbol: &str) -> String {
	cases
		.iter()
		.find_map(|case| match case.translate_enum_symbol(schema_symbol) {
			CaseOutcome::Built(name) => Some(name),
			_ => None,
		})
		.unwrap_or_else(|| schema_symbol.to_owned())
}

impl<'a, 's, 'de, R: BinaryReadSlice<'de>> NodeDeserializer<'a, 's, R> {
	/// Resolves a union by reading its branch index off the wire (§4.8:
	/// decode never walks branches looking for a match, the index is already
	/// there).
	fn resolve(&mut self) -> Result<SchemaKey, CodecError> {
		if let RegularType::Union(union) = &self.node().type_ {
			let idx = read_long(self.reader)? as usize;
			union.variants.get(idx).copied().ok_or_else(|| {
				CodecError::invalid_data(ErrorLocation::Unknown, format!("union branch index {idx} out of range"))
			})
		} else {
			Ok(self.key)
		}
	}

	/// Reads an `int`/`long` wire value at its full host width, or an
	/// already-host-width float for the `float`/`double` ↔ integer leniency
	/// (§4.2.3 item 3 only mandates widen-then-check for `Int`/`Long`; a
	/// schema `float`/`double` is handed to the visitor unnarrowed, same as
	/// `deserialize_f64` would).
	fn read_integer_or_float(&mut self) -> Result<IntegerOrFloat, CodecError> {
		let key = self.resolve()?;
		match &self.schema.get(key).type_ {
			RegularType::Int => Ok(IntegerOrFloat::Integer(read_int(self.reader)? as i64)),
			RegularType::Long => Ok(IntegerOrFloat::Integer(read_long(self.reader)?)),
			RegularType::Float => Ok(IntegerOrFloat::Float(read_float(self.reader)? as f64)),
			RegularType::Double => Ok(IntegerOrFloat::Float(read_double(self.reader)?)),
			_ => Err(self.unsupported("integer")),
		}
	}

	/// Narrows an `int`/`long` value, already widened to `i64`, down to the
	/// concrete host width `deserialize_iN`/`deserialize_uN` was called for
	/// (§4.2.3 item 3: "widen to host width then check range → `Overflow`").
	fn narrow<N: TryFrom<i64>>(&self, value: i64) -> Result<N, CodecError> {
		N::try_from(value).map_err(|_| {
			CodecError::overflow(
				ErrorLocation::Unknown,
				format!("decoded integer {value} does not fit in the target type"),
			)
		})
	}
}

/// The result of reading a schema `int`/`long`/`float`/`double` node through
/// [`NodeDeserializer::read_integer_or_float`].
enum IntegerOrFloat {
	/// An `int`/`long` value, already widened to `i64`
	Integer(i64),
	/// A `float`/`double` value, already widened to `f64`
	Float(f64),
}

/// The Rust-facing name of a named schema node, used as an enum variant
/// identifier when a union's branch is a record/enum/fixed (§4.5, §8
/// scenario 5) — the decode-side counterpart of the name matching
/// [`crate::ser::NodeSerializer::resolve_record`] does on encode, except
/// here there is nothing to disambiguate: the branch is already known.
fn branch_name(schema: &Schema, key: SchemaKey) -> String {
	let node = schema.get(key);
	match &node.type_ {
		RegularType::Record(r) => r.name.name().to_owned(),
		RegularType::Enum(e) => e.name.name().to_owned(),
		RegularType::Fixed(f) => f.name.name().to_owned(),
		_ => node.kind_name().to_owned(),
	}
}

impl<'a, 's, 'de, R: BinaryReadSlice<'de>> de::Deserializer<'de> for NodeDeserializer<'a, 's, R> {
	type Error = CodecError;

	fn deserialize_any<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		let key = self.resolve()?;
		let node = self.schema.get(key);
		match &node.type_ {
			RegularType::Null => visitor.visit_unit(),
			RegularType::Boolean => visitor.visit_bool(read_boolean(self.reader)?),
			RegularType::Int => visitor.visit_i64(read_int(self.reader)? as i64),
			RegularType::Long => visitor.visit_i64(read_long(self.reader)?),
			RegularType::Float => visitor.visit_f64(read_float(self.reader)? as f64),
			RegularType::Double => visitor.visit_f64(read_double(self.reader)?),
			RegularType::String => visitor.visit_string(read_string(self.reader)?),
			RegularType::Bytes => visitor.visit_byte_buf(read_bytes(self.reader)?),
			RegularType::Fixed(fixed) => visitor.visit_byte_buf(read_fixed(self.reader, fixed.size)?),
			RegularType::Enum(e) => visitor.visit_string(read_enum_symbol(self.reader, e)?),
			RegularType::Array(array) => visitor.visit_seq(SeqAccessState {
				schema: self.schema,
				items_key: array.items,
				cases: self.cases,
				reader: self.reader,
				cursor: BlockCursor::new(),
			}),
			RegularType::Map(map) => visitor.visit_map(MapAccessState {
				schema: self.schema,
				values_key: map.values,
				cases: self.cases,
				reader: self.reader,
				cursor: BlockCursor::new(),
			}),
			RegularType::Record(record) => visitor.visit_map(RecordMapAccess {
				schema: self.schema,
				cases: self.cases,
				reader: self.reader,
				record,
				host_fields: None,
				idx: 0,
			}),
			RegularType::Union(_) => unreachable!("resolve() never returns a union key"),
		}
	}

	fn deserialize_bool<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		let key = self.resolve()?;
		match &self.schema.get(key).type_ {
			RegularType::Boolean => visitor.visit_bool(read_boolean(self.reader)?),
			_ => Err(self.unsupported("bool")),
		}
	}

	fn deserialize_i8<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		match self.read_integer_or_float()? {
			IntegerOrFloat::Integer(v) => visitor.visit_i8(self.narrow(v)?),
			IntegerOrFloat::Float(f) => visitor.visit_f64(f),
		}
	}
	fn deserialize_i16<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		match self.read_integer_or_float()? {
			IntegerOrFloat::Integer(v) => visitor.visit_i16(self.narrow(v)?),
			IntegerOrFloat::Float(f) => visitor.visit_f64(f),
		}
	}
	fn deserialize_i32<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		match self.read_integer_or_float()? {
			IntegerOrFloat::Integer(v) => visitor.visit_i32(self.narrow(v)?),
			IntegerOrFloat::Float(f) => visitor.visit_f64(f),
		}
	}
	fn deserialize_i64<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		match self.read_integer_or_float()? {
			IntegerOrFloat::Integer(v) => visitor.visit_i64(v),
			IntegerOrFloat::Float(f) => visitor.visit_f64(f),
		}
	}
	fn deserialize_u8<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		match self.read_integer_or_float()? {
			IntegerOrFloat::Integer(v) => visitor.visit_u8(self.narrow(v)?),
			IntegerOrFloat::Float(f) => visitor.visit_f64(f),
		}
	}
	fn deserialize_u16<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		match self.read_integer_or_float()? {
			IntegerOrFloat::Integer(v) => visitor.visit_u16(self.narrow(v)?),
			IntegerOrFloat::Float(f) => visitor.visit_f64(f),
		}
	}
	fn deserialize_u32<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		match self.read_integer_or_float()? {
			IntegerOrFloat::Integer(v) => visitor.visit_u32(self.narrow(v)?),
			IntegerOrFloat::Float(f) => visitor.visit_f64(f),
		}
	}
	fn deserialize_u64<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		match self.read_integer_or_float()? {
			IntegerOrFloat::Integer(v) => visitor.visit_u64(self.narrow(v)?),
			IntegerOrFloat::Float(f) => visitor.visit_f64(f),
		}
	}

	fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_f64(visitor)
	}
	fn deserialize_f64<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		let key = self.resolve()?;
		match &self.schema.get(key).type_ {
			RegularType::Double => visitor.visit_f64(read_double(self.reader)?),
			RegularType::Float => visitor.visit_f64(read_float(self.reader)? as f64),
			_ => Err(self.unsupported("float")),
		}
	}

	fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_str(visitor)
	}

	fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_string(visitor)
	}
	fn deserialize_string<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		let key = self.resolve()?;
		let node = self.schema.get(key);
		match (&node.type_, &node.logical_type) {
			(RegularType::String, _) => visitor.visit_string(read_string(self.reader)?),
			(RegularType::Bytes, Some(LogicalType::Decimal(d))) => {
				let value = crate::codec::binary::decimal::decode(
					self.reader,
					crate::codec::binary::decimal::Repr::Bytes,
					d.scale,
				)?;
				visitor.visit_string(value.to_string())
			}
			(RegularType::Fixed(fixed), Some(LogicalType::Decimal(d))) => {
				let value = crate::codec::binary::decimal::decode(
					self.reader,
					crate::codec::binary::decimal::Repr::Fixed { size: fixed.size },
					d.scale,
				)?;
				visitor.visit_string(value.to_string())
			}
			_ => Err(self.unsupported("string")),
		}
	}

	fn deserialize_bytes<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		let key = self.resolve()?;
		match &self.schema.get(key).type_ {
			RegularType::Bytes => visitor.visit_byte_buf(read_bytes(self.reader)?),
			RegularType::Fixed(fixed) => visitor.visit_byte_buf(read_fixed(self.reader, fixed.size)?),
			_ => Err(self.unsupported("bytes")),
		}
	}
	fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_bytes(visitor)
	}

	fn deserialize_option<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		match &self.node().type_ {
			RegularType::Null => visitor.visit_none(),
			RegularType::Union(union) => {
				let idx = read_long(self.reader)? as usize;
				let variant_key = *union.variants.get(idx).ok_or_else(|| {
					CodecError::invalid_data(ErrorLocation::Unknown, format!("union branch index {idx} out of range"))
				})?;
				if matches!(self.schema.get(variant_key).type_, RegularType::Null) {
					visitor.visit_none()
				} else {
					visitor.visit_some(NodeDeserializer {
						schema: self.schema,
						key: variant_key,
						cases: self.cases,
						reader: self.reader,
					})
				}
			}
			_ => visitor.visit_some(self),
		}
	}

	fn deserialize_unit<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		let key = self.resolve()?;
		match &self.schema.get(key).type_ {
			RegularType::Null => visitor.visit_unit(),
			_ => Err(self.unsupported("unit")),
		}
	}
	fn deserialize_unit_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_unit(visitor)
	}

	fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value, CodecError> {
		visitor.visit_newtype_struct(self)
	}

	fn deserialize_seq<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		let key = self.resolve()?;
		match &self.schema.get(key).type_ {
			RegularType::Array(array) => visitor.visit_seq(SeqAccessState {
				schema: self.schema,
				items_key: array.items,
				cases: self.cases,
				reader: self.reader,
				cursor: BlockCursor::new(),
			}),
			_ => Err(self.unsupported("sequence")),
		}
	}
	fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_seq(visitor)
	}
	fn deserialize_tuple_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		_len: usize,
		visitor: V,
	) -> Result<V::Value, CodecError> {
		self.deserialize_seq(visitor)
	}

	fn deserialize_map<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, CodecError> {
		let key = self.resolve()?;
		match &self.schema.get(key).type_ {
			RegularType::Map(map) => visitor.visit_map(MapAccessState {
				schema: self.schema,
				values_key: map.values,
				cases: self.cases,
				reader: self.reader,
				cursor: BlockCursor::new(),
			}),
			_ => Err(self.unsupported("map")),
		}
	}

	fn deserialize_struct<V: Visitor<'de>>(
		mut self,
		_name: &'static str,
		fields: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, CodecError> {
		let key = self.resolve()?;
		match &self.schema.get(key).type_ {
			RegularType::Record(record) => visitor.visit_map(RecordMapAccess {
				schema: self.schema,
				cases: self.cases,
				reader: self.reader,
				record,
				host_fields: Some(fields),
				idx: 0,
			}),
			_ => Err(self.unsupported("struct")),
		}
	}

	fn deserialize_enum<V: Visitor<'de>>(
		mut self,
		_name: &'static str,
		variants: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, CodecError> {
		match &self.node().type_ {
			RegularType::Enum(e) => {
				let symbol = read_enum_symbol(self.reader, e)?;
				visitor.visit_enum(UnitVariantAccess { name: self.emitted_symbol(&symbol) })
			}
			RegularType::String => {
				let symbol = read_string(self.reader)?;
				visitor.visit_enum(UnitVariantAccess { name: self.emitted_symbol(&symbol) })
			}
			RegularType::Int => {
				let ordinal = read_int(self.reader)? as usize;
				let name = variants.get(ordinal).copied().ok_or_else(|| {
					CodecError::invalid_data(
						ErrorLocation::Unknown,
						format!("enum ordinal {ordinal} out of range of {} host variants", variants.len()),
					)
				})?;
				visitor.visit_enum(UnitVariantAccess { name: name.to_owned() })
			}
			RegularType::Union(union) => {
				let idx = read_long(self.reader)? as usize;
				let variant_key = *union.variants.get(idx).ok_or_else(|| {
					CodecError::invalid_data(ErrorLocation::Unknown, format!("union branch index {idx} out of range"))
				})?;
				let name = branch_name(self.schema, variant_key);
				visitor.visit_enum(NewtypeVariantAccess {
					schema: self.schema,
					key: variant_key,
					cases: self.cases,
					reader: self.reader,
					name,
				})
			}
			_ => Err(self.unsupported("enum")),
		}
	}

	fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_str(visitor)
	}

	fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		crate::codec::binary::primitives::skip(self.reader, self.node(), self.schema)?;
		visitor.visit_unit()
	}
}

fn read_enum_symbol<'de, R: BinaryReadSlice<'de>>(reader: &mut R, e: &crate::schema::Enum) -> Result<String, CodecError> {
	let ordinal = read_int(reader)?;
	if ordinal >= 0 && (ordinal as usize) < e.symbols.len() {
		Ok(e.symbols[ordinal as usize].clone())
	} else {
		e.default.clone().ok_or_else(|| {
			CodecError::invalid_data(
				ErrorLocation::Unknown,
				format!("enum ordinal {ordinal} out of range of '{}' and no default symbol", e.name),
			)
		})
	}
}

/// Hands an already-computed name/string to `serde` as if it came off the
/// wire — used for record field keys, map keys, and enum variant names,
/// none of which need any further decode logic of their own.
struct FieldNameDeserializer {
	name: String,
}

impl<'de> de::Deserializer<'de> for FieldNameDeserializer {
	type Error = CodecError;
	fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		visitor.visit_string(self.name)
	}
	fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		visitor.visit_string(self.name)
	}
	serde::forward_to_deserialize_any! {
		bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
		bytes byte_buf option unit unit_struct newtype_struct seq tuple
		tuple_struct map struct enum ignored_any
	}
}

struct SeqAccessState<'a, 's, R> {
	schema: &'s Schema,
	items_key: SchemaKey,
	cases: &'a SharedCases,
	reader: &'a mut R,
	cursor: BlockCursor,
}

impl<'a, 's, 'de, R: BinaryReadSlice<'de>> de::SeqAccess<'de> for SeqAccessState<'a, 's, R> {
	type Error = CodecError;
	fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>, CodecError> {
		if !self.cursor.has_next(self.reader)? {
			return Ok(None);
		}
		self.cursor.consume();
		seed.deserialize(NodeDeserializer {
			schema: self.schema,
			key: self.items_key,
			cases: self.cases,
			reader: &mut *self.reader,
		})
		.map(Some)
	}
}

struct MapAccessState<'a, 's, R> {
	schema: &'s Schema,
	values_key: SchemaKey,
	cases: &'a SharedCases,
	reader: &'a mut R,
	cursor: BlockCursor,
}

impl<'a, 's, 'de, R: BinaryReadSlice<'de>> de::MapAccess<'de> for MapAccessState<'a, 's, R> {
	type Error = CodecError;
	fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, CodecError> {
		if !self.cursor.has_next(self.reader)? {
			return Ok(None);
		}
		let key = read_string(self.reader)?;
		seed.deserialize(FieldNameDeserializer { name: key }).map(Some)
	}
	fn next_value_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<T::Value, CodecError> {
		self.cursor.consume();
		seed.deserialize(NodeDeserializer {
			schema: self.schema,
			key: self.values_key,
			cases: self.cases,
			reader: &mut *self.reader,
		})
	}
}

/// Drives a record's fields in **schema** order, regardless of what order
/// (if any) the host struct declares them in — the wire has no other
/// notion of order. `host_fields`, when given (from `deserialize_struct`'s
/// `FIELDS` constant), is used only to invert a [`crate::codec::BuilderCase`]
/// field rename (§4.5): for each schema field we look for a host field whose
/// translated name matches, so the identifier we hand to `serde`'s generated
/// `Field` enum is the one it actually expects.
struct RecordMapAccess<'a, 's, R> {
	schema: &'s Schema,
	cases: &'a SharedCases,
	reader: &'a mut R,
	record: &'s Record,
	host_fields: Option<&'static [&'static str]>,
	idx: usize,
}

impl<'a, 's, R> RecordMapAccess<'a, 's, R> {
	fn emitted_name(&self, schema_field_name: &str) -> String {
		if let Some(hosts) = self.host_fields {
			for &host in hosts {
				for case in self.cases.iter() {
					if let CaseOutcome::Built(translated) = case.translate_field_name(host) {
						if translated == schema_field_name {
							return host.to_owned();
						}
					}
				}
			}
			// No case rewrote this field; fall back to case-insensitive
			// matching against the host's own field names so serde's
			// generated `Field` visitor (exact-match on `FIELDS`) sees the
			// spelling it expects (§4.2.3 item 11's documented default).
			if let Some(&host) = hosts.iter().find(|h| h.eq_ignore_ascii_case(schema_field_name)) {
				return host.to_owned();
			}
		}
		schema_field_name.to_owned()
	}
}

impl<'a, 's, 'de, R: BinaryReadSlice<'de>> de::MapAccess<'de> for RecordMapAccess<'a, 's, R> {
	type Error = CodecError;
	fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, CodecError> {
		if self.idx >= self.record.fields.len() {
			return Ok(None);
		}
		let name = self.emitted_name(&self.record.fields[self.idx].name);
		seed.deserialize(FieldNameDeserializer { name }).map(Some)
	}
	fn next_value_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<T::Value, CodecError> {
		let field_type = self.record.fields[self.idx].type_;
		self.idx += 1;
		seed.deserialize(NodeDeserializer {
			schema: self.schema,
			key: field_type,
			cases: self.cases,
			reader: &mut *self.reader,
		})
	}
}

/// A fieldless enum variant, named either by an Avro `enum` symbol or by the
/// `string`/`int` alternative shapes (§4.2.3 item 8).
struct UnitVariantAccess {
	name: String,
}

impl<'de> de::EnumAccess<'de> for UnitVariantAccess {
	type Error = CodecError;
	type Variant = Self;
	fn variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<(S::Value, Self), CodecError> {
		let name = self.name.clone();
		let value = seed.deserialize(FieldNameDeserializer { name })?;
		Ok((value, self))
	}
}

impl<'de> de::VariantAccess<'de> for UnitVariantAccess {
	type Error = CodecError;
	fn unit_variant(self) -> Result<(), CodecError> {
		Ok(())
	}
	fn newtype_variant_seed<S: DeserializeSeed<'de>>(self, _seed: S) -> Result<S::Value, CodecError> {
		Err(CodecError::invalid_data(
			ErrorLocation::Unknown,
			"an enum symbol cannot supply a newtype variant's payload",
		))
	}
	fn tuple_variant<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value, CodecError> {
		Err(CodecError::invalid_data(
			ErrorLocation::Unknown,
			"an enum symbol cannot supply a tuple variant's payload",
		))
	}
	fn struct_variant<V: Visitor<'de>>(self, _fields: &'static [&'static str], _visitor: V) -> Result<V::Value, CodecError> {
		Err(CodecError::invalid_data(
			ErrorLocation::Unknown,
			"an enum symbol cannot supply a struct variant's payload",
		))
	}
}

/// A union-of-records branch (§8 scenario 5), identified by the branch's
/// record name and carrying the branch's own content as the variant payload.
struct NewtypeVariantAccess<'a, 's, R> {
	schema: &'s Schema,
	key: SchemaKey,
	cases: &'a SharedCases,
	reader: &'a mut R,
	name: String,
}

impl<'de, 'a, 's, R: BinaryReadSlice<'de>> de::EnumAccess<'de> for NewtypeVariantAccess<'a, 's, R> {
	type Error = CodecError;
	type Variant = Self;
	fn variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<(S::Value, Self), CodecError> {
		let name = self.name.clone();
		let value = seed.deserialize(FieldNameDeserializer { name })?;
		Ok((value, self))
	}
}

impl<'de, 'a, 's, R: BinaryReadSlice<'de>> de::VariantAccess<'de> for NewtypeVariantAccess<'a, 's, R> {
	type Error = CodecError;
	fn unit_variant(self) -> Result<(), CodecError> {
		Err(CodecError::invalid_data(
			ErrorLocation::Unknown,
			"a union branch's record content cannot be a unit variant",
		))
	}
	fn newtype_variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<S::Value, CodecError> {
		seed.deserialize(NodeDeserializer {
			schema: self.schema,
			key: self.key,
			cases: self.cases,
			reader: self.reader,
		})
	}
	fn tuple_variant<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value, CodecError> {
		Err(CodecError::invalid_data(
			ErrorLocation::Unknown,
			"a union branch's record content cannot be a tuple variant",
		))
	}
	fn struct_variant<V: Visitor<'de>>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value, CodecError> {
		match &self.schema.get(self.key).type_ {
			RegularType::Record(record) => visitor.visit_map(RecordMapAccess {
				schema: self.schema,
				cases: self.cases,
				reader: self.reader,
				record,
				host_fields: Some(fields),
				idx: 0,
			}),
			_ => Err(CodecError::invalid_data(
				ErrorLocation::Unknown,
				"union branch selected for a struct variant is not a record",
			)),
		}
	}
}

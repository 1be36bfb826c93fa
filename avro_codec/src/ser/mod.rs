//! Binary serialization driven by a [`Schema`] (§4.2/§4.3, components C+E)
//!
//! Rather than a second dynamic case chain, the fifteen standard cases of
//! §4.2.3 are realized as a direct match over `(SchemaNode, serde data
//! model shape)` inside [`NodeSerializer`]'s `serde::Serializer` impl — the
//! same "walk the schema, call into serde" shape the teacher uses for its
//! own `DatumSerializer`, generalized to cover every schema kind this crate
//! supports rather than just the ones `serde_avro_fast` needed.
//!
//! # For advanced usage
//!
//! Most callers want [`crate::codec::CodecBuilder::build_binary_encoder`] or
//! the even-higher-level [`crate::to_binary`]. This module is exposed for
//! callers who need to drive [`NodeSerializer`] directly, e.g. to reuse an
//! output buffer across many encode calls.

pub mod json;
mod error;
mod key_to_string;

use crate::codec::{CaseOutcome, SharedCases};
use crate::error::{BuildError, CodecError, ErrorLocation};
use crate::schema::{LogicalType, RegularType, Schema, SchemaKey, SchemaNode};
use key_to_string::KeyToStringSerializer;
use serde::ser::{self, Serialize};
use std::io::Write;
use std::marker::PhantomData;

/// A compiled `(Schema, T)` binary encoder (§4.2 `build_encoder`)
///
/// Build-time failure is limited to what can be known without a concrete
/// value in hand (currently: nothing, since `serde`'s dispatch is
/// value-driven) — schema/type mismatches surface as
/// [`CodecError::InvalidData`] from [`Self::encode`] instead of at
/// [`Self::new`]. This is a deliberate deviation from spec's "fails at
/// build time" ideal, recorded in `DESIGN.md`.
pub struct BinaryEncoder<'s, T> {
	schema: &'s Schema,
	cases: SharedCases,
	_marker: PhantomData<fn(&T)>,
}

impl<'s, T: Serialize> BinaryEncoder<'s, T> {
	pub(crate) fn new(schema: &'s Schema, cases: SharedCases) -> Result<Self, BuildError> {
		Ok(Self {
			schema,
			cases,
			_marker: PhantomData,
		})
	}

	pub fn encode(&self, value: &T, writer: &mut impl Write) -> Result<(), CodecError> {
		value.serialize(NodeSerializer {
			schema: self.schema,
			key: self.schema.root_key(),
			cases: &self.cases,
			writer,
		})
	}

	pub fn encode_to_vec(&self, value: &T) -> Result<Vec<u8>, CodecError> {
		let mut buf = Vec::new();
		self.encode(value, &mut buf)?;
		Ok(buf)
	}
}

/// Implements `serde::Serializer` for a single schema node; sub-structures
/// (seq/map/struct) build child `NodeSerializer`s for their elements/fields.
pub(crate) struct NodeSerializer<'a, 's, W> {
	pub(crate) schema: &'s Schema,
	pub(crate) key: SchemaKey,
	pub(crate) cases: &'a SharedCases,
	pub(crate) writer: &'a mut W,
}

impl<'a, 's, W> NodeSerializer<'a, 's, W> {
	fn node(&self) -> &'s SchemaNode {
		self.schema.get(self.key)
	}

	fn unsupported(&self, what: &str) -> CodecError {
		CodecError::invalid_data(
			ErrorLocation::Unknown,
			format!("cannot encode a {what} against schema kind {}", self.node().kind_name()),
		)
	}

	/// Resolves `self.key` to a concrete (non-union) node matching
	/// `matches`, writing a branch index first if `self.key` is a union.
	/// Every leaf/seq/map serialize method uses this so each only needs to
	/// describe what shape of node it accepts, not how union resolution
	/// works (§4.8 "Encode... walk branches in schema order and pick the
	/// first whose codec accepts the host value").
	fn resolve(&mut self, matches: impl Fn(&SchemaNode) -> bool) -> Result<SchemaKey, CodecError>
	where
		W: Write,
	{
		if let RegularType::Union(union) = &self.node().type_ {
			for (idx, &variant) in union.variants.iter().enumerate() {
				if matches(self.schema.get(variant)) {
					crate::codec::binary::primitives::write_long(self.writer, idx as i64)?;
					return Ok(variant);
				}
			}
			Err(CodecError::invalid_data(
				ErrorLocation::Unknown,
				"no union branch accepts this value",
			))
		} else if matches(self.node()) {
			Ok(self.key)
		} else {
			Err(self.unsupported("value"))
		}
	}

	/// Same as [`Self::resolve`] but for struct/record values, which first
	/// consult the §4.5 union-of-records user case, falling back to
	/// record-name matching.
	fn resolve_record(&mut self, host_type_name: &'static str) -> Result<SchemaKey, CodecError>
	where
		W: Write,
	{
		if let RegularType::Union(union) = &self.node().type_ {
			for case in self.cases.iter() {
				match case.select_union_branch(self.schema, union, host_type_name) {
					CaseOutcome::Built(idx) => {
						let variant = *union.variants.get(idx).ok_or_else(|| {
							CodecError::invalid_data(
								ErrorLocation::Unknown,
								"builder case selected an out-of-range union branch",
							)
						})?;
						crate::codec::binary::primitives::write_long(self.writer, idx as i64)?;
						return Ok(variant);
					}
					CaseOutcome::Skipped => continue,
					CaseOutcome::Failure(reason) => {
						return Err(CodecError::invalid_data(ErrorLocation::Unknown, reason))
					}
				}
			}
			for (idx, &variant) in union.variants.iter().enumerate() {
				if let RegularType::Record(record) = &self.schema.get(variant).type_ {
					if record.name.name().eq_ignore_ascii_case(host_type_name) {
						crate::codec::binary::primitives::write_long(self.writer, idx as i64)?;
						return Ok(variant);
					}
				}
			}
			Err(CodecError::invalid_data(
				ErrorLocation::Unknown,
				format!("no union branch named '{host_type_name}'"),
			))
		} else {
			Ok(self.key)
		}
	}

	fn resolve_enum_symbol(&self, e: &crate::schema::Enum, variant: &str) -> Option<usize> {
		resolve_enum_symbol(self.cases, e, variant)
	}
}

/// Applies a §4.2.3 item 8 enum-symbol rename in reverse: a case may
/// translate a schema symbol to a different host variant name, so to encode
/// a host `variant` we look for the schema symbol whose translation matches
/// it before falling back to an exact match against the schema's own symbol
/// list. Shared between the binary and JSON encoders.
pub(crate) fn resolve_enum_symbol(cases: &SharedCases, e: &crate::schema::Enum, variant: &str) -> Option<usize> {
	for (idx, symbol) in e.symbols.iter().enumerate() {
		for case in cases.iter() {
			if let CaseOutcome::Built(translated) = case.translate_enum_symbol(symbol) {
				if translated == variant {
					return Some(idx);
				}
			}
		}
	}
	e.position(variant)
}

macro_rules! unsupported_variant_methods {
	() => {
		fn serialize_tuple_variant(
			self,
			_name: &'static str,
			_variant_index: u32,
			_variant: &'static str,
			_len: usize,
		) -> Result<Self::SerializeTupleVariant, Self::Error> {
			Err(self.unsupported("tuple variant"))
		}

		fn serialize_struct_variant(
			mut self,
			_name: &'static str,
			_variant_index: u32,
			variant: &'static str,
			_len: usize,
		) -> Result<Self::SerializeStructVariant, Self::Error> {
			let key = self.resolve_record(variant)?;
			Ok(StructState {
				schema: self.schema,
				key,
				cases: self.cases,
				writer: self.writer,
				pending: Vec::new(),
			})
		}
	};
}

impl<'a, 's, W: Write> ser::Serializer for NodeSerializer<'a, 's, W> {
	type Ok = ();
	type Error = CodecError;
	type SerializeSeq = SeqState<'a, 's, W>;
	type SerializeTuple = SeqState<'a, 's, W>;
	type SerializeTupleStruct = SeqState<'a, 's, W>;
	type SerializeTupleVariant = SeqState<'a, 's, W>;
	type SerializeMap = MapState<'a, 's, W>;
	type SerializeStruct = StructState<'a, 's, W>;
	type SerializeStructVariant = StructState<'a, 's, W>;

	fn serialize_bool(mut self, v: bool) -> Result<(), CodecError> {
		self.resolve(|n| matches!(n.type_, RegularType::Boolean))?;
		crate::codec::binary::primitives::write_boolean(self.writer, v)
	}

	fn serialize_i8(self, v: i8) -> Result<(), CodecError> {
		self.serialize_i64(v as i64)
	}
	fn serialize_i16(self, v: i16) -> Result<(), CodecError> {
		self.serialize_i64(v as i64)
	}
	fn serialize_i32(self, v: i32) -> Result<(), CodecError> {
		self.serialize_i64(v as i64)
	}
	fn serialize_i64(mut self, v: i64) -> Result<(), CodecError> {
		let key = self.resolve(|n| {
			matches!(
				n.type_,
				RegularType::Int | RegularType::Long | RegularType::Float | RegularType::Double
			)
		})?;
		match &self.schema.get(key).type_ {
			RegularType::Int => crate::codec::binary::primitives::write_int(self.writer, v as i32),
			RegularType::Long => crate::codec::binary::primitives::write_long(self.writer, v),
			RegularType::Float => crate::codec::binary::primitives::write_float(self.writer, v as f32),
			RegularType::Double => crate::codec::binary::primitives::write_double(self.writer, v as f64),
			_ => unreachable!(),
		}
	}
	fn serialize_u8(self, v: u8) -> Result<(), CodecError> {
		self.serialize_i64(v as i64)
	}
	fn serialize_u16(self, v: u16) -> Result<(), CodecError> {
		self.serialize_i64(v as i64)
	}
	fn serialize_u32(self, v: u32) -> Result<(), CodecError> {
		self.serialize_i64(v as i64)
	}
	fn serialize_u64(self, v: u64) -> Result<(), CodecError> {
		self.serialize_i64(v as i64)
	}

	fn serialize_f32(mut self, v: f32) -> Result<(), CodecError> {
		let key = self.resolve(|n| matches!(n.type_, RegularType::Float | RegularType::Double))?;
		match &self.schema.get(key).type_ {
			RegularType::Float => crate::codec::binary::primitives::write_float(self.writer, v),
			RegularType::Double => crate::codec::binary::primitives::write_double(self.writer, v as f64),
			_ => unreachable!(),
		}
	}
	fn serialize_f64(mut self, v: f64) -> Result<(), CodecError> {
		let key = self.resolve(|n| matches!(n.type_, RegularType::Double | RegularType::Float))?;
		match &self.schema.get(key).type_ {
			RegularType::Double => crate::codec::binary::primitives::write_double(self.writer, v),
			RegularType::Float => crate::codec::binary::primitives::write_float(self.writer, v as f32),
			_ => unreachable!(),
		}
	}

	fn serialize_char(self, v: char) -> Result<(), CodecError> {
		let mut buf = [0u8; 4];
		self.serialize_str(v.encode_utf8(&mut buf))
	}

	fn serialize_str(mut self, v: &str) -> Result<(), CodecError> {
		let key = self.resolve(|n| {
			matches!(n.type_, RegularType::String)
				|| matches!((&n.type_, &n.logical_type), (RegularType::Bytes | RegularType::Fixed(_), Some(LogicalType::Decimal(_))))
		})?;
		let node = self.schema.get(key);
		match (&node.type_, &node.logical_type) {
			(RegularType::Bytes, Some(LogicalType::Decimal(d))) => {
				let value: rust_decimal::Decimal = v.parse().map_err(|e| {
					CodecError::invalid_data(ErrorLocation::Unknown, format!("'{v}' is not a valid decimal: {e}"))
				})?;
				crate::codec::binary::decimal::encode(
					self.writer,
					crate::codec::binary::decimal::Repr::Bytes,
					d.precision,
					d.scale,
					value,
				)
			}
			(RegularType::Fixed(fixed), Some(LogicalType::Decimal(d))) => {
				let value: rust_decimal::Decimal = v.parse().map_err(|e| {
					CodecError::invalid_data(ErrorLocation::Unknown, format!("'{v}' is not a valid decimal: {e}"))
				})?;
				crate::codec::binary::decimal::encode(
					self.writer,
					crate::codec::binary::decimal::Repr::Fixed { size: fixed.size },
					d.precision,
					d.scale,
					value,
				)
			}
			_ => crate::codec::binary::primitives::write_string(self.writer, v),
		}
	}

	fn serialize_bytes(mut self, v: &[u8]) -> Result<(), CodecError> {
		let key = self.resolve(|n| matches!(n.type_, RegularType::Bytes | RegularType::Fixed(_)))?;
		match &self.schema.get(key).type_ {
			RegularType::Bytes => crate::codec::binary::primitives::write_bytes(self.writer, v),
			RegularType::Fixed(fixed) => {
				if v.len() != fixed.size {
					return Err(CodecError::invalid_data(
						ErrorLocation::Unknown,
						format!("fixed '{}' expects {} bytes, got {}", fixed.name, fixed.size, v.len()),
					));
				}
				crate::codec::binary::primitives::write_fixed(self.writer, v)
			}
			_ => unreachable!(),
		}
	}

	fn serialize_none(mut self) -> Result<(), CodecError> {
		match &self.node().type_ {
			RegularType::Null => Ok(()),
			RegularType::Union(union) => {
				let idx = match union.as_nullable(self.schema) {
					Some((null_idx, _)) => null_idx,
					None => union
						.variants
						.iter()
						.position(|&v| matches!(self.schema.get(v).type_, RegularType::Null))
						.ok_or_else(|| CodecError::invalid_data(ErrorLocation::Unknown, "no null branch in union"))?,
				};
				crate::codec::binary::primitives::write_long(self.writer, idx as i64)
			}
			_ => Err(self.unsupported("none")),
		}
	}

	fn serialize_some<T: ?Sized + Serialize>(mut self, value: &T) -> Result<(), CodecError> {
		match &self.node().type_ {
			RegularType::Union(union) => {
				let (idx, key) = match union.as_nullable(self.schema) {
					Some((_, non_null_idx)) => (non_null_idx, union.variants[non_null_idx]),
					None => union
						.variants
						.iter()
						.enumerate()
						.find(|(_, &v)| !matches!(self.schema.get(v).type_, RegularType::Null))
						.map(|(i, &v)| (i, v))
						.ok_or_else(|| CodecError::invalid_data(ErrorLocation::Unknown, "union has no non-null branch"))?,
				};
				crate::codec::binary::primitives::write_long(self.writer, idx as i64)?;
				value.serialize(NodeSerializer {
					schema: self.schema,
					key,
					cases: self.cases,
					writer: self.writer,
				})
			}
			_ => value.serialize(self),
		}
	}

	fn serialize_unit(self) -> Result<(), CodecError> {
		if matches!(self.node().type_, RegularType::Null) {
			Ok(())
		} else {
			Err(self.unsupported("unit"))
		}
	}

	fn serialize_unit_struct(self, _name: &'static str) -> Result<(), CodecError> {
		self.serialize_unit()
	}

	fn serialize_unit_variant(
		mut self,
		_name: &'static str,
		variant_index: u32,
		variant: &'static str,
	) -> Result<(), CodecError> {
		let key = self.resolve(|n| matches!(n.type_, RegularType::Enum(_) | RegularType::String | RegularType::Int))?;
		match &self.schema.get(key).type_ {
			RegularType::Enum(e) => {
				let ordinal = self.resolve_enum_symbol(e, variant).ok_or_else(|| {
					CodecError::invalid_data(ErrorLocation::Unknown, format!("'{variant}' is not a symbol of enum '{}'", e.name))
				})?;
				crate::codec::binary::primitives::write_int(self.writer, ordinal as i32)
			}
			RegularType::String => crate::codec::binary::primitives::write_string(self.writer, variant),
			RegularType::Int => crate::codec::binary::primitives::write_int(self.writer, variant_index as i32),
			_ => unreachable!(),
		}
	}

	fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<(), CodecError> {
		value.serialize(self)
	}

	fn serialize_newtype_variant<T: ?Sized + Serialize>(
		mut self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
		value: &T,
	) -> Result<(), CodecError> {
		let key = self.resolve_record(variant)?;
		value.serialize(NodeSerializer {
			schema: self.schema,
			key,
			cases: self.cases,
			writer: self.writer,
		})
	}

	fn serialize_seq(mut self, _len: Option<usize>) -> Result<SeqState<'a, 's, W>, CodecError> {
		let key = self.resolve(|n| matches!(n.type_, RegularType::Array(_)))?;
		let items = match &self.schema.get(key).type_ {
			RegularType::Array(array) => array.items,
			_ => unreachable!(),
		};
		Ok(SeqState {
			schema: self.schema,
			items_key: items,
			cases: self.cases,
			writer: self.writer,
			buf: Vec::new(),
		})
	}

	fn serialize_tuple(self, len: usize) -> Result<SeqState<'a, 's, W>, CodecError> {
		self.serialize_seq(Some(len))
	}

	fn serialize_tuple_struct(
		self,
		_name: &'static str,
		len: usize,
	) -> Result<SeqState<'a, 's, W>, CodecError> {
		self.serialize_seq(Some(len))
	}

	fn serialize_map(mut self, _len: Option<usize>) -> Result<MapState<'a, 's, W>, CodecError> {
		// A `Record` target is accepted here too, for the Dynamic last-resort
		// "record-as-ordered-map" shape (§4.2.3 item 15): a dynamically-typed
		// host map (e.g. `serde_json::Value::Object`) encoded against a
		// record schema, field-matched by key the way `StructState` matches
		// by struct field name.
		let key = self.resolve(|n| matches!(n.type_, RegularType::Map(_) | RegularType::Record(_)))?;
		match &self.schema.get(key).type_ {
			RegularType::Map(map) => Ok(MapState::Map {
				schema: self.schema,
				values_key: map.values,
				cases: self.cases,
				writer: self.writer,
				buf: Vec::new(),
			}),
			RegularType::Record(_) => Ok(MapState::Record {
				schema: self.schema,
				key,
				cases: self.cases,
				writer: self.writer,
				pending: Vec::new(),
			}),
			_ => unreachable!(),
		}
	}

	fn serialize_struct(mut self, name: &'static str, _len: usize) -> Result<StructState<'a, 's, W>, CodecError> {
		let key = self.resolve_record(name)?;
		Ok(StructState {
			schema: self.schema,
			key,
			cases: self.cases,
			writer: self.writer,
			pending: Vec::new(),
		})
	}

	unsupported_variant_methods!();
}

pub(crate) struct SeqState<'a, 's, W> {
	schema: &'s Schema,
	items_key: SchemaKey,
	cases: &'a SharedCases,
	writer: &'a mut W,
	buf: Vec<u8>,
}

impl<'a, 's, W: Write> ser::SerializeSeq for SeqState<'a, 's, W> {
	type Ok = ();
	type Error = CodecError;
	fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CodecError> {
		value.serialize(NodeSerializer {
			schema: self.schema,
			key: self.items_key,
			cases: self.cases,
			writer: &mut self.buf,
		})
	}
	fn end(self) -> Result<(), CodecError> {
		finish_block(self.writer, &self.buf)
	}
}
impl<'a, 's, W: Write> ser::SerializeTuple for SeqState<'a, 's, W> {
	type Ok = ();
	type Error = CodecError;
	fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CodecError> {
		ser::SerializeSeq::serialize_element(self, value)
	}
	fn end(self) -> Result<(), CodecError> {
		ser::SerializeSeq::end(self)
	}
}
impl<'a, 's, W: Write> ser::SerializeTupleStruct for SeqState<'a, 's, W> {
	type Ok = ();
	type Error = CodecError;
	fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CodecError> {
		ser::SerializeSeq::serialize_element(self, value)
	}
	fn end(self) -> Result<(), CodecError> {
		ser::SerializeSeq::end(self)
	}
}
impl<'a, 's, W: Write> ser::SerializeTupleVariant for SeqState<'a, 's, W> {
	type Ok = ();
	type Error = CodecError;
	fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CodecError> {
		ser::SerializeSeq::serialize_element(self, value)
	}
	fn end(self) -> Result<(), CodecError> {
		ser::SerializeSeq::end(self)
	}
}

fn finish_block<W: Write>(writer: &mut W, items_bytes: &[u8]) -> Result<(), CodecError> {
	if !items_bytes.is_empty() {
		writer.write_all(items_bytes)?;
	}
	crate::codec::binary::primitives::write_long(writer, 0)
}

pub(crate) enum MapState<'a, 's, W> {
	Map {
		schema: &'s Schema,
		values_key: SchemaKey,
		cases: &'a SharedCases,
		writer: &'a mut W,
		buf: Vec<u8>,
	},
	/// Dynamic last-resort "record-as-ordered-map" backend (§4.2.3 item 15,
	/// see `serialize_map` above): each key is matched case-insensitively
	/// against the record's field names, missing keys fall back to the
	/// field's schema default exactly as `StructState::end` does, and keys
	/// with no matching field are dropped (the encode-side mirror of
	/// decode's skip-unknown-field behavior, §4.3 "Skip rules").
	Record {
		schema: &'s Schema,
		key: SchemaKey,
		cases: &'a SharedCases,
		writer: &'a mut W,
		pending: Vec<(String, Option<Vec<u8>>)>,
	},
}

impl<'a, 's, W: Write> ser::SerializeMap for MapState<'a, 's, W> {
	type Ok = ();
	type Error = CodecError;
	fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), CodecError> {
		let key_string = key.serialize(KeyToStringSerializer)?;
		match self {
			MapState::Map { buf, .. } => crate::codec::binary::primitives::write_string(buf, &key_string),
			MapState::Record { pending, .. } => {
				pending.push((key_string, None));
				Ok(())
			}
		}
	}
	fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CodecError> {
		match self {
			MapState::Map { schema, values_key, cases, buf, .. } => value.serialize(NodeSerializer {
				schema: *schema,
				key: *values_key,
				cases: *cases,
				writer: buf,
			}),
			MapState::Record { schema, key, cases, pending, .. } => {
				let (field_name, slot) = pending.last_mut().expect("serialize_key always precedes serialize_value");
				let field_type = match &schema.get(*key).type_ {
					RegularType::Record(record) => record
						.field_index_case_insensitive(field_name)
						.map(|idx| record.fields[idx].type_),
					_ => None,
				};
				if let Some(field_type) = field_type {
					let mut buf = Vec::new();
					value.serialize(NodeSerializer {
						schema: *schema,
						key: field_type,
						cases: *cases,
						writer: &mut buf,
					})?;
					*slot = Some(buf);
				}
				Ok(())
			}
		}
	}
	fn end(self) -> Result<(), CodecError> {
		match self {
			MapState::Map { writer, buf, .. } => finish_block(writer, &buf),
			MapState::Record { schema, key, writer, pending, .. } => {
				let record = match &schema.get(key).type_ {
					RegularType::Record(record) => record,
					_ => {
						return Err(CodecError::invalid_data(
							ErrorLocation::Unknown,
							"map serialized against non-record schema",
						))
					}
				};
				for field in &record.fields {
					match pending.iter().find(|(name, _)| name.eq_ignore_ascii_case(&field.name)) {
						Some((_, Some(bytes))) => writer.write_all(bytes)?,
						_ => match &field.default {
							Some(default_json) => encode_default(writer, schema, field.type_, default_json)?,
							None => {
								return Err(CodecError::default_missing(
									ErrorLocation::Unknown,
									format!("field '{}' has no value and no default", field.name),
								))
							}
						},
					}
				}
				Ok(())
			}
		}
	}
}

pub(crate) struct StructState<'a, 's, W> {
	schema: &'s Schema,
	key: SchemaKey,
	cases: &'a SharedCases,
	writer: &'a mut W,
	pending: Vec<(&'static str, Vec<u8>)>,
}

impl<'a, 's, W: Write> ser::SerializeStruct for StructState<'a, 's, W> {
	type Ok = ();
	type Error = CodecError;
	fn serialize_field<T: ?Sized + Serialize>(
		&mut self,
		key: &'static str,
		value: &T,
	) -> Result<(), CodecError> {
		let translated = self
			.cases
			.iter()
			.find_map(|case| match case.translate_field_name(key) {
				CaseOutcome::Built(name) => Some(name),
				_ => None,
			})
			.unwrap_or_else(|| key.to_owned());
		let field_type = match &self.schema.get(self.key).type_ {
			RegularType::Record(record) => record
				.field_index_case_insensitive(&translated)
				.map(|idx| record.fields[idx].type_),
			_ => {
				return Err(CodecError::invalid_data(
					ErrorLocation::Unknown,
					"struct serialized against non-record schema",
				))
			}
		};
		if let Some(field_type) = field_type {
			let mut buf = Vec::new();
			value.serialize(NodeSerializer {
				schema: self.schema,
				key: field_type,
				cases: self.cases,
				writer: &mut buf,
			})?;
			self.pending.push((key, buf));
		}
		Ok(())
	}
	fn end(self) -> Result<(), CodecError> {
		let record = match &self.schema.get(self.key).type_ {
			RegularType::Record(record) => record,
			_ => {
				return Err(CodecError::invalid_data(
					ErrorLocation::Unknown,
					"struct serialized against non-record schema",
				))
			}
		};
		for field in &record.fields {
			match self.pending.iter().find(|(name, _)| name.eq_ignore_ascii_case(&field.name)) {
				Some((_, bytes)) => self.writer.write_all(bytes)?,
				None => match &field.default {
					Some(default_json) => encode_default(self.writer, self.schema, field.type_, default_json)?,
					None => {
						return Err(CodecError::default_missing(
							ErrorLocation::Unknown,
							format!("field '{}' has no value and no default", field.name),
						))
					}
				},
			}
		}
		Ok(())
	}
}

impl<'a, 's, W: Write> ser::SerializeStructVariant for StructState<'a, 's, W> {
	type Ok = ();
	type Error = CodecError;
	fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<(), CodecError> {
		ser::SerializeStruct::serialize_field(self, key, value)
	}
	fn end(self) -> Result<(), CodecError> {
		ser::SerializeStruct::end(self)
	}
}

/// Encodes a record field's schema-supplied default (§4.9) by interpreting
/// the default's JSON value directly against `field_type` (Avro convention:
/// for a union field the default is interpreted against the union's first
/// branch).
fn encode_default<W: Write>(
	writer: &mut W,
	schema: &Schema,
	field_type: SchemaKey,
	default_json: &serde_json::Value,
) -> Result<(), CodecError> {
	crate::codec::json::default_value::encode_as_binary(schema, field_type, default_json, writer)
}

//! JSON deserialization driven by a [`Schema`] (§4.4, components D+E)
//!
//! Mirrors [`crate::ser::json`]'s shape on the way in: the input is first
//! parsed into a [`serde_json::Value`] tree (reusing `serde_json`'s own
//! reader rather than hand-rolling JSON tokenization) and then walked
//! alongside the schema, exactly like [`crate::de::NodeDeserializer`] walks
//! bytes alongside the schema on the binary side. Object keys are matched
//! by name rather than position, so "decoder must accept any order of
//! object keys" (§4.4) falls out for free, and a record field present in
//! the input but absent from the host type is simply never looked up
//! (§4.4's JSON skip rule, without needing a token-level skip).

use crate::codec::{CaseOutcome, SharedCases};
use crate::error::{BuildError, CodecError, ErrorLocation};
use crate::schema::{LogicalType, RegularType, Record, Schema, SchemaKey, SchemaNode};
use serde::de::{self, Deserialize, DeserializeOwned, DeserializeSeed, Visitor};
use serde_json::Value;
use std::marker::PhantomData;

/// A compiled `(Schema, T)` JSON decoder (§4.2 `build_decoder`)
pub struct JsonDecoder<'s, T> {
	schema: &'s Schema,
	cases: SharedCases,
	_marker: PhantomData<fn() -> T>,
}

impl<'s, T: DeserializeOwned> JsonDecoder<'s, T> {
	pub(crate) fn new(schema: &'s Schema, cases: SharedCases) -> Result<Self, BuildError> {
		Ok(Self {
			schema,
			cases,
			_marker: PhantomData,
		})
	}

	/// Decode a value already parsed into a [`serde_json::Value`] tree.
	pub fn decode_value(&self, value: &Value) -> Result<T, CodecError> {
		T::deserialize(NodeDeserializer {
			schema: self.schema,
			key: self.schema.root_key(),
			cases: &self.cases,
			value,
			path: "$".to_owned(),
		})
	}

	/// Parse `s` as JSON and decode it.
	pub fn decode_str(&self, s: &str) -> Result<T, CodecError> {
		let value: Value = serde_json::from_str(s)
			.map_err(|e| CodecError::invalid_data(ErrorLocation::JsonPath("$".to_owned()), e.to_string()))?;
		self.decode_value(&value)
	}

	/// Parse JSON off any [`std::io::Read`] and decode it.
	pub fn decode_reader(&self, reader: impl std::io::Read) -> Result<T, CodecError> {
		let value: Value = serde_json::from_reader(reader)
			.map_err(|e| CodecError::invalid_data(ErrorLocation::JsonPath("$".to_owned()), e.to_string()))?;
		self.decode_value(&value)
	}
}

struct NodeDeserializer<'a, 's> {
	schema: &'s Schema,
	key: SchemaKey,
	cases: &'a SharedCases,
	value: &'a Value,
	path: String,
}

impl<'a, 's> NodeDeserializer<'a, 's> {
	fn node(&self) -> &'s SchemaNode {
		self.schema.get(self.key)
	}

	fn err(&self, reason: impl Into<String>) -> CodecError {
		CodecError::invalid_data(ErrorLocation::JsonPath(self.path.clone()), reason)
	}

	fn unsupported(&self, what: &str) -> CodecError {
		self.err(format!(
			"cannot JSON-decode a {what} from schema kind {} (got {})",
			self.node().kind_name(),
			kind_of(self.value)
		))
	}

	fn child(&self, key: SchemaKey, value: &'a Value, suffix: impl std::fmt::Display) -> NodeDeserializer<'a, 's> {
		NodeDeserializer {
			schema: self.schema,
			key,
			cases: self.cases,
			value,
			path: format!("{}{}", self.path, suffix),
		}
	}

	/// Resolves a union: a `null` token picks the null branch, otherwise the
	/// single-keyed wrapper object's key selects the branch by name (§4.8
	/// "JSON: a `null` token picks the null branch... otherwise the
	/// single-keyed object's key is used to select the branch by name").
	fn resolve(&self) -> Result<(SchemaKey, &'a Value), CodecError> {
		match &self.node().type_ {
			RegularType::Union(union) => match self.value {
				Value::Null => {
					let null_key = union
						.variants
						.iter()
						.find(|&&v| matches!(self.schema.get(v).type_, RegularType::Null))
						.ok_or_else(|| self.err("json `null` given but union has no null branch"))?;
					Ok((*null_key, self.value))
				}
				Value::Object(obj) if obj.len() == 1 => {
					let (tag, inner) = obj.iter().next().unwrap();
					let variant = union
						.variants
						.iter()
						.find(|&&v| &crate::codec::json::union_branch_tag(self.schema, v) == tag)
						.ok_or_else(|| self.err(format!("no union branch named '{tag}'")))?;
					Ok((*variant, inner))
				}
				Value::Object(_) => Err(self.err("union wrapper object must have exactly one key")),
				_ => Err(self.err("union value must be `null` or a single-keyed object")),
			},
			_ => Ok((self.key, self.value)),
		}
	}
}

fn kind_of(v: &Value) -> &'static str {
	match v {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

fn branch_name(schema: &Schema, key: SchemaKey) -> String {
	let node = schema.get(key);
	match &node.type_ {
		RegularType::Record(r) => r.name.name().to_owned(),
		RegularType::Enum(e) => e.name.name().to_owned(),
		RegularType::Fixed(f) => f.name.name().to_owned(),
		_ => node.kind_name().to_owned(),
	}
}

impl<'a, 's, 'de> de::Deserializer<'de> for NodeDeserializer<'a, 's> {
	type Error = CodecError;

	fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		let (key, value) = self.resolve()?;
		let node = self.schema.get(key);
		match (&node.type_, value) {
			(RegularType::Null, Value::Null) => visitor.visit_unit(),
			(RegularType::Boolean, Value::Bool(b)) => visitor.visit_bool(*b),
			(RegularType::Int, Value::Number(n)) => visitor.visit_i64(
				n.as_i64()
					.ok_or_else(|| self.err(format!("'{n}' is not a valid int")))?,
			),
			(RegularType::Long, Value::Number(n)) => visitor.visit_i64(
				n.as_i64()
					.ok_or_else(|| self.err(format!("'{n}' is not a valid long")))?,
			),
			(RegularType::Float, Value::Number(n)) => visitor.visit_f64(
				n.as_f64()
					.ok_or_else(|| self.err(format!("'{n}' is not a valid float")))?,
			),
			(RegularType::Double, Value::Number(n)) => visitor.visit_f64(
				n.as_f64()
					.ok_or_else(|| self.err(format!("'{n}' is not a valid double")))?,
			),
			(RegularType::String, Value::String(s)) => visitor.visit_string(s.clone()),
			(RegularType::Bytes, Value::String(s)) | (RegularType::Fixed(_), Value::String(s)) => {
				visitor.visit_byte_buf(crate::codec::json::iso8859_1_to_bytes(s)?)
			}
			(RegularType::Enum(e), Value::String(s)) => {
				if e.position(s).is_some() {
					visitor.visit_string(s.clone())
				} else {
					match e.default.clone() {
						Some(d) => visitor.visit_string(d),
						None => Err(self.err(format!("'{s}' is not a symbol of enum '{}' and no default", e.name))),
					}
				}
			}
			(RegularType::Array(array), Value::Array(items)) => visitor.visit_seq(SeqAccessState {
				schema: self.schema,
				items_key: array.items,
				cases: self.cases,
				items: items.iter(),
				path: self.path.clone(),
				idx: 0,
			}),
			(RegularType::Map(map), Value::Object(entries)) => visitor.visit_map(MapAccessState {
				schema: self.schema,
				values_key: map.values,
				cases: self.cases,
				entries: entries.iter(),
				pending_value: None,
				path: self.path.clone(),
			}),
			(RegularType::Record(record), Value::Object(entries)) => visitor.visit_map(RecordMapAccess {
				schema: self.schema,
				cases: self.cases,
				entries,
				record,
				host_fields: None,
				idx: 0,
				path: self.path.clone(),
			}),
			_ => Err(self.unsupported("value")),
		}
	}

	fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		let (key, value) = self.resolve()?;
		match (&self.schema.get(key).type_, value) {
			(RegularType::Boolean, Value::Bool(b)) => visitor.visit_bool(*b),
			_ => Err(self.unsupported("bool")),
		}
	}

	fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_i64(visitor)
	}
	fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_i64(visitor)
	}
	fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_i64(visitor)
	}
	fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		let (key, value) = self.resolve()?;
		match (&self.schema.get(key).type_, value) {
			(RegularType::Int | RegularType::Long, Value::Number(n)) => {
				visitor.visit_i64(n.as_i64().ok_or_else(|| self.err(format!("'{n}' is not an integer")))?)
			}
			(RegularType::Float | RegularType::Double, Value::Number(n)) => {
				visitor.visit_f64(n.as_f64().ok_or_else(|| self.err(format!("'{n}' is not a number")))?)
			}
			_ => Err(self.unsupported("integer")),
		}
	}
	fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_i64(visitor)
	}
	fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_i64(visitor)
	}
	fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_i64(visitor)
	}
	fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_i64(visitor)
	}
	fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_f64(visitor)
	}
	fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		let (key, value) = self.resolve()?;
		match (&self.schema.get(key).type_, value) {
			(RegularType::Double | RegularType::Float, Value::Number(n)) => {
				visitor.visit_f64(n.as_f64().ok_or_else(|| self.err(format!("'{n}' is not a number")))?)
			}
			_ => Err(self.unsupported("float")),
		}
	}

	fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_str(visitor)
	}
	fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_string(visitor)
	}
	fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		let (key, value) = self.resolve()?;
		let node = self.schema.get(key);
		match (&node.type_, &node.logical_type, value) {
			(RegularType::String, _, Value::String(s)) => visitor.visit_string(s.clone()),
			(RegularType::Bytes, Some(LogicalType::Decimal(d)), Value::String(s)) => {
				let raw = crate::codec::json::iso8859_1_to_bytes(s)?;
				let mut reader = crate::codec::binary::reader::SliceReader::new(&raw);
				let value = crate::codec::binary::decimal::decode(
					&mut reader,
					crate::codec::binary::decimal::Repr::Bytes,
					d.scale,
				)?;
				visitor.visit_string(value.to_string())
			}
			(RegularType::Fixed(fixed), Some(LogicalType::Decimal(d)), Value::String(s)) => {
				let raw = crate::codec::json::iso8859_1_to_bytes(s)?;
				let mut reader = crate::codec::binary::reader::SliceReader::new(&raw);
				let value = crate::codec::binary::decimal::decode(
					&mut reader,
					crate::codec::binary::decimal::Repr::Fixed { size: fixed.size },
					d.scale,
				)?;
				visitor.visit_string(value.to_string())
			}
			_ => Err(self.unsupported("string")),
		}
	}

	fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		let (key, value) = self.resolve()?;
		match (&self.schema.get(key).type_, value) {
			(RegularType::Bytes, Value::String(s)) => visitor.visit_byte_buf(crate::codec::json::iso8859_1_to_bytes(s)?),
			(RegularType::Fixed(fixed), Value::String(s)) => {
				let bytes = crate::codec::json::iso8859_1_to_bytes(s)?;
				if bytes.len() != fixed.size {
					return Err(self.err(format!("fixed '{}' expects {} bytes, got {}", fixed.name, fixed.size, bytes.len())));
				}
				visitor.visit_byte_buf(bytes)
			}
			_ => Err(self.unsupported("bytes")),
		}
	}
	fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_bytes(visitor)
	}

	fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		match &self.node().type_ {
			RegularType::Null => {
				if matches!(self.value, Value::Null) {
					visitor.visit_none()
				} else {
					Err(self.unsupported("option"))
				}
			}
			RegularType::Union(_) => {
				let (key, value) = self.resolve()?;
				if matches!(self.schema.get(key).type_, RegularType::Null) {
					visitor.visit_none()
				} else {
					visitor.visit_some(self.child(key, value, ""))
				}
			}
			_ => visitor.visit_some(self),
		}
	}

	fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		let (key, value) = self.resolve()?;
		match (&self.schema.get(key).type_, value) {
			(RegularType::Null, Value::Null) => visitor.visit_unit(),
			_ => Err(self.unsupported("unit")),
		}
	}
	fn deserialize_unit_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_unit(visitor)
	}
	fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value, CodecError> {
		visitor.visit_newtype_struct(self)
	}

	fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		let (key, value) = self.resolve()?;
		match (&self.schema.get(key).type_, value) {
			(RegularType::Array(array), Value::Array(items)) => visitor.visit_seq(SeqAccessState {
				schema: self.schema,
				items_key: array.items,
				cases: self.cases,
				items: items.iter(),
				path: self.path.clone(),
				idx: 0,
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

	fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		let (key, value) = self.resolve()?;
		match (&self.schema.get(key).type_, value) {
			(RegularType::Map(map), Value::Object(entries)) => visitor.visit_map(MapAccessState {
				schema: self.schema,
				values_key: map.values,
				cases: self.cases,
				entries: entries.iter(),
				pending_value: None,
				path: self.path.clone(),
			}),
			_ => Err(self.unsupported("map")),
		}
	}

	fn deserialize_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		fields: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, CodecError> {
		let (key, value) = self.resolve()?;
		match (&self.schema.get(key).type_, value) {
			(RegularType::Record(record), Value::Object(entries)) => visitor.visit_map(RecordMapAccess {
				schema: self.schema,
				cases: self.cases,
				entries,
				record,
				host_fields: Some(fields),
				idx: 0,
				path: self.path.clone(),
			}),
			_ => Err(self.unsupported("struct")),
		}
	}

	fn deserialize_enum<V: Visitor<'de>>(
		self,
		_name: &'static str,
		variants: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, CodecError> {
		match &self.node().type_ {
			RegularType::Enum(e) => match self.value {
				Value::String(s) => {
					let symbol = if e.position(s).is_some() {
						s.clone()
					} else {
						e.default
							.clone()
							.ok_or_else(|| self.err(format!("'{s}' is not a symbol of enum '{}' and no default", e.name)))?
					};
					visitor.visit_enum(super::UnitVariantAccess { name: super::emitted_symbol(self.cases, &symbol) })
				}
				_ => Err(self.unsupported("enum")),
			},
			RegularType::String => match self.value {
				Value::String(s) => visitor.visit_enum(super::UnitVariantAccess { name: s.clone() }),
				_ => Err(self.unsupported("enum")),
			},
			RegularType::Int => match self.value {
				Value::Number(n) => {
					let ordinal = n.as_u64().ok_or_else(|| self.err("enum ordinal must be a non-negative integer"))? as usize;
					let name = variants
						.get(ordinal)
						.ok_or_else(|| self.err(format!("enum ordinal {ordinal} out of range of {} host variants", variants.len())))?;
					visitor.visit_enum(super::UnitVariantAccess { name: (*name).to_owned() })
				}
				_ => Err(self.unsupported("enum")),
			},
			RegularType::Union(_) => {
				let (key, value) = self.resolve()?;
				let name = branch_name(self.schema, key);
				visitor.visit_enum(NewtypeVariantAccess {
					schema: self.schema,
					key,
					cases: self.cases,
					value,
					name,
					path: self.path.clone(),
				})
			}
			_ => Err(self.unsupported("enum")),
		}
	}

	fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		self.deserialize_str(visitor)
	}

	fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
		visitor.visit_unit()
	}
}

struct SeqAccessState<'a, 's> {
	schema: &'s Schema,
	items_key: SchemaKey,
	cases: &'a SharedCases,
	items: std::slice::Iter<'a, Value>,
	path: String,
	idx: usize,
}
impl<'a, 's, 'de> de::SeqAccess<'de> for SeqAccessState<'a, 's> {
	type Error = CodecError;
	fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>, CodecError> {
		match self.items.next() {
			None => Ok(None),
			Some(value) => {
				let idx = self.idx;
				self.idx += 1;
				seed.deserialize(NodeDeserializer {
					schema: self.schema,
					key: self.items_key,
					cases: self.cases,
					value,
					path: format!("{}[{idx}]", self.path),
				})
				.map(Some)
			}
		}
	}
}

struct MapAccessState<'a, 's> {
	schema: &'s Schema,
	values_key: SchemaKey,
	cases: &'a SharedCases,
	entries: serde_json::map::Iter<'a>,
	pending_value: Option<&'a Value>,
	path: String,
}
impl<'a, 's, 'de> de::MapAccess<'de> for MapAccessState<'a, 's> {
	type Error = CodecError;
	fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, CodecError> {
		match self.entries.next() {
			None => Ok(None),
			Some((k, v)) => {
				self.pending_value = Some(v);
				seed.deserialize(super::FieldNameDeserializer { name: k.clone() }).map(Some)
			}
		}
	}
	fn next_value_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<T::Value, CodecError> {
		let value = self.pending_value.take().expect("next_value_seed called before next_key_seed");
		seed.deserialize(NodeDeserializer {
			schema: self.schema,
			key: self.values_key,
			cases: self.cases,
			value,
			path: format!("{}.<value>", self.path),
		})
	}
}

/// Drives a record's fields by **name** rather than position: the JSON
/// object has no positional meaning, so every field is looked up in
/// `entries` directly, falling back to the schema's default and then to
/// [`CodecError::DefaultMissing`] (§4.9) exactly as the binary side does.
struct RecordMapAccess<'a, 's> {
	schema: &'s Schema,
	cases: &'a SharedCases,
	entries: &'a serde_json::Map<String, Value>,
	record: &'s Record,
	host_fields: Option<&'static [&'static str]>,
	idx: usize,
	path: String,
}

impl<'a, 's> RecordMapAccess<'a, 's> {
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

impl<'a, 's, 'de> de::MapAccess<'de> for RecordMapAccess<'a, 's> {
	type Error = CodecError;
	fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, CodecError> {
		if self.idx >= self.record.fields.len() {
			return Ok(None);
		}
		let name = self.emitted_name(&self.record.fields[self.idx].name);
		seed.deserialize(super::FieldNameDeserializer { name }).map(Some)
	}
	fn next_value_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<T::Value, CodecError> {
		let field = &self.record.fields[self.idx];
		self.idx += 1;
		match self.entries.get(&field.name) {
			Some(value) => seed.deserialize(NodeDeserializer {
				schema: self.schema,
				key: field.type_,
				cases: self.cases,
				value,
				path: format!("{}.{}", self.path, field.name),
			}),
			None => match &field.default {
				Some(default_json) => seed.deserialize(NodeDeserializer {
					schema: self.schema,
					key: field.type_,
					cases: self.cases,
					value: default_json,
					path: format!("{}.{}<default>", self.path, field.name),
				}),
				None => Err(CodecError::default_missing(
					ErrorLocation::JsonPath(self.path.clone()),
					format!("field '{}' is missing from input and has no default", field.name),
				)),
			},
		}
	}
}

struct NewtypeVariantAccess<'a, 's> {
	schema: &'s Schema,
	key: SchemaKey,
	cases: &'a SharedCases,
	value: &'a Value,
	name: String,
	path: String,
}
impl<'a, 's, 'de> de::EnumAccess<'de> for NewtypeVariantAccess<'a, 's> {
	type Error = CodecError;
	type Variant = Self;
	fn variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<(S::Value, Self), CodecError> {
		let name = self.name.clone();
		let value = seed.deserialize(super::FieldNameDeserializer { name })?;
		Ok((value, self))
	}
}
impl<'a, 's, 'de> de::VariantAccess<'de> for NewtypeVariantAccess<'a, 's> {
	type Error = CodecError;
	fn unit_variant(self) -> Result<(), CodecError> {
		Err(CodecError::invalid_data(
			ErrorLocation::JsonPath(self.path),
			"a union branch's record content cannot be a unit variant",
		))
	}
	fn newtype_variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<S::Value, CodecError> {
		seed.deserialize(NodeDeserializer {
			schema: self.schema,
			key: self.key,
			cases: self.cases,
			value: self.value,
			path: self.path,
		})
	}
	fn tuple_variant<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value, CodecError> {
		Err(CodecError::invalid_data(
			ErrorLocation::JsonPath(self.path),
			"a union branch's record content cannot be a tuple variant",
		))
	}
	fn struct_variant<V: Visitor<'de>>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value, CodecError> {
		match (&self.schema.get(self.key).type_, self.value) {
			(RegularType::Record(record), Value::Object(entries)) => visitor.visit_map(RecordMapAccess {
				schema: self.schema,
				cases: self.cases,
				entries,
				record,
				host_fields: Some(fields),
				idx: 0,
				path: self.path,
			}),
			_ => Err(CodecError::invalid_data(
				ErrorLocation::JsonPath(self.path),
				"union branch selected for a struct variant is not a JSON object",
			)),
		}
	}
}

//! JSON serialization driven by a [`Schema`] (§4.4, components D+E)
//!
//! Produces a [`serde_json::Value`] tree following Avro's JSON mapping
//! (tagged unions, ISO-8859-1 `bytes`/`fixed`) and writes it with
//! `serde_json`'s own writer, rather than hand-rolling JSON token output —
//! `serde_json` is already the teacher's JSON dependency for the schema
//! surface (§6.1), reused here for the value surface too.

use crate::codec::{CaseOutcome, SharedCases};
use crate::error::{BuildError, CodecError, ErrorLocation};
use crate::schema::{LogicalType, RegularType, Schema, SchemaKey, SchemaNode};
use serde::ser::{self, Serialize};
use serde_json::{Map as JsonMap, Value};
use std::io::Write;
use std::marker::PhantomData;

pub struct JsonEncoder<'s, T> {
	schema: &'s Schema,
	cases: SharedCases,
	_marker: PhantomData<fn(&T)>,
}

impl<'s, T: Serialize> JsonEncoder<'s, T> {
	pub(crate) fn new(schema: &'s Schema, cases: SharedCases) -> Result<Self, BuildError> {
		Ok(Self {
			schema,
			cases,
			_marker: PhantomData,
		})
	}

	pub fn encode_to_value(&self, value: &T) -> Result<Value, CodecError> {
		value.serialize(NodeSerializer {
			schema: self.schema,
			key: self.schema.root_key(),
			cases: &self.cases,
		})
	}

	pub fn encode_to_writer(&self, value: &T, writer: &mut impl Write) -> Result<(), CodecError> {
		let v = self.encode_to_value(value)?;
		serde_json::to_writer(writer, &v).map_err(|e| CodecError::invalid_data(ErrorLocation::Unknown, e.to_string()))
	}

	pub fn encode_to_string(&self, value: &T) -> Result<String, CodecError> {
		let v = self.encode_to_value(value)?;
		Ok(v.to_string())
	}
}

struct NodeSerializer<'a, 's> {
	schema: &'s Schema,
	key: SchemaKey,
	cases: &'a SharedCases,
}

impl<'a, 's> NodeSerializer<'a, 's> {
	fn node(&self) -> &'s SchemaNode {
		self.schema.get(self.key)
	}
	fn unsupported(&self, what: &str) -> CodecError {
		CodecError::invalid_data(
			ErrorLocation::Unknown,
			format!("cannot JSON-encode a {what} against schema kind {}", self.node().kind_name()),
		)
	}

	/// Wraps `inner` in the `{"<branch-tag>": inner}` shape (§4.4), unless
	/// `self.key` isn't a union, in which case the key is the resolved leaf
	/// already and no wrapper is needed.
	fn resolve(&self, matches: impl Fn(&SchemaNode) -> bool) -> Result<(SchemaKey, Option<String>), CodecError> {
		if let RegularType::Union(union) = &self.node().type_ {
			for &variant in &union.variants {
				if matches(self.schema.get(variant)) {
					let tag = crate::codec::json::union_branch_tag(self.schema, variant);
					return Ok((variant, Some(tag)));
				}
			}
			Err(CodecError::invalid_data(ErrorLocation::Unknown, "no union branch accepts this value"))
		} else if matches(self.node()) {
			Ok((self.key, None))
		} else {
			Err(self.unsupported("value"))
		}
	}

	fn resolve_record(&self, host_type_name: &'static str) -> Result<(SchemaKey, Option<String>), CodecError> {
		if let RegularType::Union(union) = &self.node().type_ {
			for case in self.cases.iter() {
				match case.select_union_branch(self.schema, union, host_type_name) {
					CaseOutcome::Built(idx) => {
						let variant = *union.variants.get(idx).ok_or_else(|| {
							CodecError::invalid_data(ErrorLocation::Unknown, "builder case selected an out-of-range union branch")
						})?;
						return Ok((variant, Some(crate::codec::json::union_branch_tag(self.schema, variant))));
					}
					CaseOutcome::Skipped => continue,
					CaseOutcome::Failure(reason) => return Err(CodecError::invalid_data(ErrorLocation::Unknown, reason)),
				}
			}
			for &variant in &union.variants {
				if let RegularType::Record(record) = &self.schema.get(variant).type_ {
					if record.name.name().eq_ignore_ascii_case(host_type_name) {
						return Ok((variant, Some(crate::codec::json::union_branch_tag(self.schema, variant))));
					}
				}
			}
			Err(CodecError::invalid_data(ErrorLocation::Unknown, format!("no union branch named '{host_type_name}'")))
		} else {
			Ok((self.key, None))
		}
	}

	fn wrap(tag: Option<String>, inner: Value) -> Value {
		match tag {
			Some(tag) => {
				let mut m = JsonMap::new();
				m.insert(tag, inner);
				Value::Object(m)
			}
			None => inner,
		}
	}
}

impl<'a, 's> ser::Serializer for NodeSerializer<'a, 's> {
	type Ok = Value;
	type Error = CodecError;
	type SerializeSeq = SeqState<'a, 's>;
	type SerializeTuple = SeqState<'a, 's>;
	type SerializeTupleStruct = SeqState<'a, 's>;
	type SerializeTupleVariant = SeqState<'a, 's>;
	type SerializeMap = MapState<'a, 's>;
	type SerializeStruct = StructState<'a, 's>;
	type SerializeStructVariant = StructState<'a, 's>;

	fn serialize_bool(self, v: bool) -> Result<Value, CodecError> {
		let (_, tag) = self.resolve(|n| matches!(n.type_, RegularType::Boolean))?;
		Ok(Self::wrap(tag, Value::Bool(v)))
	}

	fn serialize_i8(self, v: i8) -> Result<Value, CodecError> {
		self.serialize_i64(v as i64)
	}
	fn serialize_i16(self, v: i16) -> Result<Value, CodecError> {
		self.serialize_i64(v as i64)
	}
	fn serialize_i32(self, v: i32) -> Result<Value, CodecError> {
		self.serialize_i64(v as i64)
	}
	fn serialize_i64(self, v: i64) -> Result<Value, CodecError> {
		let (key, tag) = self.resolve(|n| {
			matches!(n.type_, RegularType::Int | RegularType::Long | RegularType::Float | RegularType::Double)
		})?;
		let inner = match &self.schema.get(key).type_ {
			RegularType::Float => Value::from(v as f64 as f32 as f64),
			RegularType::Double => Value::from(v as f64),
			_ => Value::from(v),
		};
		Ok(Self::wrap(tag, inner))
	}
	fn serialize_u8(self, v: u8) -> Result<Value, CodecError> {
		self.serialize_i64(v as i64)
	}
	fn serialize_u16(self, v: u16) -> Result<Value, CodecError> {
		self.serialize_i64(v as i64)
	}
	fn serialize_u32(self, v: u32) -> Result<Value, CodecError> {
		self.serialize_i64(v as i64)
	}
	fn serialize_u64(self, v: u64) -> Result<Value, CodecError> {
		self.serialize_i64(v as i64)
	}
	fn serialize_f32(self, v: f32) -> Result<Value, CodecError> {
		self.serialize_f64(v as f64)
	}
	fn serialize_f64(self, v: f64) -> Result<Value, CodecError> {
		let (_, tag) = self.resolve(|n| matches!(n.type_, RegularType::Float | RegularType::Double))?;
		Ok(Self::wrap(tag, Value::from(v)))
	}
	fn serialize_char(self, v: char) -> Result<Value, CodecError> {
		let mut buf = [0u8; 4];
		self.serialize_str(v.encode_utf8(&mut buf))
	}

	fn serialize_str(self, v: &str) -> Result<Value, CodecError> {
		let (key, tag) = self.resolve(|n| {
			matches!(n.type_, RegularType::String)
				|| matches!((&n.type_, &n.logical_type), (RegularType::Bytes | RegularType::Fixed(_), Some(LogicalType::Decimal(_))))
		})?;
		let node = self.schema.get(key);
		let inner = match (&node.type_, &node.logical_type) {
			(RegularType::Bytes, Some(LogicalType::Decimal(d))) => {
				let dec: rust_decimal::Decimal = v.parse().map_err(|e| {
					CodecError::invalid_data(ErrorLocation::Unknown, format!("'{v}' is not a valid decimal: {e}"))
				})?;
				let mut buf = Vec::new();
				crate::codec::binary::decimal::encode(&mut buf, crate::codec::binary::decimal::Repr::Bytes, d.precision, d.scale, dec)?;
				Value::String(crate::codec::json::bytes_to_iso8859_1(&buf))
			}
			(RegularType::Fixed(fixed), Some(LogicalType::Decimal(d))) => {
				let dec: rust_decimal::Decimal = v.parse().map_err(|e| {
					CodecError::invalid_data(ErrorLocation::Unknown, format!("'{v}' is not a valid decimal: {e}"))
				})?;
				let mut buf = Vec::new();
				crate::codec::binary::decimal::encode(
					&mut buf,
					crate::codec::binary::decimal::Repr::Fixed { size: fixed.size },
					d.precision,
					d.scale,
					dec,
				)?;
				Value::String(crate::codec::json::bytes_to_iso8859_1(&buf))
			}
			_ => Value::String(v.to_owned()),
		};
		Ok(Self::wrap(tag, inner))
	}

	fn serialize_bytes(self, v: &[u8]) -> Result<Value, CodecError> {
		let (key, tag) = self.resolve(|n| matches!(n.type_, RegularType::Bytes | RegularType::Fixed(_)))?;
		if let RegularType::Fixed(fixed) = &self.schema.get(key).type_ {
			if v.len() != fixed.size {
				return Err(CodecError::invalid_data(
					ErrorLocation::Unknown,
					format!("fixed '{}' expects {} bytes, got {}", fixed.name, fixed.size, v.len()),
				));
			}
		}
		Ok(Self::wrap(tag, Value::String(crate::codec::json::bytes_to_iso8859_1(v))))
	}

	fn serialize_none(self) -> Result<Value, CodecError> {
		match &self.node().type_ {
			RegularType::Null => Ok(Value::Null),
			RegularType::Union(union) => {
				if union.variants.iter().any(|&v| matches!(self.schema.get(v).type_, RegularType::Null)) {
					Ok(Value::Null)
				} else {
					Err(CodecError::invalid_data(ErrorLocation::Unknown, "no null branch in union"))
				}
			}
			_ => Err(self.unsupported("none")),
		}
	}

	fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, CodecError> {
		match &self.node().type_ {
			RegularType::Union(union) => {
				let key = match union.as_nullable(self.schema) {
					Some((_, non_null_idx)) => union.variants[non_null_idx],
					None => *union
						.variants
						.iter()
						.find(|&&v| !matches!(self.schema.get(v).type_, RegularType::Null))
						.ok_or_else(|| CodecError::invalid_data(ErrorLocation::Unknown, "union has no non-null branch"))?,
				};
				let tag = crate::codec::json::union_branch_tag(self.schema, key);
				let inner = value.serialize(NodeSerializer {
					schema: self.schema,
					key,
					cases: self.cases,
				})?;
				Ok(Self::wrap(Some(tag), inner))
			}
			_ => value.serialize(self),
		}
	}

	fn serialize_unit(self) -> Result<Value, CodecError> {
		if matches!(self.node().type_, RegularType::Null) {
			Ok(Value::Null)
		} else {
			Err(self.unsupported("unit"))
		}
	}
	fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, CodecError> {
		self.serialize_unit()
	}
	fn serialize_unit_variant(
		self,
		_name: &'static str,
		variant_index: u32,
		variant: &'static str,
	) -> Result<Value, CodecError> {
		let (key, tag) = self.resolve(|n| matches!(n.type_, RegularType::Enum(_) | RegularType::String | RegularType::Int))?;
		let inner = match &self.schema.get(key).type_ {
			RegularType::Enum(e) => {
				let idx = super::resolve_enum_symbol(self.cases, e, variant).ok_or_else(|| {
					CodecError::invalid_data(ErrorLocation::Unknown, format!("'{variant}' is not a symbol of enum '{}'", e.name))
				})?;
				Value::String(e.symbols[idx].clone())
			}
			RegularType::String => Value::String(variant.to_owned()),
			RegularType::Int => Value::from(variant_index),
			_ => unreachable!(),
		};
		Ok(Self::wrap(tag, inner))
	}
	fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<Value, CodecError> {
		value.serialize(self)
	}
	fn serialize_newtype_variant<T: ?Sized + Serialize>(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
		value: &T,
	) -> Result<Value, CodecError> {
		let (key, tag) = self.resolve_record(variant)?;
		let inner = value.serialize(NodeSerializer {
			schema: self.schema,
			key,
			cases: self.cases,
		})?;
		Ok(Self::wrap(tag, inner))
	}

	fn serialize_seq(self, _len: Option<usize>) -> Result<SeqState<'a, 's>, CodecError> {
		let (key, tag) = self.resolve(|n| matches!(n.type_, RegularType::Array(_)))?;
		let items = match &self.schema.get(key).type_ {
			RegularType::Array(array) => array.items,
			_ => unreachable!(),
		};
		Ok(SeqState {
			schema: self.schema,
			items_key: items,
			cases: self.cases,
			tag,
			items_out: Vec::new(),
		})
	}
	fn serialize_tuple(self, len: usize) -> Result<SeqState<'a, 's>, CodecError> {
		self.serialize_seq(Some(len))
	}
	fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqState<'a, 's>, CodecError> {
		self.serialize_seq(Some(len))
	}
	fn serialize_tuple_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		_variant: &'static str,
		_len: usize,
	) -> Result<SeqState<'a, 's>, CodecError> {
		Err(self.unsupported("tuple variant"))
	}

	fn serialize_map(self, _len: Option<usize>) -> Result<MapState<'a, 's>, CodecError> {
		// A `Record` target is accepted here too, for the Dynamic last-resort
		// "record-as-ordered-map" shape (§4.2.3 item 15) — see the binary
		// encoder's `MapState::Record` for the same fallback.
		let (key, tag) = self.resolve(|n| matches!(n.type_, RegularType::Map(_) | RegularType::Record(_)))?;
		match &self.schema.get(key).type_ {
			RegularType::Map(map) => Ok(MapState::Map {
				schema: self.schema,
				values_key: map.values,
				cases: self.cases,
				tag,
				pending_key: None,
				out: JsonMap::new(),
			}),
			RegularType::Record(_) => Ok(MapState::Record {
				schema: self.schema,
				key,
				cases: self.cases,
				tag,
				pending_key: None,
				out: JsonMap::new(),
			}),
			_ => unreachable!(),
		}
	}

	fn serialize_struct(self, name: &'static str, _len: usize) -> Result<StructState<'a, 's>, CodecError> {
		let (key, tag) = self.resolve_record(name)?;
		Ok(StructState {
			schema: self.schema,
			key,
			cases: self.cases,
			tag,
			out: JsonMap::new(),
		})
	}
	fn serialize_struct_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
		_len: usize,
	) -> Result<StructState<'a, 's>, CodecError> {
		let (key, tag) = self.resolve_record(variant)?;
		Ok(StructState {
			schema: self.schema,
			key,
			cases: self.cases,
			tag,
			out: JsonMap::new(),
		})
	}
}

pub(crate) struct SeqState<'a, 's> {
	schema: &'s Schema,
	items_key: SchemaKey,
	cases: &'a SharedCases,
	tag: Option<String>,
	items_out: Vec<Value>,
}
impl<'a, 's> ser::SerializeSeq for SeqState<'a, 's> {
	type Ok = Value;
	type Error = CodecError;
	fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CodecError> {
		self.items_out.push(value.serialize(NodeSerializer {
			schema: self.schema,
			key: self.items_key,
			cases: self.cases,
		})?);
		Ok(())
	}
	fn end(self) -> Result<Value, CodecError> {
		Ok(NodeSerializer::wrap(self.tag, Value::Array(self.items_out)))
	}
}
impl<'a, 's> ser::SerializeTuple for SeqState<'a, 's> {
	type Ok = Value;
	type Error = CodecError;
	fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CodecError> {
		ser::SerializeSeq::serialize_element(self, value)
	}
	fn end(self) -> Result<Value, CodecError> {
		ser::SerializeSeq::end(self)
	}
}
impl<'a, 's> ser::SerializeTupleStruct for SeqState<'a, 's> {
	type Ok = Value;
	type Error = CodecError;
	fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CodecError> {
		ser::SerializeSeq::serialize_element(self, value)
	}
	fn end(self) -> Result<Value, CodecError> {
		ser::SerializeSeq::end(self)
	}
}
impl<'a, 's> ser::SerializeTupleVariant for SeqState<'a, 's> {
	type Ok = Value;
	type Error = CodecError;
	fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CodecError> {
		ser::SerializeSeq::serialize_element(self, value)
	}
	fn end(self) -> Result<Value, CodecError> {
		ser::SerializeSeq::end(self)
	}
}

pub(crate) enum MapState<'a, 's> {
	Map {
		schema: &'s Schema,
		values_key: SchemaKey,
		cases: &'a SharedCases,
		tag: Option<String>,
		pending_key: Option<String>,
		out: JsonMap<String, Value>,
	},
	/// Dynamic last-resort "record-as-ordered-map" backend (§4.2.3 item 15):
	/// each map key is matched case-insensitively against the record's
	/// field names; unmatched keys are dropped and missing fields fall back
	/// to their schema default exactly as [`StructState::end`] does.
	Record {
		schema: &'s Schema,
		key: SchemaKey,
		cases: &'a SharedCases,
		tag: Option<String>,
		pending_key: Option<String>,
		out: JsonMap<String, Value>,
	},
}
impl<'a, 's> ser::SerializeMap for MapState<'a, 's> {
	type Ok = Value;
	type Error = CodecError;
	fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), CodecError> {
		let key_string = key.serialize(super::key_to_string::KeyToStringSerializer)?;
		match self {
			MapState::Map { pending_key, .. } => *pending_key = Some(key_string),
			MapState::Record { pending_key, .. } => *pending_key = Some(key_string),
		}
		Ok(())
	}
	fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CodecError> {
		match self {
			MapState::Map { schema, values_key, cases, pending_key, out, .. } => {
				let key = pending_key.take().expect("serialize_value called before serialize_key");
				let v = value.serialize(NodeSerializer {
					schema: *schema,
					key: *values_key,
					cases: *cases,
				})?;
				out.insert(key, v);
				Ok(())
			}
			MapState::Record { schema, key, cases, pending_key, out, .. } => {
				let map_key = pending_key.take().expect("serialize_value called before serialize_key");
				let field = match &schema.get(*key).type_ {
					RegularType::Record(record) => record
						.field_index_case_insensitive(&map_key)
						.map(|idx| (record.fields[idx].name.clone(), record.fields[idx].type_)),
					_ => None,
				};
				if let Some((field_name, field_type)) = field {
					let v = value.serialize(NodeSerializer {
						schema: *schema,
						key: field_type,
						cases: *cases,
					})?;
					out.insert(field_name, v);
				}
				Ok(())
			}
		}
	}
	fn end(self) -> Result<Value, CodecError> {
		match self {
			MapState::Map { tag, out, .. } => Ok(NodeSerializer::wrap(tag, Value::Object(out))),
			MapState::Record { schema, key, tag, mut out, .. } => {
				let record = match &schema.get(key).type_ {
					RegularType::Record(record) => record,
					_ => return Err(CodecError::invalid_data(ErrorLocation::Unknown, "map serialized against non-record schema")),
				};
				for field in &record.fields {
					if !out.contains_key(&field.name) {
						match &field.default {
							Some(default) => {
								out.insert(field.name.clone(), default.clone());
							}
							None => {
								return Err(CodecError::default_missing(
									ErrorLocation::Unknown,
									format!("field '{}' has no value and no default", field.name),
								))
							}
						}
					}
				}
				Ok(NodeSerializer::wrap(tag, Value::Object(out)))
			}
		}
	}
}

pub(crate) struct StructState<'a, 's> {
	schema: &'s Schema,
	key: SchemaKey,
	cases: &'a SharedCases,
	tag: Option<String>,
	out: JsonMap<String, Value>,
}
impl<'a, 's> ser::SerializeStruct for StructState<'a, 's> {
	type Ok = Value;
	type Error = CodecError;
	fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<(), CodecError> {
		let translated = self
			.cases
			.iter()
			.find_map(|case| match case.translate_field_name(key) {
				CaseOutcome::Built(name) => Some(name),
				_ => None,
			})
			.unwrap_or_else(|| key.to_owned());
		let field = match &self.schema.get(self.key).type_ {
			RegularType::Record(record) => record
				.field_index_case_insensitive(&translated)
				.map(|idx| (record.fields[idx].name.clone(), record.fields[idx].type_)),
			_ => return Err(CodecError::invalid_data(ErrorLocation::Unknown, "struct serialized against non-record schema")),
		};
		if let Some((field_name, field_type)) = field {
			let v = value.serialize(NodeSerializer {
				schema: self.schema,
				key: field_type,
				cases: self.cases,
			})?;
			self.out.insert(field_name, v);
		}
		Ok(())
	}
	fn end(self) -> Result<Value, CodecError> {
		let record = match &self.schema.get(self.key).type_ {
			RegularType::Record(record) => record,
			_ => return Err(CodecError::invalid_data(ErrorLocation::Unknown, "struct serialized against non-record schema")),
		};
		for field in &record.fields {
			if !self.out.contains_key(&field.name) {
				if let Some(default) = &field.default {
					self.out.insert(field.name.clone(), default.clone());
				} else {
					return Err(CodecError::default_missing(
						ErrorLocation::Unknown,
						format!("field '{}' has no value and no default", field.name),
					));
				}
			}
		}
		Ok(NodeSerializer::wrap(self.tag, Value::Object(self.out)))
	}
}
impl<'a, 's> ser::SerializeStructVariant for StructState<'a, 's> {
	type Ok = Value;
	type Error = CodecError;
	fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<(), CodecError> {
		ser::SerializeStruct::serialize_field(self, key, value)
	}
	fn end(self) -> Result<Value, CodecError> {
		ser::SerializeStruct::end(self)
	}
}

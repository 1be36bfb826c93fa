//! Reads and writes the JSON schema surface (§6.1)
//!
//! This is the "straightforward syntactic mapper" the spec calls out as an
//! external collaborator (§1); it is still shipped in this crate (see
//! SPEC_FULL.md §1) because without it the crate could not parse a single
//! schema. It accepts Avro's shorthand forms (bare `"int"` vs. `{"type":
//! "int"}`), preserves aliases and record-field defaults, and resolves
//! namespace-qualified names the way the Avro spec resolves them.

use super::{
	Array, Decimal, Enum, Fixed, LogicalType, Map, Name, Record, RecordField, RegularType, Schema,
	SchemaKey, SchemaNode, Union,
};
use crate::error::SchemaError;
use serde_json::Value;
use std::collections::HashMap;

/// Parse a schema document (§6.1 "reader")
pub fn parse(s: &str) -> Result<Schema, SchemaError> {
	let value: Value =
		serde_json::from_str(s).map_err(|e| SchemaError::msg(format_args!("invalid JSON: {e}")))?;
	let mut builder = Builder {
		nodes: Vec::new(),
		named: HashMap::new(),
	};
	builder.build(&value, None)?;
	let nodes = builder
		.nodes
		.into_iter()
		.enumerate()
		.map(|(i, n)| {
			n.ok_or_else(|| {
				SchemaError::msg(format_args!("internal error: node {i} was never resolved"))
			})
		})
		.collect::<Result<Vec<_>, _>>()?;
	Schema::from_nodes(nodes)
}

struct Builder {
	nodes: Vec<Option<SchemaNode>>,
	named: HashMap<String, usize>,
}

impl Builder {
	fn reserve(&mut self) -> usize {
		let idx = self.nodes.len();
		self.nodes.push(None);
		idx
	}

	fn build(&mut self, value: &Value, namespace: Option<&str>) -> Result<SchemaKey, SchemaError> {
		match value {
			Value::String(s) => self.build_named_ref_or_primitive(s),
			Value::Array(branches) => self.build_union(branches, namespace),
			Value::Object(obj) => self.build_object(obj, namespace),
			other => Err(SchemaError::msg(format_args!(
				"unexpected JSON value for schema: {other}"
			))),
		}
	}

	fn build_named_ref_or_primitive(&mut self, s: &str) -> Result<SchemaKey, SchemaError> {
		if let Some(primitive) = primitive_from_str(s) {
			let idx = self.reserve();
			self.nodes[idx] = Some(SchemaNode::new(primitive));
			return Ok(SchemaKey::from_idx(idx));
		}
		match self.named.get(s) {
			Some(&idx) => Ok(SchemaKey::from_idx(idx)),
			None => Err(SchemaError::msg(format_args!(
				"reference to undefined named type `{s}`"
			))),
		}
	}

	fn build_union(
		&mut self,
		branches: &[Value],
		namespace: Option<&str>,
	) -> Result<SchemaKey, SchemaError> {
		let idx = self.reserve();
		let mut variants = Vec::with_capacity(branches.len());
		for branch in branches {
			variants.push(self.build(branch, namespace)?);
		}
		self.nodes[idx] = Some(SchemaNode::new(RegularType::Union(Union::new(variants))));
		Ok(SchemaKey::from_idx(idx))
	}

	fn build_object(
		&mut self,
		obj: &serde_json::Map<String, Value>,
		namespace: Option<&str>,
	) -> Result<SchemaKey, SchemaError> {
		let type_value = obj
			.get("type")
			.ok_or_else(|| SchemaError::new("schema object is missing a `type` field"))?;

		// `{"type": {"type": "..."}}`-shaped logical type wrapper: if `type` is
		// itself a string naming a primitive/complex kind and this object also
		// carries its own named-type fields, fall through to the generic path;
		// only array/map/record/enum/fixed/primitive are handled here, with the
		// logical-type overlay applied afterwards.
		let namespace_here = obj
			.get("namespace")
			.and_then(Value::as_str)
			.or(namespace);

		let type_str = match type_value {
			Value::String(s) => s.as_str(),
			// `{"type": {...}}` (nested object, no logical type at this level):
			// just recurse into the inner schema, propagating namespace/props.
			Value::Object(_) | Value::Array(_) => return self.build(type_value, namespace_here),
			other => {
				return Err(SchemaError::msg(format_args!(
					"unexpected `type` field value: {other}"
				)))
			}
		};

		let regular = match type_str {
			"array" => {
				let items = obj
					.get("items")
					.ok_or_else(|| SchemaError::new("array schema is missing `items`"))?;
				let idx = self.reserve();
				let items_key = self.build(items, namespace_here)?;
				self.nodes[idx] = Some(SchemaNode::new(RegularType::Array(Array::new(items_key))));
				return Ok(SchemaKey::from_idx(idx));
			}
			"map" => {
				let values = obj
					.get("values")
					.ok_or_else(|| SchemaError::new("map schema is missing `values`"))?;
				let idx = self.reserve();
				let values_key = self.build(values, namespace_here)?;
				self.nodes[idx] = Some(SchemaNode::new(RegularType::Map(Map::new(values_key))));
				return Ok(SchemaKey::from_idx(idx));
			}
			"record" | "error" => {
				return self.build_record(obj, namespace_here);
			}
			"enum" => {
				return self.build_enum(obj, namespace_here);
			}
			"fixed" => {
				return self.build_fixed(obj, namespace_here);
			}
			other => primitive_from_str(other).ok_or_else(|| {
				SchemaError::msg(format_args!("unknown schema type `{other}`"))
			})?,
		};

		let idx = self.reserve();
		let node = match obj.get("logicalType").and_then(Value::as_str) {
			Some(logical_str) => {
				let logical = parse_logical_type(logical_str, obj)?;
				SchemaNode::with_logical_type(regular, logical)
			}
			None => SchemaNode::new(regular),
		};
		self.nodes[idx] = Some(node);
		Ok(SchemaKey::from_idx(idx))
	}

	fn build_record(
		&mut self,
		obj: &serde_json::Map<String, Value>,
		namespace: Option<&str>,
	) -> Result<SchemaKey, SchemaError> {
		let name = self.resolve_name(obj, namespace)?;
		let idx = self.reserve();
		self.named.insert(name.fully_qualified_name().to_owned(), idx);

		let fields_value = obj
			.get("fields")
			.and_then(Value::as_array)
			.ok_or_else(|| SchemaError::new("record schema is missing `fields`"))?;
		let field_namespace = name.namespace().map(str::to_owned);
		let mut fields = Vec::with_capacity(fields_value.len());
		for field_value in fields_value {
			let field_obj = field_value
				.as_object()
				.ok_or_else(|| SchemaError::new("record field must be an object"))?;
			let field_name = field_obj
				.get("name")
				.and_then(Value::as_str)
				.ok_or_else(|| SchemaError::new("record field is missing `name`"))?
				.to_owned();
			let field_type = field_obj
				.get("type")
				.ok_or_else(|| SchemaError::new("record field is missing `type`"))?;
			let type_key = self.build(field_type, field_namespace.as_deref())?;
			let mut field = RecordField::new(field_name, type_key);
			if let Some(default) = field_obj.get("default") {
				field = field.with_default(default.clone());
			}
			if let Some(aliases) = field_obj.get("aliases").and_then(Value::as_array) {
				field.aliases = aliases
					.iter()
					.filter_map(Value::as_str)
					.map(str::to_owned)
					.collect();
			}
			fields.push(field);
		}

		let mut record = Record::new(name, fields);
		record.aliases = parse_aliases(obj, namespace);
		self.nodes[idx] = Some(SchemaNode::new(RegularType::Record(record)));
		Ok(SchemaKey::from_idx(idx))
	}

	fn build_enum(
		&mut self,
		obj: &serde_json::Map<String, Value>,
		namespace: Option<&str>,
	) -> Result<SchemaKey, SchemaError> {
		let name = self.resolve_name(obj, namespace)?;
		let symbols = obj
			.get("symbols")
			.and_then(Value::as_array)
			.ok_or_else(|| SchemaError::new("enum schema is missing `symbols`"))?
			.iter()
			.map(|v| {
				v.as_str()
					.map(str::to_owned)
					.ok_or_else(|| SchemaError::new("enum symbol must be a string"))
			})
			.collect::<Result<Vec<_>, _>>()?;
		let idx = self.reserve();
		self.named.insert(name.fully_qualified_name().to_owned(), idx);
		let mut enum_ = Enum::new(name, symbols);
		enum_.aliases = parse_aliases(obj, namespace);
		if let Some(default) = obj.get("default").and_then(Value::as_str) {
			enum_ = enum_.with_default(default);
		}
		self.nodes[idx] = Some(SchemaNode::new(RegularType::Enum(enum_)));
		Ok(SchemaKey::from_idx(idx))
	}

	fn build_fixed(
		&mut self,
		obj: &serde_json::Map<String, Value>,
		namespace: Option<&str>,
	) -> Result<SchemaKey, SchemaError> {
		let name = self.resolve_name(obj, namespace)?;
		let size = obj
			.get("size")
			.and_then(Value::as_u64)
			.ok_or_else(|| SchemaError::new("fixed schema is missing `size`"))? as usize;
		let idx = self.reserve();
		self.named.insert(name.fully_qualified_name().to_owned(), idx);
		let mut fixed = Fixed::new(name, size);
		fixed.aliases = parse_aliases(obj, namespace);
		let node = match obj.get("logicalType").and_then(Value::as_str) {
			Some(logical_str) => {
				let logical = parse_logical_type(logical_str, obj)?;
				SchemaNode::with_logical_type(RegularType::Fixed(fixed), logical)
			}
			None => SchemaNode::new(RegularType::Fixed(fixed)),
		};
		self.nodes[idx] = Some(node);
		Ok(SchemaKey::from_idx(idx))
	}

	fn resolve_name(
		&self,
		obj: &serde_json::Map<String, Value>,
		namespace: Option<&str>,
	) -> Result<Name, SchemaError> {
		let name = obj
			.get("name")
			.and_then(Value::as_str)
			.ok_or_else(|| SchemaError::new("named schema is missing `name`"))?;
		let namespace = obj
			.get("namespace")
			.and_then(Value::as_str)
			.or(namespace);
		Ok(Name::new(name, namespace))
	}
}

fn parse_aliases(obj: &serde_json::Map<String, Value>, namespace: Option<&str>) -> Vec<Name> {
	obj.get("aliases")
		.and_then(Value::as_array)
		.map(|aliases| {
			aliases
				.iter()
				.filter_map(Value::as_str)
				.map(|alias| Name::new(alias, namespace))
				.collect()
		})
		.unwrap_or_default()
}

fn primitive_from_str(s: &str) -> Option<RegularType> {
	Some(match s {
		"null" => RegularType::Null,
		"boolean" => RegularType::Boolean,
		"int" => RegularType::Int,
		"long" => RegularType::Long,
		"float" => RegularType::Float,
		"double" => RegularType::Double,
		"bytes" => RegularType::Bytes,
		"string" => RegularType::String,
		_ => return None,
	})
}

fn parse_logical_type(
	name: &str,
	obj: &serde_json::Map<String, Value>,
) -> Result<LogicalType, SchemaError> {
	Ok(match name {
		"decimal" => {
			let precision = obj
				.get("precision")
				.and_then(Value::as_u64)
				.ok_or_else(|| SchemaError::new("decimal logical type is missing `precision`"))?
				as usize;
			let scale = obj.get("scale").and_then(Value::as_u64).unwrap_or(0) as u32;
			LogicalType::Decimal(Decimal::new(precision, scale))
		}
		"uuid" => LogicalType::Uuid,
		"date" => LogicalType::Date,
		"time-millis" => LogicalType::TimeMillis,
		"time-micros" => LogicalType::TimeMicros,
		"timestamp-millis" => LogicalType::TimestampMillis,
		"timestamp-micros" => LogicalType::TimestampMicros,
		"timestamp-nanos" => LogicalType::TimestampNanos,
		"duration" => LogicalType::Duration,
		other => LogicalType::Unknown(other.to_owned()),
	})
}

/// Serialize a schema to its canonical JSON form (§6.1 "writer")
///
/// Field order is a fixed function of the abstract schema (`name, aliases,
/// type, default, ...`), so the writer's output, re-read, always produces an
/// equivalent schema (the round-trip law of §8 item 3).
pub fn write_to_string(schema: &Schema) -> String {
	let mut emitted = std::collections::HashSet::new();
	let value = write_node(schema, schema.root_key(), &mut emitted);
	serde_json::to_string_pretty(&value).expect("schema JSON values are always serializable")
}

fn write_node(
	schema: &Schema,
	key: SchemaKey,
	emitted: &mut std::collections::HashSet<String>,
) -> Value {
	let node = schema.get(key);
	if let Some(name) = node.type_.name() {
		let fqn = name.fully_qualified_name().to_owned();
		if !emitted.insert(fqn.clone()) {
			// Already emitted in full elsewhere in the document: reference by name.
			return Value::String(fqn);
		}
	}
	let mut map = serde_json::Map::new();
	match &node.type_ {
		RegularType::Null => return Value::String("null".into()),
		RegularType::Boolean => return Value::String("boolean".into()),
		RegularType::Int => return Value::String("int".into()),
		RegularType::Long => return Value::String("long".into()),
		RegularType::Float => return Value::String("float".into()),
		RegularType::Double => return Value::String("double".into()),
		RegularType::Bytes => {
			if node.logical_type.is_none() {
				return Value::String("bytes".into());
			}
			map.insert("type".into(), Value::String("bytes".into()));
		}
		RegularType::String => {
			if node.logical_type.is_none() {
				return Value::String("string".into());
			}
			map.insert("type".into(), Value::String("string".into()));
		}
		RegularType::Array(array) => {
			map.insert("type".into(), Value::String("array".into()));
			map.insert("items".into(), write_node(schema, array.items, emitted));
		}
		RegularType::Map(map_) => {
			map.insert("type".into(), Value::String("map".into()));
			map.insert("values".into(), write_node(schema, map_.values, emitted));
		}
		RegularType::Union(union) => {
			return Value::Array(
				union
					.variants
					.iter()
					.map(|&k| write_node(schema, k, emitted))
					.collect(),
			);
		}
		RegularType::Record(record) => {
			map.insert("type".into(), Value::String("record".into()));
			map.insert(
				"name".into(),
				Value::String(record.name.fully_qualified_name().to_owned()),
			);
			if !record.aliases.is_empty() {
				map.insert(
					"aliases".into(),
					Value::Array(
						record
							.aliases
							.iter()
							.map(|n| Value::String(n.fully_qualified_name().to_owned()))
							.collect(),
					),
				);
			}
			let fields = record
				.fields
				.iter()
				.map(|field| {
					let mut field_map = serde_json::Map::new();
					field_map.insert("name".into(), Value::String(field.name.clone()));
					field_map.insert("type".into(), write_node(schema, field.type_, emitted));
					if let Some(default) = &field.default {
						field_map.insert("default".into(), default.clone());
					}
					if !field.aliases.is_empty() {
						field_map.insert(
							"aliases".into(),
							Value::Array(field.aliases.iter().cloned().map(Value::String).collect()),
						);
					}
					Value::Object(field_map)
				})
				.collect();
			map.insert("fields".into(), Value::Array(fields));
		}
		RegularType::Enum(enum_) => {
			map.insert("type".into(), Value::String("enum".into()));
			map.insert(
				"name".into(),
				Value::String(enum_.name.fully_qualified_name().to_owned()),
			);
			map.insert(
				"symbols".into(),
				Value::Array(enum_.symbols.iter().cloned().map(Value::String).collect()),
			);
			if let Some(default) = &enum_.default {
				map.insert("default".into(), Value::String(default.clone()));
			}
		}
		RegularType::Fixed(fixed) => {
			map.insert("type".into(), Value::String("fixed".into()));
			map.insert(
				"name".into(),
				Value::String(fixed.name.fully_qualified_name().to_owned()),
			);
			map.insert("size".into(), Value::Number(fixed.size.into()));
		}
	}
	if let Some(logical) = &node.logical_type {
		let name = match logical {
			LogicalType::Unknown(name) => name.clone(),
			other => other.as_str().to_owned(),
		};
		map.insert("logicalType".into(), Value::String(name));
		if let LogicalType::Decimal(decimal) = logical {
			map.insert("precision".into(), Value::Number(decimal.precision.into()));
			map.insert("scale".into(), Value::Number(decimal.scale.into()));
		}
	}
	Value::Object(map)
}

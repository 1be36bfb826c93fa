//! The Schema Builder (§4.6, component F)
//!
//! Turns a [`TypeDescriptor`] (produced by [`Described`]) into a canonical
//! [`Schema`], the reverse direction of the Codec Builder: instead of
//! compiling a codec for a schema a caller already has, this derives a
//! schema for a host type that doesn't have one yet.
//!
//! Named types (record/enum) are only ever defined once per build even if
//! referenced from multiple places (§6.1's round-trip law applies equally
//! to builder output). A host type whose [`Described`] impl recurses into
//! itself (directly, or through `Box`/`Vec`/`Option`) is also supported: the
//! derive macro wraps each named type's `describe()` body in
//! [`crate::descriptor::describe_guarded`], which reports the inner
//! recursive occurrence as [`TypeDescriptor::SelfReference`] instead of
//! recursing forever. Because a record's name is registered in `self.named`
//! before its fields are walked, that self-reference always resolves to the
//! [`SchemaKey`] already reserved for the enclosing record/enum.

use crate::descriptor::{ArrayDescriptor, MapDescriptor, Primitive, RecordDescriptor, Temporal, TypeDescriptor};
use crate::error::{BuildError, SchemaPath};
use crate::schema::{self, Decimal, Enum, Fixed, LogicalType, Name, Record, RecordField, RegularType, Schema, SchemaKey, SchemaNode};

/// How [`TypeDescriptor::Temporal`] values are represented on the wire
/// (§4.6 "temporal preferences", §6 `TemporalBehavior`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemporalBehavior {
	/// `string`, formatted as ISO-8601 by the host type's own `Serialize`
	Iso8601,
	/// `long`/`int` with a `timestamp-millis`/`time-millis`/`date` logical
	/// type overlay
	EpochMillis,
	/// `long` with a `timestamp-micros`/`time-micros` logical type overlay
	/// (dates have no microsecond form and fall back to `date`/`int`)
	EpochMicros,
}

/// Tunables for [`build_schema`] (§4.6)
#[derive(Clone, Debug)]
pub struct SchemaBuilderConfig {
	pub temporal: TemporalBehavior,
	/// `decimal` precision used for [`TypeDescriptor::BigDecimal`] fields
	/// with no narrower attribute-supplied value (§4.6 "default: an
	/// implementation-defined pair wide enough for any 128-bit decimal")
	pub decimal_precision: usize,
	pub decimal_scale: u32,
	/// Every reference-typed field/element becomes `Union(null, T)` (§4.6
	/// "nullable-reference flag")
	pub nullable_references: bool,
}

impl Default for SchemaBuilderConfig {
	fn default() -> Self {
		Self {
			temporal: TemporalBehavior::EpochMillis,
			decimal_precision: 29,
			decimal_scale: 14,
			nullable_references: false,
		}
	}
}

/// Derive a canonical [`Schema`] for `T` (§4.6)
pub fn build_schema<T: crate::descriptor::Described>(config: &SchemaBuilderConfig) -> Result<Schema, BuildError> {
	build_schema_from_descriptor(&T::describe(), config)
}

/// Derive a canonical [`Schema`] from an already-produced [`TypeDescriptor`]
/// — the entry point [`build_schema`] uses, exposed directly for callers
/// that build descriptors dynamically (e.g. the CLI's `create` command).
pub fn build_schema_from_descriptor(descriptor: &TypeDescriptor, config: &SchemaBuilderConfig) -> Result<Schema, BuildError> {
	let mut builder = Builder {
		nodes: Vec::new(),
		named: std::collections::HashMap::new(),
		config,
	};
	builder.push(descriptor, false)?;
	Schema::from_nodes(builder.nodes).map_err(|e| BuildError::unsupported_schema(SchemaPath::default(), e.to_string()))
}

struct Builder<'c> {
	nodes: Vec<SchemaNode>,
	named: std::collections::HashMap<String, SchemaKey>,
	config: &'c SchemaBuilderConfig,
}

impl<'c> Builder<'c> {
	fn reserve(&mut self) -> SchemaKey {
		let key = SchemaKey::from_idx(self.nodes.len());
		self.nodes.push(SchemaNode::new(RegularType::Null));
		key
	}

	fn set(&mut self, key: SchemaKey, node: SchemaNode) {
		self.nodes[key.idx()] = node;
	}

	/// Builds `descriptor`'s node and returns its key. When
	/// `wrap_nullable` is set and `self.config.nullable_references` applies
	/// to this kind of descriptor, the returned key is a `Union(null, T)`
	/// wrapping the built node instead of the node itself.
	fn push(&mut self, descriptor: &TypeDescriptor, wrap_nullable: bool) -> Result<SchemaKey, BuildError> {
		let is_reference_type = matches!(
			descriptor,
			TypeDescriptor::Record(_) | TypeDescriptor::Array(_) | TypeDescriptor::Map(_) | TypeDescriptor::Dynamic
		);
		if wrap_nullable && self.config.nullable_references && is_reference_type {
			let null_key = self.reserve();
			self.set(null_key, SchemaNode::new(RegularType::Null));
			let inner_key = self.push(descriptor, false)?;
			let union_key = self.reserve();
			self.set(union_key, schema::Union::new(vec![null_key, inner_key]).into());
			return Ok(union_key);
		}

		match descriptor {
			TypeDescriptor::Primitive(p) => self.push_primitive(*p),
			TypeDescriptor::Temporal(t) => self.push_temporal(*t),
			TypeDescriptor::BigDecimal => self.push_big_decimal(),
			TypeDescriptor::Enum(e) => self.push_enum(e),
			TypeDescriptor::Record(r) => self.push_record(r),
			TypeDescriptor::Array(a) => self.push_array(a),
			TypeDescriptor::Map(m) => self.push_map(m),
			TypeDescriptor::Option(inner) => self.push_option(inner),
			TypeDescriptor::Dynamic => Err(BuildError::unsupported_type(
				SchemaPath::default(),
				"a dynamic (serde_json::Value) type has no single canonical schema; supply one explicitly",
			)),
			TypeDescriptor::SelfReference(name) => self.named.get(name.as_ref()).copied().ok_or_else(|| {
				BuildError::unsupported_type(
					SchemaPath::default(),
					format!("self-reference to {name} escaped its enclosing record/enum"),
				)
			}),
		}
	}

	fn push_primitive(&mut self, p: Primitive) -> Result<SchemaKey, BuildError> {
		let key = self.reserve();
		let node = match p {
			Primitive::Bool => SchemaNode::new(RegularType::Boolean),
			Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::U8 | Primitive::U16 => {
				SchemaNode::new(RegularType::Int)
			}
			Primitive::I64 | Primitive::U32 | Primitive::U64 => SchemaNode::new(RegularType::Long),
			Primitive::F32 => SchemaNode::new(RegularType::Float),
			Primitive::F64 => SchemaNode::new(RegularType::Double),
			Primitive::String => SchemaNode::new(RegularType::String),
			Primitive::Bytes => SchemaNode::new(RegularType::Bytes),
			Primitive::Uuid => SchemaNode::with_logical_type(RegularType::String, LogicalType::Uuid),
		};
		self.set(key, node);
		Ok(key)
	}

	fn push_temporal(&mut self, t: Temporal) -> Result<SchemaKey, BuildError> {
		let key = self.reserve();
		let node = match (self.config.temporal, t) {
			(_, Temporal::Duration) => {
				SchemaNode::with_logical_type(RegularType::Fixed(Fixed::new(Name::new("duration", None), 12)), LogicalType::Duration)
			}
			(TemporalBehavior::Iso8601, _) => SchemaNode::new(RegularType::String),
			(TemporalBehavior::EpochMillis, Temporal::InstantWithOffset | Temporal::InstantWithoutOffset) => {
				SchemaNode::with_logical_type(RegularType::Long, LogicalType::TimestampMillis)
			}
			(TemporalBehavior::EpochMicros, Temporal::InstantWithOffset | Temporal::InstantWithoutOffset) => {
				SchemaNode::with_logical_type(RegularType::Long, LogicalType::TimestampMicros)
			}
			(_, Temporal::DateOnly) => SchemaNode::with_logical_type(RegularType::Int, LogicalType::Date),
			(TemporalBehavior::EpochMillis, Temporal::TimeOfDay) => {
				SchemaNode::with_logical_type(RegularType::Int, LogicalType::TimeMillis)
			}
			(TemporalBehavior::EpochMicros, Temporal::TimeOfDay) => {
				SchemaNode::with_logical_type(RegularType::Long, LogicalType::TimeMicros)
			}
		};
		self.set(key, node);
		Ok(key)
	}

	fn push_big_decimal(&mut self) -> Result<SchemaKey, BuildError> {
		let key = self.reserve();
		self.set(
			key,
			SchemaNode::with_logical_type(
				RegularType::Bytes,
				LogicalType::Decimal(Decimal::new(self.config.decimal_precision, self.config.decimal_scale)),
			),
		);
		Ok(key)
	}

	fn push_enum(&mut self, e: &crate::descriptor::EnumDescriptor) -> Result<SchemaKey, BuildError> {
		if let Some(&existing) = self.named.get(e.name.as_ref()) {
			return Ok(existing);
		}
		let key = self.reserve();
		self.named.insert(e.name.to_string(), key);
		let symbols = e.symbols.iter().map(|s| s.to_string()).collect();
		self.set(key, SchemaNode::new(Enum::new(Name::from_fully_qualified_name(&e.name), symbols).into()));
		Ok(key)
	}

	fn push_record(&mut self, r: &RecordDescriptor) -> Result<SchemaKey, BuildError> {
		if let Some(&existing) = self.named.get(r.name.as_ref()) {
			return Ok(existing);
		}
		let key = self.reserve();
		self.named.insert(r.name.to_string(), key);

		let mut fields = Vec::with_capacity(r.fields.len());
		for field in &r.fields {
			let field_key = self.push(&field.type_, true)?;
			let mut record_field = RecordField::new(field.name.to_string(), field_key);
			if field.default_from_attribute {
				if let Some(default) = default_json_for(&field.type_) {
					record_field = record_field.with_default(default);
				}
			}
			fields.push(record_field);
		}
		self.set(key, SchemaNode::new(Record::new(Name::from_fully_qualified_name(&r.name), fields).into()));
		Ok(key)
	}

	fn push_array(&mut self, a: &ArrayDescriptor) -> Result<SchemaKey, BuildError> {
		let key = self.reserve();
		let items = self.push(&a.element, true)?;
		self.set(key, SchemaNode::new(schema::Array::new(items).into()));
		Ok(key)
	}

	fn push_map(&mut self, m: &MapDescriptor) -> Result<SchemaKey, BuildError> {
		let key = self.reserve();
		let values = self.push(&m.value, true)?;
		self.set(key, SchemaNode::new(schema::Map::new(values).into()));
		Ok(key)
	}

	fn push_option(&mut self, inner: &TypeDescriptor) -> Result<SchemaKey, BuildError> {
		let null_key = self.reserve();
		self.set(null_key, SchemaNode::new(RegularType::Null));
		let inner_key = self.push(inner, false)?;
		let key = self.reserve();
		self.set(key, schema::Union::new(vec![null_key, inner_key]).into());
		Ok(key)
	}
}

/// A conservative "zero value" default for attribute-marked fields whose
/// host language default isn't otherwise known to the builder; this covers
/// the common numeric/string/bool/collection cases and is skipped (no
/// default emitted) for anything else, consistent with the field simply
/// having no default.
fn default_json_for(descriptor: &TypeDescriptor) -> Option<serde_json::Value> {
	match descriptor {
		TypeDescriptor::Primitive(Primitive::Bool) => Some(serde_json::Value::Bool(false)),
		TypeDescriptor::Primitive(p) if p.integer_width().is_some() => Some(serde_json::Value::from(0)),
		TypeDescriptor::Primitive(Primitive::F32 | Primitive::F64) => Some(serde_json::Value::from(0.0)),
		TypeDescriptor::Primitive(Primitive::String) => Some(serde_json::Value::String(String::new())),
		TypeDescriptor::Array(_) => Some(serde_json::Value::Array(Vec::new())),
		TypeDescriptor::Map(_) => Some(serde_json::Value::Object(serde_json::Map::new())),
		TypeDescriptor::Option(_) => Some(serde_json::Value::Null),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::descriptor::{Described, EnumDescriptor, FieldDescriptor};
	use std::borrow::Cow;

	struct Point;
	impl Described for Point {
		fn describe() -> TypeDescriptor {
			TypeDescriptor::Record(RecordDescriptor {
				name: Cow::Borrowed("test.Point"),
				fields: vec![
					FieldDescriptor {
						name: Cow::Borrowed("x"),
						type_: TypeDescriptor::Primitive(Primitive::I32),
						is_writable: true,
						default_from_attribute: false,
					},
					FieldDescriptor {
						name: Cow::Borrowed("y"),
						type_: TypeDescriptor::Primitive(Primitive::I32),
						is_writable: true,
						default_from_attribute: false,
					},
				],
			})
		}
	}

	#[test]
	fn builds_a_record_schema() {
		let schema = build_schema::<Point>(&SchemaBuilderConfig::default()).unwrap();
		match &schema.root().type_ {
			RegularType::Record(record) => {
				assert_eq!(record.name.fully_qualified_name(), "test.Point");
				assert_eq!(record.fields.len(), 2);
				assert_eq!(record.fields[0].name, "x");
			}
			other => panic!("expected a record, got {other:?}"),
		}
	}

	#[test]
	fn option_becomes_nullable_union() {
		let schema = build_schema_from_descriptor(
			&TypeDescriptor::Option(Box::new(TypeDescriptor::Primitive(Primitive::String))),
			&SchemaBuilderConfig::default(),
		)
		.unwrap();
		match &schema.root().type_ {
			RegularType::Union(union) => assert_eq!(union.variants.len(), 2),
			other => panic!("expected a union, got {other:?}"),
		}
	}

	#[test]
	fn big_decimal_uses_configured_precision() {
		let mut config = SchemaBuilderConfig::default();
		config.decimal_precision = 10;
		config.decimal_scale = 2;
		let schema = build_schema_from_descriptor(&TypeDescriptor::BigDecimal, &config).unwrap();
		match (&schema.root().type_, &schema.root().logical_type) {
			(RegularType::Bytes, Some(LogicalType::Decimal(d))) => {
				assert_eq!(d.precision, 10);
				assert_eq!(d.scale, 2);
			}
			other => panic!("expected decimal-overlaid bytes, got {other:?}"),
		}
	}

	#[test]
	fn recurring_enum_is_defined_once() {
		let enum_descriptor = EnumDescriptor {
			name: Cow::Borrowed("test.Color"),
			symbols: vec![Cow::Borrowed("Red"), Cow::Borrowed("Green")],
			underlying_integral: None,
			nullable_reference: false,
		};
		let array_of_same_enum = TypeDescriptor::Array(ArrayDescriptor {
			element: Box::new(TypeDescriptor::Enum(enum_descriptor.clone())),
			shape: crate::descriptor::SequenceShape::List,
		});
		let record = TypeDescriptor::Record(RecordDescriptor {
			name: Cow::Borrowed("test.Palette"),
			fields: vec![
				FieldDescriptor {
					name: Cow::Borrowed("primary"),
					type_: TypeDescriptor::Enum(enum_descriptor),
					is_writable: true,
					default_from_attribute: false,
				},
				FieldDescriptor {
					name: Cow::Borrowed("all"),
					type_: array_of_same_enum,
					is_writable: true,
					default_from_attribute: false,
				},
			],
		});
		let schema = build_schema_from_descriptor(&record, &SchemaBuilderConfig::default()).unwrap();
		let enum_node_count = schema.nodes().iter().filter(|n| matches!(n.type_, RegularType::Enum(_))).count();
		assert_eq!(enum_node_count, 1);
	}
}

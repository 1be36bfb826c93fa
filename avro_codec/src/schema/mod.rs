//! The Abstract Schema Model (§3.1)
//!
//! A [`Schema`] is an arena of [`SchemaNode`]s addressed by [`SchemaKey`]
//! (an index into the arena). Named schemas form a possibly-cyclic graph via
//! these keys, which is why the model is a flat arena rather than a tree:
//! see the module docs on [`SchemaKey`] for why.

mod name;
pub mod json;
mod validate;

pub use name::Name;
pub use validate::validate;

use crate::error::SchemaError;
use std::collections::HashMap;

/// An Avro schema, fully parsed and validated
///
/// Internally this is an arena of [`SchemaNode`]s; the first node (index
/// `0`) is always the root. References between nodes (array items, map
/// values, union variants, record field types) are represented as
/// [`SchemaKey`]s, i.e. indices into this arena, rather than owning
/// pointers — this is what lets the graph be cyclic (recursive records)
/// without unsafe code or reference counting.
#[derive(Clone, Debug)]
pub struct Schema {
	nodes: Vec<SchemaNode>,
	/// Cached JSON form, lazily computed by [`Schema::canonical_json`] and
	/// populated eagerly when parsed from JSON (`FromStr`)
	json: Option<String>,
	/// Used as half of the `(schema-identity, T)` codec cache key (§5)
	fingerprint: u64,
}

impl Schema {
	/// Build and validate a [`Schema`] from a set of nodes, the first of
	/// which (index `0`) is the root.
	pub fn from_nodes(nodes: Vec<SchemaNode>) -> Result<Self, SchemaError> {
		validate::validate(&nodes)?;
		let fingerprint = validate::fingerprint(&nodes);
		Ok(Self {
			nodes,
			json: None,
			fingerprint,
		})
	}

	/// All nodes in the arena; the root is `nodes()[0]`.
	pub fn nodes(&self) -> &[SchemaNode] {
		&self.nodes
	}

	/// The root node's key, i.e. [`SchemaKey::root`]
	pub fn root_key(&self) -> SchemaKey {
		SchemaKey::root()
	}

	/// The root node
	pub fn root(&self) -> &SchemaNode {
		&self.nodes[0]
	}

	/// Resolve a [`SchemaKey`] to its [`SchemaNode`]
	pub fn get(&self, key: SchemaKey) -> &SchemaNode {
		&self.nodes[key.idx]
	}

	/// A process-stable, schema-shape-derived fingerprint
	///
	/// Used as half of the `(schema-identity, T)` cache key of §5; two
	/// `Schema`s built from the same canonical JSON will always produce the
	/// same fingerprint, but no cryptographic guarantee is made (this is not
	/// the Avro "Parsing Canonical Form" Rabin fingerprint, just a fast
	/// structural hash good enough to key an in-process cache).
	pub fn fingerprint(&self) -> u64 {
		self.fingerprint
	}

	/// The canonical JSON form of this schema (§6.1 "writer")
	pub fn canonical_json(&self) -> String {
		match &self.json {
			Some(json) => json.clone(),
			None => json::write_to_string(self),
		}
	}
}

impl std::str::FromStr for Schema {
	type Err = SchemaError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut schema = json::parse(s)?;
		schema.json = Some(s.to_owned());
		Ok(schema)
	}
}

/// The location of a node in a [`Schema`]'s arena
///
/// Deliberately a thin index wrapper (not a reference) so the arena can be
/// grown freely while building and so recursive schemas are representable
/// without unsafe code: a [`RecordField`] whose type is the record itself
/// just stores the record's own `SchemaKey`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaKey {
	idx: usize,
}

impl SchemaKey {
	/// Construct a `SchemaKey` from a raw arena index
	pub const fn from_idx(idx: usize) -> Self {
		Self { idx }
	}
	/// The raw arena index this key points to
	pub const fn idx(self) -> usize {
		self.idx
	}
	/// The root of any [`Schema`] is always at index `0`
	pub const fn root() -> Self {
		Self { idx: 0 }
	}
}

impl std::fmt::Debug for SchemaKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "SchemaKey({})", self.idx)
	}
}

/// A node of an [`Schema`]'s arena
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct SchemaNode {
	/// The underlying regular (non-logical) type
	pub type_: RegularType,
	/// The logical type overlay, if any (§3.1 "LogicalType")
	pub logical_type: Option<LogicalType>,
}

impl SchemaNode {
	/// A node with no logical type overlay
	pub fn new(type_: RegularType) -> Self {
		type_.into()
	}
	/// A node with a logical type overlay
	pub fn with_logical_type(type_: RegularType, logical_type: LogicalType) -> Self {
		Self {
			type_,
			logical_type: Some(logical_type),
		}
	}

	/// Human readable "kind" string, used in error messages and in the
	/// builder case dispatch (§4.2.1) as the "schema-node-kind" half of the
	/// dispatch key.
	pub fn kind_name(&self) -> &'static str {
		if let Some(logical) = &self.logical_type {
			return logical.as_str();
		}
		match &self.type_ {
			RegularType::Null => "null",
			RegularType::Boolean => "boolean",
			RegularType::Int => "int",
			RegularType::Long => "long",
			RegularType::Float => "float",
			RegularType::Double => "double",
			RegularType::Bytes => "bytes",
			RegularType::String => "string",
			RegularType::Array(_) => "array",
			RegularType::Map(_) => "map",
			RegularType::Union(_) => "union",
			RegularType::Record(_) => "record",
			RegularType::Enum(_) => "enum",
			RegularType::Fixed(_) => "fixed",
		}
	}
}

impl From<RegularType> for SchemaNode {
	fn from(type_: RegularType) -> Self {
		Self {
			type_,
			logical_type: None,
		}
	}
}

/// The non-logical-type half of a [`SchemaNode`] (§3.1 table)
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum RegularType {
	Null,
	Boolean,
	Int,
	Long,
	Float,
	Double,
	Bytes,
	String,
	Array(Array),
	Map(Map),
	Union(Union),
	Record(Record),
	Enum(Enum),
	Fixed(Fixed),
}

impl RegularType {
	/// The name of the type, if it is a named type (record/enum/fixed)
	pub fn name(&self) -> Option<&Name> {
		match self {
			RegularType::Record(record) => Some(&record.name),
			RegularType::Enum(enum_) => Some(&enum_.name),
			RegularType::Fixed(fixed) => Some(&fixed.name),
			_ => None,
		}
	}
}

macro_rules! impl_from_regular_type_variant {
	($($variant:ident)*) => {
		$(
			impl From<$variant> for RegularType {
				fn from(v: $variant) -> Self {
					RegularType::$variant(v)
				}
			}
			impl From<$variant> for SchemaNode {
				fn from(v: $variant) -> Self {
					SchemaNode {
						type_: RegularType::$variant(v),
						logical_type: None,
					}
				}
			}
		)*
	};
}
impl_from_regular_type_variant! { Array Map Union Record Enum Fixed }

/// `array` schema component
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Array {
	pub items: SchemaKey,
}
impl Array {
	pub fn new(items: SchemaKey) -> Self {
		Self { items }
	}
}

/// `map` schema component; Avro map keys are always strings
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Map {
	pub values: SchemaKey,
}
impl Map {
	pub fn new(values: SchemaKey) -> Self {
		Self { values }
	}
}

/// `union` schema component
///
/// Never contains a nested union, and at most one branch per (kind, name)
/// pair — enforced by [`validate`].
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Union {
	pub variants: Vec<SchemaKey>,
}
impl Union {
	pub fn new(variants: Vec<SchemaKey>) -> Self {
		Self { variants }
	}
	/// Whether this is the common `[null, T]` / `[T, null]` shape, and if so
	/// the index of the `null` branch and of the non-null branch
	pub fn as_nullable(&self, schema: &Schema) -> Option<(usize, usize)> {
		if self.variants.len() != 2 {
			return None;
		}
		let is_null = |key: SchemaKey| matches!(schema.get(key).type_, RegularType::Null);
		match (is_null(self.variants[0]), is_null(self.variants[1])) {
			(true, false) => Some((0, 1)),
			(false, true) => Some((1, 0)),
			_ => None,
		}
	}
}

/// `record` schema component
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Record {
	pub name: Name,
	pub aliases: Vec<Name>,
	pub fields: Vec<RecordField>,
}
impl Record {
	pub fn new(name: Name, fields: Vec<RecordField>) -> Self {
		Self {
			name,
			aliases: Vec::new(),
			fields,
		}
	}

	/// Index of the field with this name, case-insensitively (§9 "field
	/// name matching... a configurable knob with a documented default")
	pub fn field_index_case_insensitive(&self, name: &str) -> Option<usize> {
		self.fields
			.iter()
			.position(|f| f.name.eq_ignore_ascii_case(name))
	}
}

/// A field of a [`Record`]
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct RecordField {
	pub name: String,
	pub aliases: Vec<String>,
	pub type_: SchemaKey,
	/// The field's default value, pre-parsed as JSON text (§4.9)
	pub default: Option<serde_json::Value>,
}
impl RecordField {
	pub fn new(name: impl Into<String>, type_: SchemaKey) -> Self {
		Self {
			name: name.into(),
			aliases: Vec::new(),
			type_,
			default: None,
		}
	}
	pub fn with_default(mut self, default: serde_json::Value) -> Self {
		self.default = Some(default);
		self
	}
}

/// `enum` schema component
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Enum {
	pub name: Name,
	pub aliases: Vec<Name>,
	pub symbols: Vec<String>,
	pub default: Option<String>,
	pub(crate) per_name_lookup: HashMap<String, usize>,
}
impl Enum {
	pub fn new(name: Name, symbols: Vec<String>) -> Self {
		let per_name_lookup = symbols
			.iter()
			.enumerate()
			.map(|(i, s)| (s.clone(), i))
			.collect();
		Self {
			name,
			aliases: Vec::new(),
			symbols,
			default: None,
			per_name_lookup,
		}
	}
	pub fn with_default(mut self, default: impl Into<String>) -> Self {
		self.default = Some(default.into());
		self
	}
	/// Ordinal of `symbol`, if present
	pub fn position(&self, symbol: &str) -> Option<usize> {
		self.per_name_lookup.get(symbol).copied()
	}
}

/// `fixed` schema component
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Fixed {
	pub name: Name,
	pub aliases: Vec<Name>,
	pub size: usize,
}
impl Fixed {
	pub fn new(name: Name, size: usize) -> Self {
		Self {
			name,
			aliases: Vec::new(),
			size,
		}
	}
}

/// A logical type overlay (§3.1 "LogicalType")
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum LogicalType {
	/// Overlays `Bytes` or `Fixed`
	Decimal(Decimal),
	/// Overlays `String`
	Uuid,
	/// Overlays `Int`
	Date,
	/// Overlays `Int`
	TimeMillis,
	/// Overlays `Long`
	TimeMicros,
	/// Overlays `Long`
	TimestampMillis,
	/// Overlays `Long`
	TimestampMicros,
	/// Overlays `Long`
	TimestampNanos,
	/// Overlays `Fixed(size=12)`
	Duration,
	/// A logical type name this library does not special-case
	Unknown(String),
}

impl LogicalType {
	/// The name of the logical type as it appears in schema JSON
	pub fn as_str(&self) -> &'static str {
		match self {
			LogicalType::Decimal(_) => "decimal",
			LogicalType::Uuid => "uuid",
			LogicalType::Date => "date",
			LogicalType::TimeMillis => "time-millis",
			LogicalType::TimeMicros => "time-micros",
			LogicalType::TimestampMillis => "timestamp-millis",
			LogicalType::TimestampMicros => "timestamp-micros",
			LogicalType::TimestampNanos => "timestamp-nanos",
			LogicalType::Duration => "duration",
			LogicalType::Unknown(_) => "unknown",
		}
	}
}

/// `decimal` logical type parameters
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Decimal {
	pub precision: usize,
	pub scale: u32,
}
impl Decimal {
	pub fn new(precision: usize, scale: u32) -> Self {
		Self { precision, scale }
	}
}

//! The Type-Descriptor Model (§3.2)
//!
//! A [`TypeDescriptor`] describes a host (Rust) type without the Codec
//! Builder ever needing to name that type's Rust vocabulary directly. This
//! is what lets §4.2.1's case chain dispatch on `(schema-node-kind,
//! T-descriptor)` uniformly instead of special-casing every Rust type one
//! by one.
//!
//! Descriptors are produced by the [`Described`] trait, which stands in for
//! the "host-language attribute/reflection probing" step the spec keeps out
//! of the core (§1): the *derivation* of a struct's descriptor from its
//! field list lives in the sibling `avro_codec_derive`/
//! `avro_codec_derive_macros` crates, not here — this module only defines
//! the data model and the handful of mechanical impls (primitives,
//! `Option`, collections) that require no reflection at all.

mod shape;

pub use shape::{MapShape, SequenceShape};

use std::borrow::Cow;

/// Describes a host type's shape, independent of any one language's
/// vocabulary (§3.2 table)
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeDescriptor {
	Primitive(Primitive),
	Temporal(Temporal),
	BigDecimal,
	Enum(EnumDescriptor),
	Record(RecordDescriptor),
	Array(ArrayDescriptor),
	Map(MapDescriptor),
	/// A value-or-absent wrapper (`Option<T>` in Rust)
	Option(Box<TypeDescriptor>),
	/// The host produces/accepts values of arbitrary shape (late-bound)
	Dynamic,
	/// Placeholder standing in for a record/enum whose `describe()` is
	/// already in progress further up the call stack (§4.2.2). Breaks the
	/// infinite recursion a self-referential host type (e.g. a linked-list
	/// node holding `Option<Box<Self>>`) would otherwise cause; carries the
	/// full name so the Codec Builder can resolve it against the
	/// already-registered named schema.
	SelfReference(Cow<'static, str>),
}

impl TypeDescriptor {
	/// Human-readable name, used in [`BuildError`](crate::error::BuildError)
	/// messages
	pub fn describe_kind(&self) -> Cow<'static, str> {
		match self {
			TypeDescriptor::Primitive(p) => Cow::Borrowed(p.name()),
			TypeDescriptor::Temporal(t) => Cow::Borrowed(t.name()),
			TypeDescriptor::BigDecimal => Cow::Borrowed("big-decimal"),
			TypeDescriptor::Enum(e) => Cow::Owned(format!("enum {}", e.name)),
			TypeDescriptor::Record(r) => Cow::Owned(format!("record {}", r.name)),
			TypeDescriptor::Array(_) => Cow::Borrowed("array"),
			TypeDescriptor::Map(_) => Cow::Borrowed("map"),
			TypeDescriptor::Option(inner) => Cow::Owned(format!("option<{}>", inner.describe_kind())),
			TypeDescriptor::Dynamic => Cow::Borrowed("dynamic"),
			TypeDescriptor::SelfReference(name) => Cow::Owned(format!("self-reference {name}")),
		}
	}
}

/// Primitive host types (§3.2)
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Primitive {
	Bool,
	I8,
	I16,
	I32,
	I64,
	U8,
	U16,
	U32,
	U64,
	F32,
	F64,
	String,
	Bytes,
	Uuid,
}

impl Primitive {
	pub fn name(self) -> &'static str {
		match self {
			Primitive::Bool => "bool",
			Primitive::I8 => "i8",
			Primitive::I16 => "i16",
			Primitive::I32 => "i32",
			Primitive::I64 => "i64",
			Primitive::U8 => "u8",
			Primitive::U16 => "u16",
			Primitive::U32 => "u32",
			Primitive::U64 => "u64",
			Primitive::F32 => "f32",
			Primitive::F64 => "f64",
			Primitive::String => "string",
			Primitive::Bytes => "bytes",
			Primitive::Uuid => "uuid",
		}
	}

	/// Whether this is one of the integer kinds, and if so its bit width and
	/// signedness — used by the Int/Long standard case for range checks
	/// (§4.2.3 item 3)
	pub fn integer_width(self) -> Option<(u8, bool)> {
		Some(match self {
			Primitive::I8 => (8, true),
			Primitive::I16 => (16, true),
			Primitive::I32 => (32, true),
			Primitive::I64 => (64, true),
			Primitive::U8 => (8, false),
			Primitive::U16 => (16, false),
			Primitive::U32 => (32, false),
			Primitive::U64 => (64, false),
			_ => return None,
		})
	}
}

/// Temporal host types (§3.2)
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Temporal {
	/// An instant that carries a UTC offset
	InstantWithOffset,
	/// An instant with no offset information (assumed UTC)
	InstantWithoutOffset,
	/// A calendar date with no time-of-day component
	DateOnly,
	/// A time-of-day with no associated calendar date
	TimeOfDay,
	/// A span of time (months/days/milliseconds, à la `Duration` logical type)
	Duration,
}

impl Temporal {
	pub fn name(self) -> &'static str {
		match self {
			Temporal::InstantWithOffset => "instant-with-offset",
			Temporal::InstantWithoutOffset => "instant-without-offset",
			Temporal::DateOnly => "date-only",
			Temporal::TimeOfDay => "time-of-day",
			Temporal::Duration => "duration",
		}
	}
}

/// Describes an enum-shaped host type
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EnumDescriptor {
	pub name: Cow<'static, str>,
	pub symbols: Vec<Cow<'static, str>>,
	/// Some if the host enum has an explicit integral representation
	/// (§4.2.3 item 8 "Alternative integral shape")
	pub underlying_integral: Option<Primitive>,
	/// Whether this is really a nullable reference type standing in for an
	/// enum (as opposed to a genuine value enum)
	pub nullable_reference: bool,
}

/// Describes a record/struct-shaped host type
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecordDescriptor {
	pub name: Cow<'static, str>,
	pub fields: Vec<FieldDescriptor>,
}

/// A single field of a [`RecordDescriptor`]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldDescriptor {
	pub name: Cow<'static, str>,
	pub type_: TypeDescriptor,
	pub is_writable: bool,
	/// Whether a default value attribute was attached to this field in the
	/// host language (distinct from the schema's own `default`)
	pub default_from_attribute: bool,
}

/// Describes a sequence-shaped host type
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArrayDescriptor {
	pub element: Box<TypeDescriptor>,
	pub shape: SequenceShape,
}

/// Describes a map-shaped host type (keys must be string-convertible)
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MapDescriptor {
	pub value: Box<TypeDescriptor>,
	pub shape: MapShape,
}

/// Produces a [`TypeDescriptor`] for `Self` without running any value
/// through it — the "reflection" step of §3.2, available at compile time for
/// every type the Codec Builder can target.
///
/// Implemented by hand here for primitives and the mechanical collection/
/// option wrappers; implemented by `#[derive(AvroSchema)]` (in
/// `avro_codec_derive`) for records and enums.
pub trait Described {
	fn describe() -> TypeDescriptor;
}

std::thread_local! {
	/// Names of the records/enums whose `describe()` is currently on the
	/// call stack, innermost last. Only ever touched from within
	/// [`describe_guarded`]; never observed directly by `Described` impls.
	static DESCRIBING: std::cell::RefCell<Vec<Cow<'static, str>>> = const { std::cell::RefCell::new(Vec::new()) };
}

/// Wraps a named record/enum's `describe()` body with a recursion guard
/// (§4.2.2). `#[derive(AvroSchema)]` calls this around every struct/enum
/// body so that a host type referencing itself (directly, or through
/// `Box`/`Vec`/`Option`) gets a [`TypeDescriptor::SelfReference`] instead of
/// overflowing the stack.
pub fn describe_guarded(full_name: Cow<'static, str>, build: impl FnOnce() -> TypeDescriptor) -> TypeDescriptor {
	let already_describing = DESCRIBING.with(|stack| stack.borrow().iter().any(|n| *n == full_name));
	if already_describing {
		return TypeDescriptor::SelfReference(full_name);
	}
	DESCRIBING.with(|stack| stack.borrow_mut().push(full_name.clone()));
	let result = build();
	DESCRIBING.with(|stack| {
		let mut stack = stack.borrow_mut();
		debug_assert_eq!(stack.last(), Some(&full_name));
		stack.pop();
	});
	result
}

macro_rules! impl_described_primitive {
	($($ty:ty => $variant:ident),* $(,)?) => {
		$(
			impl Described for $ty {
				fn describe() -> TypeDescriptor {
					TypeDescriptor::Primitive(Primitive::$variant)
				}
			}
		)*
	};
}
impl_described_primitive! {
	bool => Bool,
	i8 => I8,
	i16 => I16,
	i32 => I32,
	i64 => I64,
	u8 => U8,
	u16 => U16,
	u32 => U32,
	u64 => U64,
	f32 => F32,
	f64 => F64,
	String => String,
	uuid::Uuid => Uuid,
}

impl Described for Vec<u8> {
	fn describe() -> TypeDescriptor {
		TypeDescriptor::Primitive(Primitive::Bytes)
	}
}

impl<T: Described> Described for Box<T> {
	fn describe() -> TypeDescriptor {
		T::describe()
	}
}

impl<T: Described> Described for Option<T> {
	fn describe() -> TypeDescriptor {
		TypeDescriptor::Option(Box::new(T::describe()))
	}
}

impl<T: Described> Described for Vec<T> {
	fn describe() -> TypeDescriptor {
		TypeDescriptor::Array(ArrayDescriptor {
			element: Box::new(T::describe()),
			shape: SequenceShape::List,
		})
	}
}

impl<T: Described> Described for std::collections::VecDeque<T> {
	fn describe() -> TypeDescriptor {
		TypeDescriptor::Array(ArrayDescriptor {
			element: Box::new(T::describe()),
			shape: SequenceShape::Queue,
		})
	}
}

impl<T: Described + std::hash::Hash + Eq> Described for std::collections::HashSet<T> {
	fn describe() -> TypeDescriptor {
		TypeDescriptor::Array(ArrayDescriptor {
			element: Box::new(T::describe()),
			shape: SequenceShape::Set,
		})
	}
}

impl<T: Described + Ord> Described for std::collections::BTreeSet<T> {
	fn describe() -> TypeDescriptor {
		TypeDescriptor::Array(ArrayDescriptor {
			element: Box::new(T::describe()),
			shape: SequenceShape::ImmutableSet,
		})
	}
}

impl<V: Described> Described for std::collections::HashMap<String, V> {
	fn describe() -> TypeDescriptor {
		TypeDescriptor::Map(MapDescriptor {
			value: Box::new(V::describe()),
			shape: MapShape::HashMap,
		})
	}
}

impl<V: Described> Described for std::collections::BTreeMap<String, V> {
	fn describe() -> TypeDescriptor {
		TypeDescriptor::Map(MapDescriptor {
			value: Box::new(V::describe()),
			shape: MapShape::BTreeMap,
		})
	}
}

impl Described for serde_json::Value {
	fn describe() -> TypeDescriptor {
		TypeDescriptor::Dynamic
	}
}

impl Described for rust_decimal::Decimal {
	fn describe() -> TypeDescriptor {
		TypeDescriptor::BigDecimal
	}
}

//! The Codec Builder (§4.2, component E)
//!
//! [`CodecBuilder`] owns the ordered chain of user [`BuilderCase`]s (§4.5)
//! and exposes [`CodecBuilder::build_binary_encoder`]/
//! [`CodecBuilder::build_binary_decoder`] and their JSON equivalents. The
//! fifteen standard cases of §4.2.3 are not represented as a second, dynamic
//! chain of `BuilderCase` objects — Rust's generics let the compiler
//! monomorphize a direct `(SchemaNode, T)` dispatch instead, which is what
//! [`crate::ser`]/[`crate::de`] implement as `serde::Serializer`/
//! `serde::Deserializer` impls driven by the schema tree. User cases are
//! consulted first, at the two seams named in §4.5: union branch selection
//! and record field-name translation.

pub mod binary;
pub mod json;
mod validate;

use crate::descriptor::TypeDescriptor;
use crate::schema::{Schema, SchemaKey, Union};
use std::sync::Arc;

/// The result of a single [`BuilderCase`] attempt (§4.2.1)
pub enum CaseOutcome<T> {
	/// This case handled the request; here is the answer
	Built(T),
	/// This case does not apply; try the next one
	Skipped,
	/// This case applies but the request cannot be satisfied
	Failure(String),
}

/// A user-supplied extension to the default dispatch (§4.5)
///
/// Implementors are consulted, in registration order, before the builder
/// falls back to its default behavior at each of the two seams below. A
/// case must be deterministic and must not depend on mutable state shared
/// across calls (§4.5 "Cases must be deterministic... must not rely on
/// shared mutable state").
pub trait BuilderCase: Send + Sync {
	/// Type selection within a union of records (§4.5, §8 scenario 5): given
	/// the union's branches and the Rust struct/variant name `serde` reports
	/// for the value about to be serialized (`serde::Serializer::
	/// serialize_struct`'s `name` argument — the nearest stand-in for a
	/// runtime type identity that `serde`'s dispatch exposes), pick a branch
	/// index.
	fn select_union_branch(
		&self,
		_schema: &Schema,
		_union: &Union,
		_host_type_name: &'static str,
	) -> CaseOutcome<usize> {
		CaseOutcome::Skipped
	}

	/// Field renaming/shape adjustment (§4.5): translate a schema field name
	/// to the host member name that should supply/receive its value.
	fn translate_field_name(&self, _schema_field_name: &str) -> CaseOutcome<String> {
		CaseOutcome::Skipped
	}

	/// Enum symbol renaming (§4.2.3 item 8): translate a schema symbol name
	/// to the host enum variant name that should represent it, the enum
	/// counterpart to [`Self::translate_field_name`].
	fn translate_enum_symbol(&self, _schema_symbol: &str) -> CaseOutcome<String> {
		CaseOutcome::Skipped
	}

	/// Build-time schema/type compatibility check (§4.2.1 "any of the
	/// standard cases can be replaced by a user-supplied one"): given a node
	/// of the schema under compilation and the [`TypeDescriptor`] the Codec
	/// Builder is about to match it against, either accept the pairing
	/// (`Built(())`), reject it outright (`Failure`), or leave it to the
	/// builder's own fifteen standard cases (`Skipped`, the default). This is
	/// the one seam where a user case can override a standard case's
	/// judgment rather than merely supplementing it.
	fn attempt_validate(&self, _schema: &Schema, _key: SchemaKey, _descriptor: &TypeDescriptor) -> CaseOutcome<()> {
		CaseOutcome::Skipped
	}
}

/// Shared handle to an ordered chain of [`BuilderCase`]s
///
/// Cheaply clonable so every codec compiled from a [`CodecBuilder`] can keep
/// its own handle without the builder outliving the codecs it produced —
/// union/record resolution consults the chain at run time (§4.5's
/// union-of-records selection inspects the concrete value being
/// encoded/decoded, not just the schema), not only at build time.
pub(crate) type SharedCases = Arc<[Arc<dyn BuilderCase>]>;

/// Owns the ordered chain of [`BuilderCase`]s and produces compiled codecs
///
/// A fresh `CodecBuilder` is cheap; the expensive part, the actual
/// `(schema, T)` compilation, is cached downstream by
/// [`crate::cache::CodecCache`] rather than by this type, matching §5's
/// "cache keyed by (schema-identity, T)" (not by builder instance).
#[derive(Default, Clone)]
pub struct CodecBuilder {
	cases: Vec<Arc<dyn BuilderCase>>,
}

impl CodecBuilder {
	pub fn new() -> Self {
		Self { cases: Vec::new() }
	}

	/// Insert a case at the head of the chain (§4.2.1 "Users insert custom
	/// cases at the head, before defaults").
	pub fn with_case(mut self, case: impl BuilderCase + 'static) -> Self {
		self.cases.insert(0, Arc::new(case));
		self
	}

	fn cases_arc(&self) -> SharedCases {
		self.cases.iter().cloned().collect::<Vec<_>>().into()
	}

	/// Compile a binary encoder for `T` against `schema` (§4.2 `build_encoder`)
	///
	/// Before any `(Schema, T)`-specific encoder state is built, `T`'s
	/// [`TypeDescriptor`](crate::descriptor::TypeDescriptor) is walked
	/// against `schema` (see [`validate`](validate::validate)); a structural
	/// mismatch — a record-shaped host type pointed at a `long` schema, a
	/// union branch that exists on neither side, a `SelfReference` that
	/// escapes its enclosing named type — fails here with
	/// `UnsupportedSchema`/`UnsupportedType` rather than surfacing as a
	/// confusing runtime [`CodecError`](crate::error::CodecError) from the
	/// first `encode`/`decode` call.
	pub fn build_binary_encoder<'s, T>(
		&self,
		schema: &'s Schema,
	) -> Result<crate::ser::BinaryEncoder<'s, T>, crate::error::BuildError>
	where
		T: serde::Serialize + crate::descriptor::Described,
	{
		let cases = self.cases_arc();
		validate::validate(schema, &T::describe(), &cases)?;
		crate::ser::BinaryEncoder::new(schema, cases)
	}

	/// Compile a binary decoder for `T` against `schema` (§4.2 `build_decoder`)
	pub fn build_binary_decoder<'s, T>(
		&self,
		schema: &'s Schema,
	) -> Result<crate::de::BinaryDecoder<'s, T>, crate::error::BuildError>
	where
		T: serde::de::DeserializeOwned + crate::descriptor::Described,
	{
		let cases = self.cases_arc();
		validate::validate(schema, &T::describe(), &cases)?;
		crate::de::BinaryDecoder::new(schema, cases)
	}

	/// Compile a JSON encoder for `T` against `schema`
	pub fn build_json_encoder<'s, T>(
		&self,
		schema: &'s Schema,
	) -> Result<crate::ser::json::JsonEncoder<'s, T>, crate::error::BuildError>
	where
		T: serde::Serialize + crate::descriptor::Described,
	{
		let cases = self.cases_arc();
		validate::validate(schema, &T::describe(), &cases)?;
		crate::ser::json::JsonEncoder::new(schema, cases)
	}

	/// Compile a JSON decoder for `T` against `schema`
	pub fn build_json_decoder<'s, T>(
		&self,
		schema: &'s Schema,
	) -> Result<crate::de::json::JsonDecoder<'s, T>, crate::error::BuildError>
	where
		T: serde::de::DeserializeOwned + crate::descriptor::Described,
	{
		let cases = self.cases_arc();
		validate::validate(schema, &T::describe(), &cases)?;
		crate::de::json::JsonDecoder::new(schema, cases)
	}
}

//! Build-time schema/type compatibility checking (§4.2, §4.2.2)
//!
//! [`CodecBuilder::build_binary_encoder`](super::CodecBuilder::build_binary_encoder)
//! and its siblings call [`validate`] before compiling anything: it walks a
//! [`TypeDescriptor`] against the [`Schema`] it is about to be matched
//! against and reports the first structural incompatibility as a
//! [`BuildError`], instead of letting a mismatched `(Schema, T)` pair compile
//! successfully and only fail once a value is actually encoded/decoded.
//!
//! Named schemas (record/enum) can reference themselves, directly or through
//! a cycle of other named schemas, and a self-referential host type's
//! [`TypeDescriptor`] mirrors that with [`TypeDescriptor::SelfReference`].
//! Walking both trees together could still loop forever if a schema cycle
//! isn't mirrored by a matching descriptor cycle (a named schema can be
//! reached twice via two different paths without either occurrence being a
//! "self" reference), so this module keeps its own forward-reference table:
//! a [`hashbrown::HashMap`] recording which [`SchemaKey`]s are currently
//! being validated. Re-entering one stops the walk and accepts the pairing,
//! the same way a `TypeDescriptor::SelfReference` does — the schema really
//! was already found compatible with *some* shape higher up the call stack,
//! and any finer-grained mismatch at that depth would have to come from a
//! value that recurses at least as deep, which is [`crate::ser`]/
//! [`crate::de`]'s concern at encode/decode time, not this walk's.

use crate::codec::{CaseOutcome, SharedCases};
use crate::descriptor::{ArrayDescriptor, MapDescriptor, Primitive, RecordDescriptor, Temporal, TypeDescriptor};
use crate::error::{BuildError, PathElement, SchemaPath};
use crate::schema::{LogicalType, RegularType, Schema, SchemaKey};

/// Validate that `descriptor` can be matched against `schema` (§4.2.2).
pub(crate) fn validate(schema: &Schema, descriptor: &TypeDescriptor, cases: &SharedCases) -> Result<(), BuildError> {
	let mut visiting = hashbrown::HashMap::new();
	let mut path = SchemaPath::default();
	tracing::debug!(kind = %descriptor.describe_kind(), root = schema.root().kind_name(), "validating host type against schema");
	let result = walk(schema, schema.root_key(), descriptor, cases, &mut visiting, &mut path);
	if let Err(err) = &result {
		tracing::debug!(%err, "schema/type validation failed");
	}
	result
}

fn walk(
	schema: &Schema,
	key: SchemaKey,
	descriptor: &TypeDescriptor,
	cases: &SharedCases,
	visiting: &mut hashbrown::HashMap<SchemaKey, ()>,
	path: &mut SchemaPath,
) -> Result<(), BuildError> {
	for case in cases.iter() {
		match case.attempt_validate(schema, key, descriptor) {
			CaseOutcome::Built(()) => return Ok(()),
			CaseOutcome::Failure(reason) => return Err(BuildError::unsupported_type(path.clone(), reason)),
			CaseOutcome::Skipped => {}
		}
	}

	let node = schema.get(key);

	// `Dynamic` (serde_json::Value and friends) accepts any schema shape by
	// construction (§4.2.3 item 15); nothing further to check.
	if matches!(descriptor, TypeDescriptor::Dynamic) {
		return Ok(());
	}

	if let TypeDescriptor::SelfReference(name) = descriptor {
		return match node.type_.name() {
			Some(schema_name) if schema_name.fully_qualified_name() == name.as_ref() => Ok(()),
			_ => Err(BuildError::unsupported_type(
				path.clone(),
				format!("self-reference to {name} does not resolve to a same-named schema node"),
			)),
		};
	}

	// A union is resolved at run time, against the concrete value being
	// encoded/decoded (§4.5 scenario 5) — a `BuilderCase::select_union_branch`
	// override can always accept a pairing the default walk below would
	// reject. At build time we only insist that an `Option<T>` is paired with
	// a nullable union, and otherwise require at least one branch to be
	// structurally compatible with `T`.
	if let RegularType::Union(union) = &node.type_ {
		if visiting.contains_key(&key) {
			return Ok(());
		}
		visiting.insert(key, ());
		let result = walk_union(schema, key, union, descriptor, cases, visiting, path);
		visiting.remove(&key);
		return result;
	}

	if let TypeDescriptor::Option(inner) = descriptor {
		// Not a union: the non-null case is the whole story, `None` is
		// represented by the node simply not being written (the encoder
		// treats `Option` against a non-union schema as "optional but the
		// schema offers no explicit null branch", which is only safe when
		// the host value is actually present — a run-time concern already
		// carried by `CodecError`, not this walk's).
		return walk(schema, key, inner, cases, visiting, path);
	}

	if visiting.contains_key(&key) {
		return Ok(());
	}
	if matches!(node.type_, RegularType::Record(_) | RegularType::Enum(_)) {
		visiting.insert(key, ());
	}
	let result = walk_non_union(schema, key, descriptor, cases, visiting, path);
	visiting.remove(&key);
	result
}

fn walk_union(
	schema: &Schema,
	key: SchemaKey,
	union: &crate::schema::Union,
	descriptor: &TypeDescriptor,
	cases: &SharedCases,
	visiting: &mut hashbrown::HashMap<SchemaKey, ()>,
	path: &mut SchemaPath,
) -> Result<(), BuildError> {
	if let TypeDescriptor::Option(inner) = descriptor {
		if let Some((_, non_null)) = union.as_nullable(schema) {
			path.0.push(PathElement::UnionBranch(non_null));
			let result = walk(schema, union.variants[non_null], inner, cases, visiting, path);
			path.0.pop();
			return result;
		}
		// No dedicated null branch; still accept if some branch matches the
		// inner type; a host `None` then has nothing natural to encode
		// against, which an `encode` call surfaces as `CodecError` if it
		// ever happens.
	}

	let mut last_err = None;
	for (idx, &variant_key) in union.variants.iter().enumerate() {
		path.0.push(PathElement::UnionBranch(idx));
		match walk(schema, variant_key, descriptor, cases, visiting, path) {
			Ok(()) => {
				path.0.pop();
				return Ok(());
			}
			Err(e) => last_err = Some(e),
		}
		path.0.pop();
	}
	Err(last_err.unwrap_or_else(|| {
		BuildError::unsupported_schema(path.clone(), "union has no branches to match against")
	}))
}

fn walk_non_union(
	schema: &Schema,
	key: SchemaKey,
	descriptor: &TypeDescriptor,
	cases: &SharedCases,
	visiting: &mut hashbrown::HashMap<SchemaKey, ()>,
	path: &mut SchemaPath,
) -> Result<(), BuildError> {
	let node = schema.get(key);
	match descriptor {
		TypeDescriptor::Primitive(p) => match_primitive(*p, node, path),
		TypeDescriptor::Temporal(t) => match_temporal(*t, node, path),
		TypeDescriptor::BigDecimal => match_big_decimal(node, path),
		TypeDescriptor::Enum(e) => match_enum(e, node, path),
		TypeDescriptor::Record(r) => match_record(schema, key, r, cases, visiting, path),
		TypeDescriptor::Array(a) => match_array(schema, key, a, cases, visiting, path),
		TypeDescriptor::Map(m) => match_map(schema, key, m, cases, visiting, path),
		// Handled by the caller before reaching here.
		TypeDescriptor::Option(_) | TypeDescriptor::Dynamic | TypeDescriptor::SelfReference(_) => Ok(()),
	}
}

fn mismatch(path: &SchemaPath, node: &crate::schema::SchemaNode, descriptor_kind: &str) -> BuildError {
	BuildError::unsupported_type(
		path.clone(),
		format!("schema kind {} cannot represent a {descriptor_kind}", node.kind_name()),
	)
}

fn match_primitive(p: Primitive, node: &crate::schema::SchemaNode, path: &SchemaPath) -> Result<(), BuildError> {
	let ok = match p {
		Primitive::Bool => matches!(node.type_, RegularType::Boolean),
		Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::U8 | Primitive::U16 => {
			matches!(node.type_, RegularType::Int | RegularType::Long)
		}
		Primitive::I64 | Primitive::U32 | Primitive::U64 => matches!(node.type_, RegularType::Long),
		Primitive::F32 => matches!(node.type_, RegularType::Float | RegularType::Double),
		Primitive::F64 => matches!(node.type_, RegularType::Double),
		Primitive::String => matches!(node.type_, RegularType::String | RegularType::Enum(_)),
		Primitive::Bytes => matches!(node.type_, RegularType::Bytes | RegularType::Fixed(_)),
		Primitive::Uuid => {
			matches!(node.type_, RegularType::String) && matches!(node.logical_type, Some(LogicalType::Uuid) | None)
		}
	};
	if ok {
		Ok(())
	} else {
		Err(mismatch(path, node, p.name()))
	}
}

fn match_temporal(t: Temporal, node: &crate::schema::SchemaNode, path: &SchemaPath) -> Result<(), BuildError> {
	let ok = match t {
		Temporal::Duration => matches!(node.type_, RegularType::Fixed(_)) && matches!(node.logical_type, Some(LogicalType::Duration)),
		Temporal::DateOnly => matches!(node.type_, RegularType::Int) || matches!(node.type_, RegularType::String),
		Temporal::TimeOfDay => matches!(node.type_, RegularType::Int | RegularType::Long | RegularType::String),
		Temporal::InstantWithOffset | Temporal::InstantWithoutOffset => {
			matches!(node.type_, RegularType::Long | RegularType::String)
		}
	};
	if ok {
		Ok(())
	} else {
		Err(mismatch(path, node, t.name()))
	}
}

fn match_big_decimal(node: &crate::schema::SchemaNode, path: &SchemaPath) -> Result<(), BuildError> {
	let ok = matches!(node.type_, RegularType::Bytes | RegularType::Fixed(_)) && matches!(node.logical_type, Some(LogicalType::Decimal(_)));
	if ok {
		Ok(())
	} else {
		Err(mismatch(path, node, "big-decimal"))
	}
}

fn match_enum(
	e: &crate::descriptor::EnumDescriptor,
	node: &crate::schema::SchemaNode,
	path: &SchemaPath,
) -> Result<(), BuildError> {
	match &node.type_ {
		RegularType::Enum(schema_enum) => {
			let all_known = e.symbols.iter().all(|s| schema_enum.position(s).is_some());
			if all_known || schema_enum.default.is_some() {
				Ok(())
			} else {
				Err(BuildError::unsupported_type(
					path.clone(),
					format!("enum {} has symbols the schema enum does not and declares no default symbol", e.name),
				))
			}
		}
		RegularType::String if e.nullable_reference => Ok(()),
		_ => Err(mismatch(path, node, &format!("enum {}", e.name))),
	}
}

fn match_record(
	schema: &Schema,
	key: SchemaKey,
	r: &RecordDescriptor,
	cases: &SharedCases,
	visiting: &mut hashbrown::HashMap<SchemaKey, ()>,
	path: &mut SchemaPath,
) -> Result<(), BuildError> {
	let record = match &schema.get(key).type_ {
		RegularType::Record(record) => record,
		_ => return Err(mismatch(path, schema.get(key), &format!("record {}", r.name))),
	};
	for field in &r.fields {
		let matched_name = resolve_field_name(cases, &field.name, record);
		let Some(matched_name) = matched_name else { continue };
		let Some(idx) = record.field_index_case_insensitive(&matched_name) else { continue };
		path.0.push(PathElement::Field(record.fields[idx].name.clone()));
		let result = walk(schema, record.fields[idx].type_, &field.type_, cases, visiting, path);
		path.0.pop();
		result?;
	}
	Ok(())
}

/// Mirrors the decode-side field resolution of [`crate::de`]: first give
/// registered cases a chance to translate the host field name onto a schema
/// field, then fall back to a case-insensitive scan of the schema's own
/// field names (§9 default field-name matching).
fn resolve_field_name(cases: &SharedCases, host_field_name: &str, record: &crate::schema::Record) -> Option<String> {
	for case in cases.iter() {
		if let CaseOutcome::Built(translated) = case.translate_field_name(host_field_name) {
			if record.field_index_case_insensitive(&translated).is_some() {
				return Some(translated);
			}
		}
	}
	if record.field_index_case_insensitive(host_field_name).is_some() {
		return Some(host_field_name.to_owned());
	}
	None
}

fn match_array(
	schema: &Schema,
	key: SchemaKey,
	a: &ArrayDescriptor,
	cases: &SharedCases,
	visiting: &mut hashbrown::HashMap<SchemaKey, ()>,
	path: &mut SchemaPath,
) -> Result<(), BuildError> {
	let array = match &schema.get(key).type_ {
		RegularType::Array(array) => array,
		_ => return Err(mismatch(path, schema.get(key), "array")),
	};
	path.0.push(PathElement::ArrayItem);
	let result = walk(schema, array.items, &a.element, cases, visiting, path);
	path.0.pop();
	result
}

fn match_map(
	schema: &Schema,
	key: SchemaKey,
	m: &MapDescriptor,
	cases: &SharedCases,
	visiting: &mut hashbrown::HashMap<SchemaKey, ()>,
	path: &mut SchemaPath,
) -> Result<(), BuildError> {
	let map = match &schema.get(key).type_ {
		RegularType::Map(map) => map,
		_ => return Err(mismatch(path, schema.get(key), "map")),
	};
	path.0.push(PathElement::MapValue);
	let result = walk(schema, map.values, &m.value, cases, visiting, path);
	path.0.pop();
	result
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::descriptor::{Described, EnumDescriptor, FieldDescriptor};
	use crate::schema_builder::{build_schema_from_descriptor, SchemaBuilderConfig};
	use std::borrow::Cow;
	use std::sync::Arc;

	fn no_cases() -> SharedCases {
		Arc::from(Vec::new().into_boxed_slice())
	}

	#[test]
	fn accepts_matching_record() {
		let descriptor = TypeDescriptor::Record(RecordDescriptor {
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
		});
		let schema = build_schema_from_descriptor(&descriptor, &SchemaBuilderConfig::default()).unwrap();
		assert!(validate(&schema, &descriptor, &no_cases()).is_ok());
	}

	#[test]
	fn rejects_record_against_scalar_schema() {
		let descriptor = TypeDescriptor::Record(RecordDescriptor {
			name: Cow::Borrowed("test.Lonely"),
			fields: vec![],
		});
		let schema = build_schema_from_descriptor(&TypeDescriptor::Primitive(Primitive::Long), &SchemaBuilderConfig::default()).unwrap();
		assert!(validate(&schema, &descriptor, &no_cases()).is_err());
	}

	#[test]
	fn rejects_integer_host_type_against_bytes_schema() {
		let schema = build_schema_from_descriptor(&TypeDescriptor::Primitive(Primitive::Bytes), &SchemaBuilderConfig::default()).unwrap();
		let err = validate(&schema, &TypeDescriptor::Primitive(Primitive::I8), &no_cases()).unwrap_err();
		assert!(matches!(err.kind, crate::error::BuildErrorKind::UnsupportedType));
	}

	struct SelfRefList {
		_unused: (),
	}
	impl Described for SelfRefList {
		fn describe() -> TypeDescriptor {
			crate::descriptor::describe_guarded(Cow::Borrowed("test.SelfRefList"), || {
				TypeDescriptor::Record(RecordDescriptor {
					name: Cow::Borrowed("test.SelfRefList"),
					fields: vec![FieldDescriptor {
						name: Cow::Borrowed("next"),
						type_: TypeDescriptor::Option(Box::new(TypeDescriptor::Record(RecordDescriptor {
							name: Cow::Borrowed("test.SelfRefList"),
							fields: vec![],
						}))),
						is_writable: true,
						default_from_attribute: false,
					}],
				})
			})
		}
	}

	#[test]
	fn self_referential_descriptor_validates_without_looping() {
		let descriptor = SelfRefList::describe();
		assert!(matches!(
			&descriptor,
			TypeDescriptor::Record(r) if matches!(&r.fields[0].type_, TypeDescriptor::Option(inner) if matches!(**inner, TypeDescriptor::SelfReference(_)))
		));
		let schema = build_schema_from_descriptor(&descriptor, &SchemaBuilderConfig::default()).unwrap();
		assert!(validate(&schema, &descriptor, &no_cases()).is_ok());
	}

	#[test]
	fn recurring_enum_symbols_are_accepted() {
		let enum_descriptor = EnumDescriptor {
			name: Cow::Borrowed("test.Color"),
			symbols: vec![Cow::Borrowed("Red"), Cow::Borrowed("Green")],
			underlying_integral: None,
			nullable_reference: false,
		};
		let descriptor = TypeDescriptor::Enum(enum_descriptor);
		let schema = build_schema_from_descriptor(&descriptor, &SchemaBuilderConfig::default()).unwrap();
		assert!(validate(&schema, &descriptor, &no_cases()).is_ok());
	}
}

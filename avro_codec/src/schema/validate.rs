//! Enforces the invariants of §3.1
//!
//! Runs once, right after a [`Schema`](super::Schema) is assembled (whether
//! by the JSON reader or programmatically via [`Schema::from_nodes`]
//! (super::Schema::from_nodes)). Everything here is a build-time
//! `UnsupportedSchema` concern (§4.1), never a run-time one.

use super::{LogicalType, RegularType, SchemaNode};
use crate::error::SchemaError;
use std::collections::HashMap;

pub(crate) fn validate(nodes: &[SchemaNode]) -> Result<(), SchemaError> {
	if nodes.is_empty() {
		return Err(SchemaError::new(
			"schema must have at least one node (the root)",
		));
	}
	let mut names: HashMap<String, usize> = HashMap::new();
	for (idx, node) in nodes.iter().enumerate() {
		if let Some(name) = node.type_.name() {
			if let Some(prev) = names.insert(name.fully_qualified_name().to_owned(), idx) {
				if prev != idx {
					return Err(SchemaError::msg(format_args!(
						"duplicate named schema `{}` at node indices {} and {}",
						name.fully_qualified_name(),
						prev,
						idx
					)));
				}
			}
		}
		validate_node(node, idx, nodes)?;
	}
	Ok(())
}

fn validate_node(node: &SchemaNode, idx: usize, nodes: &[SchemaNode]) -> Result<(), SchemaError> {
	if let Some(logical) = &node.logical_type {
		validate_logical_type_overlay(logical, &node.type_, idx)?;
	}
	match &node.type_ {
		RegularType::Fixed(fixed) => {
			// size >= 0 is implied by `usize`; nothing further to check here
			let _ = fixed;
		}
		RegularType::Enum(enum_) => {
			if enum_.symbols.is_empty() {
				return Err(SchemaError::msg(format_args!(
					"enum `{}` (node {idx}) has no symbols",
					enum_.name
				)));
			}
			let mut seen = std::collections::HashSet::new();
			for symbol in &enum_.symbols {
				if !seen.insert(symbol.as_str()) {
					return Err(SchemaError::msg(format_args!(
						"enum `{}` (node {idx}) has duplicate symbol `{symbol}`",
						enum_.name
					)));
				}
			}
			if let Some(default) = &enum_.default {
				if !enum_.symbols.iter().any(|s| s == default) {
					return Err(SchemaError::msg(format_args!(
						"enum `{}` (node {idx}) default `{default}` is not one of its symbols",
						enum_.name
					)));
				}
			}
		}
		RegularType::Union(union) => {
			if union.variants.is_empty() {
				return Err(SchemaError::msg(format_args!(
					"union (node {idx}) must have at least one branch"
				)));
			}
			let mut unnamed_kinds = std::collections::HashSet::new();
			let mut named = std::collections::HashSet::new();
			for &variant_key in &union.variants {
				let variant = nodes.get(variant_key.idx()).ok_or_else(|| {
					SchemaError::msg(format_args!(
						"union (node {idx}) references out-of-bounds schema key {}",
						variant_key.idx()
					))
				})?;
				if matches!(variant.type_, RegularType::Union(_)) {
					return Err(SchemaError::new("union cannot directly contain a union"));
				}
				match variant.type_.name() {
					Some(name) => {
						if !named.insert(name.fully_qualified_name().to_owned()) {
							return Err(SchemaError::msg(format_args!(
								"union (node {idx}) has two branches named `{}`",
								name.fully_qualified_name()
							)));
						}
					}
					None => {
						let kind = variant.kind_name();
						if !unnamed_kinds.insert(kind) {
							return Err(SchemaError::msg(format_args!(
								"union (node {idx}) has two unnamed branches of kind `{kind}`"
							)));
						}
					}
				}
			}
		}
		RegularType::Array(array) => {
			check_key_in_bounds(array.items, nodes, idx, "array items")?;
		}
		RegularType::Map(map) => {
			check_key_in_bounds(map.values, nodes, idx, "map values")?;
		}
		RegularType::Record(record) => {
			let mut field_names = std::collections::HashSet::new();
			for field in &record.fields {
				if !field_names.insert(field.name.as_str()) {
					return Err(SchemaError::msg(format_args!(
						"record `{}` (node {idx}) has duplicate field `{}`",
						record.name, field.name
					)));
				}
				check_key_in_bounds(field.type_, nodes, idx, "record field type")?;
			}
		}
		_ => {}
	}
	Ok(())
}

fn check_key_in_bounds(
	key: super::SchemaKey,
	nodes: &[SchemaNode],
	from_idx: usize,
	what: &str,
) -> Result<(), SchemaError> {
	if key.idx() >= nodes.len() {
		return Err(SchemaError::msg(format_args!(
			"{what} of node {from_idx} references out-of-bounds schema key {}",
			key.idx()
		)));
	}
	Ok(())
}

fn validate_logical_type_overlay(
	logical: &LogicalType,
	underlying: &RegularType,
	idx: usize,
) -> Result<(), SchemaError> {
	let ok = match logical {
		LogicalType::Decimal(decimal) => {
			if decimal.precision == 0 {
				return Err(SchemaError::msg(format_args!(
					"decimal (node {idx}) precision must be >= 1, got {}",
					decimal.precision
				)));
			}
			if decimal.scale as usize > decimal.precision {
				return Err(SchemaError::msg(format_args!(
					"decimal (node {idx}) scale ({}) must be <= precision ({})",
					decimal.scale, decimal.precision
				)));
			}
			matches!(underlying, RegularType::Bytes | RegularType::Fixed(_))
		}
		LogicalType::Uuid => matches!(underlying, RegularType::String),
		LogicalType::Date | LogicalType::TimeMillis => matches!(underlying, RegularType::Int),
		LogicalType::TimeMicros
		| LogicalType::TimestampMillis
		| LogicalType::TimestampMicros
		| LogicalType::TimestampNanos => matches!(underlying, RegularType::Long),
		LogicalType::Duration => matches!(underlying, RegularType::Fixed(f) if f.size == 12),
		LogicalType::Unknown(_) => true,
	};
	if !ok {
		return Err(SchemaError::msg(format_args!(
			"logical type `{}` (node {idx}) cannot overlay a `{}`",
			logical.as_str(),
			underlying_kind_name(underlying)
		)));
	}
	Ok(())
}

fn underlying_kind_name(t: &RegularType) -> &'static str {
	match t {
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

/// A fast structural hash of the schema's canonical JSON, used as the
/// "schema-identity" half of the `(schema-identity, T)` codec cache key
/// (§5). Not cryptographic, and not the Avro Parsing-Canonical-Form Rabin
/// fingerprint — just cheap and stable for a given shape.
pub(crate) fn fingerprint(nodes: &[SchemaNode]) -> u64 {
	use std::hash::{Hash, Hasher};
	let mut hasher = std::collections::hash_map::DefaultHasher::new();
	nodes.len().hash(&mut hasher);
	for node in nodes {
		node.kind_name().hash(&mut hasher);
		if let RegularType::Record(record) = &node.type_ {
			record.name.fully_qualified_name().hash(&mut hasher);
			for field in &record.fields {
				field.name.hash(&mut hasher);
				field.type_.idx().hash(&mut hasher);
			}
		}
		if let Some(name) = node.type_.name() {
			name.fully_qualified_name().hash(&mut hasher);
		}
	}
	hasher.finish()
}

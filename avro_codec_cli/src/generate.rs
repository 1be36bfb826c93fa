//! Minimal source-code emission for records (§6.4 `generate`)
//!
//! Spec §1 explicitly keeps "generated source-code emission for records from
//! a schema" out of scope for the core. This module is the CLI's own thin,
//! admittedly incomplete stand-in for it — good enough to get a caller a
//! compilable starting point, not a polished generator. It walks the schema
//! tree once and emits one `struct`/`enum` per named type it encounters, in
//! first-encountered order, with `#[derive(Serialize, Deserialize)]` so the
//! emitted types work directly with [`avro_codec::to_binary`]/
//! [`avro_codec::from_binary`].

use avro_codec::schema::{LogicalType, RegularType, Schema, SchemaKey};
use std::collections::HashSet;
use std::fmt::Write as _;

pub fn emit_struct(schema: &Schema) -> String {
	let mut out = String::new();
	let mut emitted = HashSet::new();
	emit_named(schema, schema.root_key(), &mut out, &mut emitted);
	out
}

fn emit_named(schema: &Schema, key: SchemaKey, out: &mut String, emitted: &mut HashSet<String>) {
	let node = schema.get(key);
	match &node.type_ {
		RegularType::Record(record) => {
			if !emitted.insert(record.name.fully_qualified_name().to_owned()) {
				return;
			}
			// Fields first, so dependency types appear above their users.
			for field in &record.fields {
				emit_named(schema, field.type_, out, emitted);
			}
			let _ = writeln!(out, "#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]");
			let _ = writeln!(out, "pub struct {} {{", rust_type_name(record.name.name()));
			for field in &record.fields {
				let _ = writeln!(out, "\tpub {}: {},", rust_field_name(&field.name), rust_type_of(schema, field.type_));
			}
			let _ = writeln!(out, "}}\n");
		}
		RegularType::Enum(e) => {
			if !emitted.insert(e.name.fully_qualified_name().to_owned()) {
				return;
			}
			let _ = writeln!(out, "#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]");
			let _ = writeln!(out, "pub enum {} {{", rust_type_name(e.name.name()));
			for symbol in &e.symbols {
				let _ = writeln!(out, "\t{},", rust_type_name(symbol));
			}
			let _ = writeln!(out, "}}\n");
		}
		RegularType::Array(array) => emit_named(schema, array.items, out, emitted),
		RegularType::Map(map) => emit_named(schema, map.values, out, emitted),
		RegularType::Union(union) => {
			for &variant in &union.variants {
				emit_named(schema, variant, out, emitted);
			}
		}
		_ => {}
	}
}

/// The Rust type a schema node maps to, for field declarations — does not
/// recurse into defining named types (that's [`emit_named`]'s job), it only
/// names them.
fn rust_type_of(schema: &Schema, key: SchemaKey) -> String {
	let node = schema.get(key);
	if let Some(logical) = &node.logical_type {
		return match logical {
			LogicalType::Uuid => "uuid::Uuid".to_owned(),
			LogicalType::Decimal(_) => "rust_decimal::Decimal".to_owned(),
			LogicalType::Date | LogicalType::TimeMillis => "i32".to_owned(),
			LogicalType::TimeMicros
			| LogicalType::TimestampMillis
			| LogicalType::TimestampMicros
			| LogicalType::TimestampNanos => "i64".to_owned(),
			LogicalType::Duration => "[u8; 12]".to_owned(),
			LogicalType::Unknown(_) => rust_type_of_regular(schema, &node.type_),
		};
	}
	rust_type_of_regular(schema, &node.type_)
}

fn rust_type_of_regular(schema: &Schema, type_: &RegularType) -> String {
	match type_ {
		RegularType::Null => "()".to_owned(),
		RegularType::Boolean => "bool".to_owned(),
		RegularType::Int => "i32".to_owned(),
		RegularType::Long => "i64".to_owned(),
		RegularType::Float => "f32".to_owned(),
		RegularType::Double => "f64".to_owned(),
		RegularType::Bytes => "Vec<u8>".to_owned(),
		RegularType::String => "String".to_owned(),
		RegularType::Fixed(fixed) => format!("[u8; {}]", fixed.size),
		RegularType::Array(array) => format!("Vec<{}>", rust_type_of(schema, array.items)),
		RegularType::Map(map) => format!("std::collections::HashMap<String, {}>", rust_type_of(schema, map.values)),
		RegularType::Record(record) => rust_type_name(record.name.name()),
		RegularType::Enum(e) => rust_type_name(e.name.name()),
		RegularType::Union(union) => match union.as_nullable(schema) {
			Some((_, non_null_idx)) => format!("Option<{}>", rust_type_of(schema, union.variants[non_null_idx])),
			None => "serde_json::Value".to_owned(),
		},
	}
}

fn rust_type_name(avro_name: &str) -> String {
	let mut out = String::new();
	let mut capitalize_next = true;
	for ch in avro_name.chars() {
		if ch == '_' || ch == '.' {
			capitalize_next = true;
			continue;
		}
		if capitalize_next {
			out.extend(ch.to_uppercase());
			capitalize_next = false;
		} else {
			out.push(ch);
		}
	}
	out
}

fn rust_field_name(avro_name: &str) -> String {
	let snake = avro_name.to_owned();
	if matches!(snake.as_str(), "type" | "move" | "fn" | "match" | "ref" | "self" | "struct" | "impl" | "use") {
		format!("r#{snake}")
	} else {
		snake
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn emits_a_struct_for_a_record() {
		let schema: Schema = r#"{"type":"record","name":"test.Point","fields":[
			{"name":"x","type":"int"},
			{"name":"y","type":"int"}
		]}"#
		.parse()
		.unwrap();
		let src = emit_struct(&schema);
		assert!(src.contains("pub struct Point {"));
		assert!(src.contains("pub x: i32,"));
		assert!(src.contains("pub y: i32,"));
	}

	#[test]
	fn emits_an_enum() {
		let schema: Schema = r#"{"type":"enum","name":"test.Color","symbols":["RED","GREEN"]}"#
			.parse()
			.unwrap();
		let src = emit_struct(&schema);
		assert!(src.contains("pub enum Color {"));
		assert!(src.contains("Red,") || src.contains("RED,"));
	}

	#[test]
	fn nested_records_appear_before_their_users() {
		let schema: Schema = r#"{"type":"record","name":"test.Outer","fields":[
			{"name":"inner","type":{"type":"record","name":"test.Inner","fields":[{"name":"v","type":"int"}]}}
		]}"#
		.parse()
		.unwrap();
		let src = emit_struct(&schema);
		let inner_idx = src.find("struct Inner").unwrap();
		let outer_idx = src.find("struct Outer").unwrap();
		assert!(inner_idx < outer_idx);
	}
}

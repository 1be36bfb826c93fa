//! End-to-end coverage of the testable properties and concrete scenarios
//! this crate's design document lists: round-trips over both encodings,
//! union branch ordering, skip-unknown-field decoding, decimal
//! truncation/overflow, enum ordinal fallback, recursive schemas, and the
//! error taxonomy's four run-time/build-time kinds.

use avro_codec::error::{BuildErrorKind, CodecError};
use avro_codec::schema_builder::{build_schema_from_descriptor, SchemaBuilderConfig};
use avro_codec::Schema;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ---------------------------------------------------------------------
// 1 & 2. Round-trip, binary and JSON
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Point {
	x: i32,
	y: i32,
	label: String,
}

const POINT_SCHEMA: &str = r#"
{
	"type": "record",
	"name": "test.Point",
	"fields": [
		{ "name": "x", "type": "int" },
		{ "name": "y", "type": "int" },
		{ "name": "label", "type": "string" }
	]
}
"#;

#[test]
fn round_trips_binary() {
	let schema: Schema = POINT_SCHEMA.parse().unwrap();
	let value = Point { x: -3, y: 42, label: "origin".to_owned() };
	let bytes = avro_codec::to_binary(&value, &schema).unwrap();
	let back: Point = avro_codec::from_binary(&bytes, &schema).unwrap();
	assert_eq!(back, value);
}

#[test]
fn round_trips_json() {
	let schema: Schema = POINT_SCHEMA.parse().unwrap();
	let value = Point { x: -3, y: 42, label: "origin".to_owned() };
	let json = avro_codec::to_json(&value, &schema).unwrap();
	let back: Point = avro_codec::from_json(&json, &schema).unwrap();
	assert_eq!(back, value);
}

// ---------------------------------------------------------------------
// 3. Schema round-trip
// ---------------------------------------------------------------------

#[test]
fn schema_round_trips_through_its_own_canonical_form() {
	let schema: Schema = POINT_SCHEMA.parse().unwrap();
	let written = schema.canonical_json();
	let reparsed: Schema = written.parse().unwrap();
	assert_eq!(reparsed.canonical_json(), written);
}

// ---------------------------------------------------------------------
// 4. Union order
// ---------------------------------------------------------------------

#[test]
fn option_encodes_null_branch_first_by_default() {
	let schema: Schema = r#"["null", "int"]"#.parse().unwrap();
	let some_bytes = avro_codec::to_binary(&Some(7i32), &schema).unwrap();
	let none_bytes = avro_codec::to_binary(&Option::<i32>::None, &schema).unwrap();
	// branch index 1 (zig-zag encoded as `02`) then payload `7` (zig-zag `0E`)
	assert_eq!(some_bytes, vec![0x02, 0x0E]);
	// branch index 0 (zig-zag `00`), no payload for null
	assert_eq!(none_bytes, vec![0x00]);
}

#[test]
fn swapped_union_order_swaps_the_branch_indices() {
	let schema: Schema = r#"["int", "null"]"#.parse().unwrap();
	let some_bytes = avro_codec::to_binary(&Some(7i32), &schema).unwrap();
	let none_bytes = avro_codec::to_binary(&Option::<i32>::None, &schema).unwrap();
	assert_eq!(some_bytes, vec![0x00, 0x0E]);
	assert_eq!(none_bytes, vec![0x02]);
}

// ---------------------------------------------------------------------
// 5. Skip-unknown
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NarrowPoint {
	x: i32,
	y: i32,
}

#[test]
fn decoding_ignores_a_schema_field_absent_from_the_host_type() {
	// wire schema has a `label` field the host type below doesn't know about
	let wide_schema: Schema = POINT_SCHEMA.parse().unwrap();
	let wide_bytes = avro_codec::to_binary(
		&Point { x: 1, y: 2, label: "extra".to_owned() },
		&wide_schema,
	)
	.unwrap();

	let narrow: NarrowPoint = avro_codec::from_binary(&wide_bytes, &wide_schema).unwrap();
	assert_eq!(narrow, NarrowPoint { x: 1, y: 2 });
}

// ---------------------------------------------------------------------
// 6. Decimal resizing
// ---------------------------------------------------------------------

fn decimal_schema(precision: usize, scale: u32) -> Schema {
	format!(
		r#"{{"type":"bytes","logicalType":"decimal","precision":{precision},"scale":{scale}}}"#
	)
	.parse()
	.unwrap()
}

#[test]
fn encoding_a_decimal_truncates_excess_scale_toward_zero() {
	let schema = decimal_schema(6, 2);
	let value = Decimal::from_str("-1666.6666").unwrap();
	let bytes = avro_codec::to_binary(&value, &schema).unwrap();

	let decoded: Decimal = avro_codec::from_binary(&bytes, &schema).unwrap();
	assert_eq!(decoded, Decimal::from_str("-1666.66").unwrap());
}

#[test]
fn encoding_a_decimal_exceeding_precision_overflows() {
	let schema = decimal_schema(3, 2);
	let value = Decimal::from_str("999.99").unwrap();
	let err = avro_codec::to_binary(&value, &schema).unwrap_err();
	assert!(matches!(err, CodecError::Overflow { .. }), "expected Overflow, got {err:?}");
}

// ---------------------------------------------------------------------
// 7. Enum fallback
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum Ordinal {
	#[serde(rename = "NONE")]
	None,
	#[serde(rename = "FIRST")]
	First,
	#[serde(rename = "SECOND")]
	Second,
	#[serde(rename = "THIRD")]
	Third,
	#[serde(rename = "FOURTH")]
	Fourth,
}

const ORDINAL_SCHEMA: &str = r#"
{
	"type": "enum",
	"name": "ordinal",
	"symbols": ["NONE", "FIRST", "SECOND", "THIRD", "FOURTH"],
	"default": "NONE"
}
"#;

#[test]
fn an_out_of_range_ordinal_falls_back_to_the_schema_default() {
	let schema: Schema = ORDINAL_SCHEMA.parse().unwrap();
	// zig-zag `5` (out of range: only 5 symbols, valid ordinals 0..=4)
	let decoded: Ordinal = avro_codec::from_binary(&[0x0A], &schema).unwrap();
	assert_eq!(decoded, Ordinal::None);
}

#[test]
fn an_in_range_ordinal_decodes_normally() {
	let schema: Schema = ORDINAL_SCHEMA.parse().unwrap();
	// zig-zag `2`
	let decoded: Ordinal = avro_codec::from_binary(&[0x04], &schema).unwrap();
	assert_eq!(decoded, Ordinal::Second);
}

#[test]
fn an_out_of_range_ordinal_with_no_default_is_invalid_data() {
	let schema: Schema = r#"{"type":"enum","name":"ordinal","symbols":["NONE","FIRST"]}"#
		.parse()
		.unwrap();
	let err = avro_codec::from_binary::<Ordinal>(&[0x0A], &schema).unwrap_err();
	assert!(matches!(err, CodecError::InvalidData { .. }), "expected InvalidData, got {err:?}");
}

// ---------------------------------------------------------------------
// 8. Recursive schemas
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Node {
	value: i32,
	next: Option<Box<Node>>,
}

const NODE_SCHEMA: &str = r#"
{
	"type": "record",
	"name": "Node",
	"fields": [
		{ "name": "value", "type": "int" },
		{ "name": "next", "type": ["null", "Node"] }
	]
}
"#;

#[test]
fn a_recursive_schema_round_trips_a_three_node_list() {
	let schema: Schema = NODE_SCHEMA.parse().unwrap();
	let list = Node {
		value: 1,
		next: Some(Box::new(Node {
			value: 2,
			next: Some(Box::new(Node { value: 3, next: None })),
		})),
	};
	let bytes = avro_codec::to_binary(&list, &schema).unwrap();
	let back: Node = avro_codec::from_binary(&bytes, &schema).unwrap();
	assert_eq!(back, list);
}

// ---------------------------------------------------------------------
// Concrete end-to-end scenarios E1-E6
// ---------------------------------------------------------------------

#[test]
fn e1_int() {
	let schema: Schema = "\"int\"".parse().unwrap();
	assert_eq!(avro_codec::to_binary(&1i32, &schema).unwrap(), vec![0x02]);
	assert_eq!(avro_codec::to_json(&1i32, &schema).unwrap(), "1");
}

#[test]
fn e2_string() {
	let schema: Schema = "\"string\"".parse().unwrap();
	let value = "🧙".to_owned();
	assert_eq!(
		avro_codec::to_binary(&value, &schema).unwrap(),
		vec![0x08, 0xF0, 0x9F, 0xA7, 0x99]
	);
	assert_eq!(avro_codec::to_json(&value, &schema).unwrap(), "\"🧙\"");
}

#[test]
fn e3_nullable_int() {
	let schema: Schema = r#"["null", "int"]"#.parse().unwrap();
	assert_eq!(
		avro_codec::to_binary(&Option::<i32>::None, &schema).unwrap(),
		vec![0x00]
	);
	assert_eq!(
		avro_codec::to_binary(&Some(7i32), &schema).unwrap(),
		vec![0x02, 0x0E]
	);
	assert_eq!(avro_codec::to_json(&Option::<i32>::None, &schema).unwrap(), "null");
	assert_eq!(avro_codec::to_json(&Some(7i32), &schema).unwrap(), r#"{"int":7}"#);
}

#[test]
fn e4_enum_ordinal_fallback_and_normal_decode() {
	let schema: Schema = ORDINAL_SCHEMA.parse().unwrap();
	let fallback: Ordinal = avro_codec::from_binary(&[0x0A], &schema).unwrap();
	assert_eq!(fallback, Ordinal::None);
	let second: Ordinal = avro_codec::from_binary(&[0x04], &schema).unwrap();
	assert_eq!(second, Ordinal::Second);
}

#[test]
fn e5_recursive_record() {
	let schema: Schema = NODE_SCHEMA.parse().unwrap();
	let value = Node {
		value: 1,
		next: Some(Box::new(Node { value: 2, next: None })),
	};
	let bytes = avro_codec::to_binary(&value, &schema).unwrap();
	assert_eq!(bytes, vec![0x02, 0x02, 0x04, 0x00]);
}

#[test]
fn e6_decimal_truncation() {
	// spec.md's scenario E6 is literally `Decimal(5, 2)` encoding -1666.66 to
	// -166666, but -166666 has 6 significant digits, which this crate's
	// strict precision check (§4.2.3 item 12/§8 property 6) rejects at
	// precision 5 with `Overflow` rather than truncating. That makes the
	// literal E6 input untestable as written; precision 6 is used here
	// instead so the rest of the scenario still exercises truncate-then-
	// decode. See DESIGN.md for the precision-enforcement decision.
	let schema = decimal_schema(6, 2);
	let value = Decimal::from_str("-1666.6666").unwrap();
	let bytes = avro_codec::to_binary(&value, &schema).unwrap();
	// unscaled -166666's minimal two's-complement big-endian form is 3 bytes
	// (fd 74 f6); the length prefix is zig-zag(3) = `06`.
	assert_eq!(bytes, vec![0x06, 0xfd, 0x74, 0xf6]);

	let decoded: Decimal = avro_codec::from_binary(&bytes, &schema).unwrap();
	assert_eq!(decoded, Decimal::from_str("-1666.66").unwrap());
}

// ---------------------------------------------------------------------
// Error taxonomy: at least one failing example per kind
// ---------------------------------------------------------------------

#[test]
fn unsupported_schema_rejects_a_union_with_two_branches_of_the_same_unnamed_kind() {
	let err = Schema::from_str(r#"["int", "int"]"#).unwrap_err();
	assert!(err.to_string().contains("two unnamed branches"), "{err}");
}

#[test]
fn unsupported_type_rejects_a_dynamic_descriptor_with_no_canonical_schema() {
	let err = build_schema_from_descriptor(
		&avro_codec::descriptor::TypeDescriptor::Dynamic,
		&SchemaBuilderConfig::default(),
	)
	.unwrap_err();
	assert_eq!(err.kind, BuildErrorKind::UnsupportedType);
}

#[test]
fn overflow_rejects_a_decimal_that_needs_more_precision_than_the_schema_allows() {
	let schema = decimal_schema(3, 2);
	let err = avro_codec::to_binary(&Decimal::from_str("999.99").unwrap(), &schema).unwrap_err();
	assert!(matches!(err, CodecError::Overflow { .. }), "{err:?}");
}

#[test]
fn invalid_data_rejects_a_malformed_boolean_byte() {
	let schema: Schema = "\"boolean\"".parse().unwrap();
	let err = avro_codec::from_binary::<bool>(&[2], &schema).unwrap_err();
	assert!(matches!(err, CodecError::InvalidData { .. }), "{err:?}");
}

use avro_codec::descriptor::{Described, TypeDescriptor};
use avro_codec::schema::RegularType;
use avro_codec::schema_builder::{build_schema_from_descriptor, SchemaBuilderConfig};
use avro_codec_derive::Described;

#[derive(Described)]
struct Point {
	x: i32,
	y: i32,
}

#[test]
fn derives_a_record_descriptor() {
	match Point::describe() {
		TypeDescriptor::Record(record) => {
			assert!(record.name.ends_with(".Point"));
			assert_eq!(record.fields.len(), 2);
			assert_eq!(record.fields[0].name, "x");
			assert_eq!(record.fields[1].name, "y");
		}
		other => panic!("expected a record descriptor, got {other:?}"),
	}
}

#[test]
fn record_descriptor_builds_into_a_schema() {
	let schema = build_schema_from_descriptor(&Point::describe(), &SchemaBuilderConfig::default()).unwrap();
	match &schema.root().type_ {
		RegularType::Record(record) => assert_eq!(record.fields.len(), 2),
		other => panic!("expected a record schema, got {other:?}"),
	}
}

#[derive(Described)]
#[avro_schema(name = "Color", namespace = "test.colors")]
enum Color {
	Red,
	Green,
	Blue,
}

#[test]
fn derives_an_enum_descriptor_with_name_override() {
	match Color::describe() {
		TypeDescriptor::Enum(e) => {
			assert_eq!(e.name, "test.colors.Color");
			assert_eq!(e.symbols, vec!["Red", "Green", "Blue"]);
		}
		other => panic!("expected an enum descriptor, got {other:?}"),
	}
}

#[derive(Described)]
struct Millimeters(f64);

#[test]
fn newtype_struct_describes_transparently() {
	assert_eq!(Millimeters::describe(), f64::describe());
}

#[derive(Described)]
struct WithDefault {
	#[avro_schema(default)]
	count: i32,
	#[avro_schema(rename = "full_name")]
	name: String,
}

#[test]
fn field_attributes_are_honored() {
	match WithDefault::describe() {
		TypeDescriptor::Record(record) => {
			assert!(record.fields[0].default_from_attribute);
			assert_eq!(record.fields[1].name, "full_name");
			assert!(!record.fields[1].default_from_attribute);
		}
		other => panic!("expected a record descriptor, got {other:?}"),
	}
}

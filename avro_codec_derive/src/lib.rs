//! Bring `#[derive(Described)]` to [`avro_codec`]
//!
//! This mirrors the teacher's `serde_avro_derive`/`serde_avro_derive_macros`
//! split: the proc-macro crate (`avro_codec_derive_macros`) does the actual
//! token-stream work, this crate re-exports it alongside the trait it
//! implements so callers depend on one crate instead of two.
//!
//! ```
//! #[derive(avro_codec_derive::Described, serde::Serialize, serde::Deserialize)]
//! struct Point {
//! 	x: i32,
//! 	y: i32,
//! }
//!
//! use avro_codec::descriptor::Described;
//! let descriptor = Point::describe();
//! let schema = avro_codec::schema_builder::build_schema_from_descriptor(
//! 	&descriptor,
//! 	&avro_codec::schema_builder::SchemaBuilderConfig::default(),
//! )
//! .unwrap();
//! ```

pub use avro_codec;
pub use avro_codec_derive_macros::Described;

//! Internal macros crate for the `avro_codec_derive` crate
//!
//! Use [`avro_codec_derive`](https://docs.rs/avro_codec_derive/) instead of
//! using this crate directly.

mod describe;

use darling::FromDeriveInput;

#[proc_macro_derive(Described, attributes(avro_schema))]
/// Derive [`Described`](../avro_codec/descriptor/trait.Described.html) for a
/// struct or enum.
///
/// # Structs
///
/// A struct with named fields derives a record descriptor, one field per
/// struct field, in declaration order.
///
/// A tuple struct with exactly one field (a newtype) derives transparently:
/// the descriptor is simply the inner field's descriptor. This is the
/// escape hatch for wrapper types (e.g. around a `Decimal` or `Uuid`) that
/// should not introduce a record layer of their own.
///
/// # Enums
///
/// Only unit-variant (C-like) enums are supported; they derive an enum
/// descriptor whose symbols are the variant names in declaration order.
/// Enums carrying data are schema-builder territory handled through a
/// [`BuilderCase`](../avro_codec/codec/trait.BuilderCase.html), not through
/// this derive.
///
/// # Attributes
///
/// - `#[avro_schema(name = "...")]` / `#[avro_schema(namespace = "...")]` on
///   the struct/enum: override the name/namespace that would otherwise be
///   inferred from the Rust type name and its module path.
/// - `#[avro_schema(rename = "...")]` on a field: the schema field name, if
///   different from the Rust field name.
/// - `#[avro_schema(default)]` on a field: record that the field carries its
///   own default value (its schema default is then derived from the
///   field's type, see [`crate::schema_builder`](../avro_codec/schema_builder/index.html)).
pub fn described_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let derive_input = syn::parse_macro_input!(input as syn::DeriveInput);
	match DescribedInput::from_derive_input(&derive_input).map(describe::describe_impl) {
		Err(e) => e.write_errors().into(),
		Ok(Ok(tokens)) => tokens.into(),
		Ok(Err(e)) => e.into_compile_error().into(),
	}
}

pub(crate) use describe::DescribedInput;

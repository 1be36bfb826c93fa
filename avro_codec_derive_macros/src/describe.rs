//! Implementation of `#[derive(Described)]` (§3.2 "host-language
//! attribute/reflection probing", carried out here at compile time instead
//! of at runtime).

use darling::{ast, FromDeriveInput, FromField, FromVariant};
use proc_macro2::TokenStream;
use quote::quote;
use syn::Error;

#[derive(FromDeriveInput)]
#[darling(attributes(avro_schema), supports(struct_named, struct_newtype, enum_unit))]
pub(crate) struct DescribedInput {
	ident: syn::Ident,
	generics: syn::Generics,
	data: ast::Data<DescribedVariant, DescribedField>,
	name: Option<String>,
	namespace: Option<String>,
}

#[derive(FromField)]
#[darling(attributes(avro_schema))]
struct DescribedField {
	ident: Option<syn::Ident>,
	ty: syn::Type,
	rename: Option<String>,
	#[darling(default)]
	default: darling::util::Flag,
}

#[derive(FromVariant)]
#[darling(attributes(avro_schema))]
struct DescribedVariant {
	ident: syn::Ident,
}

pub(crate) fn describe_impl(input: DescribedInput) -> Result<TokenStream, Error> {
	let ident = &input.ident;
	let rust_name = ident.to_string();
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

	// Full-name resolution (§3.1 "full-name"): an explicit `name`/`namespace`
	// attribute wins outright; otherwise the Rust module path this derive
	// expands in stands in for a namespace, since proc-macros have no other
	// view of "where this type lives" (§3.2 keeps reflection behind an
	// interface; this is the Rust-native realization of it).
	let name_expr = match (&input.name, &input.namespace) {
		(Some(name), Some(namespace)) => quote! { format!("{}.{}", #namespace, #name) },
		(Some(name), None) => quote! { #name.to_owned() },
		(None, Some(namespace)) => quote! { format!("{}.{}", #namespace, #rust_name) },
		(None, None) => quote! { format!("{}.{}", module_path!(), #rust_name) },
	};

	let body = match &input.data {
		ast::Data::Struct(fields) => match fields.style {
			ast::Style::Struct => {
				let field_tokens = fields.fields.iter().map(|field| {
					let field_ident = field
						.ident
						.as_ref()
						.expect("struct_named guarantees named fields");
					let field_name = field
						.rename
						.clone()
						.unwrap_or_else(|| field_ident.to_string());
					let ty = &field.ty;
					let has_default = field.default.is_present();
					quote! {
						avro_codec::descriptor::FieldDescriptor {
							name: ::std::borrow::Cow::Owned(#field_name.to_owned()),
							type_: <#ty as avro_codec::descriptor::Described>::describe(),
							is_writable: true,
							default_from_attribute: #has_default,
						}
					}
				});
				quote! {
					avro_codec::descriptor::describe_guarded(
						::std::borrow::Cow::Owned(#name_expr),
						|| avro_codec::descriptor::TypeDescriptor::Record(avro_codec::descriptor::RecordDescriptor {
							name: ::std::borrow::Cow::Owned(#name_expr),
							fields: vec![#(#field_tokens),*],
						}),
					)
				}
			}
			ast::Style::Tuple if fields.fields.len() == 1 => {
				// Newtype escape hatch (see the derive's doc comment):
				// describe transparently as the inner field's descriptor.
				let ty = &fields.fields[0].ty;
				quote! { <#ty as avro_codec::descriptor::Described>::describe() }
			}
			_ => {
				return Err(Error::new_spanned(
					ident,
					"Described can only be derived for structs with named fields, \
					 or single-field tuple structs (newtypes)",
				))
			}
		},
		ast::Data::Enum(variants) => {
			let symbols = variants.iter().map(|v| v.ident.to_string());
			quote! {
				avro_codec::descriptor::TypeDescriptor::Enum(avro_codec::descriptor::EnumDescriptor {
					name: ::std::borrow::Cow::Owned(#name_expr),
					symbols: vec![#(::std::borrow::Cow::Owned(#symbols.to_owned())),*],
					underlying_integral: None,
					nullable_reference: false,
				})
			}
		}
	};

	Ok(quote! {
		impl #impl_generics avro_codec::descriptor::Described for #ident #ty_generics #where_clause {
			fn describe() -> avro_codec::descriptor::TypeDescriptor {
				#body
			}
		}
	})
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Visibility};

/// Options collected from `#[reflect(...)]`.
#[derive(Default)]
struct ReflectAttrs {
    /// Declared type name; defaults to `module_path!()::Ident`.
    name: Option<LitStr>,
    /// Delegate `method_specs` to `ReflectMethods`.
    methods: bool,
}

/// `#[derive(Reflect)]` macro: generates the descriptor and value mapping.
///
/// Supports:
/// - Structs with named fields: every field type must implement `Reflect`.
///   `pub` fields are writable through addressable handles; other fields
///   are read-only.
/// - Tuple newtypes `struct Celsius(f64)`: a named type with the kind and
///   structure of the wrapped type.
///
/// Attributes:
/// - `#[reflect(name = "pkg.Sample")]` overrides the type name.
/// - `#[reflect(methods)]` takes the method set from the type's
///   `ReflectMethods` impl.
///
/// Example:
/// ```ignore
/// use introspect::Reflect;
///
/// #[derive(Reflect)]
/// #[reflect(name = "main.Sample")]
/// pub struct Sample {
///     pub a: i64,
///     pub b: String,
///     c: f64,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Generic types are not supported",
        ));
    }

    let attrs = parse_attrs(input)?;
    let name = &input.ident;
    let type_name = match &attrs.name {
        Some(lit) => quote! { #lit },
        None => quote! { ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#name)) },
    };
    let method_specs = if attrs.methods {
        quote! {
            fn method_specs() -> ::std::vec::Vec<::introspect::MethodSpec> {
                <Self as ::introspect::ReflectMethods>::method_specs()
            }
        }
    } else {
        TokenStream2::new()
    };

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Only structs are supported",
            ))
        }
    };

    let body = match &data.fields {
        Fields::Named(fields) => expand_named(name, &type_name, &fields.named)?,
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
            let inner = &fields.unnamed[0].ty;
            expand_newtype(&type_name, inner)
        }
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Only named fields or single-field tuple structs are supported",
            ))
        }
    };

    Ok(quote! {
        impl ::introspect::Reflect for #name {
            #body
            #method_specs
        }
    })
}

fn parse_attrs(input: &DeriveInput) -> syn::Result<ReflectAttrs> {
    let mut attrs = ReflectAttrs::default();
    for attr in &input.attrs {
        if !attr.path().is_ident("reflect") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                attrs.name = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("methods") {
                attrs.methods = true;
                Ok(())
            } else {
                Err(meta.error("Unsupported reflect attribute; expected `name` or `methods`"))
            }
        })?;
    }
    Ok(attrs)
}

fn expand_named(
    name: &syn::Ident,
    type_name: &TokenStream2,
    fields: &syn::punctuated::Punctuated<syn::Field, syn::token::Comma>,
) -> syn::Result<TokenStream2> {
    let mut idents = Vec::new();
    let mut types = Vec::new();
    let mut exported = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        idents.push(ident.clone());
        types.push(field.ty.clone());
        exported.push(matches!(field.vis, Visibility::Public(_)));
    }
    let names: Vec<String> = idents.iter().map(ToString::to_string).collect();
    let indices: Vec<usize> = (0..idents.len()).collect();
    let count = idents.len();

    Ok(quote! {
        fn describe() -> ::introspect::TypeDescriptor {
            ::introspect::TypeDescriptor::struct_type(
                #type_name,
                ::core::mem::size_of::<#name>(),
                ::std::vec![
                    #(
                        ::introspect::FieldDescriptor::new(
                            #names,
                            <#types as ::introspect::Reflect>::type_of(),
                        )
                        .with_offset(::core::mem::offset_of!(#name, #idents))
                        .exported(#exported)
                    ),*
                ],
            )
        }

        fn to_value(&self) -> ::introspect::Value {
            ::introspect::Value::Struct(::std::vec![
                #( ::introspect::Reflect::to_value(&self.#idents) ),*
            ])
        }

        fn from_value(value: &::introspect::Value) -> ::introspect::Result<Self> {
            match value {
                ::introspect::Value::Struct(fields) if fields.len() == #count => Ok(Self {
                    #( #idents: <#types as ::introspect::Reflect>::from_value(&fields[#indices])? ),*
                }),
                other => Err(::introspect::ReflectError::TypeMismatch {
                    expected: ::std::string::ToString::to_string(#type_name),
                    got: ::std::string::ToString::to_string(other.variant_name()),
                }),
            }
        }
    })
}

fn expand_newtype(type_name: &TokenStream2, inner: &syn::Type) -> TokenStream2 {
    quote! {
        fn describe() -> ::introspect::TypeDescriptor {
            ::introspect::TypeDescriptor::named(
                #type_name,
                &<#inner as ::introspect::Reflect>::type_of(),
                ::core::mem::size_of::<Self>(),
            )
        }

        fn to_value(&self) -> ::introspect::Value {
            ::introspect::Reflect::to_value(&self.0)
        }

        fn from_value(value: &::introspect::Value) -> ::introspect::Result<Self> {
            <#inner as ::introspect::Reflect>::from_value(value).map(Self)
        }
    }
}

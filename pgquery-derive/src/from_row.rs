//! Derive macro for `FromRow` trait
//!
//! Generates `pgquery::FromRow` for structs, extracting every field from a
//! `pgquery::ResultRow` through `ResultRow::try_get`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

use crate::attributes;
use crate::utils;

/// Generate FromRow implementation for a struct
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => {
                let extracted = fields
                    .named
                    .iter()
                    .map(|field| {
                        let field_name = field
                            .ident
                            .as_ref()
                            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
                        let field_type = &field.ty;
                        let column_name = match attributes::extract_column_name(field)? {
                            Some(name) => name,
                            None => utils::snake_case(&field_name.unraw().to_string()),
                        };
                        Ok(quote! {
                            #field_name: row.try_get::<#field_type, &str>(#column_name)?,
                        })
                    })
                    .collect::<syn::Result<Vec<TokenStream2>>>()?;
                quote! { Self { #(#extracted)* } }
            }
            Fields::Unnamed(fields) => {
                if let Some(field) = fields
                    .unnamed
                    .iter()
                    .find(|f| f.attrs.iter().any(|a| a.path().is_ident("column_name")))
                {
                    return Err(syn::Error::new_spanned(
                        field,
                        "column_name is not supported on tuple struct fields",
                    ));
                }
                let extracted = fields.unnamed.iter().enumerate().map(|(idx, field)| {
                    let field_type = &field.ty;
                    quote! { row.try_get::<#field_type, usize>(#idx)?, }
                });
                quote! { Self( #(#extracted)* ) }
            }
            Fields::Unit => quote! { { let _ = row; Self } },
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "FromRow can only be derived for structs",
            ))
        }
    };

    Ok(quote! {
        impl #impl_generics ::pgquery::FromRow for #struct_name #ty_generics #where_clause {
            fn from_row(
                row: &::pgquery::ResultRow,
            ) -> ::std::result::Result<Self, ::pgquery::ValueExtractionError> {
                ::std::result::Result::Ok(#body)
            }
        }
    })
}

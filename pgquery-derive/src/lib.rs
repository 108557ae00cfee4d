//! Procedural macros for pgquery
//!
//! This crate provides the `FromRow` derive. Use it through the `pgquery`
//! re-export rather than depending on it directly.

mod attributes;
mod from_row;
mod utils;

use proc_macro::TokenStream;

/// Derive macro for `FromRow` - maps a decoded `pgquery::ResultRow` onto a struct
///
/// Named fields are looked up by column name: the snake_case field name, or the
/// name given with `#[column_name("...")]`. Tuple struct fields are taken by
/// position. Every field type must implement `pgquery::TryGetable`.
#[proc_macro_derive(FromRow, attributes(column_name))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    from_row::derive_from_row(input)
}

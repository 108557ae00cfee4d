//! Attribute parsing utilities

use syn::{Expr, ExprLit, Field, Lit, LitStr, Meta};

/// Extract the column name from a field's `#[column_name(...)]` attribute
///
/// Accepts both `#[column_name("name")]` and `#[column_name = "name"]`.
/// Returns `Ok(None)` when the attribute is absent.
pub fn extract_column_name(field: &Field) -> syn::Result<Option<String>> {
    for attr in &field.attrs {
        if !attr.path().is_ident("column_name") {
            continue;
        }
        let name = match &attr.meta {
            Meta::List(_) => attr.parse_args::<LitStr>()?.value(),
            Meta::NameValue(meta) => match &meta.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => s.value(),
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "column_name expects a string literal",
                    ))
                }
            },
            Meta::Path(path) => {
                return Err(syn::Error::new_spanned(
                    path,
                    "column_name expects a value: #[column_name(\"name\")]",
                ))
            }
        };
        if name.is_empty() {
            return Err(syn::Error::new_spanned(attr, "column_name must not be empty"));
        }
        return Ok(Some(name));
    }
    Ok(None)
}

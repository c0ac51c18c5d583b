//! Derive macros for the todolist reducer architecture
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates kind helpers for action enums
//!
//! # Example
//!
//! ```ignore
//! use todolist_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     AddTodo(Todo),
//!     DeleteTodo { id: TodoId },
//! }
//!
//! // Generated items:
//! assert_eq!(TodoAction::KINDS, &["addTodo", "deleteTodo"]);
//! assert_eq!(TodoAction::DeleteTodo { id }.kind(), "deleteTodo");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derive macro for Action enums
///
/// Generates, on the enum itself:
/// - `KINDS` - every kind name, in declaration order
/// - `kind()` - the kind name of this value
///
/// A kind name defaults to the variant name with its first letter lowercased
/// (`AddTodo` becomes `addTodo`), which lines up with
/// `#[serde(rename_all = "camelCase")]` tags. Override it per variant with
/// `#[action(kind = "...")]`.
///
/// # Errors
///
/// This macro produces a compile error if:
/// - Applied to a non-enum type
/// - An `#[action(...)]` attribute contains anything but `kind = "..."`
/// - Two variants share a kind name
///
/// # Example
///
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum ListAction {
///     Clear,
///     #[action(kind = "push")]
///     PushItem(String),
/// }
///
/// assert_eq!(ListAction::Clear.kind(), "clear");
/// assert_eq!(ListAction::KINDS, &["clear", "push"]);
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(
            input,
            "#[derive(Action)] can only be used on enums"
        )
        .to_compile_error()
        .into();
    };

    let mut kinds = Vec::new();
    let mut kind_arms = Vec::new();

    for variant in &data_enum.variants {
        let variant_name = &variant.ident;

        let kind = match kind_override(&variant.attrs) {
            Ok(Some(kind)) => kind,
            Ok(None) => lower_camel(&variant_name.to_string()),
            Err(error) => return error.to_compile_error().into(),
        };

        if kinds.contains(&kind) {
            return syn::Error::new_spanned(
                variant,
                format!("Duplicate action kind \"{kind}\"")
            )
            .to_compile_error()
            .into();
        }

        let pattern = match &variant.fields {
            Fields::Named(_) => quote! { Self::#variant_name { .. } },
            Fields::Unnamed(_) => quote! { Self::#variant_name(..) },
            Fields::Unit => quote! { Self::#variant_name },
        };
        kind_arms.push(quote! { #pattern => #kind, });
        kinds.push(kind);
    }

    let expanded = quote! {
        impl #name {
            /// Every kind name this action type accepts
            pub const KINDS: &'static [&'static str] = &[#(#kinds),*];

            /// Returns the kind name of this action
            #[must_use]
            pub const fn kind(&self) -> &'static str {
                match self {
                    #(#kind_arms)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Read `#[action(kind = "...")]` from a variant, if present
fn kind_override(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut kind = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("action")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("kind") {
                let value: LitStr = meta.value()?.parse()?;
                kind = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `kind = \"...\"`"))
            }
        })?;
    }

    Ok(kind)
}

fn lower_camel(ident: &str) -> String {
    let mut chars = ident.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}

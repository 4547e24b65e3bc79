//! Derive macro for `dbug`.
//!
//! This crate generates the `Inspect` implementation behind
//! `#[derive(Inspect)]`. It:
//! - reads `#[dbug(...)]` container and field attributes
//! - emits a `shape` method describing the type as a record of fields
//!
//! It does **not** walk values or detect cycles. That happens at runtime in
//! the main `dbug` crate.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{parse_macro_input, parse_quote, spanned::Spanned, Data, DeriveInput, Result};

mod container;
mod derive_enum;
mod derive_struct;
mod generics;
mod strategy;
mod transform;
mod types;
use container::{parse_container_options, ContainerOptions};
use derive_enum::derive_enum;
use derive_struct::derive_struct;
use generics::{add_bounds, BoundSets};

/// Derives `dbug::Inspect` for structs and enums.
///
/// # Container Attributes
///
/// - `#[dbug(serde)]` - Install the custom JSON hook using the type's own
///   `serde::Serialize` implementation. The serialized JSON is embedded
///   verbatim in place of the structural rendering.
///
/// # Field Attributes
///
/// - **No annotation**: `pub` fields (and all enum variant fields) are
///   inspected recursively and need `Inspect`. Private and restricted fields
///   render as `"<name> [<type>]"` and need nothing.
///
/// - `#[dbug(show)]`: Inspect a private field anyway.
///
/// - `#[dbug(hide)]`: Render a public field as its placeholder.
///
/// - `#[dbug(debug)]`: Render the field's `Debug` output as a string. Use this
///   for foreign types that do not implement `Inspect`.
///
/// - `#[dbug(raw_json)]`: The field already holds JSON text (`AsRawJson`).
///   It is decoded and embedded. Fields whose type is spelled `RawJson` get
///   this automatically.
///
/// Output keys are the field names qualified by `core::any::type_name` of the
/// type. Unit enum variants render as the string `"Type::Variant"`.
///
/// Unions are rejected at compile time.
#[proc_macro_derive(Inspect, attributes(dbug))]
pub fn derive_inspect(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Returns the token stream to reference the dbug crate root.
///
/// Handles crate renaming (e.g., `debugger = { package = "dbug", ... }`).
/// Inside the dbug package itself (its unit tests and doctests) the crate
/// declares `extern crate self as dbug`, so `::dbug` resolves there too.
fn crate_root() -> TokenStream {
    match crate_name("dbug") {
        Ok(FoundCrate::Itself) => quote! { ::dbug },
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Err(_) => quote! { ::dbug },
    }
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    let ContainerOptions { serde } = parse_container_options(&attrs)?;

    let crate_root = crate_root();

    let output = match data {
        Data::Struct(data) => derive_struct(data, &generics, &crate_root)?,
        Data::Enum(data) => derive_enum(data, &generics, &crate_root)?,
        Data::Union(u) => {
            return Err(syn::Error::new(
                u.union_token.span(),
                "`Inspect` cannot be derived for unions",
            ));
        }
    };

    let mut bounded = add_bounds(generics.clone(), &output.bounds, &crate_root);
    let (_, ty_generics, _) = generics.split_for_impl();
    let custom_json = if serde {
        let self_ty: syn::Type = parse_quote!(#ident #ty_generics);
        bounded
            .make_where_clause()
            .predicates
            .push(parse_quote!(#self_ty: #crate_root::__private::serde::Serialize));
        quote! {
            fn custom_json(&self) -> ::core::option::Option<::std::string::String> {
                #crate_root::__private::serde_json::to_string(self).ok()
            }
        }
    } else {
        quote! {}
    };
    let (impl_generics, ty_generics, where_clause) = bounded.split_for_impl();
    let shape_body = &output.shape_body;

    Ok(quote! {
        impl #impl_generics #crate_root::Inspect for #ident #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn shape(&self) -> #crate_root::ValueShape<'_> {
                #shape_body
            }

            #custom_json
        }
    })
}

/// What struct and enum derivation hand back to `expand`.
pub(crate) struct DeriveOutput {
    pub(crate) shape_body: TokenStream,
    pub(crate) bounds: BoundSets,
}

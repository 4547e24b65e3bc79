//! Generic type parameter handling and trait bound management.
//!
//! This module adds bounds only for generics that a field's rendering actually
//! needs: `Inspect` for inspected fields, `Debug` for `#[dbug(debug)]` fields
//! and `AsRawJson` for raw JSON fields. Placeholder fields add nothing.
//!
//! ## PhantomData Handling
//!
//! `PhantomData<T>` is skipped when collecting generics:
//!
//! ```ignore
//! #[derive(Inspect)]
//! pub struct TypedId<T> {
//!     pub id: u64,
//!     pub marker: PhantomData<T>,  // T should NOT require Inspect
//! }
//! ```

use proc_macro2::{Ident, TokenStream};
use syn::parse_quote;

/// Generic parameters grouped by the bound they need.
#[derive(Default)]
pub(crate) struct BoundSets {
    pub(crate) inspect: Vec<Ident>,
    pub(crate) debug: Vec<Ident>,
    pub(crate) raw_json: Vec<Ident>,
}

pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    match ty {
        syn::Type::Path(path) => {
            if let Some(qself) = &path.qself {
                collect_generics_from_type(&qself.ty, generics, result);
            }
            // A bare `T`, or the `T` of `T::Assoc`.
            if let Some(first) = path.path.segments.first() {
                push_if_param(&first.ident, generics, result);
            }
            for segment in &path.path.segments {
                // Skip PhantomData - it's a zero-sized marker that doesn't need bounds.
                if segment.ident == "PhantomData" {
                    return;
                }
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    for arg in &args.args {
                        if let syn::GenericArgument::Type(inner_ty) = arg {
                            collect_generics_from_type(inner_ty, generics, result);
                        }
                    }
                }
            }
        }
        syn::Type::Reference(reference) => {
            collect_generics_from_type(&reference.elem, generics, result);
        }
        syn::Type::Ptr(ptr) => collect_generics_from_type(&ptr.elem, generics, result),
        syn::Type::Slice(slice) => collect_generics_from_type(&slice.elem, generics, result),
        syn::Type::Array(array) => collect_generics_from_type(&array.elem, generics, result),
        syn::Type::Paren(paren) => collect_generics_from_type(&paren.elem, generics, result),
        syn::Type::Group(group) => collect_generics_from_type(&group.elem, generics, result),
        syn::Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                collect_generics_from_type(elem, generics, result);
            }
        }
        _ => {}
    }
}

fn push_if_param(ident: &Ident, generics: &syn::Generics, result: &mut Vec<Ident>) {
    for param in generics.type_params() {
        if *ident == param.ident && !result.iter().any(|g| g == &param.ident) {
            result.push(param.ident.clone());
        }
    }
}

/// Adds the bounds collected in `sets` to the matching generic parameters.
pub(crate) fn add_bounds(
    mut generics: syn::Generics,
    sets: &BoundSets,
    crate_root: &TokenStream,
) -> syn::Generics {
    for param in generics.type_params_mut() {
        if sets.inspect.iter().any(|g| g == &param.ident) {
            param.bounds.push(parse_quote!(#crate_root::Inspect));
        }
        if sets.debug.iter().any(|g| g == &param.ident) {
            param.bounds.push(parse_quote!(::core::fmt::Debug));
        }
        if sets.raw_json.iter().any(|g| g == &param.ident) {
            param.bounds.push(parse_quote!(#crate_root::AsRawJson));
        }
    }
    generics
}

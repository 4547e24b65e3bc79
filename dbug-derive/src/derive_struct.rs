//! Struct-specific `Inspect` derivation.
//!
//! Named, tuple and unit structs all become a `Record`. Tuple fields are keyed
//! by their index.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::{ext::IdentExt, spanned::Spanned, DataStruct, Fields, LitStr, Result};

use crate::{
    generics::BoundSets,
    strategy::parse_field_strategy,
    transform::{generate_field, DeriveContext, FieldInput},
    DeriveOutput,
};

pub(crate) fn derive_struct(
    data: DataStruct,
    generics: &syn::Generics,
    crate_root: &TokenStream,
) -> Result<DeriveOutput> {
    let mut bounds = BoundSets::default();
    let mut ctx = DeriveContext {
        generics,
        crate_root,
        bounds: &mut bounds,
    };

    let mut bindings: Vec<Ident> = Vec::new();
    let mut entries = Vec::new();
    for (index, field) in data.fields.iter().enumerate() {
        let span = field.span();
        let strategy = parse_field_strategy(&field.attrs)?;
        let (binding, name) = match &field.ident {
            Some(ident) => (ident.clone(), LitStr::new(&ident.unraw().to_string(), span)),
            None => (
                format_ident!("field_{index}"),
                LitStr::new(&index.to_string(), span),
            ),
        };
        let input = FieldInput {
            name: &name,
            binding: &binding,
            ty: &field.ty,
            visible_by_default: matches!(field.vis, syn::Visibility::Public(_)),
            span,
        };
        entries.push(generate_field(&mut ctx, &input, strategy));
        bindings.push(binding);
    }

    let destructure = match data.fields {
        Fields::Named(_) => quote! { let Self { #(#bindings),* } = self; },
        Fields::Unnamed(_) => quote! { let Self ( #(#bindings),* ) = self; },
        Fields::Unit => quote! {},
    };

    Ok(DeriveOutput {
        shape_body: quote! {
            #destructure
            #crate_root::ValueShape::Record(#crate_root::Record::new(
                ::core::any::type_name::<Self>(),
                ::std::vec![#(#entries),*],
            ))
        },
        bounds,
    })
}

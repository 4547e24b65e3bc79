//! Enum-specific `Inspect` derivation.
//!
//! Each variant gets a match arm. Unit variants render as the string
//! `"Type::Variant"`; variants with fields become a `Record` named the same
//! way. Variant fields are as visible as the enum itself, so unannotated
//! fields are inspected.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::{ext::IdentExt, spanned::Spanned, DataEnum, Fields, LitStr, Result};

use crate::{
    generics::BoundSets,
    strategy::parse_field_strategy,
    transform::{generate_field, DeriveContext, FieldInput},
    DeriveOutput,
};

pub(crate) fn derive_enum(
    data: DataEnum,
    generics: &syn::Generics,
    crate_root: &TokenStream,
) -> Result<DeriveOutput> {
    let mut bounds = BoundSets::default();
    let mut ctx = DeriveContext {
        generics,
        crate_root,
        bounds: &mut bounds,
    };

    if data.variants.is_empty() {
        return Ok(DeriveOutput {
            shape_body: quote! { match *self {} },
            bounds,
        });
    }

    let mut arms = Vec::new();
    for variant in &data.variants {
        let variant_ident = &variant.ident;
        let variant_name = LitStr::new(&variant_ident.unraw().to_string(), variant_ident.span());
        let record_name = quote! {
            ::std::format!("{}::{}", ::core::any::type_name::<Self>(), #variant_name)
        };

        let arm = match &variant.fields {
            Fields::Unit => quote! {
                Self::#variant_ident => #crate_root::ValueShape::Primitive(
                    #crate_root::Primitive::Str(::std::borrow::Cow::Owned(#record_name)),
                )
            },
            Fields::Named(_) | Fields::Unnamed(_) => {
                let (pattern, entries) = derive_variant_fields(&mut ctx, &variant.fields)?;
                quote! {
                    Self::#variant_ident #pattern => #crate_root::ValueShape::Record(
                        #crate_root::Record::new(#record_name, ::std::vec![#(#entries),*]),
                    )
                }
            }
        };
        arms.push(arm);
    }

    Ok(DeriveOutput {
        shape_body: quote! {
            match self {
                #(#arms),*
            }
        },
        bounds,
    })
}

/// Returns the binding pattern for a variant and its field expressions.
fn derive_variant_fields(
    ctx: &mut DeriveContext<'_>,
    fields: &Fields,
) -> Result<(TokenStream, Vec<TokenStream>)> {
    let mut bindings: Vec<Ident> = Vec::new();
    let mut entries = Vec::new();

    for (index, field) in fields.iter().enumerate() {
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
            visible_by_default: true,
            span,
        };
        entries.push(generate_field(ctx, &input, strategy));
        bindings.push(binding);
    }

    let pattern = match fields {
        Fields::Named(_) => quote! { { #(#bindings),* } },
        _ => quote! { ( #(#bindings),* ) },
    };
    Ok((pattern, entries))
}

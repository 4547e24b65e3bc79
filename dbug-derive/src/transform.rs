//! Shared field rendering logic for struct and enum derivation.

use proc_macro2::{Ident, Span, TokenStream};
use quote::quote_spanned;
use syn::LitStr;

use crate::{
    generics::{collect_generics_from_type, BoundSets},
    strategy::Strategy,
    types::{is_raw_json_type, type_display},
};

/// Accumulated state during field processing.
pub(crate) struct DeriveContext<'a> {
    pub(crate) generics: &'a syn::Generics,
    pub(crate) crate_root: &'a TokenStream,
    pub(crate) bounds: &'a mut BoundSets,
}

/// One field as seen by the derive.
pub(crate) struct FieldInput<'a> {
    /// Key suffix: the field name, or its index for tuple fields.
    pub(crate) name: &'a LitStr,
    /// Local binding holding a reference to the field.
    pub(crate) binding: &'a Ident,
    pub(crate) ty: &'a syn::Type,
    /// Whether an unannotated field is inspected.
    pub(crate) visible_by_default: bool,
    pub(crate) span: Span,
}

/// How a field ends up being rendered once defaults are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Rendering {
    Visible,
    Hidden,
    Debug,
    RawJson,
}

pub(crate) fn resolve(strategy: Strategy, ty: &syn::Type, visible_by_default: bool) -> Rendering {
    match strategy {
        Strategy::Show => Rendering::Visible,
        Strategy::Hide => Rendering::Hidden,
        Strategy::Debug => Rendering::Debug,
        Strategy::RawJson => Rendering::RawJson,
        Strategy::Auto if is_raw_json_type(ty) => Rendering::RawJson,
        Strategy::Auto if visible_by_default => Rendering::Visible,
        Strategy::Auto => Rendering::Hidden,
    }
}

/// Generates the `Field` expression for a single field.
///
/// ## Field Rendering Rules
///
/// | Rendering | Expression | Bound on used generics |
/// |-----------|------------|------------------------|
/// | `Visible` | `Field::visible` | `Inspect` |
/// | `Hidden` | `Field::hidden` with the declared type | none |
/// | `Debug` | `Field::described` with `{:?}` output | `Debug` |
/// | `RawJson` | `Field::raw_json` over `AsRawJson` bytes | `AsRawJson` |
pub(crate) fn generate_field(
    ctx: &mut DeriveContext<'_>,
    field: &FieldInput<'_>,
    strategy: Strategy,
) -> TokenStream {
    let root = ctx.crate_root;
    let FieldInput {
        name,
        binding,
        ty,
        span,
        ..
    } = *field;

    match resolve(strategy, ty, field.visible_by_default) {
        Rendering::Visible => {
            collect_generics_from_type(ty, ctx.generics, &mut ctx.bounds.inspect);
            quote_spanned! { span =>
                #root::Field::visible(#name, #binding)
            }
        }
        Rendering::Hidden => {
            let type_name = LitStr::new(&type_display(ty), span);
            quote_spanned! { span =>
                #root::Field::hidden(#name, #type_name)
            }
        }
        Rendering::Debug => {
            collect_generics_from_type(ty, ctx.generics, &mut ctx.bounds.debug);
            quote_spanned! { span =>
                #root::Field::described(#name, ::std::format!("{:?}", #binding))
            }
        }
        Rendering::RawJson => {
            collect_generics_from_type(ty, ctx.generics, &mut ctx.bounds.raw_json);
            quote_spanned! { span =>
                #root::Field::raw_json(#name, #root::AsRawJson::raw_json_bytes(#binding))
            }
        }
    }
}

//! Parsing of `#[dbug(...)]` field attributes.
//!
//! This module maps attribute syntax to rendering decisions and produces
//! structured errors for invalid forms.

use proc_macro2::Span;
use syn::{spanned::Spanned, Attribute, Meta, Result};

/// Field rendering strategy based on `#[dbug(...)]` attributes.
///
/// ## Strategy Mapping
///
/// | Attribute | Strategy | Behavior |
/// |-----------|----------|----------|
/// | None | `Auto` | Visible if public, placeholder otherwise |
/// | `#[dbug(show)]` | `Show` | Always inspected |
/// | `#[dbug(hide)]` | `Hide` | Always a placeholder |
/// | `#[dbug(debug)]` | `Debug` | `Debug` output as a string |
/// | `#[dbug(raw_json)]` | `RawJson` | Pre-encoded JSON, decoded and embedded |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// No annotation: decided by visibility and declared type.
    Auto,
    Show,
    Hide,
    Debug,
    RawJson,
}

fn set_strategy(target: &mut Option<Strategy>, next: Strategy, span: Span) -> Result<()> {
    if target.is_some() {
        return Err(syn::Error::new(
            span,
            "multiple #[dbug] options specified on the same field",
        ));
    }
    *target = Some(next);
    Ok(())
}

pub(crate) fn parse_field_strategy(attrs: &[Attribute]) -> Result<Strategy> {
    let mut strategy: Option<Strategy> = None;
    for attr in attrs {
        if !attr.path().is_ident("dbug") {
            continue;
        }

        match &attr.meta {
            Meta::Path(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "expected a field option: show, hide, debug or raw_json",
                ));
            }
            Meta::List(list) => {
                list.parse_nested_meta(|meta| {
                    let next = if meta.path.is_ident("show") {
                        Strategy::Show
                    } else if meta.path.is_ident("hide") {
                        Strategy::Hide
                    } else if meta.path.is_ident("debug") {
                        Strategy::Debug
                    } else if meta.path.is_ident("raw_json") {
                        Strategy::RawJson
                    } else {
                        return Err(meta.error(format!(
                            "unknown field option `{}`; expected show, hide, debug or raw_json",
                            meta.path
                                .get_ident()
                                .map_or_else(|| "?".to_string(), ToString::to_string)
                        )));
                    };
                    set_strategy(&mut strategy, next, meta.path.span())
                })?;
            }
            Meta::NameValue(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "name-value syntax is not supported for #[dbug]",
                ));
            }
        }
    }

    Ok(strategy.unwrap_or(Strategy::Auto))
}

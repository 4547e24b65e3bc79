//! Type utilities for the derive macro.

use quote::ToTokens;

/// Checks if a field type is spelled as a `RawJson` carrier.
///
/// Only the last path segment is compared, so `RawJson`, `dbug::RawJson` and
/// `::dbug::RawJson` all match. Aliases and wrappers such as
/// `Option<RawJson>` do not; they need `#[dbug(raw_json)]`.
pub(crate) fn is_raw_json_type(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "RawJson" && segment.arguments.is_empty()),
        syn::Type::Group(group) => is_raw_json_type(&group.elem),
        syn::Type::Paren(paren) => is_raw_json_type(&paren.elem),
        _ => false,
    }
}

/// Renders a declared type the way a reader would write it.
///
/// `quote` separates every token with a space (`Vec < String >`); this
/// removes the spaces around punctuation that does not take them.
pub(crate) fn type_display(ty: &syn::Type) -> String {
    let spaced = ty.to_token_stream().to_string();
    let chars: Vec<char> = spaced.chars().collect();
    let mut out = String::with_capacity(spaced.len());
    for (idx, &ch) in chars.iter().enumerate() {
        if ch == ' ' {
            let prev = out.chars().last();
            let next = chars.get(idx + 1).copied();
            let glue_after = matches!(prev, Some('<' | '&' | '(' | '[' | ':' | '*'));
            let glue_before = matches!(next, Some('<' | '>' | ',' | ';' | ')' | ']' | ':'))
                || (next == Some('(') && prev.is_some_and(|p| p.is_alphanumeric() || p == '_'));
            if glue_after || glue_before {
                continue;
            }
        }
        out.push(ch);
    }
    out
}

//! Readable type names for descriptors.
//!
//! `core::any::type_name` returns fully qualified paths
//! (`alloc::vec::Vec<alloc::string::String>`), which are noisy in an inspector.
//! These helpers drop module paths and split tuple types into their parts.

use std::any;

/// Short name of `T`: module paths removed, generic structure kept.
pub(crate) fn short<T: ?Sized>() -> String {
    shorten(any::type_name::<T>())
}

/// Removes module paths from every path segment in `full`.
///
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`.
pub(crate) fn shorten(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut rest = full;
    while let Some(pos) = rest.find("::") {
        let (head, tail) = rest.split_at(pos);
        out.push_str(head);
        // Drop the path segment that precedes `::`.
        let keep = out
            .rfind(|c: char| !(c.is_alphanumeric() || c == '_'))
            .map_or(0, |idx| idx + 1);
        out.truncate(keep);
        rest = &tail[2..];
    }
    out.push_str(rest);
    out
}

/// Splits a (shortened) tuple type name into its component names.
///
/// `()` yields nothing, a non-tuple type yields itself.
pub(crate) fn tuple_components(name: &str) -> Vec<String> {
    let Some(inner) = name.strip_prefix('(').and_then(|s| s.strip_suffix(')')) else {
        return vec![name.to_string()];
    };
    if !is_single_group(name) {
        return vec![name.to_string()];
    }

    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in inner.char_indices() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(inner[start..idx].trim().to_string());
                start = idx + 1;
            }
            _ => {}
        }
    }
    let last = inner[start..].trim();
    if !last.is_empty() {
        parts.push(last.to_string());
    }
    parts
}

/// Whether the outer parentheses of `name` enclose the whole string.
///
/// Guards against names such as `(A) -> (B)` being read as a tuple.
fn is_single_group(name: &str) -> bool {
    let mut depth = 0usize;
    for (idx, ch) in name.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && idx + 1 != name.len() {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

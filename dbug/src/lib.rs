//! Send any Rust value to a local debug viewer as JSON.
//!
//! `dbug` turns arbitrary values, including cyclic `Rc`/`RefCell` graphs,
//! function pointers, channel handles and raw pointers, into JSON-safe trees
//! and POSTs them to a listener on the local machine.
//!
//! The crate is made of:
//! - **[`Inspect`]**: how a value describes its own shape. Derive it with
//!   `#[derive(Inspect)]`; the standard library's types are covered.
//! - **[`sanitize`]**: the walker that builds a [`serde_json::Value`] tree,
//!   marking reference cycles as `"[circular]"`.
//! - **Dispatch**: [`send`], [`send_all`] and the [`dbug!`] macro, which
//!   deliver pretty-printed JSON on a best-effort basis.
//!
//! Key rules:
//! - Struct fields are keyed as `Type.field`.
//! - Private fields are shown as `"<name> [<type>]"` unless marked
//!   `#[dbug(show)]`.
//! - A value whose custom JSON hook yields valid JSON is embedded verbatim.
//! - NaN and infinite floats fail the payload; the dispatcher then sends a
//!   failure document instead.
//!
//! What it does not do:
//! - deserialize anything back into typed values
//! - guarantee delivery or ordering
//! - let any failure reach the calling program through [`send`]
//!
//! ```no_run
//! use dbug::Inspect;
//!
//! #[derive(Inspect)]
//! struct Job {
//!     pub id: u32,
//!     pub tags: Vec<String>,
//! }
//!
//! let job = Job { id: 7, tags: vec!["nightly".into()] };
//! dbug::dbug!(job, "checkpoint");
//! ```

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

pub use dbug_derive::Inspect;

#[allow(unused_extern_crates)]
extern crate self as dbug;

// Module declarations
mod dispatch;
mod error;
mod inspect;
mod raw_json;
mod sanitize;
#[cfg(feature = "slog")]
pub mod slog;
mod type_name;

// Re-exports
pub use dispatch::{
    endpoint, render, send, send_all, set_endpoint, DispatchConfig, Dispatcher,
    DEFAULT_ENDPOINT, DEFAULT_PAUSE_MS, DEFAULT_TIMEOUT_MS,
};
pub use error::SanitizeError;
pub use inspect::{
    ChannelInfo, Direction, Field, FieldKind, Identity, Inspect, Pointee, Primitive, RawHandle,
    Record, Reference, Signature, ValueShape,
};
pub use raw_json::{AsRawJson, RawJson};
pub use sanitize::{sanitize, Sanitizer, CIRCULAR, DEFAULT_MAX_DEPTH};

/// Sends one or more values to the process-wide endpoint.
///
/// With several arguments each value goes out on its own request, in order.
///
/// ```no_run
/// let ready = true;
/// dbug::dbug!(ready);
/// dbug::dbug!("state", vec![1, 2, 3], ready);
/// ```
#[macro_export]
macro_rules! dbug {
    ($value:expr $(,)?) => {
        $crate::send(&$value)
    };
    ($($value:expr),+ $(,)?) => {
        $crate::send_all(&[$(&$value as &dyn $crate::Inspect),+])
    };
}

#[doc(hidden)]
pub mod __private {
    pub use serde;
    pub use serde_json;
}

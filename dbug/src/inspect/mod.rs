//! Introspection facade: how a value describes its own shape.
//!
//! This module defines the pieces the sanitizer dispatches on:
//!
//! - **[`Inspect`]**: the trait every inspectable type implements
//! - **[`ValueShape`]**: the closed set of shapes a value can take
//! - **Building blocks**: [`Primitive`], [`Reference`], [`Record`] and friends
//!
//! Implementations for standard library types live in `std_impls`; function
//! pointers, channels and raw pointers live in `handles`.
//!
//! ## Shapes
//!
//! | Shape | Produced by | Sanitized as |
//! |-------|-------------|--------------|
//! | `Null` | `()`, `None`, dropped `Weak` | `null` |
//! | `Primitive` | numbers, `bool`, strings | JSON primitive |
//! | `Reference` | `&T`, `Rc`, `Arc`, cells, locks | the pointee, or `"[circular]"` |
//! | `Mapping` | maps, `Result` | object |
//! | `Sequence` | `Vec`, slices, sets, tuples | array |
//! | `Record` | `#[derive(Inspect)]` types | object with type-qualified keys |
//! | `Callable` | function pointers | signature descriptor |
//! | `Channel` | message channel handles | channel descriptor |
//! | `RawHandle` | raw pointers | address string |

use std::{any, borrow::Cow, fmt};

mod handles;
mod std_impls;

pub use handles::{ChannelInfo, Direction, RawHandle, Signature};

/// A value that can describe its own shape to the sanitizer.
///
/// Derive it with `#[derive(Inspect)]` for your own structs and enums. The
/// crate implements it for primitives, strings, smart pointers, cells, locks,
/// collections, function pointers, channels and raw pointers.
///
/// ## Foreign types
///
/// Rust's orphan rules prevent implementing `Inspect` for a type from another
/// crate. Inside a derived struct, mark such fields `#[dbug(debug)]` to render
/// their `Debug` output, or wrap them in a local newtype.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Inspect`",
    label = "this value cannot be inspected by dbug",
    note = "use `#[derive(Inspect)]` on the type definition",
    note = "or mark the field `#[dbug(debug)]` to render it through `Debug`"
)]
pub trait Inspect {
    /// Describes the value's shape, borrowing from `self`.
    fn shape(&self) -> ValueShape<'_>;

    /// Custom serialization hook.
    ///
    /// When this returns JSON text that parses, the parsed value is used
    /// verbatim and [`Inspect::shape`] is never consulted. Text that fails to
    /// parse is ignored and the value is sanitized structurally.
    fn custom_json(&self) -> Option<String> {
        None
    }

    /// Shape of an unset `Option<Self>`.
    ///
    /// Defaults to `Null`. Channel handles override it to report an unset
    /// handle together with its element type.
    fn absent() -> ValueShape<'static>
    where
        Self: Sized,
    {
        ValueShape::Null
    }
}

/// The closed set of shapes the sanitizer knows how to render.
pub enum ValueShape<'a> {
    /// Null, unit, or an unset optional value.
    Null,
    /// A JSON-representable scalar.
    Primitive(Primitive<'a>),
    /// A handle that may alias another value.
    Reference(Reference<'a>),
    /// Keyed entries; keys are already coerced to display strings.
    Mapping(Vec<(String, &'a dyn Inspect)>),
    /// Ordered elements.
    Sequence(Vec<&'a dyn Inspect>),
    /// A struct-like value with named fields.
    Record(Record<'a>),
    /// A function pointer.
    Callable(Signature),
    /// A message channel handle.
    Channel(ChannelInfo),
    /// A raw memory handle.
    RawHandle(RawHandle),
}

/// Scalar values.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive<'a> {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(Cow<'a, str>),
}

impl<'a> Primitive<'a> {
    /// Builds a string primitive from anything implementing `Display`.
    pub fn display(value: &impl fmt::Display) -> Self {
        Primitive::Str(Cow::Owned(value.to_string()))
    }
}

/// Identity of a referenced value: its address paired with its type name.
///
/// Addresses are stable while the graph is borrowed for a sanitize call. The
/// type name keeps a struct and its first field, which share an address,
/// from being mistaken for each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Identity {
    address: usize,
    type_name: &'static str,
}

impl Identity {
    /// Identity of the value behind `ptr`.
    pub fn of<T: ?Sized>(ptr: *const T) -> Self {
        Self {
            address: ptr.cast::<()>() as usize,
            type_name: any::type_name::<T>(),
        }
    }

    pub fn address(&self) -> usize {
        self.address
    }
}

/// What a [`Reference`] points at.
pub enum Pointee<'a> {
    /// A plain borrow.
    Borrowed(&'a dyn Inspect),
    /// An owned stand-in such as a lock guard or an upgraded weak pointer.
    Owned(Box<dyn Inspect + 'a>),
    /// The target cannot be reached without blocking or panicking.
    ///
    /// The string is emitted as the terminal value.
    Unavailable(&'static str),
}

impl Pointee<'_> {
    pub fn as_inspect(&self) -> Option<&dyn Inspect> {
        match self {
            Pointee::Borrowed(value) => Some(*value),
            Pointee::Owned(value) => Some(value.as_ref()),
            Pointee::Unavailable(_) => None,
        }
    }
}

/// A handle that may alias another value.
///
/// References carrying an [`Identity`] take part in cycle detection; owned
/// stand-ins without a stable address leave it unset.
pub struct Reference<'a> {
    pub identity: Option<Identity>,
    pub target: Pointee<'a>,
}

impl<'a> Reference<'a> {
    pub fn to(identity: Identity, target: &'a dyn Inspect) -> Self {
        Self {
            identity: Some(identity),
            target: Pointee::Borrowed(target),
        }
    }

    pub fn guarded(identity: Option<Identity>, target: Box<dyn Inspect + 'a>) -> Self {
        Self {
            identity,
            target: Pointee::Owned(target),
        }
    }

    pub fn unavailable(identity: Option<Identity>, reason: &'static str) -> Self {
        Self {
            identity,
            target: Pointee::Unavailable(reason),
        }
    }
}

/// A struct-like value.
pub struct Record<'a> {
    type_name: Cow<'static, str>,
    fields: Vec<Field<'a>>,
}

impl<'a> Record<'a> {
    pub fn new(type_name: impl Into<Cow<'static, str>>, fields: Vec<Field<'a>>) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[Field<'a>] {
        &self.fields
    }

    /// Output key for a field: the field name qualified by the owning type.
    pub fn key_for(&self, field: &Field<'_>) -> String {
        format!("{}.{}", self.type_name, field.name)
    }

    pub(crate) fn into_parts(self) -> (Cow<'static, str>, Vec<Field<'a>>) {
        (self.type_name, self.fields)
    }
}

/// One declared field of a [`Record`].
pub struct Field<'a> {
    name: &'static str,
    kind: FieldKind<'a>,
}

/// How a field's value is rendered.
pub enum FieldKind<'a> {
    /// Recursively sanitized.
    Visible(&'a dyn Inspect),
    /// Not inspected; rendered as `"<name> [<type>]"`.
    Hidden { type_name: &'static str },
    /// Bytes that are already JSON-encoded.
    RawJson(&'a [u8]),
    /// A pre-rendered description, e.g. `Debug` output.
    Described(String),
}

impl<'a> Field<'a> {
    pub fn visible(name: &'static str, value: &'a dyn Inspect) -> Self {
        Self {
            name,
            kind: FieldKind::Visible(value),
        }
    }

    pub fn hidden(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Hidden { type_name },
        }
    }

    pub fn raw_json(name: &'static str, bytes: &'a [u8]) -> Self {
        Self {
            name,
            kind: FieldKind::RawJson(bytes),
        }
    }

    pub fn described(name: &'static str, description: String) -> Self {
        Self {
            name,
            kind: FieldKind::Described(description),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &FieldKind<'a> {
        &self.kind
    }

    pub(crate) fn into_kind(self) -> FieldKind<'a> {
        self.kind
    }
}

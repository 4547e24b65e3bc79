//! Non-data values: function pointers, channel handles and raw pointers.
//!
//! None of these are ever called, received from, or dereferenced. Each is
//! described by metadata that is available without touching the target.

use std::{fmt, ptr::NonNull, sync::mpsc};

use serde_json::{json, Map, Value};
use tokio::sync::mpsc as tokio_mpsc;

use super::{Inspect, ValueShape};
use crate::type_name;

// =============================================================================
// Callables
// =============================================================================

/// Signature of a function pointer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    inputs: Vec<String>,
    outputs: Vec<String>,
    variadic: bool,
    is_unsafe: bool,
    abi: Option<&'static str>,
}

impl Signature {
    pub fn new(inputs: Vec<String>, outputs: Vec<String>) -> Self {
        Self {
            inputs,
            outputs,
            variadic: false,
            is_unsafe: false,
            abi: None,
        }
    }

    /// Marks the signature as accepting a C-variadic trailing argument list.
    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    #[must_use]
    pub fn unsafe_fn(mut self) -> Self {
        self.is_unsafe = true;
        self
    }

    #[must_use]
    pub fn with_abi(mut self, abi: &'static str) -> Self {
        self.abi = Some(abi);
        self
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub(crate) fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert(
            self.to_string(),
            json!({
                "input_types": self.inputs,
                "output_types": self.outputs,
                "is_variadic": self.variadic,
            }),
        );
        Value::Object(out)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unsafe {
            f.write_str("unsafe ")?;
        }
        if let Some(abi) = self.abi {
            write!(f, "extern \"{abi}\" ")?;
        }
        write!(f, "fn({}", self.inputs.join(", "))?;
        if self.variadic {
            f.write_str(if self.inputs.is_empty() { "..." } else { ", ..." })?;
        }
        f.write_str(")")?;
        match self.outputs.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " -> {single}"),
            many => write!(f, " -> ({})", many.join(", ")),
        }
    }
}

fn outputs_of<R>() -> Vec<String> {
    type_name::tuple_components(&type_name::short::<R>())
}

macro_rules! impl_inspect_fn {
    ($($arg:ident),*) => {
        impl<R, $($arg),*> Inspect for fn($($arg),*) -> R {
            fn shape(&self) -> ValueShape<'_> {
                ValueShape::Callable(Signature::new(
                    vec![$(type_name::short::<$arg>()),*],
                    outputs_of::<R>(),
                ))
            }
        }

        impl<R, $($arg),*> Inspect for unsafe fn($($arg),*) -> R {
            fn shape(&self) -> ValueShape<'_> {
                ValueShape::Callable(
                    Signature::new(vec![$(type_name::short::<$arg>()),*], outputs_of::<R>())
                        .unsafe_fn(),
                )
            }
        }

        impl<R, $($arg),*> Inspect for extern "C" fn($($arg),*) -> R {
            fn shape(&self) -> ValueShape<'_> {
                ValueShape::Callable(
                    Signature::new(vec![$(type_name::short::<$arg>()),*], outputs_of::<R>())
                        .with_abi("C"),
                )
            }
        }
    };
}

impl_inspect_fn!();
impl_inspect_fn!(A);
impl_inspect_fn!(A, B);
impl_inspect_fn!(A, B, C);
impl_inspect_fn!(A, B, C, D);
impl_inspect_fn!(A, B, C, D, E);
impl_inspect_fn!(A, B, C, D, E, F);

macro_rules! impl_inspect_variadic_fn {
    ($($arg:ident),+) => {
        impl<R, $($arg),+> Inspect for unsafe extern "C" fn($($arg),+ , ...) -> R {
            fn shape(&self) -> ValueShape<'_> {
                ValueShape::Callable(
                    Signature::new(vec![$(type_name::short::<$arg>()),+], outputs_of::<R>())
                        .variadic()
                        .unsafe_fn()
                        .with_abi("C"),
                )
            }
        }
    };
}

impl_inspect_variadic_fn!(A);
impl_inspect_variadic_fn!(A, B);
impl_inspect_variadic_fn!(A, B, C);

// =============================================================================
// Channels
// =============================================================================

/// Which operations a channel handle permits.
///
/// The std and tokio mpsc handles are split into a sending and a receiving
/// half, so they only ever report `SendOnly` or `ReceiveOnly`. `SendReceive`
/// is for hand-written [`Inspect`] impls of duplex handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    SendOnly,
    ReceiveOnly,
    SendReceive,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::SendOnly => "send-only",
            Direction::ReceiveOnly => "receive-only",
            Direction::SendReceive => "send-receive",
        }
    }
}

/// Metadata describing a channel handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelInfo {
    pub type_name: String,
    pub element_type: String,
    pub direction: Direction,
    pub is_nil: bool,
    /// Buffer size; `None` when the channel is unbounded or does not expose it.
    pub capacity: Option<usize>,
    /// Elements currently queued (or reserved); `None` when the backlog is
    /// not observable.
    pub length: Option<usize>,
}

impl ChannelInfo {
    pub fn new<H: ?Sized, T>(direction: Direction) -> Self {
        Self {
            type_name: type_name::short::<H>(),
            element_type: type_name::short::<T>(),
            direction,
            is_nil: false,
            capacity: None,
            length: None,
        }
    }

    /// Descriptor for an unset handle: capacity and length are zero.
    pub fn nil<H: ?Sized, T>(direction: Direction) -> Self {
        Self {
            is_nil: true,
            capacity: Some(0),
            length: Some(0),
            ..Self::new::<H, T>(direction)
        }
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: Option<usize>) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub(crate) fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert(
            self.type_name.clone(),
            json!({
                "element_type": self.element_type,
                "direction": self.direction.as_str(),
                "is_nil": self.is_nil,
                "capacity": self.capacity,
                "length": self.length,
            }),
        );
        Value::Object(out)
    }
}

macro_rules! impl_inspect_channel {
    ($ty:ident, $direction:expr, |$handle:ident| $describe:expr) => {
        impl<T> Inspect for $ty<T> {
            fn shape(&self) -> ValueShape<'_> {
                let $handle = self;
                ValueShape::Channel($describe)
            }

            fn absent() -> ValueShape<'static> {
                ValueShape::Channel(ChannelInfo::nil::<Self, T>($direction))
            }
        }
    };
}

// std channels expose neither their bound nor their backlog, and neither does
// tokio's unbounded sender.
mod std_channels {
    use super::{mpsc, ChannelInfo, Direction, Inspect, ValueShape};
    use mpsc::{Receiver, Sender, SyncSender};

    impl_inspect_channel!(Sender, Direction::SendOnly, |_handle| {
        ChannelInfo::new::<Sender<T>, T>(Direction::SendOnly)
    });
    impl_inspect_channel!(SyncSender, Direction::SendOnly, |_handle| {
        ChannelInfo::new::<SyncSender<T>, T>(Direction::SendOnly)
    });
    impl_inspect_channel!(Receiver, Direction::ReceiveOnly, |_handle| {
        ChannelInfo::new::<Receiver<T>, T>(Direction::ReceiveOnly)
    });
}

mod tokio_channels {
    use super::{tokio_mpsc, ChannelInfo, Direction, Inspect, ValueShape};
    use tokio_mpsc::{Receiver, Sender, UnboundedReceiver, UnboundedSender};

    impl_inspect_channel!(Sender, Direction::SendOnly, |handle| {
        let max = handle.max_capacity();
        ChannelInfo::new::<Sender<T>, T>(Direction::SendOnly)
            .with_capacity(Some(max))
            .with_length(max.saturating_sub(handle.capacity()))
    });
    impl_inspect_channel!(Receiver, Direction::ReceiveOnly, |handle| {
        ChannelInfo::new::<Receiver<T>, T>(Direction::ReceiveOnly)
            .with_capacity(Some(handle.max_capacity()))
            .with_length(handle.len())
    });
    impl_inspect_channel!(UnboundedSender, Direction::SendOnly, |_handle| {
        ChannelInfo::new::<UnboundedSender<T>, T>(Direction::SendOnly)
    });
    impl_inspect_channel!(UnboundedReceiver, Direction::ReceiveOnly, |handle| {
        ChannelInfo::new::<UnboundedReceiver<T>, T>(Direction::ReceiveOnly)
            .with_length(handle.len())
    });
}

// =============================================================================
// Raw pointers
// =============================================================================

/// A raw memory handle: never dereferenced, only its address is reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawHandle {
    pub type_name: String,
    pub address: Option<usize>,
}

impl RawHandle {
    pub fn of<P: ?Sized, T: ?Sized>(ptr: *const T) -> Self {
        let address = ptr.cast::<()>() as usize;
        Self {
            type_name: type_name::short::<P>(),
            address: (address != 0).then_some(address),
        }
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address {
            Some(address) => write!(f, "{} ({address:#x})", self.type_name),
            None => write!(f, "{} (nil)", self.type_name),
        }
    }
}

impl<T: ?Sized> Inspect for *const T {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::RawHandle(RawHandle::of::<Self, T>(*self))
    }
}

impl<T: ?Sized> Inspect for *mut T {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::RawHandle(RawHandle::of::<Self, T>(self.cast_const()))
    }
}

impl<T: ?Sized> Inspect for NonNull<T> {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::RawHandle(RawHandle::of::<Self, T>(self.as_ptr().cast_const()))
    }
}

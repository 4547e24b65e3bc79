//! `Inspect` implementations for standard library types.
//!
//! ## Containers
//!
//! Sequences and maps hand out borrowed element references; the sanitizer
//! recurses into them. Hash-based collections are sorted so the same value
//! always produces the same output.
//!
//! ## Pointers and cells
//!
//! `&T`, `Rc` and `Arc` carry an [`Identity`] and take part in cycle
//! detection. Cells and locks are reached through a guard instead, and never
//! block: a `RefCell` that is mutably borrowed renders as `"[borrowed]"`, a
//! held `Mutex` or `RwLock` as `"[locked]"`. A cycle through
//! `Rc<RefCell<T>>` is still caught by the `Rc`.

use std::{
    borrow::Cow,
    cell::{Cell, RefCell},
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    fmt::Display,
    marker::PhantomData,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    ops::Deref,
    path::{Path, PathBuf},
    ptr,
    rc::{self, Rc},
    sync::{self, Arc, Mutex, RwLock, TryLockError},
    time::Duration,
};

use serde_json::Value as JsonValue;

use super::{Identity, Inspect, Primitive, Reference, ValueShape};

// =============================================================================
// Primitives
// =============================================================================

macro_rules! impl_inspect_int {
    ($variant:ident, $wide:ty, $($ty:ty),+) => {
        $(
            impl Inspect for $ty {
                fn shape(&self) -> ValueShape<'_> {
                    ValueShape::Primitive(Primitive::$variant(<$wide>::from(*self)))
                }
            }
        )+
    };
}

impl_inspect_int!(Int, i64, i8, i16, i32, i64);
impl_inspect_int!(UInt, u64, u8, u16, u32, u64);

impl Inspect for isize {
    fn shape(&self) -> ValueShape<'_> {
        match i64::try_from(*self) {
            Ok(value) => ValueShape::Primitive(Primitive::Int(value)),
            Err(_) => ValueShape::Primitive(Primitive::display(self)),
        }
    }
}

impl Inspect for usize {
    fn shape(&self) -> ValueShape<'_> {
        match u64::try_from(*self) {
            Ok(value) => ValueShape::Primitive(Primitive::UInt(value)),
            Err(_) => ValueShape::Primitive(Primitive::display(self)),
        }
    }
}

// 128-bit values outside the 64-bit range are not representable as JSON
// numbers without loss and render as decimal strings.
impl Inspect for i128 {
    fn shape(&self) -> ValueShape<'_> {
        match i64::try_from(*self) {
            Ok(value) => ValueShape::Primitive(Primitive::Int(value)),
            Err(_) => ValueShape::Primitive(Primitive::display(self)),
        }
    }
}

impl Inspect for u128 {
    fn shape(&self) -> ValueShape<'_> {
        match u64::try_from(*self) {
            Ok(value) => ValueShape::Primitive(Primitive::UInt(value)),
            Err(_) => ValueShape::Primitive(Primitive::display(self)),
        }
    }
}

impl Inspect for f32 {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::Primitive(Primitive::Float(f64::from(*self)))
    }
}

impl Inspect for f64 {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::Primitive(Primitive::Float(*self))
    }
}

impl Inspect for bool {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::Primitive(Primitive::Bool(*self))
    }
}

impl Inspect for char {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::Primitive(Primitive::display(self))
    }
}

impl Inspect for str {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::Primitive(Primitive::Str(Cow::Borrowed(self)))
    }
}

impl Inspect for String {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::Primitive(Primitive::Str(Cow::Borrowed(self.as_str())))
    }
}

impl Inspect for Cow<'_, str> {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::Primitive(Primitive::Str(Cow::Borrowed(self.as_ref())))
    }
}

impl Inspect for () {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::Null
    }
}

impl<T: ?Sized> Inspect for PhantomData<T> {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::Null
    }
}

// =============================================================================
// Display-backed leaves
// =============================================================================

macro_rules! impl_inspect_display {
    ($($ty:ty),+) => {
        $(
            impl Inspect for $ty {
                fn shape(&self) -> ValueShape<'_> {
                    ValueShape::Primitive(Primitive::display(self))
                }
            }
        )+
    };
}

impl_inspect_display!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);

impl Inspect for Path {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::Primitive(Primitive::Str(self.to_string_lossy()))
    }
}

impl Inspect for PathBuf {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::Primitive(Primitive::Str(self.to_string_lossy()))
    }
}

impl Inspect for Duration {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::Primitive(Primitive::Str(Cow::Owned(format!("{self:?}"))))
    }
}

// =============================================================================
// Optional and fallible values
// =============================================================================

impl<T: Inspect> Inspect for Option<T> {
    fn shape(&self) -> ValueShape<'_> {
        match self {
            Some(value) => value.shape(),
            None => T::absent(),
        }
    }

    fn custom_json(&self) -> Option<String> {
        self.as_ref().and_then(T::custom_json)
    }
}

impl<T: Inspect, E: Inspect> Inspect for Result<T, E> {
    fn shape(&self) -> ValueShape<'_> {
        match self {
            Ok(value) => ValueShape::Mapping(vec![("Ok".to_string(), value as &dyn Inspect)]),
            Err(err) => ValueShape::Mapping(vec![("Err".to_string(), err as &dyn Inspect)]),
        }
    }
}

// =============================================================================
// Pointers
// =============================================================================

impl<T: Inspect + ?Sized> Inspect for &T {
    fn shape(&self) -> ValueShape<'_> {
        pointer(Identity::of(ptr::from_ref::<T>(*self)), *self)
    }

    fn custom_json(&self) -> Option<String> {
        (**self).custom_json()
    }
}

impl<T: Inspect + ?Sized> Inspect for &mut T {
    fn shape(&self) -> ValueShape<'_> {
        let target: &T = self;
        pointer(Identity::of(ptr::from_ref(target)), target)
    }

    fn custom_json(&self) -> Option<String> {
        (**self).custom_json()
    }
}

// Boxes own their contents, so they cannot alias and need no identity.
impl<T: Inspect + ?Sized> Inspect for Box<T> {
    fn shape(&self) -> ValueShape<'_> {
        (**self).shape()
    }

    fn custom_json(&self) -> Option<String> {
        (**self).custom_json()
    }
}

impl<T: Inspect + ?Sized> Inspect for Rc<T> {
    fn shape(&self) -> ValueShape<'_> {
        let target: &T = self;
        pointer(Identity::of(Rc::as_ptr(self)), target)
    }

    fn custom_json(&self) -> Option<String> {
        (**self).custom_json()
    }
}

impl<T: Inspect + ?Sized> Inspect for Arc<T> {
    fn shape(&self) -> ValueShape<'_> {
        let target: &T = self;
        pointer(Identity::of(Arc::as_ptr(self)), target)
    }

    fn custom_json(&self) -> Option<String> {
        (**self).custom_json()
    }
}

impl<T: Inspect + ?Sized> Inspect for rc::Weak<T> {
    fn shape(&self) -> ValueShape<'_> {
        match self.upgrade() {
            Some(strong) => ValueShape::Reference(Reference::guarded(None, Box::new(strong))),
            None => ValueShape::Null,
        }
    }
}

impl<T: Inspect + ?Sized> Inspect for sync::Weak<T> {
    fn shape(&self) -> ValueShape<'_> {
        match self.upgrade() {
            Some(strong) => ValueShape::Reference(Reference::guarded(None, Box::new(strong))),
            None => ValueShape::Null,
        }
    }
}

// =============================================================================
// Cells and locks
// =============================================================================

/// Adapts a guard or pointer (`Ref`, `MutexGuard`, `&T`, ...) so the value
/// behind it can be inspected, including unsized values.
struct Guarded<G>(G);

impl<G> Inspect for Guarded<G>
where
    G: Deref,
    G::Target: Inspect,
{
    fn shape(&self) -> ValueShape<'_> {
        self.0.deref().shape()
    }

    fn custom_json(&self) -> Option<String> {
        self.0.deref().custom_json()
    }
}

fn pointer<'a, T: Inspect + ?Sized>(identity: Identity, target: &'a T) -> ValueShape<'a> {
    ValueShape::Reference(Reference::guarded(Some(identity), Box::new(Guarded(target))))
}

const BORROWED: &str = "[borrowed]";
const LOCKED: &str = "[locked]";

impl<T: Inspect + ?Sized> Inspect for RefCell<T> {
    fn shape(&self) -> ValueShape<'_> {
        match self.try_borrow() {
            Ok(guard) => ValueShape::Reference(Reference::guarded(None, Box::new(Guarded(guard)))),
            Err(_) => ValueShape::Reference(Reference::unavailable(None, BORROWED)),
        }
    }

    fn custom_json(&self) -> Option<String> {
        self.try_borrow().ok().and_then(|value| value.custom_json())
    }
}

impl<T: Inspect + Copy> Inspect for Cell<T> {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::Reference(Reference::guarded(None, Box::new(self.get())))
    }
}

impl<T: Inspect + ?Sized> Inspect for Mutex<T> {
    fn shape(&self) -> ValueShape<'_> {
        // A poisoned lock still holds a readable value.
        match self.try_lock() {
            Ok(guard) => ValueShape::Reference(Reference::guarded(None, Box::new(Guarded(guard)))),
            Err(TryLockError::Poisoned(poisoned)) => ValueShape::Reference(Reference::guarded(
                None,
                Box::new(Guarded(poisoned.into_inner())),
            )),
            Err(TryLockError::WouldBlock) => {
                ValueShape::Reference(Reference::unavailable(None, LOCKED))
            }
        }
    }
}

impl<T: Inspect + ?Sized> Inspect for RwLock<T> {
    fn shape(&self) -> ValueShape<'_> {
        match self.try_read() {
            Ok(guard) => ValueShape::Reference(Reference::guarded(None, Box::new(Guarded(guard)))),
            Err(TryLockError::Poisoned(poisoned)) => ValueShape::Reference(Reference::guarded(
                None,
                Box::new(Guarded(poisoned.into_inner())),
            )),
            Err(TryLockError::WouldBlock) => {
                ValueShape::Reference(Reference::unavailable(None, LOCKED))
            }
        }
    }
}

// =============================================================================
// Sequences
// =============================================================================

fn sequence<'a, T, I>(items: I) -> ValueShape<'a>
where
    T: Inspect + 'a,
    I: IntoIterator<Item = &'a T>,
{
    ValueShape::Sequence(items.into_iter().map(|item| item as &dyn Inspect).collect())
}

impl<T: Inspect> Inspect for [T] {
    fn shape(&self) -> ValueShape<'_> {
        sequence(self)
    }
}

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn shape(&self) -> ValueShape<'_> {
        sequence(self)
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn shape(&self) -> ValueShape<'_> {
        sequence(self)
    }
}

impl<T: Inspect> Inspect for VecDeque<T> {
    fn shape(&self) -> ValueShape<'_> {
        sequence(self)
    }
}

impl<T: Inspect> Inspect for BTreeSet<T> {
    fn shape(&self) -> ValueShape<'_> {
        sequence(self)
    }
}

impl<T: Inspect + Ord, S> Inspect for HashSet<T, S> {
    fn shape(&self) -> ValueShape<'_> {
        let mut items: Vec<&T> = self.iter().collect();
        items.sort();
        sequence(items)
    }
}

macro_rules! impl_inspect_tuple {
    ($($name:ident),+) => {
        impl<$($name: Inspect),+> Inspect for ($($name,)+) {
            #[allow(non_snake_case)]
            fn shape(&self) -> ValueShape<'_> {
                let ($($name,)+) = self;
                ValueShape::Sequence(vec![$($name as &dyn Inspect),+])
            }
        }
    };
}

impl_inspect_tuple!(A);
impl_inspect_tuple!(A, B);
impl_inspect_tuple!(A, B, C);
impl_inspect_tuple!(A, B, C, D);
impl_inspect_tuple!(A, B, C, D, E);
impl_inspect_tuple!(A, B, C, D, E, F);
impl_inspect_tuple!(A, B, C, D, E, F, G);
impl_inspect_tuple!(A, B, C, D, E, F, G, H);

// =============================================================================
// Mappings
// =============================================================================

impl<K: Display, V: Inspect, S> Inspect for HashMap<K, V, S> {
    fn shape(&self) -> ValueShape<'_> {
        let mut entries: Vec<(String, &dyn Inspect)> = self
            .iter()
            .map(|(key, value)| (key.to_string(), value as &dyn Inspect))
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        ValueShape::Mapping(entries)
    }
}

impl<K: Display, V: Inspect> Inspect for BTreeMap<K, V> {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::Mapping(
            self.iter()
                .map(|(key, value)| (key.to_string(), value as &dyn Inspect))
                .collect(),
        )
    }
}

// =============================================================================
// JSON values
// =============================================================================

impl Inspect for JsonValue {
    fn shape(&self) -> ValueShape<'_> {
        match self {
            JsonValue::Null => ValueShape::Null,
            JsonValue::Bool(value) => ValueShape::Primitive(Primitive::Bool(*value)),
            JsonValue::Number(number) => {
                let primitive = if let Some(value) = number.as_u64() {
                    Primitive::UInt(value)
                } else if let Some(value) = number.as_i64() {
                    Primitive::Int(value)
                } else {
                    Primitive::Float(number.as_f64().unwrap_or(f64::NAN))
                };
                ValueShape::Primitive(primitive)
            }
            JsonValue::String(value) => {
                ValueShape::Primitive(Primitive::Str(Cow::Borrowed(value.as_str())))
            }
            JsonValue::Array(items) => sequence(items),
            JsonValue::Object(map) => ValueShape::Mapping(
                map.iter()
                    .map(|(key, value)| (key.clone(), value as &dyn Inspect))
                    .collect(),
            ),
        }
    }
}

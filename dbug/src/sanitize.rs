//! The recursive walker that turns any [`Inspect`] value into a JSON-safe tree.
//!
//! Dispatch order for every value:
//!
//! 1. the value's custom serialization hook, when it yields parseable JSON
//! 2. its [`ValueShape`]: null, primitive, reference, mapping, sequence,
//!    record, callable, channel, raw handle
//!
//! ## Cycles
//!
//! References with an [`Identity`] are marked "in progress" while their
//! pointee is walked, and unmarked as soon as that walk ends. Only a
//! reference reachable from itself is still marked when revisited, so it
//! renders as `"[circular]"`; the same reference appearing twice side by side
//! is expanded both times.
//!
//! ## Depth
//!
//! Only containers (mappings, sequences and records) count toward the depth
//! limit. Pointer, cell and lock hops are transparent.
//!
//! Both the in-progress mark and the depth counter are held by guards whose
//! `Drop` releases them, so every exit path (including `?`) restores the
//! walker's state.

use std::{
    collections::HashSet,
    ops::{Deref, DerefMut},
};

use serde_json::{Map, Number, Value};

use crate::{
    error::SanitizeError,
    inspect::{FieldKind, Identity, Inspect, Pointee, Primitive, Record, Reference, ValueShape},
    raw_json,
};

/// Terminal value for a reference reachable from itself.
pub const CIRCULAR: &str = "[circular]";

/// Default nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Converts `value` into a JSON-safe tree with the default settings.
pub fn sanitize(value: &dyn Inspect) -> Result<Value, SanitizeError> {
    Sanitizer::new().sanitize(value)
}

/// Walker state for one top-level sanitize call.
#[derive(Debug)]
pub struct Sanitizer {
    in_progress: HashSet<Identity>,
    depth: usize,
    max_depth: usize,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer {
    pub fn new() -> Self {
        Self {
            in_progress: HashSet::new(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets how deeply nested a value may be before sanitizing fails.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Sanitizes `value`, starting from an empty visited set.
    pub fn sanitize(&mut self, value: &dyn Inspect) -> Result<Value, SanitizeError> {
        self.in_progress.clear();
        self.depth = 0;
        self.walk(value)
    }

    fn walk(&mut self, value: &dyn Inspect) -> Result<Value, SanitizeError> {
        if let Some(text) = value.custom_json() {
            match serde_json::from_str(&text) {
                Ok(parsed) => return Ok(parsed),
                Err(err) => {
                    tracing::debug!(error = %err, "custom JSON hook returned invalid JSON; using structure");
                }
            }
        }

        self.walk_shape(value.shape())
    }

    fn walk_shape(&mut self, shape: ValueShape<'_>) -> Result<Value, SanitizeError> {
        match shape {
            ValueShape::Null => Ok(Value::Null),
            ValueShape::Primitive(primitive) => primitive_to_json(primitive),
            ValueShape::Reference(reference) => self.follow(reference),
            ValueShape::Mapping(entries) => self.descend()?.walk_mapping(entries),
            ValueShape::Sequence(items) => self.descend()?.walk_sequence(items),
            ValueShape::Record(record) => self.descend()?.walk_record(record),
            ValueShape::Callable(signature) => Ok(signature.to_json()),
            ValueShape::Channel(info) => Ok(info.to_json()),
            ValueShape::RawHandle(handle) => Ok(Value::String(handle.to_string())),
        }
    }

    fn walk_mapping(
        &mut self,
        entries: Vec<(String, &dyn Inspect)>,
    ) -> Result<Value, SanitizeError> {
        let mut out = Map::with_capacity(entries.len());
        for (key, value) in entries {
            let sanitized = self
                .walk(value)
                .map_err(|err| SanitizeError::entry(key.as_str(), err))?;
            out.insert(key, sanitized);
        }
        Ok(Value::Object(out))
    }

    fn walk_sequence(&mut self, items: Vec<&dyn Inspect>) -> Result<Value, SanitizeError> {
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                self.walk(item)
                    .map_err(|err| SanitizeError::element(index, err))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    fn walk_record(&mut self, record: Record<'_>) -> Result<Value, SanitizeError> {
        let keys: Vec<String> = record
            .fields()
            .iter()
            .map(|field| record.key_for(field))
            .collect();
        let (_, fields) = record.into_parts();
        let mut out = Map::with_capacity(fields.len());
        for (key, field) in keys.into_iter().zip(fields) {
            let name = field.name();
            let value = match field.into_kind() {
                FieldKind::RawJson(bytes) => raw_json::decode(bytes),
                FieldKind::Visible(value) => self
                    .walk(value)
                    .map_err(|err| SanitizeError::field(key.as_str(), err))?,
                FieldKind::Hidden { type_name } => Value::String(format!("{name} [{type_name}]")),
                FieldKind::Described(text) => Value::String(text),
            };
            out.insert(key, value);
        }
        Ok(Value::Object(out))
    }

    fn follow(&mut self, reference: Reference<'_>) -> Result<Value, SanitizeError> {
        let target = match &reference.target {
            Pointee::Borrowed(value) => *value,
            Pointee::Owned(value) => value.as_ref(),
            Pointee::Unavailable(reason) => return Ok(Value::String((*reason).to_string())),
        };
        match reference.identity {
            None => self.walk(target),
            Some(identity) => match self.enter(identity) {
                Some(mut scope) => scope.walk(target),
                None => Ok(Value::String(CIRCULAR.to_string())),
            },
        }
    }

    /// Marks `identity` as in progress, or returns `None` if it already is.
    fn enter(&mut self, identity: Identity) -> Option<InProgress<'_>> {
        if !self.in_progress.insert(identity) {
            return None;
        }
        Some(InProgress {
            sanitizer: self,
            identity,
        })
    }

    fn descend(&mut self) -> Result<Nested<'_>, SanitizeError> {
        if self.depth >= self.max_depth {
            return Err(SanitizeError::TooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(Nested { sanitizer: self })
    }
}

fn primitive_to_json(primitive: Primitive<'_>) -> Result<Value, SanitizeError> {
    Ok(match primitive {
        Primitive::Bool(value) => Value::Bool(value),
        Primitive::Int(value) => Value::Number(value.into()),
        Primitive::UInt(value) => Value::Number(value.into()),
        Primitive::Float(value) => Number::from_f64(value)
            .map(Value::Number)
            .ok_or(SanitizeError::UnsupportedFloat(value))?,
        Primitive::Str(value) => Value::String(value.into_owned()),
    })
}

/// Holds one reference identity "in progress"; unmarks it on drop.
struct InProgress<'s> {
    sanitizer: &'s mut Sanitizer,
    identity: Identity,
}

impl Deref for InProgress<'_> {
    type Target = Sanitizer;

    fn deref(&self) -> &Sanitizer {
        self.sanitizer
    }
}

impl DerefMut for InProgress<'_> {
    fn deref_mut(&mut self) -> &mut Sanitizer {
        self.sanitizer
    }
}

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.sanitizer.in_progress.remove(&self.identity);
    }
}

/// Holds one level of depth; releases it on drop.
struct Nested<'s> {
    sanitizer: &'s mut Sanitizer,
}

impl Deref for Nested<'_> {
    type Target = Sanitizer;

    fn deref(&self) -> &Sanitizer {
        self.sanitizer
    }
}

impl DerefMut for Nested<'_> {
    fn deref_mut(&mut self) -> &mut Sanitizer {
        self.sanitizer
    }
}

impl Drop for Nested<'_> {
    fn drop(&mut self) {
        self.sanitizer.depth -= 1;
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

    use serde_json::json;

    use super::*;
    use crate::inspect::Field;

    struct Pair {
        left: Rc<u8>,
        right: Rc<u8>,
    }

    impl Inspect for Pair {
        fn shape(&self) -> ValueShape<'_> {
            ValueShape::Record(Record::new(
                "Pair",
                vec![
                    Field::visible("left", &self.left),
                    Field::visible("right", &self.right),
                ],
            ))
        }
    }

    struct Link {
        label: &'static str,
        next: RefCell<Option<Rc<Link>>>,
    }

    impl Inspect for Link {
        fn shape(&self) -> ValueShape<'_> {
            ValueShape::Record(Record::new(
                "Link",
                vec![
                    Field::visible("label", &self.label),
                    Field::visible("next", &self.next),
                ],
            ))
        }
    }

    struct BadHook;

    impl Inspect for BadHook {
        fn shape(&self) -> ValueShape<'_> {
            ValueShape::Primitive(Primitive::Str("structural".into()))
        }

        fn custom_json(&self) -> Option<String> {
            Some("{ definitely not json".to_string())
        }
    }

    struct GoodHook;

    impl Inspect for GoodHook {
        fn shape(&self) -> ValueShape<'_> {
            ValueShape::Null
        }

        fn custom_json(&self) -> Option<String> {
            Some(r#"{"from": "hook"}"#.to_string())
        }
    }

    #[test]
    fn shared_sibling_references_are_expanded_twice() {
        let shared = Rc::new(9u8);
        let pair = Pair {
            left: Rc::clone(&shared),
            right: shared,
        };
        let tree = sanitize(&pair).unwrap();
        assert_eq!(tree, json!({ "Pair.left": 9, "Pair.right": 9 }));
    }

    #[test]
    fn self_reference_is_marked_circular() {
        let link = Rc::new(Link {
            label: "loop",
            next: RefCell::new(None),
        });
        *link.next.borrow_mut() = Some(Rc::clone(&link));

        let tree = sanitize(&link).unwrap();
        assert_eq!(
            tree,
            json!({ "Link.label": "loop", "Link.next": "[circular]" })
        );

        link.next.borrow_mut().take();
    }

    #[test]
    fn visited_set_is_empty_after_each_call() {
        let mut sanitizer = Sanitizer::new();
        let value = Rc::new(vec![Rc::new(1u8)]);
        sanitizer.sanitize(&value).unwrap();
        assert!(sanitizer.in_progress.is_empty());
        assert_eq!(sanitizer.depth, 0);
    }

    #[test]
    fn guard_is_released_when_a_nested_walk_fails() {
        let mut sanitizer = Sanitizer::new();
        let value = Rc::new(vec![1.0, f64::NAN]);
        let err = sanitizer.sanitize(&value).unwrap_err();
        assert_eq!(err.to_string(), "index 1: unsupported value: NaN");
        assert!(sanitizer.in_progress.is_empty());
        assert_eq!(sanitizer.depth, 0);
    }

    #[test]
    fn mapping_failure_names_the_key() {
        let mut map = BTreeMap::new();
        map.insert("ok", 1.0);
        map.insert("bad", f64::INFINITY);
        let err = sanitize(&map).unwrap_err();
        assert_eq!(err.to_string(), "key \"bad\": unsupported value: inf");
    }

    #[test]
    fn depth_limit_fails_instead_of_overflowing() {
        let deep = vec![vec![vec![vec![1u8]]]];
        let mut sanitizer = Sanitizer::new().with_max_depth(3);
        let err = sanitizer.sanitize(&deep).unwrap_err();
        assert!(matches!(err.root_cause(), SanitizeError::TooDeep { limit: 3 }));
        assert!(Sanitizer::new().sanitize(&deep).is_ok());
    }

    #[test]
    fn pointer_hops_do_not_count_toward_depth() {
        let head = Rc::new(Link {
            label: "head",
            next: RefCell::new(None),
        });
        let mut tail = Rc::clone(&head);
        for _ in 1..200 {
            let node = Rc::new(Link {
                label: "link",
                next: RefCell::new(None),
            });
            *tail.next.borrow_mut() = Some(Rc::clone(&node));
            tail = node;
        }

        let tree = sanitize(&head).unwrap();
        let mut cursor = &tree;
        let mut length = 0;
        while let Value::Object(fields) = cursor {
            length += 1;
            cursor = &fields["Link.next"];
        }
        assert_eq!(length, 200);
        assert_eq!(cursor, &Value::Null);
    }

    #[test]
    fn valid_hook_output_wins() {
        assert_eq!(sanitize(&GoodHook).unwrap(), json!({ "from": "hook" }));
    }

    #[test]
    fn invalid_hook_output_falls_back_to_structure() {
        assert_eq!(sanitize(&BadHook).unwrap(), json!("structural"));
    }

    #[test]
    fn record_hidden_and_raw_fields() {
        struct Mixed {
            payload: Vec<u8>,
        }

        impl Inspect for Mixed {
            fn shape(&self) -> ValueShape<'_> {
                ValueShape::Record(Record::new(
                    "Mixed",
                    vec![
                        Field::hidden("secret", "String"),
                        Field::raw_json("payload", &self.payload),
                        Field::described("when", "Instant { .. }".to_string()),
                    ],
                ))
            }
        }

        let mixed = Mixed {
            payload: br#"{"n": 1}"#.to_vec(),
        };
        assert_eq!(
            sanitize(&mixed).unwrap(),
            json!({
                "Mixed.secret": "secret [String]",
                "Mixed.payload": { "n": 1 },
                "Mixed.when": "Instant { .. }",
            })
        );
    }
}

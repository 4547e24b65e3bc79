//! Tests for `#[derive(Inspect)]` output.
//!
//! These tests verify that:
//! - unannotated fields follow Rust visibility
//! - field options override the default rendering
//! - tuple, unit and enum shapes are keyed correctly
//! - generics only pick up the bounds their fields need

use std::{any::type_name, marker::PhantomData, time::Instant};

use dbug::{sanitize, Inspect};
use serde_json::json;

fn key<T>(field: &str) -> String {
    format!("{}.{field}", type_name::<T>())
}

mod account {
    use dbug::Inspect;

    #[derive(Inspect)]
    pub struct Account {
        pub id: u64,
        pub(crate) owner: String,
        password_hash: Vec<u8>,
        #[dbug(show)]
        balance: i64,
    }

    impl Account {
        pub fn new(id: u64, owner: &str) -> Self {
            Self {
                id,
                owner: owner.to_string(),
                password_hash: vec![0xde, 0xad],
                balance: 250,
            }
        }

        pub fn touch(&self) -> usize {
            self.password_hash.len()
        }
    }
}

#[test]
fn test_private_fields_become_placeholders() {
    use account::Account;

    let account = Account::new(7, "ada");
    assert_eq!(account.touch(), 2);
    assert_eq!(
        sanitize(&account).unwrap(),
        json!({
            (key::<Account>("id")): 7,
            (key::<Account>("owner")): "owner [String]",
            (key::<Account>("password_hash")): "password_hash [Vec<u8>]",
            (key::<Account>("balance")): 250,
        })
    );
}

#[test]
fn test_field_order_is_declaration_order() {
    let account = account::Account::new(1, "grace");
    let tree = sanitize(&account).unwrap();
    let keys: Vec<&String> = tree.as_object().unwrap().keys().collect();
    assert_eq!(
        keys,
        [
            &key::<account::Account>("id"),
            &key::<account::Account>("owner"),
            &key::<account::Account>("password_hash"),
            &key::<account::Account>("balance"),
        ]
    );
}

#[test]
fn test_hide_and_debug_options() {
    #[derive(Inspect)]
    pub struct Session {
        #[dbug(hide)]
        pub token: String,
        #[dbug(debug)]
        pub started: Option<Instant>,
        #[dbug(debug)]
        pub origin: std::net::Ipv4Addr,
    }

    let session = Session {
        token: "secret".to_string(),
        started: None,
        origin: std::net::Ipv4Addr::LOCALHOST,
    };
    assert_eq!(
        sanitize(&session).unwrap(),
        json!({
            (key::<Session>("token")): "token [String]",
            (key::<Session>("started")): "None",
            (key::<Session>("origin")): "127.0.0.1",
        })
    );
}

#[test]
fn test_tuple_and_unit_structs() {
    #[derive(Inspect)]
    pub struct Pair(pub u8, pub &'static str);

    #[derive(Inspect)]
    pub struct Marker;

    assert_eq!(
        sanitize(&Pair(1, "b")).unwrap(),
        json!({ (key::<Pair>("0")): 1, (key::<Pair>("1")): "b" })
    );
    assert_eq!(sanitize(&Marker).unwrap(), json!({}));
}

#[test]
fn test_enum_variants() {
    #[derive(Inspect)]
    pub enum Event {
        Started,
        Progress(u8, u8),
        Finished { code: i32, #[dbug(hide)] detail: String },
    }

    let enum_name = type_name::<Event>();
    assert_eq!(
        sanitize(&Event::Started).unwrap(),
        json!(format!("{enum_name}::Started"))
    );
    assert_eq!(
        sanitize(&Event::Progress(3, 10)).unwrap(),
        json!({
            (format!("{enum_name}::Progress.0")): 3,
            (format!("{enum_name}::Progress.1")): 10,
        })
    );
    assert_eq!(
        sanitize(&Event::Finished {
            code: 0,
            detail: "ok".to_string(),
        })
        .unwrap(),
        json!({
            (format!("{enum_name}::Finished.code")): 0,
            (format!("{enum_name}::Finished.detail")): "detail [String]",
        })
    );
}

#[test]
fn test_nested_records_and_collections() {
    #[derive(Inspect)]
    pub struct Line {
        pub sku: &'static str,
        pub qty: u32,
    }

    #[derive(Inspect)]
    pub struct Order {
        pub lines: Vec<Line>,
        pub note: Option<String>,
    }

    let order = Order {
        lines: vec![Line { sku: "A-1", qty: 2 }],
        note: None,
    };
    assert_eq!(
        sanitize(&order).unwrap(),
        json!({
            (key::<Order>("lines")): [{ (key::<Line>("sku")): "A-1", (key::<Line>("qty")): 2 }],
            (key::<Order>("note")): null,
        })
    );
}

/// Not `Inspect`: only usable behind `PhantomData` or a placeholder.
pub struct Opaque;

#[test]
fn test_generic_bounds_follow_usage() {
    #[derive(Inspect)]
    pub struct TypedId<T> {
        pub id: u64,
        pub marker: PhantomData<T>,
    }

    #[derive(Inspect)]
    pub struct Holder<T, U> {
        pub value: T,
        hidden: U,
    }

    let id: TypedId<Opaque> = TypedId {
        id: 9,
        marker: PhantomData,
    };
    assert_eq!(
        sanitize(&id).unwrap(),
        json!({ (key::<TypedId<Opaque>>("id")): 9, (key::<TypedId<Opaque>>("marker")): null })
    );

    let holder = Holder {
        value: vec![1u8],
        hidden: Opaque,
    };
    assert_eq!(
        sanitize(&holder).unwrap(),
        json!({
            (key::<Holder<Vec<u8>, Opaque>>("value")): [1],
            (key::<Holder<Vec<u8>, Opaque>>("hidden")): "hidden [U]",
        })
    );
}

#[test]
fn test_raw_identifiers_are_unprefixed() {
    #[derive(Inspect)]
    pub struct Keyword {
        pub r#type: &'static str,
    }

    assert_eq!(
        sanitize(&Keyword { r#type: "kw" }).unwrap(),
        json!({ (key::<Keyword>("type")): "kw" })
    );
}

#[test]
fn test_borrowed_fields() {
    #[derive(Inspect)]
    pub struct View<'a> {
        pub items: &'a [i32],
        pub label: &'a str,
    }

    let data = [1, 2, 3];
    let view = View {
        items: &data,
        label: "first",
    };
    assert_eq!(
        sanitize(&view).unwrap(),
        json!({ (key::<View<'_>>("items")): [1, 2, 3], (key::<View<'_>>("label")): "first" })
    );
}

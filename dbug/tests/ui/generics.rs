use std::{collections::BTreeMap, fmt::Debug, marker::PhantomData};

use dbug::{sanitize, Inspect};

pub struct NotInspectable;

#[derive(Inspect)]
pub struct Tagged<T, Tag> {
    pub value: T,
    pub tag: PhantomData<Tag>,
}

#[derive(Inspect)]
pub struct Index<K, V>
where
    K: Ord + std::fmt::Display,
{
    pub entries: BTreeMap<K, Vec<V>>,
}

#[derive(Inspect)]
pub struct Logged<E: Debug> {
    #[dbug(debug)]
    pub last_error: Option<E>,
    secret: E,
}

#[derive(Inspect)]
pub struct Slice<'a, T> {
    pub items: &'a [T],
}

fn main() {
    let tagged: Tagged<u8, NotInspectable> = Tagged {
        value: 1,
        tag: PhantomData,
    };
    sanitize(&tagged).unwrap();

    let mut entries = BTreeMap::new();
    entries.insert("k", vec![true]);
    sanitize(&Index { entries }).unwrap();

    let logged = Logged {
        last_error: Some(std::io::ErrorKind::NotFound),
        secret: std::io::ErrorKind::Other,
    };
    sanitize(&logged).unwrap();

    let data = [1u16, 2];
    sanitize(&Slice { items: &data }).unwrap();
}

use dbug::{sanitize, Inspect, RawJson};

#[derive(Inspect)]
pub enum Never {}

#[derive(Inspect)]
pub enum Message<T> {
    Ping,
    Data(T),
    Batch { items: Vec<T>, #[dbug(hide)] cursor: u64 },
    Raw(RawJson),
    Described(#[dbug(debug)] std::time::Instant),
}

#[derive(Inspect)]
pub enum r#Type {
    r#Struct { r#fn: u8 },
}

fn main() {
    let messages: Vec<Message<String>> = vec![
        Message::Ping,
        Message::Data("x".into()),
        Message::Batch {
            items: vec!["a".into()],
            cursor: 3,
        },
        Message::Raw(RawJson::from("[1]")),
        Message::Described(std::time::Instant::now()),
    ];
    sanitize(&messages).unwrap();
    sanitize(&r#Type::r#Struct { r#fn: 1 }).unwrap();
    let _ = std::mem::size_of::<Never>();
}

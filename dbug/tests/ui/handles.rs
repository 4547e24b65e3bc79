use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
    sync::{mpsc, Arc, Mutex, RwLock},
};

use dbug::{Inspect, RawJson};

#[derive(Inspect)]
pub struct Runtime {
    pub counter: Cell<u32>,
    pub state: Arc<Mutex<Vec<String>>>,
    pub config: RwLock<Option<String>>,
    pub parent: RefCell<Weak<Runtime>>,
    pub children: RefCell<Vec<Rc<Runtime>>>,
    pub notify: Option<mpsc::Sender<u8>>,
    pub hook: fn(&'static str) -> bool,
    pub payload: RawJson,
    #[dbug(raw_json)]
    pub extra: Vec<u8>,
}

fn accept(_: &'static str) -> bool {
    true
}

fn main() {
    let runtime = Rc::new(Runtime {
        counter: Cell::new(0),
        state: Arc::new(Mutex::new(Vec::new())),
        config: RwLock::new(None),
        parent: RefCell::new(Weak::new()),
        children: RefCell::new(Vec::new()),
        notify: None,
        hook: accept,
        payload: RawJson::from("{}"),
        extra: b"[]".to_vec(),
    });
    *runtime.parent.borrow_mut() = Rc::downgrade(&runtime);
    let body = dbug::render(&runtime).unwrap();
    assert!(!body.is_empty());
}

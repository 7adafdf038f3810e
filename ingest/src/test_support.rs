//! Test-only doubles for drones and database sinks.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Result, anyhow};
use serde_json::{Value, json};

use crate::core::document::TaskDoc;
use crate::io::db_config::DbConfig;
use crate::io::drone::{AssimilateRequest, Drone};
use crate::io::sink::{CalcDb, CalcDbFactory};

/// Build a document from a JSON object literal.
pub fn doc(value: Value) -> TaskDoc {
    serde_json::from_value(value).expect("test document must be a JSON object")
}

/// Drone returning a predetermined document, recording each request.
pub struct ScriptedDrone {
    doc: TaskDoc,
    requests: RefCell<Vec<AssimilateRequest>>,
}

impl ScriptedDrone {
    pub fn returning(doc: TaskDoc) -> Self {
        Self {
            doc,
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Requests seen so far (cloned).
    pub fn requests(&self) -> Vec<AssimilateRequest> {
        self.requests.borrow().clone()
    }
}

impl Drone for ScriptedDrone {
    fn assimilate(&self, request: &AssimilateRequest) -> Result<TaskDoc> {
        self.requests.borrow_mut().push(request.clone());
        Ok(self.doc.clone())
    }
}

/// Drone that always fails, simulating unparsable output files.
pub struct FailingDrone {
    pub message: String,
}

impl Drone for FailingDrone {
    fn assimilate(&self, _request: &AssimilateRequest) -> Result<TaskDoc> {
        Err(anyhow!("{}", self.message))
    }
}

/// In-memory database double. The factory and every client it opens share
/// state, so tests can inspect inserts after the task returns.
#[derive(Default, Clone)]
pub struct MemoryDbFactory {
    state: Rc<RefCell<MemoryDbState>>,
}

#[derive(Default)]
struct MemoryDbState {
    opened: Vec<DbConfig>,
    inserted: Vec<TaskDoc>,
    next_id: i64,
}

impl MemoryDbFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credential configs passed to `open` so far.
    pub fn opened(&self) -> Vec<DbConfig> {
        self.state.borrow().opened.clone()
    }

    /// Documents inserted so far, in order.
    pub fn inserted(&self) -> Vec<TaskDoc> {
        self.state.borrow().inserted.clone()
    }
}

impl CalcDbFactory for MemoryDbFactory {
    fn open(&self, config: &DbConfig) -> Result<Box<dyn CalcDb>> {
        self.state.borrow_mut().opened.push(config.clone());
        Ok(Box::new(MemoryDb {
            state: self.state.clone(),
        }))
    }
}

struct MemoryDb {
    state: Rc<RefCell<MemoryDbState>>,
}

impl CalcDb for MemoryDb {
    fn insert(&mut self, doc: &TaskDoc) -> Result<Value> {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.inserted.push(doc.clone());
        Ok(json!(id))
    }
}

/// Factory that fails on `open`, simulating an unreachable database.
pub struct BrokenDbFactory;

impl CalcDbFactory for BrokenDbFactory {
    fn open(&self, config: &DbConfig) -> Result<Box<dyn CalcDb>> {
        Err(anyhow!("connection refused: {}:{}", config.host, config.port))
    }
}

//! In-memory stand-in for a mongod, enough to drive the bootstrap and the probes

use crate::admin::{AdminApi, DatabaseApi};
use crate::plan::NewUser;
use crate::verify::ProbeTarget;
use anyhow::anyhow;
use bson::Bson;
use bson::oid::ObjectId;
use init_errors::MongoErr;
use std::cell::RefCell;
use std::rc::Rc;

const UNAUTHORIZED: i32 = 13;
const NAMESPACE_EXISTS: i32 = 48;
const DUPLICATE_USER: i32 = 51003;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Op {
    CreateUser,
    CreateCollection,
    Insert,
    Find,
    Delete,
    CreateIndex,
    Drop,
}

impl Op {
    fn command(self) -> &'static str {
        match self {
            Op::CreateUser => "createUser",
            Op::CreateCollection => "create",
            Op::Insert => "insert",
            Op::Find => "find",
            Op::Delete => "delete",
            Op::CreateIndex => "createIndexes",
            Op::Drop => "drop",
        }
    }
}

#[derive(Debug, Default)]
struct State {
    users: Vec<(String, NewUser)>,
    collections: Vec<(String, String)>,
    markers: Vec<(String, String, Bson)>,
    indexes: Vec<(String, String, String)>,
    denied: Vec<(String, Op)>,
    calls: Vec<String>,
    offline: bool,
    lose_writes: bool,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FakeServer {
    state: Rc<RefCell<State>>,
}

impl FakeServer {
    pub(crate) fn deny(&self, db: &str, op: Op) {
        self.state.borrow_mut().denied.push((db.to_string(), op));
    }

    pub(crate) fn go_offline(&self) {
        self.state.borrow_mut().offline = true;
    }

    /// Inserts are acknowledged but never stored
    pub(crate) fn lose_writes(&self) {
        self.state.borrow_mut().lose_writes = true;
    }

    pub(crate) fn users(&self) -> Vec<(String, NewUser)> {
        self.state.borrow().users.clone()
    }

    pub(crate) fn collections(&self) -> Vec<(String, String)> {
        self.state.borrow().collections.clone()
    }

    pub(crate) fn indexes(&self) -> Vec<(String, String, String)> {
        self.state.borrow().indexes.clone()
    }

    pub(crate) fn marker_count(&self) -> usize {
        self.state.borrow().markers.len()
    }

    /// Every command that reached the server, as `db.command`
    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }
}

impl AdminApi for FakeServer {
    type Db = FakeDb;

    fn switch_database(&self, name: &str) -> FakeDb {
        FakeDb {
            name: name.to_string(),
            state: self.state.clone(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct FakeDb {
    name: String,
    state: Rc<RefCell<State>>,
}

impl FakeDb {
    fn check(&self, op: Op) -> Result<(), MongoErr> {
        let mut state = self.state.borrow_mut();
        if state.offline {
            return Err(MongoErr::Unreachable(anyhow!("connection refused")));
        }
        state.calls.push(format!("{}.{}", self.name, op.command()));

        if state.denied.iter().any(|(db, o)| *db == self.name && *o == op) {
            return Err(MongoErr::Command {
                code: UNAUTHORIZED,
                code_name: "Unauthorized".to_string(),
                message: format!(
                    "not authorized on {} to execute command {{ {}: 1 }}",
                    self.name,
                    op.command()
                ),
            });
        }
        Ok(())
    }
}

impl DatabaseApi for FakeDb {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_user(&self, user: &NewUser) -> Result<(), MongoErr> {
        self.check(Op::CreateUser)?;
        let mut state = self.state.borrow_mut();

        if state
            .users
            .iter()
            .any(|(db, u)| *db == self.name && u.name == user.name)
        {
            return Err(MongoErr::Command {
                code: DUPLICATE_USER,
                code_name: "Location51003".to_string(),
                message: format!("User \"{}@{}\" already exists", user.name, self.name),
            });
        }

        state.users.push((self.name.clone(), user.clone()));
        Ok(())
    }

    async fn create_collection(&self, name: &str) -> Result<(), MongoErr> {
        self.check(Op::CreateCollection)?;
        let mut state = self.state.borrow_mut();

        if state
            .collections
            .iter()
            .any(|(db, c)| *db == self.name && c == name)
        {
            return Err(MongoErr::Command {
                code: NAMESPACE_EXISTS,
                code_name: "NamespaceExists".to_string(),
                message: format!("Collection {}.{name} already exists.", self.name),
            });
        }

        state.collections.push((self.name.clone(), name.to_string()));
        Ok(())
    }
}

impl ProbeTarget for FakeDb {
    async fn insert_marker(&self, collection: &str, _owner: &str) -> Result<Bson, MongoErr> {
        self.check(Op::Insert)?;
        let id = Bson::ObjectId(ObjectId::new());
        let mut state = self.state.borrow_mut();
        if !state.lose_writes {
            state
                .markers
                .push((self.name.clone(), collection.to_string(), id.clone()));
        }
        Ok(id)
    }

    async fn find_marker(&self, collection: &str, id: &Bson) -> Result<bool, MongoErr> {
        self.check(Op::Find)?;
        let state = self.state.borrow();
        Ok(state
            .markers
            .iter()
            .any(|(db, c, m)| *db == self.name && c == collection && m == id))
    }

    async fn delete_marker(&self, collection: &str, id: &Bson) -> Result<(), MongoErr> {
        self.check(Op::Delete)?;
        self.state
            .borrow_mut()
            .markers
            .retain(|(db, c, m)| !(*db == self.name && c == collection && m == id));
        Ok(())
    }

    async fn create_index(&self, collection: &str, field: &str) -> Result<(), MongoErr> {
        self.check(Op::CreateIndex)?;
        self.state.borrow_mut().indexes.push((
            self.name.clone(),
            collection.to_string(),
            field.to_string(),
        ));
        Ok(())
    }

    async fn drop_collection(&self, collection: &str) -> Result<(), MongoErr> {
        self.check(Op::Drop)?;
        let mut state = self.state.borrow_mut();
        let name = self.name.clone();
        state.markers.retain(|(db, c, _)| !(*db == name && c == collection));
        state.collections.retain(|(db, c)| !(*db == name && c == collection));
        Ok(())
    }
}

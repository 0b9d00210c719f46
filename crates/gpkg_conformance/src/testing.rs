//! Scripted store for exercising rules against results a real file cannot
//! easily produce.

use crate::backend::{BackendError, DbRow, DbValue, Store};
use std::cell::RefCell;
use std::collections::HashMap;

pub(crate) enum Scripted {
    Rows(Vec<DbRow>),
    Error(String),
}

#[derive(Default)]
pub(crate) struct ScriptedStore {
    responses: HashMap<String, Scripted>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_rows(mut self, sql: &str, columns: &[&str], rows: Vec<Vec<DbValue>>) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|values| DbRow::new(columns.clone(), values))
            .collect();
        self.responses.insert(sql.to_string(), Scripted::Rows(rows));
        self
    }

    pub(crate) fn with_error(mut self, sql: &str, message: &str) -> Self {
        self.responses
            .insert(sql.to_string(), Scripted::Error(message.to_string()));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Store for ScriptedStore {
    fn query_all(&self, sql: &str, _params: &[DbValue]) -> Result<Vec<DbRow>, BackendError> {
        self.calls.borrow_mut().push(sql.to_string());
        match self.responses.get(sql) {
            Some(Scripted::Rows(rows)) => Ok(rows.clone()),
            Some(Scripted::Error(message)) => Err(BackendError::Query(message.clone())),
            None => Err(BackendError::Query(format!("unscripted query: {}", sql))),
        }
    }
}

//! Schematic parameter trees handed to the netlist generator.
//!
//! Trees are plain owned values. A composite copies each sub-master's tree
//! into its own, so the sub-master's tree is never touched again.

use std::collections::BTreeMap;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::config_err;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchValue {
    Bool(bool),
    Int(i64),
    Str(ArcStr),
    List(Vec<SchValue>),
    Tree(SchParams),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchParams(BTreeMap<ArcStr, SchValue>);

impl SchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, builder style.
    pub fn with(mut self, key: impl Into<ArcStr>, value: impl Into<SchValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<ArcStr>, value: impl Into<SchValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Nests a copy of `sub` under `role`.
    pub fn compose(mut self, role: impl Into<ArcStr>, sub: &SchParams) -> Self {
        self.0.insert(role.into(), SchValue::Tree(sub.clone()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&SchValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ArcStr> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn int(&self, key: &str) -> Result<i64> {
        match self.0.get(key) {
            Some(SchValue::Int(v)) => Ok(*v),
            other => Err(config_err!("expected integer `{key}`, found {other:?}")),
        }
    }

    pub fn tree(&self, key: &str) -> Result<&SchParams> {
        match self.0.get(key) {
            Some(SchValue::Tree(t)) => Ok(t),
            other => Err(config_err!("expected parameter tree `{key}`, found {other:?}")),
        }
    }

    pub fn list(&self, key: &str) -> Result<&[SchValue]> {
        match self.0.get(key) {
            Some(SchValue::List(l)) => Ok(l),
            other => Err(config_err!("expected list `{key}`, found {other:?}")),
        }
    }
}

impl From<bool> for SchValue {
    fn from(value: bool) -> Self {
        SchValue::Bool(value)
    }
}

impl From<i64> for SchValue {
    fn from(value: i64) -> Self {
        SchValue::Int(value)
    }
}

impl From<usize> for SchValue {
    fn from(value: usize) -> Self {
        SchValue::Int(value as i64)
    }
}

impl From<ArcStr> for SchValue {
    fn from(value: ArcStr) -> Self {
        SchValue::Str(value)
    }
}

impl From<&ArcStr> for SchValue {
    fn from(value: &ArcStr) -> Self {
        SchValue::Str(value.clone())
    }
}

impl From<&str> for SchValue {
    fn from(value: &str) -> Self {
        SchValue::Str(ArcStr::from(value))
    }
}

impl From<SchParams> for SchValue {
    fn from(value: SchParams) -> Self {
        SchValue::Tree(value)
    }
}

impl<T: Into<SchValue>> From<Vec<T>> for SchValue {
    fn from(value: Vec<T>) -> Self {
        SchValue::List(value.into_iter().map(Into::into).collect())
    }
}

//! TOML job files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::registry::GeneratorKind;
use crate::tech::Tech;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub tech: Tech,
    pub cell: CellConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellConfig {
    pub kind: GeneratorKind,
    /// Generator parameters, passed through to the generator as JSON.
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

pub fn parse_job_config(path: impl AsRef<Path>) -> Result<JobConfig> {
    let contents = fs::read_to_string(path)?;
    let data = toml::from_str(&contents)?;
    Ok(data)
}

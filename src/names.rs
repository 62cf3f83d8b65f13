use std::collections::HashSet;

use arcstr::ArcStr;

use crate::config_err;
use crate::error::Result;

/// Set of generated cell names, shared across a whole generation run.
pub trait CellNameRegistry {
    /// Inserts `name` if it is unused. Returns `false` if it was already taken.
    fn check_and_insert(&mut self, name: &str) -> bool;

    fn contains(&self, name: &str) -> bool;

    /// Gives back a name claimed by a draw that was later abandoned.
    fn release(&mut self, name: &str);
}

#[derive(Debug, Default, Clone)]
pub struct UsedNames {
    names: HashSet<String>,
}

impl UsedNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl CellNameRegistry for UsedNames {
    fn check_and_insert(&mut self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    fn release(&mut self, name: &str) {
        self.names.remove(name);
    }
}

/// Picks the first free name among `base`, `base_1`, `base_2`, ...
pub fn allocate_name(registry: &mut dyn CellNameRegistry, base: &str) -> Result<ArcStr> {
    if base.is_empty() {
        return Err(config_err!("cell base name must not be empty"));
    }
    if registry.check_and_insert(base) {
        return Ok(ArcStr::from(base));
    }
    let mut i = 1usize;
    loop {
        let name = format!("{base}_{i}");
        if registry.check_and_insert(&name) {
            return Ok(ArcStr::from(name));
        }
        i += 1;
    }
}

//! Parameterized standard-cell layout generators on a track grid.

pub use anyhow::{anyhow, Result};

pub mod blocks;
pub mod cli;
pub mod component;
pub mod config;
pub mod data;
pub mod error;
pub mod layout;
pub mod names;
pub mod paths;
pub mod registry;
pub mod sch;
pub mod sizing;
pub mod tech;

pub use data::GenCtx;
pub use error::GenError;
pub use registry::{generate, GeneratorKind};

#[cfg(test)]
pub mod tests {
    use crate::data::GenCtx;
    use crate::tech::Tech;

    pub(crate) fn gen_ctx() -> GenCtx {
        GenCtx::new(Tech::default()).unwrap()
    }
}

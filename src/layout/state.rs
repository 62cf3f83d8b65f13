use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

/// Progress of a composite draw. States only move forward.
#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub enum DrawState {
    #[default]
    Unsized,
    SubmastersBuilt,
    FloorplanSet,
    SubmastersRebuilt,
    Placed,
    Wired,
    ParamsFinalized,
}

impl DrawState {
    /// Moves to `next`, which may skip states but never go back.
    pub fn advance(self, next: DrawState) -> Result<DrawState> {
        if next < self {
            return Err(GenError::State(format!("{self:?} -> {next:?}")));
        }
        Ok(next)
    }

    #[inline]
    pub fn is_final(&self) -> bool {
        *self == DrawState::ParamsFinalized
    }
}

use std::any::Any;

use arcstr::ArcStr;
use serde::Serialize;

use crate::data::GenCtx;
use crate::error::Result;
use crate::layout::LayoutCtx;

/// A parameterized layout generator.
///
/// Two instantiations with equal serialized parameters yield the same master.
pub trait Component: Any {
    type Params: Serialize;

    fn new(params: &Self::Params, ctx: &GenCtx) -> Result<Self>
    where
        Self: Sized;

    /// Base cell name; the final name may carry a numeric suffix.
    fn name(&self) -> ArcStr;

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()>;
}

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::data::GenCtx;
use crate::error::Result;
use crate::layout::LayoutCtx;
use crate::registry::GeneratorKind;

pub mod layout;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrapperParams {
    pub kind: GeneratorKind,
    /// Parameters of the wrapped cell.
    pub params: serde_json::Value,
    /// Empty edge columns on each side.
    #[serde(default)]
    pub guard_ring_nf: usize,
}

/// Wraps any registered cell with edge columns and re-exports its pins.
pub struct StdCellWrapper {
    params: WrapperParams,
}

impl Component for StdCellWrapper {
    type Params = WrapperParams;

    fn new(params: &Self::Params, _ctx: &GenCtx) -> Result<Self> {
        Ok(Self {
            params: params.clone(),
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::format!("{}_wrap", self.params.kind)
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        self.layout(ctx)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::tests::gen_ctx;

    use super::*;

    #[test]
    fn test_wrapper_adds_edges() {
        let mut ctx = gen_ctx();
        let params = WrapperParams {
            kind: GeneratorKind::Inv,
            params: json!({"seg": 4, "show_pins": false}),
            guard_ring_nf: 2,
        };
        let wrapped = ctx.instantiate::<StdCellWrapper>(&params).unwrap();
        assert_eq!(wrapped.num_cols(), 8);
        assert_eq!(wrapped.cell_name().as_str(), "inv_wrap");
        assert_eq!(wrapped.instances()[0].span.start, 2);
        assert_eq!(wrapped.dummy_cols(0), 4);
        assert!(wrapped.pin("in").unwrap().show);
        assert!(!wrapped.pin("pout").unwrap().show);
        let inner = &ctx.masters()[0];
        assert_eq!(wrapped.sch_params(), inner.sch_params());
    }

    #[test]
    fn test_wrapper_bad_params() {
        let mut ctx = gen_ctx();
        let params = WrapperParams {
            kind: GeneratorKind::LatchCk2,
            params: json!({"seg": "four"}),
            guard_ring_nf: 0,
        };
        assert!(ctx.instantiate::<StdCellWrapper>(&params).is_err());
    }
}

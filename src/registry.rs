//! Compile-time table of generators, addressable by kind.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::blocks::delay_line::{DelayCellMux, DelayLineMux};
use crate::blocks::dff::DffCk2;
use crate::blocks::inv::{Inv, InvChain};
use crate::blocks::latch::LatchCk2;
use crate::blocks::mux::Mux;
use crate::blocks::passgate::Passgate;
use crate::blocks::tinv::Tinv;
use crate::blocks::wrapper::StdCellWrapper;
use crate::component::Component;
use crate::config_err;
use crate::data::GenCtx;
use crate::error::Result;
use crate::layout::Master;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    Inv,
    InvTristate,
    Passgate,
    InvChain,
    MuxTristate,
    LatchCk2,
    FlopCk2,
    DelayCellMux,
    DelayLineMux,
    StdCellWrapper,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 10] = [
        GeneratorKind::Inv,
        GeneratorKind::InvTristate,
        GeneratorKind::Passgate,
        GeneratorKind::InvChain,
        GeneratorKind::MuxTristate,
        GeneratorKind::LatchCk2,
        GeneratorKind::FlopCk2,
        GeneratorKind::DelayCellMux,
        GeneratorKind::DelayLineMux,
        GeneratorKind::StdCellWrapper,
    ];
}

impl Display for GeneratorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GeneratorKind::Inv => "inv",
            GeneratorKind::InvTristate => "inv_tristate",
            GeneratorKind::Passgate => "passgate",
            GeneratorKind::InvChain => "inv_chain",
            GeneratorKind::MuxTristate => "mux_tristate",
            GeneratorKind::LatchCk2 => "latch_ck2",
            GeneratorKind::FlopCk2 => "flop_ck2",
            GeneratorKind::DelayCellMux => "delay_cell_mux",
            GeneratorKind::DelayLineMux => "delay_line_mux",
            GeneratorKind::StdCellWrapper => "std_cell_wrapper",
        };
        write!(f, "{name}")
    }
}

type GenFn = fn(&mut GenCtx, &serde_json::Value) -> Result<Arc<Master>>;

fn build<T>(ctx: &mut GenCtx, params: &serde_json::Value) -> Result<Arc<Master>>
where
    T: Component,
    T::Params: DeserializeOwned,
{
    let params: T::Params = serde_json::from_value(params.clone())?;
    ctx.instantiate::<T>(&params)
}

lazy_static! {
    static ref GENERATORS: HashMap<GeneratorKind, GenFn> = {
        let mut m: HashMap<GeneratorKind, GenFn> = HashMap::new();
        m.insert(GeneratorKind::Inv, build::<Inv>);
        m.insert(GeneratorKind::InvTristate, build::<Tinv>);
        m.insert(GeneratorKind::Passgate, build::<Passgate>);
        m.insert(GeneratorKind::InvChain, build::<InvChain>);
        m.insert(GeneratorKind::MuxTristate, build::<Mux>);
        m.insert(GeneratorKind::LatchCk2, build::<LatchCk2>);
        m.insert(GeneratorKind::FlopCk2, build::<DffCk2>);
        m.insert(GeneratorKind::DelayCellMux, build::<DelayCellMux>);
        m.insert(GeneratorKind::DelayLineMux, build::<DelayLineMux>);
        m.insert(GeneratorKind::StdCellWrapper, build::<StdCellWrapper>);
        m
    };
}

/// Generates a cell of `kind` from JSON parameters.
pub fn generate(
    ctx: &mut GenCtx,
    kind: GeneratorKind,
    params: &serde_json::Value,
) -> Result<Arc<Master>> {
    let f = GENERATORS
        .get(&kind)
        .ok_or_else(|| config_err!("no generator registered for `{kind}`"))?;
    f(ctx, params)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::tests::gen_ctx;

    #[test]
    fn test_every_kind_registered() {
        for kind in GeneratorKind::ALL {
            assert!(GENERATORS.contains_key(&kind), "{kind} is not registered");
            let parsed: GeneratorKind = serde_json::from_value(json!(kind.to_string())).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_generate_by_kind() {
        let mut ctx = gen_ctx();
        let inv = generate(&mut ctx, GeneratorKind::Inv, &json!({"seg": 2})).unwrap();
        assert_eq!(inv.num_cols(), 2);
        let chain = generate(
            &mut ctx,
            GeneratorKind::InvChain,
            &json!({"seg_list": [2, 4], "stack_list": [true, false]}),
        )
        .unwrap();
        assert_eq!(chain.num_cols(), 8);
        assert!(generate(&mut ctx, GeneratorKind::LatchCk2, &json!({"segs": 2})).is_err());
    }
}

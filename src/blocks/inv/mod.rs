use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::config_err;
use crate::data::GenCtx;
use crate::error::Result;
use crate::layout::LayoutCtx;

use super::{SigLocs, StdCellParams};

pub mod chain;
pub mod layout;
pub mod schematic;

pub use chain::{InvChain, InvChainParams};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct InvParams {
    #[serde(flatten)]
    pub cell: StdCellParams,
    pub seg: usize,
    #[serde(default)]
    pub wp: Option<i64>,
    #[serde(default)]
    pub wn: Option<i64>,
    /// Two series devices per finger.
    #[serde(default)]
    pub stack: bool,
    #[serde(default)]
    pub sig_locs: SigLocs,
}

impl InvParams {
    pub fn new(seg: usize) -> Self {
        Self {
            cell: StdCellParams::default(),
            seg,
            wp: None,
            wn: None,
            stack: false,
            sig_locs: SigLocs::default(),
        }
    }
}

pub struct Inv {
    params: InvParams,
    wp: i64,
    wn: i64,
}

impl Inv {
    /// Columns taken by an inverter; odd fingers leave one trailing dummy column.
    pub fn num_cols(seg: usize, stack: bool) -> usize {
        let dev = if stack { 2 * seg } else { seg };
        dev + seg % 2
    }
}

impl Component for Inv {
    type Params = InvParams;

    fn new(params: &Self::Params, _ctx: &GenCtx) -> Result<Self> {
        if params.seg == 0 {
            return Err(config_err!("inverter needs at least one segment"));
        }
        let (wp, wn) = params.cell.widths(params.wp, params.wn)?;
        Ok(Self {
            params: params.clone(),
            wp,
            wn,
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::format!("inv_{}x", self.params.seg)
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        self.layout(ctx)
    }
}

#[cfg(test)]
mod tests {
    use crate::layout::geom::HalfInt;
    use crate::layout::grid::Dir;
    use crate::tests::gen_ctx;

    use super::*;

    #[test]
    fn test_inv_tracks() {
        let mut ctx = gen_ctx();
        let inv = ctx.instantiate::<Inv>(&InvParams::new(4)).unwrap();
        assert_eq!(inv.num_cols(), 4);
        assert_eq!(inv.pin_track("in").unwrap().index, HalfInt::new(5));
        assert_eq!(inv.pin_track("pout").unwrap().index, HalfInt::new(9));
        assert_eq!(inv.pin_track("nout").unwrap().index, HalfInt::new(2));
        assert_eq!(inv.pin_track("VSS").unwrap().index, HalfInt::new(0));
        assert_eq!(inv.pin_track("VDD").unwrap().index, HalfInt::new(11));
        let out = inv.pin_track("out").unwrap();
        assert_eq!(ctx.grid().dir(out.layer).unwrap(), Dir::Vert);
        assert!(!inv.pin("pout").unwrap().show);
        assert!(inv.pin("out").unwrap().show);
        assert_eq!(inv.pin_net("out").unwrap(), inv.pin_net("pout").unwrap());
        assert_eq!(inv.pin_net("out").unwrap(), inv.pin_net("nout").unwrap());
        assert_ne!(inv.pin_net("in").unwrap(), inv.pin_net("out").unwrap());
        assert_eq!(inv.cell_name().as_str(), "inv_4x");
    }

    #[test]
    fn test_inv_odd_seg_leaves_dummy() {
        let mut ctx = gen_ctx();
        let inv = ctx.instantiate::<Inv>(&InvParams::new(3)).unwrap();
        assert_eq!(inv.num_cols(), 4);
        assert_eq!(inv.dummy_cols(0), 1);
        assert_eq!(inv.dummy_cols(1), 1);
        assert!(inv.devices().iter().all(|d| d.groups == vec![2, 1]));
    }

    #[test]
    fn test_inv_stack() {
        let mut ctx = gen_ctx();
        let params = InvParams {
            stack: true,
            ..InvParams::new(2)
        };
        let inv = ctx.instantiate::<Inv>(&params).unwrap();
        assert_eq!(inv.num_cols(), 4);
        assert!(inv.devices().iter().all(|d| d.stack && d.terms.contains_key("m")));
        let sch = inv.sch_params();
        assert_eq!(sch.get("stack"), Some(&true.into()));
    }

    #[test]
    fn test_inv_sig_locs() {
        let mut ctx = gen_ctx();
        let params = InvParams {
            sig_locs: SigLocs {
                in_: Some(HalfInt::new(4)),
                ..Default::default()
            },
            ..InvParams::new(2)
        };
        let inv = ctx.instantiate::<Inv>(&params).unwrap();
        assert_eq!(inv.pin_track("in").unwrap().index, HalfInt::new(4));
    }

    #[test]
    fn test_inv_override_keeps_other_pins() {
        let mut ctx = gen_ctx();
        let base = ctx.instantiate::<Inv>(&InvParams::new(2)).unwrap();
        let params = InvParams {
            sig_locs: SigLocs {
                in_: Some(HalfInt::new(4)),
                ..Default::default()
            },
            ..InvParams::new(2)
        };
        let moved = ctx.instantiate::<Inv>(&params).unwrap();
        assert_eq!(moved.pins().len(), base.pins().len());
        for name in base.pins().keys().filter(|n| n.as_str() != "in") {
            assert_eq!(
                moved.pin_track(name).unwrap(),
                base.pin_track(name).unwrap(),
                "pin {name} moved"
            );
        }
        assert_ne!(moved.pin_track("in").unwrap(), base.pin_track("in").unwrap());
    }

    #[test]
    fn test_inv_sch_keys() {
        let mut ctx = gen_ctx();
        let inv = ctx.instantiate::<Inv>(&InvParams::new(2)).unwrap();
        let keys: Vec<_> = inv.sch_params().keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            ["lch", "segn", "segp", "stack", "thn", "thp", "wn", "wp"]
        );
        assert_eq!(inv.sch_params().get("stack"), Some(&false.into()));
    }

    #[test]
    fn test_inv_rejects_bad_params() {
        let mut ctx = gen_ctx();
        assert!(ctx.instantiate::<Inv>(&InvParams::new(0)).is_err());
        let params = InvParams {
            wp: Some(8),
            ..InvParams::new(2)
        };
        let err = ctx.instantiate::<Inv>(&params).unwrap_err();
        assert!(err.to_string().contains("wp = 8"));
        assert!(ctx.masters().is_empty());
        assert!(!ctx.names().contains("inv_2x"));
    }

    #[test]
    fn test_inv_cached() {
        let mut ctx = gen_ctx();
        let a = ctx.instantiate::<Inv>(&InvParams::new(2)).unwrap();
        let b = ctx.instantiate::<Inv>(&InvParams::new(2)).unwrap();
        assert!(std::sync::Arc::ptr_eq(&a, &b));
        assert_eq!(ctx.masters().len(), 1);
    }
}

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::config_err;
use crate::data::GenCtx;
use crate::error::Result;
use crate::layout::LayoutCtx;
use crate::sizing::{stage_seg, StageRole};

use super::{SigLocs, StdCellParams};

pub mod layout;
pub mod schematic;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LatchParams {
    #[serde(flatten)]
    pub cell: StdCellParams,
    /// Segments of the output inverter; the tristate stages are sized from it.
    pub seg: usize,
    #[serde(default)]
    pub wp: Option<i64>,
    #[serde(default)]
    pub wn: Option<i64>,
    /// `in`, `clk` and `clkb` are honored.
    #[serde(default)]
    pub sig_locs: SigLocs,
}

impl LatchParams {
    pub fn new(seg: usize) -> Self {
        Self {
            cell: StdCellParams::default(),
            seg,
            wp: None,
            wn: None,
            sig_locs: SigLocs::default(),
        }
    }
}

/// Transparent latch with complementary clocks: input tristate, feedback
/// tristate and output inverter, placed `t0 | t1 | inv`.
pub struct LatchCk2 {
    params: LatchParams,
    seg_t0: usize,
    seg_t1: usize,
    wp: i64,
    wn: i64,
}

impl Component for LatchCk2 {
    type Params = LatchParams;

    fn new(params: &Self::Params, _ctx: &GenCtx) -> Result<Self> {
        if params.seg == 0 {
            return Err(config_err!("latch needs at least one segment"));
        }
        let (wp, wn) = params.cell.widths(params.wp, params.wn)?;
        Ok(Self {
            params: params.clone(),
            seg_t0: stage_seg(params.seg, StageRole::Input),
            seg_t1: stage_seg(params.seg, StageRole::Feedback),
            wp,
            wn,
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::format!("latch_ck2_{}x", self.params.seg)
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        self.layout(ctx)
    }
}

#[cfg(test)]
mod tests {
    use crate::blocks::inv::{Inv, InvParams};
    use crate::blocks::tinv::{Tinv, TinvParams};
    use crate::blocks::BLK_SP;
    use crate::layout::geom::HalfInt;
    use crate::tests::gen_ctx;

    use super::*;

    #[test]
    fn test_latch_sizing() {
        let mut ctx = gen_ctx();
        let latch = ctx.instantiate::<LatchCk2>(&LatchParams::new(16)).unwrap();
        let seg_dict = latch.sch_params().tree("seg_dict").unwrap();
        assert_eq!(seg_dict.int("nt0").unwrap(), 4);
        assert_eq!(seg_dict.int("pt0").unwrap(), 4);
        assert_eq!(seg_dict.int("nt1").unwrap(), 2);
        assert_eq!(seg_dict.int("pt1").unwrap(), 2);
        assert_eq!(seg_dict.int("ninv").unwrap(), 16);

        let t0 = ctx.instantiate::<Tinv>(&TinvParams::new(4)).unwrap();
        let t1 = ctx.instantiate::<Tinv>(&TinvParams::new(2)).unwrap();
        let inv = ctx.instantiate::<Inv>(&InvParams::new(16)).unwrap();
        assert_eq!(
            latch.num_cols(),
            t0.num_cols() + t1.num_cols() + inv.num_cols() + 2 * BLK_SP
        );
        let spans: Vec<_> = latch.instances().iter().map(|i| i.span).collect();
        assert_eq!(spans[0].gap_to(&spans[1]), Some(BLK_SP));
        assert_eq!(spans[1].gap_to(&spans[2]), Some(BLK_SP));
    }

    #[test]
    fn test_latch_tracks() {
        let mut ctx = gen_ctx();
        let latch = ctx.instantiate::<LatchCk2>(&LatchParams::new(4)).unwrap();
        assert_eq!(latch.pin_track("clk").unwrap().index, HalfInt::new(3));
        assert_eq!(latch.pin_track("clkb").unwrap().index, HalfInt::new(8));
        assert_eq!(latch.pin_track("in").unwrap().index, HalfInt::new(5));
        assert_ne!(latch.pin_net("clk").unwrap(), latch.pin_net("clkb").unwrap());
        assert_ne!(latch.pin_net("in").unwrap(), latch.pin_net("out").unwrap());
    }

    #[test]
    fn test_latch_clock_override() {
        let mut ctx = gen_ctx();
        let params = LatchParams {
            sig_locs: SigLocs {
                clk: Some(HalfInt::new(8)),
                clkb: Some(HalfInt::new(3)),
                ..Default::default()
            },
            ..LatchParams::new(4)
        };
        let latch = ctx.instantiate::<LatchCk2>(&params).unwrap();
        assert_eq!(latch.pin_track("clk").unwrap().index, HalfInt::new(8));
        assert_eq!(latch.pin_track("clkb").unwrap().index, HalfInt::new(3));
        assert_eq!(latch.pin_track("in").unwrap().index, HalfInt::new(5));
    }

    #[test]
    fn test_latch_needs_three_gate_tracks() {
        let mut ctx = gen_ctx();
        let mut params = LatchParams::new(4);
        for row in params.cell.config.rows.iter_mut() {
            row.num_g = 2;
        }
        assert!(ctx.instantiate::<LatchCk2>(&params).is_err());
        assert!(ctx.masters().is_empty());
        for name in ["latch_ck2_4x", "inv_4x", "inv_tristate_2x"] {
            assert!(!ctx.names().contains(name), "{name} still registered");
        }
    }
}

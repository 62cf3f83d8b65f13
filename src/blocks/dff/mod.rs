use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::config_err;
use crate::data::GenCtx;
use crate::error::Result;
use crate::layout::LayoutCtx;

use super::{SigLocs, StdCellParams};

pub mod layout;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DffParams {
    #[serde(flatten)]
    pub cell: StdCellParams,
    /// Segments of the slave latch's output inverter.
    pub seg: usize,
    #[serde(default)]
    pub wp: Option<i64>,
    #[serde(default)]
    pub wn: Option<i64>,
    /// `in`, `clk` and `clkb` are honored.
    #[serde(default)]
    pub sig_locs: SigLocs,
}

impl DffParams {
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

/// Master-slave flip-flop from two complementary-clock latches.
pub struct DffCk2 {
    params: DffParams,
    wp: i64,
    wn: i64,
}

impl Component for DffCk2 {
    type Params = DffParams;

    fn new(params: &Self::Params, _ctx: &GenCtx) -> Result<Self> {
        if params.seg == 0 {
            return Err(config_err!("flip-flop needs at least one segment"));
        }
        let (wp, wn) = params.cell.widths(params.wp, params.wn)?;
        Ok(Self {
            params: params.clone(),
            wp,
            wn,
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::format!("flop_ck2_{}x", self.params.seg)
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        self.layout(ctx)
    }
}

#[cfg(test)]
mod tests {
    use crate::blocks::latch::{LatchCk2, LatchParams};
    use crate::blocks::BLK_SP;
    use crate::layout::geom::HalfInt;
    use crate::sch::SchValue;
    use crate::tests::gen_ctx;

    use super::*;

    #[test]
    fn test_dff_master_sizing() {
        let mut ctx = gen_ctx();
        for seg in [1, 2, 4, 8, 16, 32, 64] {
            let dff = ctx.instantiate::<DffCk2>(&DffParams::new(seg)).unwrap();
            let seg_m = dff.sch_params().tree("seg_m").unwrap();
            assert_eq!(seg_m.len(), 6);
            for key in seg_m.keys() {
                match seg_m.get(key) {
                    Some(SchValue::Int(v)) => {
                        assert!(*v >= 2 && v % 2 == 0, "seg {seg}: {key} = {v}")
                    }
                    other => panic!("unexpected {key} = {other:?}"),
                }
            }
            assert_eq!(
                dff.sch_params().tree("seg_s").unwrap().int("ninv").unwrap(),
                seg as i64
            );
        }
    }

    #[test]
    fn test_dff_clocks_shared() {
        let mut ctx = gen_ctx();
        let dff = ctx.instantiate::<DffCk2>(&DffParams::new(8)).unwrap();
        let slave = ctx.instantiate::<LatchCk2>(&LatchParams::new(8)).unwrap();
        assert_eq!(dff.pin_track("clk").unwrap().index, HalfInt::new(3));
        assert_eq!(dff.pin_track("clkb").unwrap().index, HalfInt::new(8));
        assert_eq!(dff.pin_track("in").unwrap().index, HalfInt::new(5));
        assert_ne!(dff.pin_net("clk").unwrap(), dff.pin_net("clkb").unwrap());
        assert_ne!(dff.pin_net("in").unwrap(), dff.pin_net("out").unwrap());

        let spans: Vec<_> = dff.instances().iter().map(|i| i.span).collect();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].gap_to(&spans[1]), Some(BLK_SP));
        assert_eq!(spans[1].width, slave.num_cols());
        assert_eq!(dff.num_cols(), spans[1].stop());
    }

    #[test]
    fn test_dff_deterministic() {
        let mut a = gen_ctx();
        let mut b = gen_ctx();
        let ma = a.instantiate::<DffCk2>(&DffParams::new(4)).unwrap();
        let mb = b.instantiate::<DffCk2>(&DffParams::new(4)).unwrap();
        assert_eq!(ma.num_cols(), mb.num_cols());
        assert_eq!(ma.sch_params(), mb.sch_params());
        assert_eq!(ma.wires(), mb.wires());
        assert_eq!(ma.pins(), mb.pins());
    }
}

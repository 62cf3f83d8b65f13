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
pub struct MuxParams {
    #[serde(flatten)]
    pub cell: StdCellParams,
    /// Segments of each tristate inverter.
    pub seg: usize,
    /// Segments of the select inverter; sized from `seg` when unset.
    #[serde(default)]
    pub seg_inv: Option<usize>,
    #[serde(default)]
    pub wp: Option<i64>,
    #[serde(default)]
    pub wn: Option<i64>,
    /// `in` moves `in0`, `en` moves `sel` and `enb` moves the internal `selb`.
    #[serde(default)]
    pub sig_locs: SigLocs,
}

impl MuxParams {
    pub fn new(seg: usize) -> Self {
        Self {
            cell: StdCellParams::default(),
            seg,
            seg_inv: None,
            wp: None,
            wn: None,
            sig_locs: SigLocs::default(),
        }
    }
}

/// Two-input multiplexer from two tristate inverters and a select inverter.
pub struct Mux {
    params: MuxParams,
    seg_inv: usize,
    wp: i64,
    wn: i64,
}

impl Component for Mux {
    type Params = MuxParams;

    fn new(params: &Self::Params, _ctx: &GenCtx) -> Result<Self> {
        if params.seg == 0 || params.seg % 2 != 0 {
            return Err(config_err!(
                "tristate mux needs a positive even seg, got seg = {}",
                params.seg
            ));
        }
        let seg_inv = params
            .seg_inv
            .unwrap_or_else(|| stage_seg(params.seg, StageRole::Input));
        if seg_inv == 0 {
            return Err(config_err!("select inverter needs at least one segment"));
        }
        let (wp, wn) = params.cell.widths(params.wp, params.wn)?;
        Ok(Self {
            params: params.clone(),
            seg_inv,
            wp,
            wn,
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::format!("mux2_tristate_{}x", self.params.seg)
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        self.layout(ctx)
    }
}

#[cfg(test)]
mod tests {
    use crate::blocks::tinv::{Tinv, TinvParams};
    use crate::blocks::BLK_SP;
    use crate::layout::geom::HalfInt;
    use crate::tests::gen_ctx;

    use super::*;

    #[test]
    fn test_mux_placement() {
        let mut ctx = gen_ctx();
        let mux = ctx.instantiate::<Mux>(&MuxParams::new(4)).unwrap();
        let tinv = ctx.instantiate::<Tinv>(&TinvParams::new(4)).unwrap();
        let spans: Vec<_> = mux.instances().iter().map(|i| i.span).collect();
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].start, 0);
        assert_eq!(spans[0].width, tinv.num_cols());
        for pair in spans.windows(2) {
            assert_eq!(pair[0].gap_to(&pair[1]), Some(BLK_SP));
        }
        assert_eq!(mux.num_cols(), spans[2].stop());
    }

    #[test]
    fn test_mux_pins() {
        let mut ctx = gen_ctx();
        let mux = ctx.instantiate::<Mux>(&MuxParams::new(2)).unwrap();
        for pin in ["in0", "in1", "sel", "out", "VDD", "VSS"] {
            assert!(mux.has_pin(pin), "missing {pin}");
        }
        assert_eq!(mux.pin_track("in0").unwrap().index, HalfInt::new(5));
        assert_eq!(mux.pin_track("in1").unwrap().index, HalfInt::new(4));
        assert_eq!(mux.pin_track("sel").unwrap().index, HalfInt::new(3));
        let nets: Vec<_> = ["in0", "in1", "sel", "out"]
            .iter()
            .map(|p| mux.pin_net(p).unwrap())
            .collect();
        for (i, a) in nets.iter().enumerate() {
            for b in nets.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        let seg_dict = mux.sch_params().tree("seg_dict").unwrap();
        assert_eq!(seg_dict.int("pt0").unwrap(), 2);
        assert_eq!(seg_dict.int("ninv").unwrap(), 2);
    }

    #[test]
    fn test_mux_sel_override() {
        let mut ctx = gen_ctx();
        let params = MuxParams {
            sig_locs: SigLocs {
                in_: Some(HalfInt::new(4)),
                ..Default::default()
            },
            ..MuxParams::new(2)
        };
        let mux = ctx.instantiate::<Mux>(&params).unwrap();
        assert_eq!(mux.pin_track("in0").unwrap().index, HalfInt::new(4));
        assert_eq!(mux.pin_track("in1").unwrap().index, HalfInt::new(5));
    }
}

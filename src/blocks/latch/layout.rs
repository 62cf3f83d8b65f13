use crate::blocks::inv::{Inv, InvParams};
use crate::blocks::tinv::{Tinv, TinvParams};
use crate::blocks::{merge_supplies, SigLocs, StdCellParams, BLK_SP};
use crate::error::Result;
use crate::layout::floorplan::TrackKind;
use crate::layout::geom::HalfInt;
use crate::layout::{DrawState, LayoutCtx};

use super::LatchCk2;

impl LatchCk2 {
    fn tinv_params(&self, sub: &StdCellParams, seg: usize, sig_locs: SigLocs) -> TinvParams {
        TinvParams {
            cell: sub.clone(),
            seg,
            wp: Some(self.wp),
            wn: Some(self.wn),
            pmos_switch: true,
            sig_locs,
        }
    }

    fn inv_params(&self, sub: &StdCellParams, sig_locs: SigLocs) -> InvParams {
        InvParams {
            cell: sub.clone(),
            seg: self.params.seg,
            wp: Some(self.wp),
            wn: Some(self.wn),
            stack: false,
            sig_locs,
        }
    }

    pub(crate) fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let params = &self.params;
        let info = params.cell.row_layout_info()?;
        let sub = params.cell.hidden(&info);
        let tr = params.cell.tr_manager()?;

        let t0_raw = ctx.instantiate::<Tinv>(&self.tinv_params(&sub, self.seg_t0, SigLocs::default()))?;
        let t1_raw = ctx.instantiate::<Tinv>(&self.tinv_params(&sub, self.seg_t1, SigLocs::default()))?;
        let inv_raw = ctx.instantiate::<Inv>(&self.inv_params(&sub, SigLocs::default()))?;
        ctx.advance(DrawState::SubmastersBuilt)?;
        ctx.initialize(info)?;

        let res = ctx.resolver(&tr)?;
        let clk = match params.sig_locs.clk {
            Some(idx) => res.at(idx, "en"),
            None => res.track_id(0, TrackKind::G, HalfInt::new(-1), "en")?,
        };
        let clkb = match params.sig_locs.clkb {
            Some(idx) => res.at(idx, "en"),
            None => res.track_id(1, TrackKind::G, HalfInt::new(-1), "en")?,
        };
        let input = match params.sig_locs.in_ {
            Some(idx) => res.at(idx, "in"),
            None => res.first_free(0, TrackKind::G, "in", &[(clk, "en"), (clkb, "en")])?,
        };
        let mid = res.first_free(
            1,
            TrackKind::G,
            "in",
            &[(clk, "en"), (clkb, "en"), (input, "in")],
        )?;
        let fb = res.first_free(
            0,
            TrackKind::G,
            "in",
            &[(clk, "en"), (clkb, "en"), (input, "in"), (mid, "in")],
        )?;

        let t0 = ctx.instantiate::<Tinv>(&self.tinv_params(
            &sub,
            self.seg_t0,
            SigLocs {
                in_: Some(input.index),
                en: Some(clk.index),
                enb: Some(clkb.index),
                ..Default::default()
            },
        ))?;
        let t1 = ctx.instantiate::<Tinv>(&self.tinv_params(
            &sub,
            self.seg_t1,
            SigLocs {
                in_: Some(fb.index),
                en: Some(clkb.index),
                enb: Some(clk.index),
                ..Default::default()
            },
        ))?;
        let inv = ctx.instantiate::<Inv>(&self.inv_params(
            &sub,
            SigLocs {
                in_: Some(mid.index),
                ..Default::default()
            },
        ))?;
        ctx.advance(DrawState::SubmastersRebuilt)?;

        let t0_cols = t0_raw.num_cols();
        let t1_cols = t1_raw.num_cols();
        let num_cols = t0_cols + t1_cols + inv_raw.num_cols() + 2 * BLK_SP;
        ctx.set_size(num_cols)?;
        let t0 = ctx.add_instance(&t0, 0)?;
        let t1 = ctx.add_instance(&t1, t0_cols + BLK_SP)?;
        let inv = ctx.add_instance(&inv, num_cols - inv_raw.num_cols())?;
        ctx.advance(DrawState::Placed)?;

        let clk = ctx.connect_wires(&[t0.get_pin("en")?, t1.get_pin("enb")?])?;
        let clkb = ctx.connect_wires(&[t0.get_pin("enb")?, t1.get_pin("en")?])?;
        ctx.connect_to_track_wires(
            &[t0.get_pin("out")?, t1.get_pin("out")?],
            &[inv.get_pin("in")?],
        )?;
        ctx.connect_to_track_wires(&[inv.get_pin("out")?], &[t1.get_pin("in")?])?;
        ctx.advance(DrawState::Wired)?;

        let show = params.cell.show_pins;
        ctx.add_pin("in", &[t0.get_pin("in")?], show)?;
        ctx.add_pin("out", &[inv.get_pin("out")?], show)?;
        ctx.add_pin("clk", &[clk], show)?;
        ctx.add_pin("clkb", &[clkb], show)?;
        merge_supplies(ctx, &[&t0, &t1, &inv], show)?;

        ctx.fill_space()?;
        ctx.set_sch_params(self.sch_params())
    }
}

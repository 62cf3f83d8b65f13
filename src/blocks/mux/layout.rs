use crate::blocks::inv::{Inv, InvParams};
use crate::blocks::tinv::{Tinv, TinvParams};
use crate::blocks::{merge_supplies, SigLocs, StdCellParams, BLK_SP};
use crate::error::Result;
use crate::layout::floorplan::TrackKind;
use crate::layout::geom::HalfInt;
use crate::layout::{DrawState, LayoutCtx};

use super::Mux;

impl Mux {
    fn tinv_params(&self, sub: &StdCellParams, sig_locs: SigLocs) -> TinvParams {
        TinvParams {
            cell: sub.clone(),
            seg: self.params.seg,
            wp: Some(self.wp),
            wn: Some(self.wn),
            pmos_switch: true,
            sig_locs,
        }
    }

    fn inv_params(&self, sub: &StdCellParams, sig_locs: SigLocs) -> InvParams {
        InvParams {
            cell: sub.clone(),
            seg: self.seg_inv,
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

        let t_raw = ctx.instantiate::<Tinv>(&self.tinv_params(&sub, SigLocs::default()))?;
        let inv_raw = ctx.instantiate::<Inv>(&self.inv_params(&sub, SigLocs::default()))?;
        ctx.advance(DrawState::SubmastersBuilt)?;
        ctx.initialize(info)?;

        let res = ctx.resolver(&tr)?;
        let sel = match params.sig_locs.en {
            Some(idx) => res.at(idx, "en"),
            None => res.track_id(0, TrackKind::G, HalfInt::new(-1), "en")?,
        };
        let selb = match params.sig_locs.enb {
            Some(idx) => res.at(idx, "en"),
            None => res.track_id(1, TrackKind::G, HalfInt::new(-1), "en")?,
        };
        let in0 = match params.sig_locs.in_ {
            Some(idx) => res.at(idx, "in"),
            None => res.first_free(0, TrackKind::G, "in", &[(sel, "en"), (selb, "en")])?,
        };
        let in1 = res.first_free(
            0,
            TrackKind::G,
            "in",
            &[(sel, "en"), (selb, "en"), (in0, "in")],
        )?;
        let out_tid = res.placed(1, TrackKind::Gb, "out")?;

        let t0 = ctx.instantiate::<Tinv>(&self.tinv_params(
            &sub,
            SigLocs {
                in_: Some(in0.index),
                en: Some(selb.index),
                enb: Some(sel.index),
                ..Default::default()
            },
        ))?;
        let t1 = ctx.instantiate::<Tinv>(&self.tinv_params(
            &sub,
            SigLocs {
                in_: Some(in1.index),
                en: Some(sel.index),
                enb: Some(selb.index),
                ..Default::default()
            },
        ))?;
        let inv = ctx.instantiate::<Inv>(&self.inv_params(
            &sub,
            SigLocs {
                in_: Some(sel.index),
                ..Default::default()
            },
        ))?;
        ctx.advance(DrawState::SubmastersRebuilt)?;

        let t_cols = t_raw.num_cols();
        ctx.set_size(2 * t_cols + inv_raw.num_cols() + 2 * BLK_SP)?;
        let t0 = ctx.add_instance(&t0, 0)?;
        let t1 = ctx.add_instance(&t1, t_cols + BLK_SP)?;
        let inv = ctx.add_instance(&inv, 2 * (t_cols + BLK_SP))?;
        ctx.advance(DrawState::Placed)?;

        let sel = ctx.connect_wires(&[t0.get_pin("enb")?, t1.get_pin("en")?, inv.get_pin("in")?])?;
        let selb = ctx.connect_wires(&[t0.get_pin("en")?, t1.get_pin("enb")?])?;
        ctx.connect_to_track_wires(&[inv.get_pin("out")?], &[selb])?;
        ctx.connect_to_tracks(&[t0.get_pin("out")?, t1.get_pin("out")?], out_tid)?;
        ctx.advance(DrawState::Wired)?;

        let show = params.cell.show_pins;
        ctx.add_pin("in0", &[t0.get_pin("in")?], show)?;
        ctx.add_pin("in1", &[t1.get_pin("in")?], show)?;
        ctx.add_pin("sel", &[sel], show)?;
        ctx.add_pin("out", &[t1.get_pin("out")?], show)?;
        merge_supplies(ctx, &[&t0, &t1, &inv], show)?;

        ctx.fill_space()?;
        ctx.set_sch_params(self.sch_params())
    }
}

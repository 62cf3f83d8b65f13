use crate::error::Result;
use crate::layout::floorplan::TrackKind;
use crate::layout::geom::HalfInt;
use crate::layout::tracks::{TrackId, TrackLayer};
use crate::layout::{DrawState, LayoutCtx};

use super::Tinv;

impl Tinv {
    pub(crate) fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let params = &self.params;
        let cell = &params.cell;
        let seg = params.seg;
        let tr = cell.tr_manager()?;

        let (vss_tid, vdd_tid) = ctx.setup_floorplan(
            &cell.config,
            cell.row_layout_info.as_ref(),
            2 * seg,
            tr.get_width(TrackLayer::Hm, "sup"),
        )?;
        let res = ctx.resolver(&tr)?;
        let en_tid = match params.sig_locs.en {
            Some(idx) => res.at(idx, "en"),
            None => res.aligned(0, TrackKind::G, "en", 1)?,
        };
        let enb_tid = match params.sig_locs.enb {
            Some(idx) => res.at(idx, "en"),
            None => res.aligned(1, TrackKind::G, "en", 1)?,
        };
        let in_tid = match params.sig_locs.in_ {
            Some(idx) => res.at(idx, "in"),
            None => res.at(HalfInt::middle(en_tid.index, enb_tid.index), "in"),
        };
        let pout_tid = match params.sig_locs.pout {
            Some(idx) => res.at(idx, "out"),
            None => res.placed(1, TrackKind::Gb, "out")?,
        };
        let nout_tid = match params.sig_locs.nout {
            Some(idx) => res.at(idx, "out"),
            None => res.placed(0, TrackKind::Gb, "out")?,
        };

        let nmos = ctx.add_mos(0, 0, seg, self.wn, true)?;
        let pmos = ctx.add_mos(1, 0, seg, self.wp, params.pmos_switch)?;
        ctx.advance(DrawState::Placed)?;

        let pgate = if params.pmos_switch { "g0" } else { "g" };
        let input = ctx.connect_terms(&[nmos.get("g0")?, pmos.get(pgate)?], in_tid)?;
        let en = ctx.connect_terms(&[nmos.get("g1")?], en_tid)?;
        let enb = if params.pmos_switch {
            Some(ctx.connect_terms(&[pmos.get("g1")?], enb_tid)?)
        } else {
            None
        };
        let pout = ctx.connect_terms(&[pmos.get("d")?], pout_tid)?;
        let nout = ctx.connect_terms(&[nmos.get("d")?], nout_tid)?;
        let vdd = ctx.connect_to_rail(&[pmos.get("s")?], vdd_tid)?;
        let vss = ctx.connect_to_rail(&[nmos.get("s")?], vss_tid)?;

        let vm = ctx.vm_layer();
        let out_idx = match params.sig_locs.out {
            Some(idx) => idx,
            None => ctx
                .grid()
                .coord_to_nearest_track(vm, pout.middle(), true)?,
        };
        let out_tid = TrackId::new(vm, out_idx, tr.get_width(TrackLayer::Vm, "out"));
        let out = ctx.connect_to_tracks(&[pout, nout], out_tid)?;
        ctx.advance(DrawState::Wired)?;

        let show = cell.show_pins;
        ctx.add_pin("in", &[input], show)?;
        ctx.add_pin("out", &[out], show)?;
        ctx.add_pin("en", &[en], show)?;
        if let Some(enb) = enb {
            ctx.add_pin("enb", &[enb], show)?;
        }
        ctx.add_pin("pout", &[pout], false)?;
        ctx.add_pin("nout", &[nout], false)?;
        ctx.add_pin("VDD", &[vdd], show)?;
        ctx.add_pin("VSS", &[vss], show)?;

        ctx.fill_space()?;
        ctx.set_sch_params(self.sch_params())
    }
}

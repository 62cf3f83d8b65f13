use crate::error::Result;
use crate::layout::floorplan::TrackKind;
use crate::layout::tracks::{TrackId, TrackLayer};
use crate::layout::{DrawState, LayoutCtx};

use super::Inv;

impl Inv {
    pub(crate) fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let params = &self.params;
        let cell = &params.cell;
        let seg = params.seg;
        let tr = cell.tr_manager()?;

        let (vss_tid, vdd_tid) = ctx.setup_floorplan(
            &cell.config,
            cell.row_layout_info.as_ref(),
            Inv::num_cols(seg, params.stack),
            tr.get_width(TrackLayer::Hm, "sup"),
        )?;
        let res = ctx.resolver(&tr)?;
        let in_tid = match params.sig_locs.in_ {
            Some(idx) => res.at(idx, "in"),
            None => res.placed(0, TrackKind::G, "in")?,
        };
        let pout_tid = match params.sig_locs.pout {
            Some(idx) => res.at(idx, "out"),
            None => res.placed(1, TrackKind::Gb, "out")?,
        };
        let nout_tid = match params.sig_locs.nout {
            Some(idx) => res.at(idx, "out"),
            None => res.placed(0, TrackKind::Gb, "out")?,
        };

        let pmos = ctx.add_mos(1, 0, seg, self.wp, params.stack)?;
        let nmos = ctx.add_mos(0, 0, seg, self.wn, params.stack)?;
        ctx.advance(DrawState::Placed)?;

        let gates = if params.stack {
            vec![
                pmos.get("g0")?,
                pmos.get("g1")?,
                nmos.get("g0")?,
                nmos.get("g1")?,
            ]
        } else {
            vec![pmos.get("g")?, nmos.get("g")?]
        };
        let input = ctx.connect_terms(&gates, in_tid)?;
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
        ctx.add_pin("pout", &[pout], false)?;
        ctx.add_pin("nout", &[nout], false)?;
        ctx.add_pin("VDD", &[vdd], show)?;
        ctx.add_pin("VSS", &[vss], show)?;

        ctx.fill_space()?;
        ctx.set_sch_params(self.sch_params())
    }
}

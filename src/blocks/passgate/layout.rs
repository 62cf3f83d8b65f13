use crate::error::Result;
use crate::layout::floorplan::TrackKind;
use crate::layout::geom::HalfInt;
use crate::layout::tracks::{TrackId, TrackLayer};
use crate::layout::{DrawState, LayoutCtx};

use super::Passgate;

impl Passgate {
    pub(crate) fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let params = &self.params;
        let cell = &params.cell;
        let seg = params.seg;
        let tr = cell.tr_manager()?;

        let (vss_tid, vdd_tid) = ctx.setup_floorplan(
            &cell.config,
            cell.row_layout_info.as_ref(),
            seg,
            tr.get_width(TrackLayer::Hm, "sup"),
        )?;
        let res = ctx.resolver(&tr)?;
        let ng_tid = match params.sig_locs.en {
            Some(idx) => res.at(idx, "en"),
            None => res.track_id(0, TrackKind::G, HalfInt::new(-1), "en")?,
        };
        let pg_tid = match params.sig_locs.enb {
            Some(idx) => res.at(idx, "en"),
            None => res.track_id(1, TrackKind::G, HalfInt::new(-1), "en")?,
        };
        let s_tid = res.at(
            ctx.grid().get_middle_track(pg_tid.index, ng_tid.index),
            "in",
        );
        let nd_tid = res.track_id(0, TrackKind::Gb, HalfInt::new(0), "out")?;
        let pd_tid = res.track_id(1, TrackKind::Gb, HalfInt::new(0), "out")?;

        let nmos = ctx.add_mos(0, 0, seg, self.wn, false)?;
        let pmos = if params.pmos_switch {
            Some(ctx.add_mos(1, 0, seg, self.wp, false)?)
        } else {
            None
        };
        ctx.advance(DrawState::Placed)?;

        let mut sources = vec![nmos.get("s")?];
        if let Some(pmos) = pmos.as_ref() {
            sources.push(pmos.get("s")?);
        }
        let s = ctx.connect_terms(&sources, s_tid)?;
        let en = ctx.connect_terms(&[nmos.get("g")?], ng_tid)?;
        let nd = ctx.connect_terms(&[nmos.get("d")?], nd_tid)?;
        let (enb, pd) = match pmos.as_ref() {
            Some(pmos) => (
                Some(ctx.connect_terms(&[pmos.get("g")?], pg_tid)?),
                Some(ctx.connect_terms(&[pmos.get("d")?], pd_tid)?),
            ),
            None => (None, None),
        };

        let vm = ctx.vm_layer();
        let d_idx = ctx
            .grid()
            .coord_to_track(vm, ctx.grid().col_to_coord(seg / 2))?;
        let d_tid = TrackId::new(vm, d_idx, tr.get_width(TrackLayer::Vm, "out"));
        let drains: Vec<_> = pd.into_iter().chain(std::iter::once(nd)).collect();
        let d = ctx.connect_to_tracks(&drains, d_tid)?;

        let bounds = ctx.bounds()?;
        let vdd = ctx.add_wire(vdd_tid, bounds.lo(), bounds.hi())?;
        let vss = ctx.add_wire(vss_tid, bounds.lo(), bounds.hi())?;
        ctx.advance(DrawState::Wired)?;

        let show = cell.show_pins;
        ctx.add_pin("s", &[s], show)?;
        ctx.add_pin("d", &[d], show)?;
        ctx.add_pin("en", &[en], show)?;
        ctx.add_pin("nd", &[nd], false)?;
        if let Some(enb) = enb {
            ctx.add_pin("enb", &[enb], show)?;
        }
        if let Some(pd) = pd {
            ctx.add_pin("pd", &[pd], false)?;
        }
        ctx.add_pin("VDD", &[vdd], show)?;
        ctx.add_pin("VSS", &[vss], show)?;

        ctx.fill_space()?;
        ctx.set_sch_params(self.sch_params())
    }
}

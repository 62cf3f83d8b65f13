use crate::blocks::latch::{LatchCk2, LatchParams};
use crate::blocks::{merge_supplies, SigLocs, BLK_SP};
use crate::error::Result;
use crate::layout::{DrawState, LayoutCtx};
use crate::sizing::{stage_seg, StageRole};

use super::DffCk2;

impl DffCk2 {
    pub(crate) fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let params = &self.params;
        let info = params.cell.row_layout_info()?;
        let sub = params.cell.hidden(&info);

        let latch_params = |seg: usize, sig_locs: SigLocs| LatchParams {
            cell: sub.clone(),
            seg,
            wp: Some(self.wp),
            wn: Some(self.wn),
            sig_locs,
        };

        let slave = ctx.instantiate::<LatchCk2>(&latch_params(
            params.seg,
            SigLocs {
                clk: params.sig_locs.clk,
                clkb: params.sig_locs.clkb,
                ..Default::default()
            },
        ))?;
        let seg_t0 = slave.sch_params().tree("seg_dict")?.int("nt0")? as usize;
        let seg_m = stage_seg(seg_t0, StageRole::Input);
        ctx.advance(DrawState::SubmastersBuilt)?;
        ctx.initialize(info)?;

        let master = ctx.instantiate::<LatchCk2>(&latch_params(
            seg_m,
            SigLocs {
                in_: params.sig_locs.in_,
                clk: Some(slave.pin_track("clkb")?.index),
                clkb: Some(slave.pin_track("clk")?.index),
                ..Default::default()
            },
        ))?;
        ctx.advance(DrawState::SubmastersRebuilt)?;

        let m_cols = master.num_cols();
        ctx.set_size(m_cols + slave.num_cols() + BLK_SP)?;
        let m = ctx.add_instance(&master, 0)?;
        let s = ctx.add_instance(&slave, m_cols + BLK_SP)?;
        ctx.advance(DrawState::Placed)?;

        let clk = ctx.connect_wires(&[m.get_pin("clkb")?, s.get_pin("clk")?])?;
        let clkb = ctx.connect_wires(&[m.get_pin("clk")?, s.get_pin("clkb")?])?;
        ctx.connect_to_track_wires(&[m.get_pin("out")?], &[s.get_pin("in")?])?;
        ctx.advance(DrawState::Wired)?;

        let show = params.cell.show_pins;
        ctx.add_pin("in", &[m.get_pin("in")?], show)?;
        ctx.add_pin("out", &[s.get_pin("out")?], show)?;
        ctx.add_pin("clk", &[clk], show)?;
        ctx.add_pin("clkb", &[clkb], show)?;
        merge_supplies(ctx, &[&m, &s], show)?;

        ctx.fill_space()?;
        let sch = params
            .cell
            .device_sch(self.wp, self.wn)
            .compose("seg_m", master.sch_params().tree("seg_dict")?)
            .compose("seg_s", slave.sch_params().tree("seg_dict")?);
        ctx.set_sch_params(sch)
    }
}

use itertools::Itertools;

use crate::blocks::inv::{InvChain, InvChainParams};
use crate::blocks::mux::{Mux, MuxParams};
use crate::blocks::{merge_supplies, SigLocs, BLK_SP};
use crate::error::Result;
use crate::layout::{DrawState, LayoutCtx};
use crate::sch::SchParams;

use super::{DelayCellMux, DelayCellMuxParams, DelayLineMux};

impl DelayCellMux {
    pub(crate) fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let params = &self.params;
        let info = params.cell.row_layout_info()?;
        let sub = params.cell.hidden(&info);

        let mux = ctx.instantiate::<Mux>(&MuxParams {
            cell: sub.clone(),
            seg: params.seg,
            seg_inv: None,
            wp: Some(self.wp),
            wn: Some(self.wn),
            sig_locs: SigLocs::default(),
        })?;
        ctx.advance(DrawState::SubmastersBuilt)?;
        ctx.initialize(mux.row_layout_info().clone())?;

        let chain = ctx.instantiate::<InvChain>(&InvChainParams {
            cell: sub,
            seg_list: params.delay_seg_list.clone(),
            wp_list: vec![self.wp; 2],
            wn_list: vec![self.wn; 2],
            stack_list: vec![true, false],
            sig_locs: SigLocs {
                in_: Some(mux.pin_track("in0")?.index),
                mid: Some(mux.pin_track("sel")?.index),
                ..Default::default()
            },
        })?;
        ctx.advance(DrawState::SubmastersRebuilt)?;

        let chain_cols = chain.num_cols();
        ctx.set_size(chain_cols + mux.num_cols() + BLK_SP)?;
        let chain = ctx.add_instance(&chain, 0)?;
        let mux = ctx.add_instance(&mux, chain_cols + BLK_SP)?;
        ctx.advance(DrawState::Placed)?;

        ctx.connect_to_track_wires(&[chain.get_pin("out")?], &[mux.get_pin("in1")?])?;
        let input = ctx.connect_wires(&[chain.get_pin("in")?, mux.get_pin("in0")?])?;
        ctx.advance(DrawState::Wired)?;

        let show = params.cell.show_pins;
        ctx.add_pin("in", &[input], show)?;
        ctx.add_pin("out", &[mux.get_pin("out")?], show)?;
        ctx.add_pin("delay", &[mux.get_pin("sel")?], show)?;
        merge_supplies(ctx, &[&chain, &mux], show)?;

        ctx.fill_space()?;
        ctx.set_sch_params(
            SchParams::new()
                .compose("buf_params", chain.master().sch_params())
                .compose("mux_params", mux.master().sch_params()),
        )
    }
}

impl DelayLineMux {
    pub(crate) fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let params = &self.params;
        let num = params.num;
        let cell_params = &params.cell;
        let info = cell_params.cell.row_layout_info()?;

        let cell = ctx.instantiate::<DelayCellMux>(&DelayCellMuxParams {
            cell: cell_params.cell.hidden(&info),
            ..cell_params.clone()
        })?;
        ctx.advance(DrawState::SubmastersBuilt)?;
        ctx.initialize(cell.row_layout_info().clone())?;

        let pitch = cell.num_cols() + BLK_SP;
        ctx.set_size(num * pitch - BLK_SP)?;
        let insts = (0..num)
            .map(|i| ctx.add_instance(&cell, i * pitch))
            .collect::<Result<Vec<_>>>()?;
        ctx.advance(DrawState::Placed)?;

        for (a, b) in insts.iter().tuple_windows() {
            ctx.connect_to_track_wires(&[a.get_pin("out")?], &[b.get_pin("in")?])?;
        }
        ctx.advance(DrawState::Wired)?;

        let show = cell_params.cell.show_pins;
        ctx.add_pin("in", &[insts[0].get_pin("in")?], show)?;
        ctx.add_pin("out", &[insts[num - 1].get_pin("out")?], show)?;
        for (i, inst) in insts.iter().enumerate() {
            ctx.add_pin(&format!("delay<{i}>"), &[inst.get_pin("delay")?], show)?;
        }
        merge_supplies(ctx, &insts.iter().collect_vec(), show)?;

        ctx.fill_space()?;
        ctx.set_sch_params(
            SchParams::new()
                .with("num", num)
                .compose("cell_params", cell.sch_params()),
        )
    }
}

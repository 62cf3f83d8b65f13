//! Mux-based programmable delay cells and the lines built from them.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::config_err;
use crate::data::GenCtx;
use crate::error::Result;
use crate::layout::LayoutCtx;

use super::StdCellParams;

pub mod layout;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DelayCellMuxParams {
    #[serde(flatten)]
    pub cell: StdCellParams,
    /// Segments of the output mux.
    pub seg: usize,
    /// Segments of the two delay inverters; the first one is stacked.
    pub delay_seg_list: Vec<usize>,
    #[serde(default)]
    pub wp: Option<i64>,
    #[serde(default)]
    pub wn: Option<i64>,
}

impl DelayCellMuxParams {
    pub fn new(seg: usize, delay_seg_list: Vec<usize>) -> Self {
        Self {
            cell: StdCellParams::default(),
            seg,
            delay_seg_list,
            wp: None,
            wn: None,
        }
    }
}

/// One delay stage: `delay` selects between the input and the input delayed
/// by two inverters.
pub struct DelayCellMux {
    params: DelayCellMuxParams,
    wp: i64,
    wn: i64,
}

impl Component for DelayCellMux {
    type Params = DelayCellMuxParams;

    fn new(params: &Self::Params, _ctx: &GenCtx) -> Result<Self> {
        if params.delay_seg_list.len() != 2 {
            return Err(config_err!(
                "delay_seg_list must have two entries, got {:?}",
                params.delay_seg_list
            ));
        }
        let (wp, wn) = params.cell.widths(params.wp, params.wn)?;
        Ok(Self {
            params: params.clone(),
            wp,
            wn,
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::format!("delay_cell_mux_{}x", self.params.seg)
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        self.layout(ctx)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DelayLineMuxParams {
    /// Number of delay cells.
    pub num: usize,
    #[serde(flatten)]
    pub cell: DelayCellMuxParams,
}

pub struct DelayLineMux {
    params: DelayLineMuxParams,
}

impl Component for DelayLineMux {
    type Params = DelayLineMuxParams;

    fn new(params: &Self::Params, _ctx: &GenCtx) -> Result<Self> {
        if params.num == 0 {
            return Err(config_err!("delay line needs at least one cell, got num = 0"));
        }
        Ok(Self {
            params: params.clone(),
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::format!("delay_line_mux_{}x{}", self.params.num, self.params.cell.seg)
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        self.layout(ctx)
    }
}

#[cfg(test)]
mod tests {
    use crate::blocks::inv::{InvChain, InvChainParams};
    use crate::blocks::mux::{Mux, MuxParams};
    use crate::blocks::BLK_SP;
    use crate::layout::geom::HalfInt;
    use crate::tests::gen_ctx;

    use super::*;

    #[test]
    fn test_delay_cell() {
        let mut ctx = gen_ctx();
        let cell = ctx
            .instantiate::<DelayCellMux>(&DelayCellMuxParams::new(2, vec![1, 2]))
            .unwrap();
        assert_eq!(cell.cell_name().as_str(), "delay_cell_mux_2x");
        let mux = ctx.instantiate::<Mux>(&MuxParams::new(2)).unwrap();
        let chain = ctx
            .instantiate::<InvChain>(&InvChainParams {
                stack_list: vec![true, false],
                ..InvChainParams::new(vec![1, 2])
            })
            .unwrap();
        assert_eq!(cell.num_cols(), chain.num_cols() + mux.num_cols() + BLK_SP);

        for pin in ["in", "out", "delay", "VDD", "VSS"] {
            assert!(cell.has_pin(pin), "missing {pin}");
        }
        assert_eq!(cell.pin_track("in").unwrap().index, HalfInt::new(5));
        assert_eq!(cell.pin_track("delay").unwrap().index, HalfInt::new(3));
        assert_ne!(cell.pin_net("in").unwrap(), cell.pin_net("out").unwrap());

        let sch = cell.sch_params();
        let buf = sch.tree("buf_params").unwrap();
        assert_eq!(buf.list("stack_list").unwrap().len(), 2);
        assert_eq!(sch.tree("mux_params").unwrap(), mux.sch_params());
    }

    #[test]
    fn test_delay_cell_rejects_bad_list() {
        let mut ctx = gen_ctx();
        let err = ctx
            .instantiate::<DelayCellMux>(&DelayCellMuxParams::new(2, vec![1, 2, 3]))
            .unwrap_err();
        assert!(err.to_string().contains("[1, 2, 3]"));
    }

    #[test]
    fn test_delay_line() {
        let mut ctx = gen_ctx();
        let params = DelayLineMuxParams {
            num: 3,
            cell: DelayCellMuxParams::new(2, vec![2, 2]),
        };
        let line = ctx.instantiate::<DelayLineMux>(&params).unwrap();
        let spans: Vec<_> = line.instances().iter().map(|i| i.span).collect();
        assert_eq!(spans.len(), 3);
        assert!(line.instances().iter().all(|i| i.master == line.instances()[0].master));
        for pair in spans.windows(2) {
            assert_eq!(pair[0].gap_to(&pair[1]), Some(BLK_SP));
        }
        for i in 0..3 {
            assert!(line.has_pin(&format!("delay<{i}>")));
        }
        let delays: Vec<_> = (0..3)
            .map(|i| line.pin_net(&format!("delay<{i}>")).unwrap())
            .collect();
        assert_ne!(delays[0], delays[1]);
        assert_eq!(line.sch_params().int("num").unwrap(), 3);

        let err = ctx.instantiate::<DelayLineMux>(&DelayLineMuxParams { num: 0, ..params });
        assert!(err.is_err());
    }
}

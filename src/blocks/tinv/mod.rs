use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::config_err;
use crate::data::GenCtx;
use crate::error::Result;
use crate::layout::LayoutCtx;

use super::{SigLocs, StdCellParams};

pub mod layout;
pub mod schematic;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TinvParams {
    #[serde(flatten)]
    pub cell: StdCellParams,
    pub seg: usize,
    #[serde(default)]
    pub wp: Option<i64>,
    #[serde(default)]
    pub wn: Option<i64>,
    /// Draw the PMOS enable device; `false` gives the pass-zero variant.
    #[serde(default = "pmos_switch_default")]
    pub pmos_switch: bool,
    #[serde(default)]
    pub sig_locs: SigLocs,
}

fn pmos_switch_default() -> bool {
    true
}

impl TinvParams {
    pub fn new(seg: usize) -> Self {
        Self {
            cell: StdCellParams::default(),
            seg,
            wp: None,
            wn: None,
            pmos_switch: true,
            sig_locs: SigLocs::default(),
        }
    }
}

/// Tristate inverter built from stacked devices.
pub struct Tinv {
    params: TinvParams,
    wp: i64,
    wn: i64,
}

impl Component for Tinv {
    type Params = TinvParams;

    fn new(params: &Self::Params, _ctx: &GenCtx) -> Result<Self> {
        if params.seg == 0 || params.seg % 2 != 0 {
            return Err(config_err!(
                "tristate inverter needs a positive even seg, got seg = {}",
                params.seg
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
        if self.params.pmos_switch {
            arcstr::format!("inv_tristate_{}x", self.params.seg)
        } else {
            arcstr::format!("inv_tristate_pass0_{}x", self.params.seg)
        }
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        self.layout(ctx)
    }
}

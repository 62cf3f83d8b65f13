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
pub struct PassgateParams {
    #[serde(flatten)]
    pub cell: StdCellParams,
    pub seg: usize,
    #[serde(default)]
    pub wp: Option<i64>,
    #[serde(default)]
    pub wn: Option<i64>,
    /// Draw the PMOS half; `false` gives the NMOS-only pass-zero gate.
    #[serde(default = "pmos_switch_default")]
    pub pmos_switch: bool,
    /// `en` and `enb` move the gate tracks.
    #[serde(default)]
    pub sig_locs: SigLocs,
}

fn pmos_switch_default() -> bool {
    true
}

impl PassgateParams {
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

pub struct Passgate {
    params: PassgateParams,
    wp: i64,
    wn: i64,
}

impl Component for Passgate {
    type Params = PassgateParams;

    fn new(params: &Self::Params, _ctx: &GenCtx) -> Result<Self> {
        if params.seg == 0 || params.seg % 2 != 0 {
            return Err(config_err!(
                "pass gate needs a positive even seg, got seg = {}",
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
            arcstr::format!("passgate_{}x", self.params.seg)
        } else {
            arcstr::format!("passgate_pass0_{}x", self.params.seg)
        }
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        self.layout(ctx)
    }
}

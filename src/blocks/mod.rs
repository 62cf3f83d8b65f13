use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::floorplan::{LaygoConfig, MosKind, RowLayoutInfo};
use crate::layout::geom::HalfInt;
use crate::layout::tracks::{TrSpaces, TrWidths, TrackManager};
use crate::layout::{Instance, LayoutCtx, WireArray};
use crate::sch::SchParams;

pub mod delay_line;
pub mod dff;
pub mod inv;
pub mod latch;
pub mod mux;
pub mod passgate;
pub mod tinv;
pub mod wrapper;

/// Columns left empty between sibling blocks of a composite.
pub const BLK_SP: usize = 2;

/// Explicit horizontal track assignments forced onto a block.
///
/// Unset entries fall back to the block's own default.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SigLocs {
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub in_: Option<HalfInt>,
    /// Vertical output track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out: Option<HalfInt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pout: Option<HalfInt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nout: Option<HalfInt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<HalfInt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enb: Option<HalfInt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<HalfInt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clk: Option<HalfInt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clkb: Option<HalfInt>,
}

/// Parameters shared by every standard cell.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct StdCellParams {
    #[serde(default)]
    pub config: LaygoConfig,
    #[serde(default)]
    pub tr_widths: TrWidths,
    #[serde(default)]
    pub tr_spaces: TrSpaces,
    /// A floorplan to reuse instead of deriving one from `config`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_layout_info: Option<RowLayoutInfo>,
    #[serde(default = "show_pins_default")]
    pub show_pins: bool,
}

fn show_pins_default() -> bool {
    true
}

impl Default for StdCellParams {
    fn default() -> Self {
        Self {
            config: LaygoConfig::default(),
            tr_widths: TrWidths::new(),
            tr_spaces: TrSpaces::new(),
            row_layout_info: None,
            show_pins: true,
        }
    }
}

impl StdCellParams {
    pub fn tr_manager(&self) -> Result<TrackManager> {
        TrackManager::new(self.tr_widths.clone(), self.tr_spaces.clone())
    }

    pub fn row_layout_info(&self) -> Result<RowLayoutInfo> {
        match &self.row_layout_info {
            Some(info) => Ok(info.clone()),
            None => self.config.row_layout_info(),
        }
    }

    /// Resolves optional device widths, defaulting to the row maximums.
    pub fn widths(&self, wp: Option<i64>, wn: Option<i64>) -> Result<(i64, i64)> {
        let wp = wp.unwrap_or(self.config.wp);
        let wn = wn.unwrap_or(self.config.wn);
        self.config.check_widths(wp, wn)?;
        Ok((wp, wn))
    }

    /// Parameters for a sub-block drawn on `info` with its pins hidden.
    pub fn hidden(&self, info: &RowLayoutInfo) -> Self {
        Self {
            row_layout_info: Some(info.clone()),
            show_pins: false,
            ..self.clone()
        }
    }

    /// The device entries common to every schematic tree.
    pub fn device_sch(&self, wp: i64, wn: i64) -> SchParams {
        SchParams::new()
            .with("lch", self.config.lch)
            .with("wp", wp)
            .with("wn", wn)
            .with("thp", &self.config.thp)
            .with("thn", &self.config.thn)
    }

    /// One `{mos, w, th, num}` entry per row holding dummy columns.
    pub fn dummy_info(&self, ctx: &LayoutCtx, wp: i64, wn: i64) -> Result<Vec<SchParams>> {
        let info = ctx.row_info()?;
        Ok(info
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(row, ri)| {
                let num = ctx.dummy_cols(row);
                if num == 0 {
                    return None;
                }
                let w = match ri.kind {
                    MosKind::Nch => wn,
                    MosKind::Pch => wp,
                };
                Some(
                    SchParams::new()
                        .with("mos", ri.kind.to_string().as_str())
                        .with("w", w)
                        .with("th", self.config.threshold(ri.kind))
                        .with("num", num),
                )
            })
            .collect())
    }
}

/// Joins the `VDD` and `VSS` rails of `insts` and exports one pin of each.
pub(crate) fn merge_supplies(ctx: &mut LayoutCtx, insts: &[&Instance], show: bool) -> Result<()> {
    for name in ["VDD", "VSS"] {
        let mut rails: Vec<WireArray> = Vec::new();
        for inst in insts {
            rails.extend_from_slice(inst.get_all_pins(name)?);
        }
        let rail = ctx.connect_wires(&rails)?;
        ctx.add_pin(name, &[rail], show)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sig_locs_serde() {
        let locs = SigLocs {
            in_: Some(HalfInt::new(5)),
            en: Some(HalfInt::from_doubled(7)),
            ..Default::default()
        };
        let json = serde_json::to_value(locs).unwrap();
        assert_eq!(json, serde_json::json!({"in": 5, "en": 3.5}));
        let back: SigLocs = serde_json::from_value(json).unwrap();
        assert_eq!(back, locs);
    }

    #[test]
    fn test_widths_default_to_row_max() {
        let cell = StdCellParams::default();
        assert_eq!(cell.widths(None, None).unwrap(), (4, 4));
        assert_eq!(cell.widths(Some(2), None).unwrap(), (2, 4));
        let err = cell.widths(Some(5), Some(1)).unwrap_err();
        assert!(err.to_string().contains("wp = 5"));
    }

    #[test]
    fn test_params_from_empty_json() {
        let cell: StdCellParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cell, StdCellParams::default());
    }
}

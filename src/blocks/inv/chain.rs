//! Column-abutted chain of inverters.

use arcstr::ArcStr;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::blocks::{merge_supplies, SigLocs, StdCellParams};
use crate::component::Component;
use crate::config_err;
use crate::data::GenCtx;
use crate::error::Result;
use crate::layout::floorplan::TrackKind;
use crate::layout::{DrawState, LayoutCtx};
use crate::sch::SchParams;

use super::{Inv, InvParams};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct InvChainParams {
    #[serde(flatten)]
    pub cell: StdCellParams,
    pub seg_list: Vec<usize>,
    /// Per-stage PMOS widths; empty means the row maximum everywhere.
    #[serde(default)]
    pub wp_list: Vec<i64>,
    #[serde(default)]
    pub wn_list: Vec<i64>,
    #[serde(default)]
    pub stack_list: Vec<bool>,
    /// `in`, `mid` and `out` are honored.
    #[serde(default)]
    pub sig_locs: SigLocs,
}

impl InvChainParams {
    pub fn new(seg_list: Vec<usize>) -> Self {
        Self {
            cell: StdCellParams::default(),
            seg_list,
            wp_list: Vec::new(),
            wn_list: Vec::new(),
            stack_list: Vec::new(),
            sig_locs: SigLocs::default(),
        }
    }
}

pub struct InvChain {
    params: InvChainParams,
    wp_list: Vec<i64>,
    wn_list: Vec<i64>,
    stack_list: Vec<bool>,
}

fn expand<T: Copy>(list: &[T], n: usize, default: T, what: &str) -> Result<Vec<T>> {
    if list.is_empty() {
        Ok(vec![default; n])
    } else if list.len() == n {
        Ok(list.to_vec())
    } else {
        Err(config_err!(
            "{what} has {} entries but seg_list has {n}",
            list.len()
        ))
    }
}

impl Component for InvChain {
    type Params = InvChainParams;

    fn new(params: &Self::Params, _ctx: &GenCtx) -> Result<Self> {
        let n = params.seg_list.len();
        if n == 0 {
            return Err(config_err!("inverter chain needs at least one stage"));
        }
        let config = &params.cell.config;
        let wp_list = expand(&params.wp_list, n, config.wp, "wp_list")?;
        let wn_list = expand(&params.wn_list, n, config.wn, "wn_list")?;
        let stack_list = expand(&params.stack_list, n, false, "stack_list")?;
        for (&wp, &wn) in wp_list.iter().zip(wn_list.iter()) {
            config.check_widths(wp, wn)?;
        }
        if let Some(i) = params.seg_list.iter().position(|&s| s == 0) {
            return Err(config_err!("stage {i} of the inverter chain has zero segments"));
        }
        Ok(Self {
            params: params.clone(),
            wp_list,
            wn_list,
            stack_list,
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::format!("inv_chain_{}", self.params.seg_list.iter().join("_"))
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        self.layout(ctx)
    }
}

impl InvChain {
    fn stage_params(&self, cell: &StdCellParams, i: usize, sig_locs: SigLocs) -> InvParams {
        InvParams {
            cell: cell.clone(),
            seg: self.params.seg_list[i],
            wp: Some(self.wp_list[i]),
            wn: Some(self.wn_list[i]),
            stack: self.stack_list[i],
            sig_locs,
        }
    }

    pub(crate) fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let params = &self.params;
        let n = params.seg_list.len();
        let info = params.cell.row_layout_info()?;
        let sub = params.cell.hidden(&info);
        let tr = params.cell.tr_manager()?;

        let raw = ctx.instantiate::<Inv>(&self.stage_params(&sub, 0, SigLocs::default()))?;
        ctx.advance(DrawState::SubmastersBuilt)?;
        ctx.initialize(info)?;

        let res = ctx.resolver(&tr)?;
        let in_idx = match params.sig_locs.in_ {
            Some(idx) => idx,
            None => raw.pin_track("in")?.index,
        };
        let mid_idx = match params.sig_locs.mid {
            Some(idx) => idx,
            None => {
                res.first_free(0, TrackKind::G, "in", &[(res.at(in_idx, "in"), "in")])?
                    .index
            }
        };

        let mut masters = Vec::with_capacity(n);
        for i in 0..n {
            let sig_locs = SigLocs {
                in_: Some(if i % 2 == 0 { in_idx } else { mid_idx }),
                out: if i + 1 == n { params.sig_locs.out } else { None },
                ..Default::default()
            };
            masters.push(ctx.instantiate::<Inv>(&self.stage_params(&sub, i, sig_locs))?);
        }
        ctx.advance(DrawState::SubmastersRebuilt)?;

        ctx.set_size(masters.iter().map(|m| m.num_cols()).sum())?;
        let mut insts = Vec::with_capacity(n);
        let mut col = 0;
        for master in masters.iter() {
            insts.push(ctx.add_instance(master, col)?);
            col += master.num_cols();
        }
        ctx.advance(DrawState::Placed)?;

        for (a, b) in insts.iter().tuple_windows() {
            ctx.connect_to_track_wires(&[a.get_pin("out")?], &[b.get_pin("in")?])?;
        }
        ctx.advance(DrawState::Wired)?;

        let show = params.cell.show_pins;
        let first = &insts[0];
        let last = &insts[n - 1];
        ctx.add_pin("in", &[first.get_pin("in")?], show)?;
        ctx.add_pin("out", &[last.get_pin("out")?], show)?;
        merge_supplies(ctx, &insts.iter().collect_vec(), show)?;

        ctx.fill_space()?;
        let sch = self.sch_params(ctx)?;
        ctx.set_sch_params(sch)
    }

    fn sch_params(&self, ctx: &LayoutCtx) -> Result<SchParams> {
        let cell = &self.params.cell;
        let wp = self.wp_list.iter().copied().max().unwrap_or(cell.config.wp);
        let wn = self.wn_list.iter().copied().max().unwrap_or(cell.config.wn);
        Ok(SchParams::new()
            .with("lch", cell.config.lch)
            .with("wp_list", self.wp_list.clone())
            .with("wn_list", self.wn_list.clone())
            .with("thp", &cell.config.thp)
            .with("thn", &cell.config.thn)
            .with("segp_list", self.params.seg_list.clone())
            .with("segn_list", self.params.seg_list.clone())
            .with("stack_list", self.stack_list.clone())
            .with("dum_info", cell.dummy_info(ctx, wp, wn)?))
    }
}

#[cfg(test)]
mod tests {
    use crate::layout::geom::HalfInt;
    use crate::sch::SchValue;
    use crate::tests::gen_ctx;

    use super::*;

    #[test]
    fn test_chain_width_is_sum_of_stages() {
        let mut ctx = gen_ctx();
        let chain = ctx
            .instantiate::<InvChain>(&InvChainParams::new(vec![4, 4]))
            .unwrap();
        let inv = ctx.instantiate::<Inv>(&InvParams::new(4)).unwrap();
        assert_eq!(chain.num_cols(), 2 * inv.num_cols());
        assert_eq!(chain.instances().len(), 2);
        assert_eq!(chain.instances()[1].span.start, inv.num_cols());
    }

    #[test]
    fn test_chain_tracks_alternate() {
        let mut ctx = gen_ctx();
        let chain = ctx
            .instantiate::<InvChain>(&InvChainParams::new(vec![2, 2, 2]))
            .unwrap();
        assert_eq!(chain.pin_track("in").unwrap().index, HalfInt::new(5));
        assert_ne!(chain.pin_net("in").unwrap(), chain.pin_net("out").unwrap());
        assert_eq!(chain.pin("VDD").unwrap().wires.len(), 1);
        let sch = chain.sch_params();
        assert_eq!(
            sch.list("stack_list").unwrap(),
            vec![SchValue::Bool(false); 3].as_slice()
        );
        assert!(sch.list("dum_info").unwrap().is_empty());
    }

    #[test]
    fn test_chain_dummy_info() {
        let mut ctx = gen_ctx();
        let chain = ctx
            .instantiate::<InvChain>(&InvChainParams::new(vec![1, 2]))
            .unwrap();
        assert_eq!(chain.num_cols(), 4);
        let dum = chain.sch_params().list("dum_info").unwrap();
        assert_eq!(dum.len(), 2);
        match &dum[0] {
            SchValue::Tree(t) => {
                assert_eq!(t.get("mos"), Some(&"nch".into()));
                assert_eq!(t.int("num").unwrap(), 1);
            }
            other => panic!("unexpected dum_info entry {other:?}"),
        }
    }

    #[test]
    fn test_chain_list_length_mismatch() {
        let mut ctx = gen_ctx();
        let params = InvChainParams {
            wp_list: vec![4],
            ..InvChainParams::new(vec![2, 2])
        };
        let err = ctx.instantiate::<InvChain>(&params).unwrap_err();
        assert!(err.to_string().contains("wp_list"));
        assert!(ctx.instantiate::<InvChain>(&InvChainParams::new(vec![])).is_err());
    }
}

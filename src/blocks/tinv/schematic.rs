use crate::sch::SchParams;

use super::Tinv;

impl Tinv {
    pub(crate) fn sch_params(&self) -> SchParams {
        let p = &self.params;
        let mut sch = p
            .cell
            .device_sch(self.wp, self.wn)
            .with("segp", p.seg)
            .with("segn", p.seg)
            .with("segn_en", p.seg);
        if p.pmos_switch {
            sch.insert("segp_en", p.seg);
        }
        sch
    }
}

use crate::sch::SchParams;

use super::Passgate;

impl Passgate {
    pub(crate) fn sch_params(&self) -> SchParams {
        let p = &self.params;
        let mut sch = p.cell.device_sch(self.wp, self.wn).with("segn", p.seg);
        if p.pmos_switch {
            sch.insert("segp", p.seg);
        }
        sch
    }
}

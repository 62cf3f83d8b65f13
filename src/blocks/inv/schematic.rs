use crate::sch::SchParams;

use super::Inv;

impl Inv {
    pub(crate) fn sch_params(&self) -> SchParams {
        let p = &self.params;
        p.cell
            .device_sch(self.wp, self.wn)
            .with("segp", p.seg)
            .with("segn", p.seg)
            .with("stack", p.stack)
    }
}

use crate::sch::SchParams;

use super::Mux;

impl Mux {
    pub(crate) fn sch_params(&self) -> SchParams {
        let seg = self.params.seg;
        let seg_dict = SchParams::new()
            .with("pt0", seg)
            .with("nt0", seg)
            .with("pinv", self.seg_inv)
            .with("ninv", self.seg_inv);
        self.params
            .cell
            .device_sch(self.wp, self.wn)
            .with("seg_dict", seg_dict)
    }
}

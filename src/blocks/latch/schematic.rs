use crate::sch::SchParams;

use super::LatchCk2;

impl LatchCk2 {
    pub(crate) fn seg_dict(&self) -> SchParams {
        SchParams::new()
            .with("pt0", self.seg_t0)
            .with("nt0", self.seg_t0)
            .with("pt1", self.seg_t1)
            .with("nt1", self.seg_t1)
            .with("pinv", self.params.seg)
            .with("ninv", self.params.seg)
    }

    pub(crate) fn sch_params(&self) -> SchParams {
        self.params
            .cell
            .device_sch(self.wp, self.wn)
            .with("seg_dict", self.seg_dict())
    }
}

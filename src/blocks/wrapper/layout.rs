use crate::error::Result;
use crate::layout::{DrawState, LayoutCtx};

use super::StdCellWrapper;

impl StdCellWrapper {
    pub(crate) fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let gr = self.params.guard_ring_nf;
        let mut inner = self.params.params.clone();
        if let Some(obj) = inner.as_object_mut() {
            obj.insert("show_pins".to_string(), serde_json::Value::Bool(true));
        }

        let master = ctx.instantiate_kind(self.params.kind, &inner)?;
        ctx.advance(DrawState::SubmastersBuilt)?;
        ctx.initialize(master.row_layout_info().clone())?;
        ctx.set_size(master.num_cols() + 2 * gr)?;
        let inst = ctx.add_instance(&master, gr)?;
        ctx.advance(DrawState::Placed)?;

        for (name, pin) in master.pins() {
            ctx.add_pin(name, inst.get_all_pins(name)?, pin.show)?;
        }
        ctx.fill_space()?;
        ctx.set_sch_params(master.sch_params().clone())
    }
}

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::component::Component;
use crate::error::Result;
use crate::layout::{LayoutCtx, Master, RoutingGrid};
use crate::names::{allocate_name, CellNameRegistry, UsedNames};
use crate::tech::Tech;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct MasterKey {
    type_id: TypeId,
    params: String,
}

/// Generation context: the master cache and the cell name registry.
pub struct GenCtx {
    grid: RoutingGrid,
    names: Box<dyn CellNameRegistry>,
    masters: HashMap<MasterKey, Arc<Master>>,
    order: Vec<Arc<Master>>,
    keys: Vec<MasterKey>,
}

impl GenCtx {
    pub fn new(tech: Tech) -> Result<Self> {
        Self::with_registry(tech, Box::new(UsedNames::new()))
    }

    /// Uses an existing name registry, e.g. one shared with other libraries.
    pub fn with_registry(tech: Tech, names: Box<dyn CellNameRegistry>) -> Result<Self> {
        Ok(Self {
            grid: RoutingGrid::new(tech)?,
            names,
            masters: HashMap::new(),
            order: Vec::new(),
            keys: Vec::new(),
        })
    }

    #[inline]
    pub fn grid(&self) -> &RoutingGrid {
        &self.grid
    }

    #[inline]
    pub fn tech(&self) -> &Tech {
        self.grid.tech()
    }

    #[inline]
    pub fn names(&self) -> &dyn CellNameRegistry {
        self.names.as_ref()
    }

    /// Every master generated so far, in order of completion.
    #[inline]
    pub fn masters(&self) -> &[Arc<Master>] {
        &self.order
    }

    /// Returns the master of `T` for `params`, drawing it on first use.
    ///
    /// A failed draw leaves the cache and the name registry as they were
    /// before the call, including any sub-masters drawn along the way.
    pub fn instantiate<T: Component>(&mut self, params: &T::Params) -> Result<Arc<Master>> {
        let mark = self.order.len();
        let res = self.draw::<T>(params);
        if res.is_err() {
            self.rollback(mark);
        }
        res
    }

    fn draw<T: Component>(&mut self, params: &T::Params) -> Result<Arc<Master>> {
        let key = MasterKey {
            type_id: TypeId::of::<T>(),
            params: serde_json::to_string(params)?,
        };
        if let Some(master) = self.masters.get(&key) {
            return Ok(master.clone());
        }

        let component = T::new(params, self)?;
        let base = component.name();
        let mut ctx = LayoutCtx::new(self);
        component.layout(&mut ctx)?;
        let mut master = ctx.finish()?;
        master.cell_name = allocate_name(self.names.as_mut(), &base)?;
        debug!(
            "generated `{}` ({} columns)",
            master.cell_name, master.num_cols
        );

        let master = Arc::new(master);
        self.masters.insert(key.clone(), master.clone());
        self.order.push(master.clone());
        self.keys.push(key);
        Ok(master)
    }

    /// Drops every master generated after the first `mark` and frees their names.
    fn rollback(&mut self, mark: usize) {
        for (key, master) in self.keys.drain(mark..).zip(self.order.drain(mark..)) {
            debug!("discarding `{}`", master.cell_name());
            self.masters.remove(&key);
            self.names.release(master.cell_name());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::blocks::mux::{Mux, MuxParams};

    use super::*;
    use crate::tests::gen_ctx;

    #[test]
    fn test_failed_draw_discards_submasters() {
        let mut ctx = gen_ctx();
        let mut params = MuxParams::new(2);
        for row in params.cell.config.rows.iter_mut() {
            row.num_g = 2;
        }
        assert!(ctx.instantiate::<Mux>(&params).is_err());
        assert!(ctx.masters().is_empty());
        assert!(!ctx.names().contains("inv_tristate_2x"));

        let mux = ctx.instantiate::<Mux>(&MuxParams::new(2)).unwrap();
        assert_eq!(mux.cell_name().as_str(), "mux2_tristate_2x");
        assert!(ctx.names().contains("inv_tristate_2x"));
        assert_eq!(ctx.masters().len(), ctx.keys.len());
    }
}

use std::collections::BTreeMap;

use arcstr::ArcStr;
use serde::Serialize;

use crate::error::{GenError, Result};
use crate::layout::floorplan::{MosKind, RowLayoutInfo};
use crate::layout::geom::{ColSpan, Span};
use crate::layout::tracks::TrackId;
use crate::layout::wire::WireArray;
use crate::sch::SchParams;

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MasterWire {
    pub track: TrackId,
    pub span: Span,
    pub net: usize,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Pin {
    /// Indices into the master's wire list.
    pub wires: Vec<usize>,
    /// Whether pin geometry is drawn.
    pub show: bool,
}

/// One transistor placement.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MosInst {
    pub kind: MosKind,
    pub row: usize,
    pub span: ColSpan,
    pub seg: usize,
    pub stack: bool,
    pub w: i64,
    pub th: ArcStr,
    /// Finger groups; an odd segment count splits into an even group and one single finger.
    pub groups: Vec<usize>,
    /// Terminal name to net.
    pub terms: BTreeMap<ArcStr, usize>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct DummyFill {
    pub row: usize,
    pub span: ColSpan,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct InstRecord {
    pub master: ArcStr,
    pub span: ColSpan,
}

/// An immutable generated block.
#[derive(Debug, Clone, Serialize)]
pub struct Master {
    pub(crate) cell_name: ArcStr,
    pub(crate) num_cols: usize,
    pub(crate) row_info: RowLayoutInfo,
    pub(crate) wires: Vec<MasterWire>,
    pub(crate) pins: BTreeMap<ArcStr, Pin>,
    pub(crate) devices: Vec<MosInst>,
    pub(crate) dummies: Vec<DummyFill>,
    /// Dummy columns per row, including those of child instances.
    pub(crate) dummy_cols: Vec<usize>,
    pub(crate) instances: Vec<InstRecord>,
    pub(crate) sch_params: SchParams,
}

impl Master {
    #[inline]
    pub fn cell_name(&self) -> &ArcStr {
        &self.cell_name
    }

    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    #[inline]
    pub fn row_layout_info(&self) -> &RowLayoutInfo {
        &self.row_info
    }

    #[inline]
    pub fn sch_params(&self) -> &SchParams {
        &self.sch_params
    }

    #[inline]
    pub fn wires(&self) -> &[MasterWire] {
        &self.wires
    }

    #[inline]
    pub fn devices(&self) -> &[MosInst] {
        &self.devices
    }

    #[inline]
    pub fn dummies(&self) -> &[DummyFill] {
        &self.dummies
    }

    #[inline]
    pub fn instances(&self) -> &[InstRecord] {
        &self.instances
    }

    pub fn dummy_cols(&self, row: usize) -> usize {
        self.dummy_cols.get(row).copied().unwrap_or(0)
    }

    pub fn pins(&self) -> &BTreeMap<ArcStr, Pin> {
        &self.pins
    }

    pub fn has_pin(&self, name: &str) -> bool {
        self.pins.contains_key(name)
    }

    pub fn pin(&self, name: &str) -> Result<&Pin> {
        self.pins.get(name).ok_or_else(|| GenError::MissingPin {
            cell: self.cell_name.clone(),
            pin: ArcStr::from(name),
        })
    }

    /// The wires of a pin, with ids local to this master.
    pub fn pin_wires(&self, name: &str) -> Result<Vec<WireArray>> {
        Ok(self
            .pin(name)?
            .wires
            .iter()
            .map(|&id| WireArray {
                id,
                track: self.wires[id].track,
                span: self.wires[id].span,
            })
            .collect())
    }

    /// The track of the first wire of a pin.
    pub fn pin_track(&self, name: &str) -> Result<TrackId> {
        let pin = self.pin(name)?;
        let id = pin.wires.first().ok_or_else(|| {
            GenError::Geometry(format!("pin `{name}` of `{}` has no wires", self.cell_name))
        })?;
        Ok(self.wires[*id].track)
    }

    /// The net of a pin.
    pub fn pin_net(&self, name: &str) -> Result<usize> {
        let pin = self.pin(name)?;
        let id = pin.wires.first().ok_or_else(|| {
            GenError::Geometry(format!("pin `{name}` of `{}` has no wires", self.cell_name))
        })?;
        Ok(self.wires[*id].net)
    }
}

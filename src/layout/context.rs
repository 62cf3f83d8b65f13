use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use arcstr::ArcStr;
use itertools::Itertools;
use log::trace;

use crate::component::Component;
use crate::config_err;
use crate::data::GenCtx;
use crate::error::{GenError, Result};
use crate::layout::floorplan::{LaygoConfig, RowLayoutInfo};
use crate::layout::geom::{ColSpan, HalfInt, Span};
use crate::layout::grid::{Dir, RoutingGrid};
use crate::layout::master::{DummyFill, InstRecord, Master, MasterWire, MosInst, Pin};
use crate::layout::resolver::TrackResolver;
use crate::layout::state::DrawState;
use crate::layout::tracks::{TrackId, TrackManager};
use crate::layout::wire::{Nets, Terminal, WireArray, WireRecord};
use crate::registry::GeneratorKind;
use crate::sch::SchParams;

/// Terminals of one transistor placement.
///
/// Plain devices expose `s`, `d`, `g`. Stacked devices expose `s`, `d`, `g0`
/// (the gate next to the source), `g1` (the gate next to the drain) and `m`
/// (the internal node).
#[derive(Debug, Clone)]
pub struct MosPorts {
    terms: BTreeMap<&'static str, Terminal>,
}

impl MosPorts {
    pub fn get(&self, name: &str) -> Result<&Terminal> {
        self.terms.get(name).ok_or_else(|| GenError::MissingPin {
            cell: arcstr::literal!("mos"),
            pin: ArcStr::from(name),
        })
    }
}

/// A placed sub-master.
#[derive(Debug, Clone)]
pub struct Instance {
    master: Arc<Master>,
    span: ColSpan,
    pins: BTreeMap<ArcStr, Vec<WireArray>>,
}

impl Instance {
    #[inline]
    pub fn master(&self) -> &Arc<Master> {
        &self.master
    }

    #[inline]
    pub fn span(&self) -> ColSpan {
        self.span
    }

    pub fn get_all_pins(&self, name: &str) -> Result<&[WireArray]> {
        self.pins
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| GenError::MissingPin {
                cell: self.master.cell_name().clone(),
                pin: ArcStr::from(name),
            })
    }

    /// The first wire of a pin.
    pub fn get_pin(&self, name: &str) -> Result<WireArray> {
        self.get_all_pins(name)?.first().copied().ok_or_else(|| {
            GenError::Geometry(format!(
                "pin `{name}` of `{}` has no wires",
                self.master.cell_name()
            ))
        })
    }
}

/// Drawing context of a single master.
pub struct LayoutCtx<'a> {
    gen: &'a mut GenCtx,
    grid: RoutingGrid,
    state: DrawState,
    config: Option<LaygoConfig>,
    row_info: Option<RowLayoutInfo>,
    num_cols: Option<usize>,
    nets: Nets,
    wires: Vec<WireRecord>,
    pins: BTreeMap<ArcStr, Pin>,
    devices: Vec<MosInst>,
    instances: Vec<(Arc<Master>, ColSpan)>,
    dummies: Vec<DummyFill>,
    sch_params: Option<SchParams>,
}

impl<'a> LayoutCtx<'a> {
    pub(crate) fn new(gen: &'a mut GenCtx) -> Self {
        let grid = *gen.grid();
        Self {
            gen,
            grid,
            state: DrawState::default(),
            config: None,
            row_info: None,
            num_cols: None,
            nets: Nets::default(),
            wires: Vec::new(),
            pins: BTreeMap::new(),
            devices: Vec::new(),
            instances: Vec::new(),
            dummies: Vec::new(),
            sch_params: None,
        }
    }

    #[inline]
    pub fn grid(&self) -> &RoutingGrid {
        &self.grid
    }

    #[inline]
    pub fn hm_layer(&self) -> u32 {
        self.grid.hm_layer()
    }

    #[inline]
    pub fn vm_layer(&self) -> u32 {
        self.grid.vm_layer()
    }

    #[inline]
    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn advance(&mut self, next: DrawState) -> Result<()> {
        self.state = self.state.advance(next)?;
        trace!("draw state -> {:?}", self.state);
        Ok(())
    }

    pub fn instantiate<T: Component>(&mut self, params: &T::Params) -> Result<Arc<Master>> {
        self.gen.instantiate::<T>(params)
    }

    pub fn instantiate_kind(
        &mut self,
        kind: GeneratorKind,
        params: &serde_json::Value,
    ) -> Result<Arc<Master>> {
        crate::registry::generate(self.gen, kind, params)
    }

    /// Sets up a leaf floorplan and returns the VSS and VDD rail tracks.
    pub fn setup_floorplan(
        &mut self,
        config: &LaygoConfig,
        row_layout_info: Option<&RowLayoutInfo>,
        num_cols: usize,
        sup_width: u32,
    ) -> Result<(TrackId, TrackId)> {
        let info = match row_layout_info {
            Some(info) => info.clone(),
            None => config.row_layout_info()?,
        };
        let (vss, vdd) = info.supply_tracks()?;
        self.config = Some(config.clone());
        self.initialize(info)?;
        self.set_size(num_cols)?;
        let hm = self.hm_layer();
        Ok((
            TrackId::new(hm, vss, sup_width),
            TrackId::new(hm, vdd, sup_width),
        ))
    }

    /// Adopts a row layout; every block placed here must share it.
    pub fn initialize(&mut self, row_info: RowLayoutInfo) -> Result<()> {
        if self.row_info.is_some() {
            return Err(GenError::State("floorplan already set".to_string()));
        }
        self.row_info = Some(row_info);
        self.advance(DrawState::FloorplanSet)
    }

    pub fn set_size(&mut self, num_cols: usize) -> Result<()> {
        if num_cols == 0 {
            return Err(config_err!("cell must be at least one column wide"));
        }
        self.num_cols = Some(num_cols);
        Ok(())
    }

    pub fn row_info(&self) -> Result<&RowLayoutInfo> {
        self.row_info
            .as_ref()
            .ok_or_else(|| GenError::State("floorplan not set".to_string()))
    }

    pub fn num_cols(&self) -> Result<usize> {
        self.num_cols
            .ok_or_else(|| GenError::State("cell size not set".to_string()))
    }

    /// Horizontal extent of the cell.
    pub fn bounds(&self) -> Result<Span> {
        Ok(Span::new(0, self.grid.col_to_coord(self.num_cols()?)))
    }

    pub fn resolver(&self, tr: &TrackManager) -> Result<TrackResolver> {
        Ok(TrackResolver::new(
            self.row_info()?.clone(),
            tr.clone(),
            self.hm_layer(),
        ))
    }

    /// Places `seg` fingers in `row` starting at column `col`.
    ///
    /// A stacked device uses two columns per finger.
    pub fn add_mos(
        &mut self,
        row: usize,
        col: usize,
        seg: usize,
        w: i64,
        stack: bool,
    ) -> Result<MosPorts> {
        if seg == 0 {
            return Err(config_err!("cannot place a device with zero segments"));
        }
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| GenError::State("leaf floorplan not set".to_string()))?;
        let kind = self.row_info()?.row(row)?.kind;
        if w < 0 || w > config.max_width(kind) {
            return Err(config_err!(
                "{kind} width {w} exceeds row maximum {}",
                config.max_width(kind)
            ));
        }
        let th = config.threshold(kind).clone();
        let ncols = if stack { 2 * seg } else { seg };
        let span = ColSpan::new(col, ncols);
        self.check_free(Some(row), span)?;

        let grid = self.grid;
        let bnd = |k: usize| grid.col_to_coord(col + k);
        let ctr = |k: usize| grid.col_center(col + k);

        let mut terms = BTreeMap::new();
        if stack {
            terms.insert(
                "s",
                (0..=seg).filter(|u| u % 2 == 0).map(|u| bnd(2 * u)).collect_vec(),
            );
            terms.insert(
                "d",
                (0..=seg).filter(|u| u % 2 == 1).map(|u| bnd(2 * u)).collect_vec(),
            );
            terms.insert("m", (0..seg).map(|u| bnd(2 * u + 1)).collect_vec());
            terms.insert("g0", (0..seg).map(|u| ctr(2 * u + u % 2)).collect_vec());
            terms.insert("g1", (0..seg).map(|u| ctr(2 * u + 1 - u % 2)).collect_vec());
        } else {
            terms.insert("s", (0..=seg).step_by(2).map(bnd).collect_vec());
            terms.insert("d", (1..=seg).step_by(2).map(bnd).collect_vec());
            terms.insert("g", (0..seg).map(ctr).collect_vec());
        }
        let terms: BTreeMap<&'static str, Terminal> = terms
            .into_iter()
            .map(|(name, xs)| {
                (
                    name,
                    Terminal {
                        net: self.nets.new_net(),
                        xs,
                    },
                )
            })
            .collect();

        let groups = if seg % 2 == 1 && seg > 1 {
            vec![seg - 1, 1]
        } else {
            vec![seg]
        };
        self.devices.push(MosInst {
            kind,
            row,
            span,
            seg,
            stack,
            w,
            th,
            groups,
            terms: terms
                .iter()
                .map(|(name, t)| (ArcStr::from(*name), t.net))
                .collect(),
        });
        Ok(MosPorts { terms })
    }

    /// Records every column not covered by a device or instance as dummy fill.
    pub fn fill_space(&mut self) -> Result<()> {
        let num_cols = self.num_cols()?;
        let nrows = self.row_info()?.rows().len();
        self.dummies.clear();
        for row in 0..nrows {
            let mut used = vec![false; num_cols];
            let spans = self
                .devices
                .iter()
                .filter(|d| d.row == row)
                .map(|d| d.span)
                .chain(self.instances.iter().map(|(_, s)| *s));
            for span in spans {
                for c in span.start..span.stop().min(num_cols) {
                    used[c] = true;
                }
            }
            for (taken, group) in &used.iter().enumerate().group_by(|(_, u)| **u) {
                if taken {
                    continue;
                }
                let cols = group.map(|(c, _)| c).collect_vec();
                self.dummies.push(DummyFill {
                    row,
                    span: ColSpan::new(cols[0], cols.len()),
                });
            }
        }
        Ok(())
    }

    /// Number of dummy columns recorded so far in `row`, including those of child instances.
    pub fn dummy_cols(&self, row: usize) -> usize {
        self.dummies
            .iter()
            .filter(|d| d.row == row)
            .map(|d| d.span.width)
            .sum::<usize>()
            + self
                .instances
                .iter()
                .map(|(m, _)| m.dummy_cols(row))
                .sum::<usize>()
    }

    fn check_free(&self, row: Option<usize>, span: ColSpan) -> Result<()> {
        let num_cols = self.num_cols()?;
        if span.stop() > num_cols {
            return Err(GenError::ColumnOverlap(format!(
                "columns [{}, {}) exceed the cell width of {num_cols}",
                span.start,
                span.stop()
            )));
        }
        for d in self.devices.iter() {
            if row.map_or(true, |r| r == d.row) && d.span.overlaps(&span) {
                return Err(GenError::ColumnOverlap(format!(
                    "columns [{}, {}) overlap a device at [{}, {}) in row {}",
                    span.start,
                    span.stop(),
                    d.span.start,
                    d.span.stop(),
                    d.row
                )));
            }
        }
        for (m, s) in self.instances.iter() {
            if s.overlaps(&span) {
                return Err(GenError::ColumnOverlap(format!(
                    "columns [{}, {}) overlap instance `{}` at [{}, {})",
                    span.start,
                    span.stop(),
                    m.cell_name(),
                    s.start,
                    s.stop()
                )));
            }
        }
        Ok(())
    }

    fn record(&self, warr: &WireArray) -> Result<WireRecord> {
        match self.wires.get(warr.id) {
            Some(rec) if rec.track == warr.track => Ok(*rec),
            _ => Err(GenError::Geometry(format!(
                "wire on {} does not belong to this cell",
                warr.track
            ))),
        }
    }

    fn snapshot(&self, id: usize) -> WireArray {
        WireArray {
            id,
            track: self.wires[id].track,
            span: self.wires[id].span,
        }
    }

    fn push_wire(&mut self, track: TrackId, span: Span, net: usize) -> WireArray {
        let id = self.wires.len();
        self.wires.push(WireRecord { track, span, net });
        self.snapshot(id)
    }

    /// Draws a wire on `tid` spanning `[lower, upper]`, on a fresh net.
    pub fn add_wire(&mut self, tid: TrackId, lower: i64, upper: i64) -> Result<WireArray> {
        self.grid.dir(tid.layer)?;
        let net = self.nets.new_net();
        Ok(self.push_wire(tid, Span::new(lower, upper), net))
    }

    /// Connects transistor terminals to a horizontal track.
    pub fn connect_terms(&mut self, terms: &[&Terminal], tid: TrackId) -> Result<WireArray> {
        if self.grid.dir(tid.layer)? != Dir::Horiz {
            return Err(GenError::Geometry(format!(
                "terminals connect to horizontal tracks only, not {tid}"
            )));
        }
        let span = Span::from_points(terms.iter().flat_map(|t| t.xs.iter().copied()))
            .ok_or_else(|| GenError::Geometry("no terminals to connect".to_string()))?;
        let half = self.grid.tech().col_pitch / 2;
        let span = Span::new(span.lo() - half, span.hi() + half).clamp(&self.bounds()?);
        let net = self.nets.new_net();
        for t in terms {
            self.nets.union(net, t.net);
        }
        Ok(self.push_wire(tid, span, net))
    }

    /// Connects terminals to a supply rail spanning the whole cell.
    pub fn connect_to_rail(&mut self, terms: &[&Terminal], tid: TrackId) -> Result<WireArray> {
        let warr = self.connect_terms(terms, tid)?;
        self.wires[warr.id].span = self.bounds()?;
        Ok(self.snapshot(warr.id))
    }

    /// Connects perpendicular wires with a new wire on `tid`.
    pub fn connect_to_tracks(&mut self, wires: &[WireArray], tid: TrackId) -> Result<WireArray> {
        let dir = self.grid.dir(tid.layer)?;
        let coord = self.grid.track_to_coord(tid.layer, tid.index)?;
        let mut points = Vec::with_capacity(wires.len());
        for w in wires {
            let rec = self.record(w)?;
            if self.grid.dir(rec.track.layer)? == dir {
                return Err(GenError::Geometry(format!(
                    "{} is parallel to {tid}",
                    rec.track
                )));
            }
            points.push(self.grid.track_to_coord(rec.track.layer, rec.track.index)?);
        }
        let span = Span::from_points(points.into_iter())
            .ok_or_else(|| GenError::Geometry("no wires to connect".to_string()))?;
        let net = self.nets.new_net();
        for w in wires {
            let rec = &mut self.wires[w.id];
            rec.span = rec.span.add_point(coord);
            let other = rec.net;
            self.nets.union(net, other);
        }
        Ok(self.push_wire(tid, span, net))
    }

    /// Extends `wires` and the perpendicular `targets` until each pair meets.
    pub fn connect_to_track_wires(
        &mut self,
        wires: &[WireArray],
        targets: &[WireArray],
    ) -> Result<()> {
        for t in targets {
            let trec = self.record(t)?;
            let tdir = self.grid.dir(trec.track.layer)?;
            let tcoord = self.grid.track_to_coord(trec.track.layer, trec.track.index)?;
            for w in wires {
                let wrec = self.record(w)?;
                if self.grid.dir(wrec.track.layer)? == tdir {
                    return Err(GenError::Geometry(format!(
                        "{} is parallel to {}",
                        wrec.track, trec.track
                    )));
                }
                let wcoord = self.grid.track_to_coord(wrec.track.layer, wrec.track.index)?;
                self.wires[t.id].span = self.wires[t.id].span.add_point(wcoord);
                self.wires[w.id].span = self.wires[w.id].span.add_point(tcoord);
                self.nets.union(trec.net, wrec.net);
            }
        }
        Ok(())
    }

    /// Joins wires on one track into a single wire spanning all of them.
    pub fn connect_wires(&mut self, wires: &[WireArray]) -> Result<WireArray> {
        let first = wires
            .first()
            .ok_or_else(|| GenError::Geometry("no wires to connect".to_string()))?;
        let head = self.record(first)?;
        let mut span = head.span;
        for w in wires.iter().skip(1) {
            let rec = self.record(w)?;
            if rec.track != head.track {
                return Err(GenError::Geometry(format!(
                    "cannot join wires on different tracks {} and {}",
                    head.track, rec.track
                )));
            }
            span = span.union(&rec.span);
            self.nets.union(head.net, rec.net);
        }
        self.wires[first.id].span = span;
        Ok(self.snapshot(first.id))
    }

    /// Exports `wires` as pin `name`; repeated calls add wires to the same pin.
    pub fn add_pin(&mut self, name: &str, wires: &[WireArray], show: bool) -> Result<()> {
        let first = wires.first().ok_or_else(|| {
            GenError::Geometry(format!("pin `{name}` must have at least one wire"))
        })?;
        let head = self.record(first)?;
        for w in wires.iter() {
            let rec = self.record(w)?;
            self.nets.union(head.net, rec.net);
        }
        let pin = self.pins.entry(ArcStr::from(name)).or_insert(Pin {
            wires: Vec::new(),
            show,
        });
        pin.show |= show;
        if let Some(&existing) = pin.wires.first() {
            let other = self.wires[existing].net;
            self.nets.union(head.net, other);
        }
        for w in wires {
            if !pin.wires.contains(&w.id) {
                pin.wires.push(w.id);
            }
        }
        Ok(())
    }

    /// Places `master` at column `col`, importing its wires and pins.
    pub fn add_instance(&mut self, master: &Arc<Master>, col: usize) -> Result<Instance> {
        if master.row_layout_info() != self.row_info()? {
            return Err(config_err!(
                "`{}` was drawn on a different row layout",
                master.cell_name()
            ));
        }
        let span = ColSpan::new(col, master.num_cols());
        self.check_free(None, span)?;

        let dx = self.grid.col_to_coord(col);
        let dvm = HalfInt::from_doubled(self.grid.col_to_vm_doubled(col));
        let base_id = self.wires.len();
        let mut net_map: HashMap<usize, usize> = HashMap::new();
        for mw in master.wires() {
            let net = *net_map
                .entry(mw.net)
                .or_insert_with(|| self.nets.new_net());
            let (track, wspan) = match self.grid.dir(mw.track.layer)? {
                Dir::Horiz => (mw.track, mw.span.translate(dx)),
                Dir::Vert => (
                    TrackId {
                        index: mw.track.index + dvm,
                        ..mw.track
                    },
                    mw.span,
                ),
            };
            self.wires.push(WireRecord {
                track,
                span: wspan,
                net,
            });
        }
        let pins = master
            .pins()
            .iter()
            .map(|(name, pin)| {
                (
                    name.clone(),
                    pin.wires
                        .iter()
                        .map(|&i| self.snapshot(base_id + i))
                        .collect_vec(),
                )
            })
            .collect();
        self.instances.push((master.clone(), span));
        Ok(Instance {
            master: master.clone(),
            span,
            pins,
        })
    }

    pub fn set_sch_params(&mut self, params: SchParams) -> Result<()> {
        self.sch_params = Some(params);
        self.advance(DrawState::ParamsFinalized)
    }

    fn check_wires(&mut self) -> Result<()> {
        let roots = (0..self.wires.len())
            .map(|i| {
                let net = self.wires[i].net;
                self.nets.find(net)
            })
            .collect_vec();
        for ((i, a), (j, b)) in self.wires.iter().enumerate().tuple_combinations() {
            if roots[i] != roots[j] && a.track.collides_with(&b.track) && a.span.intersects(&b.span)
            {
                return Err(GenError::TrackConflict {
                    layer: a.track.layer,
                    a: format!("{} {:?}", a.track, a.span),
                    b: format!("{} {:?}", b.track, b.span),
                });
            }
        }
        Ok(())
    }

    /// Validates the drawing and freezes it into an unnamed master.
    pub(crate) fn finish(mut self) -> Result<Master> {
        let row_info = self
            .row_info
            .take()
            .ok_or_else(|| GenError::State("floorplan never set".to_string()))?;
        let num_cols = self.num_cols()?;
        let sch_params = self
            .sch_params
            .take()
            .ok_or_else(|| GenError::State("schematic parameters never set".to_string()))?;
        self.check_wires()?;

        let dense = self.nets.compact();
        let nrows = row_info.rows().len();
        let dummy_cols = (0..nrows).map(|row| self.dummy_cols(row)).collect_vec();
        let wires = self
            .wires
            .iter()
            .map(|w| MasterWire {
                track: w.track,
                span: w.span,
                net: dense[w.net],
            })
            .collect();
        let devices = self
            .devices
            .into_iter()
            .map(|mut d| {
                for net in d.terms.values_mut() {
                    *net = dense[*net];
                }
                d
            })
            .collect();
        let instances = self
            .instances
            .iter()
            .map(|(m, span)| InstRecord {
                master: m.cell_name().clone(),
                span: *span,
            })
            .collect();

        Ok(Master {
            cell_name: ArcStr::default(),
            num_cols,
            row_info,
            wires,
            pins: self.pins,
            devices,
            dummies: self.dummies,
            dummy_cols,
            instances,
            sch_params,
        })
    }
}

//! Row-relative track selection for leaf and composite cells.

use crate::config_err;
use crate::error::Result;
use crate::layout::floorplan::{RowLayoutInfo, TrackKind};
use crate::layout::geom::HalfInt;
use crate::layout::tracks::{TrackId, TrackLayer, TrackManager};

/// Turns (row, track kind, ordinal, signal class) into concrete horizontal tracks.
#[derive(Debug, Clone)]
pub struct TrackResolver {
    info: RowLayoutInfo,
    tr: TrackManager,
    hm_layer: u32,
}

impl TrackResolver {
    pub fn new(info: RowLayoutInfo, tr: TrackManager, hm_layer: u32) -> Self {
        Self { info, tr, hm_layer }
    }

    #[inline]
    pub fn tr_manager(&self) -> &TrackManager {
        &self.tr
    }

    #[inline]
    pub fn row_info(&self) -> &RowLayoutInfo {
        &self.info
    }

    /// Width of signal class `class` on the horizontal layer.
    #[inline]
    pub fn width(&self, class: &str) -> u32 {
        self.tr.get_width(TrackLayer::Hm, class)
    }

    /// The track at `ord` of `kind` in `row`, sized for `class`.
    pub fn track_id(&self, row: usize, kind: TrackKind, ord: HalfInt, class: &str) -> Result<TrackId> {
        let index = self.info.get_track_index(row, kind, ord)?;
        Ok(TrackId::new(self.hm_layer, index, self.width(class)))
    }

    /// An explicit track index, sized for `class`.
    #[inline]
    pub fn at(&self, index: HalfInt, class: &str) -> TrackId {
        TrackId::new(self.hm_layer, index, self.width(class))
    }

    /// The default location of a lone `class` wire among the `kind` tracks of `row`.
    pub fn placed(&self, row: usize, kind: TrackKind, class: &str) -> Result<TrackId> {
        let (_, locs) = self.tr.place_wires(TrackLayer::Hm, &[class]);
        self.track_id(row, kind, locs[0], class)
    }

    /// A lone `class` wire aligned within the `kind` tracks of `row`.
    pub fn aligned(&self, row: usize, kind: TrackKind, class: &str, alignment: i32) -> Result<TrackId> {
        let ntr = self.info.num_tracks(row, kind)?;
        let locs = self.tr.align_wires(TrackLayer::Hm, &[class], ntr, alignment)?;
        self.track_id(row, kind, locs[0], class)
    }

    /// The first `kind` track of `row`, counting from the midline, that keeps
    /// clear of every track in `taken`.
    pub fn first_free(
        &self,
        row: usize,
        kind: TrackKind,
        class: &str,
        taken: &[(TrackId, &str)],
    ) -> Result<TrackId> {
        let ntr = self.info.num_tracks(row, kind)?;
        for ord in 0..ntr as i64 {
            let cand = self.track_id(row, kind, HalfInt::new(ord), class)?;
            let clear = taken.iter().all(|(t, tclass)| {
                let space = self
                    .tr
                    .get_space(TrackLayer::Hm, class)
                    .max(self.tr.get_space(TrackLayer::Hm, tclass));
                t.layer != cand.layer
                    || cand.index.abs_diff_doubled(t.index)
                        >= (t.width + cand.width) as i64 + space.doubled()
            });
            if clear {
                return Ok(cand);
            }
        }
        Err(config_err!(
            "no free `{kind}` track in row {row} for `{class}`"
        ))
    }
}

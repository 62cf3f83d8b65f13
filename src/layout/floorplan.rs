use std::fmt::{Display, Formatter};

use arcstr::ArcStr;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::config_err;
use crate::error::Result;
use crate::layout::geom::HalfInt;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MosKind {
    Nch,
    Pch,
}

impl Display for MosKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MosKind::Nch => write!(f, "nch"),
            MosKind::Pch => write!(f, "pch"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    R0,
    MX,
}

/// Horizontal track kinds reserved in each transistor row.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// Gate tracks.
    G,
    /// Gate-bar tracks, used for drain connections.
    Gb,
    /// Drain/source tracks, the outermost of which carries the supply.
    Ds,
}

impl Display for TrackKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackKind::G => write!(f, "g"),
            TrackKind::Gb => write!(f, "gb"),
            TrackKind::Ds => write!(f, "ds"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Builder, Serialize, Deserialize)]
pub struct RowSpec {
    pub kind: MosKind,
    pub orient: Orientation,
    #[builder(default = "3")]
    pub num_g: usize,
    #[builder(default = "2")]
    pub num_gb: usize,
    #[builder(default = "1")]
    pub num_ds: usize,
}

impl RowSpec {
    #[inline]
    pub fn builder() -> RowSpecBuilder {
        RowSpecBuilder::default()
    }
}

/// Two-row transistor floorplan policy shared by every standard cell.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct LaygoConfig {
    /// Channel length.
    #[builder(default = "16")]
    pub lch: i64,
    /// Maximum PMOS width.
    #[builder(default = "4")]
    pub wp: i64,
    /// Maximum NMOS width.
    #[builder(default = "4")]
    pub wn: i64,
    #[builder(default = "arcstr::literal!(\"standard\")")]
    pub thp: ArcStr,
    #[builder(default = "arcstr::literal!(\"standard\")")]
    pub thn: ArcStr,
    #[builder(default = "LaygoConfig::default_rows()")]
    pub rows: Vec<RowSpec>,
}

impl Default for LaygoConfig {
    fn default() -> Self {
        Self {
            lch: 16,
            wp: 4,
            wn: 4,
            thp: arcstr::literal!("standard"),
            thn: arcstr::literal!("standard"),
            rows: Self::default_rows(),
        }
    }
}

impl LaygoConfig {
    #[inline]
    pub fn builder() -> LaygoConfigBuilder {
        LaygoConfigBuilder::default()
    }

    pub fn default_rows() -> Vec<RowSpec> {
        vec![
            RowSpec {
                kind: MosKind::Nch,
                orient: Orientation::MX,
                num_g: 3,
                num_gb: 2,
                num_ds: 1,
            },
            RowSpec {
                kind: MosKind::Pch,
                orient: Orientation::R0,
                num_g: 3,
                num_gb: 2,
                num_ds: 1,
            },
        ]
    }

    /// Checks device widths against the row maximums.
    pub fn check_widths(&self, wp: i64, wn: i64) -> Result<()> {
        if wp < 0 || wp > self.wp || wn < 0 || wn > self.wn {
            return Err(config_err!(
                "invalid choice of wp = {wp} and/or wn = {wn} (row maximums are wp = {}, wn = {})",
                self.wp,
                self.wn
            ));
        }
        Ok(())
    }

    pub fn threshold(&self, kind: MosKind) -> &ArcStr {
        match kind {
            MosKind::Nch => &self.thn,
            MosKind::Pch => &self.thp,
        }
    }

    pub fn max_width(&self, kind: MosKind) -> i64 {
        match kind {
            MosKind::Nch => self.wn,
            MosKind::Pch => self.wp,
        }
    }

    /// Builds the track map of the two-row floorplan.
    pub fn row_layout_info(&self) -> Result<RowLayoutInfo> {
        if self.rows.len() != 2 {
            return Err(config_err!(
                "standard cells need exactly two rows, got {}",
                self.rows.len()
            ));
        }
        if self.rows[0].kind != MosKind::Nch || self.rows[1].kind != MosKind::Pch {
            return Err(config_err!(
                "row kinds must be [nch, pch], got [{}, {}]",
                self.rows[0].kind,
                self.rows[1].kind
            ));
        }
        if self.lch <= 0 || self.wp <= 0 || self.wn <= 0 {
            return Err(config_err!(
                "lch = {}, wp = {}, wn = {} must all be positive",
                self.lch,
                self.wp,
                self.wn
            ));
        }

        let mut rows = Vec::with_capacity(2);
        let mut base = 0;
        for (idx, spec) in self.rows.iter().enumerate() {
            if spec.num_ds == 0 {
                return Err(config_err!("row {idx} reserves no `ds` track for its supply"));
            }
            let row = RowInfo {
                kind: spec.kind,
                orient: spec.orient,
                base,
                num_g: spec.num_g,
                num_gb: spec.num_gb,
                num_ds: spec.num_ds,
            };
            base += row.height();
            rows.push(row);
        }
        Ok(RowLayoutInfo {
            rows,
            num_tracks: base,
        })
    }
}

/// Resolved track layout of one transistor row.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RowInfo {
    pub kind: MosKind,
    pub orient: Orientation,
    /// Index of the lowest horizontal track in the row.
    pub base: usize,
    pub num_g: usize,
    pub num_gb: usize,
    pub num_ds: usize,
}

impl RowInfo {
    pub fn num_tracks(&self, kind: TrackKind) -> usize {
        match kind {
            TrackKind::G => self.num_g,
            TrackKind::Gb => self.num_gb,
            TrackKind::Ds => self.num_ds,
        }
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.num_g + self.num_gb + self.num_ds
    }

    /// Offset of the lowest track of `kind` from the row base.
    fn kind_offset(&self, kind: TrackKind) -> usize {
        match (self.orient, kind) {
            (Orientation::R0, TrackKind::G) => 0,
            (Orientation::R0, TrackKind::Gb) => self.num_g,
            (Orientation::R0, TrackKind::Ds) => self.num_g + self.num_gb,
            (Orientation::MX, TrackKind::Ds) => 0,
            (Orientation::MX, TrackKind::Gb) => self.num_ds,
            (Orientation::MX, TrackKind::G) => self.num_ds + self.num_gb,
        }
    }
}

/// Track map of a two-row floorplan; shared by every block at one level.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RowLayoutInfo {
    rows: Vec<RowInfo>,
    num_tracks: usize,
}

impl RowLayoutInfo {
    #[inline]
    pub fn rows(&self) -> &[RowInfo] {
        &self.rows
    }

    #[inline]
    pub fn total_tracks(&self) -> usize {
        self.num_tracks
    }

    pub fn row(&self, row: usize) -> Result<&RowInfo> {
        self.rows
            .get(row)
            .ok_or_else(|| config_err!("row {row} does not exist"))
    }

    pub fn num_tracks(&self, row: usize, kind: TrackKind) -> Result<usize> {
        Ok(self.row(row)?.num_tracks(kind))
    }

    /// Absolute horizontal track index of ordinal `ord` of `kind` in `row`.
    ///
    /// Ordinal 0 is the track nearest the cell's horizontal midline; negative
    /// ordinals count back from the track farthest from it.
    pub fn get_track_index(&self, row: usize, kind: TrackKind, ord: HalfInt) -> Result<HalfInt> {
        let info = self.row(row)?;
        let n = info.num_tracks(kind) as i64;
        if n == 0 {
            return Err(config_err!("row {row} has no `{kind}` tracks"));
        }
        let ord = if ord.doubled() < 0 {
            ord + HalfInt::new(n)
        } else {
            ord
        };
        if ord.doubled() < 0 || ord.doubled() > 2 * (n - 1) {
            return Err(config_err!(
                "ordinal {ord} is out of range for the {n} `{kind}` tracks of row {row}"
            ));
        }
        let base = HalfInt::new((info.base + info.kind_offset(kind)) as i64);
        Ok(match info.orient {
            Orientation::R0 => base + ord,
            Orientation::MX => base + HalfInt::new(n - 1) - ord,
        })
    }

    /// The VSS and VDD rail indices: the outermost `ds` track of each row.
    pub fn supply_tracks(&self) -> Result<(HalfInt, HalfInt)> {
        Ok((
            self.get_track_index(0, TrackKind::Ds, HalfInt::new(-1))?,
            self.get_track_index(1, TrackKind::Ds, HalfInt::new(-1))?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_track_map() {
        let info = LaygoConfig::default().row_layout_info().unwrap();
        assert_eq!(info.total_tracks(), 12);
        let idx = |row, kind, ord| {
            info.get_track_index(row, kind, HalfInt::new(ord))
                .unwrap()
                .to_int()
                .unwrap()
        };
        assert_eq!(idx(0, TrackKind::G, 0), 5);
        assert_eq!(idx(0, TrackKind::G, -1), 3);
        assert_eq!(idx(0, TrackKind::Gb, 0), 2);
        assert_eq!(idx(1, TrackKind::G, 0), 6);
        assert_eq!(idx(1, TrackKind::G, -1), 8);
        assert_eq!(idx(1, TrackKind::Gb, 0), 9);
        let (vss, vdd) = info.supply_tracks().unwrap();
        assert_eq!((vss, vdd), (HalfInt::new(0), HalfInt::new(11)));
    }

    #[test]
    fn test_rejects_bad_rows() {
        let mut config = LaygoConfig::default();
        config.rows.pop();
        assert!(config.row_layout_info().is_err());

        let mut config = LaygoConfig::default();
        config.rows.swap(0, 1);
        assert!(config.row_layout_info().is_err());

        let mut config = LaygoConfig::default();
        config.rows[1].num_ds = 0;
        assert!(config.row_layout_info().is_err());
    }

    #[test]
    fn test_rejects_empty_kind() {
        let mut config = LaygoConfig::default();
        config.rows[0].num_gb = 0;
        let info = config.row_layout_info().unwrap();
        assert!(info
            .get_track_index(0, TrackKind::Gb, HalfInt::new(0))
            .is_err());
        assert!(info
            .get_track_index(0, TrackKind::G, HalfInt::new(3))
            .is_err());
        assert!(info
            .get_track_index(0, TrackKind::G, HalfInt::new(-4))
            .is_err());
    }

    #[test]
    fn test_width_check() {
        let config = LaygoConfig::builder().wp(6).build().unwrap();
        config.check_widths(6, 4).unwrap();
        assert!(config.check_widths(7, 4).is_err());
        assert!(config.check_widths(2, -1).is_err());
    }
}

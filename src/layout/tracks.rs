use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::config_err;
use crate::error::Result;
use crate::layout::geom::HalfInt;

/// A routing track: layer, center index, and width in tracks.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TrackId {
    pub layer: u32,
    pub index: HalfInt,
    pub width: u32,
}

impl TrackId {
    #[inline]
    pub fn new(layer: u32, index: HalfInt, width: u32) -> Self {
        Self {
            layer,
            index,
            width,
        }
    }

    /// Whether wires on `self` and `other` would physically touch.
    pub fn collides_with(&self, other: &TrackId) -> bool {
        self.layer == other.layer
            && self.index.abs_diff_doubled(other.index) < (self.width + other.width) as i64
    }
}

impl Display for TrackId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "M{}[{}]x{}", self.layer, self.index, self.width)
    }
}

/// The role of a routing layer, used to key track policies.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackLayer {
    Hm,
    Vm,
}

/// Track widths keyed by signal class, then layer.
pub type TrWidths = BTreeMap<ArcStr, BTreeMap<TrackLayer, u32>>;
/// Track spacings keyed by signal class, then layer.
pub type TrSpaces = BTreeMap<ArcStr, BTreeMap<TrackLayer, HalfInt>>;

/// Resolves widths and spacings of named signal classes.
///
/// Classes absent from the policy get width 1 and no extra spacing.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TrackManager {
    tr_widths: TrWidths,
    tr_spaces: TrSpaces,
}

impl TrackManager {
    pub fn new(tr_widths: TrWidths, tr_spaces: TrSpaces) -> Result<Self> {
        for (name, widths) in tr_widths.iter() {
            if let Some((layer, _)) = widths.iter().find(|(_, w)| **w == 0) {
                return Err(config_err!(
                    "track width of `{name}` on {layer:?} must be positive"
                ));
            }
        }
        for (name, spaces) in tr_spaces.iter() {
            if let Some((layer, sp)) = spaces.iter().find(|(_, sp)| sp.doubled() < 0) {
                return Err(config_err!(
                    "track space of `{name}` on {layer:?} is negative ({sp})"
                ));
            }
        }
        Ok(Self {
            tr_widths,
            tr_spaces,
        })
    }

    pub fn get_width(&self, layer: TrackLayer, name: &str) -> u32 {
        self.tr_widths
            .get(name)
            .and_then(|m| m.get(&layer))
            .copied()
            .unwrap_or(1)
    }

    pub fn get_space(&self, layer: TrackLayer, name: &str) -> HalfInt {
        self.tr_spaces
            .get(name)
            .and_then(|m| m.get(&layer))
            .copied()
            .unwrap_or_default()
    }

    /// Minimum doubled distance between the centers of two classes' tracks.
    pub fn min_separation(&self, layer: TrackLayer, a: &str, b: &str) -> i64 {
        let w = (self.get_width(layer, a) + self.get_width(layer, b)) as i64;
        let sp = self.get_space(layer, a).max(self.get_space(layer, b));
        w + sp.doubled()
    }

    /// Places the given classes bottom-to-top starting at track 0.
    ///
    /// Returns the number of tracks used and the center of each wire.
    pub fn place_wires(&self, layer: TrackLayer, names: &[&str]) -> (HalfInt, Vec<HalfInt>) {
        let mut locs = Vec::with_capacity(names.len());
        let mut cur = 0i64;
        let mut prev: Option<&str> = None;
        for name in names {
            let w = self.get_width(layer, name) as i64;
            if let Some(p) = prev {
                cur += self.get_space(layer, p).max(self.get_space(layer, name)).doubled();
            }
            // center of a width-w wire whose bottom edge is at `cur`
            locs.push(HalfInt::from_doubled(cur + w - 1));
            cur += 2 * w;
            prev = Some(name);
        }
        (HalfInt::from_doubled(cur), locs)
    }

    /// Places the given classes within `num_tracks` tracks.
    ///
    /// `alignment` is -1 to pack at the bottom, 0 to center, 1 to pack at the top.
    pub fn align_wires(
        &self,
        layer: TrackLayer,
        names: &[&str],
        num_tracks: usize,
        alignment: i32,
    ) -> Result<Vec<HalfInt>> {
        let (used, locs) = self.place_wires(layer, names);
        let avail = 2 * num_tracks as i64;
        if used.doubled() > avail {
            return Err(config_err!(
                "cannot fit {names:?} ({used} tracks) into {num_tracks} tracks"
            ));
        }
        let offset = match alignment {
            -1 => 0,
            0 => (avail - used.doubled()) / 4 * 2,
            1 => avail - used.doubled(),
            _ => return Err(config_err!("invalid alignment {alignment}")),
        };
        Ok(locs
            .into_iter()
            .map(|l| l + HalfInt::from_doubled(offset))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> TrackManager {
        let mut tr_widths = TrWidths::new();
        tr_widths.insert(
            arcstr::literal!("sup"),
            BTreeMap::from([(TrackLayer::Hm, 2), (TrackLayer::Vm, 1)]),
        );
        let mut tr_spaces = TrSpaces::new();
        tr_spaces.insert(
            arcstr::literal!("out"),
            BTreeMap::from([(TrackLayer::Hm, HalfInt::new(1))]),
        );
        TrackManager::new(tr_widths, tr_spaces).unwrap()
    }

    #[test]
    fn test_defaults() {
        let tr = manager();
        assert_eq!(tr.get_width(TrackLayer::Hm, "in"), 1);
        assert_eq!(tr.get_width(TrackLayer::Hm, "sup"), 2);
        assert_eq!(tr.get_space(TrackLayer::Vm, "out"), HalfInt::new(0));
        assert_eq!(tr.min_separation(TrackLayer::Hm, "in", "in"), 2);
        assert_eq!(tr.min_separation(TrackLayer::Hm, "in", "out"), 4);
    }

    #[test]
    fn test_place_wires() {
        let tr = manager();
        let (ntr, locs) = tr.place_wires(TrackLayer::Hm, &["in"]);
        assert_eq!(ntr, HalfInt::new(1));
        assert_eq!(locs, vec![HalfInt::new(0)]);

        let (ntr, locs) = tr.place_wires(TrackLayer::Hm, &["sup", "out", "in"]);
        assert_eq!(ntr, HalfInt::new(6));
        assert_eq!(
            locs,
            vec![HalfInt::from_doubled(1), HalfInt::new(3), HalfInt::new(5)]
        );
    }

    #[test]
    fn test_align_wires() {
        let tr = manager();
        assert_eq!(
            tr.align_wires(TrackLayer::Hm, &["en"], 3, 1).unwrap(),
            vec![HalfInt::new(2)]
        );
        assert_eq!(
            tr.align_wires(TrackLayer::Hm, &["en"], 3, -1).unwrap(),
            vec![HalfInt::new(0)]
        );
        assert_eq!(
            tr.align_wires(TrackLayer::Hm, &["en"], 3, 0).unwrap(),
            vec![HalfInt::new(1)]
        );
        assert!(tr.align_wires(TrackLayer::Hm, &["sup", "sup"], 3, 1).is_err());
    }

    #[test]
    fn test_rejects_zero_width() {
        let mut tr_widths = TrWidths::new();
        tr_widths.insert(arcstr::literal!("in"), BTreeMap::from([(TrackLayer::Hm, 0)]));
        assert!(TrackManager::new(tr_widths, TrSpaces::new()).is_err());
    }

    #[test]
    fn test_track_collision() {
        let a = TrackId::new(2, HalfInt::new(5), 1);
        assert!(a.collides_with(&TrackId::new(2, HalfInt::from_doubled(11), 1)));
        assert!(!a.collides_with(&TrackId::new(2, HalfInt::new(6), 1)));
        assert!(!a.collides_with(&TrackId::new(3, HalfInt::new(5), 1)));
        assert!(a.collides_with(&TrackId::new(2, HalfInt::new(6), 2)));
    }
}

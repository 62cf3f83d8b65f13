use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};
use crate::layout::geom::HalfInt;
use crate::tech::Tech;

/// Routing direction of a layer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Dir {
    Horiz,
    Vert,
}

/// Track-grid coordinate conversions.
///
/// Track `i` of a layer with pitch `p` is centered at `(i + 0.5) * p`, so
/// half-integer indices fall exactly on multiples of `p`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RoutingGrid {
    tech: Tech,
}

impl RoutingGrid {
    pub fn new(tech: Tech) -> Result<Self> {
        tech.validate()?;
        Ok(Self { tech })
    }

    #[inline]
    pub fn tech(&self) -> &Tech {
        &self.tech
    }

    #[inline]
    pub fn hm_layer(&self) -> u32 {
        self.tech.hm_layer()
    }

    #[inline]
    pub fn vm_layer(&self) -> u32 {
        self.tech.vm_layer()
    }

    pub fn dir(&self, layer: u32) -> Result<Dir> {
        if layer == self.hm_layer() {
            Ok(Dir::Horiz)
        } else if layer == self.vm_layer() {
            Ok(Dir::Vert)
        } else {
            Err(GenError::Geometry(format!("layer {layer} is not a routing layer")))
        }
    }

    pub fn pitch(&self, layer: u32) -> Result<i64> {
        Ok(match self.dir(layer)? {
            Dir::Horiz => self.tech.hm_pitch,
            Dir::Vert => self.tech.vm_pitch,
        })
    }

    /// The x coordinate of column boundary `col`.
    #[inline]
    pub fn col_to_coord(&self, col: usize) -> i64 {
        col as i64 * self.tech.col_pitch
    }

    /// The x coordinate of the center of column `col`.
    #[inline]
    pub fn col_center(&self, col: usize) -> i64 {
        self.col_to_coord(col) + self.tech.col_pitch / 2
    }

    pub fn track_to_coord(&self, layer: u32, index: HalfInt) -> Result<i64> {
        let pitch = self.pitch(layer)?;
        Ok((index.doubled() + 1) * pitch / 2)
    }

    /// The track exactly at `coord`; fails if `coord` is not on a half track.
    pub fn coord_to_track(&self, layer: u32, coord: i64) -> Result<HalfInt> {
        let pitch = self.pitch(layer)?;
        let num = 2 * coord - pitch;
        if num % pitch != 0 {
            return Err(GenError::OffGrid { layer, coord });
        }
        Ok(HalfInt::from_doubled(num / pitch))
    }

    /// The track nearest to `coord`; ties go to the lower track.
    pub fn coord_to_nearest_track(&self, layer: u32, coord: i64, half_track: bool) -> Result<HalfInt> {
        let pitch = self.pitch(layer)?;
        let num = 2 * coord - pitch;
        if half_track {
            Ok(HalfInt::from_doubled(round_div(num, pitch)))
        } else {
            Ok(HalfInt::new(round_div(num, 2 * pitch)))
        }
    }

    /// The half track midway between `a` and `b`, rounded up.
    #[inline]
    pub fn get_middle_track(&self, a: HalfInt, b: HalfInt) -> HalfInt {
        HalfInt::middle(a, b)
    }

    /// Number of doubled vertical track indices spanned by `cols` columns.
    pub fn col_to_vm_doubled(&self, cols: usize) -> i64 {
        2 * cols as i64 * self.tech.col_pitch / self.tech.vm_pitch
    }
}

/// Rounds `x / multiple` to the nearest integer, ties toward negative infinity.
pub(crate) fn round_div(x: i64, multiple: i64) -> i64 {
    let a = x.div_euclid(multiple);
    let rem = x.rem_euclid(multiple);
    if 2 * rem > multiple {
        a + 1
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> RoutingGrid {
        RoutingGrid::new(Tech::default()).unwrap()
    }

    #[test]
    fn test_track_coord_conversions() {
        let grid = grid();
        let vm = grid.vm_layer();
        assert_eq!(grid.track_to_coord(vm, HalfInt::new(0)).unwrap(), 50);
        assert_eq!(grid.track_to_coord(vm, HalfInt::from_doubled(1)).unwrap(), 100);
        assert_eq!(grid.coord_to_track(vm, 200).unwrap(), HalfInt::from_doubled(3));
        assert!(matches!(
            grid.coord_to_track(vm, 120),
            Err(GenError::OffGrid { coord: 120, .. })
        ));
    }

    #[test]
    fn test_nearest_track() {
        let grid = grid();
        let vm = grid.vm_layer();
        assert_eq!(
            grid.coord_to_nearest_track(vm, 120, true).unwrap(),
            HalfInt::from_doubled(1)
        );
        assert_eq!(
            grid.coord_to_nearest_track(vm, 130, true).unwrap(),
            HalfInt::from_doubled(2)
        );
        assert_eq!(grid.coord_to_nearest_track(vm, 120, false).unwrap(), HalfInt::new(1));
        assert_eq!(grid.coord_to_nearest_track(vm, 20, false).unwrap(), HalfInt::new(0));
    }

    #[test]
    fn test_round_div() {
        assert_eq!(round_div(7, 2), 3);
        assert_eq!(round_div(-7, 2), -4);
        assert_eq!(round_div(8, 3), 3);
        assert_eq!(round_div(-1, 10), 0);
    }

    #[test]
    fn test_rejects_conn_layer() {
        let grid = grid();
        assert!(grid.pitch(grid.tech().conn_layer).is_err());
    }
}

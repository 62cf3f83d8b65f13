use std::fmt::{Display, Formatter};
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config_err;
use crate::error::Result;

/// A value that is an integer multiple of one half.
///
/// Stored doubled, so `HalfInt::from_doubled(3)` represents `1.5`.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HalfInt(i64);

impl HalfInt {
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(2 * value)
    }

    #[inline]
    pub const fn from_doubled(doubled: i64) -> Self {
        Self(doubled)
    }

    #[inline]
    pub const fn doubled(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_integer(&self) -> bool {
        self.0 % 2 == 0
    }

    /// The integer value, if this is not a half-integer.
    pub fn to_int(&self) -> Option<i64> {
        self.is_integer().then_some(self.0 / 2)
    }

    pub fn from_f64(value: f64) -> Result<Self> {
        let doubled = value * 2.0;
        if !doubled.is_finite() || doubled.fract() != 0.0 {
            return Err(config_err!("{value} is not a multiple of one half"));
        }
        Ok(Self(doubled as i64))
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 2.0
    }

    /// The midpoint of `a` and `b`, rounded up to the nearest half-integer.
    pub fn middle(a: HalfInt, b: HalfInt) -> HalfInt {
        let sum = a.0 + b.0;
        Self((sum + 1).div_euclid(2))
    }

    pub fn abs_diff_doubled(&self, other: HalfInt) -> i64 {
        (self.0 - other.0).abs()
    }
}

impl From<i64> for HalfInt {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl Add for HalfInt {
    type Output = HalfInt;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for HalfInt {
    type Output = HalfInt;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for HalfInt {
    type Output = HalfInt;
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Display for HalfInt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.0 / 2)
        } else {
            let sign = if self.0 < 0 { "-" } else { "" };
            write!(f, "{sign}{}.5", self.0.abs() / 2)
        }
    }
}

impl Serialize for HalfInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.to_int() {
            Some(v) => serializer.serialize_i64(v),
            None => serializer.serialize_f64(self.to_f64()),
        }
    }
}

impl<'de> Deserialize<'de> for HalfInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        HalfInt::from_f64(value).map_err(serde::de::Error::custom)
    }
}

/// A closed interval of layout coordinates.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Span {
    lo: i64,
    hi: i64,
}

impl Span {
    pub fn new(a: i64, b: i64) -> Self {
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    #[inline]
    pub fn lo(&self) -> i64 {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> i64 {
        self.hi
    }

    /// The midpoint, rounded down.
    #[inline]
    pub fn middle(&self) -> i64 {
        (self.lo + self.hi).div_euclid(2)
    }

    pub fn intersects(&self, other: &Span) -> bool {
        self.lo <= other.hi && other.lo <= self.hi
    }

    pub fn union(&self, other: &Span) -> Span {
        Span {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }

    pub fn add_point(&self, x: i64) -> Span {
        Span {
            lo: self.lo.min(x),
            hi: self.hi.max(x),
        }
    }

    pub fn clamp(&self, bounds: &Span) -> Span {
        Span {
            lo: self.lo.clamp(bounds.lo, bounds.hi),
            hi: self.hi.clamp(bounds.lo, bounds.hi),
        }
    }

    pub fn translate(&self, dx: i64) -> Span {
        Span {
            lo: self.lo + dx,
            hi: self.hi + dx,
        }
    }

    pub fn from_points(mut points: impl Iterator<Item = i64>) -> Option<Span> {
        let first = points.next()?;
        Some(points.fold(Span::new(first, first), |s, x| s.add_point(x)))
    }
}

/// A half-open range of columns, `[start, start + width)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ColSpan {
    pub start: usize,
    pub width: usize,
}

impl ColSpan {
    #[inline]
    pub fn new(start: usize, width: usize) -> Self {
        Self { start, width }
    }

    #[inline]
    pub fn stop(&self) -> usize {
        self.start + self.width
    }

    pub fn overlaps(&self, other: &ColSpan) -> bool {
        self.start < other.stop() && other.start < self.stop()
    }

    /// Number of empty columns between `self` and a span placed after it.
    pub fn gap_to(&self, next: &ColSpan) -> Option<usize> {
        next.start.checked_sub(self.stop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_int_middle_rounds_up() {
        assert_eq!(HalfInt::middle(HalfInt::new(3), HalfInt::new(8)), HalfInt::from_doubled(11));
        assert_eq!(HalfInt::middle(HalfInt::new(3), HalfInt::new(5)), HalfInt::new(4));
        assert_eq!(
            HalfInt::middle(HalfInt::new(3), HalfInt::from_doubled(9)),
            HalfInt::new(4)
        );
    }

    #[test]
    fn test_half_int_serde() {
        let v: HalfInt = serde_json::from_str("5.5").unwrap();
        assert_eq!(v, HalfInt::from_doubled(11));
        let v: HalfInt = serde_json::from_str("4").unwrap();
        assert_eq!(v, HalfInt::new(4));
        assert_eq!(serde_json::to_string(&HalfInt::new(-2)).unwrap(), "-2");
        assert_eq!(serde_json::to_string(&HalfInt::from_doubled(3)).unwrap(), "1.5");
        assert!(serde_json::from_str::<HalfInt>("0.25").is_err());
    }

    #[test]
    fn test_half_int_display() {
        assert_eq!(HalfInt::from_doubled(-1).to_string(), "-0.5");
        assert_eq!(HalfInt::from_doubled(-3).to_string(), "-1.5");
        assert_eq!(HalfInt::from_doubled(-2).to_string(), "-1");
        assert_eq!(HalfInt::from_doubled(7).to_string(), "3.5");
        assert_eq!(HalfInt::new(0).to_string(), "0");
    }

    #[test]
    fn test_span_ops() {
        let a = Span::new(10, 0);
        assert_eq!((a.lo(), a.hi()), (0, 10));
        assert!(a.intersects(&Span::new(10, 20)));
        assert!(!a.intersects(&Span::new(11, 20)));
        assert_eq!(a.add_point(-5), Span::new(-5, 10));
        assert_eq!(Span::new(-5, 15).clamp(&a), a);
    }

    #[test]
    fn test_col_span_gap() {
        let a = ColSpan::new(0, 4);
        let b = ColSpan::new(6, 3);
        assert_eq!(a.gap_to(&b), Some(2));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&ColSpan::new(3, 1)));
    }
}

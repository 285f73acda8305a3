//! Closed time intervals.

use std::fmt;

use crate::types::{MinerError, MinerResult, Time};

/// A closed range `[begin, end]` with `begin <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    begin: Time,
    end: Time,
}

/// Result of [`Interval::union`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalUnion {
    /// The two intervals intersect; this is their minimal cover.
    Merged(Interval),
    /// The intervals are disjoint, earlier one first.
    Disjoint(Interval, Interval),
}

impl Interval {
    pub fn new(begin: Time, end: Time) -> MinerResult<Self> {
        if begin > end {
            return Err(MinerError::InvalidInterval { begin, end });
        }
        Ok(Self { begin, end })
    }

    pub fn begin(&self) -> Time {
        self.begin
    }

    pub fn end(&self) -> Time {
        self.end
    }

    pub fn length(&self) -> Time {
        self.end - self.begin
    }

    /// True if `self` lies inside `other`.
    pub fn included(&self, other: &Interval) -> bool {
        other.begin <= self.begin && self.end <= other.end
    }

    /// Common part of both intervals, if any. Touching end points intersect
    /// in a single instant.
    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let begin = self.begin.max(other.begin);
        let end = self.end.min(other.end);
        (begin <= end).then_some(Interval { begin, end })
    }

    pub fn intersects(&self, other: &Interval) -> bool {
        self.intersect(other).is_some()
    }

    pub fn union(&self, other: &Interval) -> IntervalUnion {
        if self.intersects(other) {
            IntervalUnion::Merged(self.cover(other))
        } else if self.begin < other.begin {
            IntervalUnion::Disjoint(*self, *other)
        } else {
            IntervalUnion::Disjoint(*other, *self)
        }
    }

    /// Smallest interval containing both.
    pub fn cover(&self, other: &Interval) -> Interval {
        Interval {
            begin: self.begin.min(other.begin),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.begin, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn iv(b: Time, e: Time) -> Interval {
        Interval::new(b, e).unwrap()
    }

    #[test]
    fn test_rejects_reversed_bounds() {
        assert!(matches!(
            Interval::new(5, 2),
            Err(MinerError::InvalidInterval { begin: 5, end: 2 })
        ));
        assert!(Interval::new(3, 3).is_ok());
    }

    #[test]
    fn test_included() {
        assert!(iv(3, 4).included(&iv(2, 4)));
        assert!(!iv(5, 6).included(&iv(2, 4)));
    }

    #[test]
    fn test_intersection() {
        assert_eq!(iv(2, 4).intersect(&iv(3, 6)), Some(iv(3, 4)));
        assert_eq!(iv(2, 4).intersect(&iv(5, 6)), None);
    }

    #[test]
    fn test_touching_intervals_meet_in_a_point() {
        assert_eq!(iv(1, 3).intersect(&iv(3, 5)), Some(iv(3, 3)));
        assert_eq!(iv(1, 3).union(&iv(3, 5)), IntervalUnion::Merged(iv(1, 5)));
    }

    #[test]
    fn test_union() {
        assert_eq!(iv(2, 4).union(&iv(3, 6)), IntervalUnion::Merged(iv(2, 6)));
        assert_eq!(
            iv(7, 8).union(&iv(2, 4)),
            IntervalUnion::Disjoint(iv(2, 4), iv(7, 8))
        );
    }

    fn arb_interval() -> impl Strategy<Value = Interval> {
        (-50i64..50, 0i64..30).prop_map(|(b, len)| iv(b, b + len))
    }

    proptest! {
        #[test]
        fn prop_intersect_is_symmetric(i in arb_interval(), j in arb_interval()) {
            prop_assert_eq!(i.intersect(&j), j.intersect(&i));
        }

        #[test]
        fn prop_union_is_symmetric(i in arb_interval(), j in arb_interval()) {
            prop_assert_eq!(i.union(&j), j.union(&i));
        }

        #[test]
        fn prop_union_of_intersecting_is_minimal_cover(i in arb_interval(), j in arb_interval()) {
            if i.intersects(&j) {
                let cover = iv(i.begin().min(j.begin()), i.end().max(j.end()));
                prop_assert_eq!(i.union(&j), IntervalUnion::Merged(cover));
            }
        }

        #[test]
        fn prop_intersection_is_included_in_both(i in arb_interval(), j in arb_interval()) {
            if let Some(k) = i.intersect(&j) {
                prop_assert!(k.included(&i) && k.included(&j));
            }
        }
    }
}

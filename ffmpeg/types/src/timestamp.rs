/*!
    Timestamps and durations counted in ticks of a stream time base.
*/

use std::time::Duration;

use crate::Rational;

const NANOS: Rational = Rational {
    num: 1,
    den: 1_000_000_000,
};

fn ticks_to_duration(ticks: i64, time_base: Rational) -> Duration {
    if ticks <= 0 {
        return Duration::ZERO;
    }
    let nanos = Rational::rescale(ticks, time_base, NANOS);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(0))
}

fn duration_to_ticks(duration: Duration, time_base: Rational) -> i64 {
    let nanos = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
    Rational::rescale(nanos, NANOS, time_base)
}

/**
    A point in time, in ticks of the owning stream's time base.

    The value means nothing without that time base: packets and frames
    carry it next to their timestamps.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pts(pub i64);

impl Pts {
    /**
        Wall-clock offset of this timestamp. Negative timestamps map to zero.
    */
    #[inline]
    pub fn to_duration(self, time_base: Rational) -> Duration {
        ticks_to_duration(self.0, time_base)
    }

    /**
        The tick nearest to `duration`.
    */
    #[inline]
    pub fn from_duration(duration: Duration, time_base: Rational) -> Self {
        Self(duration_to_ticks(duration, time_base))
    }

    /**
        The same instant, counted in ticks of `to`.
    */
    #[inline]
    pub fn rescale(self, from: Rational, to: Rational) -> Self {
        Self(Rational::rescale(self.0, from, to))
    }
}

impl From<i64> for Pts {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Pts> for i64 {
    fn from(pts: Pts) -> Self {
        pts.0
    }
}

/**
    A span of time in ticks of a time base, e.g. one frame or one packet.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaDuration(pub i64);

impl MediaDuration {
    #[inline]
    pub fn to_duration(self, time_base: Rational) -> Duration {
        ticks_to_duration(self.0, time_base)
    }

    #[inline]
    pub fn from_duration(duration: Duration, time_base: Rational) -> Self {
        Self(duration_to_ticks(duration, time_base))
    }

    #[inline]
    pub fn rescale(self, from: Rational, to: Rational) -> Self {
        Self(Rational::rescale(self.0, from, to))
    }
}

impl From<i64> for MediaDuration {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MediaDuration> for i64 {
    fn from(duration: MediaDuration) -> Self {
        duration.0
    }
}

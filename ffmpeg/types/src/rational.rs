/*!
    Rational number type for time bases and frame rates.
*/

use std::fmt;
use std::str::FromStr;

use crate::Error;

/**
    A rational number represented as a numerator and denominator.

    Used for time bases (e.g., 1/90000 for MPEG-TS) and frame rates
    (e.g., 24000/1001 for 23.976 fps).
*/
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    /**
        Create a new rational number.

        # Panics

        Panics if `den` is zero.
    */
    #[inline]
    pub const fn new(num: i32, den: i32) -> Self {
        assert!(den != 0, "denominator cannot be zero");
        Self { num, den }
    }

    /**
        Create a new rational number, returning `None` if `den` is zero.
    */
    #[inline]
    pub const fn checked_new(num: i32, den: i32) -> Option<Self> {
        if den == 0 {
            None
        } else {
            Some(Self { num, den })
        }
    }

    /**
        Convert to f64.
    */
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /**
        Invert the rational (swap numerator and denominator).

        # Panics

        Panics if numerator is zero.
    */
    #[inline]
    pub const fn invert(self) -> Self {
        assert!(self.num != 0, "cannot invert zero");
        Self {
            num: self.den,
            den: self.num,
        }
    }

    /**
        Returns true if both terms are strictly positive, which is required
        for anything used as a time base or frame rate.
    */
    #[inline]
    pub const fn is_positive(self) -> bool {
        self.num > 0 && self.den > 0
    }

    /**
        Rescale `value` expressed in units of `from` into units of `to`.

        Rounds to the nearest integer, halfway cases away from zero, and
        saturates at the bounds of `i64`.
    */
    pub fn rescale(value: i64, from: Rational, to: Rational) -> i64 {
        let mut b = from.num as i128 * to.den as i128;
        let mut c = from.den as i128 * to.num as i128;
        if c == 0 {
            return value;
        }
        if c < 0 {
            b = -b;
            c = -c;
        }

        let r = value as i128 * b;
        let mut q = r / c;
        let rem = r % c;
        if rem.abs() * 2 >= c {
            q += r.signum();
        }

        q.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl From<(i32, i32)> for Rational {
    fn from((num, den): (i32, i32)) -> Self {
        Self::new(num, den)
    }
}

impl From<i32> for Rational {
    fn from(num: i32) -> Self {
        Self::new(num, 1)
    }
}

/**
    Parses `num/den` or `num:den` (the latter is what YUV4MPEG2 headers use).
    A bare integer parses as `num/1`.
*/
impl FromStr for Rational {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::invalid_data(format!("invalid rational: {s:?}"));

        let (num, den) = match s.split_once(['/', ':']) {
            Some((num, den)) => (num, den),
            None => (s, "1"),
        };

        let num = num.trim().parse::<i32>().map_err(|_| invalid())?;
        let den = den.trim().parse::<i32>().map_err(|_| invalid())?;

        Self::checked_new(num, den).ok_or_else(invalid)
    }
}

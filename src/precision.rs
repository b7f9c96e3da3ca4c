//! Extended-exponent floating point.
//!
//! Posterior weights are exponentials of log-gamma sums that scale with the
//! sample size and the number of categories. For realistic inputs the log
//! weight easily leaves the ±709 window of an `f64` exponent, so `exp` would
//! return 0 or inf. `ExtendedFloat` keeps an `f64` mantissa in `[0.5, 1)`
//! and a separate `i64` binary exponent:
//!
//! ```text
//! value = mantissa · 2^exponent
//! ```
//!
//! Only the exponent range is extended; the precision stays that of `f64`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::f64::consts::{LN_2, LOG2_E};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Exponent gap beyond which the smaller addend cannot change the mantissa
const MAX_SHIFT: i64 = 1100;

/// A real number with an `f64` mantissa and an `i64` base-2 exponent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtendedFloat {
    mantissa: f64,
    exponent: i64,
}

impl ExtendedFloat {
    pub const ZERO: Self = Self {
        mantissa: 0.0,
        exponent: 0,
    };

    pub const ONE: Self = Self {
        mantissa: 0.5,
        exponent: 1,
    };

    /// Build from a mantissa and exponent, renormalizing the mantissa.
    fn normalized(mantissa: f64, exponent: i64) -> Self {
        if mantissa == 0.0 {
            return Self::ZERO;
        }
        if !mantissa.is_finite() {
            return Self { mantissa, exponent };
        }
        let (m, e) = libm::frexp(mantissa);
        Self {
            mantissa: m,
            exponent: exponent + e as i64,
        }
    }

    pub fn from_f64(x: f64) -> Self {
        Self::normalized(x, 0)
    }

    /// e^x for any finite `x`, without overflow or underflow.
    pub fn exp(x: f64) -> Self {
        if x.is_nan() {
            return Self {
                mantissa: f64::NAN,
                exponent: 0,
            };
        }
        if x == f64::NEG_INFINITY {
            return Self::ZERO;
        }
        if x == f64::INFINITY {
            return Self {
                mantissa: f64::INFINITY,
                exponent: 0,
            };
        }
        // e^x = 2^(x log2 e) = 2^frac · 2^floor
        let y = x * LOG2_E;
        let whole = y.floor();
        let frac = y - whole;
        Self::normalized(frac.exp2(), whole as i64)
    }

    /// Natural logarithm. Negative values give NaN, zero gives -inf.
    pub fn ln(&self) -> f64 {
        if self.mantissa == 0.0 {
            return f64::NEG_INFINITY;
        }
        self.mantissa.ln() + self.exponent as f64 * LN_2
    }

    /// Collapse to `f64`; saturates to 0 or ±inf outside the `f64` range.
    pub fn to_f64(&self) -> f64 {
        if self.mantissa == 0.0 || !self.mantissa.is_finite() {
            return self.mantissa;
        }
        let e = self.exponent.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        libm::ldexp(self.mantissa, e)
    }

    #[inline]
    pub fn mantissa(&self) -> f64 {
        self.mantissa
    }

    #[inline]
    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.mantissa == 0.0
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.mantissa.is_finite()
    }

    #[inline]
    pub fn is_sign_negative(&self) -> bool {
        self.mantissa < 0.0
    }

    pub fn abs(&self) -> Self {
        Self {
            mantissa: self.mantissa.abs(),
            exponent: self.exponent,
        }
    }
}

impl Default for ExtendedFloat {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for ExtendedFloat {
    fn from(x: f64) -> Self {
        Self::from_f64(x)
    }
}

impl Add for ExtendedFloat {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        if self.is_zero() {
            return rhs;
        }
        if rhs.is_zero() {
            return self;
        }
        if !self.is_finite() || !rhs.is_finite() {
            return Self {
                mantissa: self.mantissa + rhs.mantissa,
                exponent: 0,
            };
        }
        let (big, small) = if self.exponent >= rhs.exponent {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let shift = big.exponent - small.exponent;
        if shift > MAX_SHIFT {
            return big;
        }
        let m = big.mantissa + libm::ldexp(small.mantissa, -(shift as i32));
        Self::normalized(m, big.exponent)
    }
}

impl Neg for ExtendedFloat {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            mantissa: -self.mantissa,
            exponent: self.exponent,
        }
    }
}

impl Sub for ExtendedFloat {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Mul for ExtendedFloat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::normalized(self.mantissa * rhs.mantissa, self.exponent + rhs.exponent)
    }
}

impl Mul<f64> for ExtendedFloat {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self * Self::from_f64(rhs)
    }
}

impl Div for ExtendedFloat {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        Self::normalized(self.mantissa / rhs.mantissa, self.exponent - rhs.exponent)
    }
}

impl PartialOrd for ExtendedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let diff = *self - *other;
        if diff.mantissa.is_nan() {
            None
        } else {
            diff.mantissa.partial_cmp(&0.0)
        }
    }
}

impl fmt::Display for ExtendedFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() || !self.is_finite() {
            return write!(f, "{}", self.mantissa);
        }
        // mantissa · 2^e  =  d · 10^p
        let log10 = self.mantissa.abs().log10() + self.exponent as f64 * std::f64::consts::LOG10_2;
        let p = log10.floor();
        let d = 10f64.powf(log10 - p).copysign(self.mantissa);
        write!(f, "{:.6}e{}", d, p as i64)
    }
}

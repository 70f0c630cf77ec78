//! Fixed-point wire representation of shaft angles.
//!
//! The command channel carries angles as two `i16` values: whole radians
//! and thousandths of a radian, `whole + thousandths/1000`. Both halves
//! carry the sign of the angle and `|thousandths| < 1000` always holds.
//! Position replies use a separate truncating milliradian conversion.

use thiserror::Error;

/// Angle codec error.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AngleError {
    /// Angle cannot be represented on the wire. Reported instead of
    /// silently truncating.
    #[error("angle {0} rad outside encodable range")]
    Overflow(f64),
}

/// Two-int16 fixed-point angle as carried by `m` command arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct WireAngle {
    /// Whole radians, truncated toward zero.
    pub whole: i16,
    /// Thousandths of a radian, same sign as the angle.
    pub thousandths: i16,
}

static_assertions::const_assert_eq!(core::mem::size_of::<WireAngle>(), 4);

impl WireAngle {
    /// Build from raw command arguments without validation. Dispatch
    /// guarantees the two values came off the wire as `i16`.
    #[inline]
    pub const fn from_args(whole: i16, thousandths: i16) -> Self {
        Self { whole, thousandths }
    }

    /// Encode an angle in radians.
    ///
    /// Fails with [`AngleError::Overflow`] when the whole part does not
    /// fit `i16`, when rounding the fraction would spill past ±32768 rad,
    /// or when the input is not finite.
    pub fn encode(radians: f64) -> Result<Self, AngleError> {
        if !radians.is_finite() {
            return Err(AngleError::Overflow(radians));
        }
        let mut whole = radians.trunc() as i64;
        let mut thousandths = ((radians - radians.trunc()) * 1000.0).round() as i64;
        // Rounding the fraction can reach a full radian (e.g. 1.9996).
        if thousandths.abs() >= 1000 {
            whole += thousandths.signum();
            thousandths -= 1000 * thousandths.signum();
        }
        if whole < i16::MIN as i64 || whole > i16::MAX as i64 {
            return Err(AngleError::Overflow(radians));
        }
        Ok(Self {
            whole: whole as i16,
            thousandths: thousandths as i16,
        })
    }

    /// Decode back to radians.
    #[inline]
    pub fn decode(&self) -> f64 {
        f64::from(self.whole) + f64::from(self.thousandths) / 1000.0
    }

    /// Whole + thousandths collapsed to milliradians.
    #[inline]
    pub const fn to_milliradians(&self) -> i32 {
        self.whole as i32 * 1000 + self.thousandths as i32
    }
}

/// Truncating milliradian conversion used by position replies.
#[inline]
pub fn milliradians(radians: f64) -> i32 {
    (radians * 1000.0) as i32
}

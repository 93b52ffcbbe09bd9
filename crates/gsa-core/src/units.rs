//! Unit newtypes for power-system quantities.
//!
//! Security analysis mixes active power (MW), reactive power (Mvar),
//! apparent power (MVA), per-unit magnitudes, and angles in radians. Raw
//! `f64` values make it easy to add MW to Mvar or pass a per-unit value
//! where megawatts are expected; these `#[repr(transparent)]` wrappers
//! catch that class of error at compile time with no runtime cost.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Implements common arithmetic and accessors for a unit newtype.
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Absolute value
            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            /// Minimum of two values
            #[inline]
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }

            /// Maximum of two values
            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }

            /// Clamp value to range
            #[inline]
            pub fn clamp(self, min: Self, max: Self) -> Self {
                Self(self.0.clamp(min.0, max.0))
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl<'a> std::iter::Sum<&'a $type> for $type {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

/// Active power in megawatts (MW)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Megawatts(pub f64);

impl_unit_ops!(Megawatts, "MW");

/// Reactive power in megavolt-amperes reactive (Mvar)
///
/// Carried on bus records for completeness; the DC approximation ignores
/// reactive power entirely.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Megavars(pub f64);

impl_unit_ops!(Megavars, "Mvar");

/// Apparent power in megavolt-amperes (MVA), used for the system base.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MegavoltAmperes(pub f64);

impl_unit_ops!(MegavoltAmperes, "MVA");

/// Voltage magnitude in per-unit (pu)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PerUnit(pub f64);

impl_unit_ops!(PerUnit, "pu");

impl PerUnit {
    /// One per-unit (nominal voltage)
    pub const ONE: Self = Self(1.0);
}

/// Angle in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Radians(pub f64);

impl_unit_ops!(Radians, "rad");

impl Radians {
    /// Zero radians (the slack reference angle)
    pub const ZERO: Self = Self(0.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_megawatts_arithmetic() {
        let p1 = Megawatts(100.0);
        let p2 = Megawatts(50.0);

        assert_eq!((p1 + p2).value(), 150.0);
        assert_eq!((p1 - p2).value(), 50.0);
        assert_eq!((-p1).value(), -100.0);
        assert_eq!((p1 * 2.0).value(), 200.0);
        assert_eq!((p1 / 2.0).value(), 50.0);
        assert_eq!(p1 / p2, 2.0);
    }

    #[test]
    fn test_sum_iterator() {
        let powers = vec![Megawatts(10.0), Megawatts(20.0), Megawatts(30.0)];
        let total: Megawatts = powers.into_iter().sum();

        assert_eq!(total.value(), 60.0);
    }

    #[test]
    fn test_min_max_clamp() {
        let p1 = Megawatts(100.0);
        let p2 = Megawatts(50.0);

        assert_eq!(p1.min(p2).value(), 50.0);
        assert_eq!(p1.max(p2).value(), 100.0);
        assert_eq!(
            Megawatts(150.0)
                .clamp(Megawatts(0.0), Megawatts(100.0))
                .value(),
            100.0
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Megawatts(100.0)), "100.0000 MW");
        assert_eq!(format!("{}", PerUnit(1.0)), "1.0000 pu");
    }
}

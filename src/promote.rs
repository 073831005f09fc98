//! Accumulator type promotion
//!
//! Every element type carries two associated types: the accumulator used for
//! sums (narrow integers widen to 64 bits, 64-bit integers to 128 bits, floats
//! stay as they are) and the floating type in which means, variances and order
//! statistics are reported.

use num_traits::{Float, Zero};
use std::fmt::{Debug, Display};
use std::ops::Add;

/// Floating type in which derived statistics are computed and returned
pub trait StatFloat: Float + Debug + Display + Send + Sync + 'static {
    /// Convert an element count
    fn from_count(n: usize) -> Self;
    /// Convert a fraction in `[0, 1]`
    fn from_fraction(f: f64) -> Self;
}

impl StatFloat for f32 {
    #[allow(clippy::cast_precision_loss)]
    fn from_count(n: usize) -> Self {
        n as f32
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_fraction(f: f64) -> Self {
        f as f32
    }
}

impl StatFloat for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_count(n: usize) -> Self {
        n as f64
    }

    fn from_fraction(f: f64) -> Self {
        f
    }
}

/// Numeric element type accepted by every statistic
pub trait Element: Copy + PartialOrd + Debug + Send + Sync + 'static {
    /// Accumulator for sums
    type Acc: Copy + Zero + Add<Output = Self::Acc> + Debug + Send + Sync + 'static;
    /// Result type of means, variances and quantiles
    type Float: StatFloat;

    /// Widen to the sum accumulator
    fn widen(self) -> Self::Acc;
    /// Convert to the floating result type
    fn to_float(self) -> Self::Float;
    /// Convert a finished sum to the floating result type
    fn acc_to_float(acc: Self::Acc) -> Self::Float;
}

macro_rules! impl_element {
    ($($t:ty => $acc:ty, $float:ty);* $(;)?) => {
        $(
            #[allow(clippy::cast_lossless, clippy::cast_precision_loss, clippy::unnecessary_cast)]
            impl Element for $t {
                type Acc = $acc;
                type Float = $float;

                #[inline]
                fn widen(self) -> $acc {
                    self as $acc
                }

                #[inline]
                fn to_float(self) -> $float {
                    self as $float
                }

                #[inline]
                fn acc_to_float(acc: $acc) -> $float {
                    acc as $float
                }
            }
        )*
    };
}

impl_element! {
    i8 => i64, f64;
    i16 => i64, f64;
    i32 => i64, f64;
    i64 => i128, f64;
    u8 => u64, f64;
    u16 => u64, f64;
    u32 => u64, f64;
    u64 => u128, f64;
    f32 => f32, f32;
    f64 => f64, f64;
}

/// The wider of two floating result types, used when pairing arrays of
/// different element types
pub trait Wider<Rhs: StatFloat>: StatFloat {
    type Output: StatFloat;

    fn promote(self) -> <Self as Wider<Rhs>>::Output;
    fn promote_rhs(rhs: Rhs) -> <Self as Wider<Rhs>>::Output;
}

impl Wider<f32> for f32 {
    type Output = f32;

    fn promote(self) -> f32 {
        self
    }

    fn promote_rhs(rhs: f32) -> f32 {
        rhs
    }
}

impl Wider<f64> for f32 {
    type Output = f64;

    fn promote(self) -> f64 {
        f64::from(self)
    }

    fn promote_rhs(rhs: f64) -> f64 {
        rhs
    }
}

impl Wider<f32> for f64 {
    type Output = f64;

    fn promote(self) -> f64 {
        self
    }

    fn promote_rhs(rhs: f32) -> f64 {
        f64::from(rhs)
    }
}

impl Wider<f64> for f64 {
    type Output = f64;

    fn promote(self) -> f64 {
        self
    }

    fn promote_rhs(rhs: f64) -> f64 {
        rhs
    }
}

/// Floating type of a statistic pairing elements `A` and `B`
pub type PairFloat<A, B> = <<A as Element>::Float as Wider<<B as Element>::Float>>::Output;

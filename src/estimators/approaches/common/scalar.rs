use num_traits::Float;
use std::fmt::Debug;

/// Scalar abstraction over the two supported column precisions.
///
/// The precision is fixed once at the frame boundary; every internal
/// algorithm (metric, index build, queries, estimator reduction) is written
/// against this trait instead of branching per entry point.
pub trait Scalar: Float + Debug + 'static {
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
    fn from_i32(value: i32) -> Self;
}

impl Scalar for f64 {
    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn from_i32(value: i32) -> Self {
        f64::from(value)
    }
}

impl Scalar for f32 {
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_i32(value: i32) -> Self {
        value as f32
    }
}

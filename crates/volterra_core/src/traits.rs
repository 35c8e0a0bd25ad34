use num_traits::{FromPrimitive, Num};
use std::fmt::Debug;
use std::ops::Neg;

/// Scalar type a vector field can be evaluated over.
///
/// The fields in this crate are polynomial, so ring arithmetic plus
/// conversion from `f64` is all that is required. Both `f64` and the
/// forward-mode [`Dual`](crate::autodiff::Dual) number satisfy this.
pub trait Scalar:
    Num + Neg<Output = Self> + FromPrimitive + PartialOrd + Copy + Debug + 'static
{
}

impl<T: Num + Neg<Output = T> + FromPrimitive + PartialOrd + Copy + Debug + 'static> Scalar for T {}

/// A continuous-time vector field: the right-hand side of an ODE system.
///
/// Implementations must be pure and deterministic, and must be evaluable
/// at any state, including equilibrium points.
pub trait VectorField<T: Scalar> {
    /// Dimension of the state space.
    fn dim(&self) -> usize;

    /// Writes dx/dt at state `x` and time `t` into `out`.
    /// `out` has length `dim()`.
    fn eval(&self, t: T, x: &[T], out: &mut [T]);
}

/// A fixed-step time stepper for a vector field.
pub trait Stepper<T: Scalar> {
    /// Advances `(t, state)` by one step of size `dt`.
    fn step(&mut self, field: &impl VectorField<T>, t: &mut T, state: &mut [T], dt: T);
}

use crate::traits::VectorField;
use anyhow::{bail, Result};
use num_traits::{FromPrimitive, Num, NumCast, One, ToPrimitive, Zero};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign};

/// Forward-mode dual number.
/// val: real part
/// eps: infinitesimal part
///
/// Only the arithmetic surface required by polynomial vector fields is
/// implemented; this is what lets one field definition produce both its
/// values and its exact partial derivatives.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Dual {
    pub val: f64,
    pub eps: f64,
}

impl Dual {
    pub fn new(val: f64, eps: f64) -> Self {
        Self { val, eps }
    }

    /// A constant: zero derivative.
    pub fn constant(val: f64) -> Self {
        Self::new(val, 0.0)
    }
}

impl Zero for Dual {
    fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
    fn is_zero(&self) -> bool {
        self.val == 0.0 && self.eps == 0.0
    }
}

impl One for Dual {
    fn one() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl Add for Dual {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.val + rhs.val, self.eps + rhs.eps)
    }
}

impl Sub for Dual {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.val - rhs.val, self.eps - rhs.eps)
    }
}

impl Mul for Dual {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.val * rhs.val, self.val * rhs.eps + self.eps * rhs.val)
    }
}

impl Div for Dual {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        let denom = rhs.val * rhs.val;
        Self::new(
            self.val / rhs.val,
            (self.eps * rhs.val - self.val * rhs.eps) / denom,
        )
    }
}

impl Neg for Dual {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.val, -self.eps)
    }
}

impl Rem for Dual {
    type Output = Self;
    fn rem(self, rhs: Self) -> Self {
        // Derivative of rem is not meaningful here; real part only.
        Self::new(self.val % rhs.val, 0.0)
    }
}

impl AddAssign for Dual {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl SubAssign for Dual {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
impl MulAssign for Dual {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}
impl DivAssign for Dual {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}
impl RemAssign for Dual {
    fn rem_assign(&mut self, rhs: Self) {
        *self = *self % rhs;
    }
}

impl Num for Dual {
    type FromStrRadixErr = ();
    fn from_str_radix(str: &str, radix: u32) -> Result<Self, Self::FromStrRadixErr> {
        f64::from_str_radix(str, radix)
            .map(|v| Self::new(v, 0.0))
            .map_err(|_| ())
    }
}

impl ToPrimitive for Dual {
    fn to_i64(&self) -> Option<i64> {
        self.val.to_i64()
    }
    fn to_u64(&self) -> Option<u64> {
        self.val.to_u64()
    }
    fn to_f64(&self) -> Option<f64> {
        Some(self.val)
    }
}

impl FromPrimitive for Dual {
    fn from_i64(n: i64) -> Option<Self> {
        Some(Self::new(n as f64, 0.0))
    }
    fn from_u64(n: u64) -> Option<Self> {
        Some(Self::new(n as f64, 0.0))
    }
    fn from_f64(n: f64) -> Option<Self> {
        Some(Self::new(n, 0.0))
    }
}

impl NumCast for Dual {
    fn from<T: ToPrimitive>(n: T) -> Option<Self> {
        n.to_f64().map(|v| Self::new(v, 0.0))
    }
}

/// Evaluates the Jacobian of `field` at `state`, as a row-major
/// `dim` x `dim` matrix.
///
/// Each column is obtained by evaluating the field with the matching
/// state component seeded with a unit infinitesimal. Because the same
/// field definition produces both values and partials, the Jacobian can
/// never drift out of sync with the field formulas.
pub fn jacobian<S>(field: &S, t: f64, state: &[f64]) -> Result<Vec<f64>>
where
    S: VectorField<f64> + VectorField<Dual>,
{
    let dim = VectorField::<f64>::dim(field);
    if dim == 0 {
        bail!("Vector field has zero dimension.");
    }
    if state.len() != dim {
        bail!(
            "State dimension mismatch. Expected {}, got {}.",
            dim,
            state.len()
        );
    }

    let mut out = vec![0.0; dim * dim];
    let mut dual_state = vec![Dual::constant(0.0); dim];
    let mut dual_out = vec![Dual::constant(0.0); dim];
    let t_dual = Dual::constant(t);

    for j in 0..dim {
        for i in 0..dim {
            dual_state[i] = Dual::new(state[i], if i == j { 1.0 } else { 0.0 });
        }
        field.eval(t_dual, &dual_state, &mut dual_out);
        for i in 0..dim {
            out[i * dim + j] = dual_out[i].eps;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{jacobian, Dual};
    use crate::traits::{Scalar, VectorField};
    use num_traits::One;

    /// dx = x*y, dy = x - y^2. Analytic Jacobian: [[y, x], [1, -2y]].
    struct QuadraticField;

    impl<T: Scalar> VectorField<T> for QuadraticField {
        fn dim(&self) -> usize {
            2
        }

        fn eval(&self, _t: T, x: &[T], out: &mut [T]) {
            out[0] = x[0] * x[1];
            out[1] = x[0] - x[1] * x[1];
        }
    }

    #[test]
    fn dual_product_rule() {
        let x = Dual::new(3.0, 1.0);
        let y = Dual::new(2.0, 0.0);
        let p = x * x * y;
        assert_eq!(p.val, 18.0);
        assert_eq!(p.eps, 12.0); // d/dx (x^2 y) = 2xy
    }

    #[test]
    fn dual_quotient_rule() {
        let x = Dual::new(2.0, 1.0);
        let q = Dual::one() / x;
        assert!((q.val - 0.5).abs() < 1e-15);
        assert!((q.eps + 0.25).abs() < 1e-15); // d/dx (1/x) = -1/x^2
    }

    #[test]
    fn jacobian_matches_analytic_partials() {
        let field = QuadraticField;
        let j = jacobian(&field, 0.0, &[3.0, 2.0]).expect("jacobian should compute");
        let expected = [2.0, 3.0, 1.0, -4.0];
        for (got, want) in j.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn jacobian_rejects_dimension_mismatch() {
        let field = QuadraticField;
        let err = jacobian(&field, 0.0, &[1.0]).expect_err("expected error");
        assert!(format!("{err}").contains("dimension mismatch"));
    }
}

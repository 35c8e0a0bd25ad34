use crate::traits::{Scalar, VectorField};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

fn check_rate(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        bail!("Parameter `{}` must be finite, got {}.", name, value);
    }
    if value <= 0.0 {
        bail!("Parameter `{}` must be positive, got {}.", name, value);
    }
    Ok(())
}

/// Rate constants for the two-species Lotka-Volterra system.
///
/// Immutable for the duration of a run; build a new value for a
/// parameter sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LotkaVolterraParams {
    /// Prey intrinsic growth rate (a).
    pub prey_growth: f64,
    /// Predation rate coefficient (b).
    pub predation: f64,
    /// Predator death rate (c).
    pub predator_death: f64,
    /// Efficiency of converting prey into predators (d).
    pub conversion: f64,
}

impl LotkaVolterraParams {
    pub fn new(prey_growth: f64, predation: f64, predator_death: f64, conversion: f64) -> Result<Self> {
        check_rate("prey_growth", prey_growth)?;
        check_rate("predation", predation)?;
        check_rate("predator_death", predator_death)?;
        check_rate("conversion", conversion)?;
        Ok(Self {
            prey_growth,
            predation,
            predator_death,
            conversion,
        })
    }
}

/// The classic two-species predator-prey flow:
///
/// ```text
/// dx/dt = a*x - b*x*y
/// dy/dt = d*b*x*y - c*y
/// ```
///
/// where x is prey and y is predator population.
#[derive(Debug, Clone, Copy)]
pub struct LotkaVolterra {
    pub params: LotkaVolterraParams,
}

impl LotkaVolterra {
    pub fn new(params: LotkaVolterraParams) -> Self {
        Self { params }
    }

    /// All equilibrium points, in closed form.
    ///
    /// Extinction at the origin, and coexistence at (c/(d*b), a/b).
    pub fn equilibria(&self) -> Vec<Vec<f64>> {
        let p = &self.params;
        vec![
            vec![0.0, 0.0],
            vec![
                p.predator_death / (p.conversion * p.predation),
                p.prey_growth / p.predation,
            ],
        ]
    }
}

impl<T: Scalar> VectorField<T> for LotkaVolterra {
    fn dim(&self) -> usize {
        2
    }

    fn eval(&self, _t: T, x: &[T], out: &mut [T]) {
        let a = T::from_f64(self.params.prey_growth).unwrap();
        let b = T::from_f64(self.params.predation).unwrap();
        let c = T::from_f64(self.params.predator_death).unwrap();
        let d = T::from_f64(self.params.conversion).unwrap();

        out[0] = a * x[0] - b * x[0] * x[1];
        out[1] = d * b * x[0] * x[1] - c * x[1];
    }
}

/// Rate constants for the three-species variant: two prey populations
/// sharing one predator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TwoPreyOnePredatorParams {
    /// First prey growth rate (a).
    pub prey1_growth: f64,
    /// Predation rate on the first prey (b).
    pub prey1_predation: f64,
    /// Second prey growth rate (u).
    pub prey2_growth: f64,
    /// Predation rate on the second prey (w).
    pub prey2_predation: f64,
    /// Predator death rate (c).
    pub predator_death: f64,
    /// Conversion efficiency for the first prey (d).
    pub prey1_conversion: f64,
    /// Conversion efficiency for the second prey (g).
    pub prey2_conversion: f64,
}

impl TwoPreyOnePredatorParams {
    pub fn new(
        prey1_growth: f64,
        prey1_predation: f64,
        prey2_growth: f64,
        prey2_predation: f64,
        predator_death: f64,
        prey1_conversion: f64,
        prey2_conversion: f64,
    ) -> Result<Self> {
        check_rate("prey1_growth", prey1_growth)?;
        check_rate("prey1_predation", prey1_predation)?;
        check_rate("prey2_growth", prey2_growth)?;
        check_rate("prey2_predation", prey2_predation)?;
        check_rate("predator_death", predator_death)?;
        check_rate("prey1_conversion", prey1_conversion)?;
        check_rate("prey2_conversion", prey2_conversion)?;
        Ok(Self {
            prey1_growth,
            prey1_predation,
            prey2_growth,
            prey2_predation,
            predator_death,
            prey1_conversion,
            prey2_conversion,
        })
    }
}

/// Three-species predator-prey flow with state (x, y, z):
///
/// ```text
/// dx/dt = a*x - b*x*z
/// dy/dt = u*y - w*y*z
/// dz/dt = d*b*x*z + g*w*y*z - c*z
/// ```
///
/// where x and y are prey and z is the shared predator.
#[derive(Debug, Clone, Copy)]
pub struct TwoPreyOnePredator {
    pub params: TwoPreyOnePredatorParams,
}

impl TwoPreyOnePredator {
    pub fn new(params: TwoPreyOnePredatorParams) -> Self {
        Self { params }
    }

    /// All generic equilibrium points, re-derived from the field above.
    ///
    /// Besides extinction at the origin there are two boundary points,
    /// each with one prey absent. Note the predator level at the second
    /// boundary point is u/w, set by the surviving prey's own rates. An
    /// interior coexistence point exists only when a*w = u*b and is not
    /// reported.
    pub fn equilibria(&self) -> Vec<Vec<f64>> {
        let p = &self.params;
        vec![
            vec![0.0, 0.0, 0.0],
            vec![
                p.predator_death / (p.prey1_conversion * p.prey1_predation),
                0.0,
                p.prey1_growth / p.prey1_predation,
            ],
            vec![
                0.0,
                p.predator_death / (p.prey2_conversion * p.prey2_predation),
                p.prey2_growth / p.prey2_predation,
            ],
        ]
    }
}

impl<T: Scalar> VectorField<T> for TwoPreyOnePredator {
    fn dim(&self) -> usize {
        3
    }

    fn eval(&self, _t: T, x: &[T], out: &mut [T]) {
        let a = T::from_f64(self.params.prey1_growth).unwrap();
        let b = T::from_f64(self.params.prey1_predation).unwrap();
        let u = T::from_f64(self.params.prey2_growth).unwrap();
        let w = T::from_f64(self.params.prey2_predation).unwrap();
        let c = T::from_f64(self.params.predator_death).unwrap();
        let d = T::from_f64(self.params.prey1_conversion).unwrap();
        let g = T::from_f64(self.params.prey2_conversion).unwrap();

        out[0] = a * x[0] - b * x[0] * x[2];
        out[1] = u * x[1] - w * x[1] * x[2];
        out[2] = d * b * x[0] * x[2] + g * w * x[1] * x[2] - c * x[2];
    }
}

#[cfg(test)]
mod tests {
    use super::{LotkaVolterra, LotkaVolterraParams, TwoPreyOnePredator, TwoPreyOnePredatorParams};
    use crate::autodiff::jacobian;
    use crate::traits::VectorField;

    fn classic_params() -> LotkaVolterraParams {
        LotkaVolterraParams::new(1.0, 0.1, 1.5, 0.75).expect("valid parameters")
    }

    #[test]
    fn rejects_nonpositive_rates() {
        let err = LotkaVolterraParams::new(1.0, 0.0, 1.5, 0.75).expect_err("expected error");
        assert!(format!("{err}").contains("predation"));
        let err = LotkaVolterraParams::new(-1.0, 0.1, 1.5, 0.75).expect_err("expected error");
        assert!(format!("{err}").contains("must be positive"));
        let err = LotkaVolterraParams::new(1.0, 0.1, f64::NAN, 0.75).expect_err("expected error");
        assert!(format!("{err}").contains("must be finite"));
    }

    #[test]
    fn coexistence_equilibrium_closed_form() {
        let system = LotkaVolterra::new(classic_params());
        let points = system.equilibria();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], vec![0.0, 0.0]);
        assert!((points[1][0] - 20.0).abs() < 1e-12);
        assert!((points[1][1] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn field_vanishes_at_equilibria() {
        let system = LotkaVolterra::new(classic_params());
        let mut out = vec![0.0; 2];
        for point in system.equilibria() {
            system.eval(0.0, &point, &mut out);
            for component in &out {
                assert!(component.abs() < 1e-9);
            }
        }
    }

    #[test]
    fn jacobian_at_origin_is_diagonal_growth_and_decay() {
        let system = LotkaVolterra::new(classic_params());
        let j = jacobian(&system, 0.0, &[0.0, 0.0]).expect("jacobian should compute");
        let expected = [1.0, 0.0, 0.0, -1.5];
        for (got, want) in j.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn jacobian_at_coexistence_has_zero_trace() {
        let system = LotkaVolterra::new(classic_params());
        let j = jacobian(&system, 0.0, &[20.0, 10.0]).expect("jacobian should compute");
        // [[0, -2], [0.75, 0]] for a=1, b=0.1, c=1.5, d=0.75.
        assert!(j[0].abs() < 1e-12);
        assert!((j[1] + 2.0).abs() < 1e-12);
        assert!((j[2] - 0.75).abs() < 1e-12);
        assert!(j[3].abs() < 1e-12);
    }

    #[test]
    fn three_species_field_vanishes_at_equilibria() {
        let params = TwoPreyOnePredatorParams::new(1.0, 0.1, 0.8, 0.2, 1.5, 0.75, 0.5)
            .expect("valid parameters");
        let system = TwoPreyOnePredator::new(params);
        let mut out = vec![0.0; 3];
        for point in system.equilibria() {
            system.eval(0.0, &point, &mut out);
            for component in &out {
                assert!(component.abs() < 1e-9, "residual {} at {:?}", component, point);
            }
        }
    }

    #[test]
    fn three_species_boundary_predator_level_uses_surviving_prey_rates() {
        let params = TwoPreyOnePredatorParams::new(1.0, 0.1, 0.8, 0.2, 1.5, 0.75, 0.5)
            .expect("valid parameters");
        let system = TwoPreyOnePredator::new(params);
        let points = system.equilibria();
        // Second boundary point: prey 1 extinct, predator at u/w = 4.
        assert_eq!(points[2][0], 0.0);
        assert!((points[2][2] - 4.0).abs() < 1e-12);
    }
}

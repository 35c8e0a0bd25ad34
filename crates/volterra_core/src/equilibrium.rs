use crate::autodiff::{jacobian, Dual};
use crate::stability::{classify, eigenvalues, StabilityClass};
use crate::traits::VectorField;
use anyhow::{bail, Context, Result};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Default residual tolerance for equilibrium verification.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Everything the stability analysis produces for one equilibrium
/// point, in a form an external consumer can serialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquilibriumAnalysis {
    pub state: Vec<f64>,
    /// L2 norm of the vector field at `state`. Verified below the
    /// requested tolerance before any further analysis runs.
    pub residual_norm: f64,
    /// Row-major dim x dim Jacobian at `state`.
    pub jacobian: Vec<f64>,
    pub eigenvalues: Vec<Complex<f64>>,
    pub classification: StabilityClass,
}

fn l2_norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

fn residual<S: VectorField<f64>>(field: &S, state: &[f64]) -> Result<Vec<f64>> {
    let dim = field.dim();
    if state.len() != dim {
        bail!(
            "Equilibrium dimension mismatch. Expected {}, got {}.",
            dim,
            state.len()
        );
    }
    let mut out = vec![0.0; dim];
    field.eval(0.0, state, &mut out);
    Ok(out)
}

/// Checks that the field actually vanishes at each claimed equilibrium.
///
/// A failure here means the closed-form equilibrium expressions have
/// drifted out of sync with the field formulas; it is an assertion-style
/// fault, caught before any integration uses the model.
pub fn verify_equilibria<S: VectorField<f64>>(
    field: &S,
    points: &[Vec<f64>],
    tolerance: f64,
) -> Result<()> {
    if points.is_empty() {
        bail!("No equilibrium points supplied.");
    }
    if !(tolerance > 0.0 && tolerance.is_finite()) {
        bail!("tolerance must be positive and finite.");
    }

    for point in points {
        let norm = l2_norm(&residual(field, point)?);
        if norm > tolerance {
            bail!(
                "Claimed equilibrium {:?} is not an equilibrium: \
                 field residual norm {} exceeds tolerance {}.",
                point,
                norm,
                tolerance
            );
        }
    }
    Ok(())
}

/// Verifies one equilibrium and computes its Jacobian, eigenvalues, and
/// stability classification.
pub fn analyze_equilibrium<S>(field: &S, state: &[f64], tolerance: f64) -> Result<EquilibriumAnalysis>
where
    S: VectorField<f64> + VectorField<Dual>,
{
    if !(tolerance > 0.0 && tolerance.is_finite()) {
        bail!("tolerance must be positive and finite.");
    }
    let residual_norm = l2_norm(&residual(field, state)?);
    if residual_norm > tolerance {
        bail!(
            "Claimed equilibrium {:?} is not an equilibrium: \
             field residual norm {} exceeds tolerance {}.",
            state,
            residual_norm,
            tolerance
        );
    }
    let jac = jacobian(field, 0.0, state)
        .context("Failed to evaluate the Jacobian at the equilibrium.")?;
    let dim = VectorField::<f64>::dim(field);
    let eigs = eigenvalues(&jac, dim)
        .context("Failed to compute eigenvalues of the Jacobian.")?;
    let classification =
        classify(&eigs, tolerance).context("Failed to classify the equilibrium.")?;

    Ok(EquilibriumAnalysis {
        state: state.to_vec(),
        residual_norm,
        jacobian: jac,
        eigenvalues: eigs,
        classification,
    })
}

#[cfg(test)]
mod tests {
    use super::{analyze_equilibrium, verify_equilibria, DEFAULT_TOLERANCE};
    use crate::model::{LotkaVolterra, LotkaVolterraParams, TwoPreyOnePredator, TwoPreyOnePredatorParams};
    use crate::stability::StabilityClass;

    fn classic_system() -> LotkaVolterra {
        LotkaVolterra::new(
            LotkaVolterraParams::new(1.0, 0.1, 1.5, 0.75).expect("valid parameters"),
        )
    }

    #[test]
    fn closed_form_equilibria_verify() {
        let system = classic_system();
        verify_equilibria(&system, &system.equilibria(), DEFAULT_TOLERANCE)
            .expect("closed-form equilibria must verify");

        let params = TwoPreyOnePredatorParams::new(1.0, 0.1, 0.8, 0.2, 1.5, 0.75, 0.5)
            .expect("valid parameters");
        let system = TwoPreyOnePredator::new(params);
        verify_equilibria(&system, &system.equilibria(), DEFAULT_TOLERANCE)
            .expect("closed-form equilibria must verify");
    }

    #[test]
    fn non_equilibrium_point_fails_verification() {
        let system = classic_system();
        let err = verify_equilibria(&system, &[vec![10.0, 5.0]], DEFAULT_TOLERANCE)
            .expect_err("expected error");
        assert!(format!("{err}").contains("not an equilibrium"));
    }

    #[test]
    fn verification_rejects_bad_arguments() {
        let system = classic_system();
        let err = verify_equilibria(&system, &[], DEFAULT_TOLERANCE).expect_err("expected error");
        assert!(format!("{err}").contains("No equilibrium points"));
        let err =
            verify_equilibria(&system, &[vec![0.0, 0.0]], -1.0).expect_err("expected error");
        assert!(format!("{err}").contains("tolerance"));
        let err = verify_equilibria(&system, &[vec![0.0]], DEFAULT_TOLERANCE)
            .expect_err("expected error");
        assert!(format!("{err}").contains("dimension mismatch"));
    }

    #[test]
    fn origin_is_a_saddle() {
        let system = classic_system();
        let analysis =
            analyze_equilibrium(&system, &[0.0, 0.0], DEFAULT_TOLERANCE).expect("should analyze");
        assert_eq!(analysis.classification, StabilityClass::Saddle);
        assert!(analysis.residual_norm < DEFAULT_TOLERANCE);
        // Jacobian at the origin decouples into growth a and decay -c.
        let expected = [1.0, 0.0, 0.0, -1.5];
        for (got, want) in analysis.jacobian.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn coexistence_point_is_a_center_with_the_linearized_period() {
        let system = classic_system();
        let analysis =
            analyze_equilibrium(&system, &[20.0, 10.0], DEFAULT_TOLERANCE).expect("should analyze");

        let omega = (1.0f64 * 1.5).sqrt();
        assert!((omega - 1.224744871391589).abs() < 1e-12);
        for e in &analysis.eigenvalues {
            assert!(e.re.abs() < 1e-9, "eigenvalue {:?} is not purely imaginary", e);
            assert!((e.im.abs() - omega).abs() < 1e-9);
        }

        match analysis.classification {
            StabilityClass::Center { period } => {
                assert!((period - 5.1302).abs() < 1e-3);
            }
            other => panic!("expected a center, got {:?}", other),
        }
    }
}

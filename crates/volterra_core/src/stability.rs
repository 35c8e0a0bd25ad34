use anyhow::{bail, Result};
use nalgebra::DMatrix;
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Local behavior near an equilibrium, read off the Jacobian's
/// eigenvalues. Informational only; never feeds back into integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StabilityClass {
    /// Real eigenvalues of mixed sign: unstable in at least one
    /// direction.
    Saddle,
    /// Purely imaginary eigenvalues: closed orbits around the point,
    /// with the period of the slowest rotation.
    Center { period: f64 },
    StableNode,
    UnstableNode,
    StableFocus,
    UnstableFocus,
    /// At least one eigenvalue sits on the tolerance boundary without
    /// the whole spectrum being purely imaginary; linearization is
    /// inconclusive.
    Degenerate,
}

/// Eigenvalues of a row-major `dim` x `dim` matrix.
pub fn eigenvalues(matrix: &[f64], dim: usize) -> Result<Vec<Complex<f64>>> {
    if dim == 0 {
        bail!("Matrix must have positive dimension.");
    }
    if matrix.len() != dim * dim {
        bail!(
            "Matrix slice has incorrect size. Expected {}, got {}.",
            dim * dim,
            matrix.len()
        );
    }
    let m = DMatrix::from_row_slice(dim, dim, matrix);
    Ok(m.complex_eigenvalues().iter().cloned().collect())
}

/// Classifies an equilibrium from its Jacobian eigenvalues.
///
/// `tolerance` decides when a real or imaginary part counts as zero.
pub fn classify(eigenvalues: &[Complex<f64>], tolerance: f64) -> Result<StabilityClass> {
    if eigenvalues.is_empty() {
        bail!("Cannot classify an empty spectrum.");
    }
    if !(tolerance > 0.0 && tolerance.is_finite()) {
        bail!("tolerance must be positive and finite.");
    }

    let all_re_zero = eigenvalues.iter().all(|e| e.re.abs() <= tolerance);
    let any_im = eigenvalues.iter().any(|e| e.im.abs() > tolerance);
    let all_im_nonzero_or_zero_pair = eigenvalues
        .iter()
        .all(|e| e.im.abs() > tolerance || e.norm() <= tolerance);

    if all_re_zero && any_im && all_im_nonzero_or_zero_pair {
        let omega = eigenvalues
            .iter()
            .map(|e| e.im.abs())
            .filter(|im| *im > tolerance)
            .fold(f64::MAX, f64::min);
        return Ok(StabilityClass::Center { period: TAU / omega });
    }

    let any_pos = eigenvalues.iter().any(|e| e.re > tolerance);
    let any_neg = eigenvalues.iter().any(|e| e.re < -tolerance);
    let any_marginal = eigenvalues.iter().any(|e| e.re.abs() <= tolerance);

    if any_pos && any_neg {
        return Ok(StabilityClass::Saddle);
    }
    if any_marginal {
        return Ok(StabilityClass::Degenerate);
    }
    if any_neg {
        return Ok(if any_im {
            StabilityClass::StableFocus
        } else {
            StabilityClass::StableNode
        });
    }
    Ok(if any_im {
        StabilityClass::UnstableFocus
    } else {
        StabilityClass::UnstableNode
    })
}

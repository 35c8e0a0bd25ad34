use crate::grid::TimeGrid;
use crate::solvers::{Rk4, Tsit5};
use crate::traits::{Stepper, VectorField};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Which fixed-step method drives the integration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum SolverKind {
    Rk4,
    Tsit5,
}

impl SolverKind {
    fn build(self, dim: usize) -> InternalStepper {
        match self {
            SolverKind::Rk4 => InternalStepper::Rk4(Rk4::new(dim)),
            SolverKind::Tsit5 => InternalStepper::Tsit5(Tsit5::new(dim)),
        }
    }
}

enum InternalStepper {
    Rk4(Rk4<f64>),
    Tsit5(Tsit5<f64>),
}

impl InternalStepper {
    fn step(&mut self, field: &impl VectorField<f64>, t: &mut f64, state: &mut [f64], dt: f64) {
        match self {
            InternalStepper::Rk4(s) => s.step(field, t, state, dt),
            InternalStepper::Tsit5(s) => s.step(field, t, state, dt),
        }
    }
}

/// How much diagnostic output the caller wants alongside the trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Diagnostics {
    /// Trajectory only. A failed run is observable as a trajectory
    /// shorter than the grid.
    Minimal,
    /// Trajectory plus an [`IntegrationReport`].
    Verbose,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntegrationSettings {
    /// Upper bound on the internal step size. Grid intervals wider than
    /// this are subdivided into equal substeps.
    pub max_step: f64,
    pub diagnostics: Diagnostics,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            max_step: 0.01,
            diagnostics: Diagnostics::Minimal,
        }
    }
}

/// Outcome of a single integration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IntegrationStatus {
    Success,
    /// The state stopped being finite while advancing toward the grid
    /// point at `at_time`. The trajectory holds every grid point before
    /// it.
    Failed { at_time: f64, reason: String },
}

impl IntegrationStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, IntegrationStatus::Success)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationReport {
    pub status: IntegrationStatus,
    /// Internal steps actually taken, counting substeps.
    pub steps_taken: usize,
}

/// States sampled at grid points, flattened row-major: the state at
/// sample `i` occupies `[i * dim, (i + 1) * dim)`. Read-only once
/// produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    dim: usize,
    times: Vec<f64>,
    states: Vec<f64>,
}

impl Trajectory {
    fn with_capacity(dim: usize, samples: usize) -> Self {
        Self {
            dim,
            times: Vec::with_capacity(samples),
            states: Vec::with_capacity(samples * dim),
        }
    }

    fn push(&mut self, t: f64, state: &[f64]) {
        self.times.push(t);
        self.states.extend_from_slice(state);
    }

    /// Number of recorded samples. Less than the grid length when the
    /// run failed partway.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// The state recorded at sample `index`.
    pub fn state_at(&self, index: usize) -> &[f64] {
        &self.states[index * self.dim..(index + 1) * self.dim]
    }

    /// One state component across all samples, e.g. the prey population
    /// over time.
    pub fn component(&self, component: usize) -> Vec<f64> {
        (0..self.len())
            .map(|i| self.states[i * self.dim + component])
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationOutput {
    pub trajectory: Trajectory,
    /// Present only when [`Diagnostics::Verbose`] was requested.
    pub report: Option<IntegrationReport>,
}

/// Integrates `field` from `initial_state` across `grid`, recording one
/// state per grid point.
///
/// Fails fast on configuration errors (dimension mismatch, bad
/// settings). Numerical breakdown during the run is not an `Err`: it is
/// reported through the diagnostic status, and the trajectory keeps
/// every grid point reached before the breakdown.
pub fn integrate<S: VectorField<f64>>(
    field: &S,
    solver: SolverKind,
    initial_state: &[f64],
    grid: &TimeGrid,
    settings: IntegrationSettings,
) -> Result<IntegrationOutput> {
    let dim = field.dim();
    if dim == 0 {
        bail!("Vector field has zero dimension.");
    }
    if initial_state.len() != dim {
        bail!(
            "Initial state dimension mismatch. Expected {}, got {}.",
            dim,
            initial_state.len()
        );
    }
    if !(settings.max_step > 0.0 && settings.max_step.is_finite()) {
        bail!("max_step must be positive and finite.");
    }
    for (i, &value) in initial_state.iter().enumerate() {
        if !value.is_finite() {
            bail!("Initial state component {} is not finite.", i);
        }
    }

    let times = grid.times();
    let mut stepper = solver.build(dim);
    let mut state = initial_state.to_vec();
    let mut t = times[0];
    let mut steps_taken = 0usize;
    let mut status = IntegrationStatus::Success;

    let mut trajectory = Trajectory::with_capacity(dim, times.len());
    trajectory.push(t, &state);

    'outer: for &target in &times[1..] {
        let interval = target - t;
        let substeps = (interval / settings.max_step).ceil().max(1.0) as usize;
        let dt = interval / substeps as f64;

        for _ in 0..substeps {
            stepper.step(field, &mut t, &mut state, dt);
            steps_taken += 1;

            if let Some(bad) = state.iter().position(|v| !v.is_finite()) {
                status = IntegrationStatus::Failed {
                    at_time: target,
                    reason: format!(
                        "State component {} became non-finite at t = {}.",
                        bad, t
                    ),
                };
                break 'outer;
            }
        }

        // Substeps divide the interval exactly; land on the grid point
        // rather than accumulate rounding.
        t = target;
        trajectory.push(t, &state);
    }

    let report = match settings.diagnostics {
        Diagnostics::Minimal => None,
        Diagnostics::Verbose => Some(IntegrationReport {
            status,
            steps_taken,
        }),
    };

    Ok(IntegrationOutput { trajectory, report })
}

/// Convenience wrapper: verbose integration that also insists on
/// success, for callers that treat breakdown as fatal.
pub fn integrate_checked<S: VectorField<f64>>(
    field: &S,
    solver: SolverKind,
    initial_state: &[f64],
    grid: &TimeGrid,
    max_step: f64,
) -> Result<Trajectory> {
    let settings = IntegrationSettings {
        max_step,
        diagnostics: Diagnostics::Verbose,
    };
    let output = integrate(field, solver, initial_state, grid, settings)
        .context("Integration rejected its configuration.")?;
    let report = output
        .report
        .expect("verbose diagnostics always produce a report");
    match report.status {
        IntegrationStatus::Success => Ok(output.trajectory),
        IntegrationStatus::Failed { at_time, reason } => {
            bail!(
                "Integration failed approaching t = {}: {}",
                at_time,
                reason
            )
        }
    }
}

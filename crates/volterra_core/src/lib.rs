/// The `volterra_core` crate defines predator-prey (Lotka-Volterra type)
/// ODE systems, locates and classifies their equilibria, and integrates
/// trajectories over a time grid for an external renderer to draw.
///
/// Key components:
/// - **Traits**: `Scalar` (numeric type abstraction), `VectorField` (ODE right-hand sides), `Stepper` (solvers).
/// - **Models**: `LotkaVolterra` (two species) and `TwoPreyOnePredator` (three species), with closed-form equilibria.
/// - **Autodiff**: Dual numbers deriving exact Jacobians from the field definitions themselves.
/// - **Solvers**: fixed-step integrators (RK4, Tsit5) behind the trajectory driver in `integrate`.
/// - **Stability**: eigenvalue-based classification (saddle, center with period, node, focus).
pub mod autodiff;
pub mod equilibrium;
pub mod grid;
pub mod integrate;
pub mod model;
pub mod render;
pub mod solvers;
pub mod stability;
pub mod traits;

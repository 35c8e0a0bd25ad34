use crate::grid::TimeGrid;
use crate::integrate::Trajectory;
use anyhow::{bail, Result};
use serde::Serialize;

/// One named curve, aligned to the frame's time grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// The handoff to the external rendering collaborator: a time grid and
/// one or more equal-length series. The renderer owns everything from
/// here on (curves, labels, legend, the persisted image).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotFrame {
    pub times: Vec<f64>,
    pub series: Vec<Series>,
}

impl PlotFrame {
    pub fn new(grid: &TimeGrid) -> Self {
        Self {
            times: grid.times().to_vec(),
            series: Vec::new(),
        }
    }

    /// Adds a curve. Length must match the time grid exactly; a
    /// mismatch is rejected, never truncated or padded.
    pub fn push_series(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        if values.len() != self.times.len() {
            bail!(
                "Series length mismatch. Frame has {} time samples, series has {} values.",
                self.times.len(),
                values.len()
            );
        }
        self.series.push(Series {
            name: name.into(),
            values,
        });
        Ok(())
    }

    /// Builds a frame from a complete trajectory, one labeled series
    /// per state component. Partial trajectories (from a failed run)
    /// are rejected; render what succeeded by building a shorter grid.
    pub fn from_trajectory(trajectory: &Trajectory, labels: &[&str]) -> Result<Self> {
        if labels.len() != trajectory.dim() {
            bail!(
                "Label count mismatch. Trajectory has {} components, got {} labels.",
                trajectory.dim(),
                labels.len()
            );
        }
        if trajectory.is_empty() {
            bail!("Cannot build a plot frame from an empty trajectory.");
        }

        let mut frame = Self {
            times: trajectory.times().to_vec(),
            series: Vec::with_capacity(labels.len()),
        };
        for (component, label) in labels.iter().enumerate() {
            frame.push_series(*label, trajectory.component(component))?;
        }
        Ok(frame)
    }
}

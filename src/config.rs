use crate::error::Error;
use crate::mesh::UniformMesh;
use crate::physics::IdealGas;
use crate::{BoundaryCondition, FluxSplitting};

/// Everything a run needs to know up front. A `Config` is not changed once
/// the run has started.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub mesh: UniformMesh,
    /// Number of time steps to take
    pub steps: u64,
    /// Fixed time step size
    pub dt: f64,
    pub eos: IdealGas,
    pub boundary: BoundaryCondition,
    pub splitting: FluxSplitting,
}

impl Config {
    /// Checks the mesh, and that the time step is positive and finite.
    pub fn validate(&self) -> Result<(), Error> {
        self.mesh.validate()?;
        if !(self.dt > 0.0) || !self.dt.is_finite() {
            return Err(Error::InvalidConfig(format!("time step must be positive, got {}", self.dt)));
        }
        Ok(())
    }

    /// Courant number `a dt / dx` for a given largest signal speed `a`. The
    /// scheme is stable when this does not exceed one.
    pub fn courant_number(&self, max_wavespeed: f64) -> f64 {
        max_wavespeed * self.dt / self.mesh.dx()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dt: f64) -> Config {
        Config {
            mesh: UniformMesh::unit_interval(100),
            steps: 10,
            dt,
            eos: IdealGas::default(),
            boundary: BoundaryCondition::Periodic,
            splitting: FluxSplitting::LaxFriedrichs,
        }
    }

    #[test]
    fn non_positive_time_step_is_rejected() {
        assert!(config(0.0).validate().is_err());
        assert!(config(-1e-3).validate().is_err());
        assert!(config(f64::NAN).validate().is_err());
        assert!(config(1e-3).validate().is_ok());
    }

    #[test]
    fn courant_number_scales_with_time_step() {
        assert!((config(1e-3).courant_number(2.0) - 0.2).abs() < 1e-12);
    }
}

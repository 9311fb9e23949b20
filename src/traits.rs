use crate::error::Error;
use crate::mesh::UniformMesh;
use crate::physics::{IdealGas, Primitive};
use crate::{BoundaryCondition, Config, NUM_FIELDS};

pub trait Solve {
    /// Returns the configuration the solver was built with.
    fn config(&self) -> &Config;

    /// Returns the conserved variable array for this solver. The data is
    /// row-major with contiguous conserved variable components.
    fn conserved(&self) -> Vec<f64>;

    /// Returns the primitive variable array computed by the most recent call
    /// to `conserved_to_primitive`.
    fn primitive(&self) -> Vec<f64>;

    /// Returns the split flux arrays `(F+, F-)` computed by the most recent
    /// call to `split_flux`.
    fn split_fluxes(&self) -> (Vec<f64>, Vec<f64>);

    /// Recomputes the primitive variable array from the conserved one. Fails
    /// on the first zone that has no physical primitive state.
    fn conserved_to_primitive(&mut self) -> Result<(), Error>;

    /// Returns the largest wavespeed among the zones in the solver's current
    /// primitive array.
    fn max_wavespeed(&self) -> f64;

    /// Splits the physical flux of every zone. The speed `a` bounds the
    /// signal speed on the whole grid.
    fn split_flux(&mut self, a: f64);

    /// Advances the conserved variable array by one time step using the
    /// current split fluxes.
    fn advance_conserved(&mut self, dt: f64);

    /// Takes one complete step: primitive recovery, wavespeed reduction, flux
    /// splitting, and the conservative update. Each stage is finished on all
    /// zones before the next begins. Returns the wavespeed used.
    fn advance(&mut self, dt: f64) -> Result<f64, Error> {
        self.conserved_to_primitive()?;
        let a = self.max_wavespeed();
        self.split_flux(a);
        self.advance_conserved(dt);
        Ok(a)
    }
}

pub trait Setup: Send + Sync {
    fn print_parameters(&self) {}

    /// Returns the string of model parameters this setup was created with,
    /// in `key=value:key=value` form.
    fn model_parameter_string(&self) -> String;

    fn initial_primitive(&self, x: f64) -> Primitive;

    fn boundary_condition(&self) -> BoundaryCondition;

    fn mesh(&self, resolution: usize) -> UniformMesh {
        UniformMesh::unit_interval(resolution)
    }

    /// Returns the exact solution at a point and time, if the setup has one.
    fn reference_solution(&self, _eos: &IdealGas, _x: f64, _time: f64) -> Option<Primitive> {
        None
    }

    fn initial_conserved_vec(&self, eos: &IdealGas, mesh: &UniformMesh) -> Vec<f64> {
        let mut conserved = vec![0.0; mesh.num_zones * NUM_FIELDS];
        for (i, cell) in conserved.chunks_exact_mut(NUM_FIELDS).enumerate() {
            let p = self.initial_primitive(mesh.cell_center(i));
            eos.conserved(p).write_to(cell);
        }
        conserved
    }
}

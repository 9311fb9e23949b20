//! Sequencing of solver steps over a whole run.

use crate::error::Error;
use crate::mesh::UniformMesh;
use crate::{Config, Solve};
use tracing::{debug, error};

/// Where a run is in its life cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No step has been taken yet.
    Initialized,
    /// The given number of steps are complete and more remain.
    StepComplete(u64),
    /// All configured steps are complete.
    Finished,
    /// A step failed; the solver state is no longer meaningful.
    Aborted,
}

/// The final conserved and primitive arrays of a run.
#[derive(Clone, Debug)]
pub struct Solution {
    pub mesh: UniformMesh,
    pub time: f64,
    pub iteration: u64,
    pub conserved: Vec<f64>,
    pub primitive: Vec<f64>,
}

pub struct Driver {
    config: Config,
    solver: Box<dyn Solve>,
    phase: Phase,
    iteration: u64,
    time: f64,
}

impl Driver {
    pub fn new(config: Config, solver: Box<dyn Solve>) -> Result<Self, Error> {
        Self::resume(config, solver, 0, 0.0)
    }

    /// Creates a driver that continues a run which has already taken
    /// `iteration` steps and reached `time`. The solver must have been built
    /// with the same configuration, or an `InvalidConfig` error is returned.
    pub fn resume(config: Config, solver: Box<dyn Solve>, iteration: u64, time: f64) -> Result<Self, Error> {
        config.validate()?;
        if solver.config() != &config {
            return Err(Error::InvalidConfig(format!(
                "solver was built with {:?}, driver was given {:?}",
                solver.config(),
                config
            )));
        }
        let phase = if iteration >= config.steps {
            Phase::Finished
        } else if iteration == 0 {
            Phase::Initialized
        } else {
            Phase::StepComplete(iteration)
        };
        Ok(Self {
            config,
            solver,
            phase,
            iteration,
            time,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Finished | Phase::Aborted)
    }

    /// Returns a copy of the current conserved variable array.
    pub fn conserved(&self) -> Vec<f64> {
        self.solver.conserved()
    }

    /// Takes one time step. Stepping a finished or aborted run is a
    /// `RunFinished` error; a failed step aborts the run.
    pub fn step(&mut self) -> Result<Phase, Error> {
        if self.is_done() {
            return Err(Error::RunFinished);
        }
        match self.solver.advance(self.config.dt) {
            Ok(a) => {
                self.iteration += 1;
                self.time += self.config.dt;
                debug!(
                    "[{}] max wavespeed={:.6} courant number={:.4}",
                    self.iteration,
                    a,
                    self.config.courant_number(a)
                );
                self.phase = if self.iteration >= self.config.steps {
                    Phase::Finished
                } else {
                    Phase::StepComplete(self.iteration)
                };
                Ok(self.phase)
            }
            Err(e) => {
                error!("step {} failed at t={:.6}: {}", self.iteration + 1, self.time, e);
                self.phase = Phase::Aborted;
                Err(e)
            }
        }
    }

    /// Steps until all configured steps are done.
    pub fn run(&mut self) -> Result<Phase, Error> {
        while !self.is_done() {
            self.step()?;
        }
        Ok(self.phase)
    }

    /// Recovers the primitive state of the final conserved state and hands
    /// both arrays back.
    pub fn finish(mut self) -> Result<Solution, Error> {
        self.solver.conserved_to_primitive()?;
        Ok(Solution {
            mesh: self.config.mesh,
            time: self.time,
            iteration: self.iteration,
            conserved: self.solver.conserved(),
            primitive: self.solver.primitive(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::euler1d;
    use crate::output::{conserved_totals, l1_density_error};
    use crate::physics::{IdealGas, Primitive};
    use crate::setups::make_setup;
    use crate::{BoundaryCondition, ExecutionMode, FluxSplitting, Setup, NUM_FIELDS};
    use std::sync::Arc;

    fn config(num_zones: usize, steps: u64, dt: f64, boundary: BoundaryCondition, splitting: FluxSplitting) -> Config {
        Config {
            mesh: UniformMesh::unit_interval(num_zones),
            steps,
            dt,
            eos: IdealGas::default(),
            boundary,
            splitting,
        }
    }

    fn driver(setup: &dyn Setup, config: Config) -> Driver {
        let u = setup.initial_conserved_vec(&config.eos, &config.mesh);
        let solver = euler1d::solver(ExecutionMode::CPU, 0, &config, &u).unwrap();
        Driver::new(config, solver).unwrap()
    }

    fn shocktube(parameters: &str) -> Arc<dyn Setup> {
        make_setup("shocktube", parameters).unwrap()
    }

    fn zone(data: &[f64], i: usize) -> &[f64] {
        &data[NUM_FIELDS * i..NUM_FIELDS * (i + 1)]
    }

    fn run_sod(splitting: FluxSplitting) -> (Arc<dyn Setup>, Config, Solution) {
        let setup = shocktube("");
        let config = config(1000, 100, 3e-4, BoundaryCondition::Reflective, splitting);
        let mut driver = driver(setup.as_ref(), config);
        assert_eq!(driver.run().unwrap(), Phase::Finished);
        (setup, config, driver.finish().unwrap())
    }

    #[test]
    fn phases_advance_to_finished() {
        let setup = make_setup("uniform", "").unwrap();
        let mut driver = driver(
            setup.as_ref(),
            config(10, 3, 1e-3, BoundaryCondition::Transmissive, FluxSplitting::LaxFriedrichs),
        );
        assert_eq!(driver.phase(), Phase::Initialized);
        assert_eq!(driver.step().unwrap(), Phase::StepComplete(1));
        assert_eq!(driver.step().unwrap(), Phase::StepComplete(2));
        assert_eq!(driver.step().unwrap(), Phase::Finished);
        assert!(matches!(driver.step(), Err(Error::RunFinished)));
        assert_eq!(driver.iteration(), 3);
        assert!((driver.time() - 3e-3).abs() < 1e-15);
    }

    #[test]
    fn zero_step_run_is_finished_from_the_start() {
        let setup = make_setup("uniform", "").unwrap();
        let mut driver = driver(
            setup.as_ref(),
            config(10, 0, 1e-3, BoundaryCondition::Transmissive, FluxSplitting::LaxFriedrichs),
        );
        assert_eq!(driver.phase(), Phase::Finished);
        assert_eq!(driver.run().unwrap(), Phase::Finished);
    }

    #[test]
    fn resumed_run_counts_from_its_checkpoint() {
        let setup = make_setup("uniform", "").unwrap();
        let config = config(10, 5, 1e-3, BoundaryCondition::Transmissive, FluxSplitting::LaxFriedrichs);
        let u = setup.initial_conserved_vec(&config.eos, &config.mesh);
        let solver = euler1d::solver(ExecutionMode::CPU, 0, &config, &u).unwrap();
        let mut driver = Driver::resume(config, solver, 3, 3e-3).unwrap();
        assert_eq!(driver.phase(), Phase::StepComplete(3));
        driver.run().unwrap();
        assert_eq!(driver.iteration(), 5);
    }

    #[test]
    fn solver_built_for_another_config_is_rejected() {
        let setup = make_setup("uniform", "").unwrap();
        let config = config(10, 5, 1e-3, BoundaryCondition::Transmissive, FluxSplitting::LaxFriedrichs);
        let u = setup.initial_conserved_vec(&config.eos, &config.mesh);
        let other = Config {
            boundary: BoundaryCondition::Periodic,
            ..config
        };
        let solver = euler1d::solver(ExecutionMode::CPU, 0, &other, &u).unwrap();
        assert!(matches!(Driver::new(config, solver), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn uniform_flow_is_unchanged_by_one_step() {
        // One thousand zones of rho=1, v=0.5, T=1 in an open domain.
        let setup = make_setup("uniform", "").unwrap();
        let config = config(1000, 1, 1e-4, BoundaryCondition::Transmissive, FluxSplitting::LaxFriedrichs);
        let u = setup.initial_conserved_vec(&config.eos, &config.mesh);
        let mut solver = euler1d::solver(ExecutionMode::CPU, 0, &config, &u).unwrap();
        solver.conserved_to_primitive().unwrap();
        let before = solver.primitive();

        let mut driver = Driver::new(config, solver).unwrap();
        assert_eq!(driver.run().unwrap(), Phase::Finished);
        let solution = driver.finish().unwrap();

        assert_eq!(solution.primitive, before);
        assert_eq!(solution.conserved, u);
        for cell in solution.primitive.chunks_exact(NUM_FIELDS) {
            assert!((cell[0] - 1.0).abs() < 1e-12);
            assert!((cell[1] - 0.5).abs() < 1e-12);
            assert!((cell[2] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn uniform_state_is_a_fixed_point_for_every_boundary_and_splitting() {
        for splitting in [FluxSplitting::LaxFriedrichs, FluxSplitting::Shll] {
            for (boundary, velocity) in [
                (BoundaryCondition::Transmissive, "0.5"),
                (BoundaryCondition::Periodic, "-0.7"),
                (BoundaryCondition::Reflective, "0"),
            ] {
                let setup = make_setup("uniform", &format!("velocity={}", velocity)).unwrap();
                let config = config(50, 20, 1e-3, boundary, splitting);
                let u = setup.initial_conserved_vec(&config.eos, &config.mesh);
                let mut driver = driver(setup.as_ref(), config);
                driver.run().unwrap();
                assert_eq!(driver.conserved(), u, "{:?} {:?}", boundary, splitting);
            }
        }
    }

    #[test]
    fn sod_shocktube_develops_rarefaction_contact_and_shock() {
        for splitting in [FluxSplitting::LaxFriedrichs, FluxSplitting::Shll] {
            let (setup, config, solution) = run_sod(splitting);
            let initial = setup.initial_conserved_vec(&config.eos, &config.mesh);
            let rho = |i: usize| zone(&solution.primitive, i)[0];
            let pressure = |i: usize| config.eos.pressure(Primitive::from_slice(zone(&solution.primitive, i)));

            // No wave has travelled more than 100 zones from the diaphragm.
            assert_eq!(&solution.conserved[..NUM_FIELDS * 400], &initial[..NUM_FIELDS * 400]);
            assert_eq!(&solution.conserved[NUM_FIELDS * 600..], &initial[NUM_FIELDS * 600..]);

            // Shock: the right-most zone noticeably compressed.
            let s = (500..1000).rev().find(|&i| rho(i) > 1.5).unwrap();
            assert!(s > 520 && s < 600, "shock at zone {}", s);
            assert!(rho(s + 10) < 1.01);
            assert!(rho(s - 10) > 1.9);
            let shock_width = (500..1000).filter(|&i| rho(i) > 1.1 && rho(i) < 1.9).count();
            assert!(shock_width < 10, "shock is {} zones wide", shock_width);

            // Contact: a density drop across a pressure plateau.
            let plateau: Vec<f64> = (s - 45..s - 10).map(pressure).collect();
            let pmax = plateau.iter().cloned().fold(f64::MIN, f64::max);
            let pmin = plateau.iter().cloned().fold(f64::MAX, f64::min);
            assert!((pmax - pmin) / pmax < 0.08);
            assert!(rho(s - 45) / rho(s - 10) > 1.5);
            assert!(zone(&solution.primitive, s - 20)[1] > 0.5);

            // Rarefaction: a smooth fan spread over many zones.
            let fan = (0..s - 45).filter(|&i| rho(i) > 5.0 && rho(i) < 9.5).count();
            assert!(fan > 20, "rarefaction is {} zones wide", fan);

            let error = l1_density_error(setup.as_ref(), &config.eos, &config.mesh, &solution.primitive, solution.time);
            assert!(error.unwrap() < 0.08);
        }
    }

    #[test]
    fn mirrored_shocktube_gives_the_mirrored_solution() {
        for splitting in [FluxSplitting::LaxFriedrichs, FluxSplitting::Shll] {
            let config = config(200, 60, 1e-3, BoundaryCondition::Reflective, splitting);
            let mut a = driver(shocktube("density_left=10:density_right=1").as_ref(), config);
            let mut b = driver(shocktube("density_left=1:density_right=10").as_ref(), config);
            a.run().unwrap();
            b.run().unwrap();
            let (ua, ub) = (a.conserved(), b.conserved());
            let n = config.mesh.num_zones;

            for i in 0..n {
                let (za, zb) = (zone(&ua, i), zone(&ub, n - 1 - i));
                assert_eq!(za[0], zb[0]);
                assert_eq!(za[1], -zb[1]);
                assert_eq!(za[2], zb[2]);
            }
        }
    }

    #[test]
    fn periodic_domain_conserves_mass_momentum_and_energy() {
        for splitting in [FluxSplitting::LaxFriedrichs, FluxSplitting::Shll] {
            let setup = make_setup("density-wave", "").unwrap();
            let config = config(200, 300, 1e-3, BoundaryCondition::Periodic, splitting);
            let mut driver = driver(setup.as_ref(), config);
            let before = conserved_totals(&config.mesh, &driver.conserved());
            driver.run().unwrap();
            let after = conserved_totals(&config.mesh, &driver.conserved());
            for q in 0..3 {
                assert!((after[q] - before[q]).abs() < 1e-12 * before[q].abs().max(1.0));
            }
        }
    }

    #[test]
    fn reflecting_walls_conserve_mass_and_energy() {
        for splitting in [FluxSplitting::LaxFriedrichs, FluxSplitting::Shll] {
            let setup = shocktube("");
            let config = config(200, 300, 1e-3, BoundaryCondition::Reflective, splitting);
            let mut driver = driver(setup.as_ref(), config);
            let before = conserved_totals(&config.mesh, &driver.conserved());
            driver.run().unwrap();
            let after = conserved_totals(&config.mesh, &driver.conserved());
            assert!((after[0] - before[0]).abs() < 1e-12 * before[0]);
            assert!((after[2] - before[2]).abs() < 1e-12 * before[2]);
        }
    }

    #[test]
    fn supersonic_density_wave_is_damped_by_both_splittings() {
        for splitting in [FluxSplitting::LaxFriedrichs, FluxSplitting::Shll] {
            let setup = make_setup("density-wave", "velocity=3").unwrap();
            let config = config(200, 4000, 5e-4, BoundaryCondition::Periodic, splitting);
            let mut driver = driver(setup.as_ref(), config);
            driver.run().unwrap();
            let solution = driver.finish().unwrap();
            let rho: Vec<f64> = solution.primitive.chunks_exact(NUM_FIELDS).map(|c| c[0]).collect();
            let max = rho.iter().cloned().fold(f64::MIN, f64::max);
            let min = rho.iter().cloned().fold(f64::MAX, f64::min);
            assert!(max < 1.15 && min > 0.85, "{:?}: density in [{}, {}]", splitting, min, max);
        }
    }

    #[test]
    fn density_and_pressure_stay_positive_with_a_stable_time_step() {
        for splitting in [FluxSplitting::LaxFriedrichs, FluxSplitting::Shll] {
            let config = config(200, 300, 1e-3, BoundaryCondition::Reflective, splitting);
            let mut driver = driver(shocktube("").as_ref(), config);
            while !driver.is_done() {
                driver.step().unwrap();
                for cell in driver.conserved().chunks_exact(NUM_FIELDS) {
                    let u = crate::physics::Conserved::from_slice(cell);
                    let p = config.eos.primitive(u).unwrap();
                    assert!(p.density() > 0.0 && config.eos.pressure(p) > 0.0);
                }
            }
        }
    }

    #[test]
    fn too_large_a_time_step_aborts_with_a_non_physical_state() {
        for splitting in [FluxSplitting::LaxFriedrichs, FluxSplitting::Shll] {
            // Courant number near 2.4, far past the stability limit.
            let config = config(200, 50, 5e-3, BoundaryCondition::Reflective, splitting);
            let mut driver = driver(shocktube("").as_ref(), config);
            match driver.run() {
                Err(Error::NonPhysicalState { .. }) => {}
                other => panic!("expected a non-physical state, got {:?}", other),
            }
            assert_eq!(driver.phase(), Phase::Aborted);
            assert!(matches!(driver.step(), Err(Error::RunFinished)));
        }
    }

    #[test]
    #[cfg(feature = "threads")]
    fn pooled_sod_run_matches_the_serial_run_bitwise() {
        let setup = shocktube("");
        let config = config(1000, 100, 3e-4, BoundaryCondition::Reflective, FluxSplitting::Shll);
        let u = setup.initial_conserved_vec(&config.eos, &config.mesh);
        let solver = euler1d::solver(ExecutionMode::Pool, 4, &config, &u).unwrap();
        let mut pooled = Driver::new(config, solver).unwrap();
        pooled.run().unwrap();
        let (_, _, serial) = run_sod(FluxSplitting::Shll);
        let pooled = pooled.finish().unwrap();
        assert_eq!(pooled.conserved, serial.conserved);
        assert_eq!(pooled.primitive, serial.primitive);
    }
}

use crate::error::Error;
use crate::physics::splitting::split_flux;
use crate::physics::update::{advance_zone, GhostFluxes};
use crate::physics::{Conserved, Primitive};
use crate::{Config, ExecutionMode, Solve, NUM_FIELDS};
use cfg_if::cfg_if;
use lane_core::Lanes;

/// Creates a solver for the given execution mode. `num_threads` is the size
/// of the lane pool and is ignored in `CPU` mode.
pub fn solver(
    mode: ExecutionMode,
    num_threads: usize,
    config: &Config,
    conserved: &[f64],
) -> Result<Box<dyn Solve>, Error> {
    match mode {
        ExecutionMode::CPU => Ok(Box::new(cpu::Solver::new(config, conserved)?)),
        ExecutionMode::Pool => {
            cfg_if! {
                if #[cfg(feature = "threads")] {
                    Ok(Box::new(pool::Solver::new(config, conserved, num_threads)?))
                } else {
                    std::convert::identity(num_threads); // black-box
                    Err(Error::CompiledWithoutThreads)
                }
            }
        }
    }
}

fn zone(buffer: &[f64], i: usize) -> Conserved {
    Conserved::from_slice(&buffer[NUM_FIELDS * i..NUM_FIELDS * (i + 1)])
}

pub mod cpu {
    use super::*;

    pub struct Solver {
        config: Config,
        conserved1: Vec<f64>,
        conserved2: Vec<f64>,
        primitive: Vec<f64>,
        flux_plus: Vec<f64>,
        flux_minus: Vec<f64>,
        pub(super) lanes: Lanes,
    }

    impl Solver {
        pub fn new(config: &Config, conserved: &[f64]) -> Result<Self, Error> {
            config.validate()?;
            let num_zones = config.mesh.num_zones;
            if conserved.len() != num_zones * NUM_FIELDS {
                return Err(Error::InvalidConfig(format!(
                    "conserved array has {} values, expected {} for {} zones",
                    conserved.len(),
                    num_zones * NUM_FIELDS,
                    num_zones
                )));
            }
            Ok(Self {
                config: *config,
                conserved1: conserved.to_vec(),
                conserved2: conserved.to_vec(),
                primitive: vec![0.0; num_zones * NUM_FIELDS],
                flux_plus: vec![0.0; num_zones * NUM_FIELDS],
                flux_minus: vec![0.0; num_zones * NUM_FIELDS],
                lanes: Lanes::serial(),
            })
        }

        fn num_zones(&self) -> usize {
            self.config.mesh.num_zones
        }
    }

    impl Solve for Solver {
        fn config(&self) -> &Config {
            &self.config
        }
        fn conserved(&self) -> Vec<f64> {
            self.conserved1.clone()
        }
        fn primitive(&self) -> Vec<f64> {
            self.primitive.clone()
        }
        fn split_fluxes(&self) -> (Vec<f64>, Vec<f64>) {
            (self.flux_plus.clone(), self.flux_minus.clone())
        }
        fn conserved_to_primitive(&mut self) -> Result<(), Error> {
            let eos = self.config.eos;
            let conserved = &self.conserved1;
            self.lanes
                .try_for_each_cell(&mut self.primitive, NUM_FIELDS, |i, cell| {
                    let p = eos.primitive(zone(conserved, i)).map_err(|e| e.in_zone(i))?;
                    p.write_to(cell);
                    Ok(())
                })
        }
        fn max_wavespeed(&self) -> f64 {
            let eos = self.config.eos;
            let primitive = &self.primitive;
            self.lanes
                .maximum(self.num_zones(), |i| {
                    eos.wavespeed(Primitive::from_slice(&primitive[NUM_FIELDS * i..]))
                })
                .unwrap_or(0.0)
        }
        fn split_flux(&mut self, a: f64) {
            let Config { eos, splitting, .. } = self.config;
            let conserved = &self.conserved1;
            let primitive = &self.primitive;
            self.lanes.for_each_cell2(
                &mut self.flux_plus,
                &mut self.flux_minus,
                NUM_FIELDS,
                |i, plus, minus| {
                    let p = Primitive::from_slice(&primitive[NUM_FIELDS * i..]);
                    let (fp, fm) = split_flux(splitting, &eos, zone(conserved, i), p, a);
                    fp.write_to(plus);
                    fm.write_to(minus);
                },
            )
        }
        fn advance_conserved(&mut self, dt: f64) {
            let n = self.num_zones();
            let dt_over_dx = dt / self.config.mesh.dx();
            let (fp, fm) = (&self.flux_plus, &self.flux_minus);
            let ghosts = GhostFluxes::new(
                self.config.boundary,
                (zone(fp, 0), zone(fm, 0)),
                (zone(fp, n - 1), zone(fm, n - 1)),
            );
            let conserved = &self.conserved1;
            self.lanes.for_each_cell(&mut self.conserved2, NUM_FIELDS, |i, cell| {
                let plus_left = if i == 0 { ghosts.left_plus } else { zone(fp, i - 1) };
                let minus_right = if i == n - 1 { ghosts.right_minus } else { zone(fm, i + 1) };
                advance_zone(zone(conserved, i), plus_left, zone(fp, i), zone(fm, i), minus_right, dt_over_dx)
                    .write_to(cell)
            });
            std::mem::swap(&mut self.conserved1, &mut self.conserved2);
        }
    }
}

#[cfg(feature = "threads")]
pub mod pool {
    use super::*;
    pub struct Solver(cpu::Solver);

    impl Solver {
        pub fn new(config: &Config, conserved: &[f64], num_threads: usize) -> Result<Self, Error> {
            let mut solver = cpu::Solver::new(config, conserved)?;
            solver.lanes = Lanes::with_threads(num_threads)?;
            Ok(Self(solver))
        }
    }

    impl Solve for Solver {
        fn config(&self) -> &Config {
            self.0.config()
        }
        fn conserved(&self) -> Vec<f64> {
            self.0.conserved()
        }
        fn primitive(&self) -> Vec<f64> {
            self.0.primitive()
        }
        fn split_fluxes(&self) -> (Vec<f64>, Vec<f64>) {
            self.0.split_fluxes()
        }
        fn conserved_to_primitive(&mut self) -> Result<(), Error> {
            self.0.conserved_to_primitive()
        }
        fn max_wavespeed(&self) -> f64 {
            self.0.max_wavespeed()
        }
        fn split_flux(&mut self, a: f64) {
            self.0.split_flux(a)
        }
        fn advance_conserved(&mut self, dt: f64) {
            self.0.advance_conserved(dt)
        }
    }
}

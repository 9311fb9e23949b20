//! Master list of the problem setups.

use crate::error::{self, Error::*};
use crate::parse::{parameter_pairs, parse_parameter};
use crate::physics::{IdealGas, Primitive};
use crate::riemann::{GasState, RiemannProblem};
use crate::{BoundaryCondition, Setup};
use std::f64::consts::PI;
use std::fmt::Write;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

macro_rules! setup_builder {
    ($setup:ident) => {
        Box::new(|p| Ok(Arc::new($setup::from_str(p)?)))
    };
}

type SetupFunction = Box<dyn Fn(&str) -> Result<Arc<dyn Setup>, error::Error>>;

fn setups() -> Vec<(&'static str, SetupFunction)> {
    vec![
        ("density-wave", setup_builder!(DensityWave)),
        ("shocktube", setup_builder!(Shocktube)),
        ("uniform", setup_builder!(Uniform)),
    ]
}

/// Generates an error message of type `PrintUserInformation` listing known
/// problem setups.
pub fn possible_setups_info() -> error::Error {
    let mut message = String::new();
    writeln!(message, "specify setup:").ok();
    for (setup_name, _) in setups() {
        writeln!(message, "    {}", setup_name).ok();
    }
    PrintUserInformation(message)
}

/// Tries to construct a dynamic setup from a string key and model parameter
/// string.
///
/// The result is put under `Arc` so it can be shared safely between threads.
/// If no setup matches the given name, a `PrintUserInformation` error is
/// returned listing the available setups. If a setup is found, but has an
/// invalid configuration, the `InvalidSetup` error is returned here.
pub fn make_setup(setup_name: &str, parameters: &str) -> Result<Arc<dyn Setup>, error::Error> {
    setups()
        .into_iter()
        .find(|&(n, _)| n == setup_name)
        .map(|(_, f)| f(parameters))
        .ok_or_else(possible_setups_info)?
}

fn unknown_parameter(key: &str, known: &[&str]) -> error::Error {
    InvalidSetup(format!("unknown parameter '{}', expected one of: {}", key, known.join(", ")))
}

fn require_positive(key: &str, value: f64) -> Result<f64, error::Error> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(InvalidSetup(format!("{} must be positive, got {}", key, value)))
    }
}

/// Sod-type shocktube: gas at rest with a density jump at the domain
/// midpoint, bounded by reflecting walls.
pub struct Shocktube {
    pub density_left: f64,
    pub density_right: f64,
    pub temperature: f64,
    parameters: String,
}

impl FromStr for Shocktube {
    type Err = error::Error;
    fn from_str(parameters: &str) -> Result<Self, Self::Err> {
        const KEYS: [&str; 3] = ["density_left", "density_right", "temperature"];
        let mut setup = Self {
            density_left: 10.0,
            density_right: 1.0,
            temperature: 1.0,
            parameters: parameters.to_owned(),
        };
        for (key, value) in parameter_pairs(parameters)? {
            let x = require_positive(key, parse_parameter(key, value)?)?;
            match key {
                "density_left" => setup.density_left = x,
                "density_right" => setup.density_right = x,
                "temperature" => setup.temperature = x,
                _ => return Err(unknown_parameter(key, &KEYS)),
            }
        }
        Ok(setup)
    }
}

impl Shocktube {
    fn riemann_problem(&self, eos: &IdealGas) -> Option<RiemannProblem> {
        let state = |density: f64| {
            let p = Primitive(density, 0.0, self.temperature);
            GasState::new(density, 0.0, eos.pressure(p))
        };
        RiemannProblem::new(eos.gamma(), state(self.density_left), state(self.density_right)).ok()
    }
}

impl Setup for Shocktube {
    fn print_parameters(&self) {
        info!(
            "shocktube: density_left={} density_right={} temperature={}",
            self.density_left, self.density_right, self.temperature
        );
    }

    fn model_parameter_string(&self) -> String {
        self.parameters.clone()
    }

    fn initial_primitive(&self, x: f64) -> Primitive {
        if x < 0.5 {
            Primitive(self.density_left, 0.0, self.temperature)
        } else {
            Primitive(self.density_right, 0.0, self.temperature)
        }
    }

    fn boundary_condition(&self) -> BoundaryCondition {
        BoundaryCondition::Reflective
    }

    /// The exact solution is valid until the first wave reaches a wall.
    fn reference_solution(&self, eos: &IdealGas, x: f64, time: f64) -> Option<Primitive> {
        if time <= 0.0 {
            return Some(self.initial_primitive(x));
        }
        let problem = self.riemann_problem(eos)?;
        let (left, right) = problem.outer_wave_speeds();
        if 0.5 + left * time < 0.0 || 0.5 + right * time > 1.0 {
            return None;
        }
        let w = problem.sample((x - 0.5) / time);
        Some(Primitive(
            w.density,
            w.velocity,
            w.pressure / (w.density * eos.gas_constant()),
        ))
    }
}

/// Gas of uniform density, velocity and temperature, in an open domain.
pub struct Uniform {
    pub density: f64,
    pub velocity: f64,
    pub temperature: f64,
    parameters: String,
}

impl FromStr for Uniform {
    type Err = error::Error;
    fn from_str(parameters: &str) -> Result<Self, Self::Err> {
        const KEYS: [&str; 3] = ["density", "velocity", "temperature"];
        let mut setup = Self {
            density: 1.0,
            velocity: 0.5,
            temperature: 1.0,
            parameters: parameters.to_owned(),
        };
        for (key, value) in parameter_pairs(parameters)? {
            let x = parse_parameter(key, value)?;
            match key {
                "density" => setup.density = require_positive(key, x)?,
                "velocity" => setup.velocity = x,
                "temperature" => setup.temperature = require_positive(key, x)?,
                _ => return Err(unknown_parameter(key, &KEYS)),
            }
        }
        Ok(setup)
    }
}

impl Setup for Uniform {
    fn print_parameters(&self) {
        info!(
            "uniform: density={} velocity={} temperature={}",
            self.density, self.velocity, self.temperature
        );
    }

    fn model_parameter_string(&self) -> String {
        self.parameters.clone()
    }

    fn initial_primitive(&self, _x: f64) -> Primitive {
        Primitive(self.density, self.velocity, self.temperature)
    }

    fn boundary_condition(&self) -> BoundaryCondition {
        BoundaryCondition::Transmissive
    }

    fn reference_solution(&self, _eos: &IdealGas, x: f64, _time: f64) -> Option<Primitive> {
        Some(self.initial_primitive(x))
    }
}

/// A sinusoidal density profile carried at uniform velocity and pressure
/// through a periodic domain. The temperature varies inversely with the
/// density so the pressure is uniform.
pub struct DensityWave {
    pub density: f64,
    pub amplitude: f64,
    pub velocity: f64,
    pub temperature: f64,
    parameters: String,
}

impl FromStr for DensityWave {
    type Err = error::Error;
    fn from_str(parameters: &str) -> Result<Self, Self::Err> {
        const KEYS: [&str; 4] = ["density", "amplitude", "velocity", "temperature"];
        let mut setup = Self {
            density: 1.0,
            amplitude: 0.2,
            velocity: 0.5,
            temperature: 1.0,
            parameters: parameters.to_owned(),
        };
        for (key, value) in parameter_pairs(parameters)? {
            let x = parse_parameter(key, value)?;
            match key {
                "density" => setup.density = require_positive(key, x)?,
                "amplitude" => setup.amplitude = x,
                "velocity" => setup.velocity = x,
                "temperature" => setup.temperature = require_positive(key, x)?,
                _ => return Err(unknown_parameter(key, &KEYS)),
            }
        }
        if setup.amplitude.abs() >= setup.density {
            return Err(InvalidSetup(format!(
                "amplitude {} would make the density non-positive",
                setup.amplitude
            )));
        }
        Ok(setup)
    }
}

impl Setup for DensityWave {
    fn print_parameters(&self) {
        info!(
            "density-wave: density={} amplitude={} velocity={} temperature={}",
            self.density, self.amplitude, self.velocity, self.temperature
        );
    }

    fn model_parameter_string(&self) -> String {
        self.parameters.clone()
    }

    fn initial_primitive(&self, x: f64) -> Primitive {
        let rho = self.density + self.amplitude * (2.0 * PI * x).sin();
        Primitive(rho, self.velocity, self.temperature * self.density / rho)
    }

    fn boundary_condition(&self) -> BoundaryCondition {
        BoundaryCondition::Periodic
    }

    fn reference_solution(&self, _eos: &IdealGas, x: f64, time: f64) -> Option<Primitive> {
        Some(self.initial_primitive((x - self.velocity * time).rem_euclid(1.0)))
    }
}

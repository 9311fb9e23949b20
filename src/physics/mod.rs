//! Cell-local gas dynamics: the conserved and primitive state of a zone, and
//! the ideal-gas relations between them.

pub mod splitting;
pub mod update;

use crate::error::Error;
use std::ops::{Add, Mul, Sub};

/// Conserved quantities of a zone: mass density, momentum density and total
/// energy density. Split fluxes are stored with the same layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Conserved(pub f64, pub f64, pub f64);

/// Primitive quantities of a zone: mass density, velocity and temperature.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Primitive(pub f64, pub f64, pub f64);

impl Conserved {
    pub fn from_slice(cell: &[f64]) -> Self {
        Self(cell[0], cell[1], cell[2])
    }

    pub fn write_to(self, cell: &mut [f64]) {
        cell[0] = self.0;
        cell[1] = self.1;
        cell[2] = self.2;
    }

    pub fn density(self) -> f64 {
        self.0
    }

    pub fn momentum(self) -> f64 {
        self.1
    }

    pub fn energy(self) -> f64 {
        self.2
    }

    /// The state seen in a mirror placed at a zone face: same density and
    /// energy, reversed momentum.
    pub fn mirror(self) -> Self {
        Self(self.0, -self.1, self.2)
    }
}

impl Primitive {
    pub fn from_slice(cell: &[f64]) -> Self {
        Self(cell[0], cell[1], cell[2])
    }

    pub fn write_to(self, cell: &mut [f64]) {
        cell[0] = self.0;
        cell[1] = self.1;
        cell[2] = self.2;
    }

    pub fn density(self) -> f64 {
        self.0
    }

    pub fn velocity(self) -> f64 {
        self.1
    }

    pub fn temperature(self) -> f64 {
        self.2
    }
}

impl Add<Conserved> for Conserved {
    type Output = Self;
    fn add(self, u: Self) -> Self {
        Self(self.0 + u.0, self.1 + u.1, self.2 + u.2)
    }
}

impl Sub<Conserved> for Conserved {
    type Output = Self;
    fn sub(self, u: Self) -> Self {
        Self(self.0 - u.0, self.1 - u.1, self.2 - u.2)
    }
}

impl Mul<f64> for Conserved {
    type Output = Self;
    fn mul(self, a: f64) -> Self {
        Self(self.0 * a, self.1 * a, self.2 * a)
    }
}

impl Mul<Conserved> for f64 {
    type Output = Conserved;
    fn mul(self, u: Conserved) -> Conserved {
        Conserved(self * u.0, self * u.1, self * u.2)
    }
}

/// A zone whose conserved state has no physical primitive counterpart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NonPhysical {
    pub density: f64,
    pub pressure: f64,
}

impl NonPhysical {
    pub fn in_zone(self, zone: usize) -> Error {
        Error::NonPhysicalState {
            zone,
            density: self.density,
            pressure: self.pressure,
        }
    }
}

/// Gamma-law equation of state `p = rho R T = (gamma - 1) rho e`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IdealGas {
    gamma: f64,
    gas_constant: f64,
    cv: f64,
}

impl Default for IdealGas {
    /// Diatomic gas in code units, `gamma = 1.4`, `R = 1`.
    fn default() -> Self {
        Self {
            gamma: 1.4,
            gas_constant: 1.0,
            cv: 1.0 / (1.4 - 1.0),
        }
    }
}

impl IdealGas {
    /// Creates an equation of state, or an `InvalidConfig` error unless
    /// `gamma > 1` and `R > 0`.
    pub fn new(gamma: f64, gas_constant: f64) -> Result<Self, Error> {
        if !(gamma > 1.0) || !gamma.is_finite() {
            return Err(Error::InvalidConfig(format!("adiabatic index must be > 1, got {}", gamma)));
        }
        if !(gas_constant > 0.0) || !gas_constant.is_finite() {
            return Err(Error::InvalidConfig(format!("gas constant must be > 0, got {}", gas_constant)));
        }
        Ok(Self {
            gamma,
            gas_constant,
            cv: gas_constant / (gamma - 1.0),
        })
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn gas_constant(&self) -> f64 {
        self.gas_constant
    }

    /// Specific heat at constant volume, `R / (gamma - 1)`.
    pub fn cv(&self) -> f64 {
        self.cv
    }

    /// Recovers the primitive state of a zone. Non-positive density or
    /// pressure, and non-finite inputs, are reported rather than repaired.
    pub fn primitive(&self, u: Conserved) -> Result<Primitive, NonPhysical> {
        let Conserved(rho, m, e) = u;

        if !(rho > 0.0) || !rho.is_finite() || !m.is_finite() || !e.is_finite() {
            return Err(NonPhysical {
                density: rho,
                pressure: f64::NAN,
            });
        }
        let v = m / rho;
        let p = (self.gamma - 1.0) * (e - 0.5 * rho * v * v);

        if !(p > 0.0) || !p.is_finite() {
            return Err(NonPhysical {
                density: rho,
                pressure: p,
            });
        }
        Ok(Primitive(rho, v, p / (rho * self.gas_constant)))
    }

    pub fn conserved(&self, p: Primitive) -> Conserved {
        let Primitive(rho, v, t) = p;
        Conserved(rho, rho * v, rho * (self.cv * t + 0.5 * v * v))
    }

    pub fn pressure(&self, p: Primitive) -> f64 {
        p.density() * self.gas_constant * p.temperature()
    }

    pub fn sound_speed(&self, p: Primitive) -> f64 {
        (self.gamma * self.gas_constant * p.temperature()).sqrt()
    }

    /// Largest signal speed in a zone, `|v| + c`.
    pub fn wavespeed(&self, p: Primitive) -> f64 {
        p.velocity().abs() + self.sound_speed(p)
    }

    /// Physical flux `(rho v, rho v^2 + p, v (E + p))`.
    pub fn flux_vector(&self, u: Conserved, p: Primitive) -> Conserved {
        let pg = self.pressure(p);
        let v = p.velocity();
        Conserved(u.momentum(), u.momentum() * v + pg, v * (u.energy() + pg))
    }
}

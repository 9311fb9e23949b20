//! Exact solution of the Riemann problem for a gamma-law gas.
//!
//! The star-region pressure is found by Newton iteration on the pressure
//! function, starting from the primitive-variable linearized guess. The
//! self-similar solution is then sampled along rays `S = (x - x0) / t`.

use crate::error::Error;

static PRESSURE_TOLERANCE: f64 = 1e-12;
static MAX_ITERATIONS: usize = 100;

/// Density, velocity and pressure of a uniform gas region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GasState {
    pub density: f64,
    pub velocity: f64,
    pub pressure: f64,
}

impl GasState {
    pub fn new(density: f64, velocity: f64, pressure: f64) -> Self {
        Self {
            density,
            velocity,
            pressure,
        }
    }
}

/// Solution between the two nonlinear waves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarRegion {
    pub pressure: f64,
    pub velocity: f64,
    pub density_left: f64,
    pub density_right: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct RiemannProblem {
    left: GasState,
    right: GasState,
    gamma: f64,
    star: StarRegion,
}

impl RiemannProblem {
    /// Solves for the star region. An `InvalidSetup` error is returned if
    /// either state is not physical, or if the two states would pull apart
    /// into a vacuum.
    pub fn new(gamma: f64, left: GasState, right: GasState) -> Result<Self, Error> {
        for s in [left, right] {
            if !(s.density > 0.0) || !(s.pressure > 0.0) {
                return Err(Error::InvalidSetup(format!("riemann state {:?} is not physical", s)));
            }
        }
        let cl = sound_speed(gamma, left);
        let cr = sound_speed(gamma, right);

        if 2.0 * (cl + cr) / (gamma - 1.0) <= right.velocity - left.velocity {
            return Err(Error::InvalidSetup("riemann problem generates a vacuum".into()));
        }
        let du = right.velocity - left.velocity;
        let guess = 0.5 * (left.pressure + right.pressure)
            - 0.125 * du * (left.density + right.density) * (cl + cr);
        let mut p = guess.max(PRESSURE_TOLERANCE);

        for _ in 0..MAX_ITERATIONS {
            let (fl, dfl) = pressure_function(gamma, p, left);
            let (fr, dfr) = pressure_function(gamma, p, right);
            let p_new = (p - (fl + fr + du) / (dfl + dfr)).max(PRESSURE_TOLERANCE);
            let change = 2.0 * (p_new - p).abs() / (p_new + p);
            p = p_new;
            if change < PRESSURE_TOLERANCE {
                break;
            }
        }
        let (fl, _) = pressure_function(gamma, p, left);
        let (fr, _) = pressure_function(gamma, p, right);
        let star = StarRegion {
            pressure: p,
            velocity: 0.5 * (left.velocity + right.velocity) + 0.5 * (fr - fl),
            density_left: star_density(gamma, p, left),
            density_right: star_density(gamma, p, right),
        };
        Ok(Self {
            left,
            right,
            gamma,
            star,
        })
    }

    pub fn star_region(&self) -> StarRegion {
        self.star
    }

    /// Speeds of the left-most and right-most edges of the wave pattern.
    pub fn outer_wave_speeds(&self) -> (f64, f64) {
        let g = self.gamma;
        let (l, r) = (self.left, self.right);
        let (cl, cr) = (sound_speed(g, l), sound_speed(g, r));
        let p = self.star.pressure;
        let left = if p > l.pressure {
            l.velocity - cl * shock_mach_factor(g, p / l.pressure)
        } else {
            l.velocity - cl
        };
        let right = if p > r.pressure {
            r.velocity + cr * shock_mach_factor(g, p / r.pressure)
        } else {
            r.velocity + cr
        };
        (left, right)
    }

    /// Returns the gas state on the ray `x / t = speed`, with the initial
    /// discontinuity at `x = 0`.
    pub fn sample(&self, speed: f64) -> GasState {
        let g = self.gamma;
        let g1 = (g - 1.0) / (2.0 * g);
        let g5 = 2.0 / (g + 1.0);
        let g7 = 0.5 * (g - 1.0);
        let star = self.star;

        if speed <= star.velocity {
            let w = self.left;
            let c = sound_speed(g, w);
            let star_state = GasState::new(star.density_left, star.velocity, star.pressure);

            if star.pressure > w.pressure {
                let shock = w.velocity - c * shock_mach_factor(g, star.pressure / w.pressure);
                if speed <= shock { w } else { star_state }
            } else if speed <= w.velocity - c {
                w
            } else if speed > star.velocity - c * (star.pressure / w.pressure).powf(g1) {
                star_state
            } else {
                let cs = g5 * (c + g7 * (w.velocity - speed));
                GasState::new(
                    w.density * (cs / c).powf(2.0 / (g - 1.0)),
                    g5 * (c + g7 * w.velocity + speed),
                    w.pressure * (cs / c).powf(2.0 * g / (g - 1.0)),
                )
            }
        } else {
            let w = self.right;
            let c = sound_speed(g, w);
            let star_state = GasState::new(star.density_right, star.velocity, star.pressure);

            if star.pressure > w.pressure {
                let shock = w.velocity + c * shock_mach_factor(g, star.pressure / w.pressure);
                if speed >= shock { w } else { star_state }
            } else if speed >= w.velocity + c {
                w
            } else if speed <= star.velocity + c * (star.pressure / w.pressure).powf(g1) {
                star_state
            } else {
                let cs = g5 * (c - g7 * (w.velocity - speed));
                GasState::new(
                    w.density * (cs / c).powf(2.0 / (g - 1.0)),
                    g5 * (-c + g7 * w.velocity + speed),
                    w.pressure * (cs / c).powf(2.0 * g / (g - 1.0)),
                )
            }
        }
    }
}

fn sound_speed(gamma: f64, w: GasState) -> f64 {
    (gamma * w.pressure / w.density).sqrt()
}

fn shock_mach_factor(gamma: f64, pressure_ratio: f64) -> f64 {
    ((gamma + 1.0) / (2.0 * gamma) * pressure_ratio + (gamma - 1.0) / (2.0 * gamma)).sqrt()
}

/// Velocity jump across the wave separating `w` from the star region, and
/// its derivative with respect to the star pressure.
fn pressure_function(gamma: f64, p: f64, w: GasState) -> (f64, f64) {
    if p > w.pressure {
        let a = 2.0 / ((gamma + 1.0) * w.density);
        let b = (gamma - 1.0) / (gamma + 1.0) * w.pressure;
        let q = (a / (p + b)).sqrt();
        ((p - w.pressure) * q, q * (1.0 - 0.5 * (p - w.pressure) / (b + p)))
    } else {
        let c = sound_speed(gamma, w);
        let ratio = p / w.pressure;
        (
            2.0 * c / (gamma - 1.0) * (ratio.powf((gamma - 1.0) / (2.0 * gamma)) - 1.0),
            ratio.powf(-(gamma + 1.0) / (2.0 * gamma)) / (w.density * c),
        )
    }
}

fn star_density(gamma: f64, p: f64, w: GasState) -> f64 {
    let ratio = p / w.pressure;
    if p > w.pressure {
        let g6 = (gamma - 1.0) / (gamma + 1.0);
        w.density * (ratio + g6) / (g6 * ratio + 1.0)
    } else {
        w.density * ratio.powf(1.0 / gamma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_sod_star_region() {
        let problem = RiemannProblem::new(
            1.4,
            GasState::new(1.0, 0.0, 1.0),
            GasState::new(0.125, 0.0, 0.1),
        )
        .unwrap();
        let star = problem.star_region();
        assert!((star.pressure - 0.30313).abs() < 1e-5);
        assert!((star.velocity - 0.92745).abs() < 1e-5);
        assert!((star.density_left - 0.42632).abs() < 1e-5);
        assert!((star.density_right - 0.26557).abs() < 1e-5);
    }

    #[test]
    fn ten_to_one_shocktube_star_region() {
        let problem = RiemannProblem::new(
            1.4,
            GasState::new(10.0, 0.0, 10.0),
            GasState::new(1.0, 0.0, 1.0),
        )
        .unwrap();
        let star = problem.star_region();
        assert!((star.pressure - 2.84816).abs() < 1e-4);
        assert!((star.velocity - 0.971668).abs() < 1e-5);
        assert!((star.density_left - 4.07759).abs() < 1e-4);
        assert!((star.density_right - 2.04438).abs() < 1e-4);
    }

    #[test]
    fn far_field_is_undisturbed() {
        let left = GasState::new(10.0, 0.0, 10.0);
        let right = GasState::new(1.0, 0.0, 1.0);
        let problem = RiemannProblem::new(1.4, left, right).unwrap();
        assert_eq!(problem.sample(-10.0), left);
        assert_eq!(problem.sample(10.0), right);
    }

    #[test]
    fn rarefaction_fan_is_continuous_at_its_edges() {
        let left = GasState::new(10.0, 0.0, 10.0);
        let problem = RiemannProblem::new(1.4, left, GasState::new(1.0, 0.0, 1.0)).unwrap();
        let head = -(1.4f64).sqrt();
        let inside = problem.sample(head + 1e-9);
        assert!((inside.density - left.density).abs() < 1e-6);

        let star = problem.star_region();
        let tail = star.velocity - (1.4 * star.pressure / star.density_left).sqrt();
        let inside = problem.sample(tail - 1e-9);
        assert!((inside.density - star.density_left).abs() < 1e-6);
        assert!((inside.pressure - star.pressure).abs() < 1e-6);
    }

    #[test]
    fn sod_waves_are_a_rarefaction_head_and_a_shock() {
        let problem = RiemannProblem::new(
            1.4,
            GasState::new(10.0, 0.0, 10.0),
            GasState::new(1.0, 0.0, 1.0),
        )
        .unwrap();
        let (left, right) = problem.outer_wave_speeds();
        assert!((left + 1.4f64.sqrt()).abs() < 1e-12);
        assert!(right > problem.star_region().velocity);
        assert_eq!(problem.sample(right + 1e-9).density, 1.0);
        assert!(problem.sample(right - 1e-9).density > 2.0);
    }

    #[test]
    fn symmetric_collision_has_zero_star_velocity() {
        let problem = RiemannProblem::new(
            1.4,
            GasState::new(1.0, 1.0, 1.0),
            GasState::new(1.0, -1.0, 1.0),
        )
        .unwrap();
        let star = problem.star_region();
        assert!(star.velocity.abs() < 1e-12);
        assert!(star.pressure > 1.0);
        assert!(star.density_left > 1.0);
    }

    #[test]
    fn vacuum_generating_states_are_rejected() {
        let result = RiemannProblem::new(
            1.4,
            GasState::new(1.0, -20.0, 1.0),
            GasState::new(1.0, 20.0, 1.0),
        );
        assert!(result.is_err());
    }
}

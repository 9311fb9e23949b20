//! Decomposition of a zone's physical flux into right-going and left-going
//! parts.
//!
//! Both rules satisfy `F+ + F- = F` and are symmetric under reflection: for
//! the mirrored zone (momentum reversed) `F+` becomes `R F-`, where `R`
//! negates the mass and energy components. The reflecting boundary relies on
//! this.

use super::{Conserved, IdealGas, Primitive};
use crate::FluxSplitting;

/// Global Lax-Friedrichs splitting `F± = (F ± a U) / 2`. The speed `a` must
/// bound `|v| + c` in every zone the fluxes are combined with.
pub fn lax_friedrichs(u: Conserved, f: Conserved, a: f64) -> (Conserved, Conserved) {
    (0.5 * (f + a * u), 0.5 * (f - a * u))
}

/// Split HLL: with Mach number `M = v / c`,
///
/// ```text
/// F+ =  (M + 1) / 2 F + c (1 - M^2) / 2 U
/// F- = -(M - 1) / 2 F - c (1 - M^2) / 2 U
/// ```
///
/// Supersonic zones are fully upwinded: `F+ = F` for `M > 1` and `F- = F`
/// for `M < -1`.
pub fn shll(u: Conserved, f: Conserved, v: f64, c: f64) -> (Conserved, Conserved) {
    let mach = v / c;
    if mach > 1.0 {
        return (f, Conserved::default());
    }
    if mach < -1.0 {
        return (Conserved::default(), f);
    }
    let z1 = 0.5 * (mach + 1.0);
    let z2 = 0.5 * c * (1.0 - mach * mach);
    let z3 = 0.5 * (mach - 1.0);
    (f * z1 + u * z2, f * (-z3) - u * z2)
}

/// Splits the flux of one zone with the chosen rule. The global speed `a` is
/// ignored by splittings that use local wave speeds.
pub fn split_flux(
    splitting: FluxSplitting,
    eos: &IdealGas,
    u: Conserved,
    p: Primitive,
    a: f64,
) -> (Conserved, Conserved) {
    let f = eos.flux_vector(u, p);
    match splitting {
        FluxSplitting::LaxFriedrichs => lax_friedrichs(u, f, a),
        FluxSplitting::Shll => shll(u, f, p.velocity(), eos.sound_speed(p)),
    }
}

//! Flux-difference update of one zone, and the ghost fluxes supplied at the
//! two ends of the domain.

use super::Conserved;
use crate::BoundaryCondition;

/// Maps the split flux of a zone onto the split flux of its mirror image:
/// mass and energy fluxes change sign, momentum flux does not.
pub fn reflect(f: Conserved) -> Conserved {
    Conserved(-f.0, f.1, -f.2)
}

/// The two split fluxes that come from outside the domain: `F+` of the zone
/// left of zone `0`, and `F-` of the zone right of zone `N-1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostFluxes {
    pub left_plus: Conserved,
    pub right_minus: Conserved,
}

impl GhostFluxes {
    /// Builds the ghost fluxes from the split fluxes of the edge zones. Only
    /// the zones `0` and `N-1` are read.
    pub fn new(
        boundary: BoundaryCondition,
        first: (Conserved, Conserved),
        last: (Conserved, Conserved),
    ) -> Self {
        let (first_plus, first_minus) = first;
        let (last_plus, last_minus) = last;
        match boundary {
            BoundaryCondition::Transmissive => Self {
                left_plus: first_plus,
                right_minus: last_minus,
            },
            BoundaryCondition::Reflective => Self {
                left_plus: reflect(first_minus),
                right_minus: reflect(last_plus),
            },
            BoundaryCondition::Periodic => Self {
                left_plus: last_plus,
                right_minus: first_minus,
            },
        }
    }
}

/// Advances a zone by one explicit step,
///
/// ```text
/// U' = U - dt/dx [(F+[i] - F+[i-1]) + (F-[i+1] - F-[i])]
/// ```
pub fn advance_zone(
    u: Conserved,
    plus_left: Conserved,
    plus: Conserved,
    minus: Conserved,
    minus_right: Conserved,
    dt_over_dx: f64,
) -> Conserved {
    let divergence = (plus - plus_left) + (minus_right - minus);
    u - divergence * dt_over_dx
}

pub mod cmdline;
pub mod config;
pub mod driver;
pub mod error;
pub mod euler1d;
pub mod mesh;
pub mod output;
pub mod parse;
pub mod physics;
pub mod riemann;
pub mod setups;
pub mod state;
pub mod traits;

pub use crate::cmdline::CommandLine;
pub use crate::config::Config;
pub use crate::driver::{Driver, Phase, Solution};
pub use crate::mesh::UniformMesh;
pub use crate::physics::{Conserved, IdealGas, Primitive};
pub use crate::state::{RecurringTask, State};
pub use crate::traits::{Setup, Solve};
pub use lane_core::Lanes;

use cfg_if::cfg_if;
use git_version::git_version;
use std::str::FromStr;

/// Number of values stored per cell in every solver buffer.
pub const NUM_FIELDS: usize = 3;

/// Returns the current version string, including the git revision the code
/// was built from, if it is known.
pub fn shll_version() -> String {
    format!(
        "shll version {} ({})",
        env!("CARGO_PKG_VERSION"),
        git_version!(fallback = "unknown")
    )
}

/// Execution modes. These select how per-cell kernels are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ExecutionMode {
    /// All cells are processed in order on the calling thread.
    CPU,
    /// Cells are spread over a thread pool; requires `feature=threads`.
    Pool,
}

/// Policy for the split fluxes entering the domain through its two ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BoundaryCondition {
    /// Waves leave the domain freely; the edge cell's flux is replicated.
    Transmissive,
    /// Solid walls; the ghost zone mirrors the edge zone with its velocity
    /// reversed.
    Reflective,
    /// The domain wraps around on itself.
    Periodic,
}

impl FromStr for BoundaryCondition {
    type Err = error::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transmissive" | "outflow" => Ok(Self::Transmissive),
            "reflective" | "wall" => Ok(Self::Reflective),
            "periodic" => Ok(Self::Periodic),
            _ => Err(error::Error::UnknownEnumVariant {
                enum_type: "boundary condition".to_owned(),
                variant: s.to_owned(),
            }),
        }
    }
}

/// Rules for splitting the physical flux of a zone into a right-going part
/// `F+` and a left-going part `F-`, with `F+ + F- = F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FluxSplitting {
    /// `F± = (F ± a U) / 2`, with `a` the largest signal speed on the whole
    /// grid.
    LaxFriedrichs,
    /// Split HLL: each zone's flux is weighted by its own Mach number and
    /// sound speed.
    Shll,
}

impl FromStr for FluxSplitting {
    type Err = error::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lax-friedrichs" | "lf" => Ok(Self::LaxFriedrichs),
            "shll" => Ok(Self::Shll),
            _ => Err(error::Error::UnknownEnumVariant {
                enum_type: "flux splitting".to_owned(),
                variant: s.to_owned(),
            }),
        }
    }
}

/// Returns whether the code has been compiled with thread-pool support,
/// `feature=threads`.
pub fn compiled_with_threads() -> bool {
    cfg_if! {
        if #[cfg(feature = "threads")] {
            true
        } else {
            false
        }
    }
}

use crate::error::Error;
use crate::output::OutputFields;
use crate::{BoundaryCondition, Config, ExecutionMode, FluxSplitting};
use clap::parser::ValueSource;
use clap::{ArgMatches, Parser};

/// Split-flux finite-volume solver for the 1D Euler equations
#[derive(Parser, Debug, Clone, serde::Serialize, serde::Deserialize)]
#[command(name = "shll", version)]
pub struct CommandLine {
    /// Problem setup, optionally followed by model parameters, e.g.
    /// shocktube:density_left=10:density_right=1
    pub setup: Option<String>,

    /// Number of zones
    #[arg(long, short = 'n', default_value_t = 1000)]
    pub resolution: usize,

    /// Number of time steps to take
    #[arg(long, short = 's', default_value_t = 1)]
    pub steps: u64,

    /// Fixed time step size
    #[arg(long, default_value_t = 1e-4)]
    pub dt: f64,

    /// Number of iterations between progress messages
    #[arg(long, short = 'f', default_value_t = 10)]
    pub fold: u64,

    /// Simulation time between checkpoints [none]
    #[arg(long)]
    pub checkpoint_interval: Option<f64>,

    /// Directory to write checkpoints and output tables to; defaults to the
    /// directory of the restart file, or the working directory
    #[arg(long, short = 'o')]
    pub outdir: Option<String>,

    /// Boundary condition [transmissive|reflective|periodic]; defaults to
    /// the one the setup prescribes
    #[arg(long, short = 'b')]
    pub boundary: Option<BoundaryCondition>,

    /// Flux splitting [lax-friedrichs|shll]
    #[arg(long, default_value = "lax-friedrichs")]
    pub splitting: FluxSplitting,

    /// Adiabatic index of the gas
    #[arg(long, default_value_t = 1.4)]
    pub gamma: f64,

    /// Specific gas constant
    #[arg(long, default_value_t = 1.0)]
    pub gas_constant: f64,

    /// Number of lanes in the thread pool; 0 runs serially
    #[arg(long, short = 't', default_value_t = 0)]
    pub threads: usize,

    /// Checkpoint file, or directory of checkpoints, to restart from
    #[arg(long, short = 'r')]
    pub restart: Option<String>,

    /// Which variables to write in the output table
    #[arg(long, value_enum, default_value_t = OutputFields::Primitive)]
    pub fields: OutputFields,

    /// Log at debug level
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl CommandLine {
    pub fn execution_mode(&self) -> ExecutionMode {
        if self.threads > 0 {
            ExecutionMode::Pool
        } else {
            ExecutionMode::CPU
        }
    }

    /// Checks option values that clap cannot check on its own.
    pub fn validate(&self) -> Result<(), Error> {
        if self.fold == 0 {
            return Err(Error::InvalidConfig("fold must be at least 1".into()));
        }
        if let Some(interval) = self.checkpoint_interval {
            if !(interval > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "checkpoint interval must be positive, got {}",
                    interval
                )));
            }
        }
        if self.execution_mode() == ExecutionMode::Pool && !crate::compiled_with_threads() {
            return Err(Error::CompiledWithoutThreads);
        }
        Ok(())
    }

    /// Lists the options given explicitly in `matches` that disagree with a
    /// checkpoint's frozen configuration, and are therefore ignored on
    /// restart.
    pub fn ignored_on_restart(&self, matches: &ArgMatches, config: &Config) -> Vec<String> {
        let given = |id: &str| matches.value_source(id) == Some(ValueSource::CommandLine);
        let mut ignored = Vec::new();
        let mut check = |id: &str, differs: bool, kept: String| {
            if given(id) && differs {
                ignored.push(format!("--{} (checkpoint has {})", id.replace('_', "-"), kept));
            }
        };
        check("resolution", self.resolution != config.mesh.num_zones, config.mesh.num_zones.to_string());
        check("dt", self.dt != config.dt, config.dt.to_string());
        check("boundary", self.boundary != Some(config.boundary), format!("{:?}", config.boundary));
        check("splitting", self.splitting != config.splitting, format!("{:?}", config.splitting));
        check("gamma", self.gamma != config.eos.gamma(), config.eos.gamma().to_string());
        check(
            "gas_constant",
            self.gas_constant != config.eos.gas_constant(),
            config.eos.gas_constant().to_string(),
        );
        ignored
    }
}

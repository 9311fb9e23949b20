use clap::{ArgMatches, CommandFactory, FromArgMatches};
use shll::error::Error;
use shll::output::{self, OutputFields};
use shll::parse::{last_in_dir_ending_with, parent_dir, split_pair};
use shll::setups::{make_setup, possible_setups_info};
use shll::{euler1d, CommandLine, Config, Driver, IdealGas, RecurringTask, Setup, State};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn time_exec<T, F>(f: F) -> (T, std::time::Duration)
where
    F: FnOnce() -> T,
{
    let start = std::time::Instant::now();
    let result = f();
    (result, start.elapsed())
}

fn new_state(cmdline: &CommandLine) -> Result<(State, Arc<dyn Setup>), Error> {
    let (setup_name, parameters) = match cmdline.setup.as_deref().map(|s| split_pair(s, ':')) {
        Some((Some(name), parameters)) => (name, parameters.unwrap_or("")),
        _ => return Err(possible_setups_info()),
    };
    let setup = make_setup(setup_name, parameters)?;
    let config = Config {
        mesh: setup.mesh(cmdline.resolution),
        steps: cmdline.steps,
        dt: cmdline.dt,
        eos: IdealGas::new(cmdline.gamma, cmdline.gas_constant)?,
        boundary: cmdline.boundary.unwrap_or_else(|| setup.boundary_condition()),
        splitting: cmdline.splitting,
    };
    config.validate()?;

    let state = State {
        command_line: cmdline.clone(),
        restart_file: None,
        setup_name: setup_name.to_owned(),
        parameters: setup.model_parameter_string(),
        config,
        conserved: setup.initial_conserved_vec(&config.eos, &config.mesh),
        time: 0.0,
        iteration: 0,
        checkpoint: RecurringTask::new(),
    };
    Ok((state, setup))
}

fn restart_state(
    cmdline: &CommandLine,
    matches: &ArgMatches,
    restart: &str,
) -> Result<(State, Arc<dyn Setup>), Error> {
    let filename = if std::path::Path::new(restart).is_dir() {
        last_in_dir_ending_with(restart, ".sf")
            .ok_or_else(|| Error::InvalidCheckpoint(format!("no checkpoints in {}", restart)))?
    } else {
        restart.to_owned()
    };
    let mut state = State::from_checkpoint(&filename)?;
    let setup = make_setup(&state.setup_name, &state.parameters)?;

    for option in cmdline.ignored_on_restart(matches, &state.config) {
        info!("ignoring {} on restart", option);
    }
    if cmdline.steps > state.config.steps {
        info!("extending run from {} to {} steps", state.config.steps, cmdline.steps);
        state.config.steps = cmdline.steps;
    }
    state.command_line = cmdline.clone();
    Ok((state, setup))
}

/// The interval to write a closing checkpoint with, if checkpoints are on and
/// this invocation took at least one step.
fn final_checkpoint_interval(cmdline: &CommandLine, first_iteration: u64, last_iteration: u64) -> Option<f64> {
    cmdline.checkpoint_interval.filter(|_| last_iteration > first_iteration)
}

fn run() -> Result<(), Error> {
    let matches = CommandLine::command().get_matches();
    let cmdline = CommandLine::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    setup_logging(cmdline.verbose, cmdline.quiet);
    cmdline.validate()?;
    info!("{}", shll::shll_version());

    let (mut state, setup) = match &cmdline.restart {
        Some(restart) => restart_state(&cmdline, &matches, restart)?,
        None => new_state(&cmdline)?,
    };
    let config = state.config;
    let outdir = match (&cmdline.outdir, &state.restart_file) {
        (Some(outdir), _) => outdir.clone(),
        (None, Some(restart_file)) => parent_dir(restart_file).unwrap_or(".").to_owned(),
        (None, None) => ".".to_owned(),
    };

    setup.print_parameters();
    info!(
        "{} zones, dx={:.3e}, dt={:.3e}, {} steps, {:?} boundary, {:?} splitting, {:?} mode",
        config.mesh.num_zones,
        config.mesh.dx(),
        config.dt,
        config.steps,
        config.boundary,
        config.splitting,
        cmdline.execution_mode(),
    );

    let solver = euler1d::solver(cmdline.execution_mode(), cmdline.threads, &config, &state.conserved)?;
    let mut driver = Driver::resume(config, solver, state.iteration, state.time)?;
    let first_iteration = driver.iteration();

    while !driver.is_done() {
        if let Some(interval) = cmdline.checkpoint_interval {
            if state.checkpoint.is_due(driver.time(), interval) {
                state.set_conserved(driver.conserved());
                state.time = driver.time();
                state.iteration = driver.iteration();
                state.write_checkpoint(interval, &outdir)?;
            }
        }

        let start_iteration = driver.iteration();
        let (result, elapsed) = time_exec(|| {
            for _ in 0..cmdline.fold {
                if driver.is_done() {
                    break;
                }
                driver.step()?;
            }
            Ok::<(), Error>(())
        });
        result?;

        let zones = config.mesh.num_zones as u64 * (driver.iteration() - start_iteration);
        let mzps = zones as f64 / 1e6 / elapsed.as_secs_f64();
        info!("[{}] t={:.5} Mzps={:.3}", driver.iteration(), driver.time(), mzps);
    }

    if let Some(interval) = final_checkpoint_interval(&cmdline, first_iteration, driver.iteration()) {
        state.set_conserved(driver.conserved());
        state.time = driver.time();
        state.iteration = driver.iteration();
        state.write_checkpoint(interval, &outdir)?;
    }

    let solution = driver.finish()?;
    let table = match cmdline.fields {
        OutputFields::Primitive => &solution.primitive,
        OutputFields::Conserved => &solution.conserved,
    };
    output::write_table_file(&outdir, &solution.mesh, table)?;
    output::log_summary(&solution.primitive);

    let [mass, momentum, energy] = output::conserved_totals(&solution.mesh, &solution.conserved);
    info!("totals: mass={:.12e} momentum={:.12e} energy={:.12e}", mass, momentum, energy);

    if let Some(error) = output::l1_density_error(
        setup.as_ref(),
        &config.eos,
        &solution.mesh,
        &solution.primitive,
        solution.time,
    ) {
        info!("L1 density error against the exact solution: {:.6e}", error);
    }
    info!("completed {} steps, t={:.6}", solution.iteration, solution.time);
    Ok(())
}

fn main() {
    match run() {
        Ok(_) => {}
        Err(Error::PrintUserInformation(message)) => print!("{}", message),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1)
        }
    }
}

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::Read;

const NUM_FIELDS: usize = 3;

#[derive(serde::Deserialize)]
struct UniformMesh {
    num_zones: usize,
    length: f64,
}

#[derive(serde::Deserialize)]
struct IdealGas {
    gamma: f64,
    gas_constant: f64,
}

#[derive(serde::Deserialize)]
struct Config {
    mesh: UniformMesh,
    eos: IdealGas,
}

#[derive(serde::Deserialize)]
struct State {
    config: Config,
    conserved: Vec<f64>,
    time: f64,
    iteration: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Field {
    Density,
    Momentum,
    Energy,
    Velocity,
    Pressure,
    Temperature,
}

impl State {
    fn load(filename: &str) -> Result<Self> {
        let mut file = File::open(filename)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        let state: Self = rmp_serde::from_slice(&bytes)?;
        if state.conserved.len() != state.config.mesh.num_zones * NUM_FIELDS {
            anyhow::bail!("{}: conserved data does not match the mesh", filename)
        }
        Ok(state)
    }

    fn field(&self, field: Field) -> impl Iterator<Item = f64> + '_ {
        let eos = &self.config.eos;
        self.conserved.chunks_exact(NUM_FIELDS).map(move |u| {
            let (rho, m, e) = (u[0], u[1], u[2]);
            let v = m / rho;
            let p = (eos.gamma - 1.0) * (e - 0.5 * rho * v * v);
            match field {
                Field::Density => rho,
                Field::Momentum => m,
                Field::Energy => e,
                Field::Velocity => v,
                Field::Pressure => p,
                Field::Temperature => p / (rho * eos.gas_constant),
            }
        })
    }

    fn totals(&self) -> [f64; NUM_FIELDS] {
        let dx = self.config.mesh.length / self.config.mesh.num_zones as f64;
        let mut totals = [0.0; NUM_FIELDS];
        for u in self.conserved.chunks_exact(NUM_FIELDS) {
            for (t, q) in totals.iter_mut().zip(u) {
                *t += q * dx
            }
        }
        totals
    }
}

fn sorted_field(state: &State, field: Field) -> Result<Vec<f64>> {
    let mut data = Vec::with_capacity(state.config.mesh.num_zones);
    for x in state.field(field) {
        if !x.is_finite() {
            anyhow::bail!("field contains nan or inf")
        }
        data.push(x)
    }
    if data.is_empty() {
        anyhow::bail!("checkpoint has no zones")
    }
    data.sort_by(f64::total_cmp);
    Ok(data)
}

fn print_quantiles(filename: &str, state: &State, field: Field) -> Result<()> {
    let data = sorted_field(state, field)?;
    let last = data.len() - 1;
    println!(
        "{:?} quantiles for {} ([{}] t={:.6}):",
        field, filename, state.iteration, state.time
    );
    println!("    max                {:+.03e}", data[last]);
    for x in (1..5).rev() {
        let y = libm::erf(x as f64 / f64::sqrt(2.0));
        let i = ((data.len() as f64 * y).floor() as usize).min(last);
        println!("    +{} sigma ({:>6.3}%) {:+.03e}", x, y * 100.0, data[i]);
    }
    for x in 1..5 {
        let y = 1.0 - libm::erf(x as f64 / f64::sqrt(2.0));
        let i = ((data.len() as f64 * y).ceil() as usize).min(last);
        println!("    -{} sigma ({:>6.3}%) {:+.03e}", x, y * 100.0, data[i]);
    }
    println!("    min                {:+.03e}", data[0]);
    Ok(())
}

fn print_totals(filename: &str, state: &State) {
    let [mass, momentum, energy] = state.totals();
    println!(
        "{}: [{}] t={:.6} mass={:.12e} momentum={:.12e} energy={:.12e}",
        filename, state.iteration, state.time, mass, momentum, energy
    );
}

#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// Checkpoint files to read
    #[arg(required = true)]
    paths: Vec<String>,

    /// The field to summarize
    #[arg(long, short, value_enum, default_value = "density")]
    field: Field,

    /// Print the domain totals of the conserved quantities instead
    #[arg(long)]
    totals: bool,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    for filename in &opts.paths {
        let state = State::load(filename)?;
        if opts.totals {
            print_totals(filename, &state);
        } else {
            print_quantiles(filename, &state, opts.field)?;
        }
    }
    Ok(())
}

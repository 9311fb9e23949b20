use crate::cmdline::CommandLine;
use crate::error::Error;
use crate::Config;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::prelude::*;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecurringTask {
    pub number: u64,
    pub last_time: Option<f64>,
}

impl Default for RecurringTask {
    fn default() -> Self {
        Self::new()
    }
}

impl RecurringTask {
    pub fn new() -> Self {
        Self {
            number: 0,
            last_time: None,
        }
    }
    pub fn next(&mut self, interval: f64) {
        self.last_time = Some(self.last_time.map_or(0.0, |last_time| last_time + interval));
        self.number += 1;
    }
    pub fn is_due(&self, time: f64, interval: f64) -> bool {
        self.last_time.map_or(true, |last_time| time >= last_time + interval)
    }
}

/// Everything needed to restart a run: how it was invoked, the frozen run
/// configuration, and the conserved state at `time`.
#[derive(Clone, Serialize, Deserialize)]
pub struct State {
    pub command_line: CommandLine,
    pub restart_file: Option<String>,
    pub setup_name: String,
    pub parameters: String,
    pub config: Config,
    pub conserved: Vec<f64>,
    pub time: f64,
    pub iteration: u64,
    pub checkpoint: RecurringTask,
}

impl State {
    pub fn from_checkpoint(filename: &str) -> Result<State, Error> {
        info!("read {}", filename);

        let mut f = File::open(filename)?;
        let mut bytes = Vec::new();
        f.read_to_end(&mut bytes)?;

        let mut state: State =
            rmp_serde::from_slice(&bytes).map_err(|e| Error::InvalidCheckpoint(format!("{}: {}", filename, e)))?;

        if state.conserved.len() != state.config.mesh.num_zones * crate::NUM_FIELDS {
            return Err(Error::InvalidCheckpoint(format!(
                "{}: conserved data does not match the mesh",
                filename
            )));
        }
        state.restart_file = Some(filename.to_string());
        Ok(state)
    }

    pub fn set_conserved(&mut self, conserved: Vec<f64>) {
        assert!(
            conserved.len() == self.conserved.len(),
            "new and old conserved array sizes must match"
        );
        self.conserved = conserved;
    }

    /// Writes the state to the next numbered checkpoint file in `outdir` and
    /// returns its name.
    pub fn write_checkpoint(&mut self, checkpoint_interval: f64, outdir: &str) -> Result<String, Error> {
        self.checkpoint.next(checkpoint_interval);
        create_dir_all(outdir)?;
        let bytes = rmp_serde::to_vec_named(self).map_err(|e| Error::InvalidCheckpoint(e.to_string()))?;
        let filename = format!("{}/chkpt.{:04}.sf", outdir, self.checkpoint.number - 1);
        let mut file = File::create(&filename)?;
        file.write_all(&bytes)?;
        info!("write {}", filename);
        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::UniformMesh;
    use crate::physics::IdealGas;
    use crate::{BoundaryCondition, FluxSplitting};
    use clap::Parser;

    fn state() -> State {
        let config = Config {
            mesh: UniformMesh::unit_interval(4),
            steps: 20,
            dt: 1e-3,
            eos: IdealGas::default(),
            boundary: BoundaryCondition::Reflective,
            splitting: FluxSplitting::Shll,
        };
        State {
            command_line: CommandLine::parse_from(["shll", "shocktube"]),
            restart_file: None,
            setup_name: "shocktube".into(),
            parameters: "density_left=4".into(),
            config,
            conserved: (0..12).map(|i| 1.0 + i as f64).collect(),
            time: 0.01,
            iteration: 10,
            checkpoint: RecurringTask::new(),
        }
    }

    #[test]
    fn recurring_task_is_due_immediately_then_after_each_interval() {
        let mut task = RecurringTask::new();
        assert!(task.is_due(0.0, 0.1));
        task.next(0.1);
        assert!(!task.is_due(0.05, 0.1));
        assert!(task.is_due(0.1, 0.1));
        task.next(0.1);
        assert_eq!(task.number, 2);
        assert_eq!(task.last_time, Some(0.1));
    }

    #[test]
    fn checkpoint_can_be_written_and_read_back() {
        let outdir = std::env::temp_dir().join(format!("shll-state-test-{}", std::process::id()));
        let outdir = outdir.to_str().unwrap().to_string();
        let mut state = state();
        let filename = state.write_checkpoint(0.1, &outdir).unwrap();
        assert!(filename.ends_with("chkpt.0000.sf"));

        let restored = State::from_checkpoint(&filename).unwrap();
        assert_eq!(restored.conserved, state.conserved);
        assert_eq!(restored.config, state.config);
        assert_eq!(restored.iteration, 10);
        assert_eq!(restored.parameters, "density_left=4");
        assert_eq!(restored.checkpoint.number, 1);
        assert_eq!(restored.restart_file.as_deref(), Some(filename.as_str()));
        std::fs::remove_dir_all(&outdir).ok();
    }

    #[test]
    fn garbage_checkpoint_is_rejected() {
        let dir = std::env::temp_dir().join(format!("shll-garbage-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let filename = dir.join("chkpt.0000.sf");
        std::fs::write(&filename, b"not a checkpoint").unwrap();
        let result = State::from_checkpoint(filename.to_str().unwrap());
        assert!(matches!(result, Err(Error::InvalidCheckpoint(_))));
        std::fs::remove_dir_all(&dir).ok();
    }
}

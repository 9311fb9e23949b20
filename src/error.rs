#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Not a failure: a message (help text, setup list) the binary should
    /// print before exiting.
    #[error("{0}")]
    PrintUserInformation(String),

    #[error("error: compiled without thread-pool support")]
    CompiledWithoutThreads,

    #[error("error: unknown {enum_type} '{variant}'")]
    UnknownEnumVariant { enum_type: String, variant: String },

    #[error("error: invalid setup: {0}")]
    InvalidSetup(String),

    #[error("error: invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("error: invalid checkpoint: {0}")]
    InvalidCheckpoint(String),

    /// A zone was found with non-positive density or pressure, or with a
    /// non-finite value. The run cannot continue past this point.
    #[error("error: non-physical state in zone {zone} (density={density:.6e}, pressure={pressure:.6e})")]
    NonPhysicalState {
        zone: usize,
        density: f64,
        pressure: f64,
    },

    #[error("error: the run has already finished")]
    RunFinished,

    #[error("error: {0}")]
    Dispatch(#[from] lane_core::Error),

    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

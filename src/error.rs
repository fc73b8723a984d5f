use thiserror::Error;

/// Errors raised while wiring, ordering or training a network.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("neuron order not built, call `build_order()` first")]
    OrderNotBuilt,
    #[error("dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("connecting `{parent}` -> `{child}` would create a cycle")]
    CycleDetected { parent: String, child: String },
    #[error("unsupported topology edit: {0}")]
    UnsupportedTopologyEdit(String),
    #[error("unknown neuron #{0}")]
    UnknownNeuron(usize),
    #[error("a neuron named `{0}` already exists")]
    DuplicateName(String),
    #[error("invalid role: {0}")]
    InvalidRole(String),
    #[error("output neuron `{0}` is not reachable from any input")]
    UnreachableOutput(String),
    #[error("unknown activation `{0}`")]
    UnknownActivation(String),
    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid number `{value}` in row {row}")]
    InvalidNumber { row: usize, value: String },
}

pub type Result<T> = std::result::Result<T, NetworkError>;

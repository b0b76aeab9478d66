//! Error types for placement evaluation

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during placement evaluation
#[derive(Debug, Error)]
pub enum EvalError {
    /// A node name cannot be represented in the timer netlist
    #[error("Node name {name} is {len} characters long, the timer accepts at most {max}")]
    NameTooLong {
        /// Offending name
        name: String,
        /// Length of the name
        len: usize,
        /// Maximum length accepted
        max: usize,
    },

    /// A generated node name is already used in the net
    #[error("Synthetic node {name} collides with an existing node of net {net}")]
    NameCollision {
        /// Generated name
        name: String,
        /// Net where the collision happened
        net: String,
    },

    /// The timer did not produce a usable results file
    #[error("Timer did not generate results in {}", .0.display())]
    NoTimingResults(PathBuf),

    /// The results file does not follow the slack record format
    #[error("Malformed timing report at record {record}: {message}")]
    MalformedTimingReport {
        /// Index of the offending record
        record: usize,
        /// Description of the problem
        message: String,
    },

    /// The timer process could not be started
    #[error("Failed to run timer {}: {source}", .program.display())]
    TimerLaunch {
        /// Timer executable
        program: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Invalid parameter file
    #[error("Parameter error at line {line}: {message}")]
    Parameters {
        /// Line number, starting at 1
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// The target utilization of the density penalty is not a positive number
    #[error("Target utilization must be positive, got {0}")]
    TargetUtilization(f64),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EvalError {
    /// Whether the error prevents any meaningful evaluation of the circuit
    ///
    /// Naming errors mean the timer netlist cannot represent the circuit. Other errors only
    /// make the timing results unavailable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EvalError::NameTooLong { .. } | EvalError::NameCollision { .. }
        )
    }
}

/// Result type for placement evaluation
pub type Result<T> = std::result::Result<T, EvalError>;

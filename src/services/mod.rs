pub mod execution;

pub use execution::{ExecutionStatus, ExecutionTracker, StepOutcome};

pub mod mutation;
pub mod runner;
pub mod schedule;

pub use self::runner::{
    OptimizationOptions, OptimizationResult, Optimizer, ProgressCallback, Silent,
};
pub use self::schedule::AcceptSchedule;

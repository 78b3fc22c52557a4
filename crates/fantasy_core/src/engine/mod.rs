//! Stochastic outcome simulator: samplers, correlation engine and the trial runner.

pub mod correlation;
pub mod distributions;
pub mod observer;
pub mod runner;
pub mod trial;

pub use correlation::{AlignmentCounts, AlignmentReport, CorrelationEngine, Direction};
pub use distributions::{
    LogNormalParams, NoiseSampler, PlayerPointsSampler, ServeEventSampler, ServeEvents,
    TeamTotalSampler,
};
pub use observer::{CancellationToken, NoopObserver, ProgressCounter, SimObserver};
pub use runner::{SimulationOutput, SimulationRunner};
pub use trial::{Trial, TrialMatrix, TrialMatrixBuilder};

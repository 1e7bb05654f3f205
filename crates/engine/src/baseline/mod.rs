//! Personal baseline: estimation, calibration and persistence

mod calibration;
mod stats;
mod store;
mod timer;

pub use calibration::{
    derive_baseline, CalibrationController, CalibrationState, CalibrationStatus, CalibrationTick,
    DEFAULT_CALIBRATION_DURATION_MS, DEFAULT_CALIBRATION_TICK_MS, DEFAULT_CALIBRATION_WINDOW,
};
pub use stats::{mean_and_std, stat_of};
pub use store::BaselineStore;
pub use timer::{CalibrationTimer, CalibrationTimerHandle, TimerOutcome};

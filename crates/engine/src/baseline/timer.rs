//! Periodic calibration ticker
//!
//! Ticks the session's calibration controller on a fixed interval until the
//! window completes or the handle is cancelled.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use super::CalibrationTick;
use crate::session::MonitorSession;

/// How a timer run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    Completed,
    Cancelled,
    /// The session left the calibrating state through another path
    Stopped,
}

pub struct CalibrationTimer;

impl CalibrationTimer {
    /// Start a calibration window on `session` and tick it every `tick`
    ///
    /// If a window is already running the existing one keeps going and the
    /// returned handle drives it.
    pub fn spawn(session: Arc<Mutex<MonitorSession>>, tick: Duration) -> CalibrationTimerHandle {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            session.lock().await.start_calibration();

            let mut ticker = interval(tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match session.lock().await.tick_calibration() {
                            CalibrationTick::InProgress { .. } => {}
                            CalibrationTick::Completed => {
                                debug!("Calibration timer finished");
                                return TimerOutcome::Completed;
                            }
                            CalibrationTick::Idle => return TimerOutcome::Stopped,
                        }
                    }
                    changed = cancel_rx.changed() => {
                        // A dropped sender also stops the timer
                        if changed.is_err() || *cancel_rx.borrow() {
                            session.lock().await.cancel_calibration();
                            return TimerOutcome::Cancelled;
                        }
                    }
                }
            }
        });

        CalibrationTimerHandle { cancel_tx, task }
    }
}

pub struct CalibrationTimerHandle {
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<TimerOutcome>,
}

impl CalibrationTimerHandle {
    /// Request an early stop; partial progress is discarded
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the timer task to end
    pub async fn join(self) -> Option<TimerOutcome> {
        let CalibrationTimerHandle { cancel_tx, task } = self;
        let outcome = task.await.ok();
        drop(cancel_tx);
        outcome
    }
}

//! The shutdown grace timer.
//!
//! Graceful shutdown is two-phase: the stage asks every child to leave,
//! then waits for their exit reports. The timer bounds phase two. It never
//! kills anything; firing just closes the stage's own inbox, after which
//! undrained children are abandoned.

use std::sync::Weak;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use log::warn;

use crate::actor::record::Record;

/// Cancellable one-shot timer that closes the stage inbox when it fires.
pub(crate) struct ShutdownTimer {
    cancel: Sender<()>,
}

impl ShutdownTimer {
    /// Arm the timer. Holds only a weak reference to the stage record, so
    /// an armed timer never keeps a dead stage alive.
    pub(crate) fn arm(stage: Weak<Record>, grace: Duration) -> std::io::Result<Self> {
        let (cancel, fuse) = bounded::<()>(1);
        std::thread::Builder::new()
            .name("stage-curtain".to_string())
            .spawn(move || {
                if let Err(RecvTimeoutError::Timeout) = fuse.recv_timeout(grace) {
                    if let Some(record) = stage.upgrade() {
                        warn!("shutdown grace of {grace:?} elapsed; abandoning stragglers");
                        record.mailbox().close();
                    }
                }
            })?;
        Ok(Self { cancel })
    }

    /// Disarm. The timer thread exits without touching the stage.
    pub(crate) fn cancel(self) {
        let _ = self.cancel.try_send(());
    }
}
